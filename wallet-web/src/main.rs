//! Browser Wallet Session
//!
//! Connects the page to an injected EIP-1193 wallet and drives the session
//! from a small Leptos UI.

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

mod app;
mod components;
mod pages;
mod services;
mod state;

use app::App;

#[wasm_bindgen(start)]
pub fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Library crates log through tracing; its "log" feature forwards here
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Wallet session app starting");

    hide_loading_screen();
    leptos::mount::mount_to_body(|| view! { <App/> });
}

/// Hide the static loading placeholder once wasm is running.
fn hide_loading_screen() {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::warn!("No document available");
        return;
    };

    match document.get_element_by_id("leptos-loading") {
        Some(loading_element) => {
            if let Some(html_element) = loading_element.dyn_ref::<HtmlElement>() {
                html_element.class_list().add_1("hidden").ok();
            }
            loading_element
                .set_attribute("style", "display: none !important;")
                .ok();
        }
        None => log::debug!("Loading element not found"),
    }
}
