//! Navigation Bar Component

use leptos::prelude::*;
use shared::truncate_address;

use crate::state::wallet::use_wallet_context;

#[component]
pub fn Navbar() -> impl IntoView {
    let wallet_ctx = use_wallet_context();

    view! {
        <nav>
            <div style="max-width: 1200px; margin: 0 auto; padding: 0 24px; display: flex; justify-content: space-between; align-items: center;">
                <span class="nav-title">"Wallet Session"</span>
                <span class="nav-status" style="font-family: monospace;">
                    {move || match wallet_ctx.address() {
                        Some(address) => truncate_address(&address),
                        None => "Not connected".to_string(),
                    }}
                </span>
            </div>
        </nav>
    }
}
