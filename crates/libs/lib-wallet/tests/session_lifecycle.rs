//! End-to-end session lifecycle against the scripted wallet.

use lib_core::WalletError;
use lib_wallet::mock::{MockProvider, DEV_ACCOUNTS};
use lib_wallet::{SessionConfig, WalletSession};
use shared::{ChainInfo, TransactionRequest, TxStatus};

const RECIPIENT: &str = "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc";

#[tokio::test(start_paused = true)]
async fn test_full_lifecycle() {
    let mock = MockProvider::new();
    let session = WalletSession::new(Some(mock.clone()), SessionConfig::default());
    assert!(session.snapshot().has_provider);
    assert!(!session.is_connected());

    // connect
    session.connect(None).await.unwrap();
    let state = session.snapshot();
    let active = state.active_account.clone().unwrap();
    assert!(state.accounts.contains_key(&active.address));
    assert_eq!(active.address, DEV_ACCOUNTS[0]);

    // switch to a chain the wallet knows
    let sepolia = ChainInfo::new("0xaa36a7", "Sepolia", "https://rpc.sepolia.org", "ETH");
    session.switch_chain(&sepolia).await.unwrap();
    assert_eq!(session.chain_id().as_deref(), Some("0xaa36a7"));

    // add and switch to one it does not
    let base = ChainInfo::new("8453", "Base", "https://mainnet.base.org", "ETH")
        .with_explorer("https://basescan.org");
    session.add_chain(&base).await.unwrap();
    session.switch_chain(&base).await.unwrap();
    assert_eq!(session.chain_id().as_deref(), Some("0x2105"));
    assert!(session.known_chains().iter().any(|c| c.chain_name == "Base"));

    // send and confirm
    let tx_hash = session
        .send_transaction(TransactionRequest::transfer(RECIPIENT, "0x2386f26fc10000"))
        .await
        .unwrap();
    let receipt = session.wait_tx_confirmed(&tx_hash).await.unwrap();
    assert_eq!(receipt.transaction_hash, tx_hash);
    assert_eq!(receipt.status, TxStatus::Success);
    assert_eq!(receipt.from, DEV_ACCOUNTS[0]);

    // disconnect, twice
    session.disconnect();
    session.disconnect();
    let state = session.snapshot();
    assert!(!state.is_connect);
    assert!(state.active_account.is_none());
    assert!(state.connected_at.is_none());

    let err = session
        .send_transaction(TransactionRequest::transfer(RECIPIENT, "0x1"))
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::NotConnected));
    assert_eq!(mock.sent_transactions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reverted_transaction_surfaces_failure() {
    let mock = MockProvider::new();
    let session = WalletSession::new(Some(mock.clone()), SessionConfig::default());
    session.connect(None).await.unwrap();

    let tx_hash = session
        .send_transaction(TransactionRequest::transfer(RECIPIENT, "0x1"))
        .await
        .unwrap();
    mock.queue_receipt(&tx_hash, 2, TxStatus::Reverted);

    let err = session.wait_tx_confirmed(&tx_hash).await.unwrap_err();
    assert!(matches!(err, WalletError::TransactionFailed(_)));
    assert!(session.pending_transactions().is_empty());
}

#[tokio::test]
async fn test_session_without_wallet() {
    let session: WalletSession<MockProvider> = WalletSession::new(None, SessionConfig::default());

    assert!(!session.has_provider());
    assert!(session.provider().is_none());
    assert!(matches!(session.connect(None).await, Err(WalletError::NoProvider)));
    assert!(matches!(
        session
            .send_transaction(TransactionRequest::transfer(RECIPIENT, "0x1"))
            .await,
        Err(WalletError::NotConnected)
    ));

    session.disconnect();
    assert!(!session.is_connected());
}
