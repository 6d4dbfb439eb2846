//! # Transaction Confirmation
//!
//! Bounded receipt polling with exponential backoff.
//!
//! ```text
//! poll receipt ─┬─ mined, status 0 ───────────────→ TransactionFailed
//!               ├─ mined, enough confirmations ───→ Ok(receipt)
//!               ├─ pending / too shallow ─┐
//!               └─ unknown N polls in a row ──────→ TransactionFailed (dropped)
//!                                         │
//!        sleep(interval), interval *= factor (capped)
//!        elapsed ≥ timeout ───────────────────────→ ConfirmationTimeout
//! ```
//!
//! Elapsed time is the sum of the intervals slept, so the loop needs no wall
//! clock and behaves the same in the browser. Transport errors are retried
//! inside the timeout budget; every other error is returned immediately.
//! Dropping the future cancels the wait.

use lib_core::{Result, WalletConfig, WalletError};
use shared::TxReceipt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::provider::WalletProvider;

/// How long and how often to poll for a receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub poll_interval: Duration,
    pub max_poll_interval: Duration,
    pub backoff_factor: u32,
    pub timeout: Duration,
    /// Blocks required including the inclusion block
    pub confirmations: u64,
    /// Consecutive polls the network may not know the transaction before it counts as dropped
    pub dropped_after_polls: u32,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_poll_interval: Duration::from_secs(8),
            backoff_factor: 2,
            timeout: Duration::from_secs(120),
            confirmations: 1,
            dropped_after_polls: 5,
        }
    }
}

impl From<&WalletConfig> for ConfirmationPolicy {
    fn from(config: &WalletConfig) -> Self {
        Self {
            poll_interval: config.confirm_poll_interval,
            max_poll_interval: config.confirm_max_poll_interval,
            timeout: config.confirm_timeout,
            confirmations: config.confirmations,
            ..Self::default()
        }
    }
}

impl ConfirmationPolicy {
    /// Reject a policy whose polling would never advance.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(WalletError::InvalidParams(
                "poll interval must be greater than 0".to_string(),
            ));
        }
        if self.max_poll_interval < self.poll_interval {
            return Err(WalletError::InvalidParams(
                "max poll interval must not be below the poll interval".to_string(),
            ));
        }
        Ok(())
    }

    fn next_interval(&self, current: Duration) -> Duration {
        current
            .checked_mul(self.backoff_factor.max(1))
            .unwrap_or(self.max_poll_interval)
            .min(self.max_poll_interval)
    }
}

/// Wait until `tx_hash` is mined with enough confirmations.
pub async fn wait_for_confirmation<P>(
    provider: &P,
    tx_hash: &str,
    policy: &ConfirmationPolicy,
) -> Result<TxReceipt>
where
    P: WalletProvider + ?Sized,
{
    policy.validate()?;

    let mut interval = policy.poll_interval;
    let mut elapsed = Duration::ZERO;
    let mut unknown_polls = 0u32;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match poll_once(provider, tx_hash, policy).await {
            Ok(Poll::Confirmed(receipt)) => {
                info!(tx_hash, block = receipt.block_number, attempt, "transaction confirmed");
                return Ok(receipt);
            }
            Ok(Poll::Reverted(receipt)) => {
                warn!(tx_hash, block = receipt.block_number, "transaction reverted");
                return Err(WalletError::TransactionFailed(format!(
                    "{} reverted in block {}",
                    tx_hash, receipt.block_number
                )));
            }
            Ok(Poll::Pending) => unknown_polls = 0,
            Ok(Poll::Unknown) => {
                unknown_polls += 1;
                if unknown_polls >= policy.dropped_after_polls {
                    warn!(tx_hash, unknown_polls, "transaction dropped by the network");
                    return Err(WalletError::TransactionFailed(format!(
                        "{} was dropped by the network",
                        tx_hash
                    )));
                }
            }
            Err(e) if e.is_transient() => {
                warn!(tx_hash, attempt, "receipt poll failed, retrying: {}", e);
            }
            Err(e) => return Err(e),
        }

        if elapsed >= policy.timeout {
            return Err(WalletError::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
                waited_secs: elapsed.as_secs(),
            });
        }

        let pause = interval.min(policy.timeout - elapsed);
        debug!(tx_hash, attempt, pause_ms = pause.as_millis() as u64, "waiting for receipt");
        sleep(pause).await;
        elapsed += pause;
        interval = policy.next_interval(interval);
    }
}

enum Poll {
    Confirmed(TxReceipt),
    Reverted(TxReceipt),
    Pending,
    Unknown,
}

async fn poll_once<P>(provider: &P, tx_hash: &str, policy: &ConfirmationPolicy) -> Result<Poll>
where
    P: WalletProvider + ?Sized,
{
    let Some(receipt) = provider.transaction_receipt(tx_hash).await? else {
        return if provider.transaction_exists(tx_hash).await? {
            Ok(Poll::Pending)
        } else {
            Ok(Poll::Unknown)
        };
    };

    if !receipt.succeeded() {
        return Ok(Poll::Reverted(receipt));
    }

    if policy.confirmations <= 1 {
        return Ok(Poll::Confirmed(receipt));
    }

    let head = provider.block_number().await?;
    let depth = head.saturating_sub(receipt.block_number) + 1;
    if depth >= policy.confirmations {
        Ok(Poll::Confirmed(receipt))
    } else {
        debug!(tx_hash, depth, needed = policy.confirmations, "waiting for confirmations");
        Ok(Poll::Pending)
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
pub(crate) async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use shared::TxStatus;

    fn hash(byte: &str) -> String {
        format!("0x{}", byte.repeat(32))
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = ConfirmationPolicy::default();
        let mut interval = policy.poll_interval;
        let mut seen = vec![];
        for _ in 0..5 {
            seen.push(interval.as_secs());
            interval = policy.next_interval(interval);
        }
        assert_eq!(seen, vec![1, 2, 4, 8, 8]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirms_after_pending_polls() {
        let provider = MockProvider::new();
        let tx = hash("aa");
        provider.queue_receipt(&tx, 3, TxStatus::Success);

        let receipt = wait_for_confirmation(&provider, &tx, &ConfirmationPolicy::default())
            .await
            .unwrap();

        assert_eq!(receipt.transaction_hash, tx);
        assert_eq!(provider.receipt_polls(&tx), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reverted_receipt_fails() {
        let provider = MockProvider::new();
        let tx = hash("bb");
        provider.queue_receipt(&tx, 0, TxStatus::Reverted);

        let err = wait_for_confirmation(&provider, &tx, &ConfirmationPolicy::default())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::TransactionFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_never_mined() {
        let provider = MockProvider::new();
        let tx = hash("cc");
        provider.queue_receipt(&tx, u32::MAX, TxStatus::Success);

        let policy = ConfirmationPolicy {
            timeout: Duration::from_secs(10),
            ..Default::default()
        };
        let err = wait_for_confirmation(&provider, &tx, &policy).await.unwrap_err();

        match err {
            WalletError::ConfirmationTimeout { tx_hash, waited_secs } => {
                assert_eq!(tx_hash, tx);
                assert_eq!(waited_secs, 10);
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        // 1 + 2 + 4 + 3 seconds slept, one poll before each pause and one after
        assert_eq!(provider.receipt_polls(&tx), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejects_policy_that_never_advances() {
        let provider = MockProvider::new();
        let tx = hash("cd");
        provider.queue_receipt(&tx, u32::MAX, TxStatus::Success);

        let zero_interval = ConfirmationPolicy {
            poll_interval: Duration::ZERO,
            ..Default::default()
        };
        let zero_cap = ConfirmationPolicy {
            max_poll_interval: Duration::ZERO,
            ..Default::default()
        };

        for policy in [zero_interval, zero_cap] {
            let result = tokio::time::timeout(
                Duration::from_secs(1),
                wait_for_confirmation(&provider, &tx, &policy),
            )
            .await
            .expect("a degenerate policy must fail fast");
            assert!(matches!(result, Err(WalletError::InvalidParams(_))));
        }
        assert_eq!(provider.receipt_polls(&tx), 0);
        assert!(ConfirmationPolicy::default().validate().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_transaction_is_dropped() {
        let provider = MockProvider::new();
        let tx = hash("dd");

        let policy = ConfirmationPolicy {
            dropped_after_polls: 3,
            ..Default::default()
        };
        let err = wait_for_confirmation(&provider, &tx, &policy).await.unwrap_err();

        assert!(err.to_string().contains("dropped"));
        assert_eq!(provider.receipt_polls(&tx), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_extra_confirmations() {
        let provider = MockProvider::new();
        let tx = hash("ee");
        provider.queue_receipt(&tx, 0, TxStatus::Success);
        provider.set_block_number(100);

        let policy = ConfirmationPolicy {
            confirmations: 3,
            ..Default::default()
        };
        // Mined at 101 by the mock; head advances one block per receipt poll
        let receipt = wait_for_confirmation(&provider, &tx, &policy).await.unwrap();
        assert_eq!(receipt.block_number, 101);
        assert!(provider.block_number_now() >= 103);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let provider = MockProvider::new();
        let tx = hash("ff");
        provider.queue_receipt(&tx, 0, TxStatus::Success);
        provider.fail_next_receipt_polls(2);

        let receipt = wait_for_confirmation(&provider, &tx, &ConfirmationPolicy::default())
            .await
            .unwrap();
        assert_eq!(receipt.transaction_hash, tx);
    }
}
