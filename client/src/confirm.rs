use std::time::Duration;

use mintsmith_interface::error::TokenOpError;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_transaction_status_client_types::TransactionStatus;
use tokio::time::sleep;

use crate::rpc::{Checkpoint, RpcContext};

/// Resolved outcomes for a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finality {
    /// Confirmed at or beyond the target commitment.
    Finalized,
    /// Executed and failed; the program error is terminal.
    Failed(String),
}

enum Poll {
    Resolved(Finality),
    Expired,
    Continue,
}

pub struct ConfirmationTracker<'a> {
    rpc: &'a RpcContext,
    poll_interval: Duration,
}

impl<'a> ConfirmationTracker<'a> {
    pub fn new(rpc: &'a RpcContext) -> Self {
        Self {
            rpc,
            poll_interval: Duration::from_millis(500),
        }
    }

    /// Polls until the transaction resolves or the checkpoint's validity
    /// window closes.
    ///
    /// A closed window without resolution is `ConfirmationTimeout`: the
    /// outcome is unknown, and callers must not treat it as a failure.
    pub async fn confirm(
        &self,
        signature: &Signature,
        checkpoint: &Checkpoint,
    ) -> anyhow::Result<Finality> {
        loop {
            let status = self.rpc.signature_status(signature).await?;
            let height = self.rpc.block_height().await?;
            match evaluate(status.as_ref(), height, checkpoint, self.rpc.commitment()) {
                Poll::Resolved(finality) => return Ok(finality),
                Poll::Expired => return Err(TokenOpError::ConfirmationTimeout.into()),
                Poll::Continue => sleep(self.poll_interval).await,
            }
        }
    }
}

/// The status check runs before the expiry check, so an already-finalized
/// signature stays `Finalized` no matter how late it is re-queried.
fn evaluate(
    status: Option<&TransactionStatus>,
    block_height: u64,
    checkpoint: &Checkpoint,
    commitment: CommitmentConfig,
) -> Poll {
    if let Some(status) = status {
        if let Some(err) = &status.err {
            return Poll::Resolved(Finality::Failed(err.to_string()));
        }
        if status.satisfies_commitment(commitment) {
            return Poll::Resolved(Finality::Finalized);
        }
    }
    if block_height > checkpoint.last_valid_block_height {
        return Poll::Expired;
    }
    Poll::Continue
}

#[cfg(test)]
mod tests {
    use solana_sdk::{hash::Hash, transaction::TransactionError};
    use solana_transaction_status_client_types::TransactionConfirmationStatus;

    use super::*;

    fn checkpoint() -> Checkpoint {
        Checkpoint {
            blockhash: Hash::new_unique(),
            last_valid_block_height: 100,
        }
    }

    fn status(
        err: Option<TransactionError>,
        confirmation: TransactionConfirmationStatus,
    ) -> TransactionStatus {
        TransactionStatus {
            slot: 1,
            confirmations: None,
            status: match &err {
                Some(e) => Err(e.clone()),
                None => Ok(()),
            },
            err,
            confirmation_status: Some(confirmation),
        }
    }

    #[test]
    fn finalized_status_stays_finalized_on_requery() {
        let status = status(None, TransactionConfirmationStatus::Finalized);
        let commitment = CommitmentConfig::confirmed();

        // Within the window, and again long after it closed.
        for height in [50, 10_000] {
            match evaluate(Some(&status), height, &checkpoint(), commitment) {
                Poll::Resolved(Finality::Finalized) => {}
                _ => panic!("expected Finalized at height {height}"),
            }
        }
    }

    #[test]
    fn on_chain_failure_is_terminal_and_verbatim() {
        let status = status(
            Some(TransactionError::AccountNotFound),
            TransactionConfirmationStatus::Confirmed,
        );
        match evaluate(
            Some(&status),
            50,
            &checkpoint(),
            CommitmentConfig::confirmed(),
        ) {
            Poll::Resolved(Finality::Failed(message)) => {
                assert_eq!(message, TransactionError::AccountNotFound.to_string());
            }
            _ => panic!("expected Failed"),
        }
    }

    #[test]
    fn missing_status_past_validity_height_expires() {
        match evaluate(None, 101, &checkpoint(), CommitmentConfig::confirmed()) {
            Poll::Expired => {}
            _ => panic!("expected Expired"),
        }
    }

    #[test]
    fn missing_status_within_the_window_keeps_polling() {
        match evaluate(None, 100, &checkpoint(), CommitmentConfig::confirmed()) {
            Poll::Continue => {}
            _ => panic!("expected Continue"),
        }
    }

    #[test]
    fn processed_only_status_past_the_window_expires() {
        let status = status(None, TransactionConfirmationStatus::Processed);
        match evaluate(
            Some(&status),
            101,
            &checkpoint(),
            CommitmentConfig::confirmed(),
        ) {
            Poll::Expired => {}
            _ => panic!("expected Expired"),
        }
    }
}
