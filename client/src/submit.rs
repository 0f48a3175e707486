use std::time::Duration;

use anyhow::Context;
use mintsmith_interface::error::TokenOpError;
use solana_address::Address;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    rpc_request::{RpcError, RpcResponseErrorData},
    rpc_response::RpcSimulateTransactionResult,
};
use solana_sdk::{
    hash::Hash,
    message::Message,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use tokio::time::sleep;

use crate::{
    builder::BuiltOperation,
    logs::log_warning,
    rpc::{Checkpoint, RpcContext},
};

/// Signing seam over the user's wallet.
///
/// `sign` may suspend indefinitely while a human decides; a declined request
/// surfaces as [`TokenOpError::UserRejected`].
pub trait Wallet {
    fn address(&self) -> Address;
    fn sign(&self, transaction: &mut Transaction, blockhash: Hash) -> anyhow::Result<()>;
}

/// A wallet backed by a locally held keypair. Signs without interaction.
pub struct LocalWallet {
    keypair: Keypair,
}

impl LocalWallet {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }
}

impl Wallet for LocalWallet {
    fn address(&self) -> Address {
        self.keypair.pubkey()
    }

    fn sign(&self, transaction: &mut Transaction, blockhash: Hash) -> anyhow::Result<()> {
        transaction
            .try_partial_sign(&[&self.keypair], blockhash)
            .context("Failed to sign with the wallet keypair")
    }
}

/// Bounded retry budget for transaction sends.
///
/// Applies to transient transport failures only: a simulation rejection is
/// terminal, and an expired checkpoint always stops the attempt instead of
/// resubmitting.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u8,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(500),
        }
    }
}

/// A submitted transaction awaiting confirmation. Immutable: a fresh attempt
/// gets a fresh checkpoint and a fresh instance.
#[derive(Debug, Clone, Copy)]
pub struct PendingSubmission {
    pub signature: Signature,
    pub checkpoint: Checkpoint,
}

pub struct TransactionSubmitter<'a> {
    rpc: &'a RpcContext,
    retry: RetryPolicy,
}

impl<'a> TransactionSubmitter<'a> {
    pub fn new(rpc: &'a RpcContext) -> Self {
        Self::with_retry(rpc, RetryPolicy::default())
    }

    pub fn with_retry(rpc: &'a RpcContext, retry: RetryPolicy) -> Self {
        Self { rpc, retry }
    }

    /// Assembles, signs, and sends one atomic transaction, preserving the
    /// builder's instruction order.
    ///
    /// The checkpoint is fetched immediately before signing. The returned
    /// signature carries no finality guarantee.
    pub async fn submit(
        &self,
        wallet: &dyn Wallet,
        built: &BuiltOperation,
    ) -> anyhow::Result<PendingSubmission> {
        let checkpoint = self.rpc.latest_checkpoint().await?;
        let fee_payer = wallet.address();

        let message = Message::new(&built.instructions, Some(&fee_payer));
        let mut transaction = Transaction::new_unsigned(message);
        if !built.extra_signers.is_empty() {
            let signers: Vec<&Keypair> = built.extra_signers.iter().collect();
            transaction
                .try_partial_sign(&signers, checkpoint.blockhash)
                .context("Failed to sign with the generated keys")?;
        }
        wallet.sign(&mut transaction, checkpoint.blockhash)?;

        let mut attempt = 0u8;
        loop {
            attempt += 1;
            let error = match self.rpc.send(&transaction).await {
                Ok(signature) => {
                    return Ok(PendingSubmission {
                        signature,
                        checkpoint,
                    })
                }
                Err(error) => error,
            };

            if let Some(rejection) = preflight_rejection(&error) {
                return Err(TokenOpError::OnChainExecution(rejection).into());
            }
            if attempt >= self.retry.max_attempts {
                return Err(
                    anyhow::Error::new(error).context("Transaction send failed after retries")
                );
            }
            let height = self.rpc.block_height().await?;
            if height > checkpoint.last_valid_block_height {
                return Err(
                    TokenOpError::TransactionExpired(checkpoint.last_valid_block_height).into(),
                );
            }

            log_warning("Send failed", format!("attempt {attempt}: {error}"));
            sleep(self.retry.backoff).await;
        }
    }
}

/// Extracts the simulation rejection from a send failure, if present.
/// Retrying a rejected simulation cannot change the outcome.
fn preflight_rejection(error: &ClientError) -> Option<String> {
    if let ClientErrorKind::RpcError(RpcError::RpcResponseError {
        data:
            RpcResponseErrorData::SendTransactionPreflightFailure(RpcSimulateTransactionResult {
                err: Some(err),
                ..
            }),
        ..
    }) = error.kind()
    {
        return Some(err.to_string());
    }
    None
}

#[cfg(test)]
mod tests {
    use solana_system_interface::instruction::transfer;

    use super::*;

    struct RejectingWallet {
        address: Address,
    }

    impl Wallet for RejectingWallet {
        fn address(&self) -> Address {
            self.address
        }

        fn sign(&self, _transaction: &mut Transaction, _blockhash: Hash) -> anyhow::Result<()> {
            Err(TokenOpError::UserRejected.into())
        }
    }

    fn unsigned_transfer(payer: &Address) -> Transaction {
        let instruction = transfer(payer, &Address::new_unique(), 1_000);
        Transaction::new_unsigned(Message::new(&[instruction], Some(payer)))
    }

    #[test]
    fn local_wallet_signs_its_own_transfer() {
        let wallet = LocalWallet::new(Keypair::new());
        let mut transaction = unsigned_transfer(&wallet.address());

        wallet.sign(&mut transaction, Hash::new_unique()).unwrap();
        assert!(transaction.is_signed());
    }

    #[test]
    fn declined_signature_surfaces_as_user_rejected() {
        let wallet = RejectingWallet {
            address: Address::new_unique(),
        };
        let mut transaction = unsigned_transfer(&wallet.address());

        let error = wallet
            .sign(&mut transaction, Hash::new_unique())
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<TokenOpError>(),
            Some(TokenOpError::UserRejected)
        ));
    }

    #[test]
    fn default_retry_budget_is_bounded() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert!(policy.backoff > Duration::ZERO);
    }
}
