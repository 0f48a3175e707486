use thiserror::Error;

use crate::authority::AuthorityRole;

/// Failure taxonomy for the token-operation lifecycle.
///
/// Every user-triggered flow terminates in exactly one of these (or a
/// transport error wrapped by `anyhow` at the boundary). `ConfirmationTimeout`
/// is deliberately distinct from `OnChainExecution`: the former means the
/// outcome is unknown, not negative.
#[derive(Debug, Error)]
pub enum TokenOpError {
    #[error("invalid address `{0}`")]
    InvalidAddress(String),

    #[error("invalid amount `{0}`")]
    InvalidAmount(String),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("insufficient balance: {required} lamports required, {available} available")]
    InsufficientBalance { required: u64, available: u64 },

    #[error("you do not hold the {0} authority for this token")]
    AuthorityMismatch(AuthorityRole),

    #[error("failed to publish assets: {0}")]
    Publish(String),

    #[error("checkpoint expired at block height {0}; the transaction was not resubmitted")]
    TransactionExpired(u64),

    #[error("signature request rejected by the wallet")]
    UserRejected,

    #[error("transaction failed on chain: {0}")]
    OnChainExecution(String),

    #[error("confirmation window closed before the transaction resolved; its outcome is unknown")]
    ConfirmationTimeout,

    #[error("{0} not found")]
    NotFound(String),
}
