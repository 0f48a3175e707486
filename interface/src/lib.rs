//! Typed building blocks for token operations: validated intents, amounts
//! and addresses, the authority model, and the token-metadata program
//! interface.

pub mod address;
pub mod amount;
pub mod authority;
pub mod error;
pub mod intent;
pub mod metadata;
pub mod program_ids;

pub use error::TokenOpError;
