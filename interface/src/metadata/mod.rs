//! Client-side interface to the token-metadata program: address derivation,
//! the two instructions the lifecycle needs, and a view of the on-chain
//! account.

mod account;
mod instruction;

pub use account::*;
pub use instruction::*;

use solana_address::Address;
use solana_sdk::pubkey::Pubkey;

use crate::program_ids::TOKEN_METADATA_PROGRAM_ID;

pub const METADATA_SEED: &[u8] = b"metadata";

/// Derives the canonical metadata account for `mint`.
///
/// A domain-separated derivation under the token-metadata program, not a
/// random address: the same mint always maps to the same metadata account.
pub fn find_metadata_address(mint: &Address) -> (Address, u8) {
    Pubkey::find_program_address(
        &[
            METADATA_SEED,
            TOKEN_METADATA_PROGRAM_ID.as_ref(),
            mint.as_ref(),
        ],
        &TOKEN_METADATA_PROGRAM_ID,
    )
}
