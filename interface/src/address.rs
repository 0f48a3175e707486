use std::str::FromStr;

use solana_address::Address;

use crate::error::TokenOpError;

/// Parses a base58 address, failing with [`TokenOpError::InvalidAddress`] on
/// anything structurally invalid. Pure; no network access.
pub fn parse_address(raw: &str) -> Result<Address, TokenOpError> {
    let trimmed = raw.trim();
    Address::from_str(trimmed).map_err(|_| TokenOpError::InvalidAddress(trimmed.to_string()))
}
