use borsh::{BorshDeserialize, BorshSerialize};
use solana_address::Address;

use super::Creator;

/// Account key for a V1 metadata account.
pub const METADATA_V1_KEY: u8 = 4;

/// The `data` payload stored inside a metadata account.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct StoredData {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
}

/// Leading fields of a token-metadata account.
///
/// Fields past `is_mutable` are version-dependent and unused here, so
/// deserialization stops after the prefix and ignores the tail.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct MetadataAccount {
    pub key: u8,
    pub update_authority: [u8; 32],
    pub mint: [u8; 32],
    pub data: StoredData,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
}

impl MetadataAccount {
    pub fn from_account_data(data: &[u8]) -> borsh::io::Result<Self> {
        let mut slice = data;
        Self::deserialize(&mut slice)
    }

    pub fn update_authority_address(&self) -> Address {
        Address::new_from_array(self.update_authority)
    }

    pub fn mint_address(&self) -> Address {
        Address::new_from_array(self.mint)
    }

    // Stored strings are zero-padded to their allocated size.

    pub fn name(&self) -> &str {
        trim_padding(&self.data.name)
    }

    pub fn symbol(&self) -> &str {
        trim_padding(&self.data.symbol)
    }

    pub fn uri(&self) -> &str {
        trim_padding(&self.data.uri)
    }
}

fn trim_padding(value: &str) -> &str {
    value.trim_end_matches('\0')
}
