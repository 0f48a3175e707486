use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized summary of a successfully created token.
///
/// A display cache: every field can be rebuilt by re-querying the chain, and
/// nothing here is authoritative. Written only after confirmed success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub name: String,
    pub symbol: String,
    pub mint_address: String,
    pub decimals: u8,
    pub metadata_uri: String,
    pub image_uri: String,
    pub created_at: DateTime<Utc>,
    /// Cluster tag, e.g. `devnet` or `mainnet-beta`.
    pub network: String,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub update_authority: Option<String>,
}

/// One entry in the bounded metadata lookup history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataLookup {
    pub mint_address: String,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub looked_up_at: DateTime<Utc>,
}
