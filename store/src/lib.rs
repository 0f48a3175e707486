//! Owner-scoped persistence for created tokens and metadata lookups.
//!
//! One JSON file per owner and concern, keyed by the owner's address string.
//! Writes are whole-file and last-write-wins; there is no merging. This is a
//! display cache, never a source of truth for on-chain state.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};

pub mod record;

pub use record::{MetadataLookup, TokenRecord};

/// Metadata lookups kept per owner, newest first.
pub const LOOKUP_HISTORY_LIMIT: usize = 10;

pub struct TokenStore {
    root: PathBuf,
}

impl TokenStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create the store directory {}", root.display()))?;
        Ok(Self { root })
    }

    /// Appends a record to `owner`'s list. Duplicates are kept; removal is
    /// an explicit user action, never implicit.
    pub fn save(&self, owner: &str, record: TokenRecord) -> anyhow::Result<()> {
        let path = self.tokens_path(owner);
        let mut records: Vec<TokenRecord> = read_list(&path)?;
        records.push(record);
        write_list(&path, &records)
    }

    /// All of `owner`'s records, newest first. Never returns another owner's
    /// records.
    pub fn list(&self, owner: &str) -> anyhow::Result<Vec<TokenRecord>> {
        let mut records: Vec<TokenRecord> = read_list(&self.tokens_path(owner))?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Removes every record of `mint_address` for `owner`. Returns whether
    /// anything was removed.
    pub fn remove(&self, owner: &str, mint_address: &str) -> anyhow::Result<bool> {
        let path = self.tokens_path(owner);
        let mut records: Vec<TokenRecord> = read_list(&path)?;
        let before = records.len();
        records.retain(|record| record.mint_address != mint_address);
        if records.len() == before {
            return Ok(false);
        }
        write_list(&path, &records)?;
        Ok(true)
    }

    /// Pushes a lookup to the front of `owner`'s history, dropping anything
    /// past [`LOOKUP_HISTORY_LIMIT`].
    pub fn push_lookup(&self, owner: &str, lookup: MetadataLookup) -> anyhow::Result<()> {
        let path = self.lookups_path(owner);
        let mut lookups: Vec<MetadataLookup> = read_list(&path)?;
        lookups.insert(0, lookup);
        lookups.truncate(LOOKUP_HISTORY_LIMIT);
        write_list(&path, &lookups)
    }

    /// `owner`'s lookup history, newest first.
    pub fn lookups(&self, owner: &str) -> anyhow::Result<Vec<MetadataLookup>> {
        read_list(&self.lookups_path(owner))
    }

    fn tokens_path(&self, owner: &str) -> PathBuf {
        self.root.join(format!("tokens_{owner}.json"))
    }

    fn lookups_path(&self, owner: &str) -> PathBuf {
        self.root.join(format!("metadata_history_{owner}.json"))
    }
}

fn read_list<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read the store file {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse the store file {}", path.display()))
}

fn write_list<T: Serialize>(path: &Path, values: &[T]) -> anyhow::Result<()> {
    let bytes = serde_json::to_vec_pretty(values).context("Failed to serialize store records")?;
    fs::write(path, bytes)
        .with_context(|| format!("Failed to write the store file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn record(mint: &str, created_offset_secs: i64) -> TokenRecord {
        TokenRecord {
            name: "Example".to_string(),
            symbol: "EXM".to_string(),
            mint_address: mint.to_string(),
            decimals: 9,
            metadata_uri: "https://gateway.pinata.cloud/ipfs/QmMeta".to_string(),
            image_uri: "https://gateway.pinata.cloud/ipfs/QmImage".to_string(),
            created_at: Utc::now() + Duration::seconds(created_offset_secs),
            network: "devnet".to_string(),
            mint_authority: Some("owner".to_string()),
            freeze_authority: Some("owner".to_string()),
            update_authority: Some("owner".to_string()),
        }
    }

    fn lookup(mint: &str) -> MetadataLookup {
        MetadataLookup {
            mint_address: mint.to_string(),
            name: "Example".to_string(),
            symbol: "EXM".to_string(),
            uri: "https://gateway.pinata.cloud/ipfs/QmMeta".to_string(),
            looked_up_at: Utc::now(),
        }
    }

    #[test]
    fn saved_records_round_trip_for_their_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path()).unwrap();
        let saved = record("mint-1", 0);

        store.save("alice", saved.clone()).unwrap();

        let listed = store.list("alice").unwrap();
        assert_eq!(listed, vec![saved]);
        assert!(store.list("bob").unwrap().is_empty());
    }

    #[test]
    fn listing_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path()).unwrap();

        store.save("alice", record("older", -60)).unwrap();
        store.save("alice", record("newest", 60)).unwrap();
        store.save("alice", record("middle", 0)).unwrap();

        let mints: Vec<String> = store
            .list("alice")
            .unwrap()
            .into_iter()
            .map(|r| r.mint_address)
            .collect();
        assert_eq!(mints, vec!["newest", "middle", "older"]);
    }

    #[test]
    fn removal_targets_one_mint_and_reports_misses() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path()).unwrap();

        store.save("alice", record("keep", 0)).unwrap();
        store.save("alice", record("drop", 1)).unwrap();

        assert!(store.remove("alice", "drop").unwrap());
        assert!(!store.remove("alice", "drop").unwrap());

        let listed = store.list("alice").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].mint_address, "keep");
    }

    #[test]
    fn lookup_history_is_bounded_and_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path()).unwrap();

        for i in 0..15 {
            store.push_lookup("alice", lookup(&format!("mint-{i}"))).unwrap();
        }

        let lookups = store.lookups("alice").unwrap();
        assert_eq!(lookups.len(), LOOKUP_HISTORY_LIMIT);
        assert_eq!(lookups[0].mint_address, "mint-14");
        assert_eq!(lookups[9].mint_address, "mint-5");
    }

    #[test]
    fn rewrites_replace_the_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::open(dir.path()).unwrap();

        store.save("alice", record("mint-1", 0)).unwrap();
        store.save("alice", record("mint-1", 1)).unwrap();

        // Appends keep duplicates; the last write defines the file contents.
        assert_eq!(store.list("alice").unwrap().len(), 2);
        assert!(store.remove("alice", "mint-1").unwrap());
        assert!(store.list("alice").unwrap().is_empty());
    }
}
