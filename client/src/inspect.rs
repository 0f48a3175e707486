//! Read-only queries: wallet holdings, frozen accounts, metadata, history.

use anyhow::Context;
use mintsmith_interface::{
    error::TokenOpError,
    metadata::{find_metadata_address, MetadataAccount},
};
use solana_address::Address;
use solana_client::rpc_response::RpcConfirmedTransactionStatusWithSignature;
use spl_token_interface::state::AccountState;

use crate::rpc::RpcContext;

/// A token account held by the queried wallet.
pub struct OwnedTokenAccount {
    pub address: Address,
    pub mint: Address,
    pub amount: u64,
    pub frozen: bool,
}

pub async fn wallet_tokens(
    rpc: &RpcContext,
    owner: &Address,
) -> anyhow::Result<Vec<OwnedTokenAccount>> {
    let accounts = rpc.token_accounts_by_owner(owner).await?;
    Ok(accounts
        .into_iter()
        .map(|(address, account)| OwnedTokenAccount {
            address,
            mint: account.mint,
            amount: account.amount,
            frozen: account.state == AccountState::Frozen,
        })
        .collect())
}

/// A frozen holder account of a mint.
pub struct FrozenAccount {
    pub address: Address,
    pub owner: Address,
    pub amount: u64,
}

pub async fn frozen_accounts(
    rpc: &RpcContext,
    mint: &Address,
) -> anyhow::Result<Vec<FrozenAccount>> {
    let accounts = rpc.token_accounts_by_mint(mint).await?;
    Ok(accounts
        .into_iter()
        .filter(|(_, account)| account.state == AccountState::Frozen)
        .map(|(address, account)| FrozenAccount {
            address,
            owner: account.owner,
            amount: account.amount,
        })
        .collect())
}

/// On-chain metadata, enriched best-effort with the off-chain document.
pub struct TokenMetadataView {
    pub mint: Address,
    pub update_authority: Address,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub is_mutable: bool,
    /// Absent when the document is unreachable or unparsable; the on-chain
    /// fields above still stand on their own.
    pub off_chain: Option<serde_json::Value>,
}

pub async fn token_metadata(
    rpc: &RpcContext,
    http: &reqwest::Client,
    mint: &Address,
) -> anyhow::Result<TokenMetadataView> {
    let (metadata_address, _) = find_metadata_address(mint);
    let account = rpc
        .account(&metadata_address)
        .await?
        .ok_or_else(|| TokenOpError::NotFound(format!("metadata for mint {mint}")))?;
    let metadata = MetadataAccount::from_account_data(&account.data)
        .context("Failed to decode the metadata account")?;

    let off_chain = fetch_off_chain(http, metadata.uri()).await;

    Ok(TokenMetadataView {
        mint: *mint,
        update_authority: metadata.update_authority_address(),
        name: metadata.name().to_string(),
        symbol: metadata.symbol().to_string(),
        uri: metadata.uri().to_string(),
        is_mutable: metadata.is_mutable,
        off_chain,
    })
}

async fn fetch_off_chain(http: &reqwest::Client, uri: &str) -> Option<serde_json::Value> {
    if uri.is_empty() {
        return None;
    }
    let response = http.get(uri).send().await.ok()?;
    response.json().await.ok()
}

/// Recent signatures involving `address`, newest first.
pub async fn recent_transactions(
    rpc: &RpcContext,
    address: &Address,
    limit: usize,
) -> anyhow::Result<Vec<RpcConfirmedTransactionStatusWithSignature>> {
    rpc.signatures_for(address, limit).await
}
