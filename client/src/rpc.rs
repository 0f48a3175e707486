use std::time::{Duration, Instant};

use anyhow::Context;
use mintsmith_interface::{error::TokenOpError, program_ids::TOKEN_PROGRAM_ID};
use solana_account::Account;
use solana_account_decoder_client_types::UiAccountEncoding;
use solana_address::Address;
use solana_client::{
    client_error::ClientError,
    nonblocking::rpc_client::RpcClient,
    rpc_client::GetConfirmedSignaturesForAddress2Config,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig, RpcSendTransactionConfig},
    rpc_filter::{Memcmp, RpcFilterType},
    rpc_response::RpcConfirmedTransactionStatusWithSignature,
};
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{hash::Hash, program_pack::Pack, signature::Signature, transaction::Transaction};
use solana_transaction_status_client_types::TransactionStatus;
use spl_token_interface::state::Account as TokenAccount;

use crate::mint_state::MintState;

// Token account field offsets, per the SPL account layout.
const TOKEN_ACCOUNT_MINT_OFFSET: usize = 0;
const TOKEN_ACCOUNT_OWNER_OFFSET: usize = 32;

/// A recent chain reference bounding a transaction's validity window.
#[derive(Debug, Clone, Copy)]
pub struct Checkpoint {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

/// The RPC surface the token lifecycle needs, bound to one endpoint and one
/// commitment level.
pub struct RpcContext {
    client: RpcClient,
    commitment: CommitmentConfig,
}

impl RpcContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_commitment(url, CommitmentConfig::confirmed())
    }

    pub fn with_commitment(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            client: RpcClient::new_with_commitment(url.into(), commitment),
            commitment,
        }
    }

    pub fn commitment(&self) -> CommitmentConfig {
        self.commitment
    }

    /// Fetches a fresh checkpoint. Callers must not reuse one past its
    /// validity height.
    pub async fn latest_checkpoint(&self) -> anyhow::Result<Checkpoint> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .context("Failed to fetch a recent blockhash")?;
        Ok(Checkpoint {
            blockhash,
            last_valid_block_height,
        })
    }

    pub async fn balance(&self, address: &Address) -> anyhow::Result<u64> {
        self.client
            .get_balance(address)
            .await
            .context("Failed to fetch the account balance")
    }

    pub async fn block_height(&self) -> anyhow::Result<u64> {
        self.client
            .get_block_height()
            .await
            .context("Failed to fetch the block height")
    }

    pub async fn rent_exempt_minimum(&self, data_len: usize) -> anyhow::Result<u64> {
        self.client
            .get_minimum_balance_for_rent_exemption(data_len)
            .await
            .context("Failed to fetch the rent-exempt minimum")
    }

    /// Fetches an account, `None` when it does not exist.
    pub async fn account(&self, address: &Address) -> anyhow::Result<Option<Account>> {
        Ok(self
            .client
            .get_account_with_commitment(address, self.commitment)
            .await
            .context("Failed to fetch the account")?
            .value)
    }

    /// Fetches and unpacks the mint, validating its owning token program.
    pub async fn mint_state(&self, mint: &Address) -> anyhow::Result<MintState> {
        let account = self
            .account(mint)
            .await?
            .ok_or_else(|| TokenOpError::NotFound(format!("mint {mint}")))?;
        MintState::from_account(*mint, &account)
    }

    /// Sends a signed transaction once. Retrying is the submitter's concern,
    /// so the relay's own resends are disabled.
    pub async fn send(&self, transaction: &Transaction) -> Result<Signature, ClientError> {
        self.client
            .send_transaction_with_config(
                transaction,
                RpcSendTransactionConfig {
                    preflight_commitment: Some(self.commitment.commitment),
                    max_retries: Some(0),
                    ..Default::default()
                },
            )
            .await
    }

    pub async fn signature_status(
        &self,
        signature: &Signature,
    ) -> anyhow::Result<Option<TransactionStatus>> {
        Ok(self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .context("Failed to fetch the signature status")?
            .value
            .into_iter()
            .next()
            .flatten())
    }

    pub async fn signatures_for(
        &self,
        address: &Address,
        limit: usize,
    ) -> anyhow::Result<Vec<RpcConfirmedTransactionStatusWithSignature>> {
        self.client
            .get_signatures_for_address_with_config(
                address,
                GetConfirmedSignaturesForAddress2Config {
                    limit: Some(limit),
                    ..Default::default()
                },
            )
            .await
            .context("Failed to fetch the signature history")
    }

    pub async fn token_accounts_by_owner(
        &self,
        owner: &Address,
    ) -> anyhow::Result<Vec<(Address, TokenAccount)>> {
        self.scan_token_accounts(TOKEN_ACCOUNT_OWNER_OFFSET, owner)
            .await
    }

    pub async fn token_accounts_by_mint(
        &self,
        mint: &Address,
    ) -> anyhow::Result<Vec<(Address, TokenAccount)>> {
        self.scan_token_accounts(TOKEN_ACCOUNT_MINT_OFFSET, mint)
            .await
    }

    async fn scan_token_accounts(
        &self,
        offset: usize,
        key: &Address,
    ) -> anyhow::Result<Vec<(Address, TokenAccount)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![
                RpcFilterType::DataSize(TokenAccount::LEN as u64),
                RpcFilterType::Memcmp(Memcmp::new_base58_encoded(offset, key.as_ref())),
            ]),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..Default::default()
            },
            ..Default::default()
        };

        let accounts = self
            .client
            .get_program_accounts_with_config(&TOKEN_PROGRAM_ID, config)
            .await
            .context("Failed to scan token accounts")?;

        let mut unpacked = Vec::with_capacity(accounts.len());
        for (address, account) in accounts {
            let token_account =
                TokenAccount::unpack(&account.data).context("Failed to decode a token account")?;
            unpacked.push((address, token_account));
        }
        Ok(unpacked)
    }

    /// RPC node version plus the measured round-trip time.
    pub async fn version_and_latency(&self) -> anyhow::Result<(String, Duration)> {
        let started = Instant::now();
        let version = self
            .client
            .get_version()
            .await
            .context("RPC endpoint unreachable")?;
        Ok((version.solana_core, started.elapsed()))
    }
}
