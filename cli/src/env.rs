//! Environment-derived settings: pinning credentials and the platform fee.

use anyhow::Context;
use client::{builder::FeeConfig, pinata::PinataCredentials};
use mintsmith_interface::address::parse_address;

const PINATA_API_KEY: &str = "PINATA_API_KEY";
const PINATA_SECRET_KEY: &str = "PINATA_SECRET_API_KEY";
const FEE_COLLECTOR: &str = "MINTSMITH_FEE_COLLECTOR";
const FEE_LAMPORTS: &str = "MINTSMITH_FEE_LAMPORTS";

/// Default creation fee: 0.05 SOL.
const DEFAULT_FEE_LAMPORTS: u64 = 50_000_000;

pub fn pinata_credentials() -> anyhow::Result<PinataCredentials> {
    Ok(PinataCredentials {
        api_key: std::env::var(PINATA_API_KEY)
            .with_context(|| format!("{PINATA_API_KEY} is not set"))?,
        secret_key: std::env::var(PINATA_SECRET_KEY)
            .with_context(|| format!("{PINATA_SECRET_KEY} is not set"))?,
    })
}

pub fn fee_config() -> anyhow::Result<FeeConfig> {
    let collector = std::env::var(FEE_COLLECTOR)
        .with_context(|| format!("{FEE_COLLECTOR} is not set"))?;
    let lamports = match std::env::var(FEE_LAMPORTS) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{FEE_LAMPORTS} must be a lamport count"))?,
        Err(_) => DEFAULT_FEE_LAMPORTS,
    };
    Ok(FeeConfig {
        collector: parse_address(&collector)?,
        lamports,
    })
}
