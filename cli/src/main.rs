//! Command line for creating, mutating, and inspecting SPL tokens.
//!
//! Every mutating subcommand runs one lifecycle flow: validate the intent,
//! publish assets when the operation embeds metadata, build and submit a
//! single atomic transaction, confirm it, and record the result locally.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use client::{
    flow::{self, FlowContext},
    inspect,
    logs::{log_divider, log_error, log_info, log_kv, log_success},
    pinata::{AssetBundle, AssetMetadata, AssetPublisher},
    rpc::RpcContext,
    submit::{LocalWallet, Wallet},
};
use mintsmith_interface::{
    address::parse_address,
    authority::AuthorityKind,
    intent::{IntentDraft, TokenOperation},
};
use store::{MetadataLookup, TokenStore};

mod env;

#[derive(Parser)]
#[command(
    name = "mintsmith",
    version,
    about = "Create and manage SPL tokens with pinned metadata"
)]
struct Cli {
    /// RPC endpoint.
    #[arg(long, global = true, default_value = "https://api.devnet.solana.com")]
    rpc_url: String,

    /// Cluster tag recorded with created tokens.
    #[arg(long, global = true, default_value = "devnet")]
    network: String,

    /// Signing keypair file. Required for commands that submit transactions.
    #[arg(long, global = true)]
    keypair: Option<PathBuf>,

    /// Directory holding the local token records.
    #[arg(long, global = true, default_value = ".mintsmith")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum AuthorityKindArg {
    Mint,
    Freeze,
}

impl From<AuthorityKindArg> for AuthorityKind {
    fn from(value: AuthorityKindArg) -> Self {
        match value {
            AuthorityKindArg::Mint => AuthorityKind::MintTokens,
            AuthorityKindArg::Freeze => AuthorityKind::FreezeAccount,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Create a token with on-chain metadata and pinned assets.
    CreateToken {
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value_t = 9)]
        decimals: u8,
        /// Image pinned to IPFS and referenced by the metadata document.
        #[arg(long)]
        image: PathBuf,
    },
    /// Mint tokens to a recipient's associated account.
    MintTo {
        #[arg(long)]
        mint: String,
        #[arg(long)]
        recipient: String,
        /// Decimal amount, scaled by the mint's decimals.
        #[arg(long)]
        amount: String,
    },
    /// Transfer mint or freeze authority to another address.
    SetAuthority {
        #[arg(long)]
        mint: String,
        #[arg(long, value_enum)]
        kind: AuthorityKindArg,
        #[arg(long)]
        new_authority: String,
    },
    /// Revoke mint or freeze authority. Irreversible.
    RevokeAuthority {
        #[arg(long)]
        mint: String,
        #[arg(long, value_enum)]
        kind: AuthorityKindArg,
    },
    /// Freeze a holder's associated token account.
    Freeze {
        #[arg(long)]
        mint: String,
        #[arg(long)]
        owner: String,
    },
    /// Thaw a holder's associated token account.
    Thaw {
        #[arg(long)]
        mint: String,
        #[arg(long)]
        owner: String,
    },
    /// Create the metadata account for an existing mint.
    CreateMetadata {
        #[arg(long)]
        mint: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        description: String,
        /// Recorded as an attribute in the pinned document.
        #[arg(long, default_value_t = 9)]
        decimals: u8,
        #[arg(long)]
        image: PathBuf,
    },
    /// Rewrite an existing metadata account. Requires update authority.
    UpdateMetadata {
        #[arg(long)]
        mint: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value_t = 9)]
        decimals: u8,
        #[arg(long)]
        image: PathBuf,
    },
    /// Show a mint's on-chain metadata, enriched with the pinned document.
    ShowMetadata {
        #[arg(long)]
        mint: String,
    },
    /// List the wallet's token accounts.
    WalletTokens,
    /// List frozen holder accounts of a mint.
    FrozenAccounts {
        #[arg(long)]
        mint: String,
    },
    /// Recent transactions involving the wallet.
    History,
    /// Locally recorded tokens, newest first.
    List {
        /// Substring match on name, symbol, or mint.
        #[arg(long)]
        search: Option<String>,
        /// Restrict to one cluster tag.
        #[arg(long)]
        tag: Option<String>,
    },
    /// Remove a locally recorded token.
    Remove {
        #[arg(long)]
        mint: String,
    },
    /// Recent metadata lookups, newest first.
    Lookups,
    /// RPC endpoint version and latency.
    Status,
}

struct App {
    rpc_url: String,
    network: String,
    keypair: Option<PathBuf>,
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let app = App {
        rpc_url: cli.rpc_url,
        network: cli.network,
        keypair: cli.keypair,
        data_dir: cli.data_dir,
    };
    if let Err(error) = run(&app, cli.command).await {
        log_error("Failed", format!("{error:#}"));
        std::process::exit(1);
    }
}

async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::CreateToken {
            name,
            symbol,
            description,
            decimals,
            image,
        } => {
            let metadata = AssetMetadata {
                name: name.clone(),
                symbol: symbol.clone(),
                description: description.clone(),
                decimals,
            };
            let draft = IntentDraft {
                name: Some(name),
                symbol: Some(symbol),
                description: Some(description),
                decimals: Some(decimals),
                ..Default::default()
            };
            run_flow(app, TokenOperation::CreateToken, draft, Some((image, metadata))).await
        }
        Command::MintTo {
            mint,
            recipient,
            amount,
        } => {
            let draft = IntentDraft {
                mint: Some(mint),
                recipient: Some(recipient),
                amount: Some(amount),
                ..Default::default()
            };
            run_flow(app, TokenOperation::MintTo, draft, None).await
        }
        Command::SetAuthority {
            mint,
            kind,
            new_authority,
        } => {
            let draft = IntentDraft {
                mint: Some(mint),
                authority_kind: Some(kind.into()),
                new_authority: Some(new_authority),
                ..Default::default()
            };
            run_flow(app, TokenOperation::SetAuthority, draft, None).await
        }
        Command::RevokeAuthority { mint, kind } => {
            let draft = IntentDraft {
                mint: Some(mint),
                authority_kind: Some(kind.into()),
                ..Default::default()
            };
            run_flow(app, TokenOperation::RevokeAuthority, draft, None).await
        }
        Command::Freeze { mint, owner } => {
            let draft = IntentDraft {
                mint: Some(mint),
                owner: Some(owner),
                ..Default::default()
            };
            run_flow(app, TokenOperation::FreezeAccount, draft, None).await
        }
        Command::Thaw { mint, owner } => {
            let draft = IntentDraft {
                mint: Some(mint),
                owner: Some(owner),
                ..Default::default()
            };
            run_flow(app, TokenOperation::ThawAccount, draft, None).await
        }
        Command::CreateMetadata {
            mint,
            name,
            symbol,
            description,
            decimals,
            image,
        } => {
            let metadata = AssetMetadata {
                name: name.clone(),
                symbol: symbol.clone(),
                description: description.clone(),
                decimals,
            };
            let draft = IntentDraft {
                mint: Some(mint),
                name: Some(name),
                symbol: Some(symbol),
                description: Some(description),
                ..Default::default()
            };
            run_flow(app, TokenOperation::CreateMetadata, draft, Some((image, metadata))).await
        }
        Command::UpdateMetadata {
            mint,
            name,
            symbol,
            description,
            decimals,
            image,
        } => {
            let metadata = AssetMetadata {
                name: name.clone(),
                symbol: symbol.clone(),
                description: description.clone(),
                decimals,
            };
            let draft = IntentDraft {
                mint: Some(mint),
                name: Some(name),
                symbol: Some(symbol),
                description: Some(description),
                ..Default::default()
            };
            run_flow(app, TokenOperation::UpdateMetadata, draft, Some((image, metadata))).await
        }
        Command::ShowMetadata { mint } => show_metadata(app, &mint).await,
        Command::WalletTokens => wallet_tokens(app).await,
        Command::FrozenAccounts { mint } => frozen_accounts(app, &mint).await,
        Command::History => history(app).await,
        Command::List { search, tag } => list_records(app, search, tag),
        Command::Remove { mint } => remove_record(app, &mint),
        Command::Lookups => list_lookups(app),
        Command::Status => status(app).await,
    }
}

async fn run_flow(
    app: &App,
    operation: TokenOperation,
    draft: IntentDraft,
    asset_source: Option<(PathBuf, AssetMetadata)>,
) -> anyhow::Result<()> {
    // Validate as a unit before touching the gateway or the network.
    let intent = draft.validate(operation)?;

    let wallet = load_wallet(app.keypair.as_ref())?;
    let rpc = RpcContext::new(app.rpc_url.clone());
    let store = TokenStore::open(&app.data_dir)?;
    let fees = match operation {
        TokenOperation::CreateToken => Some(env::fee_config()?),
        _ => None,
    };

    let asset = match asset_source {
        Some((image, metadata)) => Some(publish_assets(&image, metadata).await?),
        None => None,
    };

    let ctx = FlowContext {
        rpc: &rpc,
        wallet: &wallet,
        store: &store,
        fees,
        network: app.network.clone(),
    };
    let receipt = flow::execute(&ctx, intent, asset).await?;

    log_divider();
    log_success("Completed", receipt.operation);
    log_kv("mint", receipt.mint);
    log_kv("signature", receipt.signature);
    if let Some(bundle) = &receipt.asset {
        log_kv("metadata uri", &bundle.metadata_uri);
        log_kv("image uri", &bundle.image_uri);
    }
    Ok(())
}

async fn publish_assets(image: &Path, metadata: AssetMetadata) -> anyhow::Result<AssetBundle> {
    let publisher = AssetPublisher::new(env::pinata_credentials()?);
    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read the image file {}", image.display()))?;
    let file_name = image
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("token-image");

    log_info("Publishing", "uploading the image and metadata document");
    publisher.publish(file_name, bytes, &metadata).await
}

async fn show_metadata(app: &App, mint: &str) -> anyhow::Result<()> {
    let mint = parse_address(mint)?;
    let rpc = RpcContext::new(app.rpc_url.clone());
    let http = reqwest::Client::new();

    let view = inspect::token_metadata(&rpc, &http, &mint).await?;
    log_success("Metadata", view.mint);
    log_kv("name", &view.name);
    log_kv("symbol", &view.symbol);
    log_kv("uri", &view.uri);
    log_kv("update authority", view.update_authority);
    log_kv("mutable", view.is_mutable);
    match &view.off_chain {
        Some(document) => {
            if let Some(description) = document.get("description").and_then(|v| v.as_str()) {
                log_kv("description", description);
            }
            if let Some(image) = document.get("image").and_then(|v| v.as_str()) {
                log_kv("image", image);
            }
        }
        None => log_info(
            "Note",
            "off-chain document unavailable; showing on-chain fields only",
        ),
    }

    // History is owner-scoped, so it is only recorded with a wallet present.
    if let Some(path) = &app.keypair {
        let wallet = load_wallet(Some(path))?;
        let store = TokenStore::open(&app.data_dir)?;
        store.push_lookup(
            &wallet.address().to_string(),
            MetadataLookup {
                mint_address: mint.to_string(),
                name: view.name.clone(),
                symbol: view.symbol.clone(),
                uri: view.uri.clone(),
                looked_up_at: Utc::now(),
            },
        )?;
    }
    Ok(())
}

async fn wallet_tokens(app: &App) -> anyhow::Result<()> {
    let wallet = load_wallet(app.keypair.as_ref())?;
    let rpc = RpcContext::new(app.rpc_url.clone());

    let tokens = inspect::wallet_tokens(&rpc, &wallet.address()).await?;
    log_info("Token accounts", tokens.len());
    for token in tokens {
        let frozen = if token.frozen { " (frozen)" } else { "" };
        log_kv(token.mint, format!("{} base units{frozen}", token.amount));
    }
    Ok(())
}

async fn frozen_accounts(app: &App, mint: &str) -> anyhow::Result<()> {
    let mint = parse_address(mint)?;
    let rpc = RpcContext::new(app.rpc_url.clone());

    let accounts = inspect::frozen_accounts(&rpc, &mint).await?;
    log_info("Frozen accounts", accounts.len());
    for account in accounts {
        log_kv(
            account.address,
            format!("owner {}, {} base units", account.owner, account.amount),
        );
    }
    Ok(())
}

async fn history(app: &App) -> anyhow::Result<()> {
    const HISTORY_LIMIT: usize = 10;

    let wallet = load_wallet(app.keypair.as_ref())?;
    let rpc = RpcContext::new(app.rpc_url.clone());

    let entries = inspect::recent_transactions(&rpc, &wallet.address(), HISTORY_LIMIT).await?;
    log_info("Transactions", entries.len());
    for entry in entries {
        let status = if entry.err.is_some() { "failed" } else { "ok" };
        let when = entry
            .block_time
            .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "unknown time".to_string());
        log_kv(entry.signature, format!("slot {}, {status}, {when}", entry.slot));
    }
    Ok(())
}

fn list_records(app: &App, search: Option<String>, tag: Option<String>) -> anyhow::Result<()> {
    let wallet = load_wallet(app.keypair.as_ref())?;
    let store = TokenStore::open(&app.data_dir)?;

    let records: Vec<_> = store
        .list(&wallet.address().to_string())?
        .into_iter()
        .filter(|record| tag.as_ref().is_none_or(|t| &record.network == t))
        .filter(|record| {
            search.as_ref().is_none_or(|needle| {
                let needle = needle.to_lowercase();
                record.name.to_lowercase().contains(&needle)
                    || record.symbol.to_lowercase().contains(&needle)
                    || record.mint_address.to_lowercase().contains(&needle)
            })
        })
        .collect();

    log_info("Records", records.len());
    for record in records {
        log_kv(
            &record.mint_address,
            format!(
                "{} ({}), {} decimals, {}, created {}",
                record.name,
                record.symbol,
                record.decimals,
                record.network,
                record.created_at.to_rfc3339(),
            ),
        );
    }
    Ok(())
}

fn remove_record(app: &App, mint: &str) -> anyhow::Result<()> {
    let mint = parse_address(mint)?;
    let wallet = load_wallet(app.keypair.as_ref())?;
    let store = TokenStore::open(&app.data_dir)?;

    if store.remove(&wallet.address().to_string(), &mint.to_string())? {
        log_success("Removed", mint);
    } else {
        log_info("Removed", "nothing matched");
    }
    Ok(())
}

fn list_lookups(app: &App) -> anyhow::Result<()> {
    let wallet = load_wallet(app.keypair.as_ref())?;
    let store = TokenStore::open(&app.data_dir)?;

    let lookups = store.lookups(&wallet.address().to_string())?;
    log_info("Lookups", lookups.len());
    for lookup in lookups {
        log_kv(
            &lookup.mint_address,
            format!(
                "{} ({}), {}",
                lookup.name,
                lookup.symbol,
                lookup.looked_up_at.to_rfc3339(),
            ),
        );
    }
    Ok(())
}

async fn status(app: &App) -> anyhow::Result<()> {
    let rpc = RpcContext::new(app.rpc_url.clone());
    let (version, latency) = rpc.version_and_latency().await?;
    log_success("RPC", &app.rpc_url);
    log_kv("version", version);
    log_kv("latency", format!("{} ms", latency.as_millis()));
    Ok(())
}

fn load_wallet(path: Option<&PathBuf>) -> anyhow::Result<LocalWallet> {
    let path = path.ok_or_else(|| anyhow::anyhow!("--keypair is required for this command"))?;
    let keypair = solana_keypair::read_keypair_file(path)
        .map_err(|e| anyhow::anyhow!("Failed to read the keypair file {}: {e}", path.display()))?;
    Ok(LocalWallet::new(keypair))
}
