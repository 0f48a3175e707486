use chrono::Utc;
use mintsmith_interface::{
    error::TokenOpError,
    intent::{TokenIntent, TokenOperation},
};
use solana_address::Address;
use solana_sdk::signature::Signature;
use store::{TokenRecord, TokenStore};

use crate::{
    builder::{FeeConfig, InstructionBuilder},
    confirm::{ConfirmationTracker, Finality},
    logs::{log_info, log_success},
    pinata::AssetBundle,
    rpc::RpcContext,
    submit::{TransactionSubmitter, Wallet},
};

/// Outcome summary of one confirmed lifecycle flow.
pub struct Receipt {
    pub operation: TokenOperation,
    pub signature: Signature,
    pub mint: Address,
    pub asset: Option<AssetBundle>,
}

pub struct FlowContext<'a> {
    pub rpc: &'a RpcContext,
    pub wallet: &'a dyn Wallet,
    pub store: &'a TokenStore,
    pub fees: Option<FeeConfig>,
    /// Recorded alongside created tokens so histories from different
    /// clusters stay distinguishable.
    pub network: String,
}

/// Runs one user action end to end: build, submit, confirm, record.
///
/// Assets are published by the caller beforehand; a submission failure never
/// re-publishes, and the bundle stays valid for a later attempt. Steps never
/// retry across each other. Only a confirmed creation is recorded; an
/// ambiguous confirmation never is.
pub async fn execute(
    ctx: &FlowContext<'_>,
    intent: TokenIntent,
    asset: Option<AssetBundle>,
) -> anyhow::Result<Receipt> {
    let operation = intent.operation();
    let actor = ctx.wallet.address();

    let builder = InstructionBuilder::new(ctx.rpc, actor, ctx.fees);
    let built = builder.build(&intent, asset.as_ref()).await?;

    log_info(
        "Submitting",
        format!("{operation}, {} instruction(s)", built.instructions.len()),
    );
    let submitter = TransactionSubmitter::new(ctx.rpc);
    let pending = submitter.submit(ctx.wallet, &built).await?;
    log_info("Signature", pending.signature);

    let tracker = ConfirmationTracker::new(ctx.rpc);
    match tracker
        .confirm(&pending.signature, &pending.checkpoint)
        .await?
    {
        Finality::Finalized => {}
        Finality::Failed(error) => return Err(TokenOpError::OnChainExecution(error).into()),
    }
    log_success("Confirmed", pending.signature);

    if let TokenIntent::CreateToken {
        name,
        symbol,
        decimals,
        ..
    } = &intent
    {
        let record = TokenRecord {
            name: name.clone(),
            symbol: symbol.clone(),
            mint_address: built.mint.to_string(),
            decimals: *decimals,
            metadata_uri: asset
                .as_ref()
                .map(|bundle| bundle.metadata_uri.clone())
                .unwrap_or_default(),
            image_uri: asset
                .as_ref()
                .map(|bundle| bundle.image_uri.clone())
                .unwrap_or_default(),
            created_at: Utc::now(),
            network: ctx.network.clone(),
            mint_authority: Some(actor.to_string()),
            freeze_authority: Some(actor.to_string()),
            update_authority: Some(actor.to_string()),
        };
        ctx.store.save(&actor.to_string(), record)?;
    }

    Ok(Receipt {
        operation,
        signature: pending.signature,
        mint: built.mint,
        asset,
    })
}
