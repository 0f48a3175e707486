use anyhow::Context;
use mintsmith_interface::{
    amount::Amount,
    authority::{AuthorityKind, AuthorityRole},
    error::TokenOpError,
    intent::{MetadataFields, TokenIntent},
    metadata::{self, DataV2, MetadataAccount},
    program_ids::TOKEN_PROGRAM_ID,
};
use solana_address::Address;
use solana_instruction::Instruction;
use solana_sdk::{
    program_pack::Pack,
    signature::{Keypair, Signer},
};
use solana_system_interface::instruction::{create_account, transfer};
use spl_associated_token_account_interface::instruction::create_associated_token_account_idempotent;
// The token-2022 interface builders accept either token program id, so one
// import path covers mints owned by both.
use spl_token_2022_interface::instruction::{
    freeze_account, initialize_mint, mint_to_checked, set_authority, thaw_account, AuthorityType,
};
use spl_token_interface::state::Mint;

use crate::{mint_state::MintState, pinata::AssetBundle, rpc::RpcContext};

/// Platform fee charged on token creation, paid to the collector before the
/// mint account is funded.
#[derive(Debug, Clone, Copy)]
pub struct FeeConfig {
    pub collector: Address,
    pub lamports: u64,
}

/// Output of the instruction builder: the ordered instruction list for one
/// atomic transaction plus any freshly generated signing keys.
pub struct BuiltOperation {
    pub instructions: Vec<Instruction>,
    pub extra_signers: Vec<Keypair>,
    /// The mint the operation targets; newly generated for a creation.
    pub mint: Address,
}

pub struct InstructionBuilder<'a> {
    rpc: &'a RpcContext,
    actor: Address,
    /// Only creation charges the platform fee; other operations ignore this.
    fees: Option<FeeConfig>,
}

impl<'a> InstructionBuilder<'a> {
    pub fn new(rpc: &'a RpcContext, actor: Address, fees: Option<FeeConfig>) -> Self {
        Self { rpc, actor, fees }
    }

    /// Builds the ordered instruction list for `intent`.
    ///
    /// Authority and balance gates run against freshly fetched chain state
    /// and reject before a single instruction is produced. Operations that
    /// embed metadata require a previously published [`AssetBundle`].
    pub async fn build(
        &self,
        intent: &TokenIntent,
        asset: Option<&AssetBundle>,
    ) -> anyhow::Result<BuiltOperation> {
        match intent {
            TokenIntent::CreateToken {
                name,
                symbol,
                decimals,
                ..
            } => {
                let asset = require_asset(asset)?;
                let fees = self
                    .fees
                    .as_ref()
                    .context("The platform creation fee is not configured")?;
                let rent = self.rpc.rent_exempt_minimum(Mint::LEN).await?;
                let balance = self.rpc.balance(&self.actor).await?;

                let mint_keypair = Keypair::new();
                let mint = mint_keypair.pubkey();
                let instructions = create_token_instructions(
                    &self.actor,
                    fees,
                    &mint,
                    name,
                    symbol,
                    *decimals,
                    &asset.metadata_uri,
                    rent,
                    balance,
                )?;
                Ok(BuiltOperation {
                    instructions,
                    extra_signers: vec![mint_keypair],
                    mint,
                })
            }
            TokenIntent::MintTo {
                mint,
                recipient,
                amount,
            } => {
                let state = self.rpc.mint_state(mint).await?;
                let ata_exists = self.rpc.account(&state.ata_for(recipient)).await?.is_some();
                let instructions =
                    mint_to_instructions(&state, &self.actor, recipient, amount, ata_exists)?;
                Ok(BuiltOperation {
                    instructions,
                    extra_signers: Vec::new(),
                    mint: *mint,
                })
            }
            TokenIntent::SetAuthority {
                mint,
                kind,
                new_authority,
            } => {
                let state = self.rpc.mint_state(mint).await?;
                let instruction =
                    set_authority_instruction(&state, &self.actor, *kind, Some(new_authority))?;
                Ok(BuiltOperation {
                    instructions: vec![instruction],
                    extra_signers: Vec::new(),
                    mint: *mint,
                })
            }
            TokenIntent::RevokeAuthority { mint, kind } => {
                let state = self.rpc.mint_state(mint).await?;
                // Revocation sets the authority to none, permanently.
                let instruction = set_authority_instruction(&state, &self.actor, *kind, None)?;
                Ok(BuiltOperation {
                    instructions: vec![instruction],
                    extra_signers: Vec::new(),
                    mint: *mint,
                })
            }
            TokenIntent::FreezeAccount { mint, owner } => {
                let state = self.rpc.mint_state(mint).await?;
                let instruction = freeze_or_thaw_instruction(&state, &self.actor, owner, true)?;
                Ok(BuiltOperation {
                    instructions: vec![instruction],
                    extra_signers: Vec::new(),
                    mint: *mint,
                })
            }
            TokenIntent::ThawAccount { mint, owner } => {
                let state = self.rpc.mint_state(mint).await?;
                let instruction = freeze_or_thaw_instruction(&state, &self.actor, owner, false)?;
                Ok(BuiltOperation {
                    instructions: vec![instruction],
                    extra_signers: Vec::new(),
                    mint: *mint,
                })
            }
            TokenIntent::CreateMetadata { mint, fields } => {
                let asset = require_asset(asset)?;
                let state = self.rpc.mint_state(mint).await?;
                let instruction =
                    create_metadata_instruction(&state, &self.actor, fields, &asset.metadata_uri)?;
                Ok(BuiltOperation {
                    instructions: vec![instruction],
                    extra_signers: Vec::new(),
                    mint: *mint,
                })
            }
            TokenIntent::UpdateMetadata { mint, fields } => {
                let asset = require_asset(asset)?;
                let (metadata_address, _) = metadata::find_metadata_address(mint);
                let account = self
                    .rpc
                    .account(&metadata_address)
                    .await?
                    .ok_or_else(|| TokenOpError::NotFound(format!("metadata for mint {mint}")))?;
                let existing = MetadataAccount::from_account_data(&account.data)
                    .context("Failed to decode the metadata account")?;
                let instruction = update_metadata_instruction(
                    &existing,
                    mint,
                    &self.actor,
                    fields,
                    &asset.metadata_uri,
                )?;
                Ok(BuiltOperation {
                    instructions: vec![instruction],
                    extra_signers: Vec::new(),
                    mint: *mint,
                })
            }
        }
    }
}

fn require_asset(asset: Option<&AssetBundle>) -> Result<&AssetBundle, TokenOpError> {
    asset.ok_or(TokenOpError::MissingField("asset bundle"))
}

/// Creation order matters: the fee transfer and account funding must precede
/// initialization, and initialization must precede the metadata write.
#[allow(clippy::too_many_arguments)]
fn create_token_instructions(
    actor: &Address,
    fees: &FeeConfig,
    mint: &Address,
    name: &str,
    symbol: &str,
    decimals: u8,
    metadata_uri: &str,
    rent_exempt_minimum: u64,
    balance: u64,
) -> anyhow::Result<Vec<Instruction>> {
    let required = fees.lamports.saturating_add(rent_exempt_minimum);
    if balance < required {
        return Err(TokenOpError::InsufficientBalance {
            required,
            available: balance,
        }
        .into());
    }

    let (metadata_address, _) = metadata::find_metadata_address(mint);
    let fee_transfer = transfer(actor, &fees.collector, fees.lamports);
    let fund_mint = create_account(
        actor,
        mint,
        rent_exempt_minimum,
        Mint::LEN as u64,
        &TOKEN_PROGRAM_ID,
    );
    let init_mint = initialize_mint(&TOKEN_PROGRAM_ID, mint, actor, Some(actor), decimals)?;
    let create_metadata = metadata::create_metadata_account_v3(
        &metadata_address,
        mint,
        actor,
        actor,
        actor,
        DataV2::fungible(name.to_string(), symbol.to_string(), metadata_uri.to_string()),
        true,
    )?;

    Ok(vec![fee_transfer, fund_mint, init_mint, create_metadata])
}

fn mint_to_instructions(
    state: &MintState,
    actor: &Address,
    recipient: &Address,
    amount: &Amount,
    recipient_ata_exists: bool,
) -> anyhow::Result<Vec<Instruction>> {
    if !state.mint_authority.held_by(actor) {
        return Err(TokenOpError::AuthorityMismatch(AuthorityRole::Mint).into());
    }
    let base_units = amount.to_base_units(state.decimals)?;
    let ata = state.ata_for(recipient);

    let mut instructions = Vec::with_capacity(2);
    if !recipient_ata_exists {
        instructions.push(create_associated_token_account_idempotent(
            actor,
            recipient,
            &state.address,
            &state.token_program,
        ));
    }
    instructions.push(mint_to_checked(
        &state.token_program,
        &state.address,
        &ata,
        actor,
        &[],
        base_units,
        state.decimals,
    )?);
    Ok(instructions)
}

fn set_authority_instruction(
    state: &MintState,
    actor: &Address,
    kind: AuthorityKind,
    new_authority: Option<&Address>,
) -> anyhow::Result<Instruction> {
    let current = match kind {
        AuthorityKind::MintTokens => &state.mint_authority,
        AuthorityKind::FreezeAccount => &state.freeze_authority,
    };
    if !current.held_by(actor) {
        return Err(TokenOpError::AuthorityMismatch(kind.role()).into());
    }
    Ok(set_authority(
        &state.token_program,
        &state.address,
        new_authority,
        authority_type(kind),
        actor,
        &[],
    )?)
}

fn freeze_or_thaw_instruction(
    state: &MintState,
    actor: &Address,
    owner: &Address,
    freeze: bool,
) -> anyhow::Result<Instruction> {
    if !state.freeze_authority.held_by(actor) {
        return Err(TokenOpError::AuthorityMismatch(AuthorityRole::Freeze).into());
    }
    let ata = state.ata_for(owner);
    let instruction = if freeze {
        freeze_account(&state.token_program, &ata, &state.address, actor, &[])?
    } else {
        thaw_account(&state.token_program, &ata, &state.address, actor, &[])?
    };
    Ok(instruction)
}

fn create_metadata_instruction(
    state: &MintState,
    actor: &Address,
    fields: &MetadataFields,
    metadata_uri: &str,
) -> anyhow::Result<Instruction> {
    if !state.mint_authority.held_by(actor) {
        return Err(TokenOpError::AuthorityMismatch(AuthorityRole::Mint).into());
    }
    let (metadata_address, _) = metadata::find_metadata_address(&state.address);
    Ok(metadata::create_metadata_account_v3(
        &metadata_address,
        &state.address,
        actor,
        actor,
        actor,
        DataV2::fungible(
            fields.name.clone(),
            fields.symbol.clone(),
            metadata_uri.to_string(),
        ),
        true,
    )?)
}

/// The update authority of record lives on chain; this check fails fast, and
/// the program enforces it again at execution.
fn update_metadata_instruction(
    existing: &MetadataAccount,
    mint: &Address,
    actor: &Address,
    fields: &MetadataFields,
    metadata_uri: &str,
) -> anyhow::Result<Instruction> {
    if existing.update_authority_address() != *actor {
        return Err(TokenOpError::AuthorityMismatch(AuthorityRole::Update).into());
    }
    let (metadata_address, _) = metadata::find_metadata_address(mint);
    Ok(metadata::update_metadata_account_v2(
        &metadata_address,
        actor,
        Some(DataV2::fungible(
            fields.name.clone(),
            fields.symbol.clone(),
            metadata_uri.to_string(),
        )),
        Some(actor),
        Some(true),
    )?)
}

fn authority_type(kind: AuthorityKind) -> AuthorityType {
    match kind {
        AuthorityKind::MintTokens => AuthorityType::MintTokens,
        AuthorityKind::FreezeAccount => AuthorityType::FreezeAccount,
    }
}

#[cfg(test)]
mod tests {
    use mintsmith_interface::{
        authority::Authority,
        program_ids::{
            ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID,
        },
    };

    use super::*;

    fn mint_state(mint_authority: Authority, freeze_authority: Authority) -> MintState {
        MintState {
            address: Address::new_unique(),
            token_program: TOKEN_PROGRAM_ID,
            decimals: 6,
            supply: 0,
            mint_authority,
            freeze_authority,
        }
    }

    fn fees() -> FeeConfig {
        FeeConfig {
            collector: Address::new_unique(),
            lamports: 50_000_000,
        }
    }

    fn assert_op_error(result: anyhow::Result<impl Sized>, matcher: fn(&TokenOpError) -> bool) {
        let error = result.err().expect("expected a failure");
        let op_error = error
            .downcast_ref::<TokenOpError>()
            .expect("expected a domain error");
        assert!(matcher(op_error), "unexpected error: {op_error}");
    }

    #[test]
    fn create_token_orders_instructions_fee_first() {
        let actor = Address::new_unique();
        let mint = Address::new_unique();
        let instructions = create_token_instructions(
            &actor,
            &fees(),
            &mint,
            "Example",
            "EXM",
            9,
            "https://gateway.pinata.cloud/ipfs/QmMeta",
            1_461_600,
            100_000_000,
        )
        .unwrap();

        let programs: Vec<Address> = instructions.iter().map(|ix| ix.program_id).collect();
        assert_eq!(
            programs,
            vec![
                SYSTEM_PROGRAM_ID,
                SYSTEM_PROGRAM_ID,
                TOKEN_PROGRAM_ID,
                TOKEN_METADATA_PROGRAM_ID,
            ]
        );
    }

    #[test]
    fn create_token_rejects_balances_below_fee_plus_rent() {
        let result = create_token_instructions(
            &Address::new_unique(),
            &fees(),
            &Address::new_unique(),
            "Example",
            "EXM",
            9,
            "https://gateway.pinata.cloud/ipfs/QmMeta",
            1_461_600,
            50_000_000,
        );
        assert_op_error(result, |e| {
            matches!(
                e,
                TokenOpError::InsufficientBalance {
                    required: 51_461_600,
                    available: 50_000_000,
                }
            )
        });
    }

    #[test]
    fn mint_to_rejects_non_authority_actor() {
        let holder = Address::new_unique();
        let actor = Address::new_unique();
        let state = mint_state(Authority::Held(holder), Authority::None);
        let amount = Amount::parse("1").unwrap();

        let result = mint_to_instructions(&state, &actor, &Address::new_unique(), &amount, true);
        assert_op_error(result, |e| {
            matches!(e, TokenOpError::AuthorityMismatch(AuthorityRole::Mint))
        });
    }

    #[test]
    fn mint_to_fails_closed_when_authority_was_revoked() {
        let actor = Address::new_unique();
        let state = mint_state(Authority::None, Authority::None);
        let amount = Amount::parse("1").unwrap();

        let result = mint_to_instructions(&state, &actor, &Address::new_unique(), &amount, true);
        assert_op_error(result, |e| {
            matches!(e, TokenOpError::AuthorityMismatch(AuthorityRole::Mint))
        });
    }

    #[test]
    fn mint_to_creates_the_recipient_account_lazily() {
        let actor = Address::new_unique();
        let recipient = Address::new_unique();
        let state = mint_state(Authority::Held(actor), Authority::None);
        let amount = Amount::parse("2.5").unwrap();

        let with_existing =
            mint_to_instructions(&state, &actor, &recipient, &amount, true).unwrap();
        assert_eq!(with_existing.len(), 1);
        assert_eq!(with_existing[0].program_id, TOKEN_PROGRAM_ID);

        let with_missing =
            mint_to_instructions(&state, &actor, &recipient, &amount, false).unwrap();
        assert_eq!(with_missing.len(), 2);
        assert_eq!(with_missing[0].program_id, ASSOCIATED_TOKEN_PROGRAM_ID);
        assert_eq!(with_missing[1].program_id, TOKEN_PROGRAM_ID);
    }

    #[test]
    fn revoking_requires_holding_the_targeted_kind() {
        let actor = Address::new_unique();
        let state = mint_state(Authority::Held(actor), Authority::None);

        // Held mint authority revokes fine.
        assert!(
            set_authority_instruction(&state, &actor, AuthorityKind::MintTokens, None).is_ok()
        );

        // Freeze authority is already gone; revoking it fails closed.
        let result = set_authority_instruction(&state, &actor, AuthorityKind::FreezeAccount, None);
        assert_op_error(result, |e| {
            matches!(e, TokenOpError::AuthorityMismatch(AuthorityRole::Freeze))
        });
    }

    #[test]
    fn freeze_and_thaw_require_freeze_authority() {
        let actor = Address::new_unique();
        let owner = Address::new_unique();

        let held = mint_state(Authority::None, Authority::Held(actor));
        assert!(freeze_or_thaw_instruction(&held, &actor, &owner, true).is_ok());
        assert!(freeze_or_thaw_instruction(&held, &actor, &owner, false).is_ok());

        let revoked = mint_state(Authority::None, Authority::None);
        let result = freeze_or_thaw_instruction(&revoked, &actor, &owner, true);
        assert_op_error(result, |e| {
            matches!(e, TokenOpError::AuthorityMismatch(AuthorityRole::Freeze))
        });
    }

    #[test]
    fn metadata_update_rejects_non_update_authority() {
        use mintsmith_interface::metadata::{MetadataAccount, StoredData, METADATA_V1_KEY};

        let mint = Address::new_unique();
        let authority = Address::new_unique();
        let account = MetadataAccount {
            key: METADATA_V1_KEY,
            update_authority: authority.to_bytes(),
            mint: mint.to_bytes(),
            data: StoredData {
                name: "Example".to_string(),
                symbol: "EXM".to_string(),
                uri: "https://gateway.pinata.cloud/ipfs/QmMeta".to_string(),
                seller_fee_basis_points: 0,
                creators: None,
            },
            primary_sale_happened: false,
            is_mutable: true,
        };
        let fields = MetadataFields {
            name: "Example".to_string(),
            symbol: "EXM".to_string(),
            description: "desc".to_string(),
        };

        let stranger = Address::new_unique();
        let result = update_metadata_instruction(
            &account,
            &mint,
            &stranger,
            &fields,
            "https://gateway.pinata.cloud/ipfs/QmNew",
        );
        assert_op_error(result, |e| {
            matches!(e, TokenOpError::AuthorityMismatch(AuthorityRole::Update))
        });

        assert!(update_metadata_instruction(
            &account,
            &mint,
            &authority,
            &fields,
            "https://gateway.pinata.cloud/ipfs/QmNew",
        )
        .is_ok());
    }
}
