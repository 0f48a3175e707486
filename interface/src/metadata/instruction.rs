use borsh::{BorshDeserialize, BorshSerialize};
use solana_address::Address;
use solana_instruction::{AccountMeta, Instruction};

use crate::program_ids::{RENT_SYSVAR_ID, SYSTEM_PROGRAM_ID, TOKEN_METADATA_PROGRAM_ID};

// Instruction discriminators, per the token-metadata program's layout.
const CREATE_METADATA_ACCOUNT_V3: u8 = 33;
const UPDATE_METADATA_ACCOUNT_V2: u8 = 15;

/// A creator share entry. The fungible lifecycle never attaches creators,
/// but the wire layout still carries the option tag.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub address: [u8; 32],
    pub verified: bool,
    pub share: u8,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub verified: bool,
    pub key: [u8; 32],
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Uses {
    pub use_method: u8,
    pub remaining: u64,
    pub total: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum CollectionDetails {
    V1 { size: u64 },
}

/// On-chain metadata content for a mint.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct DataV2 {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

impl DataV2 {
    /// Content for a plain fungible token: no royalties, creators,
    /// collection, or uses.
    pub fn fungible(name: String, symbol: String, uri: String) -> Self {
        Self {
            name,
            symbol,
            uri,
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        }
    }
}

#[derive(BorshSerialize)]
struct CreateMetadataAccountArgsV3 {
    data: DataV2,
    is_mutable: bool,
    collection_details: Option<CollectionDetails>,
}

#[derive(BorshSerialize)]
struct UpdateMetadataAccountArgsV2 {
    data: Option<DataV2>,
    update_authority: Option<[u8; 32]>,
    primary_sale_happened: Option<bool>,
    is_mutable: Option<bool>,
}

fn instruction_data<T: BorshSerialize>(discriminator: u8, args: &T) -> borsh::io::Result<Vec<u8>> {
    let mut data = vec![discriminator];
    args.serialize(&mut data)?;
    Ok(data)
}

/// Builds the create-metadata instruction for `mint`.
///
/// `metadata` must be the address derived by
/// [`find_metadata_address`](super::find_metadata_address); the mint
/// authority signs, and `payer` funds the account.
pub fn create_metadata_account_v3(
    metadata: &Address,
    mint: &Address,
    mint_authority: &Address,
    payer: &Address,
    update_authority: &Address,
    data: DataV2,
    is_mutable: bool,
) -> borsh::io::Result<Instruction> {
    let args = CreateMetadataAccountArgsV3 {
        data,
        is_mutable,
        collection_details: None,
    };
    Ok(Instruction {
        program_id: TOKEN_METADATA_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*metadata, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*mint_authority, true),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(*update_authority, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
        ],
        data: instruction_data(CREATE_METADATA_ACCOUNT_V3, &args)?,
    })
}

/// Builds the update-metadata instruction. Only the update authority may
/// sign; the program rejects anything else regardless of what was checked
/// client-side.
pub fn update_metadata_account_v2(
    metadata: &Address,
    update_authority: &Address,
    new_data: Option<DataV2>,
    new_update_authority: Option<&Address>,
    is_mutable: Option<bool>,
) -> borsh::io::Result<Instruction> {
    let args = UpdateMetadataAccountArgsV2 {
        data: new_data,
        update_authority: new_update_authority.map(|authority| authority.to_bytes()),
        primary_sale_happened: None,
        is_mutable,
    };
    Ok(Instruction {
        program_id: TOKEN_METADATA_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*metadata, false),
            AccountMeta::new_readonly(*update_authority, true),
        ],
        data: instruction_data(UPDATE_METADATA_ACCOUNT_V2, &args)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::find_metadata_address;

    fn sample_data() -> DataV2 {
        DataV2::fungible(
            "Example".to_string(),
            "EXM".to_string(),
            "https://gateway.pinata.cloud/ipfs/QmExample".to_string(),
        )
    }

    #[test]
    fn create_instruction_layout() {
        let mint = Address::new_unique();
        let actor = Address::new_unique();
        let (metadata, _) = find_metadata_address(&mint);

        let instruction =
            create_metadata_account_v3(&metadata, &mint, &actor, &actor, &actor, sample_data(), true)
                .unwrap();

        assert_eq!(instruction.program_id, TOKEN_METADATA_PROGRAM_ID);
        assert_eq!(instruction.data[0], CREATE_METADATA_ACCOUNT_V3);
        assert_eq!(instruction.accounts.len(), 7);
        // Metadata account and payer are writable; mint authority, payer, and
        // update authority sign.
        assert!(instruction.accounts[0].is_writable);
        assert!(!instruction.accounts[0].is_signer);
        assert!(instruction.accounts[2].is_signer);
        assert!(instruction.accounts[3].is_writable && instruction.accounts[3].is_signer);
        assert!(instruction.accounts[4].is_signer);
    }

    #[test]
    fn update_instruction_layout() {
        let mint = Address::new_unique();
        let authority = Address::new_unique();
        let (metadata, _) = find_metadata_address(&mint);

        let instruction = update_metadata_account_v2(
            &metadata,
            &authority,
            Some(sample_data()),
            Some(&authority),
            Some(true),
        )
        .unwrap();

        assert_eq!(instruction.data[0], UPDATE_METADATA_ACCOUNT_V2);
        assert_eq!(instruction.accounts.len(), 2);
        assert!(instruction.accounts[0].is_writable);
        assert!(instruction.accounts[1].is_signer);
    }

    #[test]
    fn data_round_trips_through_borsh() {
        let data = sample_data();
        let bytes = borsh::to_vec(&data).unwrap();
        let decoded = DataV2::try_from_slice(&bytes).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn absent_options_encode_as_single_zero_tags() {
        let data = sample_data();
        let bytes = borsh::to_vec(&data).unwrap();
        // creators, collection, uses: one zero byte each at the tail.
        assert_eq!(&bytes[bytes.len() - 3..], &[0, 0, 0]);
    }
}
