use solana_address::Address;

use crate::{
    address::parse_address,
    amount::Amount,
    authority::AuthorityKind,
    error::TokenOpError,
};

/// The mint mutations a wallet can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TokenOperation {
    CreateToken,
    MintTo,
    SetAuthority,
    RevokeAuthority,
    FreezeAccount,
    ThawAccount,
    CreateMetadata,
    UpdateMetadata,
}

/// Name, symbol, and description embedded in a metadata write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFields {
    pub name: String,
    pub symbol: String,
    pub description: String,
}

/// A fully validated, immutable description of one user action.
///
/// Constructed once per submit from an [`IntentDraft`]; every field an
/// operation requires is present and structurally valid by the time a value
/// of this type exists.
#[derive(Debug, Clone)]
pub enum TokenIntent {
    CreateToken {
        name: String,
        symbol: String,
        description: String,
        decimals: u8,
    },
    MintTo {
        mint: Address,
        recipient: Address,
        amount: Amount,
    },
    SetAuthority {
        mint: Address,
        kind: AuthorityKind,
        new_authority: Address,
    },
    RevokeAuthority {
        mint: Address,
        kind: AuthorityKind,
    },
    FreezeAccount {
        mint: Address,
        owner: Address,
    },
    ThawAccount {
        mint: Address,
        owner: Address,
    },
    CreateMetadata {
        mint: Address,
        fields: MetadataFields,
    },
    UpdateMetadata {
        mint: Address,
        fields: MetadataFields,
    },
}

impl TokenIntent {
    pub fn operation(&self) -> TokenOperation {
        match self {
            TokenIntent::CreateToken { .. } => TokenOperation::CreateToken,
            TokenIntent::MintTo { .. } => TokenOperation::MintTo,
            TokenIntent::SetAuthority { .. } => TokenOperation::SetAuthority,
            TokenIntent::RevokeAuthority { .. } => TokenOperation::RevokeAuthority,
            TokenIntent::FreezeAccount { .. } => TokenOperation::FreezeAccount,
            TokenIntent::ThawAccount { .. } => TokenOperation::ThawAccount,
            TokenIntent::CreateMetadata { .. } => TokenOperation::CreateMetadata,
            TokenIntent::UpdateMetadata { .. } => TokenOperation::UpdateMetadata,
        }
    }
}

/// Raw, possibly incomplete user input for one operation.
///
/// All fields are optional; [`IntentDraft::validate`] checks the whole draft
/// as a unit and rejects anything the operation requires but lacks, before
/// any network traffic happens.
#[derive(Debug, Default, Clone)]
pub struct IntentDraft {
    pub mint: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<String>,
    pub decimals: Option<u8>,
    pub new_authority: Option<String>,
    pub authority_kind: Option<AuthorityKind>,
    pub owner: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub description: Option<String>,
}

/// Token decimals are capped at 9, matching the creation form this replaces.
pub const MAX_DECIMALS: u8 = 9;

impl IntentDraft {
    pub fn validate(self, operation: TokenOperation) -> Result<TokenIntent, TokenOpError> {
        match operation {
            TokenOperation::CreateToken => {
                let decimals = self.decimals.unwrap_or(MAX_DECIMALS);
                if decimals > MAX_DECIMALS {
                    return Err(TokenOpError::InvalidAmount(format!(
                        "decimals {decimals}"
                    )));
                }
                Ok(TokenIntent::CreateToken {
                    name: require_text(self.name, "name")?,
                    symbol: require_text(self.symbol, "symbol")?,
                    description: require_text(self.description, "description")?,
                    decimals,
                })
            }
            TokenOperation::MintTo => Ok(TokenIntent::MintTo {
                mint: require_address(self.mint, "mint")?,
                recipient: require_address(self.recipient, "recipient")?,
                amount: Amount::parse(&require_text(self.amount, "amount")?)?,
            }),
            TokenOperation::SetAuthority => Ok(TokenIntent::SetAuthority {
                mint: require_address(self.mint, "mint")?,
                kind: require(self.authority_kind, "authority kind")?,
                new_authority: require_address(self.new_authority, "new authority")?,
            }),
            TokenOperation::RevokeAuthority => Ok(TokenIntent::RevokeAuthority {
                mint: require_address(self.mint, "mint")?,
                kind: require(self.authority_kind, "authority kind")?,
            }),
            TokenOperation::FreezeAccount => Ok(TokenIntent::FreezeAccount {
                mint: require_address(self.mint, "mint")?,
                owner: require_address(self.owner, "owner")?,
            }),
            TokenOperation::ThawAccount => Ok(TokenIntent::ThawAccount {
                mint: require_address(self.mint, "mint")?,
                owner: require_address(self.owner, "owner")?,
            }),
            TokenOperation::CreateMetadata => Ok(TokenIntent::CreateMetadata {
                mint: require_address(self.mint.clone(), "mint")?,
                fields: self.metadata_fields()?,
            }),
            TokenOperation::UpdateMetadata => Ok(TokenIntent::UpdateMetadata {
                mint: require_address(self.mint.clone(), "mint")?,
                fields: self.metadata_fields()?,
            }),
        }
    }

    fn metadata_fields(&self) -> Result<MetadataFields, TokenOpError> {
        Ok(MetadataFields {
            name: require_text(self.name.clone(), "name")?,
            symbol: require_text(self.symbol.clone(), "symbol")?,
            description: require_text(self.description.clone(), "description")?,
        })
    }
}

fn require<T>(field: Option<T>, name: &'static str) -> Result<T, TokenOpError> {
    field.ok_or(TokenOpError::MissingField(name))
}

fn require_text(field: Option<String>, name: &'static str) -> Result<String, TokenOpError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(TokenOpError::MissingField(name)),
    }
}

fn require_address(field: Option<String>, name: &'static str) -> Result<Address, TokenOpError> {
    parse_address(&require(field, name)?)
}
