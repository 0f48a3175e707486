use mintsmith_interface::{
    authority::AuthorityKind,
    error::TokenOpError,
    intent::{IntentDraft, TokenIntent, TokenOperation},
};
use solana_address::Address;

fn full_draft() -> IntentDraft {
    IntentDraft {
        mint: Some(Address::new_unique().to_string()),
        recipient: Some(Address::new_unique().to_string()),
        amount: Some("12.5".to_string()),
        decimals: Some(6),
        new_authority: Some(Address::new_unique().to_string()),
        authority_kind: Some(AuthorityKind::MintTokens),
        owner: Some(Address::new_unique().to_string()),
        name: Some("Example Token".to_string()),
        symbol: Some("EXM".to_string()),
        description: Some("An example token".to_string()),
    }
}

#[test]
fn complete_drafts_validate_for_every_operation() {
    let operations = [
        TokenOperation::CreateToken,
        TokenOperation::MintTo,
        TokenOperation::SetAuthority,
        TokenOperation::RevokeAuthority,
        TokenOperation::FreezeAccount,
        TokenOperation::ThawAccount,
        TokenOperation::CreateMetadata,
        TokenOperation::UpdateMetadata,
    ];
    for operation in operations {
        let intent = full_draft().validate(operation).unwrap();
        assert_eq!(intent.operation(), operation);
    }
}

#[test]
fn missing_fields_are_rejected_per_operation() {
    let cases: [(TokenOperation, fn(&mut IntentDraft), &str); 8] = [
        (TokenOperation::CreateToken, |d| d.name = None, "name"),
        (TokenOperation::MintTo, |d| d.recipient = None, "recipient"),
        (TokenOperation::MintTo, |d| d.amount = None, "amount"),
        (
            TokenOperation::SetAuthority,
            |d| d.new_authority = None,
            "new authority",
        ),
        (
            TokenOperation::RevokeAuthority,
            |d| d.authority_kind = None,
            "authority kind",
        ),
        (TokenOperation::FreezeAccount, |d| d.owner = None, "owner"),
        (TokenOperation::ThawAccount, |d| d.mint = None, "mint"),
        (TokenOperation::UpdateMetadata, |d| d.symbol = None, "symbol"),
    ];

    for (operation, strip, field) in cases {
        let mut draft = full_draft();
        strip(&mut draft);
        match draft.validate(operation) {
            Err(TokenOpError::MissingField(name)) => assert_eq!(name, field),
            other => panic!("{operation}: expected missing `{field}`, got {other:?}"),
        }
    }
}

#[test]
fn blank_text_counts_as_missing() {
    let mut draft = full_draft();
    draft.symbol = Some("   ".to_string());
    assert!(matches!(
        draft.validate(TokenOperation::CreateToken),
        Err(TokenOpError::MissingField("symbol"))
    ));
}

#[test]
fn malformed_addresses_and_amounts_are_rejected() {
    let mut draft = full_draft();
    draft.mint = Some("not-base58!".to_string());
    assert!(matches!(
        draft.validate(TokenOperation::MintTo),
        Err(TokenOpError::InvalidAddress(_))
    ));

    let mut draft = full_draft();
    draft.amount = Some("-3".to_string());
    assert!(matches!(
        draft.validate(TokenOperation::MintTo),
        Err(TokenOpError::InvalidAmount(_))
    ));
}

#[test]
fn create_token_defaults_and_caps_decimals() {
    let mut draft = full_draft();
    draft.decimals = None;
    match draft.validate(TokenOperation::CreateToken).unwrap() {
        TokenIntent::CreateToken { decimals, .. } => assert_eq!(decimals, 9),
        other => panic!("unexpected intent {other:?}"),
    }

    let mut draft = full_draft();
    draft.decimals = Some(12);
    assert!(matches!(
        draft.validate(TokenOperation::CreateToken),
        Err(TokenOpError::InvalidAmount(_))
    ));
}
