use solana_address::Address;

/// Permission over a specific mint mutation.
///
/// Absence means "no one holds this capability", so any comparison against
/// `None` fails closed. Revoking an authority moves it to `None` permanently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {
    None,
    Held(Address),
}

impl Authority {
    /// Whether `actor` is the current holder. `None` never matches.
    pub fn held_by(&self, actor: &Address) -> bool {
        match self {
            Authority::Held(holder) => holder == actor,
            Authority::None => false,
        }
    }

    pub fn holder(&self) -> Option<&Address> {
        match self {
            Authority::Held(holder) => Some(holder),
            Authority::None => None,
        }
    }
}

impl From<Option<Address>> for Authority {
    fn from(value: Option<Address>) -> Self {
        match value {
            Some(address) => Authority::Held(address),
            None => Authority::None,
        }
    }
}

impl core::fmt::Display for Authority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Authority::Held(holder) => write!(f, "{holder}"),
            Authority::None => write!(f, "(none)"),
        }
    }
}

/// The two mint-level authority kinds a wallet can transfer or revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum AuthorityKind {
    MintTokens,
    FreezeAccount,
}

impl AuthorityKind {
    pub fn role(&self) -> AuthorityRole {
        match self {
            AuthorityKind::MintTokens => AuthorityRole::Mint,
            AuthorityKind::FreezeAccount => AuthorityRole::Freeze,
        }
    }
}

/// Names an authority in user-facing failure messages. Wider than
/// [`AuthorityKind`]: metadata updates are gated by a third, program-owned
/// authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum AuthorityRole {
    Mint,
    Freeze,
    Update,
}
