use mintsmith_interface::authority::Authority;
use solana_account::Account;
use solana_address::Address;
use solana_sdk::program_pack::Pack;
use spl_associated_token_account_interface::address::get_associated_token_address;
use spl_token_2022_interface::check_spl_token_program_account;
use spl_token_interface::state::Mint;

/// The on-chain mint state relevant to authority checks and amount scaling.
pub struct MintState {
    pub address: Address,
    pub token_program: Address,
    pub decimals: u8,
    pub supply: u64,
    pub mint_authority: Authority,
    pub freeze_authority: Authority,
}

impl MintState {
    /// Builds a [`MintState`] from a fetched mint account.
    ///
    /// Validates that the owner is a recognized SPL token program and unpacks
    /// the mint to extract decimals, supply, and both authorities.
    pub fn from_account(address: Address, account: &Account) -> anyhow::Result<Self> {
        check_spl_token_program_account(&account.owner)?;
        let mint = Mint::unpack(&account.data)?;
        let mint_authority: Option<Address> = mint.mint_authority.into();
        let freeze_authority: Option<Address> = mint.freeze_authority.into();
        Ok(Self {
            address,
            token_program: account.owner,
            decimals: mint.decimals,
            supply: mint.supply,
            mint_authority: mint_authority.into(),
            freeze_authority: freeze_authority.into(),
        })
    }

    /// The deterministically derived per-owner balance account for this mint.
    pub fn ata_for(&self, owner: &Address) -> Address {
        get_associated_token_address(owner, &self.address)
    }
}
