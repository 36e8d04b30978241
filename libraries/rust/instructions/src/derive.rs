//! PDA derivation functions for the exchange program.
//!
//! All addresses are deterministic in their seeds and the program id; calling
//! any of these twice with the same inputs yields the same address. A failed
//! bump search panics inside [`Pubkey::find_program_address`], which indicates
//! a seed-design bug rather than a runtime condition.

use solana_sdk::pubkey::Pubkey;
use spl_associated_token_account::get_associated_token_address;

use crate::seeds;

/// The authority PDA that owns a market's custody vaults. Never signs.
pub fn market_authority(program: &Pubkey, market: &Pubkey) -> Pubkey {
    exchange_address(program, &[seeds::MARKET, market.as_ref()])
}

/// A user's root account enumerating their per-market open-orders accounts.
pub fn open_orders_indexer(program: &Pubkey, owner: &Pubkey) -> Pubkey {
    exchange_address(program, &[seeds::OPEN_ORDERS_INDEXER, owner.as_ref()])
}

/// A per-market order-tracking account. `index` is 1-based and must match the
/// account's position in the owner's indexer.
pub fn open_orders_account(program: &Pubkey, owner: &Pubkey, index: u32) -> Pubkey {
    exchange_address(
        program,
        &[
            seeds::OPEN_ORDERS,
            owner.as_ref(),
            &index.to_le_bytes(),
        ],
    )
}

/// Stub oracle for one (admin, mint) pair.
pub fn stub_oracle(program: &Pubkey, admin: &Pubkey, mint: &Pubkey) -> Pubkey {
    exchange_address(
        program,
        &[seeds::STUB_ORACLE, admin.as_ref(), mint.as_ref()],
    )
}

/// The program's global event authority, independent of any market.
pub fn event_authority(program: &Pubkey) -> Pubkey {
    exchange_address(program, &[seeds::EVENT_AUTHORITY])
}

/// Custody vault for one asset side of a market. The standard associated-token
/// rule already permits the off-curve market authority as owner.
pub fn market_vault(market_authority: &Pubkey, mint: &Pubkey) -> Pubkey {
    get_associated_token_address(market_authority, mint)
}

pub fn exchange_address(program: &Pubkey, seeds: &[&[u8]]) -> Pubkey {
    Pubkey::find_program_address(seeds, program).0
}
