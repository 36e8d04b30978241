//! Instruction builders for the exchange program.
//!
//! Arguments travel in the program's anchor wire format: an 8-byte method
//! sighash followed by borsh-serialized args. The enum-like arguments (side,
//! order type, self-trade policy) are closed sum types so a malformed tag can
//! never reach the wire.

use anchor_syn::codegen::program::common::{sighash, SIGHASH_GLOBAL_NAMESPACE};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

use crate::derive;

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceOrderType {
    Limit,
    ImmediateOrCancel,
    PostOnly,
    Market,
    PostOnlySlide,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelfTradeBehavior {
    DecrementTake,
    CancelProvide,
    AbortTransaction,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug)]
pub struct OracleConfigParams {
    pub conf_filter: f32,
    pub max_staleness_slots: Option<i64>,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug)]
pub struct CreateMarketArgs {
    pub name: String,
    pub oracle_config: OracleConfigParams,
    pub quote_lot_size: i64,
    pub base_lot_size: i64,
    pub maker_fee: i64,
    pub taker_fee: i64,
    pub time_expiry: i64,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug)]
pub struct PlaceOrderArgs {
    pub side: Side,
    pub price_lots: i64,
    pub max_base_lots: i64,
    pub max_quote_lots_including_fees: i64,
    pub client_order_id: u64,
    pub order_type: PlaceOrderType,
    pub expiry_timestamp: u64,
    pub self_trade_behavior: SelfTradeBehavior,
    pub limit: u8,
}

/// Addresses referenced by `create_market` that the factory supplies; the
/// authority, vaults and event authority are derived internally.
pub struct CreateMarketAccounts {
    pub market: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
    pub event_heap: Pubkey,
    pub payer: Pubkey,
    pub base_mint: Pubkey,
    pub quote_mint: Pubkey,
    pub oracle_a: Option<Pubkey>,
    pub oracle_b: Option<Pubkey>,
    pub collect_fee_admin: Pubkey,
    pub open_orders_admin: Option<Pubkey>,
    pub consume_events_admin: Option<Pubkey>,
    pub close_market_admin: Option<Pubkey>,
}

pub struct PlaceOrderAccounts {
    pub signer: Pubkey,
    pub open_orders_account: Pubkey,
    pub open_orders_admin: Option<Pubkey>,
    pub user_token_account: Pubkey,
    pub market: Pubkey,
    pub bids: Pubkey,
    pub asks: Pubkey,
    pub event_heap: Pubkey,
    pub market_vault: Pubkey,
    pub oracle_a: Option<Pubkey>,
    pub oracle_b: Option<Pubkey>,
}

/// 8-byte anchor method discriminator for a global instruction.
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    sighash(SIGHASH_GLOBAL_NAMESPACE, name)
}

fn anchor_data<T: BorshSerialize>(name: &str, args: &T) -> Vec<u8> {
    let mut data = anchor_discriminator(name).to_vec();
    // borsh into a Vec cannot fail
    args.serialize(&mut data).unwrap();
    data
}

/// The program's convention for optional accounts: absent accounts are
/// replaced by the program's own id.
fn optional(account: Option<Pubkey>, program: &Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(account.unwrap_or(*program), false)
}

pub fn stub_oracle_create(
    program: &Pubkey,
    admin: &Pubkey,
    mint: &Pubkey,
    payer: &Pubkey,
    price: f64,
) -> (Instruction, Pubkey) {
    let oracle = derive::stub_oracle(program, admin, mint);

    #[derive(BorshSerialize)]
    struct Args {
        price: f64,
    }

    (
        Instruction {
            program_id: *program,
            accounts: vec![
                AccountMeta::new(oracle, false),
                AccountMeta::new_readonly(*mint, false),
                AccountMeta::new(*payer, true),
                AccountMeta::new_readonly(*admin, true),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data: anchor_data("stub_oracle_create", &Args { price }),
        },
        oracle,
    )
}

pub fn stub_oracle_set(program: &Pubkey, admin: &Pubkey, mint: &Pubkey, price: f64) -> Instruction {
    let oracle = derive::stub_oracle(program, admin, mint);

    #[derive(BorshSerialize)]
    struct Args {
        price: f64,
    }

    Instruction {
        program_id: *program,
        accounts: vec![
            AccountMeta::new(oracle, false),
            AccountMeta::new_readonly(*admin, true),
        ],
        data: anchor_data("stub_oracle_set", &Args { price }),
    }
}

pub fn create_market(
    program: &Pubkey,
    accounts: &CreateMarketAccounts,
    args: CreateMarketArgs,
) -> Instruction {
    let market_authority = derive::market_authority(program, &accounts.market);
    let base_vault = derive::market_vault(&market_authority, &accounts.base_mint);
    let quote_vault = derive::market_vault(&market_authority, &accounts.quote_mint);
    let event_authority = derive::event_authority(program);

    Instruction {
        program_id: *program,
        accounts: vec![
            AccountMeta::new(accounts.market, true),
            AccountMeta::new_readonly(market_authority, false),
            AccountMeta::new(accounts.bids, false),
            AccountMeta::new(accounts.asks, false),
            AccountMeta::new(accounts.event_heap, false),
            AccountMeta::new(accounts.payer, true),
            AccountMeta::new(base_vault, false),
            AccountMeta::new(quote_vault, false),
            AccountMeta::new_readonly(accounts.base_mint, false),
            AccountMeta::new_readonly(accounts.quote_mint, false),
            AccountMeta::new_readonly(system_program::ID, false),
            AccountMeta::new_readonly(spl_token::ID, false),
            AccountMeta::new_readonly(spl_associated_token_account::ID, false),
            optional(accounts.oracle_a, program),
            optional(accounts.oracle_b, program),
            AccountMeta::new_readonly(accounts.collect_fee_admin, false),
            optional(accounts.open_orders_admin, program),
            optional(accounts.consume_events_admin, program),
            optional(accounts.close_market_admin, program),
            AccountMeta::new_readonly(event_authority, false),
            AccountMeta::new_readonly(*program, false),
        ],
        data: anchor_data("create_market", &args),
    }
}

pub fn create_open_orders_indexer(
    program: &Pubkey,
    owner: &Pubkey,
    payer: &Pubkey,
) -> (Instruction, Pubkey) {
    let indexer = derive::open_orders_indexer(program, owner);

    (
        Instruction {
            program_id: *program,
            accounts: vec![
                AccountMeta::new(indexer, false),
                AccountMeta::new_readonly(*owner, true),
                AccountMeta::new(*payer, true),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data: anchor_data("create_open_orders_indexer", &()),
        },
        indexer,
    )
}

pub fn create_open_orders_account(
    program: &Pubkey,
    owner: &Pubkey,
    market: &Pubkey,
    index: u32,
    payer: &Pubkey,
    name: &str,
    delegate: Option<Pubkey>,
) -> (Instruction, Pubkey) {
    let indexer = derive::open_orders_indexer(program, owner);
    let account = derive::open_orders_account(program, owner, index);

    #[derive(BorshSerialize)]
    struct Args {
        name: String,
    }

    (
        Instruction {
            program_id: *program,
            accounts: vec![
                AccountMeta::new(account, false),
                AccountMeta::new(indexer, false),
                AccountMeta::new_readonly(*owner, true),
                optional(delegate, program),
                AccountMeta::new_readonly(*market, false),
                AccountMeta::new(*payer, true),
                AccountMeta::new_readonly(system_program::ID, false),
            ],
            data: anchor_data(
                "create_open_orders_account",
                &Args {
                    name: name.to_string(),
                },
            ),
        },
        account,
    )
}

pub fn place_order(
    program: &Pubkey,
    accounts: &PlaceOrderAccounts,
    args: PlaceOrderArgs,
) -> Instruction {
    Instruction {
        program_id: *program,
        accounts: vec![
            AccountMeta::new_readonly(accounts.signer, true),
            AccountMeta::new(accounts.open_orders_account, false),
            optional(accounts.open_orders_admin, program),
            AccountMeta::new(accounts.user_token_account, false),
            AccountMeta::new(accounts.market, false),
            AccountMeta::new(accounts.bids, false),
            AccountMeta::new(accounts.asks, false),
            AccountMeta::new(accounts.event_heap, false),
            AccountMeta::new(accounts.market_vault, false),
            optional(accounts.oracle_a, program),
            optional(accounts.oracle_b, program),
            AccountMeta::new_readonly(spl_token::ID, false),
        ],
        data: anchor_data("place_order", &args),
    }
}
