//! Client-side building blocks for a test order-book exchange.
//!
//! Nothing in this crate performs I/O: it derives the program accounts the
//! exchange expects, introspects the program's declared account layouts, and
//! assembles instructions for the provisioning harness to submit.

pub mod derive;
pub mod ix;
pub mod schema;

/// Seed prefixes for every program-derived address used by the exchange.
pub mod seeds {
    pub const MARKET: &[u8] = b"Market";
    pub const OPEN_ORDERS: &[u8] = b"OpenOrders";
    pub const OPEN_ORDERS_INDEXER: &[u8] = b"OpenOrdersIndexer";
    pub const STUB_ORACLE: &[u8] = b"StubOracle";
    pub const EVENT_AUTHORITY: &[u8] = b"__event_authority";
}

pub use ix::{
    CreateMarketAccounts, CreateMarketArgs, OracleConfigParams, PlaceOrderAccounts,
    PlaceOrderArgs, PlaceOrderType, SelfTradeBehavior, Side,
};
pub use schema::{ProgramSchema, SchemaError};
