//! Chain identifiers used to scope wallet sessions.
//!
//! - [`ChainId`] - A CAIP-2 compliant chain identifier (e.g., `stacks:1` for Stacks mainnet)

mod chain_id;

pub use chain_id::*;
