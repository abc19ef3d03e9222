//! Core types for Stacks payments over a wallet-connection protocol.
//!
//! This crate holds everything that is independent of a live wallet session:
//! identifiers, validated value types and the wire format of wallet RPC calls.
//! The session lifecycle and request dispatch live in the `stacks-pay` crate.
//!
//! # Modules
//!
//! - [`chain`] - CAIP-2 chain identifiers (e.g. `stacks:1`)
//! - [`config`] - Environment variable resolution for configuration values
//! - [`networks`] - The Stacks networks (`mainnet`, `testnet`, `devnet`) and their chain ids
//! - [`address`] - Network-tagged STX addresses
//! - [`validator`] - Boolean checks for addresses and amounts, applied before dispatch
//! - [`proto`] - Wallet RPC methods, request envelopes, params and results
//! - [`util`] - Amount types (`MicroStx`)

pub mod address;
pub mod chain;
pub mod config;
pub mod networks;
pub mod proto;
pub mod util;
pub mod validator;
