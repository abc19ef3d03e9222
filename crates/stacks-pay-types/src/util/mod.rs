//! Utility types.
//!
//! - [`micro_stx`] - Positive uSTX amounts and human-readable STX conversion

pub mod micro_stx;

pub use micro_stx::*;
