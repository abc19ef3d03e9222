//! `stacks-pay` command-line entrypoint.
//!
//! Checks configuration and validates addresses and amounts offline.
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `WALLET_CONNECT_PROJECT_ID`, `MERCHANT_ADDRESS`, `CONTRACT_ADDRESS`, `NETWORK`
//!   fill in whatever the `--config` file leaves out
//! - `RUST_LOG` sets the log filter
//! - `OTEL_*` variables enable trace export with the `telemetry` feature

use std::process;

use stacks_pay::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        println!("{e}");
        process::exit(1)
    }
}
