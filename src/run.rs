//! Entry point of the `stacks-pay` command-line tool.
//!
//! The tool checks configuration and runs the validators offline. Sessions and
//! payments need a live wallet transport and are driven through [`crate::app`].

use clap::Parser;
use dotenvy::dotenv;

use stacks_pay_types::address::StxAddress;
use stacks_pay_types::util::MicroStx;

use crate::config::{CliArgs, Command, ValidatedConfig};
use crate::telemetry::Telemetry;

/// Parses CLI arguments and runs the selected command.
///
/// - Loads `.env` variables.
/// - Installs logging (and OTLP export with the `telemetry` feature).
/// - Returns an error for invalid configuration or rejected input.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _telemetry = Telemetry::new()
        .with_name(env!("CARGO_PKG_NAME"))
        .with_version(env!("CARGO_PKG_VERSION"))
        .register();

    let args = CliArgs::parse();
    match args.command {
        Command::Check => {
            let config = ValidatedConfig::load(args.config.as_deref())?;
            let chains: Vec<String> = config.chains.iter().map(|c| c.to_string()).collect();
            println!("network:  {}", config.gateway.network);
            println!("merchant: {}", config.gateway.merchant_address);
            println!("contract: {}", config.gateway.contract_address);
            println!("chains:   {}", chains.join(", "));
        }
        Command::ValidateAddress { address, network } => {
            let address = match network {
                Some(network) => StxAddress::parse(&address, network)?,
                None => address.parse::<StxAddress>()?,
            };
            println!("{} is a valid {} address", address, address.network());
        }
        Command::ValidateAmount { amount } => {
            let amount = MicroStx::parse(&amount)?;
            println!("{amount} uSTX is a valid amount");
        }
        Command::ToMicroStx { stx } => {
            let amount = MicroStx::from_stx(&stx)?;
            println!("{amount}");
        }
    }
    Ok(())
}
