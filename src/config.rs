//! Configuration for the payment application.
//!
//! Values come from an optional JSON file (`--config`, or `$CONFIG`), falling
//! back to environment variables for anything the file leaves out:
//!
//! ```json
//! {
//!   "project_id": "$WALLET_CONNECT_PROJECT_ID",
//!   "merchant_address": "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4",
//!   "contract_address": "${CONTRACT_ADDRESS}",
//!   "network": "testnet",
//!   "chains": ["stacks:1", "stacks:2147483647"]
//! }
//! ```
//!
//! Every missing required value is reported in a single [`ConfigError::Missing`].

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use stacks_pay_types::address::{StxAddress, StxAddressError};
use stacks_pay_types::chain::{ChainId, STACKS_NAMESPACE};
use stacks_pay_types::config::LiteralOrEnv;
use stacks_pay_types::networks::{Network, UnknownNetworkError, default_session_chains};

use crate::gateway::GatewayConfig;
use crate::transport::ProjectId;

pub const ENV_PROJECT_ID: &str = "WALLET_CONNECT_PROJECT_ID";
pub const ENV_MERCHANT_ADDRESS: &str = "MERCHANT_ADDRESS";
pub const ENV_CONTRACT_ADDRESS: &str = "CONTRACT_ADDRESS";
pub const ENV_NETWORK: &str = "NETWORK";

/// CLI arguments for the `stacks-pay` tool.
#[derive(Parser, Debug)]
#[command(name = "stacks-pay")]
#[command(about = "STX payments over a wallet-connection session")]
pub struct CliArgs {
    /// Path to the JSON configuration file
    #[arg(long, short, env = "CONFIG")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load and validate the configuration, then print a summary
    Check,
    /// Check that an address is a valid STX address
    ValidateAddress {
        address: String,
        /// Network to check against; inferred from the prefix when omitted
        #[arg(long)]
        network: Option<Network>,
    },
    /// Check that an amount is a positive integer number of uSTX
    ValidateAmount { amount: String },
    /// Convert an STX amount (up to 6 decimals) to uSTX
    ToMicroStx { stx: String },
}

/// Configuration as read from the file, before environment fallbacks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    project_id: Option<LiteralOrEnv<String>>,
    merchant_address: Option<LiteralOrEnv<String>>,
    contract_address: Option<LiteralOrEnv<String>>,
    network: Option<LiteralOrEnv<Network>>,
    chains: Option<Vec<ChainId>>,
}

/// Configuration ready to start the application with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub project_id: ProjectId,
    pub gateway: GatewayConfig,
    /// Chains announced when approving a session.
    pub chains: Vec<ChainId>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {0}: {1}")]
    FileRead(PathBuf, std::io::Error),
    #[error("Failed to parse config file: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error(transparent)]
    InvalidNetwork(#[from] UnknownNetworkError),
    #[error("Invalid merchant address: {0}")]
    MerchantAddress(#[source] StxAddressError),
    #[error("Chain {0} is not a Stacks chain")]
    UnsupportedChain(ChainId),
}

impl RawConfig {
    /// Reads a config file. `None` yields an empty config, leaving every value
    /// to the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(RawConfig::default());
        };
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Applies environment fallbacks through `env` and validates the result.
    pub fn validate<F>(self, env: F) -> Result<ValidatedConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |value: Option<LiteralOrEnv<String>>, key: &str| {
            value
                .map(LiteralOrEnv::into_inner)
                .or_else(|| env(key))
                .filter(|v| !v.trim().is_empty())
        };

        let project_id = lookup(self.project_id, ENV_PROJECT_ID);
        let merchant_address = lookup(self.merchant_address, ENV_MERCHANT_ADDRESS);
        let contract_address = lookup(self.contract_address, ENV_CONTRACT_ADDRESS);

        let mut missing = Vec::new();
        if project_id.is_none() {
            missing.push(ENV_PROJECT_ID);
        }
        if merchant_address.is_none() {
            missing.push(ENV_MERCHANT_ADDRESS);
        }
        if contract_address.is_none() {
            missing.push(ENV_CONTRACT_ADDRESS);
        }
        let (Some(project_id), Some(merchant_address), Some(contract_address)) =
            (project_id, merchant_address, contract_address)
        else {
            return Err(ConfigError::Missing(missing));
        };

        let network = match self.network {
            Some(network) => network.into_inner(),
            None => match env(ENV_NETWORK).filter(|v| !v.trim().is_empty()) {
                Some(value) => value.parse()?,
                None => Network::default(),
            },
        };
        let merchant_address = StxAddress::parse(merchant_address.trim(), network)
            .map_err(ConfigError::MerchantAddress)?;

        let chains = self.chains.unwrap_or_else(default_session_chains);
        if let Some(chain) = chains.iter().find(|c| c.namespace() != STACKS_NAMESPACE) {
            return Err(ConfigError::UnsupportedChain(chain.clone()));
        }

        Ok(ValidatedConfig {
            project_id: ProjectId::new(project_id),
            gateway: GatewayConfig {
                merchant_address,
                contract_address,
                network,
            },
            chains,
        })
    }
}

impl ValidatedConfig {
    /// Loads the file at `path` (if any) and resolves fallbacks from the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        RawConfig::load(path)?.validate(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const MERCHANT: &str = "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4";

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn raw(json: serde_json::Value) -> RawConfig {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_missing_keys_are_aggregated() {
        let error = RawConfig::default().validate(env(&[])).unwrap_err();
        match error {
            ConfigError::Missing(keys) => assert_eq!(
                keys,
                vec![ENV_PROJECT_ID, ENV_MERCHANT_ADDRESS, ENV_CONTRACT_ADDRESS]
            ),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let error = raw(serde_json::json!({ "project_id": " " }))
            .validate(env(&[(ENV_MERCHANT_ADDRESS, MERCHANT)]))
            .unwrap_err();
        assert!(matches!(error, ConfigError::Missing(keys) if keys == vec![ENV_PROJECT_ID, ENV_CONTRACT_ADDRESS]));
    }

    #[test]
    fn test_env_fallbacks_and_default_network() {
        let config = RawConfig::default()
            .validate(env(&[
                (ENV_PROJECT_ID, "project"),
                (ENV_MERCHANT_ADDRESS, MERCHANT),
                (ENV_CONTRACT_ADDRESS, "ST1.gateway"),
            ]))
            .unwrap();
        assert_eq!(config.project_id.as_str(), "project");
        assert_eq!(config.gateway.network, Network::Testnet);
        assert_eq!(config.gateway.merchant_address.as_str(), MERCHANT);
        assert_eq!(config.gateway.contract_address, "ST1.gateway");
        assert_eq!(config.chains, default_session_chains());
    }

    #[test]
    fn test_file_values_take_precedence() {
        let config = raw(serde_json::json!({
            "project_id": "from-file",
            "merchant_address": MERCHANT,
            "contract_address": "ST1.file",
            "network": "devnet",
            "chains": ["stacks:2147483647"],
        }))
        .validate(env(&[(ENV_PROJECT_ID, "from-env"), (ENV_NETWORK, "mainnet")]))
        .unwrap();
        assert_eq!(config.project_id.as_str(), "from-file");
        assert_eq!(config.gateway.network, Network::Devnet);
        assert_eq!(config.chains, vec![ChainId::stacks(2147483647)]);
    }

    #[test]
    fn test_merchant_must_match_network() {
        let error = RawConfig::default()
            .validate(env(&[
                (ENV_PROJECT_ID, "p"),
                (ENV_MERCHANT_ADDRESS, MERCHANT),
                (ENV_CONTRACT_ADDRESS, "c"),
                (ENV_NETWORK, "mainnet"),
            ]))
            .unwrap_err();
        assert!(matches!(error, ConfigError::MerchantAddress(_)));
    }

    #[test]
    fn test_unknown_network() {
        let error = RawConfig::default()
            .validate(env(&[
                (ENV_PROJECT_ID, "p"),
                (ENV_MERCHANT_ADDRESS, MERCHANT),
                (ENV_CONTRACT_ADDRESS, "c"),
                (ENV_NETWORK, "regtest"),
            ]))
            .unwrap_err();
        assert!(matches!(error, ConfigError::InvalidNetwork(_)));
    }

    #[test]
    fn test_non_stacks_chain_is_rejected() {
        let error = raw(serde_json::json!({ "chains": ["eip155:1"] }))
            .validate(env(&[
                (ENV_PROJECT_ID, "p"),
                (ENV_MERCHANT_ADDRESS, MERCHANT),
                (ENV_CONTRACT_ADDRESS, "c"),
            ]))
            .unwrap_err();
        assert!(matches!(error, ConfigError::UnsupportedChain(_)));
    }

    #[test]
    fn test_missing_file() {
        let error = RawConfig::load(Some(Path::new("/nonexistent/stacks-pay.json"))).unwrap_err();
        assert!(matches!(error, ConfigError::FileRead(..)));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = CliArgs::parse_from([
            "stacks-pay",
            "validate-address",
            MERCHANT,
            "--network",
            "testnet",
        ]);
        match args.command {
            Command::ValidateAddress { address, network } => {
                assert_eq!(address, MERCHANT);
                assert_eq!(network, Some(Network::Testnet));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
