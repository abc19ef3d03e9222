//! Params and results of the wallet RPC methods.
//!
//! Field names follow the wallet's camelCase wire format.

use serde::{Deserialize, Serialize};

use crate::networks::Network;

/// Params of `stx_getAddresses`. The wallet expects an empty object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAddressesParams {}

/// One account exposed by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StacksAddress {
    pub symbol: String,
    pub address: String,
}

/// Result of `stx_getAddresses`. A result object without `addresses` is read
/// as an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAddressesResult {
    #[serde(default)]
    pub addresses: Vec<StacksAddress>,
}

/// Params of `stx_transferStx`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStxParams {
    pub sender: String,
    pub recipient: String,
    /// Amount in uSTX, as a decimal string.
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    pub network: Network,
}

/// Result of a broadcast: `stx_transferStx` and `stx_callContract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub txid: String,
    /// Serialized transaction as returned by the wallet.
    #[serde(rename = "transaction")]
    pub raw_transaction: String,
}

/// Params of `stx_signTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionParams {
    /// Hex-encoded unsigned transaction.
    pub transaction: String,
    #[serde(default)]
    pub broadcast: bool,
    #[serde(default = "sign_transaction_defaults::network")]
    pub network: Network,
}

mod sign_transaction_defaults {
    use crate::networks::Network;

    pub fn network() -> Network {
        Network::Mainnet
    }
}

impl SignTransactionParams {
    /// Sign only, on mainnet.
    pub fn new<S: Into<String>>(transaction: S) -> Self {
        Self {
            transaction: transaction.into(),
            broadcast: false,
            network: sign_transaction_defaults::network(),
        }
    }

    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }
}

/// Result of `stx_signTransaction`. `txid` is only present when broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignTransactionResult {
    pub signature: String,
    pub transaction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Utf8,
    Structured,
}

/// Params of `stx_signMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageParams {
    pub address: String,
    pub message: String,
    pub message_type: MessageType,
    pub network: Network,
    /// SIP-018 domain, for structured messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// Result of `stx_signMessage`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignMessageResult {
    pub signature: String,
}

/// Params of `stx_callContract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallContractParams {
    /// Fully qualified contract id, `ADDRESS.contract-name`.
    pub contract: String,
    pub function_name: String,
    #[serde(default)]
    pub function_args: Vec<String>,
}
