//! Wire format of wallet RPC traffic.
//!
//! Every wallet call is a method-tagged envelope `{ "method": ..., "params": ... }`
//! sent on a session topic. The wallet answers with `{ "result": ... }` or an
//! error carried by the transport.
//!
//! The method names are fixed by the wallet side and must be reproduced
//! verbatim:
//!
//! ```
//! use stacks_pay_types::proto::WalletMethod;
//!
//! assert_eq!(WalletMethod::TransferStx.as_str(), "stx_transferStx");
//! assert_eq!(
//!     serde_json::to_string(&WalletMethod::GetAddresses).unwrap(),
//!     "\"stx_getAddresses\""
//! );
//! ```
//!
//! - [`params`] - Typed params and results, one pair per method
//! - [`session`] - Session proposals and the namespaces sent on approval

pub mod params;
pub mod session;

pub use params::*;
pub use session::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The wallet RPC methods a session can be approved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WalletMethod {
    #[serde(rename = "stx_getAddresses")]
    GetAddresses,
    #[serde(rename = "stx_transferStx")]
    TransferStx,
    #[serde(rename = "stx_signTransaction")]
    SignTransaction,
    #[serde(rename = "stx_signMessage")]
    SignMessage,
    #[serde(rename = "stx_callContract")]
    CallContract,
}

impl WalletMethod {
    /// All methods, in the order they are announced on session approval.
    pub const ALL: [WalletMethod; 5] = [
        WalletMethod::GetAddresses,
        WalletMethod::TransferStx,
        WalletMethod::SignTransaction,
        WalletMethod::SignMessage,
        WalletMethod::CallContract,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WalletMethod::GetAddresses => "stx_getAddresses",
            WalletMethod::TransferStx => "stx_transferStx",
            WalletMethod::SignTransaction => "stx_signTransaction",
            WalletMethod::SignMessage => "stx_signMessage",
            WalletMethod::CallContract => "stx_callContract",
        }
    }

    /// Methods whose effect on chain is not idempotent: sending them twice may
    /// broadcast twice. `stx_signTransaction` only belongs here when it is
    /// asked to broadcast, which the caller knows from its params.
    pub fn always_broadcasts(&self) -> bool {
        matches!(self, WalletMethod::TransferStx | WalletMethod::CallContract)
    }
}

impl Display for WalletMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown wallet method {0}")]
pub struct UnknownMethodError(pub String);

impl FromStr for WalletMethod {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WalletMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethodError(s.to_string()))
    }
}

/// Transport-assigned identifier of a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    pub fn new<S: Into<String>>(topic: S) -> Self {
        Self(topic.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Topic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(value: &str) -> Self {
        Topic::new(value)
    }
}

impl From<String> for Topic {
    fn from(value: String) -> Self {
        Topic(value)
    }
}

/// Identifier of a pending session proposal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(String);

impl ProposalId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ProposalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProposalId {
    fn from(value: &str) -> Self {
        ProposalId::new(value)
    }
}

impl From<u64> for ProposalId {
    fn from(value: u64) -> Self {
        ProposalId(value.to_string())
    }
}

/// A method-tagged request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    pub method: WalletMethod,
    pub params: serde_json::Value,
}

impl RpcRequest {
    /// Builds an envelope from typed params.
    pub fn new<P: Serialize>(method: WalletMethod, params: &P) -> Result<Self, serde_json::Error> {
        Ok(Self {
            method,
            params: serde_json::to_value(params)?,
        })
    }
}

/// The wallet's answer to an [`RpcRequest`]. A missing or `null` result is
/// kept as `None` so the caller can tell it apart from a malformed one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
}

impl RpcResponse {
    pub fn with_result(result: serde_json::Value) -> Self {
        Self {
            result: Some(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_names_are_verbatim() {
        let names: Vec<&str> = WalletMethod::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "stx_getAddresses",
                "stx_transferStx",
                "stx_signTransaction",
                "stx_signMessage",
                "stx_callContract",
            ]
        );
        for method in WalletMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.as_str()));
            assert_eq!(method.as_str().parse::<WalletMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_envelope_shape() {
        let request = RpcRequest::new(WalletMethod::GetAddresses, &json!({})).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "method": "stx_getAddresses", "params": {} })
        );
    }

    #[test]
    fn test_response_null_result_is_none() {
        let response: RpcResponse = serde_json::from_value(json!({ "result": null })).unwrap();
        assert_eq!(response.result, None);
        let response: RpcResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.result, None);
    }

    #[test]
    fn test_proposal_id_from_number() {
        assert_eq!(ProposalId::from(1700000000u64).as_str(), "1700000000");
    }
}
