//! CAIP-2 chain identifiers.
//!
//! A wallet session is scoped to a set of chains, each named by a
//! [CAIP-2](https://standards.chainagnostic.org/CAIPs/caip-2) identifier of the
//! form `namespace:reference`. Stacks chains live in the `stacks` namespace and
//! use the numeric chain id as reference:
//!
//! ```
//! use stacks_pay_types::chain::ChainId;
//!
//! let mainnet = ChainId::new("stacks", "1");
//! assert_eq!(mainnet.to_string(), "stacks:1");
//!
//! let parsed: ChainId = "stacks:2147483647".parse().unwrap();
//! assert_eq!(parsed.reference, "2147483647");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;
use std::str::FromStr;

use crate::networks;

/// The CAIP-2 namespace for Stacks chains.
pub const STACKS_NAMESPACE: &str = "stacks";

/// A CAIP-2 compliant blockchain identifier.
///
/// Serializes to/from a colon-separated string: `"stacks:1"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId {
    /// The blockchain namespace, `stacks` for every chain this crate knows about.
    pub namespace: String,
    /// The chain-specific reference (e.g. `1` for Stacks mainnet).
    pub reference: String,
}

impl ChainId {
    /// Creates a new chain ID from namespace and reference components.
    pub fn new<N: Into<String>, R: Into<String>>(namespace: N, reference: R) -> Self {
        Self {
            namespace: namespace.into(),
            reference: reference.into(),
        }
    }

    /// Creates a chain ID in the `stacks` namespace.
    pub fn stacks(reference: u32) -> Self {
        Self::new(STACKS_NAMESPACE, reference.to_string())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Creates a chain ID from a well-known network name (`mainnet`, `testnet`, `devnet`).
    ///
    /// ```
    /// use stacks_pay_types::chain::ChainId;
    ///
    /// let testnet = ChainId::from_network_name("testnet").unwrap();
    /// assert_eq!(testnet.to_string(), "stacks:2147483647");
    /// assert!(ChainId::from_network_name("base").is_none());
    /// ```
    pub fn from_network_name(network_name: &str) -> Option<Self> {
        networks::chain_id_by_network_name(network_name).cloned()
    }

    /// Returns the well-known network name for this chain ID, if any.
    ///
    /// Testnet and devnet share a chain id; the reverse lookup yields `testnet`.
    pub fn as_network_name(&self) -> Option<&'static str> {
        networks::network_name_by_chain_id(self)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

impl From<ChainId> for String {
    fn from(value: ChainId) -> Self {
        value.to_string()
    }
}

/// Error returned when parsing an invalid chain ID string.
///
/// A valid chain ID must be in the format `namespace:reference` where both
/// components are non-empty.
#[derive(Debug, thiserror::Error)]
#[error("Invalid chain id format {0}")]
pub struct ChainIdFormatError(String);

impl FromStr for ChainId {
    type Err = ChainIdFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, reference)) if !namespace.is_empty() && !reference.is_empty() => {
                Ok(ChainId::new(namespace, reference))
            }
            _ => Err(ChainIdFormatError(s.into())),
        }
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ChainId::from_str(&s).map_err(de::Error::custom)
    }
}
