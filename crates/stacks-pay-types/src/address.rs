//! Network-tagged STX addresses.
//!
//! Only the textual shape is checked: a two-letter network prefix followed by
//! exactly 32 uppercase alphanumeric characters. Checksums are the wallet's
//! business.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::networks::Network;

static MAINNET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^SP[A-Z0-9]{32}$").expect("valid address regex"));
static TESTNET_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ST[A-Z0-9]{32}$").expect("valid address regex"));

fn pattern_for(network: Network) -> &'static Regex {
    match network {
        Network::Mainnet => &*MAINNET_PATTERN,
        Network::Testnet | Network::Devnet => &*TESTNET_PATTERN,
    }
}

/// Returns `true` if `address` has the shape of a standard principal on `network`.
pub fn matches_network(address: &str, network: Network) -> bool {
    pattern_for(network).is_match(address)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StxAddressError {
    #[error("Address {address:?} is not a valid {network} address")]
    WrongShape { address: String, network: Network },
    #[error("Address {0:?} does not belong to any known network")]
    UnknownPrefix(String),
}

/// A syntactically valid STX address together with the network it was checked against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StxAddress {
    address: String,
    network: Network,
}

impl StxAddress {
    pub fn parse(address: &str, network: Network) -> Result<Self, StxAddressError> {
        if matches_network(address, network) {
            Ok(Self {
                address: address.to_string(),
                network,
            })
        } else {
            Err(StxAddressError::WrongShape {
                address: address.to_string(),
                network,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.address
    }

    /// The network this address was validated for. Testnet and devnet
    /// addresses share a prefix, so an `ST` address parsed without a network
    /// hint reports [`Network::Testnet`].
    pub fn network(&self) -> Network {
        self.network
    }
}

impl fmt::Display for StxAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

impl AsRef<str> for StxAddress {
    fn as_ref(&self) -> &str {
        &self.address
    }
}

impl FromStr for StxAddress {
    type Err = StxAddressError;

    /// Infers the network from the prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("SP") {
            StxAddress::parse(s, Network::Mainnet)
        } else if s.starts_with("ST") {
            StxAddress::parse(s, Network::Testnet)
        } else {
            Err(StxAddressError::UnknownPrefix(s.to_string()))
        }
    }
}

impl Serialize for StxAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.address)
    }
}

impl<'de> Deserialize<'de> for StxAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
