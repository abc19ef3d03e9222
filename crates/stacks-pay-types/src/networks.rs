//! Stacks networks and their CAIP-2 chain identifiers.
//!
//! A gateway is bound to one [`Network`], which decides two things: the address
//! prefix that recipients must carry (`SP` on mainnet, `ST` elsewhere) and the
//! network tag sent to the wallet with transfer and signing requests.
//!
//! Session proposals are approved for a list of chain ids rather than a single
//! network. The registry below maps names to those ids:
//!
//! ```
//! use stacks_pay_types::chain::ChainId;
//! use stacks_pay_types::networks::{chain_id_by_network_name, Network};
//!
//! let mainnet = chain_id_by_network_name("mainnet").unwrap();
//! assert_eq!(mainnet, &ChainId::new("stacks", "1"));
//! assert_eq!(Network::Devnet.chain_id(), ChainId::new("stacks", "2147483647"));
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::chain::{ChainId, STACKS_NAMESPACE};

/// Chain reference announced for Stacks mainnet.
pub const MAINNET_CHAIN_REFERENCE: &str = "1";
/// Chain reference announced for Stacks testnet. Devnet shares it.
pub const TESTNET_CHAIN_REFERENCE: &str = "2147483647";

/// The network class a gateway and its addresses belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
    Devnet,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Devnet];

    /// Two-letter prefix of a standard principal on this network.
    pub fn address_prefix(&self) -> &'static str {
        match self {
            Network::Mainnet => "SP",
            Network::Testnet | Network::Devnet => "ST",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Devnet => "devnet",
        }
    }

    /// The CAIP-2 chain id wallets expect for this network.
    pub fn chain_id(&self) -> ChainId {
        match self {
            Network::Mainnet => ChainId::new(STACKS_NAMESPACE, MAINNET_CHAIN_REFERENCE),
            Network::Testnet | Network::Devnet => {
                ChainId::new(STACKS_NAMESPACE, TESTNET_CHAIN_REFERENCE)
            }
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown network {0:?}, expected one of mainnet, testnet, devnet")]
pub struct UnknownNetworkError(pub String);

impl FromStr for Network {
    type Err = UnknownNetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            "devnet" => Ok(Network::Devnet),
            _ => Err(UnknownNetworkError(s.to_string())),
        }
    }
}

/// A known network definition with its chain ID and human-readable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub name: &'static str,
    pub namespace: &'static str,
    pub reference: &'static str,
}

impl NetworkInfo {
    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.namespace, self.reference)
    }
}

/// Well-known Stacks networks. Order matters for the reverse lookup: the first
/// entry for a chain id wins, so `testnet` is listed before `devnet`.
pub static KNOWN_NETWORKS: &[NetworkInfo] = &[
    NetworkInfo {
        name: "mainnet",
        namespace: STACKS_NAMESPACE,
        reference: MAINNET_CHAIN_REFERENCE,
    },
    NetworkInfo {
        name: "testnet",
        namespace: STACKS_NAMESPACE,
        reference: TESTNET_CHAIN_REFERENCE,
    },
    NetworkInfo {
        name: "devnet",
        namespace: STACKS_NAMESPACE,
        reference: TESTNET_CHAIN_REFERENCE,
    },
];

static NAME_TO_CHAIN_ID: LazyLock<HashMap<&'static str, ChainId>> = LazyLock::new(|| {
    KNOWN_NETWORKS
        .iter()
        .map(|n| (n.name, n.chain_id()))
        .collect()
});

static CHAIN_ID_TO_NAME: LazyLock<HashMap<ChainId, &'static str>> = LazyLock::new(|| {
    let mut map = HashMap::with_capacity(KNOWN_NETWORKS.len());
    for network in KNOWN_NETWORKS {
        map.entry(network.chain_id()).or_insert(network.name);
    }
    map
});

pub fn chain_id_by_network_name(name: &str) -> Option<&'static ChainId> {
    NAME_TO_CHAIN_ID.get(name)
}

pub fn network_name_by_chain_id(chain_id: &ChainId) -> Option<&'static str> {
    CHAIN_ID_TO_NAME.get(chain_id).copied()
}

/// Chains a session is approved for when the caller does not say otherwise:
/// Stacks mainnet and testnet.
pub fn default_session_chains() -> Vec<ChainId> {
    vec![Network::Mainnet.chain_id(), Network::Testnet.chain_id()]
}
