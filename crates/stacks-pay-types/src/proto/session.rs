//! Session proposals and the namespaces announced when approving one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::chain::{ChainId, STACKS_NAMESPACE};
use crate::proto::{ProposalId, Topic, WalletMethod};

/// Events a Stacks session subscribes to.
pub const SESSION_EVENTS: [&str; 2] = ["accountsChanged", "networkChanged"];

/// A pending session request, as reported by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProposal {
    pub id: ProposalId,
    pub topic: Topic,
}

impl SessionProposal {
    pub fn new<I: Into<ProposalId>, T: Into<Topic>>(id: I, topic: T) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
        }
    }
}

/// Capabilities granted to one namespace of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceGrant {
    pub chains: Vec<ChainId>,
    pub methods: Vec<WalletMethod>,
    pub events: Vec<String>,
}

/// Namespaces sent with a session approval, keyed by namespace name.
///
/// ```
/// use stacks_pay_types::chain::ChainId;
/// use stacks_pay_types::proto::{SessionNamespaces, WalletMethod};
///
/// let namespaces = SessionNamespaces::stacks(
///     vec![ChainId::new("stacks", "1")],
///     vec![WalletMethod::GetAddresses],
/// );
/// let json = serde_json::to_value(&namespaces).unwrap();
/// assert_eq!(json["stacks"]["methods"][0], "stx_getAddresses");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionNamespaces(pub BTreeMap<String, NamespaceGrant>);

impl SessionNamespaces {
    /// A single `stacks` namespace with the standard session events.
    pub fn stacks(chains: Vec<ChainId>, methods: Vec<WalletMethod>) -> Self {
        let grant = NamespaceGrant {
            chains,
            methods,
            events: SESSION_EVENTS.iter().map(|e| e.to_string()).collect(),
        };
        Self(BTreeMap::from([(STACKS_NAMESPACE.to_string(), grant)]))
    }

    pub fn get(&self, namespace: &str) -> Option<&NamespaceGrant> {
        self.0.get(namespace)
    }
}

/// Reason given to the wallet when a proposal is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RejectionReason(String);

impl RejectionReason {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self(reason.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RejectionReason {
    fn default() -> Self {
        Self::new("User rejected the session")
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
