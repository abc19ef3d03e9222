//! The wallet transport: the external channel that carries session and RPC messages.
//!
//! Relay, pairing and encryption all live behind [`WalletTransport`]. The core
//! only needs three capabilities from it: send a request on a session topic and
//! await the correlated response, approve a proposal, reject a proposal.
//!
//! Timeouts and cancellation are the transport's concern. When it gives up on
//! a request it must resolve with [`TransportError::Timeout`] or
//! [`TransportError::Cancelled`] rather than leave the future pending.

use async_trait::async_trait;
use stacks_pay_types::proto::{
    ProposalId, RejectionReason, RpcRequest, RpcResponse, SessionNamespaces, Topic,
};

/// Identifier of the application registered with the relay service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Failures reported by a [`WalletTransport`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The wallet answered with a JSON-RPC error.
    #[error("Wallet returned error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Request timed out")]
    Timeout,
    #[error("Request was cancelled")]
    Cancelled,
    #[error("Session topic is not connected")]
    Disconnected,
    #[error("{0}")]
    Other(String),
}

/// Narrow capability interface over a wallet-connection client.
#[async_trait]
pub trait WalletTransport: Send + Sync {
    /// Sends `request` on `topic` and resolves with the wallet's response.
    async fn request(&self, topic: &Topic, request: RpcRequest)
    -> Result<RpcResponse, TransportError>;

    /// Finalizes approval of a proposal with the granted namespaces.
    async fn approve_session(
        &self,
        id: &ProposalId,
        namespaces: &SessionNamespaces,
    ) -> Result<(), TransportError>;

    /// Declines a proposal.
    async fn reject_session(
        &self,
        id: &ProposalId,
        reason: &RejectionReason,
    ) -> Result<(), TransportError>;
}

/// A transport that can be brought up from a project identifier.
#[async_trait]
pub trait ConnectTransport: WalletTransport + Sized + 'static {
    async fn initialize(project_id: &ProjectId) -> Result<Self, TransportError>;
}
