//! Application-level flows over a single wallet transport.
//!
//! [`PaymentApp`] wires the session manager, the request dispatcher and the
//! payment gateway around one transport, and exposes the steps a payment
//! front-end goes through: decide incoming proposals, connect the wallet, pay.

use std::sync::Arc;
use tracing::instrument;

use stacks_pay_types::proto::{ProposalId, StacksAddress, Topic, TransactionResult};

use crate::config::ValidatedConfig;
use crate::dispatcher::RequestDispatcher;
use crate::gateway::{PaymentGateway, PaymentRequest};
use crate::session::{SessionManager, SessionState};
use crate::transport::{ConnectTransport, WalletTransport};
use crate::Error;

pub struct PaymentApp {
    sessions: Arc<SessionManager>,
    dispatcher: Arc<RequestDispatcher>,
    gateway: PaymentGateway,
}

impl PaymentApp {
    /// Brings up the transport from the configured project id and wires the
    /// application around it.
    #[instrument(skip_all, err)]
    pub async fn initialize<T: ConnectTransport>(config: ValidatedConfig) -> Result<Self, Error> {
        let transport = T::initialize(&config.project_id).await?;
        tracing::info!(network = %config.gateway.network, "wallet transport initialized");
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Wires the application around an already initialized transport.
    pub fn with_transport(transport: Arc<dyn WalletTransport>, config: ValidatedConfig) -> Self {
        let sessions =
            Arc::new(SessionManager::new(transport.clone()).with_default_chains(config.chains));
        let dispatcher = Arc::new(RequestDispatcher::new(transport, sessions.clone()));
        let gateway = PaymentGateway::new(config.gateway, dispatcher.clone());
        Self {
            sessions,
            dispatcher,
            gateway,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn dispatcher(&self) -> &Arc<RequestDispatcher> {
        &self.dispatcher
    }

    pub fn gateway(&self) -> &PaymentGateway {
        &self.gateway
    }

    /// Approves a proposal with the default capabilities, or rejects it.
    #[instrument(skip(self), err)]
    pub async fn handle_incoming_proposal(
        &self,
        id: &ProposalId,
        approve: bool,
    ) -> Result<SessionState, Error> {
        if approve {
            self.sessions.approve(id).await
        } else {
            self.sessions.reject(id).await
        }
    }

    /// Fetches the wallet's accounts. A wallet exposing none is an error here.
    #[instrument(skip(self), err)]
    pub async fn connect_wallet(&self, topic: &Topic) -> Result<Vec<StacksAddress>, Error> {
        let addresses = self.dispatcher.get_addresses(topic).await?;
        if addresses.is_empty() {
            return Err(Error::EmptyAddressList);
        }
        tracing::info!(count = addresses.len(), "wallet connected");
        Ok(addresses)
    }

    #[instrument(skip(self, request), err)]
    pub async fn make_payment(
        &self,
        topic: &Topic,
        request: &PaymentRequest,
    ) -> Result<TransactionResult, Error> {
        self.gateway.process_payment(topic, request).await
    }

    /// Closes the session on `topic` after the wallet disconnected.
    pub fn handle_disconnect(&self, topic: &Topic) -> bool {
        self.dispatcher.handle_disconnect(topic)
    }
}
