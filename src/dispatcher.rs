//! Typed wallet requests over an active session.
//!
//! Every operation builds a `{ method, params }` envelope, checks that the
//! session on the topic is active and approved the method, sends it through the
//! [`WalletTransport`] and decodes the typed result. Nothing is retried.
//!
//! Requests that can broadcast a transaction are sent one at a time per topic.
//! Other requests, and requests on different topics, run concurrently.

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

use stacks_pay_types::proto::{
    CallContractParams, GetAddressesParams, GetAddressesResult, RpcRequest, SignMessageParams,
    SignMessageResult, SignTransactionParams, SignTransactionResult, StacksAddress, Topic,
    TransactionResult, TransferStxParams, WalletMethod,
};

use crate::error::RequestFailure;
use crate::session::SessionManager;
use crate::transport::WalletTransport;
use crate::Error;

pub struct RequestDispatcher {
    transport: Arc<dyn WalletTransport>,
    sessions: Arc<SessionManager>,
    /// One lock per topic, taken around state-mutating sends.
    send_locks: DashMap<Topic, Arc<Mutex<()>>>,
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn WalletTransport>, sessions: Arc<SessionManager>) -> Self {
        Self {
            transport,
            sessions,
            send_locks: DashMap::new(),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Accounts exposed by the wallet. An empty list is a valid answer.
    pub async fn get_addresses(&self, topic: &Topic) -> Result<Vec<StacksAddress>, Error> {
        let result: GetAddressesResult = self
            .dispatch(topic, WalletMethod::GetAddresses, &GetAddressesParams {}, false)
            .await?;
        Ok(result.addresses)
    }

    pub async fn transfer_stx(
        &self,
        topic: &Topic,
        params: &TransferStxParams,
    ) -> Result<TransactionResult, Error> {
        self.dispatch(topic, WalletMethod::TransferStx, params, true)
            .await
    }

    pub async fn sign_transaction(
        &self,
        topic: &Topic,
        params: &SignTransactionParams,
    ) -> Result<SignTransactionResult, Error> {
        self.dispatch(topic, WalletMethod::SignTransaction, params, params.broadcast)
            .await
    }

    pub async fn sign_message(
        &self,
        topic: &Topic,
        params: &SignMessageParams,
    ) -> Result<SignMessageResult, Error> {
        self.dispatch(topic, WalletMethod::SignMessage, params, false)
            .await
    }

    pub async fn call_contract(
        &self,
        topic: &Topic,
        params: &CallContractParams,
    ) -> Result<TransactionResult, Error> {
        self.dispatch(topic, WalletMethod::CallContract, params, true)
            .await
    }

    #[instrument(skip_all, fields(method = %method, topic = %topic), err)]
    async fn dispatch<P, R>(
        &self,
        topic: &Topic,
        method: WalletMethod,
        params: &P,
        broadcasts: bool,
    ) -> Result<R, Error>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        self.sessions.ensure_usable(topic, method)?;
        let request = RpcRequest::new(method, params)
            .map_err(|e| Error::request_failed(method, RequestFailure::MalformedParams(e)))?;

        let response = if broadcasts || method.always_broadcasts() {
            let lock = self.send_lock(topic);
            let _guard = lock.lock().await;
            // The session may have closed while this send was queued.
            if let Err(error) = self.sessions.ensure_usable(topic, method) {
                self.send_locks.remove(topic);
                return Err(error);
            }
            self.transport.request(topic, request).await
        } else {
            self.transport.request(topic, request).await
        };

        let response = response
            .map_err(|e| Error::request_failed(method, RequestFailure::Transport(e)))?;
        let result = response
            .result
            .ok_or_else(|| Error::request_failed(method, RequestFailure::MissingResult))?;
        let decoded = serde_json::from_value(result)
            .map_err(|e| Error::request_failed(method, RequestFailure::MalformedResult(e)))?;
        tracing::debug!("wallet request completed");
        Ok(decoded)
    }

    /// Closes the session on `topic` and drops its send lock. Sends already
    /// queued on the lock fail with [`Error::SessionUnavailable`].
    pub fn handle_disconnect(&self, topic: &Topic) -> bool {
        let closed = self.sessions.handle_disconnect(topic);
        self.send_locks.remove(topic);
        closed
    }

    fn send_lock(&self, topic: &Topic) -> Arc<Mutex<()>> {
        let entry = self
            .send_locks
            .entry(topic.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Arc::clone(entry.value())
    }
}
