//! Session lifecycle: proposals, decisions and the table of known sessions.
//!
//! A session is created in [`SessionState::Proposed`] when the transport reports
//! a proposal. It becomes [`SessionState::Active`] once approval is acknowledged
//! by the transport, or [`SessionState::Closed`] once rejection is. An active
//! session is closed when the transport signals a disconnect.
//!
//! Each proposal is decided exactly once. A decision claims the proposal before
//! the transport call and releases the claim only if that call fails, so a
//! second decision (including one racing the first) is refused with
//! [`Error::DuplicateDecision`].

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;

use stacks_pay_types::chain::ChainId;
use stacks_pay_types::networks::default_session_chains;
use stacks_pay_types::proto::{
    ProposalId, RejectionReason, SessionNamespaces, SessionProposal, Topic, WalletMethod,
};

use crate::Error;
use crate::transport::WalletTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Proposed,
    Active,
    Closed,
}

/// Snapshot of a session as tracked by [`SessionManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub topic: Topic,
    pub proposal_id: ProposalId,
    pub state: SessionState,
    pub approved_chains: BTreeSet<ChainId>,
    pub approved_methods: BTreeSet<WalletMethod>,
}

impl Session {
    fn proposed(proposal: &SessionProposal) -> Self {
        Self {
            topic: proposal.topic.clone(),
            proposal_id: proposal.id.clone(),
            state: SessionState::Proposed,
            approved_chains: BTreeSet::new(),
            approved_methods: BTreeSet::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn allows(&self, method: WalletMethod) -> bool {
        self.approved_methods.contains(&method)
    }
}

/// The caller's answer to a session proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalDecision {
    Approve {
        chains: Vec<ChainId>,
        methods: Vec<WalletMethod>,
    },
    Reject {
        reason: RejectionReason,
    },
}

impl ProposalDecision {
    pub fn reject() -> Self {
        ProposalDecision::Reject {
            reason: RejectionReason::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecisionStatus {
    Pending,
    InFlight,
    Decided,
}

#[derive(Debug)]
struct ProposalEntry {
    topic: Topic,
    status: DecisionStatus,
}

/// Owns every session and proposal the application knows about.
///
/// Map guards are only held for synchronous bookkeeping, never across a
/// transport call.
pub struct SessionManager {
    transport: Arc<dyn WalletTransport>,
    sessions: DashMap<Topic, Session>,
    proposals: DashMap<ProposalId, ProposalEntry>,
    default_chains: Vec<ChainId>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn WalletTransport>) -> Self {
        Self {
            transport,
            sessions: DashMap::new(),
            proposals: DashMap::new(),
            default_chains: default_session_chains(),
        }
    }

    /// Replaces the chains announced by [`SessionManager::approve`].
    pub fn with_default_chains(mut self, chains: Vec<ChainId>) -> Self {
        self.default_chains = chains;
        self
    }

    pub fn default_chains(&self) -> &[ChainId] {
        &self.default_chains
    }

    /// Approval with the configured chains and every wallet method.
    pub fn default_approval(&self) -> ProposalDecision {
        ProposalDecision::Approve {
            chains: self.default_chains.clone(),
            methods: WalletMethod::ALL.to_vec(),
        }
    }

    /// Registers a proposal reported by the transport.
    ///
    /// Returns `false`, leaving existing state untouched, if the proposal id is
    /// already known or its topic still carries a session that is not closed.
    #[instrument(skip_all, fields(proposal = %proposal.id, topic = %proposal.topic))]
    pub fn receive_proposal(&self, proposal: SessionProposal) -> bool {
        let slot = self.sessions.entry(proposal.topic.clone());
        if let Entry::Occupied(existing) = &slot {
            if existing.get().state != SessionState::Closed {
                tracing::debug!(state = ?existing.get().state, "topic already has a session");
                return false;
            }
        }
        match self.proposals.entry(proposal.id.clone()) {
            Entry::Occupied(_) => {
                tracing::debug!("proposal already known");
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(ProposalEntry {
                    topic: proposal.topic.clone(),
                    status: DecisionStatus::Pending,
                });
                match slot {
                    Entry::Occupied(mut closed) => {
                        closed.insert(Session::proposed(&proposal));
                    }
                    Entry::Vacant(vacant) => {
                        vacant.insert(Session::proposed(&proposal));
                    }
                }
                tracing::info!("session proposed");
                true
            }
        }
    }

    /// Approves or rejects a proposal through the transport.
    ///
    /// On transport failure the session stays [`SessionState::Proposed`] and
    /// the error is returned as [`Error::Transport`]; the decision may be retried.
    #[instrument(skip_all, fields(proposal = %id), err)]
    pub async fn handle_proposal(
        &self,
        id: &ProposalId,
        decision: ProposalDecision,
    ) -> Result<SessionState, Error> {
        let topic = self.claim(id)?;

        let outcome = match &decision {
            ProposalDecision::Approve { chains, methods } => {
                let namespaces = SessionNamespaces::stacks(chains.clone(), methods.clone());
                self.transport.approve_session(id, &namespaces).await
            }
            ProposalDecision::Reject { reason } => self.transport.reject_session(id, reason).await,
        };

        if let Err(error) = outcome {
            self.release(id, DecisionStatus::Pending);
            return Err(Error::Transport(error));
        }
        self.release(id, DecisionStatus::Decided);

        let state = match decision {
            ProposalDecision::Approve { chains, methods } => {
                self.update(&topic, |session| {
                    if session.state == SessionState::Proposed {
                        session.state = SessionState::Active;
                        session.approved_chains = chains.into_iter().collect();
                        session.approved_methods = methods.into_iter().collect();
                    }
                })
            }
            ProposalDecision::Reject { .. } => {
                self.update(&topic, |session| session.state = SessionState::Closed)
            }
        };
        let state = state.unwrap_or(SessionState::Closed);
        tracing::info!(%topic, ?state, "proposal decided");
        Ok(state)
    }

    /// Approves with [`SessionManager::default_approval`].
    pub async fn approve(&self, id: &ProposalId) -> Result<SessionState, Error> {
        self.handle_proposal(id, self.default_approval()).await
    }

    /// Rejects with the default reason.
    pub async fn reject(&self, id: &ProposalId) -> Result<SessionState, Error> {
        self.handle_proposal(id, ProposalDecision::reject()).await
    }

    /// Closes the session on `topic`. Returns `false` if the topic is unknown.
    #[instrument(skip_all, fields(topic = %topic))]
    pub fn handle_disconnect(&self, topic: &Topic) -> bool {
        let closed = self
            .update(topic, |session| session.state = SessionState::Closed)
            .is_some();
        if closed {
            tracing::info!("session closed");
        }
        closed
    }

    pub fn session(&self, topic: &Topic) -> Option<Session> {
        self.sessions.get(topic).map(|s| s.value().clone())
    }

    pub fn active_sessions(&self) -> Vec<Session> {
        self.sessions
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.value().clone())
            .collect()
    }

    /// Fails unless the session on `topic` is active and approved `method`.
    pub fn ensure_usable(&self, topic: &Topic, method: WalletMethod) -> Result<(), Error> {
        let session = self
            .sessions
            .get(topic)
            .ok_or_else(|| Error::session_unavailable(topic, "unknown topic"))?;
        match session.state {
            SessionState::Active if session.allows(method) => Ok(()),
            SessionState::Active => Err(Error::session_unavailable(
                topic,
                format!("{method} was not approved"),
            )),
            SessionState::Proposed => Err(Error::session_unavailable(topic, "not yet approved")),
            SessionState::Closed => Err(Error::session_unavailable(topic, "session is closed")),
        }
    }

    fn claim(&self, id: &ProposalId) -> Result<Topic, Error> {
        let mut entry = self
            .proposals
            .get_mut(id)
            .ok_or_else(|| Error::UnknownProposal(id.clone()))?;
        if entry.status != DecisionStatus::Pending {
            return Err(Error::DuplicateDecision(id.clone()));
        }
        entry.status = DecisionStatus::InFlight;
        Ok(entry.topic.clone())
    }

    fn release(&self, id: &ProposalId, status: DecisionStatus) {
        if let Some(mut entry) = self.proposals.get_mut(id) {
            entry.status = status;
        }
    }

    fn update<F>(&self, topic: &Topic, f: F) -> Option<SessionState>
    where
        F: FnOnce(&mut Session),
    {
        let mut session = self.sessions.get_mut(topic)?;
        f(session.value_mut());
        Some(session.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;
    use crate::transport::stub::{Call, StubTransport};

    fn manager() -> (Arc<StubTransport>, SessionManager) {
        let transport = Arc::new(StubTransport::new());
        let manager = SessionManager::new(transport.clone());
        (transport, manager)
    }

    fn propose(manager: &SessionManager, id: &str, topic: &str) -> ProposalId {
        let proposal = SessionProposal::new(id, topic);
        let id = proposal.id.clone();
        assert!(manager.receive_proposal(proposal));
        id
    }

    #[tokio::test]
    async fn test_approve_activates_session() {
        let (transport, manager) = manager();
        let id = propose(&manager, "1", "topic-a");

        let state = manager.approve(&id).await.unwrap();
        assert_eq!(state, SessionState::Active);

        let session = manager.session(&Topic::from("topic-a")).unwrap();
        assert!(session.is_active());
        assert_eq!(session.approved_methods.len(), WalletMethod::ALL.len());
        assert_eq!(
            session.approved_chains,
            default_session_chains().into_iter().collect::<BTreeSet<_>>()
        );

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Approve { id: called, namespaces } => {
                assert_eq!(called, &id);
                let grant = namespaces.get("stacks").unwrap();
                assert_eq!(grant.events, vec!["accountsChanged", "networkChanged"]);
                assert_eq!(grant.methods, WalletMethod::ALL.to_vec());
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reject_closes_session_with_default_reason() {
        let (transport, manager) = manager();
        let id = propose(&manager, "2", "topic-b");

        let state = manager.reject(&id).await.unwrap();
        assert_eq!(state, SessionState::Closed);
        assert_eq!(
            transport.calls(),
            vec![Call::Reject {
                id: id.clone(),
                reason: RejectionReason::new("User rejected the session"),
            }]
        );
        assert!(manager.active_sessions().is_empty());
    }

    #[tokio::test]
    async fn test_second_decision_is_refused() {
        let (transport, manager) = manager();
        let id = propose(&manager, "3", "topic-c");

        manager.approve(&id).await.unwrap();
        assert!(matches!(
            manager.reject(&id).await,
            Err(Error::DuplicateDecision(dup)) if dup == id
        ));
        assert!(matches!(
            manager.approve(&id).await,
            Err(Error::DuplicateDecision(_))
        ));
        assert_eq!(transport.call_count(), 1);
        assert!(manager.session(&Topic::from("topic-c")).unwrap().is_active());
    }

    #[tokio::test]
    async fn test_concurrent_decisions_reach_transport_once() {
        let (transport, manager) = manager();
        let id = propose(&manager, "4", "topic-d");

        let (first, second) = tokio::join!(manager.approve(&id), manager.reject(&id));
        let outcomes = [first.is_ok(), second.is_ok()];
        assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_proposal() {
        let (transport, manager) = manager();
        let result = manager.approve(&ProposalId::from("nope")).await;
        assert!(matches!(result, Err(Error::UnknownProposal(_))));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_failed_approval_can_be_retried() {
        let (transport, manager) = manager();
        let id = propose(&manager, "5", "topic-e");
        transport.fail_decision(TransportError::Timeout);

        let result = manager.approve(&id).await;
        assert!(matches!(result, Err(Error::Transport(TransportError::Timeout))));
        let session = manager.session(&Topic::from("topic-e")).unwrap();
        assert_eq!(session.state, SessionState::Proposed);

        assert_eq!(manager.approve(&id).await.unwrap(), SessionState::Active);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_rejection_can_be_retried() {
        let (transport, manager) = manager();
        let id = propose(&manager, "14", "topic-i");
        transport.fail_decision(TransportError::Disconnected);

        let result = manager.reject(&id).await;
        assert!(matches!(result, Err(Error::Transport(TransportError::Disconnected))));
        let session = manager.session(&Topic::from("topic-i")).unwrap();
        assert_eq!(session.state, SessionState::Proposed);

        assert_eq!(manager.reject(&id).await.unwrap(), SessionState::Closed);
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_known_proposal_is_left_untouched() {
        let (_transport, manager) = manager();
        let id = propose(&manager, "6", "topic-f");
        manager.approve(&id).await.unwrap();

        assert!(!manager.receive_proposal(SessionProposal::new("6", "topic-f")));
        assert!(manager.session(&Topic::from("topic-f")).unwrap().is_active());
    }

    #[tokio::test]
    async fn test_new_proposal_does_not_replace_live_session() {
        let (_transport, manager) = manager();
        let topic = Topic::from("topic-shared");
        let id = propose(&manager, "10", "topic-shared");
        manager.approve(&id).await.unwrap();

        assert!(!manager.receive_proposal(SessionProposal::new("11", "topic-shared")));
        let session = manager.session(&topic).unwrap();
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.proposal_id, id);
        assert_eq!(session.approved_methods.len(), WalletMethod::ALL.len());
        assert!(matches!(
            manager.approve(&ProposalId::from("11")).await,
            Err(Error::UnknownProposal(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_topic_accepts_new_proposal() {
        let (_transport, manager) = manager();
        let topic = Topic::from("topic-reused");
        let id = propose(&manager, "12", "topic-reused");
        manager.approve(&id).await.unwrap();
        manager.handle_disconnect(&topic);

        let id = propose(&manager, "13", "topic-reused");
        assert_eq!(manager.session(&topic).unwrap().state, SessionState::Proposed);
        assert_eq!(manager.approve(&id).await.unwrap(), SessionState::Active);
    }

    #[tokio::test]
    async fn test_disconnect_closes_session() {
        let (_transport, manager) = manager();
        let id = propose(&manager, "7", "topic-g");
        manager.approve(&id).await.unwrap();
        assert_eq!(manager.active_sessions().len(), 1);

        let topic = Topic::from("topic-g");
        assert!(manager.handle_disconnect(&topic));
        assert_eq!(manager.session(&topic).unwrap().state, SessionState::Closed);
        assert!(manager.active_sessions().is_empty());
        assert!(!manager.handle_disconnect(&Topic::from("unknown")));
    }

    #[tokio::test]
    async fn test_ensure_usable() {
        let (_transport, manager) = manager();
        let topic = Topic::from("topic-h");
        let id = propose(&manager, "8", "topic-h");

        assert!(matches!(
            manager.ensure_usable(&topic, WalletMethod::GetAddresses),
            Err(Error::SessionUnavailable { .. })
        ));

        manager
            .handle_proposal(
                &id,
                ProposalDecision::Approve {
                    chains: default_session_chains(),
                    methods: vec![WalletMethod::GetAddresses],
                },
            )
            .await
            .unwrap();
        assert!(manager.ensure_usable(&topic, WalletMethod::GetAddresses).is_ok());
        assert!(matches!(
            manager.ensure_usable(&topic, WalletMethod::TransferStx),
            Err(Error::SessionUnavailable { .. })
        ));
        assert!(matches!(
            manager.ensure_usable(&Topic::from("other"), WalletMethod::GetAddresses),
            Err(Error::SessionUnavailable { .. })
        ));
    }

    #[test]
    fn test_custom_default_chains() {
        let transport = Arc::new(StubTransport::new());
        let manager =
            SessionManager::new(transport).with_default_chains(vec![ChainId::stacks(1)]);
        match manager.default_approval() {
            ProposalDecision::Approve { chains, .. } => {
                assert_eq!(chains, vec![ChainId::new("stacks", "1")])
            }
            other => panic!("unexpected decision {other:?}"),
        }
    }
}
