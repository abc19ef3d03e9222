//! Errors surfaced by the session, dispatch and payment layers.

use stacks_pay_types::address::StxAddressError;
use stacks_pay_types::proto::{ProposalId, Topic, WalletMethod};
use stacks_pay_types::util::MicroStxParseError;

use crate::config::ConfigError;
use crate::transport::TransportError;

/// A payment request that failed local validation. Never dispatched.
#[derive(Debug, thiserror::Error)]
pub enum InvalidPayment {
    #[error("Invalid amount {amount:?}: {source}")]
    Amount {
        amount: String,
        #[source]
        source: MicroStxParseError,
    },
    #[error("Invalid recipient: {0}")]
    Recipient(#[source] StxAddressError),
}

/// Why a dispatched wallet request produced no usable result.
#[derive(Debug, thiserror::Error)]
pub enum RequestFailure {
    #[error(transparent)]
    Transport(TransportError),
    #[error("Wallet response carried no result")]
    MissingResult,
    #[error("Can not decode wallet result: {0}")]
    MalformedResult(#[source] serde_json::Error),
    #[error("Can not encode request params: {0}")]
    MalformedParams(#[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
    #[error(transparent)]
    InvalidPayment(#[from] InvalidPayment),
    #[error("Proposal {0} has already been decided")]
    DuplicateDecision(ProposalId),
    #[error("Unknown proposal {0}")]
    UnknownProposal(ProposalId),
    #[error("Session {topic} is unavailable: {reason}")]
    SessionUnavailable { topic: Topic, reason: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{method} failed: {cause}")]
    RequestFailed {
        method: WalletMethod,
        #[source]
        cause: RequestFailure,
    },
    #[error("Wallet exposed no addresses")]
    EmptyAddressList,
}

impl Error {
    pub(crate) fn request_failed(method: WalletMethod, cause: RequestFailure) -> Self {
        Error::RequestFailed { method, cause }
    }

    pub(crate) fn session_unavailable<S: Into<String>>(topic: &Topic, reason: S) -> Self {
        Error::SessionUnavailable {
            topic: topic.clone(),
            reason: reason.into(),
        }
    }
}
