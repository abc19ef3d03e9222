//! STX payments through a wallet-connection session.
//!
//! This crate connects a payment front-end to a Stacks wallet over an
//! externally provided [`WalletTransport`](transport::WalletTransport):
//! it decides session proposals, sends typed `stx_*` requests on approved
//! sessions, and validates payments before handing them to the wallet.
//! Validation and wire types live in the `stacks-pay-types` crate.
//!
//! # Modules
//!
//! - [`transport`] - The narrow transport interface the core depends on
//! - [`session`] - Session proposals, decisions and lifecycle
//! - [`dispatcher`] - One typed operation per wallet RPC method
//! - [`gateway`] - Payment validation and submission, direct or through a contract
//! - [`app`] - Application flows: initialize, connect wallet, pay, handle proposals
//! - [`config`] - File and environment configuration, CLI arguments
//! - [`error`] - The crate's error types
//! - [`telemetry`] - Logging and optional OpenTelemetry export
//!
//! # Example
//!
//! ```no_run
//! # async fn example<T: stacks_pay::transport::ConnectTransport>() -> Result<(), Box<dyn std::error::Error>> {
//! use stacks_pay::app::PaymentApp;
//! use stacks_pay::config::ValidatedConfig;
//! use stacks_pay::gateway::PaymentRequest;
//! use stacks_pay_types::proto::Topic;
//!
//! let config = ValidatedConfig::load(None)?;
//! let app = PaymentApp::initialize::<T>(config).await?;
//! let topic = Topic::new("session-topic");
//! let addresses = app.connect_wallet(&topic).await?;
//! let request = PaymentRequest::new("1000000", "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4", &addresses[0].address);
//! let result = app.make_payment(&topic, &request).await?;
//! println!("{}", result.txid);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod gateway;
pub mod run;
pub mod session;
pub mod telemetry;
pub mod transport;

pub use error::Error;
pub use run::run;
