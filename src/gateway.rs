//! STX payments through a connected wallet.
//!
//! [`PaymentGateway::process_payment`] validates the request locally and sends a
//! plain `stx_transferStx`. [`PaymentGateway::process_payment_via_contract`] routes
//! the payment through the merchant's contract with `stx_callContract` instead.
//! A request that fails validation is never dispatched.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use stacks_pay_types::address::StxAddress;
use stacks_pay_types::networks::Network;
use stacks_pay_types::proto::{CallContractParams, Topic, TransactionResult, TransferStxParams};
use stacks_pay_types::util::MicroStx;

use crate::dispatcher::RequestDispatcher;
use crate::error::InvalidPayment;
use crate::Error;

/// Contract function called when none is given.
pub const DEFAULT_CONTRACT_FUNCTION: &str = "process-payment";

/// Merchant settings, fixed for the lifetime of a gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub merchant_address: StxAddress,
    /// Fully qualified contract id the contract path calls into.
    pub contract_address: String,
    pub network: Network,
}

/// A payment to be made from `sender` to `recipient`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    /// Amount in uSTX, as a decimal integer string.
    pub amount: String,
    pub recipient: String,
    #[serde(rename = "senderAddress")]
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl PaymentRequest {
    pub fn new<A, R, S>(amount: A, recipient: R, sender: S) -> Self
    where
        A: Into<String>,
        R: Into<String>,
        S: Into<String>,
    {
        Self {
            amount: amount.into(),
            recipient: recipient.into(),
            sender: sender.into(),
            memo: None,
        }
    }

    pub fn with_memo<M: Into<String>>(mut self, memo: M) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// The memo, with an empty string treated as absent.
    fn memo(&self) -> Option<&str> {
        self.memo.as_deref().filter(|m| !m.is_empty())
    }
}

pub struct PaymentGateway {
    config: GatewayConfig,
    dispatcher: Arc<RequestDispatcher>,
}

impl PaymentGateway {
    pub fn new(config: GatewayConfig, dispatcher: Arc<RequestDispatcher>) -> Self {
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Validates and sends a direct STX transfer.
    ///
    /// The amount is checked first, then the recipient against the gateway's
    /// network. Without a memo, `"Payment processed via <contract>"` is sent.
    #[instrument(skip_all, fields(topic = %topic, amount = %request.amount, recipient = %request.recipient))]
    pub async fn process_payment(
        &self,
        topic: &Topic,
        request: &PaymentRequest,
    ) -> Result<TransactionResult, Error> {
        let amount = validate_amount(&request.amount)?;
        let recipient = StxAddress::parse(&request.recipient, self.config.network)
            .map_err(InvalidPayment::Recipient)?;

        let memo = request
            .memo()
            .map(str::to_string)
            .unwrap_or_else(|| self.default_memo());
        let params = TransferStxParams {
            sender: request.sender.clone(),
            recipient: recipient.to_string(),
            amount: amount.to_string(),
            memo: Some(memo),
            network: self.config.network,
        };

        let result = self.dispatcher.transfer_stx(topic, &params).await?;
        tracing::info!(txid = %result.txid, "payment processed");
        Ok(result)
    }

    /// Sends the payment through the configured contract.
    ///
    /// Address checks are left to the contract, but the amount must still be a
    /// positive integer. `function_name` defaults to [`DEFAULT_CONTRACT_FUNCTION`].
    #[instrument(skip_all, fields(topic = %topic, amount = %request.amount))]
    pub async fn process_payment_via_contract(
        &self,
        topic: &Topic,
        request: &PaymentRequest,
        function_name: Option<&str>,
    ) -> Result<TransactionResult, Error> {
        let amount = validate_amount(&request.amount)?;
        let params = CallContractParams {
            contract: self.config.contract_address.clone(),
            function_name: function_name.unwrap_or(DEFAULT_CONTRACT_FUNCTION).to_string(),
            function_args: payment_args(amount.to_string(), request),
        };

        let result = self.dispatcher.call_contract(topic, &params).await?;
        tracing::info!(txid = %result.txid, "contract payment processed");
        Ok(result)
    }

    fn default_memo(&self) -> String {
        format!("Payment processed via {}", self.config.contract_address)
    }
}

/// Contract arguments in call order: amount, recipient, memo (empty if absent).
///
/// A valid amount is written in canonical form (`"0001"` becomes `"1"`). An
/// invalid one is passed through unchanged.
pub fn encode_payment_args(request: &PaymentRequest) -> Vec<String> {
    let amount = MicroStx::parse(&request.amount)
        .map(|amount| amount.to_string())
        .unwrap_or_else(|_| request.amount.clone());
    payment_args(amount, request)
}

fn payment_args(amount: String, request: &PaymentRequest) -> Vec<String> {
    vec![
        amount,
        request.recipient.clone(),
        request.memo().unwrap_or_default().to_string(),
    ]
}

fn validate_amount(amount: &str) -> Result<MicroStx, InvalidPayment> {
    MicroStx::parse(amount).map_err(|source| InvalidPayment::Amount {
        amount: amount.to_string(),
        source,
    })
}
