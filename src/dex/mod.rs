use async_trait::async_trait;
use ethers::types::U256;
use serde::{ Deserialize, Serialize };
use thiserror::Error;

use crate::enums::QuoteMode;
use crate::providers::SigningProvider;

pub mod error_map;
pub mod solver_api;

pub use solver_api::SolverQuoteClient;

/// Error as reported by a collaborator (swap backend, wallet, RPC node).
///
/// Only `error_map::classify` looks inside these; everything else treats them
/// as opaque diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    /// EIP-1193 provider error raised by the user's wallet.
    #[error("wallet error {code}: {message}")] Wallet {
        code: i64,
        message: String,
    },

    /// JSON-RPC error with an optional symbolic code such as `ACTION_REJECTED`.
    #[error("rpc error: {message}")] Rpc {
        code: Option<String>,
        message: String,
    },

    /// Structured failure returned by the swap backend (`ok: false`).
    #[error("{message}")] Sdk {
        message: String,
    },

    #[error("transport error: {0}")] Transport(String),
}

impl BackendError {
    pub fn message(&self) -> &str {
        match self {
            BackendError::Wallet { message, .. } => message,
            BackendError::Rpc { message, .. } => message,
            BackendError::Sdk { message } => message,
            BackendError::Transport(message) => message,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub src_token: String,
    pub dst_token: String,
    pub src_chain: String,
    pub dst_chain: String,
    pub amount: U256,
    pub mode: QuoteMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quoted_amount: U256,
    /// Fraction, e.g. 0.004 for 0.4%.
    pub price_impact: Option<f64>,
    /// Gas in native wei.
    pub estimated_gas: Option<U256>,
}

/// Parameters of a swap intent, shared by approval and submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentParams {
    pub input_token: String,
    pub output_token: String,
    pub input_amount: U256,
    pub min_output_amount: U256,
    /// Zero means the intent never expires.
    pub deadline: U256,
    pub allow_partial_fill: bool,
    pub src_chain: String,
    pub dst_chain: String,
    pub src_address: String,
    pub dst_address: String,
    pub solver: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalReceipt {
    pub tx_hash: Option<String>,
}

/// Solver acknowledgement of a submitted intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverResponse {
    pub intent_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub intent_id: Option<String>,
    pub src_chain: String,
    pub dst_chain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryInfo {
    pub src_tx_hash: Option<String>,
    pub src_chain_id: Option<String>,
    pub dst_chain_id: Option<String>,
}

pub type SwapSubmission = (SolverResponse, Intent, DeliveryInfo);

/// Price discovery for a token pair.
#[async_trait]
pub trait QuoteBackend: Send + Sync {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, BackendError>;
}

/// Intent execution through the solver network.
#[async_trait]
pub trait SwapBackend: Send + Sync {
    /// Approve the backend to spend `params.input_amount` of the input token.
    async fn approve(
        &self,
        params: &IntentParams,
        signer: &dyn SigningProvider
    ) -> Result<ApprovalReceipt, BackendError>;

    /// Sign, submit and hand the intent to a solver.
    async fn swap(
        &self,
        params: &IntentParams,
        signer: &dyn SigningProvider
    ) -> Result<SwapSubmission, BackendError>;
}
