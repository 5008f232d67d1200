use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::dex::BackendError;

/// Failure categories surfaced to the user for quote and swap operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidAmount,
    UnsupportedChain,
    UnsupportedToken,
    InsufficientLiquidity,
    InsufficientBalance,
    QuoteExpired,
    SlippageExceeded,
    UserRejected,
    NetworkError,
    TransactionFailed,
    RelayTimeout,
    UnknownError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAmount => "INVALID_AMOUNT",
            ErrorCode::UnsupportedChain => "UNSUPPORTED_CHAIN",
            ErrorCode::UnsupportedToken => "UNSUPPORTED_TOKEN",
            ErrorCode::InsufficientLiquidity => "INSUFFICIENT_LIQUIDITY",
            ErrorCode::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorCode::QuoteExpired => "QUOTE_EXPIRED",
            ErrorCode::SlippageExceeded => "SLIPPAGE_EXCEEDED",
            ErrorCode::UserRejected => "USER_REJECTED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::TransactionFailed => "TRANSACTION_FAILED",
            ErrorCode::RelayTimeout => "RELAY_TIMEOUT",
            ErrorCode::UnknownError => "UNKNOWN_ERROR",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAmount => "Invalid swap amount. Please enter a valid number.",
            ErrorCode::UnsupportedChain => "This blockchain is not supported yet.",
            ErrorCode::UnsupportedToken => "This token is not supported for swaps.",
            ErrorCode::InsufficientLiquidity =>
                "Insufficient liquidity for this trade size. Try a smaller amount.",
            ErrorCode::InsufficientBalance => "Insufficient balance to complete this swap.",
            ErrorCode::QuoteExpired => "Quote has expired. Please refresh to get a new quote.",
            ErrorCode::SlippageExceeded =>
                "Price changed too much. Increase slippage tolerance or try again.",
            ErrorCode::UserRejected => "Transaction was rejected by user.",
            ErrorCode::NetworkError => "Network error. Please check your connection and try again.",
            ErrorCode::TransactionFailed => "Transaction failed. Please try again.",
            ErrorCode::RelayTimeout =>
                "Cross-chain relay in progress. Tokens may take 1-2 minutes to arrive.",
            ErrorCode::UnknownError => "An unexpected error occurred. Please try again.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified collaborator failure. `message` is safe to show to the user;
/// the raw collaborator error is kept in `cause` for diagnostics only.
#[derive(Debug)]
pub struct SwapError {
    pub code: ErrorCode,
    pub message: String,
    pub cause: Option<BackendError>,
}

impl SwapError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.user_message().to_string(),
            cause: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn from_backend(err: BackendError) -> Self {
        let code = crate::dex::error_map::classify(&err);
        Self {
            code,
            message: code.user_message().to_string(),
            cause: Some(err),
        }
    }

    pub fn caused_by(mut self, err: BackendError) -> Self {
        self.cause = Some(err);
        self
    }
}

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SwapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid amount: {0}")] InvalidAmount(String),

    #[error("Unsupported chain: {0}")] UnsupportedChain(String),

    #[error("{0}")] Swap(#[from] SwapError),

    #[error("A swap is already in progress")]
    SwapInProgress,

    #[error("Invalid input: {0}")] InvalidInput(String),

    #[error("Not found: {0}")] NotFound(String),

    #[error("Storage error: {0}")] Storage(String),

    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")] Config(String),

    #[error("External service error: {0}")] External(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    /// Taxonomy code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidAmount(_) => ErrorCode::InvalidAmount,
            AppError::UnsupportedChain(_) => ErrorCode::UnsupportedChain,
            AppError::Swap(e) => e.code,
            _ => ErrorCode::UnknownError,
        }
    }

    /// Message suitable for display. Collaborator errors never leak through here.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Swap(e) => e.message.clone(),
            AppError::UnsupportedChain(_) => ErrorCode::UnsupportedChain.user_message().to_string(),
            AppError::Storage(_) | AppError::Serialization(_) | AppError::Internal(_) =>
                ErrorCode::UnknownError.user_message().to_string(),
            AppError::External(_) => ErrorCode::NetworkError.user_message().to_string(),
            other => other.to_string(),
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::InvalidAmount(msg) =>
                ("INVALID_AMOUNT", msg.clone(), Some("amount".to_string())),
            AppError::UnsupportedChain(chain) =>
                (
                    "UNSUPPORTED_CHAIN",
                    format!("Chain {} is not supported for swaps yet", chain),
                    Some("chain".to_string()),
                ),
            AppError::Swap(e) => (e.code.as_str(), e.message.clone(), None),
            AppError::SwapInProgress =>
                ("SWAP_IN_PROGRESS", "A swap is already in progress".to_string(), None),
            AppError::InvalidInput(msg) => ("INVALID_INPUT", msg.clone(), None),
            AppError::NotFound(msg) => ("NOT_FOUND", msg.clone(), None),
            AppError::Storage(_) => ("STORAGE_ERROR", self.user_message(), None),
            AppError::Serialization(_) => ("SERIALIZATION_ERROR", self.user_message(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::External(_) => ("EXTERNAL_ERROR", self.user_message(), None),
            AppError::Internal(_) => ("INTERNAL_ERROR", self.user_message(), None),
        };

        ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            | AppError::InvalidAmount(_)
            | AppError::UnsupportedChain(_)
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::SwapInProgress => StatusCode::CONFLICT,
            AppError::Swap(e) =>
                match e.code {
                    | ErrorCode::InvalidAmount
                    | ErrorCode::UnsupportedChain
                    | ErrorCode::UnsupportedToken
                    | ErrorCode::QuoteExpired => StatusCode::BAD_REQUEST,
                    | ErrorCode::InsufficientLiquidity
                    | ErrorCode::InsufficientBalance
                    | ErrorCode::SlippageExceeded
                    | ErrorCode::UserRejected => StatusCode::UNPROCESSABLE_ENTITY,
                    | ErrorCode::NetworkError
                    | ErrorCode::TransactionFailed
                    | ErrorCode::RelayTimeout
                    | ErrorCode::UnknownError => StatusCode::BAD_GATEWAY,
                }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
