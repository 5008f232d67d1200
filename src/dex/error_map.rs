//! Translation of collaborator errors into the user-facing taxonomy.

use super::BackendError;
use crate::error::ErrorCode;

/// EIP-1193 "user rejected request".
pub const USER_REJECTED_CODE: i64 = 4001;

pub fn classify(err: &BackendError) -> ErrorCode {
    match err {
        BackendError::Wallet { code, message } => {
            if *code == USER_REJECTED_CODE {
                ErrorCode::UserRejected
            } else {
                classify_message(message)
            }
        }
        BackendError::Rpc { code, message } =>
            match code.as_deref() {
                Some("ACTION_REJECTED") => ErrorCode::UserRejected,
                Some("NETWORK_ERROR") => ErrorCode::NetworkError,
                _ => classify_message(message),
            }
        BackendError::Sdk { message } => classify_message(message),
        BackendError::Transport(_) => ErrorCode::NetworkError,
    }
}

pub fn is_user_rejection(err: &BackendError) -> bool {
    classify(err) == ErrorCode::UserRejected
}

/// The only place where collaborator messages are inspected as text.
fn classify_message(message: &str) -> ErrorCode {
    let msg = message.to_lowercase();

    if msg.contains("user rejected") || msg.contains("user denied") {
        ErrorCode::UserRejected
    } else if msg.contains("liquidity") {
        ErrorCode::InsufficientLiquidity
    } else if msg.contains("balance") {
        ErrorCode::InsufficientBalance
    } else if msg.contains("slippage") {
        ErrorCode::SlippageExceeded
    } else if msg.contains("network") {
        ErrorCode::NetworkError
    } else if msg.contains("unsupported chain") {
        ErrorCode::UnsupportedChain
    } else if msg.contains("relay") && (msg.contains("timeout") || msg.contains("timed out")) {
        ErrorCode::RelayTimeout
    } else if msg.contains("submit") && msg.contains("failed") {
        // The intent reached the solver; only the hub-side submission report failed.
        ErrorCode::RelayTimeout
    } else {
        ErrorCode::UnknownError
    }
}
