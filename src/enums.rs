use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── SwapStep ───────────────────────────────────────────────────────

/// Position of a swap in the orchestration state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapStep {
    Approving,
    CreatingIntent,
    SigningTx,
    SubmittingTx,
    ConfirmingTx,
    PollingStatus,
    Complete,
    PendingConfirmation,
    Failed,
}

impl SwapStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStep::Approving => "APPROVING",
            SwapStep::CreatingIntent => "CREATING_INTENT",
            SwapStep::SigningTx => "SIGNING_TX",
            SwapStep::SubmittingTx => "SUBMITTING_TX",
            SwapStep::ConfirmingTx => "CONFIRMING_TX",
            SwapStep::PollingStatus => "POLLING_STATUS",
            SwapStep::Complete => "COMPLETE",
            SwapStep::PendingConfirmation => "PENDING_CONFIRMATION",
            SwapStep::Failed => "FAILED",
        }
    }

    /// Progress label shown while the step is active.
    pub fn label(&self) -> &'static str {
        match self {
            SwapStep::Approving => "Approving token...",
            SwapStep::CreatingIntent => "Creating swap intent...",
            SwapStep::SigningTx => "Signing transaction...",
            SwapStep::SubmittingTx => "Submitting to network...",
            SwapStep::ConfirmingTx => "Waiting for confirmation...",
            SwapStep::PollingStatus => "Checking solver status...",
            SwapStep::Complete => "Swap complete",
            SwapStep::PendingConfirmation => "Swap submitted, confirmation pending",
            SwapStep::Failed => "Swap failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapStep::Complete | SwapStep::PendingConfirmation | SwapStep::Failed)
    }
}

impl fmt::Display for SwapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwapStep {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "APPROVING" => Ok(SwapStep::Approving),
            "CREATING_INTENT" => Ok(SwapStep::CreatingIntent),
            "SIGNING_TX" => Ok(SwapStep::SigningTx),
            "SUBMITTING_TX" => Ok(SwapStep::SubmittingTx),
            "CONFIRMING_TX" => Ok(SwapStep::ConfirmingTx),
            "POLLING_STATUS" => Ok(SwapStep::PollingStatus),
            "COMPLETE" => Ok(SwapStep::Complete),
            "PENDING_CONFIRMATION" => Ok(SwapStep::PendingConfirmation),
            "FAILED" => Ok(SwapStep::Failed),
            _ => Err(AppError::InvalidInput(format!("Invalid swap step: {}", s))),
        }
    }
}

// ─── TxStatus ───────────────────────────────────────────────────────

/// Status of a swap in the transaction ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Pending,
    Success,
    Failed,
}

impl TxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxStatus::Pending => "pending",
            TxStatus::Success => "success",
            TxStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TxStatus::Pending)
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TxStatus::Pending),
            "success" => Ok(TxStatus::Success),
            "failed" => Ok(TxStatus::Failed),
            _ => Err(AppError::InvalidInput(format!("Invalid tx status: {}", s))),
        }
    }
}

// ─── QuoteMode ──────────────────────────────────────────────────────

/// Which side of the trade the quoted amount is fixed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteMode {
    ExactInput,
}

impl QuoteMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteMode::ExactInput => "exact_input",
        }
    }
}

impl fmt::Display for QuoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
