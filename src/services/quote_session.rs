use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::amount;
use crate::error::{ AppError, ErrorCode, Result, SwapError };
use crate::models::{ Quote, Token };

use super::QuoteService;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// What the user asked to be quoted.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteInputs {
    pub from_token: Token,
    pub to_token: Token,
    pub amount: String,
    pub slippage: f64,
}

impl QuoteInputs {
    pub fn matches(&self, other: &QuoteInputs) -> bool {
        self.from_token.same_asset(&other.from_token) &&
            self.to_token.same_asset(&other.to_token) &&
            self.amount.trim() == other.amount.trim() &&
            self.slippage == other.slippage
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteFailure {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuoteSnapshot {
    pub inputs: Option<QuoteInputs>,
    pub quote: Option<Quote>,
    pub loading: bool,
    pub error: Option<QuoteFailure>,
}

/// Live quote for the inputs currently on screen.
///
/// Fetch results are applied only while the inputs they were fetched for are
/// still current, so a slow response can never overwrite a newer one.
#[derive(Clone)]
pub struct QuoteSession {
    service: Arc<QuoteService>,
    debounce: Duration,
    state: Arc<Mutex<QuoteSnapshot>>,
    generation: Arc<AtomicU64>,
}

impl QuoteSession {
    pub fn new(service: Arc<QuoteService>) -> Self {
        Self::with_debounce(service, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(service: Arc<QuoteService>, debounce: Duration) -> Self {
        Self {
            service,
            debounce,
            state: Arc::new(Mutex::new(QuoteSnapshot::default())),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Store new inputs and schedule a fetch once they have been stable for the
    /// debounce period. Returns the scheduled task, if any.
    pub async fn set_inputs(&self, inputs: QuoteInputs) -> Option<JoinHandle<()>> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        {
            let mut state = self.state.lock().await;
            let changed = !state.inputs.as_ref().is_some_and(|current| current.matches(&inputs));
            if changed {
                state.quote = None;
                state.error = None;
            }
            state.inputs = Some(inputs.clone());

            if amount::is_zero_amount(&inputs.amount) {
                state.quote = None;
                state.error = None;
                state.loading = false;
                return None;
            }
            state.loading = true;
        }

        let session = self.clone();
        Some(
            tokio::spawn(async move {
                tokio::time::sleep(session.debounce).await;
                if session.generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                session.fetch_for(inputs).await;
            })
        )
    }

    /// Fetch for the current inputs right away.
    pub async fn refresh(&self) -> bool {
        let inputs = {
            let mut state = self.state.lock().await;
            match state.inputs.clone() {
                Some(inputs) => {
                    state.loading = true;
                    inputs
                }
                None => {
                    return false;
                }
            }
        };
        self.fetch_for(inputs).await
    }

    /// Fetch a quote for `inputs` and apply it if they are still current.
    /// Returns whether the result was applied.
    pub async fn fetch_for(&self, inputs: QuoteInputs) -> bool {
        let result = self.service.fetch_quote(
            &inputs.from_token,
            &inputs.to_token,
            &inputs.amount,
            inputs.slippage
        ).await;

        let mut state = self.state.lock().await;
        let current = state.inputs.as_ref().is_some_and(|c| c.matches(&inputs));
        if !current {
            tracing::debug!("Discarding quote for superseded amount {}", inputs.amount);
            return false;
        }

        state.loading = false;
        match result {
            Ok(quote) => {
                state.quote = quote;
                state.error = None;
            }
            Err(e) => {
                state.quote = None;
                state.error = Some(QuoteFailure {
                    code: e.code(),
                    message: e.user_message(),
                });
            }
        }
        true
    }

    pub async fn snapshot(&self) -> QuoteSnapshot {
        self.state.lock().await.clone()
    }

    /// The current quote, unless it has gone stale.
    pub async fn fresh_quote(&self) -> Option<Quote> {
        let now = self.service.now_ms();
        self.state
            .lock().await
            .quote.clone()
            .filter(|q| !q.is_stale(now))
    }

    /// The current quote, re-quoting first if it is missing or stale.
    pub async fn ensure_fresh_quote(&self) -> Result<Quote> {
        if let Some(quote) = self.fresh_quote().await {
            return Ok(quote);
        }

        if !self.refresh().await {
            return Err(AppError::InvalidInput("No quote available".to_string()));
        }

        if let Some(quote) = self.fresh_quote().await {
            return Ok(quote);
        }

        let state = self.state.lock().await;
        match &state.error {
            Some(failure) => Err(SwapError::with_message(failure.code, failure.message.clone()).into()),
            None => Err(AppError::InvalidInput("No quote available".to_string())),
        }
    }

    /// Swap source and destination. The previous output amount becomes the
    /// new input amount when a quote was available.
    pub async fn flip(&self) -> Option<JoinHandle<()>> {
        let flipped = {
            let state = self.state.lock().await;
            let inputs = state.inputs.clone()?;
            QuoteInputs {
                from_token: inputs.to_token,
                to_token: inputs.from_token,
                amount: state.quote
                    .as_ref()
                    .map(|q| q.to_amount.clone())
                    .unwrap_or(inputs.amount),
                slippage: inputs.slippage,
            }
        };
        self.set_inputs(flipped).await
    }

    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().await = QuoteSnapshot::default();
    }
}
