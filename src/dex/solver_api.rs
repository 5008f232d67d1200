use async_trait::async_trait;
use ethers::types::U256;
use serde::{ Deserialize, Serialize };

use super::{ BackendError, QuoteBackend, QuoteRequest, QuoteResponse };

// Solver API request/response structures
#[derive(Debug, Serialize)]
struct SolverQuoteRequest<'a> {
    token_src: &'a str,
    token_dst: &'a str,
    token_src_blockchain_id: &'a str,
    token_dst_blockchain_id: &'a str,
    amount: String,
    quote_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct SolverQuoteResponse {
    quoted_amount: String,
    #[serde(default)]
    price_impact: Option<NumberOrString>,
    #[serde(default)]
    estimated_gas: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SolverErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// Quote backend speaking the solver's HTTP quote endpoint.
pub struct SolverQuoteClient {
    api_url: String,
    client: reqwest::Client,
}

impl SolverQuoteClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn parse_amount(field: &str, value: &str) -> Result<U256, BackendError> {
        U256::from_dec_str(value.trim()).map_err(|_| BackendError::Sdk {
            message: format!("Invalid {} in solver response: {}", field, value),
        })
    }
}

#[async_trait]
impl QuoteBackend for SolverQuoteClient {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<QuoteResponse, BackendError> {
        let url = format!("{}/quote", self.api_url);
        let body = SolverQuoteRequest {
            token_src: &request.src_token,
            token_dst: &request.dst_token,
            token_src_blockchain_id: &request.src_chain,
            token_dst_blockchain_id: &request.dst_chain,
            amount: request.amount.to_string(),
            quote_type: request.mode.as_str(),
        };

        tracing::debug!(
            "Requesting solver quote {} -> {} for {}",
            request.src_token,
            request.dst_token,
            body.amount
        );

        let response = self.client
            .post(&url)
            .json(&body)
            .send().await
            .map_err(|e| BackendError::Transport(format!("Solver API error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json
                ::from_str::<SolverErrorBody>(&text)
                .ok()
                .and_then(|b| b.message.or(b.detail))
                .unwrap_or_else(|| format!("Solver API returned error: {}", status));
            return Err(BackendError::Sdk { message });
        }

        let quote: SolverQuoteResponse = response
            .json().await
            .map_err(|e| BackendError::Sdk {
                message: format!("Failed to parse solver response: {}", e),
            })?;

        let quoted_amount = Self::parse_amount("quoted_amount", &quote.quoted_amount)?;
        let estimated_gas = match quote.estimated_gas.as_deref() {
            Some(gas) => Some(Self::parse_amount("estimated_gas", gas)?),
            None => None,
        };

        Ok(QuoteResponse {
            quoted_amount,
            price_impact: quote.price_impact.and_then(|p| p.as_f64()),
            estimated_gas,
        })
    }
}
