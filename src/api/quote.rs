use axum::{ extract::State, Json };
use serde::{ Deserialize, Serialize };

use crate::error::{ ErrorCode, Result, SwapError };
use crate::models::{ Quote, Token };

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct QuoteRequestBody {
    pub from_chain: String,
    pub from_token: String,
    pub to_chain: String,
    pub to_token: String,
    pub amount: String,
    pub slippage: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponseBody {
    pub quote: Option<Quote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
}

pub async fn get_quote(
    State(state): State<AppState>,
    Json(body): Json<QuoteRequestBody>
) -> Result<Json<QuoteResponseBody>> {
    let from = lookup_token(&state, &body.from_chain, &body.from_token).await?;
    let to = lookup_token(&state, &body.to_chain, &body.to_token).await?;
    let slippage = body.slippage.unwrap_or(state.default_slippage);

    let quote = state.quote_service.fetch_quote(&from, &to, &body.amount, slippage).await?;
    let expires_in = quote.as_ref().map(|q| q.expires_in(state.quote_service.now_ms()));

    Ok(Json(QuoteResponseBody { quote, expires_in }))
}

async fn lookup_token(state: &AppState, chain_id: &str, address: &str) -> Result<Token> {
    state.catalog
        .find_token(chain_id, address).await?
        .ok_or_else(|| SwapError::new(ErrorCode::UnsupportedToken).into())
}
