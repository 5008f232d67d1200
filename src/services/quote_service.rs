use std::sync::Arc;

use crate::amount;
use crate::chains;
use crate::clock::Clock;
use crate::dex::{ QuoteBackend, QuoteRequest };
use crate::enums::QuoteMode;
use crate::error::{ ErrorCode, Result, SwapError };
use crate::models::{ Quote, Token };

/// Price impact shown when it can be neither reported nor estimated.
const DEFAULT_PRICE_IMPACT: f64 = 0.1;
const MAX_ESTIMATED_PRICE_IMPACT: f64 = 10.0;
const DEFAULT_GAS_ESTIMATE: &str = "0.005";

pub struct QuoteService {
    backend: Arc<dyn QuoteBackend>,
    clock: Arc<dyn Clock>,
}

impl QuoteService {
    pub fn new(backend: Arc<dyn QuoteBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Price `amount` of `from` in `to`. An empty or zero amount yields no
    /// quote and does not reach the backend.
    pub async fn fetch_quote(
        &self,
        from: &Token,
        to: &Token,
        amount: &str,
        slippage: f64
    ) -> Result<Option<Quote>> {
        if amount::is_zero_amount(amount) {
            return Ok(None);
        }

        amount::validate_swap_amount(amount, &from.symbol)?;
        amount::validate_slippage(slippage)?;

        chains::assert_swappable(&from.chain_id)?;
        chains::assert_swappable(&to.chain_id)?;
        let request = QuoteRequest {
            src_token: from.address.clone(),
            dst_token: to.address.clone(),
            src_chain: chains::to_backend_chain_id(&from.chain_id)?.to_string(),
            dst_chain: chains::to_backend_chain_id(&to.chain_id)?.to_string(),
            amount: amount::encode(amount, from.decimals)?,
            mode: QuoteMode::ExactInput,
        };

        tracing::debug!(
            "Fetching quote {} {} ({}) -> {} ({})",
            amount,
            from.symbol,
            request.src_chain,
            to.symbol,
            request.dst_chain
        );

        let response = self.backend.get_quote(&request).await.map_err(|e| {
            let err = SwapError::from_backend(e);
            tracing::warn!("Quote failed with {}: {:?}", err.code, err.cause);
            err
        })?;

        if response.quoted_amount.is_zero() {
            return Err(SwapError::new(ErrorCode::InsufficientLiquidity).into());
        }

        let from_value = amount::to_f64(request.amount, from.decimals);
        let to_value = amount::to_f64(response.quoted_amount, to.decimals);
        let rate = if from_value > 0.0 { to_value / from_value } else { 0.0 };

        let minimum = amount::min_output(response.quoted_amount, slippage)?;

        let price_impact = match response.price_impact {
            Some(fraction) => fraction * 100.0,
            None => estimate_price_impact(from, to, from_value, to_value),
        };

        let estimated_gas = response.estimated_gas
            .map(|gas| amount::decode(gas, 18))
            .unwrap_or_else(|| DEFAULT_GAS_ESTIMATE.to_string());

        let quote = Quote {
            from_token: from.clone(),
            to_token: to.clone(),
            from_amount: amount.trim().to_string(),
            to_amount: amount::decode(response.quoted_amount, to.decimals),
            rate,
            price_impact,
            estimated_gas,
            minimum_received: amount::decode(minimum, to.decimals),
            slippage,
            quoted_amount: response.quoted_amount,
            created_at_ms: self.clock.now_ms(),
        };

        tracing::info!(
            "Quote {} {} -> {} {} (impact {:.2}%)",
            quote.from_amount,
            from.symbol,
            quote.to_amount,
            to.symbol,
            quote.price_impact
        );

        Ok(Some(quote))
    }
}

/// USD value lost between the two legs, in percent.
fn estimate_price_impact(from: &Token, to: &Token, from_value: f64, to_value: f64) -> f64 {
    match (from.price, to.price) {
        (Some(from_price), Some(to_price)) if from_price > 0.0 && to_price > 0.0 => {
            let expected = from_value * from_price;
            if expected <= 0.0 {
                return DEFAULT_PRICE_IMPACT;
            }
            let actual = to_value * to_price;
            (((actual - expected).abs() / expected) * 100.0).min(MAX_ESTIMATED_PRICE_IMPACT)
        }
        _ => DEFAULT_PRICE_IMPACT,
    }
}
