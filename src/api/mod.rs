use std::sync::Arc;

use axum::{ routing::{ get, post }, Router };

pub mod catalog;
pub mod quote;
pub mod recovery;
pub mod transaction;

use crate::db::{ RecoveryRepository, TransactionRepository };
use crate::providers::CachedCatalog;
use crate::services::QuoteService;

#[derive(Clone)]
pub struct AppState {
    pub quote_service: Arc<QuoteService>,
    pub catalog: Arc<CachedCatalog>,
    pub ledger: Arc<TransactionRepository>,
    pub recovery: Arc<RecoveryRepository>,
    pub default_slippage: f64,
}

impl AppState {
    pub fn new(
        quote_service: Arc<QuoteService>,
        catalog: Arc<CachedCatalog>,
        ledger: Arc<TransactionRepository>,
        recovery: Arc<RecoveryRepository>,
        default_slippage: f64
    ) -> Self {
        Self {
            quote_service,
            catalog,
            ledger,
            recovery,
            default_slippage,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chains", get(catalog::list_chains))
        .route("/api/chains/{id}/tokens", get(catalog::list_tokens))
        .route("/api/quote", post(quote::get_quote))
        .route(
            "/api/transactions",
            get(transaction::list_transactions).delete(transaction::clear_transactions)
        )
        .route("/api/transactions/{id}", get(transaction::get_transaction))
        .route(
            "/api/recovery",
            get(recovery::get_pending_swap).delete(recovery::discard_pending_swap)
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
