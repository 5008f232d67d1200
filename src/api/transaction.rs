use axum::{ extract::{ Path, Query, State }, http::StatusCode, Json };
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ AppError, Result };
use crate::models::Transaction;

use super::AppState;

#[derive(Deserialize)]
pub struct TransactionQueryParams {
    pub limit: Option<usize>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<TransactionQueryParams>
) -> Result<Json<Vec<Transaction>>> {
    Ok(Json(state.ledger.list(params.limit).await))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>
) -> Result<Json<Transaction>> {
    state.ledger
        .get(id).await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Transaction {}", id)))
}

pub async fn clear_transactions(State(state): State<AppState>) -> Result<StatusCode> {
    state.ledger.clear().await?;
    tracing::info!("Transaction history cleared");
    Ok(StatusCode::NO_CONTENT)
}
