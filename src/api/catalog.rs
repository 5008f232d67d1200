use axum::{ extract::{ Path, State }, Json };

use crate::error::{ AppError, Result };
use crate::models::{ ChainInfo, Token };

use super::AppState;

pub async fn list_chains(State(state): State<AppState>) -> Result<Json<Vec<ChainInfo>>> {
    Ok(Json(state.catalog.chains().await?))
}

pub async fn list_tokens(
    State(state): State<AppState>,
    Path(chain_id): Path<String>
) -> Result<Json<Vec<Token>>> {
    let known = state.catalog
        .chains().await?
        .iter()
        .any(|c| c.id == chain_id);
    if !known {
        return Err(AppError::NotFound(format!("Chain {}", chain_id)));
    }

    Ok(Json(state.catalog.tokens(&chain_id).await?))
}
