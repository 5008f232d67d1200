use axum::{ extract::State, http::StatusCode, Json };
use serde::Serialize;

use crate::error::Result;
use crate::models::PendingSwapRecord;

use super::AppState;

#[derive(Serialize)]
pub struct PendingSwapResponse {
    pub pending: Option<PendingSwapRecord>,
}

pub async fn get_pending_swap(State(state): State<AppState>) -> Result<Json<PendingSwapResponse>> {
    Ok(Json(PendingSwapResponse { pending: state.recovery.get().await? }))
}

pub async fn discard_pending_swap(State(state): State<AppState>) -> Result<StatusCode> {
    state.recovery.clear().await?;
    tracing::info!("Pending swap dismissed");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{ delete, get, send, test_state, NOW };
    use crate::enums::SwapStep;
    use crate::models::PendingSwapRecord;
    use crate::testing::{ eth_base, usdc_arbitrum };
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_pending_swap_roundtrip() {
        let state = test_state().await;

        let (status, body) = send(state.clone(), get("/api/recovery")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["pending"].is_null());

        state.recovery
            .set(PendingSwapRecord {
                tx_hash: "0xbeef".to_string(),
                from_token: usdc_arbitrum(),
                to_token: eth_base(),
                from_amount: "10".to_string(),
                to_amount: "0.0033".to_string(),
                created_at_ms: NOW,
                step: SwapStep::PendingConfirmation,
            }).await
            .unwrap();

        let (_, body) = send(state.clone(), get("/api/recovery")).await;
        assert_eq!(body["pending"]["tx_hash"], "0xbeef");
        assert_eq!(body["pending"]["step"], "PENDING_CONFIRMATION");

        let (status, _) = send(state.clone(), delete("/api/recovery")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(!state.recovery.has().await.unwrap());
    }
}
