use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub advice: String,
}

/// POST /api/advice
///
/// Snapshots the current product and its computed pricing, renders the
/// prompt and asks the upstream model for coaching text. Failures (cooldown,
/// upstream errors) are surfaced to the client as retryable errors and never
/// affect the stored state.
pub async fn generate_advice(
    State(state): State<AppState>,
) -> Result<Json<AdviceResponse>, AppError> {
    let (product, pricing) = state.workspace.advice_snapshot().await;
    let advice = state.advisor.advise(&product, &pricing).await?;

    tracing::info!(
        product = %product.name,
        chars = advice.len(),
        "Generated pricing advice"
    );
    Ok(Json(AdviceResponse { advice }))
}
