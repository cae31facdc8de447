use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::error::AppError;
use crate::models::{CalculatedPricing, ProductConfig};
use crate::workspace::ProductUpdate;

/// Product configuration plus the pricing derived from it. Pricing is
/// recomputed from scratch on every request; there is no cached state to
/// invalidate.
#[derive(Debug, Serialize)]
pub struct ProductView {
    pub product: ProductConfig,
    pub pricing: CalculatedPricing,
}

/// GET /api/product
pub async fn get_product(State(state): State<AppState>) -> Json<ProductView> {
    let (product, pricing) = state.workspace.advice_snapshot().await;
    Json(ProductView { product, pricing })
}

/// POST /api/product
/// Applies one typed mutation and returns the updated view.
pub async fn update_product(
    State(state): State<AppState>,
    Json(update): Json<ProductUpdate>,
) -> Result<Json<ProductView>, AppError> {
    tracing::debug!(update = ?update, "Applying product update");
    let product = state.workspace.update_product(update).await?;
    let pricing = state.workspace.pricing().await;
    Ok(Json(ProductView { product, pricing }))
}

/// GET /api/pricing
pub async fn get_pricing(State(state): State<AppState>) -> Json<CalculatedPricing> {
    Json(state.workspace.pricing().await)
}
