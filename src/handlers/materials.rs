use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::AppState;
use crate::catalog::MaterialInput;
use crate::error::AppError;
use crate::models::Material;

/// GET /api/materials
pub async fn list_materials(State(state): State<AppState>) -> Json<Vec<Material>> {
    Json(state.workspace.materials().await)
}

/// POST /api/materials
pub async fn create_material(
    State(state): State<AppState>,
    Json(input): Json<MaterialInput>,
) -> Result<(StatusCode, Json<Material>), AppError> {
    let created = state.workspace.create_material(input).await?;
    tracing::info!(
        material = %created.name,
        unit_price = created.unit_price,
        "Material created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/materials/:id
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<MaterialInput>,
) -> Result<Json<Material>, AppError> {
    let updated = state.workspace.update_material(id, input).await?;
    tracing::info!(
        material = %updated.name,
        unit_price = updated.unit_price,
        "Material updated"
    );
    Ok(Json(updated))
}

/// DELETE /api/materials/:id
/// Also removes every cost row referencing the material.
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.workspace.delete_material(id).await?;
    tracing::info!(material_id = %id, "Material deleted");
    Ok(StatusCode::NO_CONTENT)
}
