//! HTTP handlers for material master data

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::material::{CreateMaterialInput, Material, UpdateMaterialInput};
use crate::services::MaterialService;
use crate::AppState;

/// List all materials
pub async fn list_materials(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Material>>> {
    let service = MaterialService::new(state.db);
    let materials = service.list_materials(current_user.0.company_id).await?;
    Ok(Json(materials))
}

/// Get a material
pub async fn get_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<Material>> {
    let service = MaterialService::new(state.db);
    let material = service
        .get_material(current_user.0.company_id, material_id)
        .await?;
    Ok(Json(material))
}

/// Create a material
pub async fn create_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateMaterialInput>,
) -> AppResult<(StatusCode, Json<Material>)> {
    let service = MaterialService::new(state.db);
    let material = service
        .create_material(current_user.0.company_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(material)))
}

/// Update a material
pub async fn update_material(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(material_id): Path<Uuid>,
    Json(input): Json<UpdateMaterialInput>,
) -> AppResult<Json<Material>> {
    let service = MaterialService::new(state.db);
    let material = service
        .update_material(current_user.0.company_id, material_id, input)
        .await?;
    Ok(Json(material))
}
