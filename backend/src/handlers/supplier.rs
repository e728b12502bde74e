//! HTTP handlers for supplier master data

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::supplier::{CreateSupplierInput, Supplier, UpdateSupplierInput};
use crate::services::SupplierService;
use crate::AppState;
use shared::SupplierType;

#[derive(Debug, Deserialize)]
pub struct SupplierListQuery {
    pub supplier_type: Option<SupplierType>,
}

/// List suppliers, optionally filtered by type
pub async fn list_suppliers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<SupplierListQuery>,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = SupplierService::new(state.db);
    let suppliers = service
        .list_suppliers(current_user.0.company_id, query.supplier_type)
        .await?;
    Ok(Json(suppliers))
}

/// Get a supplier
pub async fn get_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.db);
    let supplier = service
        .get_supplier(current_user.0.company_id, supplier_id)
        .await?;
    Ok(Json(supplier))
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let service = SupplierService::new(state.db);
    let supplier = service
        .create_supplier(current_user.0.company_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<Supplier>> {
    let service = SupplierService::new(state.db);
    let supplier = service
        .update_supplier(current_user.0.company_id, supplier_id, input)
        .await?;
    Ok(Json(supplier))
}

/// Deactivate a supplier
pub async fn deactivate_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = SupplierService::new(state.db);
    service
        .deactivate_supplier(current_user.0.company_id, supplier_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
