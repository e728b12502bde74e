//! HTTP handlers for product shipments

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::shipment::{CreateShipmentInput, Shipment, ShipmentService};
use crate::AppState;

/// List all shipments
pub async fn list_shipments(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Shipment>>> {
    let service = ShipmentService::new(state.db);
    let shipments = service.list_shipments(current_user.0.company_id).await?;
    Ok(Json(shipments))
}

/// Get a shipment
pub async fn get_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
) -> AppResult<Json<Shipment>> {
    let service = ShipmentService::new(state.db);
    let shipment = service
        .get_shipment(current_user.0.company_id, shipment_id)
        .await?;
    Ok(Json(shipment))
}

/// Create a draft shipment
pub async fn create_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateShipmentInput>,
) -> AppResult<(StatusCode, Json<Shipment>)> {
    let service = ShipmentService::new(state.db);
    let shipment = service
        .create_shipment(current_user.0.company_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(shipment)))
}

/// Post a draft shipment to the stock ledger
pub async fn post_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
) -> AppResult<Json<Shipment>> {
    let service = ShipmentService::new(state.db);
    let shipment = service
        .post_shipment(current_user.0.company_id, shipment_id, &current_user.0.name)
        .await?;
    Ok(Json(shipment))
}

/// Delete a draft shipment
pub async fn delete_shipment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(shipment_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ShipmentService::new(state.db);
    service
        .delete_shipment(current_user.0.company_id, shipment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
