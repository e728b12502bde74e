//! HTTP handlers for the stock ledger

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::{
    ApplyMovementInput, MovementResult, StockBalance, StockLedgerService, StockMovement,
};
use crate::AppState;

/// Apply a ledger movement
pub async fn apply_movement(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ApplyMovementInput>,
) -> AppResult<(StatusCode, Json<MovementResult>)> {
    let service = StockLedgerService::new(state.db);
    let result = service
        .apply_movement(current_user.0.company_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// List balances for all materials
pub async fn list_balances(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockBalance>>> {
    let service = StockLedgerService::new(state.db);
    let balances = service.list_balances(current_user.0.company_id).await?;
    Ok(Json(balances))
}

/// Get the balance for one material
pub async fn get_balance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<StockBalance>> {
    let service = StockLedgerService::new(state.db);
    let balance = service
        .get_balance(current_user.0.company_id, material_id)
        .await?;
    Ok(Json(balance))
}

/// Get movement history for one material
pub async fn get_material_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(material_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockLedgerService::new(state.db);
    let movements = service
        .get_movements(current_user.0.company_id, material_id)
        .await?;
    Ok(Json(movements))
}

/// List all movements
pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = StockLedgerService::new(state.db);
    let movements = service.list_movements(current_user.0.company_id).await?;
    Ok(Json(movements))
}
