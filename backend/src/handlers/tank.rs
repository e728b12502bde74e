//! HTTP handlers for storage tanks

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::stock::StockMovement;
use crate::services::tank::{
    CreateTankInput, Tank, TankAdjustmentInput, TankMovementInput, TankService, TransferInput,
    TransferResult,
};
use crate::AppState;

/// List all tanks
pub async fn list_tanks(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Tank>>> {
    let service = TankService::new(state.db);
    let tanks = service.list_tanks(current_user.0.company_id).await?;
    Ok(Json(tanks))
}

/// Get a tank
pub async fn get_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
) -> AppResult<Json<Tank>> {
    let service = TankService::new(state.db);
    let tank = service.get_tank(current_user.0.company_id, tank_id).await?;
    Ok(Json(tank))
}

/// Create a tank
pub async fn create_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateTankInput>,
) -> AppResult<(StatusCode, Json<Tank>)> {
    let service = TankService::new(state.db);
    let tank = service.create_tank(current_user.0.company_id, input).await?;
    Ok((StatusCode::CREATED, Json(tank)))
}

/// Get movement history for a tank
pub async fn get_tank_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let service = TankService::new(state.db);
    let movements = service
        .get_tank_movements(current_user.0.company_id, tank_id)
        .await?;
    Ok(Json(movements))
}

/// Fill a tank
pub async fn fill_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
    Json(input): Json<TankMovementInput>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let service = TankService::new(state.db);
    let movement = service
        .fill(current_user.0.company_id, tank_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Draw volume out of a tank
pub async fn drawdown_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
    Json(input): Json<TankMovementInput>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let service = TankService::new(state.db);
    let movement = service
        .drawdown(current_user.0.company_id, tank_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Adjust a tank volume after stock opname
pub async fn adjust_tank(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(tank_id): Path<Uuid>,
    Json(input): Json<TankAdjustmentInput>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    let service = TankService::new(state.db);
    let movement = service
        .adjust(current_user.0.company_id, tank_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Transfer volume between two tanks
pub async fn transfer_between_tanks(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<TransferInput>,
) -> AppResult<(StatusCode, Json<TransferResult>)> {
    let service = TankService::new(state.db);
    let result = service
        .transfer(current_user.0.company_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}
