//! HTTP handlers for buyer master data

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::buyer::{Buyer, CreateBuyerInput, UpdateBuyerInput};
use crate::services::BuyerService;
use crate::AppState;

/// List all buyers
pub async fn list_buyers(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Buyer>>> {
    let service = BuyerService::new(state.db);
    let buyers = service.list_buyers(current_user.0.company_id).await?;
    Ok(Json(buyers))
}

/// Get a buyer
pub async fn get_buyer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(buyer_id): Path<Uuid>,
) -> AppResult<Json<Buyer>> {
    let service = BuyerService::new(state.db);
    let buyer = service.get_buyer(current_user.0.company_id, buyer_id).await?;
    Ok(Json(buyer))
}

/// Create a buyer
pub async fn create_buyer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateBuyerInput>,
) -> AppResult<(StatusCode, Json<Buyer>)> {
    let service = BuyerService::new(state.db);
    let buyer = service.create_buyer(current_user.0.company_id, input).await?;
    Ok((StatusCode::CREATED, Json(buyer)))
}

/// Update a buyer
pub async fn update_buyer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(buyer_id): Path<Uuid>,
    Json(input): Json<UpdateBuyerInput>,
) -> AppResult<Json<Buyer>> {
    let service = BuyerService::new(state.db);
    let buyer = service
        .update_buyer(current_user.0.company_id, buyer_id, input)
        .await?;
    Ok(Json(buyer))
}
