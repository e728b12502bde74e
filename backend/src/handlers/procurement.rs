//! HTTP handlers for warehouse procurement

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::procurement::{
    CreateIssueInput, CreateOrderInput, CreateRequestInput, GoodsIssue, GoodsReceipt,
    OrderWithItems, ProcurementService, PurchaseOrder, PurchaseRequest, ReceiveOrderInput,
    RequestWithItems,
};
use crate::AppState;
use shared::PurchaseRequestStatus;

#[derive(Debug, Deserialize)]
pub struct RequestTransitionInput {
    pub status: PurchaseRequestStatus,
}

// ---------------------------------------------------------------------------
// Purchase requests
// ---------------------------------------------------------------------------

/// List purchase requests
pub async fn list_requests(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<PurchaseRequest>>> {
    let service = ProcurementService::new(state.db);
    let requests = service.list_requests(current_user.0.company_id).await?;
    Ok(Json(requests))
}

/// Get a purchase request with lines
pub async fn get_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
) -> AppResult<Json<RequestWithItems>> {
    let service = ProcurementService::new(state.db);
    let request = service
        .get_request(current_user.0.company_id, request_id)
        .await?;
    Ok(Json(request))
}

/// Create a purchase request
pub async fn create_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateRequestInput>,
) -> AppResult<(StatusCode, Json<RequestWithItems>)> {
    let service = ProcurementService::new(state.db);
    let request = service
        .create_request(current_user.0.company_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Move a purchase request to a new status
pub async fn transition_request(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(request_id): Path<Uuid>,
    Json(input): Json<RequestTransitionInput>,
) -> AppResult<Json<PurchaseRequest>> {
    let service = ProcurementService::new(state.db);
    let request = service
        .transition_request(current_user.0.company_id, request_id, input.status)
        .await?;
    Ok(Json(request))
}

// ---------------------------------------------------------------------------
// Purchase orders
// ---------------------------------------------------------------------------

/// List purchase orders
pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<PurchaseOrder>>> {
    let service = ProcurementService::new(state.db);
    let orders = service.list_orders(current_user.0.company_id).await?;
    Ok(Json(orders))
}

/// Get a purchase order with lines
pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    let service = ProcurementService::new(state.db);
    let order = service.get_order(current_user.0.company_id, order_id).await?;
    Ok(Json(order))
}

/// Create a purchase order
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<OrderWithItems>)> {
    let service = ProcurementService::new(state.db);
    let order = service.create_order(current_user.0.company_id, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Cancel an open purchase order
pub async fn cancel_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = ProcurementService::new(state.db);
    let order = service
        .cancel_order(current_user.0.company_id, order_id)
        .await?;
    Ok(Json(order))
}

/// Receive goods against an order
pub async fn receive_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<ReceiveOrderInput>,
) -> AppResult<(StatusCode, Json<GoodsReceipt>)> {
    let service = ProcurementService::new(state.db);
    let receipt = service
        .receive_order(
            current_user.0.company_id,
            order_id,
            &current_user.0.name,
            input,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

// ---------------------------------------------------------------------------
// Goods issues
// ---------------------------------------------------------------------------

/// List goods issues
pub async fn list_issues(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<GoodsIssue>>> {
    let service = ProcurementService::new(state.db);
    let issues = service.list_issues(current_user.0.company_id).await?;
    Ok(Json(issues))
}

/// Issue goods out of the warehouse
pub async fn create_issue(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateIssueInput>,
) -> AppResult<(StatusCode, Json<GoodsIssue>)> {
    let service = ProcurementService::new(state.db);
    let issue = service
        .create_issue(current_user.0.company_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(issue)))
}
