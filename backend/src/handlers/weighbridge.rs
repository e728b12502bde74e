//! HTTP handlers for weighbridge tickets

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::weighbridge::{
    WeighInInput, WeighOutInput, WeighbridgeService, WeighbridgeTicket,
};
use crate::AppState;

/// List all tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<WeighbridgeTicket>>> {
    let service = WeighbridgeService::new(state.db);
    let tickets = service.list_tickets(current_user.0.company_id).await?;
    Ok(Json(tickets))
}

/// Get a ticket
pub async fn get_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<WeighbridgeTicket>> {
    let service = WeighbridgeService::new(state.db);
    let ticket = service
        .get_ticket(current_user.0.company_id, ticket_id)
        .await?;
    Ok(Json(ticket))
}

/// Record the first weighing of a loaded vehicle
pub async fn weigh_in(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<WeighInInput>,
) -> AppResult<(StatusCode, Json<WeighbridgeTicket>)> {
    let service = WeighbridgeService::new(state.db);
    let ticket = service
        .weigh_in(current_user.0.company_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Record the second weighing of the empty vehicle
pub async fn weigh_out(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
    Json(input): Json<WeighOutInput>,
) -> AppResult<Json<WeighbridgeTicket>> {
    let service = WeighbridgeService::new(state.db);
    let ticket = service
        .weigh_out(current_user.0.company_id, ticket_id, input)
        .await?;
    Ok(Json(ticket))
}

/// Post a weighed-out ticket to the stock ledger
pub async fn post_ticket(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(ticket_id): Path<Uuid>,
) -> AppResult<Json<WeighbridgeTicket>> {
    let service = WeighbridgeService::new(state.db);
    let ticket = service
        .post_ticket(current_user.0.company_id, ticket_id, &current_user.0.name)
        .await?;
    Ok(Json(ticket))
}
