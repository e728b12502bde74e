//! HTTP handlers for production batches

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::production::{
    BatchWithYields, ProductionBatch, ProductionService, RecordBatchInput, TransitionInput,
    UpdateBatchInput,
};
use crate::AppState;

/// List all batches
pub async fn list_batches(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<ProductionBatch>>> {
    let service = ProductionService::new(state.db);
    let batches = service.list_batches(current_user.0.company_id).await?;
    Ok(Json(batches))
}

/// Get a batch with its outputs
pub async fn get_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<Json<BatchWithYields>> {
    let service = ProductionService::new(state.db);
    let batch = service.get_batch(current_user.0.company_id, batch_id).await?;
    Ok(Json(batch))
}

/// Record a new batch
pub async fn record_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordBatchInput>,
) -> AppResult<(StatusCode, Json<BatchWithYields>)> {
    let service = ProductionService::new(state.db);
    let batch = service
        .record_batch(current_user.0.company_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

/// Update a draft or in-progress batch
pub async fn update_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<UpdateBatchInput>,
) -> AppResult<Json<BatchWithYields>> {
    let service = ProductionService::new(state.db);
    let batch = service
        .update_batch(current_user.0.company_id, batch_id, input)
        .await?;
    Ok(Json(batch))
}

/// Delete a draft or in-progress batch
pub async fn delete_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = ProductionService::new(state.db);
    service
        .delete_batch(current_user.0.company_id, batch_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Transition a batch to a new status.
///
/// Completing a batch applies the stock effect; cancelling a completed batch
/// reverses it.
pub async fn transition_batch(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(batch_id): Path<Uuid>,
    Json(input): Json<TransitionInput>,
) -> AppResult<Json<BatchWithYields>> {
    let service = ProductionService::new(state.db);
    let batch = service
        .transition(
            current_user.0.company_id,
            batch_id,
            &current_user.0.name,
            input.status,
        )
        .await?;
    Ok(Json(batch))
}
