//! HTTP handlers for payroll import

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::payroll::{
    ImportPayrollInput, PayrollEntry, PayrollPeriod, PayrollService,
};
use crate::AppState;

/// Import a payroll period from CSV
pub async fn import_payroll(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ImportPayrollInput>,
) -> AppResult<(StatusCode, Json<PayrollPeriod>)> {
    let service = PayrollService::new(state.db);
    let period = service
        .import_payroll(current_user.0.company_id, &current_user.0.name, input)
        .await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// List imported payroll periods
pub async fn list_periods(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<PayrollPeriod>>> {
    let service = PayrollService::new(state.db);
    let periods = service.list_periods(current_user.0.company_id).await?;
    Ok(Json(periods))
}

/// Get the entries of a payroll period
pub async fn get_period_entries(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(period_id): Path<Uuid>,
) -> AppResult<Json<Vec<PayrollEntry>>> {
    let service = PayrollService::new(state.db);
    let entries = service
        .get_entries(current_user.0.company_id, period_id)
        .await?;
    Ok(Json(entries))
}
