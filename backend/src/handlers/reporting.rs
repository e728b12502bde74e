//! HTTP handlers for reporting and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::reporting::{DashboardMetrics, ReportFilter, ReportingService};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub format: Option<String>, // "json" or "csv"
}

impl ReportQuery {
    fn filter(&self) -> ReportFilter {
        ReportFilter {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Stock summary per material
pub async fn get_stock_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<axum::response::Response> {
    let service = ReportingService::new(state.db);
    let data = service.get_stock_summary(current_user.0.company_id).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"stock_summary.csv\"",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(data).into_response())
}

/// Production yield report
pub async fn get_production_yield_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<axum::response::Response> {
    let service = ReportingService::new(state.db);
    let data = service
        .get_production_yield_report(current_user.0.company_id, &query.filter())
        .await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"production_yield.csv\"",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(data).into_response())
}

/// TBS intake report per supplier
pub async fn get_tbs_intake_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<axum::response::Response> {
    let service = ReportingService::new(state.db);
    let data = service
        .get_tbs_intake_report(current_user.0.company_id, &query.filter())
        .await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        return Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"tbs_intake.csv\"",
                ),
            ],
            csv,
        )
            .into_response());
    }

    Ok(Json(data).into_response())
}

/// Dashboard metrics
pub async fn get_dashboard_metrics(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<DashboardMetrics>> {
    let service = ReportingService::new(state.db);
    let metrics = service
        .get_dashboard_metrics(current_user.0.company_id)
        .await?;
    Ok(Json(metrics))
}
