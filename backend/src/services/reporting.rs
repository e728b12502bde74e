//! Reporting service for analytics and data export
//! Provides stock, production yield, and TBS intake reports

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// Stock summary entry per material
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockSummaryReport {
    pub material_id: Uuid,
    pub material_code: String,
    pub material_name: String,
    pub category: String,
    pub quantity_on_hand: Decimal,
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub movement_count: i64,
}

/// Production yield entry per output material
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProductionYieldReport {
    pub output_material_id: Uuid,
    pub output_material_code: String,
    pub batch_count: i64,
    pub total_input_quantity: Decimal,
    pub total_output_quantity: Decimal,
    pub avg_yield_percent: Option<Decimal>,
}

/// TBS intake entry per supplier
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct TbsIntakeReport {
    pub supplier_id: Uuid,
    pub supplier_code: String,
    pub supplier_name: String,
    pub ticket_count: i64,
    pub total_accepted_kg: Decimal,
    pub total_paid: Decimal,
}

/// Dashboard metrics
#[derive(Debug, Serialize)]
pub struct DashboardMetrics {
    pub tickets_today: i64,
    pub open_purchase_orders: i64,
    pub batches_in_progress: i64,
    pub tank_count: i64,
    pub total_tank_volume: Decimal,
    pub pending_shipments: i64,
}

/// Report filter parameters
#[derive(Debug, Deserialize)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Stock summary per material with movement totals
    pub async fn get_stock_summary(&self, company_id: Uuid) -> AppResult<Vec<StockSummaryReport>> {
        let reports = sqlx::query_as::<_, StockSummaryReport>(
            r#"
            SELECT
                m.id as material_id,
                m.code as material_code,
                m.name as material_name,
                m.category,
                COALESCE(sb.quantity_on_hand, 0) as quantity_on_hand,
                COALESCE(SUM(CASE WHEN sm.movement_type = 'in' AND sm.tank_id IS NULL
                                  THEN sm.quantity ELSE 0 END), 0) as total_in,
                COALESCE(SUM(CASE WHEN sm.movement_type = 'out' AND sm.tank_id IS NULL
                                  THEN sm.quantity ELSE 0 END), 0) as total_out,
                COUNT(sm.id) as movement_count
            FROM materials m
            LEFT JOIN stock_balances sb ON sb.material_id = m.id AND sb.company_id = m.company_id
            LEFT JOIN stock_movements sm ON sm.material_id = m.id AND sm.company_id = m.company_id
            WHERE m.company_id = $1
            GROUP BY m.id, m.code, m.name, m.category, sb.quantity_on_hand
            ORDER BY m.code
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(reports)
    }

    /// Production yield report per output material over a date range
    pub async fn get_production_yield_report(
        &self,
        company_id: Uuid,
        filter: &ReportFilter,
    ) -> AppResult<Vec<ProductionYieldReport>> {
        let start = filter
            .start_date
            .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let end = filter
            .end_date
            .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap());

        let reports = sqlx::query_as::<_, ProductionYieldReport>(
            r#"
            SELECT
                py.output_material_id,
                m.code as output_material_code,
                COUNT(DISTINCT pb.id) as batch_count,
                COALESCE(SUM(pb.input_quantity), 0) as total_input_quantity,
                COALESCE(SUM(py.output_quantity), 0) as total_output_quantity,
                AVG(py.yield_percentage) as avg_yield_percent
            FROM production_yields py
            JOIN production_batches pb ON pb.id = py.batch_id
            JOIN materials m ON m.id = py.output_material_id
            WHERE pb.company_id = $1
              AND pb.status = 'completed'
              AND pb.batch_date BETWEEN $2 AND $3
            GROUP BY py.output_material_id, m.code
            ORDER BY m.code
            "#,
        )
        .bind(company_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(reports)
    }

    /// TBS intake report per supplier over a date range
    pub async fn get_tbs_intake_report(
        &self,
        company_id: Uuid,
        filter: &ReportFilter,
    ) -> AppResult<Vec<TbsIntakeReport>> {
        let start = filter
            .start_date
            .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        let end = filter
            .end_date
            .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap());

        let reports = sqlx::query_as::<_, TbsIntakeReport>(
            r#"
            SELECT
                s.id as supplier_id,
                s.code as supplier_code,
                s.name as supplier_name,
                COUNT(wt.id) as ticket_count,
                COALESCE(SUM(wt.accepted_weight_kg), 0) as total_accepted_kg,
                COALESCE(SUM(wt.total_price), 0) as total_paid
            FROM suppliers s
            JOIN weighbridge_tickets wt ON wt.supplier_id = s.id
            WHERE s.company_id = $1
              AND wt.status = 'posted'
              AND wt.weighed_in_at::date BETWEEN $2 AND $3
            GROUP BY s.id, s.code, s.name
            ORDER BY total_accepted_kg DESC
            "#,
        )
        .bind(company_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.db)
        .await?;

        Ok(reports)
    }

    /// Dashboard metrics for the landing page
    pub async fn get_dashboard_metrics(&self, company_id: Uuid) -> AppResult<DashboardMetrics> {
        let tickets_today = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM weighbridge_tickets WHERE company_id = $1 AND weighed_in_at::date = CURRENT_DATE",
        )
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        let open_purchase_orders = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM purchase_orders WHERE company_id = $1 AND status = 'open'",
        )
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        let batches_in_progress = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM production_batches WHERE company_id = $1 AND status = 'in_progress'",
        )
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        let (tank_count, total_tank_volume) = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(current_volume), 0) FROM tanks WHERE company_id = $1",
        )
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        let pending_shipments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM shipments WHERE company_id = $1 AND status = 'draft'",
        )
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        Ok(DashboardMetrics {
            tickets_today,
            open_purchase_orders,
            batches_in_progress,
            tank_count,
            total_tank_volume,
            pending_shipments,
        })
    }

    /// Export any serializable report rows to CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for row in data {
            wtr.serialize(row)
                .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
        }

        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| AppError::Internal(format!("CSV encoding error: {}", e)))?;

        Ok(csv_data)
    }
}
