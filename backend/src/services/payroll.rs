//! Payroll import service
//!
//! Monthly payroll arrives as a CSV export from the HR spreadsheet. The whole
//! file is validated row by row before anything is written; one bad row
//! rejects the import with its row number. Re-importing a period replaces the
//! previous entries in the same transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::validate_payroll_period;
use shared::PayrollRow;

/// Payroll service
#[derive(Clone)]
pub struct PayrollService {
    db: PgPool,
}

/// A payroll period summary
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PayrollPeriod {
    pub id: Uuid,
    pub company_id: Uuid,
    pub period: String,
    pub imported_by: String,
    pub imported_at: DateTime<Utc>,
    pub entry_count: i32,
    pub total_net_pay: Decimal,
}

/// A payroll entry
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PayrollEntry {
    pub id: Uuid,
    pub period_id: Uuid,
    pub employee_number: String,
    pub employee_name: String,
    pub base_salary: Decimal,
    pub allowance: Decimal,
    pub deduction: Decimal,
    pub net_pay: Decimal,
}

/// Input for importing a payroll CSV
#[derive(Debug, Deserialize)]
pub struct ImportPayrollInput {
    /// Period in YYYY-MM format
    pub period: String,
    /// CSV content with header:
    /// employee_number,employee_name,base_salary,allowance,deduction
    pub csv_content: String,
}

impl PayrollService {
    /// Create a new PayrollService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Import a payroll period from CSV, replacing any previous import
    pub async fn import_payroll(
        &self,
        company_id: Uuid,
        imported_by: &str,
        input: ImportPayrollInput,
    ) -> AppResult<PayrollPeriod> {
        if let Err(msg) = validate_payroll_period(&input.period) {
            return Err(AppError::Validation {
                field: "period".to_string(),
                message: msg.to_string(),
                message_id: "Periode harus dalam format YYYY-MM".to_string(),
            });
        }

        let rows = parse_payroll_csv(&input.csv_content)?;

        if rows.is_empty() {
            return Err(AppError::Validation {
                field: "csv_content".to_string(),
                message: "Payroll file has no data rows".to_string(),
                message_id: "Berkas gaji tidak memiliki baris data".to_string(),
            });
        }

        // Duplicate employee numbers within one file are an input error
        let mut seen = std::collections::HashSet::new();
        for (line, row) in &rows {
            if !seen.insert(row.employee_number.clone()) {
                return Err(AppError::Validation {
                    field: "csv_content".to_string(),
                    message: format!(
                        "Row {}: duplicate employee number {}",
                        line, row.employee_number
                    ),
                    message_id: format!(
                        "Baris {}: nomor pegawai {} duplikat",
                        line, row.employee_number
                    ),
                });
            }
        }

        let entry_count = rows.len() as i32;
        let total_net_pay: Decimal = rows.iter().map(|(_, r)| r.net_pay()).sum();

        // Replace the period atomically
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM payroll_periods WHERE company_id = $1 AND period = $2")
            .bind(company_id)
            .bind(&input.period)
            .execute(&mut *tx)
            .await?;

        let period = sqlx::query_as::<_, PayrollPeriod>(
            r#"
            INSERT INTO payroll_periods (company_id, period, imported_by, entry_count, total_net_pay)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, company_id, period, imported_by, imported_at, entry_count, total_net_pay
            "#,
        )
        .bind(company_id)
        .bind(&input.period)
        .bind(imported_by)
        .bind(entry_count)
        .bind(total_net_pay)
        .fetch_one(&mut *tx)
        .await?;

        for (_, row) in &rows {
            sqlx::query(
                r#"
                INSERT INTO payroll_entries (period_id, employee_number, employee_name,
                                             base_salary, allowance, deduction, net_pay)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(period.id)
            .bind(&row.employee_number)
            .bind(&row.employee_name)
            .bind(row.base_salary)
            .bind(row.allowance)
            .bind(row.deduction)
            .bind(row.net_pay())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(period)
    }

    /// List imported periods, newest first
    pub async fn list_periods(&self, company_id: Uuid) -> AppResult<Vec<PayrollPeriod>> {
        let periods = sqlx::query_as::<_, PayrollPeriod>(
            r#"
            SELECT id, company_id, period, imported_by, imported_at, entry_count, total_net_pay
            FROM payroll_periods
            WHERE company_id = $1
            ORDER BY period DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(periods)
    }

    /// Get the entries of a period
    pub async fn get_entries(
        &self,
        company_id: Uuid,
        period_id: Uuid,
    ) -> AppResult<Vec<PayrollEntry>> {
        let period_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM payroll_periods WHERE id = $1 AND company_id = $2)",
        )
        .bind(period_id)
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        if !period_exists {
            return Err(AppError::NotFound("Payroll period".to_string()));
        }

        let entries = sqlx::query_as::<_, PayrollEntry>(
            r#"
            SELECT id, period_id, employee_number, employee_name, base_salary, allowance,
                   deduction, net_pay
            FROM payroll_entries
            WHERE period_id = $1
            ORDER BY employee_number
            "#,
        )
        .bind(period_id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }
}

/// Parse and validate payroll CSV content.
///
/// Returns the rows with their 1-based line numbers (header is line 1). The
/// first invalid row fails the whole parse.
pub fn parse_payroll_csv(content: &str) -> AppResult<Vec<(usize, PayrollRow)>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();

    for (index, record) in reader.records().enumerate() {
        let line = index + 2; // 1-based, after the header

        let record = record.map_err(|e| AppError::Validation {
            field: "csv_content".to_string(),
            message: format!("Row {}: {}", line, e),
            message_id: format!("Baris {}: tidak dapat dibaca", line),
        })?;

        if record.len() != 5 {
            return Err(AppError::Validation {
                field: "csv_content".to_string(),
                message: format!("Row {}: expected 5 columns, found {}", line, record.len()),
                message_id: format!("Baris {}: jumlah kolom harus 5", line),
            });
        }

        let parse_decimal = |field: &str, name: &str| {
            Decimal::from_str(field).map_err(|_| AppError::Validation {
                field: "csv_content".to_string(),
                message: format!("Row {}: invalid {} value '{}'", line, name, field),
                message_id: format!("Baris {}: nilai {} tidak valid", line, name),
            })
        };

        let row = PayrollRow {
            employee_number: record[0].to_string(),
            employee_name: record[1].to_string(),
            base_salary: parse_decimal(&record[2], "base_salary")?,
            allowance: parse_decimal(&record[3], "allowance")?,
            deduction: parse_decimal(&record[4], "deduction")?,
        };

        if let Err(msg) = row.validate() {
            return Err(AppError::Validation {
                field: "csv_content".to_string(),
                message: format!("Row {}: {}", line, msg),
                message_id: format!("Baris {}: data gaji tidak valid", line),
            });
        }

        rows.push((line, row));
    }

    Ok(rows)
}
