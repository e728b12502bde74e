//! Production batch service
//!
//! Records TBS consumption and CPO/kernel yields per batch. A batch affects
//! stock exactly once, when it enters the completed state: one ledger OUT
//! for the input material and one ledger IN per output, all inside the same
//! transaction as the status change. Leaving the completed state applies the
//! mirror-image movements, restoring the pre-completion balances.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::apply_movement_tx;
use shared::{yield_percentage, BatchStatus, MovementType};

/// Production service
#[derive(Clone)]
pub struct ProductionService {
    db: PgPool,
}

/// A production batch
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductionBatch {
    pub id: Uuid,
    pub company_id: Uuid,
    pub batch_number: String,
    pub batch_date: NaiveDate,
    pub input_material_id: Uuid,
    pub input_quantity: Decimal,
    pub status: String,
    pub operator_name: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One output of a batch with its cached yield percentage
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductionYield {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub output_material_id: Uuid,
    pub output_quantity: Decimal,
    pub yield_percentage: Decimal,
    pub created_at: DateTime<Utc>,
}

/// A batch together with its outputs
#[derive(Debug, Clone, Serialize)]
pub struct BatchWithYields {
    #[serde(flatten)]
    pub batch: ProductionBatch,
    pub yields: Vec<ProductionYield>,
}

/// One output line in a batch input
#[derive(Debug, Clone, Deserialize)]
pub struct OutputInput {
    pub output_material_id: Uuid,
    pub output_quantity: Decimal,
}

/// Input for recording a batch
#[derive(Debug, Deserialize)]
pub struct RecordBatchInput {
    pub batch_date: Option<NaiveDate>,
    pub input_material_id: Uuid,
    pub input_quantity: Decimal,
    pub outputs: Vec<OutputInput>,
    pub notes: Option<String>,
}

/// Input for editing a batch that is still draft or in progress
#[derive(Debug, Deserialize)]
pub struct UpdateBatchInput {
    pub batch_date: Option<NaiveDate>,
    pub input_quantity: Option<Decimal>,
    pub outputs: Option<Vec<OutputInput>>,
    pub notes: Option<String>,
}

/// Input for a status transition
#[derive(Debug, Deserialize)]
pub struct TransitionInput {
    pub status: BatchStatus,
}

impl ProductionService {
    /// Create a new ProductionService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a new batch in draft state
    pub async fn record_batch(
        &self,
        company_id: Uuid,
        operator_name: &str,
        input: RecordBatchInput,
    ) -> AppResult<BatchWithYields> {
        validate_quantities(input.input_quantity, &input.outputs)?;

        // Validate input material belongs to company
        let material_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1 AND company_id = $2)",
        )
        .bind(input.input_material_id)
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        if !material_exists {
            return Err(AppError::NotFound("Input material".to_string()));
        }

        for output in &input.outputs {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1 AND company_id = $2)",
            )
            .bind(output.output_material_id)
            .bind(company_id)
            .fetch_one(&self.db)
            .await?;

            if !exists {
                return Err(AppError::NotFound("Output material".to_string()));
            }
        }

        let batch_date = input.batch_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let batch_number = next_batch_number(&mut tx, company_id, batch_date).await?;

        let batch = sqlx::query_as::<_, ProductionBatch>(
            r#"
            INSERT INTO production_batches (company_id, batch_number, batch_date,
                                            input_material_id, input_quantity, status,
                                            operator_name, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, company_id, batch_number, batch_date, input_material_id, input_quantity,
                      status, operator_name, completed_at, notes, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&batch_number)
        .bind(batch_date)
        .bind(input.input_material_id)
        .bind(input.input_quantity)
        .bind(BatchStatus::Draft.as_str())
        .bind(operator_name)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let yields =
            insert_yields(&mut tx, batch.id, input.input_quantity, &input.outputs).await?;

        tx.commit().await?;

        Ok(BatchWithYields { batch, yields })
    }

    /// Get a batch with its outputs
    pub async fn get_batch(&self, company_id: Uuid, batch_id: Uuid) -> AppResult<BatchWithYields> {
        let batch = sqlx::query_as::<_, ProductionBatch>(
            r#"
            SELECT id, company_id, batch_number, batch_date, input_material_id, input_quantity,
                   status, operator_name, completed_at, notes, created_at, updated_at
            FROM production_batches
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(batch_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Production batch".to_string()))?;

        let yields = sqlx::query_as::<_, ProductionYield>(
            r#"
            SELECT id, batch_id, output_material_id, output_quantity, yield_percentage, created_at
            FROM production_yields
            WHERE batch_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(batch_id)
        .fetch_all(&self.db)
        .await?;

        Ok(BatchWithYields { batch, yields })
    }

    /// List all batches for a company, newest first
    pub async fn list_batches(&self, company_id: Uuid) -> AppResult<Vec<ProductionBatch>> {
        let batches = sqlx::query_as::<_, ProductionBatch>(
            r#"
            SELECT id, company_id, batch_number, batch_date, input_material_id, input_quantity,
                   status, operator_name, completed_at, notes, created_at, updated_at
            FROM production_batches
            WHERE company_id = $1
            ORDER BY batch_date DESC, created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(batches)
    }

    /// Update a batch that is still draft or in progress
    pub async fn update_batch(
        &self,
        company_id: Uuid,
        batch_id: Uuid,
        input: UpdateBatchInput,
    ) -> AppResult<BatchWithYields> {
        let existing = self.get_batch(company_id, batch_id).await?;
        let status = parse_status(&existing.batch.status)?;

        if !status.is_editable() {
            return Err(AppError::IllegalStateTransition(format!(
                "batch {} is {} and cannot be edited",
                existing.batch.batch_number, existing.batch.status
            )));
        }

        let input_quantity = input.input_quantity.unwrap_or(existing.batch.input_quantity);
        let outputs: Vec<OutputInput> = match &input.outputs {
            Some(outputs) => outputs.clone(),
            None => existing
                .yields
                .iter()
                .map(|y| OutputInput {
                    output_material_id: y.output_material_id,
                    output_quantity: y.output_quantity,
                })
                .collect(),
        };

        validate_quantities(input_quantity, &outputs)?;

        let batch_date = input.batch_date.unwrap_or(existing.batch.batch_date);

        let mut tx = self.db.begin().await?;

        let batch = sqlx::query_as::<_, ProductionBatch>(
            r#"
            UPDATE production_batches
            SET batch_date = $1, input_quantity = $2, notes = COALESCE($3, notes), updated_at = NOW()
            WHERE id = $4
            RETURNING id, company_id, batch_number, batch_date, input_material_id, input_quantity,
                      status, operator_name, completed_at, notes, created_at, updated_at
            "#,
        )
        .bind(batch_date)
        .bind(input_quantity)
        .bind(&input.notes)
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await?;

        // Yields are a derived snapshot of the outputs; replace them wholesale
        sqlx::query("DELETE FROM production_yields WHERE batch_id = $1")
            .bind(batch_id)
            .execute(&mut *tx)
            .await?;

        let yields = insert_yields(&mut tx, batch_id, input_quantity, &outputs).await?;

        tx.commit().await?;

        Ok(BatchWithYields { batch, yields })
    }

    /// Delete a batch that is still draft or in progress
    pub async fn delete_batch(&self, company_id: Uuid, batch_id: Uuid) -> AppResult<()> {
        let existing = self.get_batch(company_id, batch_id).await?;
        let status = parse_status(&existing.batch.status)?;

        if !status.is_editable() {
            return Err(AppError::IllegalStateTransition(format!(
                "batch {} is {} and cannot be deleted",
                existing.batch.batch_number, existing.batch.status
            )));
        }

        sqlx::query("DELETE FROM production_batches WHERE id = $1")
            .bind(batch_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Transition a batch to a new status.
    ///
    /// Entering completed applies the stock effect; leaving it toward
    /// cancelled reverses the effect. Both happen in the same transaction as
    /// the status update.
    pub async fn transition(
        &self,
        company_id: Uuid,
        batch_id: Uuid,
        operator_name: &str,
        next: BatchStatus,
    ) -> AppResult<BatchWithYields> {
        let existing = self.get_batch(company_id, batch_id).await?;
        let current = parse_status(&existing.batch.status)?;

        if !current.can_transition_to(next) {
            return Err(AppError::IllegalStateTransition(format!(
                "batch {} cannot move from {} to {}",
                existing.batch.batch_number,
                current.as_str(),
                next.as_str()
            )));
        }

        let mut tx = self.db.begin().await?;

        match (current, next) {
            // Applying the stock effect: consume input, produce outputs
            (BatchStatus::InProgress, BatchStatus::Completed)
            | (BatchStatus::Cancelled, BatchStatus::Completed) => {
                if existing.yields.is_empty() {
                    return Err(AppError::Validation {
                        field: "outputs".to_string(),
                        message: "Batch has no outputs to complete".to_string(),
                        message_id: "Batch tidak memiliki hasil produksi".to_string(),
                    });
                }

                apply_movement_tx(
                    &mut *tx,
                    company_id,
                    existing.batch.input_material_id,
                    -existing.batch.input_quantity,
                    MovementType::Out,
                    Some(&existing.batch.batch_number),
                    operator_name,
                )
                .await?;

                for y in &existing.yields {
                    apply_movement_tx(
                        &mut *tx,
                        company_id,
                        y.output_material_id,
                        y.output_quantity,
                        MovementType::In,
                        Some(&existing.batch.batch_number),
                        operator_name,
                    )
                    .await?;
                }
            }
            // Reversing the stock effect: give the input back, take outputs out
            (BatchStatus::Completed, BatchStatus::Cancelled) => {
                apply_movement_tx(
                    &mut *tx,
                    company_id,
                    existing.batch.input_material_id,
                    existing.batch.input_quantity,
                    MovementType::In,
                    Some(&format!("reversal of {}", existing.batch.batch_number)),
                    operator_name,
                )
                .await?;

                for y in &existing.yields {
                    apply_movement_tx(
                        &mut *tx,
                        company_id,
                        y.output_material_id,
                        -y.output_quantity,
                        MovementType::Out,
                        Some(&format!("reversal of {}", existing.batch.batch_number)),
                        operator_name,
                    )
                    .await?;
                }
            }
            // Draft <-> InProgress carries no stock effect
            _ => {}
        }

        let completed_at = if next == BatchStatus::Completed {
            Some(Utc::now())
        } else {
            None
        };

        let batch = sqlx::query_as::<_, ProductionBatch>(
            r#"
            UPDATE production_batches
            SET status = $1, completed_at = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING id, company_id, batch_number, batch_date, input_material_id, input_quantity,
                      status, operator_name, completed_at, notes, created_at, updated_at
            "#,
        )
        .bind(next.as_str())
        .bind(completed_at)
        .bind(batch_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(BatchWithYields {
            batch,
            yields: existing.yields,
        })
    }
}

/// Validate input and output quantities before touching the database.
fn validate_quantities(input_quantity: Decimal, outputs: &[OutputInput]) -> AppResult<()> {
    if input_quantity <= Decimal::ZERO {
        return Err(AppError::Validation {
            field: "input_quantity".to_string(),
            message: "Input quantity must be positive".to_string(),
            message_id: "Jumlah bahan baku harus bernilai positif".to_string(),
        });
    }

    for output in outputs {
        if output.output_quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "output_quantity".to_string(),
                message: "Output quantity must be positive".to_string(),
                message_id: "Jumlah hasil produksi harus bernilai positif".to_string(),
            });
        }
    }

    let mut seen = std::collections::HashSet::new();
    for output in outputs {
        if !seen.insert(output.output_material_id) {
            return Err(AppError::Validation {
                field: "outputs".to_string(),
                message: "Duplicate output material".to_string(),
                message_id: "Material hasil produksi duplikat".to_string(),
            });
        }
    }

    Ok(())
}

fn parse_status(status: &str) -> AppResult<BatchStatus> {
    BatchStatus::parse(status)
        .ok_or_else(|| AppError::Internal(format!("Unknown batch status: {}", status)))
}

/// Insert yield rows with their cached percentages.
async fn insert_yields(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    batch_id: Uuid,
    input_quantity: Decimal,
    outputs: &[OutputInput],
) -> AppResult<Vec<ProductionYield>> {
    let mut yields = Vec::with_capacity(outputs.len());

    for output in outputs {
        let pct = yield_percentage(input_quantity, output.output_quantity);

        let row = sqlx::query_as::<_, ProductionYield>(
            r#"
            INSERT INTO production_yields (batch_id, output_material_id, output_quantity, yield_percentage)
            VALUES ($1, $2, $3, $4)
            RETURNING id, batch_id, output_material_id, output_quantity, yield_percentage, created_at
            "#,
        )
        .bind(batch_id)
        .bind(output.output_material_id)
        .bind(output.output_quantity)
        .bind(pct)
        .fetch_one(&mut **tx)
        .await?;

        yields.push(row);
    }

    Ok(yields)
}

/// Generate the next batch number for a company: PRD-YYYYMMDD-NNN scoped to
/// the batch date.
async fn next_batch_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: Uuid,
    batch_date: NaiveDate,
) -> AppResult<String> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM production_batches WHERE company_id = $1 AND batch_date = $2",
    )
    .bind(company_id)
    .bind(batch_date)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!(
        "PRD-{}{:02}{:02}-{:03}",
        batch_date.year(),
        batch_date.month(),
        batch_date.day(),
        count + 1
    ))
}
