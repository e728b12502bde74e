//! Stock ledger service
//!
//! Maintains quantity-on-hand per (company, material) and records every
//! mutation as an immutable movement row carrying the balance before and
//! after. Balance rows are never written outside this module; corrections
//! are appended as reversing movements.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{apply_signed_quantity, MovementType};

/// Stock ledger service
#[derive(Clone)]
pub struct StockLedgerService {
    db: PgPool,
}

/// A stock movement record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockMovement {
    pub id: Uuid,
    pub company_id: Uuid,
    pub material_id: Uuid,
    pub tank_id: Option<Uuid>,
    pub movement_type: String,
    pub quantity: Decimal,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub reference_document: Option<String>,
    pub operator_name: String,
    pub created_at: DateTime<Utc>,
}

/// Current balance for a material
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StockBalance {
    pub material_id: Uuid,
    pub material_code: String,
    pub material_name: String,
    pub unit: String,
    pub quantity_on_hand: Decimal,
    pub updated_at: DateTime<Utc>,
}

/// Input for applying a ledger movement
#[derive(Debug, Deserialize)]
pub struct ApplyMovementInput {
    pub material_id: Uuid,
    /// Positive for IN, negative for OUT; ADJUSTMENT accepts either sign
    pub signed_quantity: Decimal,
    pub movement_type: MovementType,
    pub reference_document: Option<String>,
}

/// Result of a ledger movement
#[derive(Debug, Serialize)]
pub struct MovementResult {
    pub new_balance: Decimal,
    pub movement: StockMovement,
}

impl StockLedgerService {
    /// Create a new StockLedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Apply a single ledger movement in its own transaction
    pub async fn apply_movement(
        &self,
        company_id: Uuid,
        operator_name: &str,
        input: ApplyMovementInput,
    ) -> AppResult<MovementResult> {
        validate_movement_input(&input)?;

        // Validate material belongs to company
        let material_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1 AND company_id = $2)",
        )
        .bind(input.material_id)
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        if !material_exists {
            return Err(AppError::NotFound("Material".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let movement = apply_movement_tx(
            &mut *tx,
            company_id,
            input.material_id,
            input.signed_quantity,
            input.movement_type,
            input.reference_document.as_deref(),
            operator_name,
        )
        .await?;

        tx.commit().await?;

        Ok(MovementResult {
            new_balance: movement.balance_after,
            movement,
        })
    }

    /// Get the current balance for a material
    pub async fn get_balance(&self, company_id: Uuid, material_id: Uuid) -> AppResult<StockBalance> {
        let balance = sqlx::query_as::<_, StockBalance>(
            r#"
            SELECT m.id as material_id, m.code as material_code, m.name as material_name, m.unit,
                   COALESCE(sb.quantity_on_hand, 0) as quantity_on_hand,
                   COALESCE(sb.updated_at, m.created_at) as updated_at
            FROM materials m
            LEFT JOIN stock_balances sb ON sb.material_id = m.id AND sb.company_id = m.company_id
            WHERE m.id = $1 AND m.company_id = $2
            "#,
        )
        .bind(material_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        Ok(balance)
    }

    /// List balances for all materials of a company
    pub async fn list_balances(&self, company_id: Uuid) -> AppResult<Vec<StockBalance>> {
        let balances = sqlx::query_as::<_, StockBalance>(
            r#"
            SELECT m.id as material_id, m.code as material_code, m.name as material_name, m.unit,
                   COALESCE(sb.quantity_on_hand, 0) as quantity_on_hand,
                   COALESCE(sb.updated_at, m.created_at) as updated_at
            FROM materials m
            LEFT JOIN stock_balances sb ON sb.material_id = m.id AND sb.company_id = m.company_id
            WHERE m.company_id = $1
            ORDER BY m.code
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(balances)
    }

    /// Get movement history for a material, newest first
    pub async fn get_movements(
        &self,
        company_id: Uuid,
        material_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        let material_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1 AND company_id = $2)",
        )
        .bind(material_id)
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        if !material_exists {
            return Err(AppError::NotFound("Material".to_string()));
        }

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, company_id, material_id, tank_id, movement_type, quantity,
                   balance_before, balance_after, reference_document, operator_name, created_at
            FROM stock_movements
            WHERE company_id = $1 AND material_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(material_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// List all movements for a company, newest first
    pub async fn list_movements(&self, company_id: Uuid) -> AppResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, company_id, material_id, tank_id, movement_type, quantity,
                   balance_before, balance_after, reference_document, operator_name, created_at
            FROM stock_movements
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }
}

/// Validate an apply-movement input before touching the database.
fn validate_movement_input(input: &ApplyMovementInput) -> AppResult<()> {
    if input.signed_quantity.is_zero() {
        return Err(AppError::Validation {
            field: "signed_quantity".to_string(),
            message: "Quantity must not be zero".to_string(),
            message_id: "Jumlah tidak boleh nol".to_string(),
        });
    }

    // The movement type must agree with the sign; only ADJUSTMENT accepts both
    let sign_ok = match input.movement_type {
        MovementType::In => input.signed_quantity > Decimal::ZERO,
        MovementType::Out => input.signed_quantity < Decimal::ZERO,
        MovementType::Adjustment => true,
        // Transfers exist only between tanks
        MovementType::Transfer => false,
    };

    if !sign_ok {
        return Err(AppError::Validation {
            field: "movement_type".to_string(),
            message: "Movement type does not match quantity sign".to_string(),
            message_id: "Jenis pergerakan tidak sesuai dengan tanda jumlah".to_string(),
        });
    }

    Ok(())
}

/// Apply a material-level ledger movement inside an existing transaction.
///
/// Locks the balance row, rejects any movement that would drive the balance
/// negative, then writes the updated balance and the movement record. Used
/// directly by this service and composed into larger transactions by the
/// production, procurement, and shipment services.
pub async fn apply_movement_tx(
    conn: &mut PgConnection,
    company_id: Uuid,
    material_id: Uuid,
    signed_quantity: Decimal,
    movement_type: MovementType,
    reference_document: Option<&str>,
    operator_name: &str,
) -> AppResult<StockMovement> {
    // Ensure the balance row exists, then lock it for the rest of the
    // transaction. Concurrent movements on the same material serialize here.
    sqlx::query(
        r#"
        INSERT INTO stock_balances (company_id, material_id)
        VALUES ($1, $2)
        ON CONFLICT (company_id, material_id) DO NOTHING
        "#,
    )
    .bind(company_id)
    .bind(material_id)
    .execute(&mut *conn)
    .await?;

    let balance_before = sqlx::query_scalar::<_, Decimal>(
        "SELECT quantity_on_hand FROM stock_balances WHERE company_id = $1 AND material_id = $2 FOR UPDATE",
    )
    .bind(company_id)
    .bind(material_id)
    .fetch_one(&mut *conn)
    .await?;

    let balance_after = apply_signed_quantity(balance_before, signed_quantity).ok_or_else(|| {
        AppError::InsufficientStock(format!(
            "movement of {} against balance {}",
            signed_quantity, balance_before
        ))
    })?;

    sqlx::query(
        r#"
        UPDATE stock_balances
        SET quantity_on_hand = $1, updated_at = NOW()
        WHERE company_id = $2 AND material_id = $3
        "#,
    )
    .bind(balance_after)
    .bind(company_id)
    .bind(material_id)
    .execute(&mut *conn)
    .await?;

    let movement = sqlx::query_as::<_, StockMovement>(
        r#"
        INSERT INTO stock_movements (company_id, material_id, movement_type, quantity,
                                     balance_before, balance_after, reference_document, operator_name)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id, company_id, material_id, tank_id, movement_type, quantity,
                  balance_before, balance_after, reference_document, operator_name, created_at
        "#,
    )
    .bind(company_id)
    .bind(material_id)
    .bind(movement_type.as_str())
    .bind(signed_quantity.abs())
    .bind(balance_before)
    .bind(balance_after)
    .bind(reference_document)
    .bind(operator_name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(movement)
}

/// Read the current balance of a material inside an existing transaction,
/// locking the row so the value stays valid until commit.
pub async fn balance_for_update(
    conn: &mut PgConnection,
    company_id: Uuid,
    material_id: Uuid,
) -> AppResult<Decimal> {
    sqlx::query(
        r#"
        INSERT INTO stock_balances (company_id, material_id)
        VALUES ($1, $2)
        ON CONFLICT (company_id, material_id) DO NOTHING
        "#,
    )
    .bind(company_id)
    .bind(material_id)
    .execute(&mut *conn)
    .await?;

    let balance = sqlx::query_scalar::<_, Decimal>(
        "SELECT quantity_on_hand FROM stock_balances WHERE company_id = $1 AND material_id = $2 FOR UPDATE",
    )
    .bind(company_id)
    .bind(material_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(balance)
}
