//! Storage tank service
//!
//! Tanks hold a single material for their lifetime. Fill, drawdown, and
//! adjustment movements keep `0 <= current_volume <= capacity`; transfers
//! move volume between two tanks of the same material as an atomic pair of
//! ledger entries. Every movement into a tank additionally respects the
//! company-wide bound: the summed volume of all tanks holding a material
//! never exceeds that material's stock balance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockMovement;
use shared::{check_transfer, MovementType, TransferCheck};

/// Tank service
#[derive(Clone)]
pub struct TankService {
    db: PgPool,
}

/// A storage tank
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tank {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub material_id: Uuid,
    pub capacity: Decimal,
    pub current_volume: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row used when locking tanks inside a transaction
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TankLockRow {
    pub(crate) id: Uuid,
    pub(crate) code: String,
    pub(crate) material_id: Uuid,
    pub(crate) capacity: Decimal,
    pub(crate) current_volume: Decimal,
}

/// Input for creating a tank
#[derive(Debug, Deserialize)]
pub struct CreateTankInput {
    pub code: String,
    pub name: String,
    pub material_id: Uuid,
    pub capacity: Decimal,
}

/// Input for a fill or drawdown movement
#[derive(Debug, Deserialize)]
pub struct TankMovementInput {
    pub quantity: Decimal,
    pub reference_document: Option<String>,
}

/// Input for a volume adjustment (signed)
#[derive(Debug, Deserialize)]
pub struct TankAdjustmentInput {
    pub signed_quantity: Decimal,
    pub reference_document: Option<String>,
}

/// Input for a tank-to-tank transfer
#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub source_tank_id: Uuid,
    pub destination_tank_id: Uuid,
    pub quantity: Decimal,
}

/// Result of a transfer: the paired movements
#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub source_movement: StockMovement,
    pub destination_movement: StockMovement,
}

impl TankService {
    /// Create a new TankService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a tank
    pub async fn create_tank(&self, company_id: Uuid, input: CreateTankInput) -> AppResult<Tank> {
        if input.capacity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "capacity".to_string(),
                message: "Capacity must be positive".to_string(),
                message_id: "Kapasitas harus bernilai positif".to_string(),
            });
        }

        if input.code.trim().is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Tank code is required".to_string(),
                message_id: "Kode tangki harus diisi".to_string(),
            });
        }

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

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tanks WHERE company_id = $1 AND code = $2",
        )
        .bind(company_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("tank code".to_string()));
        }

        let tank = sqlx::query_as::<_, Tank>(
            r#"
            INSERT INTO tanks (company_id, code, name, material_id, capacity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, company_id, code, name, material_id, capacity, current_volume,
                      created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.material_id)
        .bind(input.capacity)
        .fetch_one(&self.db)
        .await?;

        Ok(tank)
    }

    /// Get a tank by ID
    pub async fn get_tank(&self, company_id: Uuid, tank_id: Uuid) -> AppResult<Tank> {
        let tank = sqlx::query_as::<_, Tank>(
            r#"
            SELECT id, company_id, code, name, material_id, capacity, current_volume,
                   created_at, updated_at
            FROM tanks
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(tank_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Tank".to_string()))?;

        Ok(tank)
    }

    /// List all tanks for a company
    pub async fn list_tanks(&self, company_id: Uuid) -> AppResult<Vec<Tank>> {
        let tanks = sqlx::query_as::<_, Tank>(
            r#"
            SELECT id, company_id, code, name, material_id, capacity, current_volume,
                   created_at, updated_at
            FROM tanks
            WHERE company_id = $1
            ORDER BY code
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tanks)
    }

    /// Get movement history for a tank, newest first
    pub async fn get_tank_movements(
        &self,
        company_id: Uuid,
        tank_id: Uuid,
    ) -> AppResult<Vec<StockMovement>> {
        // Validate tank belongs to company
        self.get_tank(company_id, tank_id).await?;

        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, company_id, material_id, tank_id, movement_type, quantity,
                   balance_before, balance_after, reference_document, operator_name, created_at
            FROM stock_movements
            WHERE company_id = $1 AND tank_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .bind(tank_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Fill a tank (IN movement on the tank)
    pub async fn fill(
        &self,
        company_id: Uuid,
        tank_id: Uuid,
        operator_name: &str,
        input: TankMovementInput,
    ) -> AppResult<StockMovement> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_id: "Jumlah harus bernilai positif".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let tank = lock_tank(&mut *tx, company_id, tank_id).await?;

        let new_volume = tank.current_volume + input.quantity;
        if new_volume > tank.capacity {
            return Err(AppError::DestinationCapacityExceeded(format!(
                "tank {}: {} + {} exceeds capacity {}",
                tank.code, tank.current_volume, input.quantity, tank.capacity
            )));
        }

        check_tank_stock_bound(&mut *tx, company_id, &tank, input.quantity).await?;

        let movement = write_tank_movement(
            &mut *tx,
            company_id,
            &tank,
            MovementType::In,
            input.quantity,
            new_volume,
            input.reference_document.as_deref(),
            operator_name,
        )
        .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Draw volume out of a tank (OUT movement on the tank)
    pub async fn drawdown(
        &self,
        company_id: Uuid,
        tank_id: Uuid,
        operator_name: &str,
        input: TankMovementInput,
    ) -> AppResult<StockMovement> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_id: "Jumlah harus bernilai positif".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let tank = lock_tank(&mut *tx, company_id, tank_id).await?;

        if tank.current_volume < input.quantity {
            return Err(AppError::InsufficientSourceVolume(format!(
                "tank {}: volume {} < requested {}",
                tank.code, tank.current_volume, input.quantity
            )));
        }

        let new_volume = tank.current_volume - input.quantity;

        let movement = write_tank_movement(
            &mut *tx,
            company_id,
            &tank,
            MovementType::Out,
            input.quantity,
            new_volume,
            input.reference_document.as_deref(),
            operator_name,
        )
        .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Adjust a tank volume by a signed quantity (stock opname)
    pub async fn adjust(
        &self,
        company_id: Uuid,
        tank_id: Uuid,
        operator_name: &str,
        input: TankAdjustmentInput,
    ) -> AppResult<StockMovement> {
        if input.signed_quantity.is_zero() {
            return Err(AppError::Validation {
                field: "signed_quantity".to_string(),
                message: "Quantity must not be zero".to_string(),
                message_id: "Jumlah tidak boleh nol".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        let tank = lock_tank(&mut *tx, company_id, tank_id).await?;

        let new_volume = tank.current_volume + input.signed_quantity;
        if new_volume < Decimal::ZERO {
            return Err(AppError::InsufficientSourceVolume(format!(
                "tank {}: volume {} cannot absorb adjustment {}",
                tank.code, tank.current_volume, input.signed_quantity
            )));
        }
        if new_volume > tank.capacity {
            return Err(AppError::DestinationCapacityExceeded(format!(
                "tank {}: {} + {} exceeds capacity {}",
                tank.code, tank.current_volume, input.signed_quantity, tank.capacity
            )));
        }

        if input.signed_quantity > Decimal::ZERO {
            check_tank_stock_bound(&mut *tx, company_id, &tank, input.signed_quantity).await?;
        }

        let movement = write_tank_movement(
            &mut *tx,
            company_id,
            &tank,
            MovementType::Adjustment,
            input.signed_quantity.abs(),
            new_volume,
            input.reference_document.as_deref(),
            operator_name,
        )
        .await?;

        tx.commit().await?;

        Ok(movement)
    }

    /// Transfer volume between two tanks holding the same material.
    ///
    /// Both movements commit together or neither does; all preconditions are
    /// checked against locked rows before any write.
    pub async fn transfer(
        &self,
        company_id: Uuid,
        operator_name: &str,
        input: TransferInput,
    ) -> AppResult<TransferResult> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_id: "Jumlah harus bernilai positif".to_string(),
            });
        }

        if input.source_tank_id == input.destination_tank_id {
            return Err(AppError::Validation {
                field: "destination_tank_id".to_string(),
                message: "Source and destination tanks must differ".to_string(),
                message_id: "Tangki sumber dan tujuan harus berbeda".to_string(),
            });
        }

        let mut tx = self.db.begin().await?;

        // Lock both tanks in a stable order so concurrent transfers cannot
        // deadlock.
        let mut first = input.source_tank_id;
        let mut second = input.destination_tank_id;
        if second < first {
            std::mem::swap(&mut first, &mut second);
        }
        let lock_a = lock_tank(&mut *tx, company_id, first).await?;
        let lock_b = lock_tank(&mut *tx, company_id, second).await?;

        let (source, destination) = if lock_a.id == input.source_tank_id {
            (lock_a, lock_b)
        } else {
            (lock_b, lock_a)
        };

        // Material ids are stable per tank, so resolving codes once outside
        // the lock order is fine
        let source_material = material_code(&mut *tx, source.material_id).await?;
        let destination_material = material_code(&mut *tx, destination.material_id).await?;

        match check_transfer(
            &source_material,
            &destination_material,
            source.current_volume,
            destination.current_volume,
            destination.capacity,
            input.quantity,
        ) {
            TransferCheck::Ok => {}
            TransferCheck::MaterialMismatch => {
                return Err(AppError::MaterialMismatch(format!(
                    "tank {} holds {}, tank {} holds {}",
                    source.code, source_material, destination.code, destination_material
                )));
            }
            TransferCheck::InsufficientSourceVolume => {
                return Err(AppError::InsufficientSourceVolume(format!(
                    "tank {}: volume {} < requested {}",
                    source.code, source.current_volume, input.quantity
                )));
            }
            TransferCheck::DestinationCapacityExceeded => {
                return Err(AppError::DestinationCapacityExceeded(format!(
                    "tank {}: {} + {} exceeds capacity {}",
                    destination.code,
                    destination.current_volume,
                    input.quantity,
                    destination.capacity
                )));
            }
        }

        let source_movement = write_tank_movement(
            &mut *tx,
            company_id,
            &source,
            MovementType::Transfer,
            input.quantity,
            source.current_volume - input.quantity,
            Some(&format!("transfer to tank {}", destination.code)),
            operator_name,
        )
        .await?;

        let destination_movement = write_tank_movement(
            &mut *tx,
            company_id,
            &destination,
            MovementType::Transfer,
            input.quantity,
            destination.current_volume + input.quantity,
            Some(&format!("transfer from tank {}", source.code)),
            operator_name,
        )
        .await?;

        tx.commit().await?;

        Ok(TransferResult {
            source_movement,
            destination_movement,
        })
    }
}

/// Lock a tank row for the duration of the transaction.
pub(crate) async fn lock_tank(
    conn: &mut PgConnection,
    company_id: Uuid,
    tank_id: Uuid,
) -> AppResult<TankLockRow> {
    sqlx::query_as::<_, TankLockRow>(
        r#"
        SELECT id, code, material_id, capacity, current_volume
        FROM tanks
        WHERE id = $1 AND company_id = $2
        FOR UPDATE
        "#,
    )
    .bind(tank_id)
    .bind(company_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Tank".to_string()))
}

/// Resolve a material code for error messages.
async fn material_code(conn: &mut PgConnection, material_id: Uuid) -> AppResult<String> {
    let code = sqlx::query_scalar::<_, String>("SELECT code FROM materials WHERE id = $1")
        .bind(material_id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(code)
}

/// Enforce the company-wide bound on volume entering tank storage: after the
/// movement, the summed volume of all tanks holding the material must not
/// exceed the material's stock balance. The balance row is locked first so
/// concurrent fills serialize.
async fn check_tank_stock_bound(
    conn: &mut PgConnection,
    company_id: Uuid,
    tank: &TankLockRow,
    incoming_quantity: Decimal,
) -> AppResult<()> {
    let material_balance =
        crate::services::stock::balance_for_update(conn, company_id, tank.material_id).await?;

    let tank_total = sqlx::query_scalar::<_, Decimal>(
        r#"
        SELECT COALESCE(SUM(current_volume), 0)
        FROM tanks
        WHERE company_id = $1 AND material_id = $2
        "#,
    )
    .bind(company_id)
    .bind(tank.material_id)
    .fetch_one(&mut *conn)
    .await?;

    if tank_total + incoming_quantity > material_balance {
        return Err(AppError::TankStockExceedsMaterialStock(format!(
            "tank total {} + {} exceeds material stock {}",
            tank_total, incoming_quantity, material_balance
        )));
    }

    Ok(())
}

/// Write a tank-level movement and the new tank volume.
///
/// Tank-level rows carry the tank volume in balance_before/balance_after.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn write_tank_movement(
    conn: &mut PgConnection,
    company_id: Uuid,
    tank: &TankLockRow,
    movement_type: MovementType,
    quantity: Decimal,
    new_volume: Decimal,
    reference_document: Option<&str>,
    operator_name: &str,
) -> AppResult<StockMovement> {
    sqlx::query(
        r#"
        UPDATE tanks
        SET current_volume = $1, updated_at = NOW()
        WHERE id = $2
        "#,
    )
    .bind(new_volume)
    .bind(tank.id)
    .execute(&mut *conn)
    .await?;

    let movement = sqlx::query_as::<_, StockMovement>(
        r#"
        INSERT INTO stock_movements (company_id, material_id, tank_id, movement_type, quantity,
                                     balance_before, balance_after, reference_document, operator_name)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, company_id, material_id, tank_id, movement_type, quantity,
                  balance_before, balance_after, reference_document, operator_name, created_at
        "#,
    )
    .bind(company_id)
    .bind(tank.material_id)
    .bind(tank.id)
    .bind(movement_type.as_str())
    .bind(quantity)
    .bind(tank.current_volume)
    .bind(new_volume)
    .bind(reference_document)
    .bind(operator_name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(movement)
}
