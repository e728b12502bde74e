//! Product shipment service
//!
//! Delivery orders for CPO and kernel sold to buyers. Posting a shipment
//! applies one ledger OUT for the material and, when the product is drawn
//! from a named tank, one tank-level OUT, all in the same transaction.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::apply_movement_tx;
use crate::services::tank::{lock_tank, write_tank_movement};
use shared::validation::validate_vehicle_plate;
use shared::{MovementType, ShipmentStatus};

/// Shipment service
#[derive(Clone)]
pub struct ShipmentService {
    db: PgPool,
}

/// A shipment (delivery order)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Shipment {
    pub id: Uuid,
    pub company_id: Uuid,
    pub delivery_order_number: String,
    pub buyer_id: Uuid,
    pub material_id: Uuid,
    pub tank_id: Option<Uuid>,
    pub quantity: Decimal,
    pub vehicle_plate: String,
    pub driver_name: Option<String>,
    pub status: String,
    pub posted_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a shipment
#[derive(Debug, Deserialize)]
pub struct CreateShipmentInput {
    pub buyer_id: Uuid,
    pub material_id: Uuid,
    pub tank_id: Option<Uuid>,
    pub quantity: Decimal,
    pub vehicle_plate: String,
    pub driver_name: Option<String>,
    pub notes: Option<String>,
}

impl ShipmentService {
    /// Create a new ShipmentService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a shipment in draft state
    pub async fn create_shipment(
        &self,
        company_id: Uuid,
        input: CreateShipmentInput,
    ) -> AppResult<Shipment> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_id: "Jumlah harus bernilai positif".to_string(),
            });
        }

        if let Err(msg) = validate_vehicle_plate(&input.vehicle_plate) {
            return Err(AppError::Validation {
                field: "vehicle_plate".to_string(),
                message: msg.to_string(),
                message_id: "Format plat kendaraan tidak valid".to_string(),
            });
        }

        let buyer_active = sqlx::query_scalar::<_, bool>(
            "SELECT is_active FROM buyers WHERE id = $1 AND company_id = $2",
        )
        .bind(input.buyer_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Buyer".to_string()))?;

        if !buyer_active {
            return Err(AppError::Validation {
                field: "buyer_id".to_string(),
                message: "Buyer is inactive".to_string(),
                message_id: "Pembeli sudah dinonaktifkan".to_string(),
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

        // A named source tank must hold the shipped material
        if let Some(tank_id) = input.tank_id {
            let tank_material = sqlx::query_scalar::<_, Uuid>(
                "SELECT material_id FROM tanks WHERE id = $1 AND company_id = $2",
            )
            .bind(tank_id)
            .bind(company_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Tank".to_string()))?;

            if tank_material != input.material_id {
                return Err(AppError::MaterialMismatch(format!(
                    "tank does not hold the shipped material ({})",
                    input.material_id
                )));
            }
        }

        let mut tx = self.db.begin().await?;

        let number = next_delivery_order_number(&mut tx, company_id).await?;

        let shipment = sqlx::query_as::<_, Shipment>(
            r#"
            INSERT INTO shipments (company_id, delivery_order_number, buyer_id, material_id,
                                   tank_id, quantity, vehicle_plate, driver_name, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, company_id, delivery_order_number, buyer_id, material_id, tank_id,
                      quantity, vehicle_plate, driver_name, status, posted_at, notes,
                      created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&number)
        .bind(input.buyer_id)
        .bind(input.material_id)
        .bind(input.tank_id)
        .bind(input.quantity)
        .bind(&input.vehicle_plate)
        .bind(&input.driver_name)
        .bind(ShipmentStatus::Draft.as_str())
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(shipment)
    }

    /// Post a draft shipment to the stock ledger
    pub async fn post_shipment(
        &self,
        company_id: Uuid,
        shipment_id: Uuid,
        operator_name: &str,
    ) -> AppResult<Shipment> {
        let shipment = self.get_shipment(company_id, shipment_id).await?;

        if shipment.status != ShipmentStatus::Draft.as_str() {
            return Err(AppError::IllegalStateTransition(format!(
                "shipment {} is {} and cannot be posted",
                shipment.delivery_order_number, shipment.status
            )));
        }

        let mut tx = self.db.begin().await?;

        // Draw down the source tank first; its precondition failure must
        // abort before any ledger write
        if let Some(tank_id) = shipment.tank_id {
            let tank = lock_tank(&mut *tx, company_id, tank_id).await?;

            if tank.current_volume < shipment.quantity {
                return Err(AppError::InsufficientSourceVolume(format!(
                    "tank {}: volume {} < shipment quantity {}",
                    tank.code, tank.current_volume, shipment.quantity
                )));
            }

            write_tank_movement(
                &mut *tx,
                company_id,
                &tank,
                MovementType::Out,
                shipment.quantity,
                tank.current_volume - shipment.quantity,
                Some(&shipment.delivery_order_number),
                operator_name,
            )
            .await?;
        }

        apply_movement_tx(
            &mut *tx,
            company_id,
            shipment.material_id,
            -shipment.quantity,
            MovementType::Out,
            Some(&shipment.delivery_order_number),
            operator_name,
        )
        .await?;

        let shipment = sqlx::query_as::<_, Shipment>(
            r#"
            UPDATE shipments
            SET status = $1, posted_at = NOW(), updated_at = NOW()
            WHERE id = $2
            RETURNING id, company_id, delivery_order_number, buyer_id, material_id, tank_id,
                      quantity, vehicle_plate, driver_name, status, posted_at, notes,
                      created_at, updated_at
            "#,
        )
        .bind(ShipmentStatus::Posted.as_str())
        .bind(shipment_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(shipment)
    }

    /// Get a shipment by ID
    pub async fn get_shipment(&self, company_id: Uuid, shipment_id: Uuid) -> AppResult<Shipment> {
        let shipment = sqlx::query_as::<_, Shipment>(
            r#"
            SELECT id, company_id, delivery_order_number, buyer_id, material_id, tank_id,
                   quantity, vehicle_plate, driver_name, status, posted_at, notes,
                   created_at, updated_at
            FROM shipments
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(shipment_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Shipment".to_string()))?;

        Ok(shipment)
    }

    /// List shipments, newest first
    pub async fn list_shipments(&self, company_id: Uuid) -> AppResult<Vec<Shipment>> {
        let shipments = sqlx::query_as::<_, Shipment>(
            r#"
            SELECT id, company_id, delivery_order_number, buyer_id, material_id, tank_id,
                   quantity, vehicle_plate, driver_name, status, posted_at, notes,
                   created_at, updated_at
            FROM shipments
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(shipments)
    }

    /// Delete a draft shipment
    pub async fn delete_shipment(&self, company_id: Uuid, shipment_id: Uuid) -> AppResult<()> {
        let shipment = self.get_shipment(company_id, shipment_id).await?;

        if shipment.status != ShipmentStatus::Draft.as_str() {
            return Err(AppError::IllegalStateTransition(format!(
                "shipment {} is {} and cannot be deleted",
                shipment.delivery_order_number, shipment.status
            )));
        }

        sqlx::query("DELETE FROM shipments WHERE id = $1")
            .bind(shipment_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}

/// Generate the next delivery order number: DO-YYYY-NNNN.
async fn next_delivery_order_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: Uuid,
) -> AppResult<String> {
    let year = Utc::now().year();

    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM shipments WHERE company_id = $1 AND delivery_order_number LIKE $2",
    )
    .bind(company_id)
    .bind(format!("DO-{}-%", year))
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!("DO-{}-{:04}", year, count + 1))
}
