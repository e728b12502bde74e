//! Weighbridge service for TBS receiving
//!
//! A delivery is weighed twice: loaded at the gate (gross) and empty on the
//! way out (tare). The net weight less the sortation deduction is what the
//! mill pays for and what enters the stock ledger when the ticket is posted.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::apply_movement_tx;
use shared::validation::{validate_percent, validate_vehicle_plate};
use shared::{accepted_weight, net_weight, MovementType, SupplierType, TicketStatus};

/// Weighbridge service
#[derive(Clone)]
pub struct WeighbridgeService {
    db: PgPool,
}

/// A weighbridge ticket
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WeighbridgeTicket {
    pub id: Uuid,
    pub company_id: Uuid,
    pub ticket_number: String,
    pub supplier_id: Uuid,
    pub material_id: Uuid,
    pub vehicle_plate: String,
    pub driver_name: Option<String>,
    pub gross_weight_kg: Decimal,
    pub tare_weight_kg: Option<Decimal>,
    pub net_weight_kg: Option<Decimal>,
    pub deduction_percent: Decimal,
    pub accepted_weight_kg: Option<Decimal>,
    pub unit_price: Option<Decimal>,
    pub total_price: Option<Decimal>,
    pub status: String,
    pub weighed_in_at: DateTime<Utc>,
    pub weighed_out_at: Option<DateTime<Utc>>,
    pub posted_at: Option<DateTime<Utc>>,
    pub operator_name: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for the first weighing
#[derive(Debug, Deserialize)]
pub struct WeighInInput {
    pub supplier_id: Uuid,
    pub material_id: Uuid,
    pub vehicle_plate: String,
    pub driver_name: Option<String>,
    pub gross_weight_kg: Decimal,
    pub notes: Option<String>,
}

/// Input for the second weighing
#[derive(Debug, Deserialize)]
pub struct WeighOutInput {
    pub tare_weight_kg: Decimal,
    pub deduction_percent: Option<Decimal>,
    pub unit_price: Option<Decimal>,
}

impl WeighbridgeService {
    /// Create a new WeighbridgeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record the first weighing of a loaded vehicle
    pub async fn weigh_in(
        &self,
        company_id: Uuid,
        operator_name: &str,
        input: WeighInInput,
    ) -> AppResult<WeighbridgeTicket> {
        if input.gross_weight_kg <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "gross_weight_kg".to_string(),
                message: "Gross weight must be positive".to_string(),
                message_id: "Berat bruto harus bernilai positif".to_string(),
            });
        }

        if let Err(msg) = validate_vehicle_plate(&input.vehicle_plate) {
            return Err(AppError::Validation {
                field: "vehicle_plate".to_string(),
                message: msg.to_string(),
                message_id: "Format plat kendaraan tidak valid".to_string(),
            });
        }

        // Supplier must be an active TBS supplier of this company
        let supplier = sqlx::query_as::<_, (String, bool)>(
            "SELECT supplier_type, is_active FROM suppliers WHERE id = $1 AND company_id = $2",
        )
        .bind(input.supplier_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        if supplier.0 != SupplierType::TbsSupplier.as_str() {
            return Err(AppError::Validation {
                field: "supplier_id".to_string(),
                message: "Supplier does not deliver TBS".to_string(),
                message_id: "Pemasok ini bukan pemasok TBS".to_string(),
            });
        }

        if !supplier.1 {
            return Err(AppError::Validation {
                field: "supplier_id".to_string(),
                message: "Supplier is inactive".to_string(),
                message_id: "Pemasok sudah dinonaktifkan".to_string(),
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

        let mut tx = self.db.begin().await?;

        let ticket_number = next_ticket_number(&mut tx, company_id).await?;

        let ticket = sqlx::query_as::<_, WeighbridgeTicket>(
            r#"
            INSERT INTO weighbridge_tickets (company_id, ticket_number, supplier_id, material_id,
                                             vehicle_plate, driver_name, gross_weight_kg,
                                             status, operator_name, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, company_id, ticket_number, supplier_id, material_id, vehicle_plate,
                      driver_name, gross_weight_kg, tare_weight_kg, net_weight_kg,
                      deduction_percent, accepted_weight_kg, unit_price, total_price, status,
                      weighed_in_at, weighed_out_at, posted_at, operator_name, notes,
                      created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&ticket_number)
        .bind(input.supplier_id)
        .bind(input.material_id)
        .bind(&input.vehicle_plate)
        .bind(&input.driver_name)
        .bind(input.gross_weight_kg)
        .bind(TicketStatus::WeighedIn.as_str())
        .bind(operator_name)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ticket)
    }

    /// Record the second weighing and compute net and accepted weights
    pub async fn weigh_out(
        &self,
        company_id: Uuid,
        ticket_id: Uuid,
        input: WeighOutInput,
    ) -> AppResult<WeighbridgeTicket> {
        let ticket = self.get_ticket(company_id, ticket_id).await?;

        if ticket.status != TicketStatus::WeighedIn.as_str() {
            return Err(AppError::IllegalStateTransition(format!(
                "ticket {} is {} and cannot be weighed out",
                ticket.ticket_number, ticket.status
            )));
        }

        if input.tare_weight_kg <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "tare_weight_kg".to_string(),
                message: "Tare weight must be positive".to_string(),
                message_id: "Berat tara harus bernilai positif".to_string(),
            });
        }

        if input.tare_weight_kg >= ticket.gross_weight_kg {
            return Err(AppError::Validation {
                field: "tare_weight_kg".to_string(),
                message: "Tare weight must be less than gross weight".to_string(),
                message_id: "Berat tara harus lebih kecil dari berat bruto".to_string(),
            });
        }

        let deduction = input.deduction_percent.unwrap_or(Decimal::ZERO);
        if let Err(msg) = validate_percent(deduction) {
            return Err(AppError::Validation {
                field: "deduction_percent".to_string(),
                message: msg.to_string(),
                message_id: "Persentase potongan harus antara 0 dan 100".to_string(),
            });
        }

        if let Some(price) = input.unit_price {
            if price < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "unit_price".to_string(),
                    message: "Unit price cannot be negative".to_string(),
                    message_id: "Harga satuan tidak boleh negatif".to_string(),
                });
            }
        }

        let net = net_weight(ticket.gross_weight_kg, input.tare_weight_kg);
        let accepted = accepted_weight(net, deduction);
        let total = input.unit_price.map(|p| (accepted * p).round_dp(2));

        let ticket = sqlx::query_as::<_, WeighbridgeTicket>(
            r#"
            UPDATE weighbridge_tickets
            SET tare_weight_kg = $1, net_weight_kg = $2, deduction_percent = $3,
                accepted_weight_kg = $4, unit_price = $5, total_price = $6,
                status = $7, weighed_out_at = NOW(), updated_at = NOW()
            WHERE id = $8
            RETURNING id, company_id, ticket_number, supplier_id, material_id, vehicle_plate,
                      driver_name, gross_weight_kg, tare_weight_kg, net_weight_kg,
                      deduction_percent, accepted_weight_kg, unit_price, total_price, status,
                      weighed_in_at, weighed_out_at, posted_at, operator_name, notes,
                      created_at, updated_at
            "#,
        )
        .bind(input.tare_weight_kg)
        .bind(net)
        .bind(deduction)
        .bind(accepted)
        .bind(input.unit_price)
        .bind(total)
        .bind(TicketStatus::WeighedOut.as_str())
        .bind(ticket_id)
        .fetch_one(&self.db)
        .await?;

        Ok(ticket)
    }

    /// Post a weighed-out ticket to the stock ledger
    pub async fn post_ticket(
        &self,
        company_id: Uuid,
        ticket_id: Uuid,
        operator_name: &str,
    ) -> AppResult<WeighbridgeTicket> {
        let ticket = self.get_ticket(company_id, ticket_id).await?;

        if ticket.status != TicketStatus::WeighedOut.as_str() {
            return Err(AppError::IllegalStateTransition(format!(
                "ticket {} is {} and cannot be posted",
                ticket.ticket_number, ticket.status
            )));
        }

        let accepted = ticket.accepted_weight_kg.ok_or_else(|| {
            AppError::Internal(format!(
                "ticket {} has no accepted weight",
                ticket.ticket_number
            ))
        })?;

        if accepted <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "accepted_weight_kg".to_string(),
                message: "Accepted weight must be positive to post".to_string(),
                message_id: "Berat diterima harus bernilai positif".to_string(),
            });
        }

        // Ledger IN and status update commit together
        let mut tx = self.db.begin().await?;

        apply_movement_tx(
            &mut *tx,
            company_id,
            ticket.material_id,
            accepted,
            MovementType::In,
            Some(&ticket.ticket_number),
            operator_name,
        )
        .await?;

        let ticket = sqlx::query_as::<_, WeighbridgeTicket>(
            r#"
            UPDATE weighbridge_tickets
            SET status = $1, posted_at = NOW(), updated_at = NOW()
            WHERE id = $2
            RETURNING id, company_id, ticket_number, supplier_id, material_id, vehicle_plate,
                      driver_name, gross_weight_kg, tare_weight_kg, net_weight_kg,
                      deduction_percent, accepted_weight_kg, unit_price, total_price, status,
                      weighed_in_at, weighed_out_at, posted_at, operator_name, notes,
                      created_at, updated_at
            "#,
        )
        .bind(TicketStatus::Posted.as_str())
        .bind(ticket_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(ticket)
    }

    /// Get a ticket by ID
    pub async fn get_ticket(
        &self,
        company_id: Uuid,
        ticket_id: Uuid,
    ) -> AppResult<WeighbridgeTicket> {
        let ticket = sqlx::query_as::<_, WeighbridgeTicket>(
            r#"
            SELECT id, company_id, ticket_number, supplier_id, material_id, vehicle_plate,
                   driver_name, gross_weight_kg, tare_weight_kg, net_weight_kg,
                   deduction_percent, accepted_weight_kg, unit_price, total_price, status,
                   weighed_in_at, weighed_out_at, posted_at, operator_name, notes,
                   created_at, updated_at
            FROM weighbridge_tickets
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(ticket_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Weighbridge ticket".to_string()))?;

        Ok(ticket)
    }

    /// List all tickets for a company, newest first
    pub async fn list_tickets(&self, company_id: Uuid) -> AppResult<Vec<WeighbridgeTicket>> {
        let tickets = sqlx::query_as::<_, WeighbridgeTicket>(
            r#"
            SELECT id, company_id, ticket_number, supplier_id, material_id, vehicle_plate,
                   driver_name, gross_weight_kg, tare_weight_kg, net_weight_kg,
                   deduction_percent, accepted_weight_kg, unit_price, total_price, status,
                   weighed_in_at, weighed_out_at, posted_at, operator_name, notes,
                   created_at, updated_at
            FROM weighbridge_tickets
            WHERE company_id = $1
            ORDER BY weighed_in_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(tickets)
    }
}

/// Generate the next ticket number for the current day: WB-YYYYMMDD-NNN.
async fn next_ticket_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: Uuid,
) -> AppResult<String> {
    let today = Utc::now().date_naive();

    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM weighbridge_tickets WHERE company_id = $1 AND weighed_in_at::date = $2",
    )
    .bind(company_id)
    .bind(today)
    .fetch_one(&mut **tx)
    .await?;

    Ok(format!(
        "WB-{}{:02}{:02}-{:03}",
        today.year(),
        today.month(),
        today.day(),
        count + 1
    ))
}
