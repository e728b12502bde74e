//! Buyer master data service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_indonesian_phone, validate_npwp};

/// Buyer service
#[derive(Clone)]
pub struct BuyerService {
    db: PgPool,
}

/// A buyer of mill products
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Buyer {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub npwp: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a buyer
#[derive(Debug, Deserialize)]
pub struct CreateBuyerInput {
    pub code: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub npwp: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a buyer
#[derive(Debug, Deserialize)]
pub struct UpdateBuyerInput {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub npwp: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl BuyerService {
    /// Create a new BuyerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a buyer
    pub async fn create_buyer(&self, company_id: Uuid, input: CreateBuyerInput) -> AppResult<Buyer> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Buyer code and name are required".to_string(),
                message_id: "Kode dan nama pembeli harus diisi".to_string(),
            });
        }

        if let Some(phone) = &input.phone {
            if let Err(msg) = validate_indonesian_phone(phone) {
                return Err(AppError::Validation {
                    field: "phone".to_string(),
                    message: msg.to_string(),
                    message_id: "Format nomor telepon tidak valid".to_string(),
                });
            }
        }

        if let Some(npwp) = &input.npwp {
            if let Err(msg) = validate_npwp(npwp) {
                return Err(AppError::Validation {
                    field: "npwp".to_string(),
                    message: msg.to_string(),
                    message_id: "Format NPWP tidak valid".to_string(),
                });
            }
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM buyers WHERE company_id = $1 AND code = $2",
        )
        .bind(company_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("buyer code".to_string()));
        }

        let buyer = sqlx::query_as::<_, Buyer>(
            r#"
            INSERT INTO buyers (company_id, code, name, contact_person, phone, npwp, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, company_id, code, name, contact_person, phone, npwp, address,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.npwp)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(buyer)
    }

    /// Get a buyer by ID
    pub async fn get_buyer(&self, company_id: Uuid, buyer_id: Uuid) -> AppResult<Buyer> {
        let buyer = sqlx::query_as::<_, Buyer>(
            r#"
            SELECT id, company_id, code, name, contact_person, phone, npwp, address,
                   is_active, created_at, updated_at
            FROM buyers
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(buyer_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Buyer".to_string()))?;

        Ok(buyer)
    }

    /// List all buyers for a company
    pub async fn list_buyers(&self, company_id: Uuid) -> AppResult<Vec<Buyer>> {
        let buyers = sqlx::query_as::<_, Buyer>(
            r#"
            SELECT id, company_id, code, name, contact_person, phone, npwp, address,
                   is_active, created_at, updated_at
            FROM buyers
            WHERE company_id = $1
            ORDER BY code
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(buyers)
    }

    /// Update a buyer
    pub async fn update_buyer(
        &self,
        company_id: Uuid,
        buyer_id: Uuid,
        input: UpdateBuyerInput,
    ) -> AppResult<Buyer> {
        let existing = self.get_buyer(company_id, buyer_id).await?;

        let buyer = sqlx::query_as::<_, Buyer>(
            r#"
            UPDATE buyers
            SET name = COALESCE($1, name), contact_person = COALESCE($2, contact_person),
                phone = COALESCE($3, phone), npwp = COALESCE($4, npwp),
                address = COALESCE($5, address), is_active = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id, company_id, code, name, contact_person, phone, npwp, address,
                      is_active, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.npwp)
        .bind(&input.address)
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(buyer_id)
        .fetch_one(&self.db)
        .await?;

        Ok(buyer)
    }
}
