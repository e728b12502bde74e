//! Supplier and vendor master data service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::validation::{validate_indonesian_phone, validate_npwp};
use shared::SupplierType;

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// A supplier or vendor
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub supplier_type: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub npwp: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize)]
pub struct CreateSupplierInput {
    pub code: String,
    pub name: String,
    pub supplier_type: SupplierType,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub npwp: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a supplier
#[derive(Debug, Deserialize)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub npwp: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a supplier
    pub async fn create_supplier(
        &self,
        company_id: Uuid,
        input: CreateSupplierInput,
    ) -> AppResult<Supplier> {
        if input.code.trim().is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Supplier code is required".to_string(),
                message_id: "Kode pemasok harus diisi".to_string(),
            });
        }

        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Supplier name is required".to_string(),
                message_id: "Nama pemasok harus diisi".to_string(),
            });
        }

        validate_contact(&input.phone, &input.npwp)?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM suppliers WHERE company_id = $1 AND code = $2",
        )
        .bind(company_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("supplier code".to_string()));
        }

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (company_id, code, name, supplier_type, contact_person,
                                   phone, npwp, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, company_id, code, name, supplier_type, contact_person, phone, npwp,
                      address, is_active, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.supplier_type.as_str())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.npwp)
        .bind(&input.address)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Get a supplier by ID
    pub async fn get_supplier(&self, company_id: Uuid, supplier_id: Uuid) -> AppResult<Supplier> {
        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, company_id, code, name, supplier_type, contact_person, phone, npwp,
                   address, is_active, created_at, updated_at
            FROM suppliers
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(supplier_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(supplier)
    }

    /// List suppliers for a company, optionally filtered by type
    pub async fn list_suppliers(
        &self,
        company_id: Uuid,
        supplier_type: Option<SupplierType>,
    ) -> AppResult<Vec<Supplier>> {
        let suppliers = match supplier_type {
            Some(t) => {
                sqlx::query_as::<_, Supplier>(
                    r#"
                    SELECT id, company_id, code, name, supplier_type, contact_person, phone, npwp,
                           address, is_active, created_at, updated_at
                    FROM suppliers
                    WHERE company_id = $1 AND supplier_type = $2
                    ORDER BY code
                    "#,
                )
                .bind(company_id)
                .bind(t.as_str())
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Supplier>(
                    r#"
                    SELECT id, company_id, code, name, supplier_type, contact_person, phone, npwp,
                           address, is_active, created_at, updated_at
                    FROM suppliers
                    WHERE company_id = $1
                    ORDER BY code
                    "#,
                )
                .bind(company_id)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(suppliers)
    }

    /// Update a supplier
    pub async fn update_supplier(
        &self,
        company_id: Uuid,
        supplier_id: Uuid,
        input: UpdateSupplierInput,
    ) -> AppResult<Supplier> {
        let existing = self.get_supplier(company_id, supplier_id).await?;

        let phone = input.phone.clone().or(existing.phone);
        let npwp = input.npwp.clone().or(existing.npwp);
        validate_contact(&phone, &npwp)?;

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Supplier name is required".to_string(),
                message_id: "Nama pemasok harus diisi".to_string(),
            });
        }

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, contact_person = COALESCE($2, contact_person), phone = $3,
                npwp = $4, address = COALESCE($5, address),
                is_active = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id, company_id, code, name, supplier_type, contact_person, phone, npwp,
                      address, is_active, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&input.contact_person)
        .bind(&phone)
        .bind(&npwp)
        .bind(&input.address)
        .bind(input.is_active.unwrap_or(existing.is_active))
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Deactivate a supplier. Suppliers referenced by tickets and orders are
    /// never hard-deleted.
    pub async fn deactivate_supplier(&self, company_id: Uuid, supplier_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE suppliers SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND company_id = $2",
        )
        .bind(supplier_id)
        .bind(company_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}

/// Validate optional contact fields.
fn validate_contact(phone: &Option<String>, npwp: &Option<String>) -> AppResult<()> {
    if let Some(phone) = phone {
        if let Err(msg) = validate_indonesian_phone(phone) {
            return Err(AppError::Validation {
                field: "phone".to_string(),
                message: msg.to_string(),
                message_id: "Format nomor telepon tidak valid".to_string(),
            });
        }
    }

    if let Some(npwp) = npwp {
        if let Err(msg) = validate_npwp(npwp) {
            return Err(AppError::Validation {
                field: "npwp".to_string(),
                message: msg.to_string(),
                message_id: "Format NPWP tidak valid".to_string(),
            });
        }
    }

    Ok(())
}
