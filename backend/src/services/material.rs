//! Material master data service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::{MaterialCategory, UnitOfMeasure};

/// Material service
#[derive(Clone)]
pub struct MaterialService {
    db: PgPool,
}

/// A material
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Material {
    pub id: Uuid,
    pub company_id: Uuid,
    pub code: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a material
#[derive(Debug, Deserialize)]
pub struct CreateMaterialInput {
    pub code: String,
    pub name: String,
    pub category: MaterialCategory,
    pub unit: Option<UnitOfMeasure>,
}

/// Input for updating a material
#[derive(Debug, Deserialize)]
pub struct UpdateMaterialInput {
    pub name: Option<String>,
}

impl MaterialService {
    /// Create a new MaterialService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a material
    pub async fn create_material(
        &self,
        company_id: Uuid,
        input: CreateMaterialInput,
    ) -> AppResult<Material> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Material code and name are required".to_string(),
                message_id: "Kode dan nama material harus diisi".to_string(),
            });
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM materials WHERE company_id = $1 AND code = $2",
        )
        .bind(company_id)
        .bind(&input.code)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("material code".to_string()));
        }

        let unit = input.unit.unwrap_or(UnitOfMeasure::Kilogram);

        let material = sqlx::query_as::<_, Material>(
            r#"
            INSERT INTO materials (company_id, code, name, category, unit)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, company_id, code, name, category, unit, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&input.code)
        .bind(&input.name)
        .bind(input.category.as_str())
        .bind(unit.as_str())
        .fetch_one(&self.db)
        .await?;

        Ok(material)
    }

    /// Get a material by ID
    pub async fn get_material(&self, company_id: Uuid, material_id: Uuid) -> AppResult<Material> {
        let material = sqlx::query_as::<_, Material>(
            r#"
            SELECT id, company_id, code, name, category, unit, created_at, updated_at
            FROM materials
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(material_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Material".to_string()))?;

        Ok(material)
    }

    /// List all materials for a company
    pub async fn list_materials(&self, company_id: Uuid) -> AppResult<Vec<Material>> {
        let materials = sqlx::query_as::<_, Material>(
            r#"
            SELECT id, company_id, code, name, category, unit, created_at, updated_at
            FROM materials
            WHERE company_id = $1
            ORDER BY code
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(materials)
    }

    /// Update a material's display name. Code, category, and unit are fixed
    /// once movements may reference the material.
    pub async fn update_material(
        &self,
        company_id: Uuid,
        material_id: Uuid,
        input: UpdateMaterialInput,
    ) -> AppResult<Material> {
        self.get_material(company_id, material_id).await?;

        let material = sqlx::query_as::<_, Material>(
            r#"
            UPDATE materials
            SET name = COALESCE($1, name), updated_at = NOW()
            WHERE id = $2
            RETURNING id, company_id, code, name, category, unit, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(material_id)
        .fetch_one(&self.db)
        .await?;

        Ok(material)
    }
}
