//! Warehouse procurement service
//!
//! Purchase requests collect what the warehouse needs; approved requests
//! become purchase orders against a vendor. Goods receipts post incoming
//! stock per order line, goods issues draw stock out for mill use. Receipt
//! and issue postings run through the stock ledger inside one transaction.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::apply_movement_tx;
use shared::{MovementType, PurchaseOrderStatus, PurchaseRequestStatus, SupplierType};

/// Procurement service
#[derive(Clone)]
pub struct ProcurementService {
    db: PgPool,
}

/// A purchase request
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PurchaseRequest {
    pub id: Uuid,
    pub company_id: Uuid,
    pub request_number: String,
    pub status: String,
    pub requested_by: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchase request line
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PurchaseRequestItem {
    pub id: Uuid,
    pub request_id: Uuid,
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub notes: Option<String>,
}

/// A purchase request with its lines
#[derive(Debug, Clone, Serialize)]
pub struct RequestWithItems {
    #[serde(flatten)]
    pub request: PurchaseRequest,
    pub items: Vec<PurchaseRequestItem>,
}

/// A purchase order
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub company_id: Uuid,
    pub order_number: String,
    pub supplier_id: Uuid,
    pub request_id: Option<Uuid>,
    pub status: String,
    pub order_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchase order line
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// A purchase order with its lines
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

/// A goods receipt header
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GoodsReceipt {
    pub id: Uuid,
    pub company_id: Uuid,
    pub receipt_number: String,
    pub order_id: Uuid,
    pub received_by: String,
    pub received_at: DateTime<Utc>,
    pub notes: Option<String>,
}

/// A goods issue
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GoodsIssue {
    pub id: Uuid,
    pub company_id: Uuid,
    pub issue_number: String,
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub purpose: String,
    pub issued_by: String,
    pub issued_at: DateTime<Utc>,
}

/// One line of a purchase request input
#[derive(Debug, Deserialize)]
pub struct RequestItemInput {
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub notes: Option<String>,
}

/// Input for creating a purchase request
#[derive(Debug, Deserialize)]
pub struct CreateRequestInput {
    pub items: Vec<RequestItemInput>,
    pub notes: Option<String>,
}

/// One line of a purchase order input
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub supplier_id: Uuid,
    pub request_id: Option<Uuid>,
    pub order_date: Option<NaiveDate>,
    pub items: Vec<OrderItemInput>,
    pub notes: Option<String>,
}

/// One received line
#[derive(Debug, Deserialize)]
pub struct ReceiptItemInput {
    pub material_id: Uuid,
    pub quantity: Decimal,
}

/// Input for receiving goods against an order
#[derive(Debug, Deserialize)]
pub struct ReceiveOrderInput {
    pub items: Vec<ReceiptItemInput>,
    pub notes: Option<String>,
}

/// Input for issuing goods out of the warehouse
#[derive(Debug, Deserialize)]
pub struct CreateIssueInput {
    pub material_id: Uuid,
    pub quantity: Decimal,
    pub purpose: String,
}

impl ProcurementService {
    /// Create a new ProcurementService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Purchase requests
    // ------------------------------------------------------------------

    /// Create a purchase request in draft state
    pub async fn create_request(
        &self,
        company_id: Uuid,
        requested_by: &str,
        input: CreateRequestInput,
    ) -> AppResult<RequestWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Request must have at least one item".to_string(),
                message_id: "Permintaan harus memiliki minimal satu barang".to_string(),
            });
        }

        for item in &input.items {
            if item.quantity <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Item quantity must be positive".to_string(),
                    message_id: "Jumlah barang harus bernilai positif".to_string(),
                });
            }
            self.ensure_material(company_id, item.material_id).await?;
        }

        let mut tx = self.db.begin().await?;

        let request_number =
            next_document_number(&mut tx, company_id, "PR", "purchase_requests", "request_number")
                .await?;

        let request = sqlx::query_as::<_, PurchaseRequest>(
            r#"
            INSERT INTO purchase_requests (company_id, request_number, status, requested_by, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, company_id, request_number, status, requested_by, notes,
                      created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&request_number)
        .bind(PurchaseRequestStatus::Draft.as_str())
        .bind(requested_by)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let row = sqlx::query_as::<_, PurchaseRequestItem>(
                r#"
                INSERT INTO purchase_request_items (request_id, material_id, quantity, notes)
                VALUES ($1, $2, $3, $4)
                RETURNING id, request_id, material_id, quantity, notes
                "#,
            )
            .bind(request.id)
            .bind(item.material_id)
            .bind(item.quantity)
            .bind(&item.notes)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;

        Ok(RequestWithItems { request, items })
    }

    /// Get a purchase request with its lines
    pub async fn get_request(
        &self,
        company_id: Uuid,
        request_id: Uuid,
    ) -> AppResult<RequestWithItems> {
        let request = sqlx::query_as::<_, PurchaseRequest>(
            r#"
            SELECT id, company_id, request_number, status, requested_by, notes,
                   created_at, updated_at
            FROM purchase_requests
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(request_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase request".to_string()))?;

        let items = sqlx::query_as::<_, PurchaseRequestItem>(
            r#"
            SELECT id, request_id, material_id, quantity, notes
            FROM purchase_request_items
            WHERE request_id = $1
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.db)
        .await?;

        Ok(RequestWithItems { request, items })
    }

    /// List purchase requests, newest first
    pub async fn list_requests(&self, company_id: Uuid) -> AppResult<Vec<PurchaseRequest>> {
        let requests = sqlx::query_as::<_, PurchaseRequest>(
            r#"
            SELECT id, company_id, request_number, status, requested_by, notes,
                   created_at, updated_at
            FROM purchase_requests
            WHERE company_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(requests)
    }

    /// Move a purchase request to a new status
    pub async fn transition_request(
        &self,
        company_id: Uuid,
        request_id: Uuid,
        next: PurchaseRequestStatus,
    ) -> AppResult<PurchaseRequest> {
        let existing = self.get_request(company_id, request_id).await?;

        let current = PurchaseRequestStatus::parse(&existing.request.status).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown request status: {}",
                existing.request.status
            ))
        })?;

        if !current.can_transition_to(next) {
            return Err(AppError::IllegalStateTransition(format!(
                "request {} cannot move from {} to {}",
                existing.request.request_number,
                current.as_str(),
                next.as_str()
            )));
        }

        let request = sqlx::query_as::<_, PurchaseRequest>(
            r#"
            UPDATE purchase_requests
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, company_id, request_number, status, requested_by, notes,
                      created_at, updated_at
            "#,
        )
        .bind(next.as_str())
        .bind(request_id)
        .fetch_one(&self.db)
        .await?;

        Ok(request)
    }

    // ------------------------------------------------------------------
    // Purchase orders
    // ------------------------------------------------------------------

    /// Create a purchase order, optionally referencing an approved request
    pub async fn create_order(
        &self,
        company_id: Uuid,
        input: CreateOrderInput,
    ) -> AppResult<OrderWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Order must have at least one item".to_string(),
                message_id: "Pesanan harus memiliki minimal satu barang".to_string(),
            });
        }

        for item in &input.items {
            if item.quantity <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Item quantity must be positive".to_string(),
                    message_id: "Jumlah barang harus bernilai positif".to_string(),
                });
            }
            if item.unit_price < Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "unit_price".to_string(),
                    message: "Unit price cannot be negative".to_string(),
                    message_id: "Harga satuan tidak boleh negatif".to_string(),
                });
            }
            self.ensure_material(company_id, item.material_id).await?;
        }

        // Orders go to vendors, not TBS suppliers
        let supplier = sqlx::query_as::<_, (String, bool)>(
            "SELECT supplier_type, is_active FROM suppliers WHERE id = $1 AND company_id = $2",
        )
        .bind(input.supplier_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        if supplier.0 != SupplierType::Vendor.as_str() {
            return Err(AppError::Validation {
                field: "supplier_id".to_string(),
                message: "Supplier is not a vendor".to_string(),
                message_id: "Pemasok ini bukan vendor".to_string(),
            });
        }

        if !supplier.1 {
            return Err(AppError::Validation {
                field: "supplier_id".to_string(),
                message: "Supplier is inactive".to_string(),
                message_id: "Pemasok sudah dinonaktifkan".to_string(),
            });
        }

        if let Some(request_id) = input.request_id {
            let request = self.get_request(company_id, request_id).await?;
            if request.request.status != PurchaseRequestStatus::Approved.as_str() {
                return Err(AppError::IllegalStateTransition(format!(
                    "request {} is {} and cannot back an order",
                    request.request.request_number, request.request.status
                )));
            }
        }

        let order_date = input.order_date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let order_number =
            next_document_number(&mut tx, company_id, "PO", "purchase_orders", "order_number")
                .await?;

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (company_id, order_number, supplier_id, request_id,
                                         status, order_date, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, company_id, order_number, supplier_id, request_id, status, order_date,
                      notes, created_at, updated_at
            "#,
        )
        .bind(company_id)
        .bind(&order_number)
        .bind(input.supplier_id)
        .bind(input.request_id)
        .bind(PurchaseOrderStatus::Open.as_str())
        .bind(order_date)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in &input.items {
            let total = (item.quantity * item.unit_price).round_dp(2);
            let row = sqlx::query_as::<_, PurchaseOrderItem>(
                r#"
                INSERT INTO purchase_order_items (order_id, material_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, order_id, material_id, quantity, unit_price, total_price
                "#,
            )
            .bind(order.id)
            .bind(item.material_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;

        Ok(OrderWithItems { order, items })
    }

    /// Get a purchase order with its lines
    pub async fn get_order(&self, company_id: Uuid, order_id: Uuid) -> AppResult<OrderWithItems> {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, company_id, order_number, supplier_id, request_id, status, order_date,
                   notes, created_at, updated_at
            FROM purchase_orders
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(order_id)
        .bind(company_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))?;

        let items = sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            SELECT id, order_id, material_id, quantity, unit_price, total_price
            FROM purchase_order_items
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderWithItems { order, items })
    }

    /// List purchase orders, newest first
    pub async fn list_orders(&self, company_id: Uuid) -> AppResult<Vec<PurchaseOrder>> {
        let orders = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT id, company_id, order_number, supplier_id, request_id, status, order_date,
                   notes, created_at, updated_at
            FROM purchase_orders
            WHERE company_id = $1
            ORDER BY order_date DESC, created_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Cancel an open purchase order
    pub async fn cancel_order(&self, company_id: Uuid, order_id: Uuid) -> AppResult<PurchaseOrder> {
        let existing = self.get_order(company_id, order_id).await?;

        if existing.order.status != PurchaseOrderStatus::Open.as_str() {
            return Err(AppError::IllegalStateTransition(format!(
                "order {} is {} and cannot be cancelled",
                existing.order.order_number, existing.order.status
            )));
        }

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            UPDATE purchase_orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING id, company_id, order_number, supplier_id, request_id, status, order_date,
                      notes, created_at, updated_at
            "#,
        )
        .bind(PurchaseOrderStatus::Cancelled.as_str())
        .bind(order_id)
        .fetch_one(&self.db)
        .await?;

        Ok(order)
    }

    // ------------------------------------------------------------------
    // Goods receipt / issue
    // ------------------------------------------------------------------

    /// Receive goods against an open order.
    ///
    /// Each received line must match an order line and may not exceed the
    /// ordered quantity. Ledger INs, the receipt, and the order status change
    /// commit together.
    pub async fn receive_order(
        &self,
        company_id: Uuid,
        order_id: Uuid,
        received_by: &str,
        input: ReceiveOrderInput,
    ) -> AppResult<GoodsReceipt> {
        let existing = self.get_order(company_id, order_id).await?;

        if existing.order.status != PurchaseOrderStatus::Open.as_str() {
            return Err(AppError::IllegalStateTransition(format!(
                "order {} is {} and cannot receive goods",
                existing.order.order_number, existing.order.status
            )));
        }

        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Receipt must have at least one item".to_string(),
                message_id: "Penerimaan harus memiliki minimal satu barang".to_string(),
            });
        }

        // Every received line must match an order line, within ordered quantity
        for item in &input.items {
            if item.quantity <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: "Received quantity must be positive".to_string(),
                    message_id: "Jumlah diterima harus bernilai positif".to_string(),
                });
            }

            let order_line = existing
                .items
                .iter()
                .find(|l| l.material_id == item.material_id)
                .ok_or_else(|| AppError::Validation {
                    field: "material_id".to_string(),
                    message: "Received material is not on the order".to_string(),
                    message_id: "Barang yang diterima tidak ada dalam pesanan".to_string(),
                })?;

            if item.quantity > order_line.quantity {
                return Err(AppError::Validation {
                    field: "quantity".to_string(),
                    message: format!(
                        "Received {} exceeds ordered {}",
                        item.quantity, order_line.quantity
                    ),
                    message_id: "Jumlah diterima melebihi jumlah pesanan".to_string(),
                });
            }
        }

        let mut tx = self.db.begin().await?;

        let receipt_number =
            next_document_number(&mut tx, company_id, "GR", "goods_receipts", "receipt_number")
                .await?;

        let receipt = sqlx::query_as::<_, GoodsReceipt>(
            r#"
            INSERT INTO goods_receipts (company_id, receipt_number, order_id, received_by, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, company_id, receipt_number, order_id, received_by, received_at, notes
            "#,
        )
        .bind(company_id)
        .bind(&receipt_number)
        .bind(order_id)
        .bind(received_by)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in &input.items {
            sqlx::query(
                r#"
                INSERT INTO goods_receipt_items (receipt_id, material_id, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(receipt.id)
            .bind(item.material_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            apply_movement_tx(
                &mut *tx,
                company_id,
                item.material_id,
                item.quantity,
                MovementType::In,
                Some(&receipt_number),
                received_by,
            )
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE purchase_orders
            SET status = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(PurchaseOrderStatus::Received.as_str())
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(receipt)
    }

    /// Issue goods out of the warehouse (ledger OUT)
    pub async fn create_issue(
        &self,
        company_id: Uuid,
        issued_by: &str,
        input: CreateIssueInput,
    ) -> AppResult<GoodsIssue> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must be positive".to_string(),
                message_id: "Jumlah harus bernilai positif".to_string(),
            });
        }

        if input.purpose.trim().is_empty() {
            return Err(AppError::Validation {
                field: "purpose".to_string(),
                message: "Purpose is required".to_string(),
                message_id: "Tujuan penggunaan harus diisi".to_string(),
            });
        }

        self.ensure_material(company_id, input.material_id).await?;

        let mut tx = self.db.begin().await?;

        let issue_number =
            next_document_number(&mut tx, company_id, "GI", "goods_issues", "issue_number").await?;

        apply_movement_tx(
            &mut *tx,
            company_id,
            input.material_id,
            -input.quantity,
            MovementType::Out,
            Some(&issue_number),
            issued_by,
        )
        .await?;

        let issue = sqlx::query_as::<_, GoodsIssue>(
            r#"
            INSERT INTO goods_issues (company_id, issue_number, material_id, quantity, purpose, issued_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, company_id, issue_number, material_id, quantity, purpose, issued_by, issued_at
            "#,
        )
        .bind(company_id)
        .bind(&issue_number)
        .bind(input.material_id)
        .bind(input.quantity)
        .bind(&input.purpose)
        .bind(issued_by)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(issue)
    }

    /// List goods issues, newest first
    pub async fn list_issues(&self, company_id: Uuid) -> AppResult<Vec<GoodsIssue>> {
        let issues = sqlx::query_as::<_, GoodsIssue>(
            r#"
            SELECT id, company_id, issue_number, material_id, quantity, purpose, issued_by, issued_at
            FROM goods_issues
            WHERE company_id = $1
            ORDER BY issued_at DESC
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.db)
        .await?;

        Ok(issues)
    }

    async fn ensure_material(&self, company_id: Uuid, material_id: Uuid) -> AppResult<()> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM materials WHERE id = $1 AND company_id = $2)",
        )
        .bind(material_id)
        .bind(company_id)
        .fetch_one(&self.db)
        .await?;

        if !exists {
            return Err(AppError::NotFound("Material".to_string()));
        }

        Ok(())
    }
}

/// Generate the next document number for a company: PREFIX-YYYY-NNNN.
async fn next_document_number(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    company_id: Uuid,
    prefix: &str,
    table: &str,
    column: &str,
) -> AppResult<String> {
    let year = Utc::now().year();

    let query = format!(
        "SELECT COUNT(*) FROM {} WHERE company_id = $1 AND {} LIKE $2",
        table, column
    );

    let count = sqlx::query_scalar::<_, i64>(&query)
        .bind(company_id)
        .bind(format!("{}-{}-%", prefix, year))
        .fetch_one(&mut **tx)
        .await?;

    Ok(format!("{}-{}-{:04}", prefix, year, count + 1))
}
