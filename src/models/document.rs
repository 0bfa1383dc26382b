use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::supplier::Currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Factura,
    Boleta,
    Recibo,
    Otro,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "document_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Scheduled,
    Paid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverableFile {
    pub file_name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Comprobante submitted by a supplier: factura, boleta or recibo plus
/// its deliverable attachments. Approval fields stay empty until an
/// aprobador resolves it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub document_type: DocumentType,
    pub number: String,
    pub amount: Decimal,
    pub currency: Currency,
    pub has_detraction: bool,
    pub detraction_percentage: Option<Decimal>,
    pub detraction_amount: Option<Decimal>,
    pub detraction_code: Option<String>,
    pub approver_email: String,
    pub service_performed: String,
    pub deliverables: sqlx::types::Json<Vec<DeliverableFile>>,
    pub status: DocumentStatus,
    pub reject_reason: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub code: Option<String>,
    pub budget: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocument {
    pub document_type: DocumentType,
    pub number: String,
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub has_detraction: bool,
    pub detraction_percentage: Option<Decimal>,
    pub detraction_code: Option<String>,
    pub approver_email: String,
    pub service_performed: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveDocument {
    pub code: String,
    pub budget: String,
}

#[derive(Debug, Deserialize)]
pub struct RejectDocument {
    pub reason: String,
}
