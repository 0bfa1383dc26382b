use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::document::PaymentStatus;
use super::supplier::Currency;

/// One-to-one companion of a document, created in the same transaction
/// as the comprobante. Amount, currency and dates stay unset ("por
/// completar") until operaciones fills them in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub document_id: Uuid,
    pub document_number: String,
    pub supplier_id: Uuid,
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub estimated_payment_date: Option<NaiveDate>,
    pub actual_payment_date: Option<NaiveDate>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub bank_account: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied by operaciones through the completion form.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePaymentRecord {
    pub amount: Option<Decimal>,
    pub currency: Option<Currency>,
    pub estimated_payment_date: Option<NaiveDate>,
    pub actual_payment_date: Option<NaiveDate>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<String>,
    pub bank_account: Option<String>,
    pub notes: Option<String>,
}
