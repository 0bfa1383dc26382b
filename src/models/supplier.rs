use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Single source of truth for the supplier lifecycle. The legacy system
/// kept a separate `is_active` boolean next to this enum; here any
/// boolean view is derived from the status instead of stored twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "supplier_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SupplierStatus {
    Pending,
    Approved,
    Rejected,
    Disabled,
    PendingConfiguration,
}

impl SupplierStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SupplierStatus::Approved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "person_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PersonType {
    Natural,
    Juridica,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "account_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Corriente,
    Ahorros,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "currency", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Pen,
    Usd,
}

/// One row per vendor organization. `id` is shared with the proveedor
/// user account that owns it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub ruc: String,
    pub business_name: String,
    pub person_type: PersonType,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub status: SupplierStatus,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BankAccount {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub bank_name: String,
    pub account_number: String,
    pub account_type: AccountType,
    pub currency: Currency,
    pub cci: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BankAccountInput {
    pub bank_name: String,
    pub account_number: String,
    pub account_type: AccountType,
    pub cci: Option<String>,
}

/// Self-registration payload. The form offers two fixed account slots,
/// at most one per currency.
#[derive(Debug, Deserialize)]
pub struct RegisterSupplier {
    pub email: String,
    pub password: String,
    pub name: String,
    pub ruc: String,
    pub business_name: String,
    pub person_type: PersonType,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub contact_phone: Option<String>,
    pub pen_account: Option<BankAccountInput>,
    pub usd_account: Option<BankAccountInput>,
}

/// Administrative quick-add by operaciones; the supplier completes its
/// own profile later, hence `pending_configuration`.
#[derive(Debug, Deserialize)]
pub struct QuickAddSupplier {
    pub email: String,
    pub name: String,
    pub ruc: String,
    pub business_name: String,
    pub person_type: PersonType,
}

#[derive(Debug, Serialize)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub ruc: String,
    pub business_name: String,
    pub person_type: PersonType,
    pub address: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: String,
    pub status: SupplierStatus,
    pub is_active: bool,
    pub bank_accounts: Vec<BankAccount>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SupplierResponse {
    pub fn from_parts(supplier: Supplier, bank_accounts: Vec<BankAccount>) -> Self {
        Self {
            id: supplier.id,
            ruc: supplier.ruc,
            business_name: supplier.business_name,
            person_type: supplier.person_type,
            address: supplier.address.unwrap_or_default(),
            contact_name: supplier.contact_name.unwrap_or_default(),
            contact_phone: supplier.contact_phone.unwrap_or_default(),
            contact_email: supplier.contact_email.unwrap_or_default(),
            is_active: supplier.status.is_active(),
            status: supplier.status,
            bank_accounts,
            created_at: supplier.created_at,
            updated_at: supplier.updated_at,
        }
    }
}
