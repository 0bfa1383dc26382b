//! Lifecycle transitions for documents, suppliers and payment records.
//!
//! Preconditions live here, not in the callers: a comprobante without
//! deliverables cannot be approved no matter which handler asks, and a
//! payment cannot be marked paid without an actual payment date.
//! Documents and suppliers carry a version column; a transition that
//! finds a stale version fails with `Conflict` instead of silently
//! overwriting a concurrent reviewer's decision.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::database::Database;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{
    CreateDocument, Document, DocumentStatus, PaymentRecord, PaymentStatus, Supplier,
    SupplierStatus, UpdatePaymentRecord,
};

/// Payment of an approved comprobante is scheduled this many days out.
pub const PAYMENT_TERM_DAYS: i64 = 15;

/// The NUMERIC(14, 2) amount columns hold values below 10^12.
pub const MAX_AMOUNT_EXCLUSIVE: i64 = 1_000_000_000_000;

pub fn estimated_payment_date(approved_at: DateTime<Utc>) -> NaiveDate {
    (approved_at + Duration::days(PAYMENT_TERM_DAYS)).date_naive()
}

/// `None` when the product overflows Decimal range; callers surface
/// that as a validation failure rather than panicking mid-request.
pub fn detraction_amount(amount: Decimal, percentage: Decimal) -> Option<Decimal> {
    amount
        .checked_mul(percentage)?
        .checked_div(Decimal::from(100))
        .map(|v| v.round_dp(2))
}

/// Recomputes the detraction server-side from amount and percentage.
/// Returns the amount to persist, or `None` when the comprobante has
/// no detraction.
pub fn validate_detraction(input: &CreateDocument) -> Result<Option<Decimal>, AppError> {
    if !input.has_detraction {
        return Ok(None);
    }
    let percentage = input.detraction_percentage.ok_or_else(|| {
        AppError::Validation("detraction percentage is required when detraction applies".to_string())
    })?;
    if percentage <= Decimal::ZERO || percentage > Decimal::from(100) {
        return Err(AppError::Validation(
            "detraction percentage must be between 0 and 100".to_string(),
        ));
    }
    let computed = detraction_amount(input.amount, percentage).ok_or_else(|| {
        AppError::Validation("amount is too large to compute a detraction".to_string())
    })?;
    Ok(Some(computed))
}

pub fn check_approvable(document: &Document) -> Result<(), AppError> {
    if document.status != DocumentStatus::Pending {
        return Err(AppError::Conflict);
    }
    if document.deliverables.0.is_empty() {
        return Err(AppError::Validation(
            "a document without deliverables cannot be approved".to_string(),
        ));
    }
    Ok(())
}

/// Deliverables can only be attached while the comprobante is still
/// pending; a resolved document is immutable.
pub fn check_attachable(document: &Document) -> Result<(), AppError> {
    if document.status != DocumentStatus::Pending {
        return Err(AppError::Conflict);
    }
    Ok(())
}

pub fn check_rejectable(document: &Document, reason: &str) -> Result<(), AppError> {
    if document.status != DocumentStatus::Pending {
        return Err(AppError::Conflict);
    }
    if reason.trim().is_empty() {
        return Err(AppError::Validation(
            "a rejection reason is required".to_string(),
        ));
    }
    Ok(())
}

pub fn check_supplier_resolvable(status: SupplierStatus) -> Result<(), AppError> {
    match status {
        SupplierStatus::Pending | SupplierStatus::PendingConfiguration => Ok(()),
        _ => Err(AppError::Conflict),
    }
}

pub fn check_supplier_disableable(status: SupplierStatus) -> Result<(), AppError> {
    if status == SupplierStatus::Disabled {
        return Err(AppError::Conflict);
    }
    Ok(())
}

/// A record moved to `paid` must carry an actual payment date, either
/// already on file or in the same update.
pub fn check_payment_update(
    record: &PaymentRecord,
    updates: &UpdatePaymentRecord,
) -> Result<(), AppError> {
    let status = updates.payment_status.unwrap_or(record.payment_status);
    let actual_date = updates.actual_payment_date.or(record.actual_payment_date);
    if status == PaymentStatus::Paid && actual_date.is_none() {
        return Err(AppError::Validation(
            "an actual payment date is required to mark a payment as paid".to_string(),
        ));
    }
    Ok(())
}

/// Inserts the comprobante and its companion payment record inside one
/// transaction; the two are never visible independently.
pub async fn submit_document(
    db: &Database,
    supplier_id: Uuid,
    input: &CreateDocument,
) -> Result<Document, AppError> {
    if input.number.trim().is_empty() {
        return Err(AppError::Validation("document number is required".to_string()));
    }
    if input.amount <= Decimal::ZERO {
        return Err(AppError::Validation("amount must be positive".to_string()));
    }
    if input.amount >= Decimal::from(MAX_AMOUNT_EXCLUSIVE) {
        return Err(AppError::Validation("amount exceeds the supported range".to_string()));
    }
    let detraction = validate_detraction(input)?;

    let mut tx = db.begin().await?;

    let document = sqlx::query_as::<_, Document>(
        r#"
        INSERT INTO documents
            (supplier_id, document_type, number, amount, currency,
             has_detraction, detraction_percentage, detraction_amount, detraction_code,
             approver_email, service_performed)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(supplier_id)
    .bind(input.document_type)
    .bind(input.number.trim())
    .bind(input.amount)
    .bind(input.currency)
    .bind(input.has_detraction)
    .bind(input.detraction_percentage)
    .bind(detraction)
    .bind(&input.detraction_code)
    .bind(input.approver_email.trim())
    .bind(&input.service_performed)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO payment_records (document_id, document_number, supplier_id)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(document.id)
    .bind(&document.number)
    .bind(supplier_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(document)
}

pub async fn approve_document(
    db: &Database,
    id: Uuid,
    approver: &CurrentUser,
    code: &str,
    budget: &str,
) -> Result<Document, AppError> {
    if code.trim().is_empty() || budget.trim().is_empty() {
        return Err(AppError::Validation(
            "code and budget are required to approve a document".to_string(),
        ));
    }

    let mut tx = db.begin().await?;

    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

    check_approvable(&document)?;

    let approved_at = Utc::now();
    let result = sqlx::query(
        r#"
        UPDATE documents
        SET status = 'approved', approved_by = $2, approved_at = $3,
            code = $4, budget = $5, payment_status = 'scheduled',
            version = version + 1
        WHERE id = $1 AND version = $6
        "#,
    )
    .bind(id)
    .bind(approver.id)
    .bind(approved_at)
    .bind(code.trim())
    .bind(budget.trim())
    .bind(document.version)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict);
    }

    sqlx::query(
        r#"
        UPDATE payment_records
        SET payment_status = 'scheduled', estimated_payment_date = $2, updated_at = NOW()
        WHERE document_id = $1
        "#,
    )
    .bind(id)
    .bind(estimated_payment_date(approved_at))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(document)
}

/// Rejection is terminal and leaves the payment record untouched.
pub async fn reject_document(db: &Database, id: Uuid, reason: &str) -> Result<Document, AppError> {
    let mut tx = db.begin().await?;

    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

    check_rejectable(&document, reason)?;

    let result = sqlx::query(
        r#"
        UPDATE documents
        SET status = 'rejected', reject_reason = $2, rejected_at = NOW(),
            version = version + 1
        WHERE id = $1 AND version = $3
        "#,
    )
    .bind(id)
    .bind(reason.trim())
    .bind(document.version)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict);
    }

    tx.commit().await?;

    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(document)
}

async fn set_supplier_status(
    db: &Database,
    id: Uuid,
    check: fn(SupplierStatus) -> Result<(), AppError>,
    to: SupplierStatus,
) -> Result<Supplier, AppError> {
    let mut tx = db.begin().await?;

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

    check(supplier.status)?;

    let result = sqlx::query(
        r#"
        UPDATE suppliers
        SET status = $2, updated_at = NOW(), version = version + 1
        WHERE id = $1 AND version = $3
        "#,
    )
    .bind(id)
    .bind(to)
    .bind(supplier.version)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict);
    }

    tx.commit().await?;

    let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = $1")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(supplier)
}

pub async fn approve_supplier(db: &Database, id: Uuid) -> Result<Supplier, AppError> {
    set_supplier_status(db, id, check_supplier_resolvable, SupplierStatus::Approved).await
}

pub async fn reject_supplier(db: &Database, id: Uuid) -> Result<Supplier, AppError> {
    set_supplier_status(db, id, check_supplier_resolvable, SupplierStatus::Rejected).await
}

pub async fn disable_supplier(db: &Database, id: Uuid) -> Result<Supplier, AppError> {
    set_supplier_status(db, id, check_supplier_disableable, SupplierStatus::Disabled).await
}

pub async fn complete_payment(
    db: &Database,
    id: Uuid,
    updates: &UpdatePaymentRecord,
) -> Result<PaymentRecord, AppError> {
    let mut tx = db.begin().await?;

    let record =
        sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payment_records WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::NotFound)?;

    check_payment_update(&record, updates)?;

    let status = updates.payment_status.unwrap_or(record.payment_status);
    sqlx::query(
        r#"
        UPDATE payment_records
        SET amount = COALESCE($2, amount),
            currency = COALESCE($3, currency),
            estimated_payment_date = COALESCE($4, estimated_payment_date),
            actual_payment_date = COALESCE($5, actual_payment_date),
            payment_status = $6,
            payment_method = COALESCE($7, payment_method),
            bank_account = COALESCE($8, bank_account),
            notes = COALESCE($9, notes),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(updates.amount)
    .bind(updates.currency)
    .bind(updates.estimated_payment_date)
    .bind(updates.actual_payment_date)
    .bind(status)
    .bind(&updates.payment_method)
    .bind(&updates.bank_account)
    .bind(&updates.notes)
    .execute(&mut *tx)
    .await?;

    // Keep the document's payment status in step with its record
    sqlx::query("UPDATE documents SET payment_status = $2 WHERE id = $1")
        .bind(record.document_id)
        .bind(status)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let record = sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payment_records WHERE id = $1")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, DeliverableFile, DocumentType};
    use chrono::TimeZone;
    use std::str::FromStr;

    fn document(status: DocumentStatus, deliverables: usize) -> Document {
        let files = (0..deliverables)
            .map(|i| DeliverableFile {
                file_name: format!("entregable-{}.pdf", i),
                url: format!("/uploads/entregable-{}.pdf", i),
                uploaded_at: Utc::now(),
            })
            .collect();
        Document {
            id: Uuid::new_v4(),
            supplier_id: Uuid::new_v4(),
            document_type: DocumentType::Factura,
            number: "F001-00123".to_string(),
            amount: Decimal::new(250000, 2),
            currency: Currency::Pen,
            has_detraction: false,
            detraction_percentage: None,
            detraction_amount: None,
            detraction_code: None,
            approver_email: "aprobador@proveo.pe".to_string(),
            service_performed: "Servicio de consultoría".to_string(),
            deliverables: sqlx::types::Json(files),
            status,
            reject_reason: None,
            approved_by: None,
            approved_at: None,
            rejected_at: None,
            payment_status: PaymentStatus::Pending,
            code: None,
            budget: None,
            version: 1,
            created_at: Utc::now(),
        }
    }

    fn record(status: PaymentStatus, actual_date: Option<NaiveDate>) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            document_number: "F001-00123".to_string(),
            supplier_id: Uuid::new_v4(),
            amount: None,
            currency: None,
            estimated_payment_date: None,
            actual_payment_date: actual_date,
            payment_status: status,
            payment_method: None,
            bank_account: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn payment_is_scheduled_fifteen_days_out() {
        let approved_at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        assert_eq!(estimated_payment_date(approved_at), expected);
    }

    #[test]
    fn detraction_is_recomputed_from_amount_and_percentage() {
        let amount = Decimal::from_str("2500.00").unwrap();
        let pct = Decimal::from_str("12").unwrap();
        assert_eq!(
            detraction_amount(amount, pct),
            Some(Decimal::from_str("300.00").unwrap())
        );
    }

    #[test]
    fn detraction_overflow_is_a_validation_error_not_a_panic() {
        assert_eq!(detraction_amount(Decimal::MAX, Decimal::from(99)), None);

        let input = CreateDocument {
            document_type: DocumentType::Factura,
            number: "F001-00123".to_string(),
            amount: Decimal::MAX,
            currency: Currency::Pen,
            has_detraction: true,
            detraction_percentage: Some(Decimal::from(99)),
            detraction_code: Some("037".to_string()),
            approver_email: "aprobador@proveo.pe".to_string(),
            service_performed: "Consultoría".to_string(),
        };
        assert!(matches!(validate_detraction(&input), Err(AppError::Validation(_))));
    }

    #[test]
    fn detraction_requires_percentage() {
        let input = CreateDocument {
            document_type: DocumentType::Factura,
            number: "F001-00123".to_string(),
            amount: Decimal::from(2500),
            currency: Currency::Pen,
            has_detraction: true,
            detraction_percentage: None,
            detraction_code: Some("037".to_string()),
            approver_email: "aprobador@proveo.pe".to_string(),
            service_performed: "Consultoría".to_string(),
        };
        assert!(matches!(validate_detraction(&input), Err(AppError::Validation(_))));
    }

    #[test]
    fn document_without_deliverables_is_not_approvable() {
        let doc = document(DocumentStatus::Pending, 0);
        assert!(matches!(check_approvable(&doc), Err(AppError::Validation(_))));
    }

    #[test]
    fn document_with_deliverables_is_approvable() {
        let doc = document(DocumentStatus::Pending, 1);
        assert!(check_approvable(&doc).is_ok());
    }

    #[test]
    fn second_approval_attempt_conflicts() {
        let doc = document(DocumentStatus::Approved, 1);
        assert!(matches!(check_approvable(&doc), Err(AppError::Conflict)));
    }

    #[test]
    fn rejected_document_cannot_be_approved_or_rejected_again() {
        let doc = document(DocumentStatus::Rejected, 1);
        assert!(matches!(check_approvable(&doc), Err(AppError::Conflict)));
        assert!(matches!(check_rejectable(&doc, "Missing info"), Err(AppError::Conflict)));
    }

    #[test]
    fn deliverables_attach_only_while_pending() {
        assert!(check_attachable(&document(DocumentStatus::Pending, 0)).is_ok());
        assert!(matches!(
            check_attachable(&document(DocumentStatus::Approved, 1)),
            Err(AppError::Conflict)
        ));
        assert!(matches!(
            check_attachable(&document(DocumentStatus::Rejected, 1)),
            Err(AppError::Conflict)
        ));
    }

    #[test]
    fn rejection_requires_a_reason() {
        let doc = document(DocumentStatus::Pending, 0);
        assert!(matches!(check_rejectable(&doc, "  "), Err(AppError::Validation(_))));
        assert!(check_rejectable(&doc, "Falta información").is_ok());
    }

    #[test]
    fn paid_requires_actual_payment_date() {
        let rec = record(PaymentStatus::Scheduled, None);
        let updates = UpdatePaymentRecord {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        assert!(matches!(check_payment_update(&rec, &updates), Err(AppError::Validation(_))));

        let updates = UpdatePaymentRecord {
            payment_status: Some(PaymentStatus::Paid),
            actual_payment_date: NaiveDate::from_ymd_opt(2024, 3, 20),
            ..Default::default()
        };
        assert!(check_payment_update(&rec, &updates).is_ok());
    }

    #[test]
    fn paid_accepts_date_already_on_file() {
        let rec = record(PaymentStatus::Scheduled, NaiveDate::from_ymd_opt(2024, 3, 18));
        let updates = UpdatePaymentRecord {
            payment_status: Some(PaymentStatus::Paid),
            ..Default::default()
        };
        assert!(check_payment_update(&rec, &updates).is_ok());
    }

    #[test]
    fn supplier_transitions() {
        assert!(check_supplier_resolvable(SupplierStatus::Pending).is_ok());
        assert!(check_supplier_resolvable(SupplierStatus::PendingConfiguration).is_ok());
        assert!(matches!(
            check_supplier_resolvable(SupplierStatus::Approved),
            Err(AppError::Conflict)
        ));
        assert!(matches!(
            check_supplier_resolvable(SupplierStatus::Disabled),
            Err(AppError::Conflict)
        ));

        assert!(check_supplier_disableable(SupplierStatus::Approved).is_ok());
        assert!(check_supplier_disableable(SupplierStatus::Pending).is_ok());
        assert!(matches!(
            check_supplier_disableable(SupplierStatus::Disabled),
            Err(AppError::Conflict)
        ));
    }
}
