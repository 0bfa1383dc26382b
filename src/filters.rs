//! Role-based view filters.
//!
//! Pure functions deriving the subset of documents, suppliers and
//! payment records a role is authorized to see. The collections are
//! assumed already fetched; handlers apply these before serializing a
//! response. Every match is exhaustive over `Role`, so an
//! unclassified session can never fall through to the full collection.

use crate::middleware::CurrentUser;
use crate::models::{Document, DocumentStatus, PaymentRecord, Role, Supplier, SupplierStatus};

/// A proveedor sees only its own comprobantes, across all statuses.
/// An aprobador sees its work queue (pending only); resolved documents
/// drop out of this view. Operaciones sees approved, payable documents
/// and nothing else.
pub fn filter_documents(all: Vec<Document>, user: &CurrentUser) -> Vec<Document> {
    match user.role {
        Role::Proveedor => all
            .into_iter()
            .filter(|d| d.supplier_id == user.id)
            .collect(),
        Role::Aprobador => all
            .into_iter()
            .filter(|d| d.status == DocumentStatus::Pending)
            .collect(),
        Role::Operaciones => all
            .into_iter()
            .filter(|d| d.status == DocumentStatus::Approved)
            .collect(),
    }
}

pub fn filter_suppliers(all: Vec<Supplier>, user: &CurrentUser) -> Vec<Supplier> {
    match user.role {
        Role::Proveedor => all.into_iter().filter(|s| s.id == user.id).collect(),
        Role::Aprobador => all
            .into_iter()
            .filter(|s| s.status == SupplierStatus::Pending)
            .collect(),
        Role::Operaciones => all
            .into_iter()
            .filter(|s| s.status == SupplierStatus::Approved)
            .collect(),
    }
}

/// Approvers have no payment visibility at all.
pub fn filter_payment_records(all: Vec<PaymentRecord>, user: &CurrentUser) -> Vec<PaymentRecord> {
    match user.role {
        Role::Proveedor => all
            .into_iter()
            .filter(|p| p.supplier_id == user.id)
            .collect(),
        Role::Aprobador => Vec::new(),
        Role::Operaciones => all,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Currency, DocumentType, PaymentStatus, PersonType};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "test@proveo.pe".to_string(),
            name: "Test".to_string(),
            role,
        }
    }

    fn document(supplier_id: Uuid, status: DocumentStatus) -> Document {
        Document {
            id: Uuid::new_v4(),
            supplier_id,
            document_type: DocumentType::Factura,
            number: "F001-00001".to_string(),
            amount: Decimal::new(250000, 2),
            currency: Currency::Pen,
            has_detraction: false,
            detraction_percentage: None,
            detraction_amount: None,
            detraction_code: None,
            approver_email: "aprobador@proveo.pe".to_string(),
            service_performed: "Consultoría".to_string(),
            deliverables: sqlx::types::Json(Vec::new()),
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

    fn supplier(id: Uuid, status: SupplierStatus) -> Supplier {
        Supplier {
            id,
            ruc: "20100012345".to_string(),
            business_name: "ACME SAC".to_string(),
            person_type: PersonType::Juridica,
            address: None,
            contact_name: None,
            contact_phone: None,
            contact_email: None,
            status,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn payment(supplier_id: Uuid) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            document_id: Uuid::new_v4(),
            document_number: "F001-00001".to_string(),
            supplier_id,
            amount: None,
            currency: None,
            estimated_payment_date: None,
            actual_payment_date: None,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            bank_account: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn proveedor_sees_only_own_documents() {
        let me = user(Role::Proveedor);
        let all = vec![
            document(me.id, DocumentStatus::Pending),
            document(me.id, DocumentStatus::Rejected),
            document(Uuid::new_v4(), DocumentStatus::Pending),
        ];

        let visible = filter_documents(all, &me);
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|d| d.supplier_id == me.id));
    }

    #[test]
    fn aprobador_sees_only_pending_documents() {
        let me = user(Role::Aprobador);
        let all = vec![
            document(Uuid::new_v4(), DocumentStatus::Pending),
            document(Uuid::new_v4(), DocumentStatus::Approved),
            document(Uuid::new_v4(), DocumentStatus::Rejected),
        ];

        let visible = filter_documents(all, &me);
        assert_eq!(visible.len(), 1);
        assert!(visible.iter().all(|d| d.status == DocumentStatus::Pending));
    }

    #[test]
    fn operaciones_sees_only_approved_documents() {
        let me = user(Role::Operaciones);
        let all = vec![
            document(Uuid::new_v4(), DocumentStatus::Pending),
            document(Uuid::new_v4(), DocumentStatus::Approved),
            document(Uuid::new_v4(), DocumentStatus::Rejected),
        ];

        let visible = filter_documents(all, &me);
        assert_eq!(visible.len(), 1);
        assert!(visible.iter().all(|d| d.status == DocumentStatus::Approved));
    }

    #[test]
    fn proveedor_without_supplier_row_sees_nothing() {
        let me = user(Role::Proveedor);
        let all = vec![
            document(Uuid::new_v4(), DocumentStatus::Pending),
            document(Uuid::new_v4(), DocumentStatus::Approved),
        ];

        assert!(filter_documents(all, &me).is_empty());
    }

    #[test]
    fn supplier_filter_per_role() {
        let me = user(Role::Proveedor);
        let all = vec![
            supplier(me.id, SupplierStatus::Pending),
            supplier(Uuid::new_v4(), SupplierStatus::Approved),
            supplier(Uuid::new_v4(), SupplierStatus::Pending),
        ];

        let mine = filter_suppliers(all.clone(), &me);
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, me.id);

        let queue = filter_suppliers(all.clone(), &user(Role::Aprobador));
        assert_eq!(queue.len(), 2);
        assert!(queue.iter().all(|s| s.status == SupplierStatus::Pending));

        let active = filter_suppliers(all, &user(Role::Operaciones));
        assert_eq!(active.len(), 1);
        assert!(active.iter().all(|s| s.status == SupplierStatus::Approved));
    }

    #[test]
    fn aprobador_has_no_payment_visibility() {
        let all = vec![payment(Uuid::new_v4()), payment(Uuid::new_v4())];
        assert!(filter_payment_records(all, &user(Role::Aprobador)).is_empty());
    }

    #[test]
    fn operaciones_sees_all_payments_and_proveedor_only_its_own() {
        let me = user(Role::Proveedor);
        let all = vec![payment(me.id), payment(Uuid::new_v4())];

        assert_eq!(filter_payment_records(all.clone(), &user(Role::Operaciones)).len(), 2);

        let mine = filter_payment_records(all, &me);
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].supplier_id, me.id);
    }
}
