pub mod auth;
pub mod suppliers;
pub mod documents;
pub mod payments;
pub mod announcements;
pub mod company_documents;
pub mod feedback;
pub mod notifications;

use axum::extract::{Json, State};
use rust_decimal::Decimal;
use serde::Serialize;
use tower_cookies::Cookies;

use crate::{
    database::Database,
    error::AppError,
    middleware::require_current_user,
    models::Role,
};

#[derive(Serialize)]
#[serde(untagged)]
pub enum DashboardStats {
    Supplier {
        registered_documents: i64,
        approved_documents: i64,
        pending_documents: i64,
        payments_received: i64,
        total_paid: Decimal,
    },
    Approver {
        pending_inbox: i64,
    },
    Operations {
        approved_documents: i64,
        active_suppliers: i64,
        scheduled_payments: i64,
    },
}

/// Per-role portal summary. Stats queries degrade to zero on failure;
/// the dashboard must render even when a view is temporarily broken.
pub async fn dashboard(
    cookies: Cookies,
    State(db): State<Database>,
) -> Result<Json<DashboardStats>, AppError> {
    let user = require_current_user(cookies, &db).await?;

    let stats = match user.role {
        Role::Proveedor => {
            let registered = count(&db, "SELECT COUNT(*) FROM documents WHERE supplier_id = $1", Some(user.id)).await;
            let approved = count(
                &db,
                "SELECT COUNT(*) FROM documents WHERE supplier_id = $1 AND status = 'approved'",
                Some(user.id),
            )
            .await;
            let pending = count(
                &db,
                "SELECT COUNT(*) FROM documents WHERE supplier_id = $1 AND status = 'pending'",
                Some(user.id),
            )
            .await;
            let payments = count(
                &db,
                "SELECT COUNT(*) FROM payment_records WHERE supplier_id = $1 AND payment_status = 'paid'",
                Some(user.id),
            )
            .await;
            let total_paid = sqlx::query_scalar::<_, Option<Decimal>>(
                "SELECT SUM(amount) FROM payment_records WHERE supplier_id = $1 AND payment_status = 'paid'",
            )
            .bind(user.id)
            .fetch_one(&db)
            .await
            .ok()
            .flatten()
            .unwrap_or(Decimal::ZERO);

            DashboardStats::Supplier {
                registered_documents: registered,
                approved_documents: approved,
                pending_documents: pending,
                payments_received: payments,
                total_paid,
            }
        }
        Role::Aprobador => {
            // The inbox is keyed by approver email, as submitted on the form
            let pending_inbox = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM documents WHERE status = 'pending' AND approver_email = $1",
            )
            .bind(&user.email)
            .fetch_one(&db)
            .await
            .unwrap_or(0);

            DashboardStats::Approver { pending_inbox }
        }
        Role::Operaciones => {
            let approved =
                count(&db, "SELECT COUNT(*) FROM documents WHERE status = 'approved'", None).await;
            let suppliers =
                count(&db, "SELECT COUNT(*) FROM suppliers WHERE status = 'approved'", None).await;
            let scheduled = count(
                &db,
                "SELECT COUNT(*) FROM payment_records WHERE payment_status = 'scheduled'",
                None,
            )
            .await;

            DashboardStats::Operations {
                approved_documents: approved,
                active_suppliers: suppliers,
                scheduled_payments: scheduled,
            }
        }
    };

    Ok(Json(stats))
}

async fn count(db: &Database, sql: &str, bind: Option<uuid::Uuid>) -> i64 {
    let query = sqlx::query_scalar::<_, i64>(sql);
    let query = match bind {
        Some(id) => query.bind(id),
        None => query,
    };
    query.fetch_one(db).await.unwrap_or(0)
}
