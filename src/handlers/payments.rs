use axum::extract::{Json, Path, State};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::AppError,
    filters::filter_payment_records,
    middleware::require_current_user,
    models::{PaymentRecord, Role, UpdatePaymentRecord},
    workflow,
};

pub async fn payments_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Json<Vec<PaymentRecord>>, AppError> {
    let user = require_current_user(cookies, &db).await?;

    let all =
        sqlx::query_as::<_, PaymentRecord>("SELECT * FROM payment_records ORDER BY created_at DESC")
            .fetch_all(&db)
            .await?;

    Ok(Json(filter_payment_records(all, &user)))
}

pub async fn update_payment(
    State(db): State<Database>,
    cookies: Cookies,
    Path(payment_id): Path<Uuid>,
    Json(updates): Json<UpdatePaymentRecord>,
) -> Result<Json<PaymentRecord>, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

    let record = workflow::complete_payment(&db, payment_id, &updates).await?;
    log::info!(
        "payment record {} updated by {} (status {:?})",
        record.document_number,
        user.email,
        record.payment_status
    );
    Ok(Json(record))
}
