use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tower_cookies::{Cookie, Cookies};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    database::Database,
    error::{on_unique_violation, AppError},
    models::{BankAccountInput, Currency, RegisterSupplier, Role, User, UserResponse},
    utils::{create_token, hash_password, verify_password},
};

#[derive(Deserialize)]
pub struct LoginForm {
    email: String,
    password: String,
}

pub async fn login(
    State(db): State<Database>,
    cookies: Cookies,
    Json(form): Json<LoginForm>,
) -> Result<Json<UserResponse>, AppError> {
    let user = authenticate_user(&db, &form.email, &form.password).await?;

    let token = create_token(user.id, user.email.clone(), user.role)
        .map_err(|_| AppError::Unauthorized)?;

    // Session record in the database for additional tracking
    let session_id = Uuid::new_v4();
    let expires_at = Utc::now() + Duration::hours(24);
    let _ = sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(session_id)
        .bind(user.id)
        .bind(expires_at)
        .execute(&db)
        .await;

    // HTTP-only cookie with the JWT token
    let cookie = Cookie::build(("auth_token", token))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::hours(24))
        .build();
    cookies.add(cookie);

    Ok(Json(UserResponse::from(user)))
}

pub async fn logout(cookies: Cookies) -> impl IntoResponse {
    cookies.remove(Cookie::from("auth_token"));
    StatusCode::NO_CONTENT
}

/// Supplier self-registration: one transaction creates the proveedor
/// user, its supplier row (status pending, shared id) and the fixed
/// bank account slots.
pub async fn register(
    State(db): State<Database>,
    Json(form): Json<RegisterSupplier>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    if form.email.trim().is_empty() || !form.email.contains('@') {
        return Err(AppError::Validation("a valid email is required".to_string()));
    }
    if form.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if form.ruc.trim().is_empty() || form.business_name.trim().is_empty() {
        return Err(AppError::Validation(
            "RUC and business name are required".to_string(),
        ));
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(form.email.trim())
        .fetch_one(&db)
        .await?;
    if existing > 0 {
        return Err(AppError::Validation("email is already registered".to_string()));
    }

    let password_hash = hash_password(&form.password)
        .map_err(|_| AppError::Validation("failed to process password".to_string()))?;

    let mut tx = db.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash, name, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(form.email.trim())
    .bind(&password_hash)
    .bind(form.name.trim())
    .bind(Role::Proveedor)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| on_unique_violation(e, "email is already registered"))?;

    sqlx::query(
        r#"
        INSERT INTO suppliers
            (id, ruc, business_name, person_type, address,
             contact_name, contact_phone, contact_email, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
        "#,
    )
    .bind(user.id)
    .bind(form.ruc.trim())
    .bind(form.business_name.trim())
    .bind(form.person_type)
    .bind(&form.address)
    .bind(&form.contact_name)
    .bind(&form.contact_phone)
    .bind(user.email.clone())
    .execute(&mut *tx)
    .await?;

    if let Some(account) = &form.pen_account {
        insert_bank_account(&mut tx, user.id, account, Currency::Pen).await?;
    }
    if let Some(account) = &form.usd_account {
        insert_bank_account(&mut tx, user.id, account, Currency::Usd).await?;
    }

    tx.commit().await?;

    log::info!("supplier registered: {} ({})", user.email, user.id);
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

async fn insert_bank_account(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    supplier_id: Uuid,
    account: &BankAccountInput,
    currency: Currency,
) -> Result<(), AppError> {
    if account.bank_name.trim().is_empty() || account.account_number.trim().is_empty() {
        return Err(AppError::Validation(
            "bank name and account number are required".to_string(),
        ));
    }
    sqlx::query(
        r#"
        INSERT INTO bank_accounts
            (supplier_id, bank_name, account_number, account_type, currency, cci)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(supplier_id)
    .bind(account.bank_name.trim())
    .bind(account.account_number.trim())
    .bind(account.account_type)
    .bind(currency)
    .bind(&account.cci)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn authenticate_user(db: &Database, email: &str, password: &str) -> Result<User, AppError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if verify_password(password, &user.password_hash).unwrap_or(false) {
        Ok(user)
    } else {
        Err(AppError::Unauthorized)
    }
}
