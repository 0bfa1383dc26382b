use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use rand::{distributions::Alphanumeric, Rng};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::{on_unique_violation, AppError},
    filters::filter_suppliers,
    middleware::require_current_user,
    models::{
        BankAccount, QuickAddSupplier, Role, Supplier, SupplierResponse, User, UserResponse,
    },
    utils::hash_password,
    workflow,
};

pub async fn suppliers_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Json<Vec<SupplierResponse>>, AppError> {
    let user = require_current_user(cookies, &db).await?;

    let all = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY business_name")
        .fetch_all(&db)
        .await?;
    let visible = filter_suppliers(all, &user);

    let mut responses = Vec::with_capacity(visible.len());
    for supplier in visible {
        let accounts = sqlx::query_as::<_, BankAccount>(
            "SELECT * FROM bank_accounts WHERE supplier_id = $1 ORDER BY currency",
        )
        .bind(supplier.id)
        .fetch_all(&db)
        .await?;
        responses.push(SupplierResponse::from_parts(supplier, accounts));
    }

    Ok(Json(responses))
}

/// Administrative add by operaciones. The account starts in
/// pending_configuration with a generated password; the supplier
/// completes its profile after the (simulated) welcome email.
pub async fn quick_add_supplier(
    State(db): State<Database>,
    cookies: Cookies,
    Json(form): Json<QuickAddSupplier>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

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

    let temp_password = generate_temp_password();
    let password_hash = hash_password(&temp_password)
        .map_err(|_| AppError::Validation("failed to process password".to_string()))?;

    let mut tx = db.begin().await?;

    let created = sqlx::query_as::<_, User>(
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
        INSERT INTO suppliers (id, ruc, business_name, person_type, contact_email, status)
        VALUES ($1, $2, $3, $4, $5, 'pending_configuration')
        "#,
    )
    .bind(created.id)
    .bind(form.ruc.trim())
    .bind(form.business_name.trim())
    .bind(form.person_type)
    .bind(created.email.clone())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    // Real mail delivery is out of scope; the credential hand-off is logged
    log::info!(
        "[email simulado] credenciales enviadas a {}: {}",
        created.email,
        temp_password
    );
    Ok((StatusCode::CREATED, Json(UserResponse::from(created))))
}

pub async fn approve_supplier(
    State(db): State<Database>,
    cookies: Cookies,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

    let supplier = workflow::approve_supplier(&db, supplier_id).await?;
    log::info!("supplier {} approved by {}", supplier.ruc, user.email);
    Ok(Json(supplier))
}

pub async fn reject_supplier(
    State(db): State<Database>,
    cookies: Cookies,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

    let supplier = workflow::reject_supplier(&db, supplier_id).await?;
    log::info!("supplier {} rejected by {}", supplier.ruc, user.email);
    Ok(Json(supplier))
}

pub async fn disable_supplier(
    State(db): State<Database>,
    cookies: Cookies,
    Path(supplier_id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

    let supplier = workflow::disable_supplier(&db, supplier_id).await?;
    log::info!("supplier {} disabled by {}", supplier.ruc, user.email);
    Ok(Json(supplier))
}

/// Regenerates a temporary password and notifies the supplier. Supplier
/// master data is untouched.
pub async fn reset_supplier_password(
    State(db): State<Database>,
    cookies: Cookies,
    Path(supplier_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

    let supplier_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(supplier_id)
        .fetch_optional(&db)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_supplier_account(&supplier_user)?;

    let temp_password = generate_temp_password();
    let password_hash = hash_password(&temp_password)
        .map_err(|_| AppError::Validation("failed to process password".to_string()))?;

    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(supplier_id)
        .bind(&password_hash)
        .execute(&db)
        .await?;

    sqlx::query(
        r#"
        INSERT INTO notifications (user_id, title, body)
        VALUES ($1, 'Contraseña restablecida', 'Se generó una nueva contraseña temporal para tu cuenta.')
        "#,
    )
    .bind(supplier_id)
    .execute(&db)
    .await?;

    log::info!(
        "[email simulado] nueva contraseña enviada a {}: {}",
        supplier_user.email,
        temp_password
    );
    Ok(StatusCode::NO_CONTENT)
}

/// This route is supplier-scoped: staff accounts (aprobador,
/// operaciones) cannot be reset through it.
fn ensure_supplier_account(user: &User) -> Result<(), AppError> {
    if user.role == Role::Proveedor {
        Ok(())
    } else {
        Err(AppError::NotFound)
    }
}

fn generate_temp_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "cuenta@proveo.pe".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            name: "Cuenta".to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn password_reset_is_limited_to_supplier_accounts() {
        assert!(ensure_supplier_account(&user(Role::Proveedor)).is_ok());
        assert!(matches!(
            ensure_supplier_account(&user(Role::Aprobador)),
            Err(AppError::NotFound)
        ));
        assert!(matches!(
            ensure_supplier_account(&user(Role::Operaciones)),
            Err(AppError::NotFound)
        ));
    }
}
