use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use tower_cookies::Cookies;

use crate::{
    database::Database,
    error::AppError,
    middleware::require_current_user,
    models::{CompanyDocument, CreateCompanyDocument, Role},
};

pub async fn company_documents_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Json<Vec<CompanyDocument>>, AppError> {
    let _user = require_current_user(cookies, &db).await?;

    let documents = sqlx::query_as::<_, CompanyDocument>(
        "SELECT * FROM company_documents ORDER BY created_at DESC",
    )
    .fetch_all(&db)
    .await?;

    Ok(Json(documents))
}

pub async fn create_company_document(
    State(db): State<Database>,
    cookies: Cookies,
    Json(form): Json<CreateCompanyDocument>,
) -> Result<(StatusCode, Json<CompanyDocument>), AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

    if form.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let document = sqlx::query_as::<_, CompanyDocument>(
        r#"
        INSERT INTO company_documents (title, file_name, url, uploaded_by)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(form.title.trim())
    .bind(&form.file_name)
    .bind(&form.url)
    .bind(user.id)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(document)))
}
