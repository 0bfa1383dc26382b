use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use axum_extra::extract::Multipart;
use tower_cookies::Cookies;
use uuid::Uuid;
use chrono::Utc;
use std::env;
use std::path::PathBuf;
use tokio::fs;

use crate::{
    database::Database,
    error::AppError,
    filters::filter_documents,
    middleware::require_current_user,
    models::{ApproveDocument, CreateDocument, DeliverableFile, Document, RejectDocument, Role},
    workflow,
};

pub async fn documents_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Json<Vec<Document>>, AppError> {
    let user = require_current_user(cookies, &db).await?;

    // Narrow in SQL where cheap; the role filter remains authoritative
    let all = match user.role {
        Role::Proveedor => {
            sqlx::query_as::<_, Document>(
                "SELECT * FROM documents WHERE supplier_id = $1 ORDER BY created_at DESC",
            )
            .bind(user.id)
            .fetch_all(&db)
            .await?
        }
        Role::Aprobador | Role::Operaciones => {
            sqlx::query_as::<_, Document>("SELECT * FROM documents ORDER BY created_at DESC")
                .fetch_all(&db)
                .await?
        }
    };

    Ok(Json(filter_documents(all, &user)))
}

pub async fn submit_document(
    State(db): State<Database>,
    cookies: Cookies,
    Json(form): Json<CreateDocument>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Proveedor)?;

    // The supplier row must exist before comprobantes can be submitted
    let supplier_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers WHERE id = $1")
            .bind(user.id)
            .fetch_one(&db)
            .await?;
    if supplier_exists == 0 {
        return Err(AppError::Validation(
            "no supplier profile found for the current user".to_string(),
        ));
    }

    let document = workflow::submit_document(&db, user.id, &form).await?;
    log::info!("document {} submitted by supplier {}", document.number, user.id);
    Ok((StatusCode::CREATED, Json(document)))
}

/// Attaches deliverable files to a pending comprobante. Files land on
/// local disk under UPLOAD_DIR and are served back from /uploads.
pub async fn upload_deliverables(
    State(db): State<Database>,
    cookies: Cookies,
    Path(document_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Document>, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Proveedor)?;

    // Held for the whole read-modify-write: a concurrent approval or a
    // second upload must not interleave with this one
    let mut tx = db.begin().await?;

    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1 FOR UPDATE")
        .bind(document_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;

    if document.supplier_id != user.id {
        return Err(AppError::Forbidden);
    }
    workflow::check_attachable(&document)?;

    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
    fs::create_dir_all(&upload_dir)
        .await
        .map_err(|_| AppError::Validation("upload directory is not writable".to_string()))?;

    let mut files = document.deliverables.0.clone();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::Validation("malformed multipart payload".to_string()))?
    {
        let original_name = field.file_name().unwrap_or("entregable").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|_| AppError::Validation("failed to read uploaded file".to_string()))?;
        if data.is_empty() {
            continue;
        }

        let stored_name = format!("{}-{}", Uuid::new_v4(), original_name);
        let mut path = PathBuf::from(&upload_dir);
        path.push(&stored_name);
        fs::write(&path, &data)
            .await
            .map_err(|_| AppError::Validation("failed to store uploaded file".to_string()))?;

        files.push(DeliverableFile {
            file_name: original_name,
            url: format!("/uploads/{}", stored_name),
            uploaded_at: Utc::now(),
        });
    }

    if files.is_empty() {
        return Err(AppError::Validation("no files were uploaded".to_string()));
    }

    let result = sqlx::query(
        "UPDATE documents SET deliverables = $2, version = version + 1 WHERE id = $1 AND version = $3",
    )
    .bind(document_id)
    .bind(sqlx::types::Json(&files))
    .bind(document.version)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict);
    }

    tx.commit().await?;

    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
        .bind(document_id)
        .fetch_one(&db)
        .await?;
    Ok(Json(document))
}

pub async fn approve_document(
    State(db): State<Database>,
    cookies: Cookies,
    Path(document_id): Path<Uuid>,
    Json(form): Json<ApproveDocument>,
) -> Result<Json<Document>, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Aprobador)?;

    let document =
        workflow::approve_document(&db, document_id, &user, &form.code, &form.budget).await?;
    log::info!("document {} approved by {}", document.number, user.email);
    Ok(Json(document))
}

pub async fn reject_document(
    State(db): State<Database>,
    cookies: Cookies,
    Path(document_id): Path<Uuid>,
    Json(form): Json<RejectDocument>,
) -> Result<Json<Document>, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Aprobador)?;

    let document = workflow::reject_document(&db, document_id, &form.reason).await?;
    log::info!("document {} rejected by {}", document.number, user.email);
    Ok(Json(document))
}
