use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use tower_cookies::Cookies;

use crate::{
    database::Database,
    error::AppError,
    middleware::require_current_user,
    models::{CreateFeedback, FeedbackSummary, FeedbackSurvey, Role},
};

/// Insert-only: surveys are never updated after submission.
pub async fn submit_feedback(
    State(db): State<Database>,
    cookies: Cookies,
    Json(form): Json<CreateFeedback>,
) -> Result<(StatusCode, Json<FeedbackSurvey>), AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Proveedor)?;

    if !(1..=5).contains(&form.rating) {
        return Err(AppError::Validation("rating must be between 1 and 5".to_string()));
    }

    let survey = sqlx::query_as::<_, FeedbackSurvey>(
        r#"
        INSERT INTO feedback_surveys (supplier_id, rating, comments)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(form.rating)
    .bind(&form.comments)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(survey)))
}

/// Averaged ratings for operaciones; individual records are not exposed.
pub async fn feedback_summary(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Json<FeedbackSummary>, AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

    let summary = sqlx::query_as::<_, FeedbackSummary>(
        "SELECT COUNT(*) AS responses, AVG(rating)::float8 AS average_rating FROM feedback_surveys",
    )
    .fetch_one(&db)
    .await?;

    Ok(Json(summary))
}
