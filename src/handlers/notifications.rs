use axum::extract::{Json, State};
use tower_cookies::Cookies;

use crate::{
    database::Database,
    error::AppError,
    middleware::require_current_user,
    models::Notification,
};

/// Degrades to an empty list on read failure instead of propagating;
/// notifications are advisory and must never break a page load.
pub async fn notifications_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Json<Vec<Notification>>, AppError> {
    let user = require_current_user(cookies, &db).await?;

    let notifications = sqlx::query_as::<_, Notification>(
        "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&db)
    .await
    .unwrap_or_else(|err| {
        log::warn!("failed to fetch notifications for {}: {}", user.id, err);
        Vec::new()
    });

    Ok(Json(notifications))
}
