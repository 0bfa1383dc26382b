use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use tower_cookies::Cookies;

use crate::{
    database::Database,
    error::AppError,
    middleware::{require_current_user, CurrentUser},
    models::{Announcement, CreateAnnouncement, Role},
};

/// An announcement reaches a user when its audience covers the user's
/// role and, if it targets one supplier, that supplier is the user.
pub fn is_visible_to(announcement: &Announcement, user: &CurrentUser) -> bool {
    if !announcement.is_active {
        return false;
    }
    if !announcement.audience.matches(user.role) {
        return false;
    }
    match announcement.target_supplier {
        Some(supplier_id) => supplier_id == user.id,
        None => true,
    }
}

pub async fn announcements_list(
    State(db): State<Database>,
    cookies: Cookies,
) -> Result<Json<Vec<Announcement>>, AppError> {
    let user = require_current_user(cookies, &db).await?;

    let all = sqlx::query_as::<_, Announcement>(
        "SELECT * FROM announcements WHERE is_active = true ORDER BY is_urgent DESC, created_at DESC",
    )
    .fetch_all(&db)
    .await?;

    let visible = all.into_iter().filter(|a| is_visible_to(a, &user)).collect();
    Ok(Json(visible))
}

pub async fn create_announcement(
    State(db): State<Database>,
    cookies: Cookies,
    Json(form): Json<CreateAnnouncement>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    let user = require_current_user(cookies, &db).await?;
    user.require(Role::Operaciones)?;

    if form.title.trim().is_empty() || form.content.trim().is_empty() {
        return Err(AppError::Validation("title and content are required".to_string()));
    }

    let announcement = sqlx::query_as::<_, Announcement>(
        r#"
        INSERT INTO announcements
            (title, content, kind, audience, target_supplier,
             is_urgent, scheduled_date, attachments, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(form.title.trim())
    .bind(form.content.trim())
    .bind(&form.kind)
    .bind(form.audience)
    .bind(form.target_supplier)
    .bind(form.is_urgent)
    .bind(form.scheduled_date)
    .bind(sqlx::types::Json(&form.attachments))
    .bind(user.id)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(announcement)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnnouncementAudience;
    use chrono::Utc;
    use uuid::Uuid;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "test@proveo.pe".to_string(),
            name: "Test".to_string(),
            role,
        }
    }

    fn announcement(audience: AnnouncementAudience, target: Option<Uuid>) -> Announcement {
        Announcement {
            id: Uuid::new_v4(),
            title: "Cierre contable".to_string(),
            content: "Fechas límite de presentación".to_string(),
            kind: "aviso".to_string(),
            audience,
            target_supplier: target,
            is_urgent: false,
            scheduled_date: None,
            attachments: sqlx::types::Json(Vec::new()),
            created_by: Uuid::new_v4(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn audience_all_reaches_every_role() {
        let a = announcement(AnnouncementAudience::All, None);
        assert!(is_visible_to(&a, &user(Role::Proveedor)));
        assert!(is_visible_to(&a, &user(Role::Aprobador)));
        assert!(is_visible_to(&a, &user(Role::Operaciones)));
    }

    #[test]
    fn role_audience_excludes_other_roles() {
        let a = announcement(AnnouncementAudience::Proveedor, None);
        assert!(is_visible_to(&a, &user(Role::Proveedor)));
        assert!(!is_visible_to(&a, &user(Role::Aprobador)));
        assert!(!is_visible_to(&a, &user(Role::Operaciones)));
    }

    #[test]
    fn targeted_announcement_reaches_only_that_supplier() {
        let me = user(Role::Proveedor);
        let a = announcement(AnnouncementAudience::Proveedor, Some(me.id));
        assert!(is_visible_to(&a, &me));
        assert!(!is_visible_to(&a, &user(Role::Proveedor)));
    }

    #[test]
    fn inactive_announcements_are_hidden() {
        let mut a = announcement(AnnouncementAudience::All, None);
        a.is_active = false;
        assert!(!is_visible_to(&a, &user(Role::Operaciones)));
    }
}
