use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

use super::user::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "announcement_audience", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementAudience {
    All,
    Proveedor,
    Aprobador,
    Operaciones,
}

impl AnnouncementAudience {
    pub fn matches(&self, role: Role) -> bool {
        match self {
            AnnouncementAudience::All => true,
            AnnouncementAudience::Proveedor => role == Role::Proveedor,
            AnnouncementAudience::Aprobador => role == Role::Aprobador,
            AnnouncementAudience::Operaciones => role == Role::Operaciones,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub kind: String,
    pub audience: AnnouncementAudience,
    pub target_supplier: Option<Uuid>,
    pub is_urgent: bool,
    pub scheduled_date: Option<NaiveDate>,
    pub attachments: sqlx::types::Json<Vec<String>>,
    pub created_by: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnnouncement {
    pub title: String,
    pub content: String,
    pub kind: String,
    pub audience: AnnouncementAudience,
    pub target_supplier: Option<Uuid>,
    #[serde(default)]
    pub is_urgent: bool,
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyDocument {
    pub id: Uuid,
    pub title: String,
    pub file_name: String,
    pub url: String,
    pub uploaded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCompanyDocument {
    pub title: String,
    pub file_name: String,
    pub url: String,
}

/// Insert-only satisfaction survey; only aggregated for operaciones.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FeedbackSurvey {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub rating: i32,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFeedback {
    pub rating: i32,
    pub comments: Option<String>,
}

#[derive(Debug, Serialize, FromRow)]
pub struct FeedbackSummary {
    pub responses: i64,
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}
