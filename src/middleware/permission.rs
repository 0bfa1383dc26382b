use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::AppError,
    models::{Role, User},
    utils::verify_token,
};

/// Identity resolved from the session cookie: the only thing the rest
/// of the portal ever consumes about the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

pub async fn get_current_user(cookies: Cookies, db: &Database) -> Option<CurrentUser> {
    let token = cookies.get("auth_token")?.value().to_string();

    // An invalid or expired token is simply an unauthenticated request
    let claims = verify_token(&token).ok()?;
    let user_id = Uuid::parse_str(&claims.sub).ok()?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await
        .ok()??;

    Some(CurrentUser::from(user))
}

pub async fn require_current_user(cookies: Cookies, db: &Database) -> Result<CurrentUser, AppError> {
    get_current_user(cookies, db).await.ok_or(AppError::Unauthorized)
}
