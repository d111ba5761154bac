//! Identity provider accounts and the user handle exposed to the dashboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Full account row from database. Holds password_hash, never serialize to API.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Opaque identity handle delivered with auth-state events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: Uuid,
    pub email: Option<String>,
}

impl From<&Account> for AuthUser {
    fn from(account: &Account) -> Self {
        Self {
            uid: account.id,
            email: Some(account.email.clone()),
        }
    }
}
