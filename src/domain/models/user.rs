use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::domain::models::family::ParentRole;

/// Profile of an account. Accounts themselves live with the identity
/// provider; this is the slice the scheduler reads.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub parent_role: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(display_name: String, parent_role: Option<ParentRole>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            display_name,
            email: None,
            parent_role: parent_role.map(|r| r.as_str().to_string()),
            created_at: Utc::now(),
        }
    }

    /// Unknown values are treated as no role at all.
    pub fn role(&self) -> Option<ParentRole> {
        self.parent_role.as_deref().and_then(|r| r.parse().ok())
    }
}
