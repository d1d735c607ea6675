use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Free,
    Premium,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Premium => "premium",
        }
    }

    /// Only paying families get weekly proposals.
    pub fn includes_proposals(&self) -> bool {
        matches!(self, Plan::Premium)
    }
}

impl FromStr for Plan {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "premium" => Ok(Plan::Premium),
            other => Err(AppError::Validation(format!("Unknown plan '{}'", other))),
        }
    }
}

impl TryFrom<String> for Plan {
    type Error = AppError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

/// The two fixed custody slots of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentRole {
    ParentA,
    ParentB,
}

impl ParentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentRole::ParentA => "parent_a",
            ParentRole::ParentB => "parent_b",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParentRole::ParentA => "Parent A",
            ParentRole::ParentB => "Parent B",
        }
    }
}

impl fmt::Display for ParentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParentRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent_a" => Ok(ParentRole::ParentA),
            "parent_b" => Ok(ParentRole::ParentB),
            other => Err(AppError::Validation(format!("Unknown parent role '{}'", other))),
        }
    }
}

impl TryFrom<String> for ParentRole {
    type Error = AppError;
    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Family {
    pub id: String,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub plan: Plan,
    pub active: bool,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    /// Ordered by join position: index 0 is the family's first member.
    #[sqlx(skip)]
    pub member_ids: Vec<String>,
}

impl Family {
    pub fn new(name: String, plan: Plan) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            plan,
            active: true,
            timezone: "UTC".to_string(),
            created_at: Utc::now(),
            member_ids: Vec::new(),
        }
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.member_ids.iter().any(|id| id == user_id)
    }

    pub fn members_except(&self, user_id: &str) -> Vec<String> {
        self.member_ids.iter().filter(|id| *id != user_id).cloned().collect()
    }
}

/// Role slots as resolved from member profiles. Either slot may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParentRoles {
    pub parent_a: Option<String>,
    pub parent_b: Option<String>,
}

/// Both slots filled with distinct members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentPair {
    pub parent_a: String,
    pub parent_b: String,
}

impl ParentRoles {
    /// Walks `member_ids` in family order and fills each slot with the first
    /// member whose profile claims it. Profiles of non-members are ignored.
    pub fn resolve(member_ids: &[String], profiles: &[(String, Option<ParentRole>)]) -> Self {
        let mut roles = ParentRoles::default();
        for member_id in member_ids {
            let role = profiles
                .iter()
                .find(|(id, _)| id == member_id)
                .and_then(|(_, role)| *role);

            match role {
                Some(ParentRole::ParentA) if roles.parent_a.is_none() => roles.parent_a = Some(member_id.clone()),
                Some(ParentRole::ParentB) if roles.parent_b.is_none() => roles.parent_b = Some(member_id.clone()),
                _ => {}
            }
        }
        roles
    }

    pub fn pair(&self) -> Option<ParentPair> {
        match (&self.parent_a, &self.parent_b) {
            (Some(a), Some(b)) if a != b => Some(ParentPair { parent_a: a.clone(), parent_b: b.clone() }),
            _ => None,
        }
    }

    pub fn role_of(&self, user_id: &str) -> Option<ParentRole> {
        if self.parent_a.as_deref() == Some(user_id) {
            Some(ParentRole::ParentA)
        } else if self.parent_b.as_deref() == Some(user_id) {
            Some(ParentRole::ParentB)
        } else {
            None
        }
    }
}
