//! Role record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rbac_core::types::RoleId;

use crate::Named;

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Role {
    /// Store-assigned identifier.
    pub id: RoleId,
    /// Display name such as `Marketing Manager`.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
}

impl Named for Role {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
