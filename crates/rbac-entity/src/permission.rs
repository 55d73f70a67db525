//! Permission record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use rbac_core::types::PermissionId;

use crate::Named;

/// An atomic named capability that can be granted to roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Permission {
    /// Store-assigned identifier.
    pub id: PermissionId,
    /// Label such as `can_view_reports`.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// When the row was inserted.
    pub created_at: DateTime<Utc>,
}

impl Named for Permission {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}
