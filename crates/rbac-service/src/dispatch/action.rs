//! The structured action a language model returns for operator text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rbac_core::error::AppError;
use rbac_core::result::AppResult;

/// What the operator asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Create a permission from `{name, description?}`.
    CreatePermission,
    /// Create a role from `{name, description?}`.
    CreateRole,
    /// Link `{role_name, permission_name}`.
    AssignPermission,
    /// Unlink `{role_name, permission_name}`.
    RemovePermission,
    /// Answer only; nothing to execute.
    Info,
    /// The model could not map the request.
    Error,
}

impl ActionKind {
    /// Return the action as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreatePermission => "create_permission",
            Self::CreateRole => "create_role",
            Self::AssignPermission => "assign_permission",
            Self::RemovePermission => "remove_permission",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `{ action, data?, message }` as agreed with the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantAction {
    /// The requested operation.
    pub action: ActionKind,
    /// Operation-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Human-readable explanation from the model.
    #[serde(default)]
    pub message: String,
}

/// Payload of `create_permission` and `create_role`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatePayload {
    /// Name of the new record.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload of `assign_permission` and `remove_permission`. Carries names,
/// which are resolved against the mirror before any store call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkPayload {
    /// Role name, matched case-insensitively.
    pub role_name: String,
    /// Permission name, matched case-insensitively.
    pub permission_name: String,
}

impl AssistantAction {
    /// Parse model output. Surrounding prose and Markdown code fences are
    /// tolerated; the first `{` through the last `}` must be the action.
    pub fn parse(text: &str) -> AppResult<Self> {
        let start = text.find('{');
        let end = text.rfind('}');
        let json = match (start, end) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => {
                return Err(AppError::external_service(
                    "Assistant reply did not contain a JSON action",
                ));
            }
        };
        serde_json::from_str(json).map_err(|e| {
            AppError::with_source(
                rbac_core::ErrorKind::ExternalService,
                format!("Assistant reply was not a valid action: {e}"),
                e,
            )
        })
    }

    fn payload<T: serde::de::DeserializeOwned>(&self) -> AppResult<T> {
        let data = self.data.clone().ok_or_else(|| {
            AppError::validation(format!("Action '{}' is missing its data", self.action))
        })?;
        serde_json::from_value(data).map_err(|e| {
            AppError::validation(format!("Action '{}' has malformed data: {e}", self.action))
        })
    }

    /// Decode the payload of a create action.
    pub fn create_payload(&self) -> AppResult<CreatePayload> {
        self.payload()
    }

    /// Decode the payload of an assign/remove action.
    pub fn link_payload(&self) -> AppResult<LinkPayload> {
        self.payload()
    }
}
