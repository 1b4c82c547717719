/// Audit trail for account operations
///
/// Every create/update/delete/login/revoke outcome is emitted as one
/// structured `tracing` event. Entries never carry passwords or tokens.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::Serializer;

    pub fn serialize<S>(dt: &DateTime<Utc>, ser: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        ser.serialize_str(&dt.to_rfc3339())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    CreateUser,
    UpdateUser,
    DeleteUser,
    Login,
    RefreshToken,
    RevokeTokens,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CreateUser => "CREATE_USER",
            AuditAction::UpdateUser => "UPDATE_USER",
            AuditAction::DeleteUser => "DELETE_USER",
            AuditAction::Login => "LOGIN",
            AuditAction::RefreshToken => "REFRESH_TOKEN",
            AuditAction::RevokeTokens => "REVOKE_TOKENS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Success,
    /// The call completed but matched no record
    NoOp,
    Failure,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditStatus::Success => "SUCCESS",
            AuditStatus::NoOp => "NO_OP",
            AuditStatus::Failure => "FAILURE",
        }
    }
}

/// One audit log entry
#[derive(Debug, Clone, Serialize)]
pub struct AuditLog {
    pub log_id: String,
    #[serde(with = "datetime_format")]
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub status: AuditStatus,
    pub message: String,
    /// Id of the user record acted upon
    pub resource_id: Option<String>,
    /// Id of the authenticated caller, when there is one
    pub user_id: Option<String>,
    pub request_id: Option<String>,
}

impl AuditLog {
    pub fn new(action: AuditAction, status: AuditStatus, message: impl Into<String>) -> Self {
        Self {
            log_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            status,
            message: message.into(),
            resource_id: None,
            user_id: None,
            request_id: None,
        }
    }

    pub fn with_resource_id(mut self, id: impl ToString) -> Self {
        self.resource_id = Some(id.to_string());
        self
    }

    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Emit the entry; failures are logged at `warn`
    pub fn record(&self) {
        if self.status == AuditStatus::Failure {
            tracing::warn!(
                log_id = %self.log_id,
                action = self.action.as_str(),
                status = self.status.as_str(),
                resource_id = ?self.resource_id,
                user_id = ?self.user_id,
                request_id = ?self.request_id,
                message = %self.message,
                "Audit log entry"
            );
        } else {
            tracing::info!(
                log_id = %self.log_id,
                action = self.action.as_str(),
                status = self.status.as_str(),
                resource_id = ?self.resource_id,
                user_id = ?self.user_id,
                request_id = ?self.request_id,
                message = %self.message,
                "Audit log entry"
            );
        }
    }
}
