mod auth;
mod demo;
mod health_check;
mod users;

pub use auth::{login, refresh_token, revoke_tokens};
pub use demo::{bye, hello};
pub use health_check::health_check;
pub use users::{create_user, delete_user, list_users, update_user};

/// Outcome of a mutation that reports only success or failure
#[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
pub struct MutationResponse {
    pub success: bool,
}
