/// User Directory Routes
///
/// Create, update, delete and list user accounts.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::audit::{AuditAction, AuditLog, AuditStatus};
use crate::auth::hash_password;
use crate::configuration::PasswordSettings;
use crate::error::{AppError, ErrorContext};
use crate::repository::{NewUser, User, UserChanges, UserRepository, UserResponse};
use crate::routes::MutationResponse;
use crate::validators::{is_valid_email, is_valid_name, is_valid_password, is_valid_phone};

/// Create-user input; every field is required
#[derive(Deserialize)]
pub struct UserInput {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Update-user input; only supplied fields change
#[derive(Deserialize, Default)]
pub struct UserUpdateInput {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
}

/// POST /users
///
/// Create a user. The password is bcrypt-hashed before it reaches the store.
///
/// Always answers 200; clients read the outcome from `{"success": bool}`.
/// Validation failures, a duplicate email and store errors all give
/// `{"success": false}` and the reason is only logged server-side. A body
/// missing required fields is rejected with 400 before this handler runs.
pub async fn create_user(
    input: web::Json<UserInput>,
    repo: web::Data<dyn UserRepository>,
    password_config: web::Data<PasswordSettings>,
) -> HttpResponse {
    let context = ErrorContext::new("create_user");

    match insert_user(input.into_inner(), repo.get_ref(), password_config.hash_cost).await {
        Ok(user) => {
            tracing::info!(
                request_id = %context.request_id,
                user_id = user.id,
                "User created successfully"
            );
            AuditLog::new(AuditAction::CreateUser, AuditStatus::Success, "User created")
                .with_resource_id(user.id)
                .with_request_id(context.request_id.as_str())
                .record();

            HttpResponse::Ok().json(MutationResponse { success: true })
        }
        Err(e) => {
            context.log_error(&e);
            AuditLog::new(AuditAction::CreateUser, AuditStatus::Failure, e.to_string())
                .with_request_id(context.request_id.as_str())
                .record();

            HttpResponse::Ok().json(MutationResponse { success: false })
        }
    }
}

async fn insert_user(
    input: UserInput,
    repo: &dyn UserRepository,
    hash_cost: u32,
) -> Result<User, AppError> {
    let firstname = is_valid_name("firstname", &input.firstname)?;
    let lastname = is_valid_name("lastname", &input.lastname)?;
    let email = is_valid_email(&input.email)?;
    let phone = is_valid_phone(&input.phone)?;
    is_valid_password(&input.password)?;

    let password = input.password;
    let password_hash = web::block(move || hash_password(&password, hash_cost)).await??;

    repo.insert(NewUser {
        firstname,
        lastname,
        email,
        password: password_hash,
        phone,
    })
    .await
}

/// PATCH /users/{id}
///
/// Partially update a user. A supplied password is re-hashed.
///
/// Responds `{"success": true}` whenever the call completes, including for
/// an id that does not exist.
///
/// # Errors
/// - 400: A supplied field fails validation
/// - 409: The new email belongs to another user
/// - 500: Internal server error
pub async fn update_user(
    path: web::Path<i32>,
    input: web::Json<UserUpdateInput>,
    repo: web::Data<dyn UserRepository>,
    password_config: web::Data<PasswordSettings>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let context = ErrorContext::new("update_user");

    let changes = build_changes(input.into_inner(), password_config.hash_cost).await?;
    let rows = repo.update(id, changes).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    let (status, message) = if rows == 0 {
        tracing::info!(request_id = %context.request_id, user_id = id, "Update matched no user");
        (AuditStatus::NoOp, "No matching user or no fields supplied")
    } else {
        tracing::info!(request_id = %context.request_id, user_id = id, "User updated");
        (AuditStatus::Success, "User updated")
    };
    AuditLog::new(AuditAction::UpdateUser, status, message)
        .with_resource_id(id)
        .with_request_id(context.request_id.as_str())
        .record();

    Ok(HttpResponse::Ok().json(MutationResponse { success: true }))
}

async fn build_changes(input: UserUpdateInput, hash_cost: u32) -> Result<UserChanges, AppError> {
    let password = match input.password {
        Some(password) => {
            is_valid_password(&password)?;
            Some(web::block(move || hash_password(&password, hash_cost)).await??)
        }
        None => None,
    };

    Ok(UserChanges {
        firstname: input
            .firstname
            .map(|v| is_valid_name("firstname", &v))
            .transpose()?,
        lastname: input
            .lastname
            .map(|v| is_valid_name("lastname", &v))
            .transpose()?,
        email: input.email.map(|v| is_valid_email(&v)).transpose()?,
        password,
        phone: input.phone.map(|v| is_valid_phone(&v)).transpose()?,
    })
}

/// DELETE /users/{id}
///
/// Remove a user. Deleting an unknown id is a no-op that still succeeds.
pub async fn delete_user(
    path: web::Path<i32>,
    repo: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let context = ErrorContext::new("delete_user");

    let rows = repo.delete(id).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    let (status, message) = if rows == 0 {
        tracing::info!(request_id = %context.request_id, user_id = id, "Delete matched no user");
        (AuditStatus::NoOp, "No matching user")
    } else {
        tracing::info!(request_id = %context.request_id, user_id = id, "User deleted");
        (AuditStatus::Success, "User deleted")
    };
    AuditLog::new(AuditAction::DeleteUser, status, message)
        .with_resource_id(id)
        .with_request_id(context.request_id.as_str())
        .record();

    Ok(HttpResponse::Ok().json(MutationResponse { success: true }))
}

/// GET /users
///
/// List every user. Password hashes are not part of the response.
pub async fn list_users(repo: web::Data<dyn UserRepository>) -> Result<HttpResponse, AppError> {
    let users: Vec<UserResponse> = repo
        .find()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}
