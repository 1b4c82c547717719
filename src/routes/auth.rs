/// Authentication Routes
///
/// Login, refresh-token rotation and refresh-token revocation.

use actix_web::{cookie::Cookie, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::audit::{AuditAction, AuditLog, AuditStatus};
use crate::auth::{
    create_access_token, create_refresh_token, verify_password, verify_refresh_token,
    AccessClaims, REFRESH_COOKIE_NAME,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ErrorContext};
use crate::repository::{User, UserFilter, UserRepository};
use crate::routes::MutationResponse;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response carrying a fresh access token
#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// The refresh cookie: http-only, no explicit expiry (session-scoped)
fn refresh_cookie(token: String) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE_NAME, token)
        .http_only(true)
        .path("/")
        .finish()
}

/// Issue both tokens for `user` and build the response setting `jid`
fn token_response(user: &User, jwt_config: &JwtSettings) -> Result<HttpResponse, AppError> {
    let access_token = create_access_token(user, jwt_config)?;
    let refresh_token = create_refresh_token(user, jwt_config)?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(refresh_token))
        .json(LoginResponse { access_token }))
}

/// POST /login
///
/// Check the password and issue tokens. The access token is returned in the
/// body; the refresh token is set as the `jid` cookie.
///
/// # Errors
/// - 404 "Could not find User": no user with this email
/// - 401 "Incorrect Password": password does not match
/// - 500: Internal server error
pub async fn login(
    form: web::Json<LoginRequest>,
    repo: web::Data<dyn UserRepository>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let LoginRequest { email, password } = form.into_inner();

    let user = repo
        .find_one(UserFilter::Email(email.trim().to_string()))
        .await?
        .ok_or_else(|| {
            AuditLog::new(AuditAction::Login, AuditStatus::Failure, "Unknown email")
                .with_request_id(context.request_id.as_str())
                .record();
            AuthError::UserNotFound
        })?;

    let stored_hash = user.password.clone();
    let valid = web::block(move || verify_password(&password, &stored_hash)).await?;
    if !valid {
        AuditLog::new(AuditAction::Login, AuditStatus::Failure, "Incorrect password")
            .with_resource_id(user.id)
            .with_request_id(context.request_id.as_str())
            .record();
        return Err(AuthError::IncorrectPassword.into());
    }

    let response = token_response(&user, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user.id,
        "User logged in successfully"
    );
    AuditLog::new(AuditAction::Login, AuditStatus::Success, "Tokens issued")
        .with_resource_id(user.id)
        .with_user_id(user.id)
        .with_request_id(context.request_id.as_str())
        .record();

    Ok(response)
}

/// POST /refresh_token
///
/// Exchange the `jid` cookie for a new access token and a rotated cookie.
/// The refresh token's `tokenVersion` must still match the stored user.
///
/// # Errors
/// - 401: Cookie missing, token invalid/expired, or token version revoked
/// - 404: The user no longer exists
pub async fn refresh_token(
    req: HttpRequest,
    repo: web::Data<dyn UserRepository>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let token = req
        .cookie(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AuthError::MissingToken)?;
    let claims = verify_refresh_token(&token, jwt_config.get_ref())?;

    let user = repo
        .find_one(UserFilter::Id(claims.user_id))
        .await?
        .ok_or(AuthError::UserNotFound)?;

    if user.token_version != claims.token_version {
        AuditLog::new(AuditAction::RefreshToken, AuditStatus::Failure, "Token version revoked")
            .with_resource_id(user.id)
            .with_request_id(context.request_id.as_str())
            .record();
        return Err(AuthError::TokenRevoked.into());
    }

    let response = token_response(&user, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = user.id,
        "Token refreshed successfully"
    );
    AuditLog::new(AuditAction::RefreshToken, AuditStatus::Success, "Tokens rotated")
        .with_resource_id(user.id)
        .with_user_id(user.id)
        .with_request_id(context.request_id.as_str())
        .record();

    Ok(response)
}

/// POST /users/{id}/revoke_tokens
///
/// **Requires a valid access token.** Bump the user's token version so every
/// refresh token issued so far stops working. Access tokens already issued
/// stay valid until they expire.
///
/// Responds `{"success": false}` when the id does not exist.
pub async fn revoke_tokens(
    path: web::Path<i32>,
    claims: web::ReqData<AccessClaims>,
    repo: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let context = ErrorContext::new("revoke_tokens").with_user_id(claims.user_id);

    let rows = repo.increment_token_version(id).await.map_err(|e| {
        context.log_error(&e);
        e
    })?;

    let status = if rows == 0 {
        AuditStatus::NoOp
    } else {
        AuditStatus::Success
    };
    AuditLog::new(AuditAction::RevokeTokens, status, "Refresh tokens revoked")
        .with_resource_id(id)
        .with_user_id(claims.user_id)
        .with_request_id(context.request_id.as_str())
        .record();

    Ok(HttpResponse::Ok().json(MutationResponse { success: rows > 0 }))
}
