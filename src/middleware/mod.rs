/// Middleware module
///
/// Request pipeline pre-checks for protected routes.

mod auth_middleware;

pub use auth_middleware::bearer_token;
pub use auth_middleware::AuthMiddleware;
