use actix_web::{web, HttpResponse};

use crate::auth::AccessClaims;

/// GET /hello
pub async fn hello() -> HttpResponse {
    HttpResponse::Ok().body("Hi")
}

/// GET /bye
///
/// **Requires a valid access token.** Claims are injected by `AuthMiddleware`.
pub async fn bye(claims: web::ReqData<AccessClaims>) -> HttpResponse {
    tracing::debug!(user_id = claims.user_id, "Authenticated demo query");
    HttpResponse::Ok().body(format!("your user id is: {}", claims.user_id))
}
