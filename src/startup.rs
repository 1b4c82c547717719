use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::net::TcpListener;
use std::sync::Arc;

use crate::configuration::{DatabaseSettings, JwtSettings, PasswordSettings};
use crate::error::{AppError, DatabaseError};
use crate::logger::RequestLogger;
use crate::middleware::AuthMiddleware;
use crate::repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
use crate::routes::{
    bye, create_user, delete_user, health_check, hello, list_users, login, refresh_token,
    revoke_tokens, update_user,
};

/// Build the user store named by the database settings.
///
/// For Postgres this connects the pool and applies pending migrations.
pub async fn build_repository(
    config: &DatabaseSettings,
) -> Result<Arc<dyn UserRepository>, AppError> {
    if config.in_memory {
        tracing::warn!("Using in-memory user store; data is lost on shutdown");
        return Ok(Arc::new(InMemoryUserRepository::new()));
    }

    tracing::info!("Attempting to connect to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.connection_string())
        .await
        .map_err(|e| AppError::Database(DatabaseError::ConnectionPool(e.to_string())))?;
    tracing::info!("Database connection pool created successfully");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| AppError::Database(DatabaseError::UnexpectedError(e.to_string())))?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgUserRepository::new(pool)))
}

pub fn run(
    listener: TcpListener,
    repository: Arc<dyn UserRepository>,
    jwt_config: JwtSettings,
    password_config: PasswordSettings,
) -> Result<Server, std::io::Error> {
    let repository: web::Data<dyn UserRepository> = web::Data::from(repository);
    let jwt_config_data = web::Data::new(jwt_config.clone());
    let password_config = web::Data::new(password_config);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(RequestLogger)

            // Shared state
            .app_data(repository.clone())
            .app_data(jwt_config_data.clone())
            .app_data(password_config.clone())

            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/hello", web::get().to(hello))
            .route("/login", web::post().to(login))
            .route("/refresh_token", web::post().to(refresh_token))
            .route("/users", web::get().to(list_users))
            .route("/users", web::post().to(create_user))
            .route("/users/{id}", web::patch().to(update_user))
            .route("/users/{id}", web::delete().to(delete_user))

            // Protected routes (require a valid access token)
            .service(
                web::resource("/bye")
                    .wrap(AuthMiddleware::new(jwt_config.clone()))
                    .route(web::get().to(bye)),
            )
            .service(
                web::resource("/users/{id}/revoke_tokens")
                    .wrap(AuthMiddleware::new(jwt_config.clone()))
                    .route(web::post().to(revoke_tokens)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
