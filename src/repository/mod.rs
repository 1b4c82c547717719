/// User Directory
///
/// Persistence contract for user records. Handlers receive a
/// `web::Data<dyn UserRepository>` and never touch SQL directly.

mod memory;
mod models;
mod postgres;

use async_trait::async_trait;

use crate::error::AppError;

pub use memory::InMemoryUserRepository;
pub use models::{NewUser, User, UserChanges, UserFilter, UserResponse};
pub use postgres::PgUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; a duplicate email is a `UniqueConstraintViolation`
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// At most one user matching the filter
    async fn find_one(&self, filter: UserFilter) -> Result<Option<User>, AppError>;

    /// Apply only the supplied fields; returns the number of rows changed
    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, AppError>;

    /// Returns the number of rows removed (0 when the id is unknown)
    async fn delete(&self, id: i32) -> Result<u64, AppError>;

    /// All users ordered by id
    async fn find(&self) -> Result<Vec<User>, AppError>;

    /// Bump the user's token version, invalidating outstanding refresh tokens
    async fn increment_token_version(&self, id: i32) -> Result<u64, AppError>;
}
