use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{NewUser, User, UserChanges, UserFilter};
use super::UserRepository;
use crate::error::AppError;

const USER_COLUMNS: &str = "id, firstname, lastname, email, password, phone, token_version";

/// `users` table access through a shared sqlx pool
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let query = format!(
            r#"
            INSERT INTO users (firstname, lastname, email, password, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let created = sqlx::query_as::<_, User>(&query)
            .bind(&user.firstname)
            .bind(&user.lastname)
            .bind(&user.email)
            .bind(&user.password)
            .bind(&user.phone)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_one(&self, filter: UserFilter) -> Result<Option<User>, AppError> {
        let user = match filter {
            UserFilter::Id(id) => {
                let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
                sqlx::query_as::<_, User>(&query)
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            UserFilter::Email(email) => {
                let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
                sqlx::query_as::<_, User>(&query)
                    .bind(email)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        Ok(user)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, AppError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            UPDATE users SET
                firstname = COALESCE($2, firstname),
                lastname = COALESCE($3, lastname),
                email = COALESCE($4, email),
                password = COALESCE($5, password),
                phone = COALESCE($6, phone)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(changes.firstname)
        .bind(changes.lastname)
        .bind(changes.email)
        .bind(changes.password)
        .bind(changes.phone)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn find(&self) -> Result<Vec<User>, AppError> {
        let query = format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn increment_token_version(&self, id: i32) -> Result<u64, AppError> {
        let result = sqlx::query("UPDATE users SET token_version = token_version + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
