use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

use super::models::{NewUser, User, UserChanges, UserFilter};
use super::UserRepository;
use crate::error::{AppError, DatabaseError};

#[derive(Default)]
struct Table {
    next_id: i32,
    rows: BTreeMap<i32, User>,
}

/// Process-local user store with the same uniqueness rules as the `users` table
///
/// One lock covers the whole table so the email check and the write that
/// follows it are a single step.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: Mutex<Table>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_email() -> AppError {
    AppError::Database(DatabaseError::UniqueConstraintViolation(
        "Email already registered".to_string(),
    ))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut table = self.table.lock();
        if table.rows.values().any(|row| row.email == user.email) {
            return Err(duplicate_email());
        }

        table.next_id += 1;
        let row = User {
            id: table.next_id,
            firstname: user.firstname,
            lastname: user.lastname,
            email: user.email,
            password: user.password,
            phone: user.phone,
            token_version: 0,
        };
        table.rows.insert(row.id, row.clone());

        Ok(row)
    }

    async fn find_one(&self, filter: UserFilter) -> Result<Option<User>, AppError> {
        let table = self.table.lock();
        Ok(table.rows.values().find(|row| filter.matches(row)).cloned())
    }

    async fn update(&self, id: i32, changes: UserChanges) -> Result<u64, AppError> {
        if changes.is_empty() {
            return Ok(0);
        }

        let mut table = self.table.lock();
        if let Some(email) = &changes.email {
            if table.rows.values().any(|row| row.id != id && &row.email == email) {
                return Err(duplicate_email());
            }
        }

        match table.rows.get_mut(&id) {
            Some(row) => {
                changes.apply_to(row);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i32) -> Result<u64, AppError> {
        let mut table = self.table.lock();
        Ok(table.rows.remove(&id).map_or(0, |_| 1))
    }

    async fn find(&self) -> Result<Vec<User>, AppError> {
        let table = self.table.lock();
        Ok(table.rows.values().cloned().collect())
    }

    async fn increment_token_version(&self, id: i32) -> Result<u64, AppError> {
        let mut table = self.table.lock();
        match table.rows.get_mut(&id) {
            Some(row) => {
                row.token_version += 1;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}
