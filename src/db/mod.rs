pub mod employees;
pub mod memory;
pub mod users;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Employee, EmployeeFilter, EmployeePatch, NewEmployee, NewUser, User, UserLookup};

pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated ({})", .constraint.as_deref().unwrap_or("unknown"))]
    UniqueViolation { constraint: Option<String> },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Lift a driver error, recognising unique-index violations.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation {
                    constraint: db_err.constraint().map(str::to_string),
                }
            }
            other => StoreError::Database(other),
        }
    }
}

/// Persistence operations for the two collections. Each call is atomic on its
/// own; uniqueness of user username/email and employee email is enforced here,
/// not by callers.
#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// First user whose email or username matches either value.
    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>, StoreError>;

    async fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError>;

    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError>;

    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError>;

    /// Returns `None` when no employee has this id.
    async fn update_employee(
        &self,
        id: Uuid,
        patch: EmployeePatch,
    ) -> Result<Option<Employee>, StoreError>;

    /// Returns `false` when no employee has this id.
    async fn delete_employee(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        users::create(&self.pool, &user.username, &user.email, &user.password_hash)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(users::find_by_email_or_username(&self.pool, email, username).await?)
    }

    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>, StoreError> {
        let user = match lookup {
            UserLookup::Email(email) => users::find_by_email(&self.pool, email).await?,
            UserLookup::Username(username) => users::find_by_username(&self.pool, username).await?,
        };
        Ok(user)
    }

    async fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        employees::create(&self.pool, &employee)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError> {
        Ok(employees::list(&self.pool, filter).await?)
    }

    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        Ok(employees::find_by_id(&self.pool, id).await?)
    }

    async fn update_employee(
        &self,
        id: Uuid,
        patch: EmployeePatch,
    ) -> Result<Option<Employee>, StoreError> {
        employees::update(&self.pool, id, &patch)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_employee(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(employees::delete(&self.pool, id).await?)
    }
}
