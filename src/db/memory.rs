use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{Store, StoreError};
use crate::models::{Employee, EmployeeFilter, EmployeePatch, NewEmployee, NewUser, User, UserLookup};

/// In-process store with the same unique constraints as the Postgres schema.
/// Records are kept in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    employees: Vec<Employee>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn violation(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: Some(constraint.to_string()),
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == user.username) {
            return Err(violation("users_username_key"));
        }
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(violation("users_email_key"));
        }

        let now = Utc::now();
        let record = User {
            id: Uuid::now_v7(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        inner.users.push(record.clone());
        Ok(record)
    }

    async fn find_user_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|u| u.email == email || u.username == username)
            .cloned())
    }

    async fn find_user(&self, lookup: &UserLookup) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        let found = inner.users.iter().find(|u| match lookup {
            UserLookup::Email(email) => &u.email == email,
            UserLookup::Username(username) => &u.username == username,
        });
        Ok(found.cloned())
    }

    async fn insert_employee(&self, employee: NewEmployee) -> Result<Employee, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.employees.iter().any(|e| e.email == employee.email) {
            return Err(violation("employees_email_key"));
        }

        let now = Utc::now();
        let record = Employee {
            id: Uuid::now_v7(),
            first_name: employee.first_name,
            last_name: employee.last_name,
            email: employee.email,
            position: employee.position,
            salary: employee.salary,
            date_of_joining: employee.date_of_joining,
            department: employee.department,
            profile_picture: employee.profile_picture,
            created_at: now,
            updated_at: now,
        };
        inner.employees.push(record.clone());
        Ok(record)
    }

    async fn list_employees(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .employees
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }

    async fn find_employee(&self, id: Uuid) -> Result<Option<Employee>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn update_employee(
        &self,
        id: Uuid,
        patch: EmployeePatch,
    ) -> Result<Option<Employee>, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(email) = patch.email.as_deref() {
            if inner.employees.iter().any(|e| e.id != id && e.email == email) {
                return Err(violation("employees_email_key"));
            }
        }

        let Some(record) = inner.employees.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        patch.apply(record);
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_employee(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.employees.len();
        inner.employees.retain(|e| e.id != id);
        Ok(inner.employees.len() < before)
    }
}
