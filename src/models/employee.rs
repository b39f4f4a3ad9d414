use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub salary: f64,
    pub date_of_joining: DateTime<Utc>,
    pub department: String,
    pub profile_picture: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public representation returned by the employee routes.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeView {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub salary: f64,
    pub date_of_joining: DateTime<Utc>,
    pub department: String,
    pub profile_picture: String,
}

impl From<Employee> for EmployeeView {
    fn from(emp: Employee) -> Self {
        Self {
            employee_id: emp.id.to_string(),
            first_name: emp.first_name,
            last_name: emp.last_name,
            email: emp.email,
            position: emp.position,
            salary: emp.salary,
            date_of_joining: emp.date_of_joining,
            department: emp.department,
            profile_picture: emp.profile_picture,
        }
    }
}

/// Create payload, built only from validated fields.
#[derive(Debug, Clone)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub salary: f64,
    pub date_of_joining: DateTime<Utc>,
    pub department: String,
    pub profile_picture: String,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct EmployeePatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    pub date_of_joining: Option<DateTime<Utc>>,
    pub department: Option<String>,
    pub profile_picture: Option<String>,
}

impl EmployeePatch {
    /// Apply the supplied fields onto an existing record.
    pub fn apply(self, emp: &mut Employee) {
        if let Some(v) = self.first_name {
            emp.first_name = v;
        }
        if let Some(v) = self.last_name {
            emp.last_name = v;
        }
        if let Some(v) = self.email {
            emp.email = v;
        }
        if let Some(v) = self.position {
            emp.position = v;
        }
        if let Some(v) = self.salary {
            emp.salary = v;
        }
        if let Some(v) = self.date_of_joining {
            emp.date_of_joining = v;
        }
        if let Some(v) = self.department {
            emp.department = v;
        }
        if let Some(v) = self.profile_picture {
            emp.profile_picture = v;
        }
    }
}

/// Case-insensitive substring filters for the search route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    pub department: Option<String>,
    pub position: Option<String>,
}

impl EmployeeFilter {
    pub fn matches(&self, emp: &Employee) -> bool {
        contains_ci(&emp.department, self.department.as_deref())
            && contains_ci(&emp.position, self.position.as_deref())
    }
}

fn contains_ci(haystack: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        None | Some("") => true,
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
    }
}
