use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Employee, EmployeeFilter, EmployeePatch, NewEmployee};

pub async fn create(pool: &PgPool, emp: &NewEmployee) -> Result<Employee, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "INSERT INTO employees
            (id, first_name, last_name, email, position, salary, date_of_joining, department, profile_picture)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&emp.first_name)
    .bind(&emp.last_name)
    .bind(&emp.email)
    .bind(&emp.position)
    .bind(emp.salary)
    .bind(emp.date_of_joining)
    .bind(&emp.department)
    .bind(&emp.profile_picture)
    .fetch_one(pool)
    .await
}

/// Unset filters match everything; set ones are case-insensitive substrings.
pub async fn list(pool: &PgPool, filter: &EmployeeFilter) -> Result<Vec<Employee>, sqlx::Error> {
    let department = like_pattern(filter.department.as_deref());
    let position = like_pattern(filter.position.as_deref());

    sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees
         WHERE ($1::text IS NULL OR department ILIKE $1)
           AND ($2::text IS NULL OR position ILIKE $2)
         ORDER BY created_at ASC",
    )
    .bind(department)
    .bind(position)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: &EmployeePatch,
) -> Result<Option<Employee>, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        "UPDATE employees SET
            first_name = COALESCE($2, first_name),
            last_name = COALESCE($3, last_name),
            email = COALESCE($4, email),
            position = COALESCE($5, position),
            salary = COALESCE($6, salary),
            date_of_joining = COALESCE($7, date_of_joining),
            department = COALESCE($8, department),
            profile_picture = COALESCE($9, profile_picture),
            updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(patch.first_name.as_deref())
    .bind(patch.last_name.as_deref())
    .bind(patch.email.as_deref())
    .bind(patch.position.as_deref())
    .bind(patch.salary)
    .bind(patch.date_of_joining)
    .bind(patch.department.as_deref())
    .bind(patch.profile_picture.as_deref())
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM employees WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM employees").execute(pool).await?;
    Ok(result.rows_affected())
}

fn like_pattern(needle: Option<&str>) -> Option<String> {
    let needle = needle.map(str::trim).filter(|s| !s.is_empty())?;
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}
