//! Reset the database to the sample user and employees.

use chrono::{TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use staffdesk::auth::password;
use staffdesk::db::{employees, users};
use staffdesk::models::NewEmployee;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| "Missing required environment variable: DATABASE_URL")?;

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let removed_users = users::delete_all(&pool).await?;
    let removed_employees = employees::delete_all(&pool).await?;
    tracing::info!(removed_users, removed_employees, "Cleared existing data");

    let hash = password::hash("password123")?;
    let user = users::create(&pool, "johndoe", "johndoe@example.com", &hash).await?;

    let samples = [
        NewEmployee {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: "jane.doe@example.com".to_string(),
            position: "Software Engineer".to_string(),
            salary: 90000.0,
            date_of_joining: Utc.with_ymd_and_hms(2023, 8, 1, 0, 0, 0).single().ok_or("invalid date")?,
            department: "Engineering".to_string(),
            profile_picture: String::new(),
        },
        NewEmployee {
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            email: "john.smith@example.com".to_string(),
            position: "Product Manager".to_string(),
            salary: 110000.0,
            date_of_joining: Utc.with_ymd_and_hms(2023, 7, 15, 0, 0, 0).single().ok_or("invalid date")?,
            department: "Product".to_string(),
            profile_picture: String::new(),
        },
    ];

    let mut employee_ids = Vec::with_capacity(samples.len());
    for sample in &samples {
        employee_ids.push(employees::create(&pool, sample).await?.id.to_string());
    }

    tracing::info!(user_id = %user.id, employee_ids = %employee_ids.join(", "), "Seed complete");

    pool.close().await;
    Ok(())
}
