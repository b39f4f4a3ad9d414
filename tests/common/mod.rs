#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

use staffdesk::config::{AuthMode, Config};
use staffdesk::db::{MemoryStore, PgStore, Store, StoreError};
use staffdesk::models::{
    Employee, EmployeeFilter, EmployeePatch, NewEmployee, NewUser, User, UserLookup,
};

/// A running test server. `db` is set when it runs over a dedicated Postgres
/// database instead of the in-memory store.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub upload_dir: TempDir,
    pub db: Option<TestDb>,
}

pub struct TestDb {
    pub pool: PgPool,
    pub name: String,
}

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn signup(&self, username: &str, email: &str, password: &str) -> (Value, StatusCode) {
        self.post_json(
            "/api/v1/user/signup",
            &json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, body: &Value) -> (Value, StatusCode) {
        self.post_json("/api/v1/user/login", body).await
    }

    /// Create an employee from JSON and return its id.
    pub async fn create_employee(&self, body: &Value) -> String {
        let (resp, status) = self.post_json("/api/v1/emp/employees", body).await;
        assert_eq!(status, StatusCode::CREATED, "create employee failed: {resp}");
        resp["employee_id"].as_str().unwrap().to_string()
    }

    pub async fn get(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Returns the raw body text so empty 204 responses can be checked.
    pub async fn delete(&self, path: &str) -> (String, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        (resp.text().await.unwrap_or_default(), status)
    }
}

pub fn test_config(upload_dir: &TempDir) -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        jwt_secret: Some(JWT_SECRET.to_string()),
        jwt_ttl: Duration::hours(1),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        upload_dir: upload_dir.path().to_path_buf(),
        max_body_size: 1_048_576,
        cors_origins: vec![],
        auth_mode: AuthMode::Optional,
        log_level: "warn".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn a test app, letting the caller adjust the config first.
pub async fn spawn_app_with(adjust: impl FnOnce(&mut Config)) -> TestApp {
    spawn_app_with_store(Arc::new(MemoryStore::new()), adjust).await
}

pub async fn spawn_app_with_store(
    store: Arc<dyn Store>,
    adjust: impl FnOnce(&mut Config),
) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let mut config = test_config(&upload_dir);
    adjust(&mut config);

    let app = staffdesk::build_app(store, config);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        upload_dir,
        db: None,
    }
}

fn database_url_for(base_url: &str, db_name: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app over a fresh temporary Postgres database. Returns `None`
/// when `DATABASE_URL` is not set, so these tests are skipped without one.
pub async fn spawn_pg_app() -> Option<TestApp> {
    let _ = dotenvy::dotenv();
    let base_url = std::env::var("DATABASE_URL").ok()?;

    let db_name = format!("staffdesk_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url_for(&base_url, "postgres"))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url_for(&base_url, &db_name))
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let mut app = spawn_app_with_store(Arc::new(PgStore::new(pool.clone())), |_| {}).await;
    app.db = Some(TestDb { pool, name: db_name });
    Some(app)
}

/// Drop the test database, if the app had one.
pub async fn cleanup(app: TestApp) {
    let Some(db) = app.db else {
        return;
    };
    db.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url_for(&base_url, "postgres"))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", db.name))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}

/// A store whose every call fails as if the database were unreachable.
pub struct FailingStore;

fn unavailable<T>() -> Result<T, StoreError> {
    Err(StoreError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl Store for FailingStore {
    async fn insert_user(&self, _user: NewUser) -> Result<User, StoreError> {
        unavailable()
    }

    async fn find_user_by_email_or_username(
        &self,
        _email: &str,
        _username: &str,
    ) -> Result<Option<User>, StoreError> {
        unavailable()
    }

    async fn find_user(&self, _lookup: &UserLookup) -> Result<Option<User>, StoreError> {
        unavailable()
    }

    async fn insert_employee(&self, _employee: NewEmployee) -> Result<Employee, StoreError> {
        unavailable()
    }

    async fn list_employees(&self, _filter: &EmployeeFilter) -> Result<Vec<Employee>, StoreError> {
        unavailable()
    }

    async fn find_employee(&self, _id: Uuid) -> Result<Option<Employee>, StoreError> {
        unavailable()
    }

    async fn update_employee(
        &self,
        _id: Uuid,
        _patch: EmployeePatch,
    ) -> Result<Option<Employee>, StoreError> {
        unavailable()
    }

    async fn delete_employee(&self, _id: Uuid) -> Result<bool, StoreError> {
        unavailable()
    }
}

pub fn employee_body(email: &str) -> Value {
    json!({
        "first_name": "Jane",
        "last_name": "Doe",
        "email": email,
        "position": "Software Engineer",
        "salary": 90000,
        "date_of_joining": "2023-08-01T00:00:00.000Z",
        "department": "Engineering",
    })
}

/// Field names cited by a validation error response.
pub fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errs| {
            errs.iter()
                .filter_map(|e| e["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
