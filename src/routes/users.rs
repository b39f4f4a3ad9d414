use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::auth::{jwt, password};
use crate::db::StoreError;
use crate::error::AppError;
use crate::models::NewUser;
use crate::payload::parser;
use crate::state::SharedState;
use crate::validation::rules;

/// Shared by the unknown-user and wrong-password cases.
pub const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub jwt_token: String,
}

pub async fn signup(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let payload = parser::parse(&headers, body).await.map_err(AppError::BadRequest)?;
    let req = rules::signup(&payload.fields).map_err(AppError::Validation)?;

    // Better message up front; the unique indexes still decide races below.
    if state
        .store
        .find_user_by_email_or_username(&req.email, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let plaintext = req.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash(&plaintext))
        .await
        .map_err(|e| AppError::Internal(format!("Hashing task failed: {e}")))?
        .map_err(AppError::Internal)?;

    let user = state
        .store
        .insert_user(NewUser {
            username: req.username,
            email: req.email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation { .. } => AppError::Conflict("User already exists".to_string()),
            other => AppError::Store(other),
        })?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully.".to_string(),
            user_id: user.id.to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<LoginResponse>, AppError> {
    let payload = parser::parse(&headers, body).await.map_err(AppError::BadRequest)?;
    let req = rules::login(&payload.fields).map_err(AppError::Validation)?;

    let user = state
        .store
        .find_user(&req.lookup)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    let plaintext = req.password;
    let stored = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || password::verify(&plaintext, &stored))
        .await
        .map_err(|e| AppError::Internal(format!("Verification task failed: {e}")))?;

    if !valid {
        tracing::info!(user_id = %user.id, "Login rejected");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let jwt_token = jwt::issue(&user, state.config.jwt_secret.as_deref(), state.config.jwt_ttl)
        .map_err(AppError::Internal)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful.".to_string(),
        jwt_token,
    }))
}
