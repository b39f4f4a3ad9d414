use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;

use crate::auth::Identity;
use crate::db::StoreError;
use crate::error::AppError;
use crate::models::{EmployeeFilter, EmployeeView};
use crate::payload::{parser, upload, Payload};
use crate::state::SharedState;
use crate::validation::rules;

const EMAIL_TAKEN: &str = "Employee email already exists";
const NOT_FOUND: &str = "Employee not found";

#[derive(Serialize)]
pub struct CreatedResponse {
    pub message: String,
    pub employee_id: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub status: bool,
    pub count: usize,
    pub data: Vec<EmployeeView>,
}

fn conflict_on_duplicate(err: StoreError) -> AppError {
    match err {
        StoreError::UniqueViolation { .. } => AppError::Conflict(EMAIL_TAKEN.to_string()),
        other => AppError::Store(other),
    }
}

fn actor(identity: &Identity) -> &str {
    identity.claims().map_or("anonymous", |c| c.username.as_str())
}

async fn parse_payload(headers: &HeaderMap, body: Bytes) -> Result<Payload, AppError> {
    parser::parse(headers, body).await.map_err(AppError::BadRequest)
}

pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<EmployeeView>>, AppError> {
    let employees = state.store.list_employees(&EmployeeFilter::default()).await?;
    Ok(Json(employees.into_iter().map(EmployeeView::from).collect()))
}

pub async fn search(
    State(state): State<SharedState>,
    query: Result<Query<EmployeeFilter>, QueryRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let Query(filter) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let data: Vec<EmployeeView> = state
        .store
        .list_employees(&filter)
        .await?
        .into_iter()
        .map(EmployeeView::from)
        .collect();

    Ok(Json(SearchResponse {
        status: true,
        count: data.len(),
        data,
    }))
}

pub async fn create(
    identity: Identity,
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let payload = parse_payload(&headers, body).await?;
    let mut req = rules::create_employee(&payload.fields).map_err(AppError::Validation)?;

    let stored_upload = match &payload.upload {
        Some(file) => Some(
            upload::store(&state.config.upload_dir, file)
                .await
                .map_err(AppError::Internal)?,
        ),
        None => None,
    };
    if let Some(reference) = &stored_upload {
        req.profile_picture = reference.clone();
    }

    let employee = match state.store.insert_employee(req).await {
        Ok(employee) => employee,
        Err(e) => {
            if let Some(reference) = &stored_upload {
                upload::discard(&state.config.upload_dir, reference).await;
            }
            return Err(conflict_on_duplicate(e));
        }
    };

    tracing::info!(employee_id = %employee.id, actor = actor(&identity), "Employee created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Employee created successfully.".to_string(),
            employee_id: employee.id.to_string(),
        }),
    ))
}

pub async fn get(
    State(state): State<SharedState>,
    Path(eid): Path<String>,
) -> Result<Json<EmployeeView>, AppError> {
    let id = rules::employee_id_param(&eid).map_err(AppError::Validation)?;
    let employee = state
        .store
        .find_employee(id)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))?;
    Ok(Json(employee.into()))
}

/// Applies only the supplied fields. Responds with a confirmation, not the record.
pub async fn update(
    identity: Identity,
    State(state): State<SharedState>,
    Path(eid): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let payload = parse_payload(&headers, body).await?;
    let (id, mut patch) =
        rules::update_employee(&eid, &payload.fields).map_err(AppError::Validation)?;

    let stored_upload = match &payload.upload {
        Some(file) => Some(
            upload::store(&state.config.upload_dir, file)
                .await
                .map_err(AppError::Internal)?,
        ),
        None => None,
    };
    if let Some(reference) = &stored_upload {
        patch.profile_picture = Some(reference.clone());
    }

    let outcome = match state.store.update_employee(id, patch).await {
        Ok(Some(employee)) => Ok(employee),
        Ok(None) => Err(AppError::NotFound(NOT_FOUND.to_string())),
        Err(e) => Err(conflict_on_duplicate(e)),
    };
    let updated = match outcome {
        Ok(employee) => employee,
        Err(err) => {
            if let Some(reference) = &stored_upload {
                upload::discard(&state.config.upload_dir, reference).await;
            }
            return Err(err);
        }
    };

    tracing::info!(employee_id = %updated.id, actor = actor(&identity), "Employee updated");

    Ok(Json(MessageResponse {
        message: "Employee details updated successfully.".to_string(),
    }))
}

/// The id comes from the `eid` query parameter.
pub async fn delete(
    identity: Identity,
    State(state): State<SharedState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<StatusCode, AppError> {
    let id = rules::employee_id_query(&query).map_err(AppError::Validation)?;

    if !state.store.delete_employee(id).await? {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }

    tracing::info!(employee_id = %id, actor = actor(&identity), "Employee deleted");
    Ok(StatusCode::NO_CONTENT)
}
