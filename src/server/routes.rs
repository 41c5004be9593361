use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::server::params::Params;
use crate::server::AppState;
use crate::{Advisory, Error, ServiceVersions};

pub const DASHBOARD: &str = "/";
pub const ADVISORIES: &str = "/advisories";
pub const SERVICES: &str = "/services";

#[derive(Serialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// HTTP status for a service error
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidAdvisoryType(_) | Error::MalformedIdentifier(_) => StatusCode::NOT_ACCEPTABLE,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: Error) -> ApiError {
    let status = status_for(&err);
    if err.is_client_error() {
        tracing::warn!("Rejected request: {}", err);
    } else {
        tracing::error!("Request failed: {}", err);
    }
    (status, Json(ErrorResponse { error: err.to_string() }))
}

/// Run a service call on the blocking pool; storage access is synchronous.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&AppState) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || f(&state))
        .await
        .map_err(|e| {
            tracing::error!("Worker task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse { error: format!("worker task failed: {}", e) }),
            )
        })?
        .map_err(error_response)
}

pub async fn dashboard(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    state.dashboard.render().map(Html).map_err(error_response)
}

pub async fn list_advisories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Advisory>>, ApiError> {
    let advisories = blocking(&state, |state| state.advisories.list_advisories()).await?;
    Ok(Json(advisories))
}

pub async fn put_advisory(
    State(state): State<Arc<AppState>>,
    params: Params,
) -> Result<Json<CreatedResponse>, ApiError> {
    let kind = params.required("type")?.to_string();
    let message = params.required("message")?.to_string();
    let id = blocking(&state, move |state| state.advisories.create_advisory(&kind, &message)).await?;
    Ok(Json(CreatedResponse { id }))
}

pub async fn delete_advisory(
    State(state): State<Arc<AppState>>,
    params: Params,
) -> Result<StatusCode, ApiError> {
    // a missing id is as unusable as a garbled one
    let raw_id = params.get("id").unwrap_or_default().to_string();
    blocking(&state, move |state| state.advisories.delete_advisory(&raw_id)).await?;
    Ok(StatusCode::OK)
}

pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ServiceVersions>, ApiError> {
    let services = blocking(&state, |state| state.registry.list_services()).await?;
    Ok(Json(services))
}

pub async fn put_service_version(
    State(state): State<Arc<AppState>>,
    params: Params,
) -> Result<StatusCode, ApiError> {
    let name = params.required("name")?.to_string();
    let env = params.required("env")?.to_string();
    let version = params.required("version")?.to_string();
    blocking(&state, move |state| state.registry.report_version(&name, &env, &version)).await?;
    Ok(StatusCode::OK)
}
