use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    Holiday, HolidayCache, Jurisdiction, ProjectSettings, Schedule, ScheduleEntry, ScheduleError,
    ScheduleSummary, ScopeLibrary, SettingsError, export, parse_manual_activities, scope,
};

/// Shared by every request. Holiday tables resolved for one request are
/// reused by the next.
#[derive(Clone, Default)]
pub struct AppState {
    holidays: Arc<HolidayCache>,
    scopes: Arc<ScopeLibrary>,
}

impl AppState {
    pub fn new(scopes: ScopeLibrary) -> Self {
        Self {
            holidays: Arc::new(HolidayCache::new()),
            scopes: Arc::new(scopes),
        }
    }

    pub fn with_cache(scopes: ScopeLibrary, holidays: Arc<HolidayCache>) -> Self {
        Self {
            holidays,
            scopes: Arc::new(scopes),
        }
    }

    pub fn holiday_cache(&self) -> Arc<HolidayCache> {
        self.holidays.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<SettingsError> for ApiError {
    fn from(value: SettingsError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::Invalid(value.body_text())
    }
}

impl From<export::ExportError> for ApiError {
    fn from(value: export::ExportError) -> Self {
        ApiError::Internal(value.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        if status.is_server_error() {
            warn!(%status, %message, "request failed");
        }
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub matched_scopes: Vec<String>,
    pub activities: Vec<String>,
    pub preview: String,
}

/// Activities come from `document_text` when it matches any scope, else
/// from `activities`.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    #[serde(default)]
    pub activities: Vec<String>,
    #[serde(default)]
    pub document_text: Option<String>,
    #[serde(default)]
    pub settings: ProjectSettings,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub summary: Option<ScheduleSummary>,
    pub entries: Vec<ScheduleEntry>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/jurisdictions", get(list_jurisdictions))
        .route("/holidays/:code/:year", get(list_holidays))
        .route("/activities/extract", post(extract_activities))
        .route("/schedule", post(build_schedule))
        .route("/schedule/csv", post(build_schedule_csv))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "http api listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_jurisdictions() -> Json<Vec<String>> {
    Json(
        Jurisdiction::supported()
            .into_iter()
            .map(|jurisdiction| jurisdiction.code())
            .collect(),
    )
}

async fn list_holidays(Path((code, year)): Path<(String, i32)>) -> Result<Json<Vec<Holiday>>, ApiError> {
    let jurisdiction: Jurisdiction = code.parse()?;
    Ok(Json(crate::holidays_in_year(jurisdiction, year)))
}

async fn extract_activities(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload?;
    let matched_scopes = state
        .scopes
        .matched_scopes(&request.text)
        .into_iter()
        .map(str::to_string)
        .collect();
    let activities = state.scopes.extract_activities(&request.text);
    Ok(Json(ExtractResponse {
        matched_scopes,
        activities,
        preview: scope::preview(&request.text).to_string(),
    }))
}

fn resolve_schedule(state: &AppState, request: &ScheduleRequest) -> Result<Schedule, ApiError> {
    let mut names = request
        .document_text
        .as_deref()
        .map(|text| state.scopes.extract_activities(text))
        .unwrap_or_default();
    if names.is_empty() {
        names = parse_manual_activities(&request.activities.join("\n"));
    }
    if names.is_empty() {
        return Err(ApiError::invalid(
            "no activities: upload specs or manually input activities",
        ));
    }

    let calendar = request.settings.calendar(state.holiday_cache());
    let schedule = request.settings.plan(&names, &calendar)?;
    Ok(schedule)
}

async fn build_schedule(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let Json(request) = payload?;
    let schedule = resolve_schedule(&state, &request)?;
    Ok(Json(ScheduleResponse {
        summary: schedule.summary(),
        entries: schedule.into_entries(),
    }))
}

async fn build_schedule_csv(
    State(state): State<AppState>,
    payload: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let schedule = resolve_schedule(&state, &request)?;
    let body = export::schedule_to_csv_string(&schedule)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"schedule.csv\"",
            ),
        ],
        body,
    )
        .into_response())
}
