use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    Catalog, Comparator, Course, Meeting, Schedule, ScheduleSearch, ScheduleStatistics,
    SearchLimits, catalog::format_day_codes, resolve_comparator, resolve_requests,
    validate_catalog,
};

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<RwLock<Arc<Catalog>>>,
    limits: SearchLimits,
}

impl AppState {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Arc::new(catalog))),
            limits: SearchLimits::default(),
        }
    }

    /// Limits applied when a request does not set its own.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The current snapshot. Searches hold on to it even if the catalog is replaced.
    fn snapshot(&self) -> Arc<Catalog> {
        self.catalog.read().clone()
    }

    fn replace(&self, catalog: Catalog) {
        *self.catalog.write() = Arc::new(catalog);
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    InvalidCourses(Vec<String>),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "not_found",
                    message,
                    details: Vec::new(),
                },
            ),
            ApiError::Invalid(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "invalid_request",
                    message,
                    details: Vec::new(),
                },
            ),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "internal_error",
                    message,
                    details: Vec::new(),
                },
            ),
            ApiError::InvalidCourses(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "invalid_courses",
                    message: format!("{} course request(s) could not be resolved", details.len()),
                    details,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequestPayload {
    pub courses: Vec<String>,
    #[serde(default)]
    pub primary: Option<String>,
    #[serde(default)]
    pub secondary: Option<String>,
    #[serde(default)]
    pub max_results: Option<usize>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// How many ranked schedules to return.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeetingView {
    pub days: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<&Meeting> for MeetingView {
    fn from(meeting: &Meeting) -> Self {
        Self {
            days: format_day_codes(&meeting.days),
            start: meeting.start,
            end: meeting.end,
            location: meeting.location.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SectionView {
    pub course: String,
    pub course_name: String,
    pub section: String,
    pub kind: String,
    pub instructor: String,
    pub tba: bool,
    pub meetings: Vec<MeetingView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleView {
    pub sections: Vec<SectionView>,
    pub statistics: ScheduleStatistics,
    pub credits: f64,
}

impl From<&Schedule> for ScheduleView {
    fn from(schedule: &Schedule) -> Self {
        let sections = schedule
            .entries()
            .iter()
            .map(|entry| SectionView {
                course: entry.course.label(),
                course_name: entry.course.name.clone(),
                section: entry.section.number.clone(),
                kind: entry.section.kind.clone(),
                instructor: entry.section.instructor.clone(),
                tba: entry.section.is_tba(),
                meetings: entry.section.meetings().iter().map(MeetingView::from).collect(),
            })
            .collect();
        Self {
            sections,
            statistics: *schedule.statistics(),
            credits: schedule.total_credits(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub total: usize,
    pub truncated: bool,
    pub primary: Comparator,
    pub secondary: Comparator,
    pub schedules: Vec<ScheduleView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseSummary {
    pub code: String,
    pub name: String,
    pub credits: f64,
    pub groups: usize,
    pub sections: usize,
}

impl From<&Course> for CourseSummary {
    fn from(course: &Course) -> Self {
        Self {
            code: course.code.clone(),
            name: course.name.clone(),
            credits: course.credits,
            groups: course.groups.len(),
            sections: course.sections().count(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/catalog", put(replace_catalog))
        .route("/departments", get(list_departments))
        .route("/departments/:dept/courses", get(list_courses))
        .route("/departments/:dept/courses/:code", get(get_course))
        .route("/schedules", post(find_schedules))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.snapshot();
    Json(json!({
        "status": "ok",
        "term": catalog.term_label(),
        "courses": catalog.course_count(),
    }))
}

async fn replace_catalog(
    State(state): State<AppState>,
    Json(catalog): Json<Catalog>,
) -> Result<StatusCode, ApiError> {
    validate_catalog(&catalog).map_err(|err| ApiError::invalid(err.to_string()))?;
    info!(
        departments = catalog.departments.len(),
        courses = catalog.course_count(),
        "catalog replaced"
    );
    state.replace(catalog);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_departments(State(state): State<AppState>) -> Json<Vec<String>> {
    let catalog = state.snapshot();
    Json(catalog.departments.keys().cloned().collect())
}

async fn list_courses(
    State(state): State<AppState>,
    Path(dept): Path<String>,
) -> Result<Json<Vec<CourseSummary>>, ApiError> {
    let catalog = state.snapshot();
    let department = catalog
        .department(&dept.to_uppercase())
        .ok_or_else(|| ApiError::not_found(format!("department {dept} not found")))?;
    Ok(Json(
        department
            .courses
            .values()
            .map(|course| CourseSummary::from(course.as_ref()))
            .collect(),
    ))
}

async fn get_course(
    State(state): State<AppState>,
    Path((dept, code)): Path<(String, String)>,
) -> Result<Json<Course>, ApiError> {
    let catalog = state.snapshot();
    catalog
        .course(&dept.to_uppercase(), &code)
        .map(|course| Json(course.as_ref().clone()))
        .ok_or_else(|| ApiError::not_found(format!("course {dept}-{code} not found")))
}

async fn find_schedules(
    State(state): State<AppState>,
    Json(payload): Json<ScheduleRequestPayload>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let primary = match payload.primary.as_deref() {
        Some(name) => resolve_comparator(name).map_err(|err| ApiError::invalid(err.to_string()))?,
        None => Comparator::Early,
    };
    let secondary = match payload.secondary.as_deref() {
        Some(name) => resolve_comparator(name).map_err(|err| ApiError::invalid(err.to_string()))?,
        None => Comparator::MinDays,
    };

    let catalog = state.snapshot();
    let resolved = resolve_requests(&catalog, &payload.courses).map_err(|errors| {
        warn!(count = errors.len(), "rejected schedule request");
        ApiError::InvalidCourses(errors.iter().map(ToString::to_string).collect())
    })?;

    let mut limits = state.limits;
    if payload.max_results.is_some() {
        limits.max_results = payload.max_results;
    }
    if payload.timeout_ms.is_some() {
        limits.timeout_ms = payload.timeout_ms;
    }

    // The search is CPU bound; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        ScheduleSearch::new(&resolved.courses)
            .primary(primary)
            .secondary(secondary)
            .limits(limits)
            .run()
    })
    .await
    .map_err(|err| ApiError::Internal(format!("search task failed: {err}")))?;

    info!(
        courses = payload.courses.len(),
        found = outcome.schedules.len(),
        truncated = outcome.truncated,
        "schedule search finished"
    );

    let take = payload.limit.unwrap_or(outcome.schedules.len());
    Ok(Json(ScheduleResponse {
        total: outcome.schedules.len(),
        truncated: outcome.truncated,
        primary,
        secondary,
        schedules: outcome.schedules.iter().take(take).map(ScheduleView::from).collect(),
    }))
}
