use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use super::domain::{PeriodId, SubjectId, TeacherId};
use super::evaluation::AvailabilityRequest;
use super::repository::{ProxyLedger, RepositoryError, ScheduleRepository};
use super::service::{SubstitutionService, SubstitutionServiceError};

/// Router builder exposing the availability lookup and day auto-assignment.
pub fn substitution_router<R, L>(service: Arc<SubstitutionService<R, L>>) -> Router
where
    R: ScheduleRepository + 'static,
    L: ProxyLedger + 'static,
{
    Router::new()
        .route("/api/v1/proxies", get(proxies_handler::<R, L>))
        .route("/api/v1/proxies/available", get(available_handler::<R, L>))
        .route(
            "/api/v1/proxies/auto-assign",
            post(auto_assign_handler::<R, L>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityQuery {
    pub(crate) date: NaiveDate,
    pub(crate) period_id: String,
    pub(crate) subject_id: String,
    pub(crate) absent_teacher_id: String,
}

impl From<AvailabilityQuery> for AvailabilityRequest {
    fn from(query: AvailabilityQuery) -> Self {
        Self {
            date: query.date,
            period_id: PeriodId(query.period_id),
            subject_id: SubjectId(query.subject_id),
            absent_teacher_id: TeacherId(query.absent_teacher_id),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct AutoAssignRequest {
    pub(crate) date: NaiveDate,
    pub(crate) absent_teacher_id: TeacherId,
    #[serde(default)]
    pub(crate) commit: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProxiesQuery {
    pub(crate) date: NaiveDate,
}

pub(crate) async fn available_handler<R, L>(
    State(service): State<Arc<SubstitutionService<R, L>>>,
    Query(query): Query<AvailabilityQuery>,
) -> Response
where
    R: ScheduleRepository + 'static,
    L: ProxyLedger + 'static,
{
    let request = AvailabilityRequest::from(query);
    match service.find_available(&request) {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn auto_assign_handler<R, L>(
    State(service): State<Arc<SubstitutionService<R, L>>>,
    axum::Json(request): axum::Json<AutoAssignRequest>,
) -> Response
where
    R: ScheduleRepository + 'static,
    L: ProxyLedger + 'static,
{
    let outcome = if request.commit {
        service.commit_day(request.date, &request.absent_teacher_id)
    } else {
        service.plan_day(request.date, &request.absent_teacher_id)
    };

    match outcome {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn proxies_handler<R, L>(
    State(service): State<Arc<SubstitutionService<R, L>>>,
    Query(query): Query<ProxiesQuery>,
) -> Response
where
    R: ScheduleRepository + 'static,
    L: ProxyLedger + 'static,
{
    match service.proxies_on(query.date) {
        Ok(proxies) => (StatusCode::OK, axum::Json(proxies)).into_response(),
        Err(error) => error_response(error),
    }
}

/// HTTP status for a failed substitution operation.
pub(crate) fn status_for(error: &SubstitutionServiceError) -> StatusCode {
    match error {
        SubstitutionServiceError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
        SubstitutionServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn error_response(error: SubstitutionServiceError) -> Response {
    let status = status_for(&error);
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
