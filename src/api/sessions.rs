use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{jwt_auth_middleware, AuthService, TrainerSession};
use crate::models::{
    AssignmentValidation, AttendanceRecord, Cancellation, CancellationRequest,
    GenerateSessionsRequest, GenerateSessionsResponse, MarkAttendanceRequest, SessionDetail,
    SessionReassignmentOutcome, SessionReassignmentRequest, TrainingSession,
    UpdateSessionGroupRequest,
};
use crate::services::{AssignmentService, SessionService};

const DEFAULT_GENERATION_HORIZON_DAYS: i64 = 60;

#[derive(Clone)]
pub struct AppState {
    pub session_service: SessionService,
    pub assignment_service: AssignmentService,
}

#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    pub training_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub fn session_routes(db: PgPool, auth_service: AuthService) -> Router {
    let state = AppState {
        session_service: SessionService::new(db.clone()),
        assignment_service: AssignmentService::new(db),
    };

    Router::new()
        .route("/", get(list_sessions))
        .route("/generate", post(generate_sessions))
        .route("/:session_id", get(get_session))
        .route("/:session_id/cancel", post(cancel_session))
        .route("/:session_id/complete", post(complete_session))
        .route("/:session_id/groups/:group_id", put(update_session_group))
        .route(
            "/:session_id/attendance",
            get(list_attendance).post(mark_attendance),
        )
        .route(
            "/:session_id/cancellations",
            get(list_cancellations).post(record_cancellation),
        )
        .route("/:session_id/reassignments", post(reassign_athlete))
        .route(
            "/:session_id/reassignments/validate",
            post(validate_reassignment),
        )
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ))
        .with_state(state)
}

/// Bulk-generate upcoming sessions from the recurring training definitions
#[tracing::instrument(skip(state, request))]
async fn generate_sessions(
    State(state): State<AppState>,
    Json(request): Json<GenerateSessionsRequest>,
) -> Result<Json<GenerateSessionsResponse>, StatusCode> {
    let from = request.from.unwrap_or_else(|| Utc::now().date_naive());
    let to = request
        .to
        .unwrap_or_else(|| from + Duration::days(DEFAULT_GENERATION_HORIZON_DAYS));

    if to < from {
        return Err(StatusCode::BAD_REQUEST);
    }

    let generated = match request.recurring_training_id {
        Some(training_id) => state
            .session_service
            .generate_for_training(training_id, from, to)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .ok_or(StatusCode::NOT_FOUND)?,
        None => state
            .session_service
            .generate_all(from, to)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
    };

    Ok(Json(generated))
}

#[tracing::instrument(skip(state))]
async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<Vec<TrainingSession>>, StatusCode> {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let to = query.to.unwrap_or_else(|| from + Duration::days(30));

    let sessions = state
        .session_service
        .list_sessions(query.training_id, from, to)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(sessions))
}

#[tracing::instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionDetail>, StatusCode> {
    let detail = state
        .session_service
        .get_session_detail(session_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(detail))
}

#[tracing::instrument(skip(state))]
async fn cancel_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TrainingSession>, StatusCode> {
    let session = state
        .session_service
        .set_cancelled(session_id, true)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(session))
}

/// Mark a session as held; completed sessions feed the statistics and
/// the trainer-hours report
#[tracing::instrument(skip(state))]
async fn complete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TrainingSession>, StatusCode> {
    let session = state
        .session_service
        .set_completed(session_id, true)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(session))
}

/// Per-occurrence exercises and notes
#[tracing::instrument(skip(state, request))]
async fn update_session_group(
    State(state): State<AppState>,
    Path((session_id, group_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateSessionGroupRequest>,
) -> Result<Json<crate::models::SessionGroup>, StatusCode> {
    let group = state
        .session_service
        .update_session_group(session_id, group_id, request)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(group))
}

#[tracing::instrument(skip(state, session))]
async fn mark_attendance(
    State(state): State<AppState>,
    Extension(session): Extension<TrainerSession>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<MarkAttendanceRequest>,
) -> Result<Json<AttendanceRecord>, StatusCode> {
    let record = state
        .session_service
        .mark_attendance(session_id, request, Some(session.trainer_id))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(record))
}

#[tracing::instrument(skip(state))]
async fn list_attendance(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<AttendanceRecord>>, StatusCode> {
    let records = state
        .session_service
        .list_attendance(session_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(records))
}

/// An athlete's advance notice that they will miss this session
#[tracing::instrument(skip(state, request))]
async fn record_cancellation(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<CancellationRequest>,
) -> Result<Json<Cancellation>, StatusCode> {
    let cancellation = state
        .session_service
        .record_cancellation(session_id, request)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(cancellation))
}

#[tracing::instrument(skip(state))]
async fn list_cancellations(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Vec<Cancellation>>, StatusCode> {
    let cancellations = state
        .session_service
        .list_cancellations(session_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(cancellations))
}

/// Move an athlete into a different group for this single session
#[tracing::instrument(skip(state, request))]
async fn reassign_athlete(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SessionReassignmentRequest>,
) -> Result<Json<SessionReassignmentOutcome>, StatusCode> {
    let outcome = state
        .assignment_service
        .reassign_for_session(request.athlete_id, session_id, request.target_group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(outcome))
}

#[tracing::instrument(skip(state, request))]
async fn validate_reassignment(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SessionReassignmentRequest>,
) -> Result<Json<AssignmentValidation>, StatusCode> {
    let validation = state
        .assignment_service
        .validate_session_reassignment(request.athlete_id, session_id, request.target_group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(validation))
}
