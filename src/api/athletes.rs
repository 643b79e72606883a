use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{jwt_auth_middleware, AuthService, TrainerSession};
use crate::config::AppConfig;
use crate::models::{
    ApprovalRequest, ApprovalStatus, AssignAthleteRequest, AssignmentConflict, AssignmentOutcome,
    AssignmentValidation, Athlete, AthleteDocument, GroupSchedule, RegisterAthleteRequest,
    UpdateAthleteRequest,
};
use crate::services::athlete_service::validate_registration;
use crate::services::document_service::validate_document;
use crate::services::{AssignmentService, AthleteService, DocumentService, EmailService};

#[derive(Clone)]
pub struct AppState {
    pub athlete_service: AthleteService,
    pub assignment_service: AssignmentService,
    pub document_service: DocumentService,
    pub email_service: EmailService,
}

#[derive(Debug, Deserialize)]
pub struct ListAthletesQuery {
    pub status: Option<ApprovalStatus>,
    /// Maximum number of items to return (default: 50, max: 200)
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0)
    pub offset: Option<i64>,
}

impl ListAthletesQuery {
    pub fn get_limit(&self) -> i64 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }

    pub fn get_offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub athlete: Athlete,
    /// Present when the approval included an immediate group assignment.
    pub assignment: Option<AssignmentOutcome>,
}

pub fn athlete_routes(db: PgPool, auth_service: AuthService, config: &AppConfig) -> Router {
    let email_service = EmailService::from_env().expect("Failed to create EmailService");

    let state = AppState {
        athlete_service: AthleteService::new(db.clone()),
        assignment_service: AssignmentService::new(db.clone()),
        document_service: DocumentService::new(db, config.upload_dir.clone()),
        email_service,
    };

    let protected = Router::new()
        .route("/", get(list_athletes))
        .route(
            "/:athlete_id",
            get(get_athlete).put(update_athlete).delete(delete_athlete),
        )
        .route("/:athlete_id/approval", post(decide_approval))
        .route("/:athlete_id/assignments", get(list_assignments).post(assign_to_group))
        .route("/:athlete_id/assignments/validate", post(validate_assignment))
        .route("/:athlete_id/assignments/:group_id", delete(remove_assignment))
        .route("/:athlete_id/conflicts", get(get_conflicts))
        .route("/:athlete_id/documents", get(list_documents).post(upload_document))
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/register", post(register_athlete))
        .merge(protected)
        .with_state(state)
}

/// Public self-registration; the athlete starts out pending approval
#[tracing::instrument(skip(state, request))]
async fn register_athlete(
    State(state): State<AppState>,
    Json(request): Json<RegisterAthleteRequest>,
) -> Result<(StatusCode, Json<Athlete>), StatusCode> {
    if validate_registration(&request).is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let athlete = state
        .athlete_service
        .register(request)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(athlete)))
}

#[tracing::instrument(skip(state))]
async fn list_athletes(
    State(state): State<AppState>,
    Query(query): Query<ListAthletesQuery>,
) -> Result<Json<Vec<Athlete>>, StatusCode> {
    let athletes = state
        .athlete_service
        .list(query.status, query.get_limit(), query.get_offset())
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(athletes))
}

#[tracing::instrument(skip(state))]
async fn get_athlete(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
) -> Result<Json<Athlete>, StatusCode> {
    let athlete = state
        .athlete_service
        .get_by_id(athlete_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(athlete))
}

#[tracing::instrument(skip(state, request))]
async fn update_athlete(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
    Json(request): Json<UpdateAthleteRequest>,
) -> Result<Json<Athlete>, StatusCode> {
    let athlete = state
        .athlete_service
        .update(athlete_id, request)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(athlete))
}

#[tracing::instrument(skip(state, session))]
async fn delete_athlete(
    State(state): State<AppState>,
    Extension(session): Extension<TrainerSession>,
    Path(athlete_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    if !session.role.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    let deleted = state
        .athlete_service
        .delete(athlete_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Approve or reject a pending registration, optionally assigning the
/// athlete to a first training group in the same step
#[tracing::instrument(skip(state, session, request))]
async fn decide_approval(
    State(state): State<AppState>,
    Extension(session): Extension<TrainerSession>,
    Path(athlete_id): Path<Uuid>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<ApprovalResponse>, StatusCode> {
    if !session.role.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    let status = if request.approve {
        ApprovalStatus::Approved
    } else {
        ApprovalStatus::Rejected
    };

    let athlete = state
        .athlete_service
        .set_status(athlete_id, status)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let assignment = match (request.approve, request.training_group_id) {
        (true, Some(group_id)) => Some(
            state
                .assignment_service
                .assign_athlete(athlete_id, group_id)
                .await
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?,
        ),
        _ => None,
    };

    // Decision email is best-effort; the decision itself is already persisted
    if let Some(email) = athlete.contact_email() {
        if let Err(e) = state
            .email_service
            .send_registration_decision(
                email,
                &athlete.full_name(),
                request.approve,
                request.reason.as_deref(),
            )
            .await
        {
            tracing::warn!("Failed to send approval decision email: {}", e);
        }
    }

    Ok(Json(ApprovalResponse { athlete, assignment }))
}

#[tracing::instrument(skip(state))]
async fn list_assignments(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
) -> Result<Json<Vec<GroupSchedule>>, StatusCode> {
    let assignments = state
        .assignment_service
        .list_assignments(athlete_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(assignments))
}

/// Validate and persist a group assignment in one step; a failed
/// validation is reported in the body, not as an HTTP error
#[tracing::instrument(skip(state, request))]
async fn assign_to_group(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
    Json(request): Json<AssignAthleteRequest>,
) -> Result<Json<AssignmentOutcome>, StatusCode> {
    let outcome = state
        .assignment_service
        .assign_athlete(athlete_id, request.training_group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(outcome))
}

/// Dry-run check, used by the UI before submitting an assignment
#[tracing::instrument(skip(state, request))]
async fn validate_assignment(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
    Json(request): Json<AssignAthleteRequest>,
) -> Result<Json<AssignmentValidation>, StatusCode> {
    let validation = state
        .assignment_service
        .validate_assignment(athlete_id, request.training_group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(validation))
}

#[tracing::instrument(skip(state))]
async fn remove_assignment(
    State(state): State<AppState>,
    Path((athlete_id, group_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    let removed = state
        .assignment_service
        .remove_assignment(athlete_id, group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

/// Flag already-inconsistent assignments of one athlete (admin audit view)
#[tracing::instrument(skip(state))]
async fn get_conflicts(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
) -> Result<Json<Vec<AssignmentConflict>>, StatusCode> {
    let conflicts = state
        .assignment_service
        .get_all_conflicts(athlete_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(conflicts))
}

/// Upload an athlete document (medical form, photo consent)
#[tracing::instrument(skip(state, session, multipart))]
async fn upload_document(
    State(state): State<AppState>,
    Extension(session): Extension<TrainerSession>,
    Path(athlete_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<AthleteDocument>, StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let filename = field
                .file_name()
                .ok_or(StatusCode::BAD_REQUEST)?
                .to_string();

            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();

            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;

            if validate_document(&filename, &content_type, data.len()).is_err() {
                return Err(StatusCode::BAD_REQUEST);
            }

            let document = state
                .document_service
                .save(
                    athlete_id,
                    &filename,
                    &content_type,
                    data,
                    Some(session.trainer_id),
                )
                .await
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
                .ok_or(StatusCode::NOT_FOUND)?;

            return Ok(Json(document));
        }
    }

    Err(StatusCode::BAD_REQUEST)
}

#[tracing::instrument(skip(state))]
async fn list_documents(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
) -> Result<Json<Vec<AthleteDocument>>, StatusCode> {
    let documents = state
        .document_service
        .list(athlete_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(documents))
}
