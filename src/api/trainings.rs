use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{delete, get},
    Router,
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{jwt_auth_middleware, AuthService};
use crate::models::{
    parse_wall_clock, AssignTrainerRequest, Athlete, CreateRecurringTrainingRequest,
    CreateTrainingGroupRequest, RecurringTraining, TrainerAssignment, TrainingGroup,
    UpdateRecurringTrainingRequest,
};
use crate::services::training_service::validate_slot;
use crate::services::TrainingService;

#[derive(Clone)]
pub struct AppState {
    pub training_service: TrainingService,
}

#[derive(Debug, Serialize)]
pub struct TrainingDetailResponse {
    #[serde(flatten)]
    pub training: RecurringTraining,
    pub groups: Vec<TrainingGroup>,
}

pub fn training_routes(db: PgPool, auth_service: AuthService) -> Router {
    let state = AppState {
        training_service: TrainingService::new(db),
    };

    Router::new()
        .route("/", get(list_trainings).post(create_training))
        .route(
            "/:training_id",
            get(get_training).put(update_training).delete(delete_training),
        )
        .route("/:training_id/groups", get(list_groups).post(create_group))
        .route("/groups/:group_id", delete(delete_group))
        .route("/groups/:group_id/members", get(group_members))
        .route(
            "/groups/:group_id/trainers",
            get(list_group_trainers).post(assign_trainer),
        )
        .route(
            "/groups/:group_id/trainers/:trainer_id",
            delete(remove_trainer),
        )
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ))
        .with_state(state)
}

/// Create a weekly training slot
#[tracing::instrument(skip(state, request))]
async fn create_training(
    State(state): State<AppState>,
    Json(request): Json<CreateRecurringTrainingRequest>,
) -> Result<(StatusCode, Json<RecurringTraining>), StatusCode> {
    let start_time = parse_wall_clock(&request.start_time).map_err(|_| StatusCode::BAD_REQUEST)?;
    let end_time = parse_wall_clock(&request.end_time).map_err(|_| StatusCode::BAD_REQUEST)?;

    if validate_slot(request.weekday, start_time, end_time).is_err() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let training = state
        .training_service
        .create_training(
            &request.name,
            request.weekday,
            start_time,
            end_time,
            request.interval_weeks.unwrap_or(1).max(1),
            request.valid_from,
            request.valid_until,
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(training)))
}

#[tracing::instrument(skip(state))]
async fn list_trainings(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecurringTraining>>, StatusCode> {
    let trainings = state
        .training_service
        .list_trainings()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(trainings))
}

#[tracing::instrument(skip(state))]
async fn get_training(
    State(state): State<AppState>,
    Path(training_id): Path<Uuid>,
) -> Result<Json<TrainingDetailResponse>, StatusCode> {
    let training = state
        .training_service
        .get_training(training_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let groups = state
        .training_service
        .list_groups(training_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(TrainingDetailResponse { training, groups }))
}

#[tracing::instrument(skip(state, request))]
async fn update_training(
    State(state): State<AppState>,
    Path(training_id): Path<Uuid>,
    Json(request): Json<UpdateRecurringTrainingRequest>,
) -> Result<Json<RecurringTraining>, StatusCode> {
    let start_time = request
        .start_time
        .as_deref()
        .map(parse_wall_clock)
        .transpose()
        .map_err(|_| StatusCode::BAD_REQUEST)?;
    let end_time = request
        .end_time
        .as_deref()
        .map(parse_wall_clock)
        .transpose()
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    if let Some(weekday) = request.weekday {
        if !(0..=6).contains(&weekday) {
            return Err(StatusCode::BAD_REQUEST);
        }
    }

    let training = state
        .training_service
        .update_training(
            training_id,
            request.name,
            request.weekday,
            start_time,
            end_time,
            request.interval_weeks,
            request.valid_from,
            request.valid_until,
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(training))
}

#[tracing::instrument(skip(state))]
async fn delete_training(
    State(state): State<AppState>,
    Path(training_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = state
        .training_service
        .delete_training(training_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[tracing::instrument(skip(state, request))]
async fn create_group(
    State(state): State<AppState>,
    Path(training_id): Path<Uuid>,
    Json(request): Json<CreateTrainingGroupRequest>,
) -> Result<(StatusCode, Json<TrainingGroup>), StatusCode> {
    let group = state
        .training_service
        .create_group(training_id, request)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok((StatusCode::CREATED, Json(group)))
}

#[tracing::instrument(skip(state))]
async fn list_groups(
    State(state): State<AppState>,
    Path(training_id): Path<Uuid>,
) -> Result<Json<Vec<TrainingGroup>>, StatusCode> {
    let groups = state
        .training_service
        .list_groups(training_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(groups))
}

#[tracing::instrument(skip(state))]
async fn delete_group(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let deleted = state
        .training_service
        .delete_group(group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[tracing::instrument(skip(state))]
async fn group_members(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<Athlete>>, StatusCode> {
    let members = state
        .training_service
        .group_members(group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(members))
}

/// Assign a trainer to a group; a new primary demotes the previous one
#[tracing::instrument(skip(state, request))]
async fn assign_trainer(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
    Json(request): Json<AssignTrainerRequest>,
) -> Result<Json<TrainerAssignment>, StatusCode> {
    let assignment = state
        .training_service
        .assign_trainer(
            group_id,
            request.trainer_id,
            request.is_primary.unwrap_or(false),
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(assignment))
}

#[tracing::instrument(skip(state))]
async fn remove_trainer(
    State(state): State<AppState>,
    Path((group_id, trainer_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    let removed = state
        .training_service
        .remove_trainer(group_id, trainer_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

#[tracing::instrument(skip(state))]
async fn list_group_trainers(
    State(state): State<AppState>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<TrainerAssignment>>, StatusCode> {
    let trainers = state
        .training_service
        .list_group_trainers(group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(trainers))
}
