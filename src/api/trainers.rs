use axum::{
    extract::{Path, Query, State},
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{admin_only_middleware, jwt_auth_middleware, AuthError, AuthService};
use crate::models::{CreateTrainerRequest, TrainerResponse, UpdateTrainerRequest};
use crate::services::TrainerService;

#[derive(Clone)]
pub struct AppState {
    pub trainer_service: TrainerService,
}

#[derive(Debug, Deserialize)]
pub struct ListTrainersQuery {
    pub include_inactive: Option<bool>,
}

/// Trainer account management; admin-only.
pub fn trainer_routes(db: PgPool, auth_service: AuthService) -> Router {
    let state = AppState {
        trainer_service: TrainerService::new(db),
    };

    Router::new()
        .route("/", get(list_trainers).post(create_trainer))
        .route("/:trainer_id", get(get_trainer).put(update_trainer))
        .route("/:trainer_id/deactivate", post(deactivate_trainer))
        .route("/:trainer_id/reactivate", post(reactivate_trainer))
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ))
        .with_state(state)
}

/// Create a trainer account
#[tracing::instrument(skip(state, request))]
async fn create_trainer(
    State(state): State<AppState>,
    Json(request): Json<CreateTrainerRequest>,
) -> Result<Json<TrainerResponse>, AuthError> {
    let trainer = state.trainer_service.create(request).await?;
    Ok(Json(trainer))
}

#[tracing::instrument(skip(state))]
async fn list_trainers(
    State(state): State<AppState>,
    Query(query): Query<ListTrainersQuery>,
) -> Result<Json<Vec<TrainerResponse>>, AuthError> {
    let trainers = state
        .trainer_service
        .list(query.include_inactive.unwrap_or(false))
        .await?;
    Ok(Json(trainers))
}

#[tracing::instrument(skip(state))]
async fn get_trainer(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
) -> Result<Json<TrainerResponse>, AuthError> {
    let trainer = state
        .trainer_service
        .get_by_id(trainer_id)
        .await?
        .ok_or(AuthError::TrainerNotFound)?;
    Ok(Json(trainer))
}

#[tracing::instrument(skip(state, request))]
async fn update_trainer(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
    Json(request): Json<UpdateTrainerRequest>,
) -> Result<Json<TrainerResponse>, AuthError> {
    let trainer = state
        .trainer_service
        .update(trainer_id, request)
        .await?
        .ok_or(AuthError::TrainerNotFound)?;
    Ok(Json(trainer))
}

/// Deactivate instead of delete: keeps attendance and payroll history
#[tracing::instrument(skip(state))]
async fn deactivate_trainer(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
) -> Result<Json<TrainerResponse>, AuthError> {
    let trainer = state
        .trainer_service
        .set_active(trainer_id, false)
        .await?
        .ok_or(AuthError::TrainerNotFound)?;
    Ok(Json(trainer))
}

#[tracing::instrument(skip(state))]
async fn reactivate_trainer(
    State(state): State<AppState>,
    Path(trainer_id): Path<Uuid>,
) -> Result<Json<TrainerResponse>, AuthError> {
    let trainer = state
        .trainer_service
        .set_active(trainer_id, true)
        .await?
        .ok_or(AuthError::TrainerNotFound)?;
    Ok(Json(trainer))
}
