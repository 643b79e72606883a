use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::Json,
    routing::post,
    Router,
};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{admin_only_middleware, jwt_auth_middleware, AuthService};
use crate::services::email_service::BulkEmailReport;
use crate::services::{AthleteService, EmailService};

#[derive(Clone)]
pub struct AppState {
    pub athlete_service: AthleteService,
    pub email_service: EmailService,
}

#[derive(Debug, Deserialize)]
pub struct BulkEmailRequest {
    pub subject: String,
    pub body: String,
    /// Narrow the audience to one training; all approved athletes when
    /// neither filter is set.
    pub training_id: Option<Uuid>,
    /// Narrow the audience to one group; takes precedence over training_id.
    pub group_id: Option<Uuid>,
}

pub fn email_routes(db: PgPool, auth_service: AuthService) -> Router {
    let email_service = EmailService::from_env().expect("Failed to create EmailService");

    let state = AppState {
        athlete_service: AthleteService::new(db),
        email_service,
    };

    Router::new()
        .route("/bulk", post(send_bulk_email))
        .route_layer(middleware::from_fn(admin_only_middleware))
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ))
        .with_state(state)
}

/// Send a message to the selected member audience
#[tracing::instrument(skip(state, request))]
async fn send_bulk_email(
    State(state): State<AppState>,
    Json(request): Json<BulkEmailRequest>,
) -> Result<Json<BulkEmailReport>, StatusCode> {
    if request.subject.trim().is_empty() || request.body.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let recipients = state
        .athlete_service
        .contact_emails(request.training_id, request.group_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let report = state
        .email_service
        .send_bulk(&recipients, &request.subject, &request.body)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(report))
}
