use axum::{routing::get, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::athletes::athlete_routes;
use super::auth::auth_routes;
use super::emails::email_routes;
use super::health::health_check;
use super::sessions::session_routes;
use super::statistics::statistics_routes;
use super::trainers::trainer_routes;
use super::trainings::training_routes;
use crate::auth::middleware::{cors_layer, security_headers_layer};
use crate::auth::AuthService;
use crate::config::AppConfig;

pub fn create_routes(db: PgPool, config: &AppConfig) -> Router {
    let auth_service = AuthService::new(db.clone(), &config.jwt_secret);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes(auth_service.clone()))
        .nest(
            "/api/athletes",
            athlete_routes(db.clone(), auth_service.clone(), config),
        )
        .nest("/api/trainers", trainer_routes(db.clone(), auth_service.clone()))
        .nest("/api/trainings", training_routes(db.clone(), auth_service.clone()))
        .nest("/api/sessions", session_routes(db.clone(), auth_service.clone()))
        .nest(
            "/api/statistics",
            statistics_routes(db.clone(), auth_service.clone()),
        )
        .nest("/api/emails", email_routes(db, auth_service))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security_headers_layer())
                .layer(cors_layer()),
        )
}
