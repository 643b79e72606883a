use axum::{
    extract::State,
    middleware,
    response::Json,
    routing::{get, post},
    Extension, Router,
};

use crate::auth::{
    jwt_auth_middleware, AuthError, AuthResponse, AuthService, ChangePasswordRequest,
    LoginRequest, MessageResponse, TrainerSession,
};

/// Authentication routes
pub fn auth_routes(auth_service: AuthService) -> Router {
    Router::new()
        .route("/login", post(login))
        .route(
            "/me",
            get(me).route_layer(middleware::from_fn_with_state(
                auth_service.clone(),
                jwt_auth_middleware,
            )),
        )
        .route(
            "/change-password",
            post(change_password).route_layer(middleware::from_fn_with_state(
                auth_service.clone(),
                jwt_auth_middleware,
            )),
        )
        .with_state(auth_service)
}

/// Login a trainer or admin
#[tracing::instrument(skip(auth_service, request))]
async fn login(
    State(auth_service): State<AuthService>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = auth_service.login(request).await?;
    Ok(Json(response))
}

/// Current session info
#[tracing::instrument(skip(session))]
async fn me(
    Extension(session): Extension<TrainerSession>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "trainer_id": session.trainer_id,
        "email": session.email,
        "role": session.role,
    }))
}

/// Change the password of the authenticated trainer
#[tracing::instrument(skip(auth_service, session, request))]
async fn change_password(
    State(auth_service): State<AuthService>,
    Extension(session): Extension<TrainerSession>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AuthError> {
    let response = auth_service
        .change_password(session.trainer_id, request)
        .await?;
    Ok(Json(response))
}
