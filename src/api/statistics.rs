use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{admin_only_middleware, jwt_auth_middleware, AuthService};
use crate::models::{AbsenceAlert, CategorizedAttendance, MonthlyAttendance, TrainerHours};
use crate::services::{EmailService, StatisticsService, TrainerService};

#[derive(Clone)]
pub struct AppState {
    pub statistics_service: StatisticsService,
    pub trainer_service: TrainerService,
    pub email_service: EmailService,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Deserialize)]
pub struct AbsenceQuery {
    /// Alert when an athlete reaches this many absences (default: 3)
    pub threshold: Option<i64>,
    /// Trailing window in days (default: 30)
    pub window_days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct AbsenceNotifyResponse {
    pub alerts: Vec<AbsenceAlert>,
    pub recipients_notified: usize,
}

pub fn statistics_routes(db: PgPool, auth_service: AuthService) -> Router {
    let email_service = EmailService::from_env().expect("Failed to create EmailService");

    let state = AppState {
        statistics_service: StatisticsService::new(db.clone()),
        trainer_service: TrainerService::new(db),
        email_service,
    };

    let admin = Router::new()
        .route("/trainer-hours", get(trainer_hours))
        .route("/absence-alerts/notify", post(notify_absence_alerts))
        .route_layer(middleware::from_fn(admin_only_middleware));

    Router::new()
        .route("/athletes/:athlete_id/monthly", get(monthly_attendance))
        .route("/absence-alerts", get(absence_alerts))
        .route("/attendance", get(categorized_attendance))
        .merge(admin)
        .route_layer(middleware::from_fn_with_state(
            auth_service,
            jwt_auth_middleware,
        ))
        .with_state(state)
}

/// Attendance rate of one athlete within a calendar month
#[tracing::instrument(skip(state))]
async fn monthly_attendance(
    State(state): State<AppState>,
    Path(athlete_id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthlyAttendance>, StatusCode> {
    if !(1..=12).contains(&query.month) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let attendance = state
        .statistics_service
        .monthly_attendance(athlete_id, query.year, query.month)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(attendance))
}

/// Athletes over the absence threshold within the trailing window
#[tracing::instrument(skip(state))]
async fn absence_alerts(
    State(state): State<AppState>,
    Query(query): Query<AbsenceQuery>,
) -> Result<Json<Vec<AbsenceAlert>>, StatusCode> {
    let alerts = state
        .statistics_service
        .detect_absence_alerts(
            query.threshold.unwrap_or(3).max(1),
            query.window_days.unwrap_or(30).max(1),
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(alerts))
}

/// Run the absence scan and mail the digest to the admins
#[tracing::instrument(skip(state))]
async fn notify_absence_alerts(
    State(state): State<AppState>,
    Query(query): Query<AbsenceQuery>,
) -> Result<Json<AbsenceNotifyResponse>, StatusCode> {
    let alerts = state
        .statistics_service
        .detect_absence_alerts(
            query.threshold.unwrap_or(3).max(1),
            query.window_days.unwrap_or(30).max(1),
        )
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let recipients = state
        .trainer_service
        .admin_emails()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let recipients_notified = state
        .email_service
        .send_absence_digest(&recipients, &alerts)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(AbsenceNotifyResponse {
        alerts,
        recipients_notified,
    }))
}

/// Attendance rates grouped by youth category and by training
#[tracing::instrument(skip(state))]
async fn categorized_attendance(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<CategorizedAttendance>, StatusCode> {
    if query.to < query.from {
        return Err(StatusCode::BAD_REQUEST);
    }

    let statistics = state
        .statistics_service
        .categorized_attendance(query.from, query.to)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(statistics))
}

/// Payroll report: hours led per trainer over the date range
#[tracing::instrument(skip(state))]
async fn trainer_hours(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<TrainerHours>>, StatusCode> {
    if query.to < query.from {
        return Err(StatusCode::BAD_REQUEST);
    }

    let report = state
        .statistics_service
        .trainer_hours(query.from, query.to)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(report))
}
