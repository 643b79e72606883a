use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    AbsentExcused,
    AbsentUnexcused,
}

impl AttendanceStatus {
    pub fn is_absence(&self) -> bool {
        !matches!(self, AttendanceStatus::Present)
    }
}

/// One record per (athlete, session); re-marking overwrites the status.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub training_session_id: Uuid,
    pub athlete_id: Uuid,
    pub status: AttendanceStatus,
    pub recorded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub athlete_id: Uuid,
    pub status: AttendanceStatus,
}

/// An athlete's advance notice that they will not attend a session.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cancellation {
    pub id: Uuid,
    pub training_session_id: Uuid,
    pub athlete_id: Uuid,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CancellationRequest {
    pub athlete_id: Uuid,
    pub reason: Option<String>,
}
