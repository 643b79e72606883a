use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One concrete calendar occurrence generated from a recurring training.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingSession {
    pub id: Uuid,
    pub recurring_training_id: Uuid,
    pub date: NaiveDate,
    pub cancelled: bool,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Occurrence-specific instantiation of a training group within one session.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionGroup {
    pub id: Uuid,
    pub training_session_id: Uuid,
    pub training_group_id: Uuid,
    pub exercises: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One-off override moving an athlete into a different group for one session.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SessionAthleteAssignment {
    pub id: Uuid,
    pub training_session_id: Uuid,
    pub athlete_id: Uuid,
    pub session_group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateSessionsRequest {
    /// Generate for one training only; all trainings when omitted.
    pub recurring_training_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct GenerateSessionsResponse {
    pub sessions_created: u64,
    pub session_groups_created: u64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionGroupRequest {
    pub exercises: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionReassignmentRequest {
    pub athlete_id: Uuid,
    pub target_group_id: Uuid,
}

/// Session detail with its materialized groups.
#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: TrainingSession,
    pub training_name: String,
    pub groups: Vec<SessionGroup>,
}
