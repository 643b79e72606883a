use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Metadata of an uploaded athlete document (medical form, photo consent).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AthleteDocument {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub filename: String,
    pub stored_path: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
