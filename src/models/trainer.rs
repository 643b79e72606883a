use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::TrainerRole;

#[derive(Debug, Clone, FromRow)]
pub struct Trainer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: TrainerRole,
    pub active: bool,
    pub hourly_rate_cents: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTrainerRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<TrainerRole>,
    pub hourly_rate_cents: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTrainerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<TrainerRole>,
    pub hourly_rate_cents: Option<i32>,
}

/// Trainer as exposed through the API, without the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct TrainerResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: TrainerRole,
    pub active: bool,
    pub hourly_rate_cents: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Trainer> for TrainerResponse {
    fn from(trainer: Trainer) -> Self {
        Self {
            id: trainer.id,
            name: trainer.name,
            email: trainer.email,
            role: trainer.role,
            active: trainer.active,
            hourly_rate_cents: trainer.hourly_rate_cents,
            created_at: trainer.created_at,
            updated_at: trainer.updated_at,
        }
    }
}
