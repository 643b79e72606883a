use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff roles for role-based access control. Athletes do not hold accounts;
/// they are managed records, not logins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "trainer_role", rename_all = "lowercase")]
pub enum TrainerRole {
    Trainer,
    Admin,
}

impl TrainerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainerRole::Trainer => "trainer",
            TrainerRole::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, TrainerRole::Admin)
    }
}

/// JWT token claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,        // Subject (trainer ID)
    pub email: String,      // Trainer email
    pub role: TrainerRole,  // Trainer role
    pub exp: usize,         // Expiration time
    pub iat: usize,         // Issued at
    pub jti: String,        // JWT ID
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: usize,
    pub trainer: TrainerInfo,
}

#[derive(Debug, Serialize)]
pub struct TrainerInfo {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: TrainerRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Authenticated trainer session attached to request extensions.
#[derive(Debug, Clone)]
pub struct TrainerSession {
    pub trainer_id: Uuid,
    pub email: String,
    pub role: TrainerRole,
    pub jti: String,
}

impl TrainerSession {
    pub fn from_claims(claims: &Claims) -> Result<Self, uuid::Error> {
        Ok(Self {
            trainer_id: Uuid::parse_str(&claims.sub)?,
            email: claims.email.clone(),
            role: claims.role,
            jti: claims.jti.clone(),
        })
    }
}
