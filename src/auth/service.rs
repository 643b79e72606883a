use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{
    AuthError, AuthResponse, ChangePasswordRequest, JwtService, LoginRequest, MessageResponse,
    TrainerInfo, TrainerSession,
};
use crate::models::Trainer;

#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    db: PgPool,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_secret: &str) -> Self {
        Self {
            jwt_service: JwtService::new(jwt_secret),
            db,
        }
    }

    /// Login a trainer or admin
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let trainer = self
            .get_trainer_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &trainer.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !trainer.active {
            return Err(AuthError::AccountInactive);
        }

        let access_token =
            self.jwt_service
                .create_access_token(trainer.id, &trainer.email, trainer.role)?;

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.access_token_expires_in_seconds(),
            trainer: TrainerInfo {
                id: trainer.id,
                name: trainer.name,
                email: trainer.email,
                role: trainer.role,
                created_at: trainer.created_at,
            },
        })
    }

    /// Validate a bearer token and confirm the account is still active
    pub async fn validate_session(&self, token: &str) -> Result<TrainerSession, AuthError> {
        let session = self.jwt_service.extract_session(token)?;

        let active = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM trainers WHERE id = $1 AND active = TRUE)",
        )
        .bind(session.trainer_id)
        .fetch_one(&self.db)
        .await
        .map_err(AuthError::Database)?;

        if !active {
            return Err(AuthError::AccountInactive);
        }

        Ok(session)
    }

    /// Change the password of the authenticated trainer
    pub async fn change_password(
        &self,
        trainer_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<MessageResponse, AuthError> {
        let trainer = self
            .get_trainer_by_id(trainer_id)
            .await?
            .ok_or(AuthError::TrainerNotFound)?;

        if !verify_password(&request.current_password, &trainer.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let password_hash = hash_password(&request.new_password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;

        sqlx::query("UPDATE trainers SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(trainer_id)
            .bind(&password_hash)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(MessageResponse {
            message: "Password changed successfully".to_string(),
        })
    }

    async fn get_trainer_by_email(&self, email: &str) -> Result<Option<Trainer>, AuthError> {
        let trainer = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(trainer)
    }

    async fn get_trainer_by_id(&self, trainer_id: Uuid) -> Result<Option<Trainer>, AuthError> {
        let trainer = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers WHERE id = $1")
            .bind(trainer_id)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(trainer)
    }
}
