use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::hash_password;
use crate::auth::{AuthError, TrainerRole};
use crate::models::{CreateTrainerRequest, Trainer, TrainerResponse, UpdateTrainerRequest};

#[derive(Clone)]
pub struct TrainerService {
    db: PgPool,
}

impl TrainerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a trainer account (admin operation).
    pub async fn create(&self, request: CreateTrainerRequest) -> Result<TrainerResponse, AuthError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM trainers WHERE email = $1)",
        )
        .bind(&request.email)
        .fetch_one(&self.db)
        .await
        .map_err(AuthError::Database)?;

        if exists {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;
        let role = request.role.unwrap_or(TrainerRole::Trainer);

        let trainer = sqlx::query_as::<_, Trainer>(
            r#"
            INSERT INTO trainers (name, email, password_hash, role, hourly_rate_cents)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&password_hash)
        .bind(role)
        .bind(request.hourly_rate_cents)
        .fetch_one(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(trainer.into())
    }

    pub async fn get_by_id(&self, trainer_id: Uuid) -> Result<Option<TrainerResponse>, AuthError> {
        let trainer = sqlx::query_as::<_, Trainer>("SELECT * FROM trainers WHERE id = $1")
            .bind(trainer_id)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(trainer.map(Into::into))
    }

    pub async fn list(&self, include_inactive: bool) -> Result<Vec<TrainerResponse>, AuthError> {
        let query = if include_inactive {
            "SELECT * FROM trainers ORDER BY name"
        } else {
            "SELECT * FROM trainers WHERE active = TRUE ORDER BY name"
        };

        let trainers = sqlx::query_as::<_, Trainer>(query)
            .fetch_all(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(trainers.into_iter().map(Into::into).collect())
    }

    pub async fn update(
        &self,
        trainer_id: Uuid,
        request: UpdateTrainerRequest,
    ) -> Result<Option<TrainerResponse>, AuthError> {
        let trainer = sqlx::query_as::<_, Trainer>(
            r#"
            UPDATE trainers
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                role = COALESCE($4, role),
                hourly_rate_cents = COALESCE($5, hourly_rate_cents),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(trainer_id)
        .bind(request.name)
        .bind(request.email)
        .bind(request.role)
        .bind(request.hourly_rate_cents)
        .fetch_optional(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(trainer.map(Into::into))
    }

    /// Deactivate instead of delete: the account keeps its attendance and
    /// payroll history but can no longer log in.
    pub async fn set_active(
        &self,
        trainer_id: Uuid,
        active: bool,
    ) -> Result<Option<TrainerResponse>, AuthError> {
        let trainer = sqlx::query_as::<_, Trainer>(
            "UPDATE trainers SET active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(trainer_id)
        .bind(active)
        .fetch_optional(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(trainer.map(Into::into))
    }

    /// Emails of active admins, for the absence-alert digest.
    pub async fn admin_emails(&self) -> Result<Vec<String>, AuthError> {
        let emails = sqlx::query_scalar::<_, String>(
            "SELECT email FROM trainers WHERE role = 'admin' AND active = TRUE",
        )
        .fetch_all(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(emails)
    }
}
