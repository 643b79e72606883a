use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Athlete, CreateTrainingGroupRequest, RecurringTraining, TrainerAssignment, TrainingGroup,
};

#[derive(Clone)]
pub struct TrainingService {
    db: PgPool,
}

impl TrainingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_training(
        &self,
        name: &str,
        weekday: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
        interval_weeks: i16,
        valid_from: NaiveDate,
        valid_until: Option<NaiveDate>,
    ) -> Result<RecurringTraining> {
        let training = sqlx::query_as::<_, RecurringTraining>(
            r#"
            INSERT INTO recurring_trainings
                (name, weekday, start_time, end_time, interval_weeks, valid_from, valid_until)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(weekday)
        .bind(start_time)
        .bind(end_time)
        .bind(interval_weeks)
        .bind(valid_from)
        .bind(valid_until)
        .fetch_one(&self.db)
        .await?;

        Ok(training)
    }

    pub async fn get_training(&self, training_id: Uuid) -> Result<Option<RecurringTraining>> {
        let training = sqlx::query_as::<_, RecurringTraining>(
            "SELECT * FROM recurring_trainings WHERE id = $1",
        )
        .bind(training_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(training)
    }

    pub async fn list_trainings(&self) -> Result<Vec<RecurringTraining>> {
        let trainings = sqlx::query_as::<_, RecurringTraining>(
            "SELECT * FROM recurring_trainings ORDER BY weekday, start_time",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(trainings)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_training(
        &self,
        training_id: Uuid,
        name: Option<String>,
        weekday: Option<i16>,
        start_time: Option<NaiveTime>,
        end_time: Option<NaiveTime>,
        interval_weeks: Option<i16>,
        valid_from: Option<NaiveDate>,
        valid_until: Option<NaiveDate>,
    ) -> Result<Option<RecurringTraining>> {
        let training = sqlx::query_as::<_, RecurringTraining>(
            r#"
            UPDATE recurring_trainings
            SET name = COALESCE($2, name),
                weekday = COALESCE($3, weekday),
                start_time = COALESCE($4, start_time),
                end_time = COALESCE($5, end_time),
                interval_weeks = COALESCE($6, interval_weeks),
                valid_from = COALESCE($7, valid_from),
                valid_until = COALESCE($8, valid_until),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(training_id)
        .bind(name)
        .bind(weekday)
        .bind(start_time)
        .bind(end_time)
        .bind(interval_weeks)
        .bind(valid_from)
        .bind(valid_until)
        .fetch_optional(&self.db)
        .await?;

        Ok(training)
    }

    pub async fn delete_training(&self, training_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recurring_trainings WHERE id = $1")
            .bind(training_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Create a group inside a training; None when the training is unknown.
    pub async fn create_group(
        &self,
        training_id: Uuid,
        request: CreateTrainingGroupRequest,
    ) -> Result<Option<TrainingGroup>> {
        let group = sqlx::query_as::<_, TrainingGroup>(
            r#"
            INSERT INTO training_groups (recurring_training_id, name, description)
            SELECT t.id, $2, $3 FROM recurring_trainings t WHERE t.id = $1
            RETURNING *
            "#,
        )
        .bind(training_id)
        .bind(request.name)
        .bind(request.description)
        .fetch_optional(&self.db)
        .await?;

        Ok(group)
    }

    pub async fn list_groups(&self, training_id: Uuid) -> Result<Vec<TrainingGroup>> {
        let groups = sqlx::query_as::<_, TrainingGroup>(
            "SELECT * FROM training_groups WHERE recurring_training_id = $1 ORDER BY name",
        )
        .bind(training_id)
        .fetch_all(&self.db)
        .await?;

        Ok(groups)
    }

    pub async fn delete_group(&self, group_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM training_groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn group_members(&self, group_id: Uuid) -> Result<Vec<Athlete>> {
        let members = sqlx::query_as::<_, Athlete>(
            r#"
            SELECT a.*
            FROM athletes a
            JOIN athlete_assignments aa ON aa.athlete_id = a.id
            WHERE aa.training_group_id = $1
            ORDER BY a.last_name, a.first_name
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.db)
        .await?;

        Ok(members)
    }

    /// Assign a trainer to a group; a new primary demotes the previous one.
    pub async fn assign_trainer(
        &self,
        group_id: Uuid,
        trainer_id: Uuid,
        is_primary: bool,
    ) -> Result<Option<TrainerAssignment>> {
        let mut tx = self.db.begin().await?;

        if is_primary {
            sqlx::query(
                "UPDATE trainer_assignments SET is_primary = FALSE WHERE training_group_id = $1",
            )
            .bind(group_id)
            .execute(&mut *tx)
            .await?;
        }

        let assignment = sqlx::query_as::<_, TrainerAssignment>(
            r#"
            INSERT INTO trainer_assignments (trainer_id, training_group_id, is_primary)
            SELECT t.id, g.id, $3
            FROM trainers t, training_groups g
            WHERE t.id = $1 AND g.id = $2
            ON CONFLICT (trainer_id, training_group_id)
            DO UPDATE SET is_primary = EXCLUDED.is_primary
            RETURNING *
            "#,
        )
        .bind(trainer_id)
        .bind(group_id)
        .bind(is_primary)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(assignment)
    }

    pub async fn remove_trainer(&self, group_id: Uuid, trainer_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM trainer_assignments WHERE training_group_id = $1 AND trainer_id = $2",
        )
        .bind(group_id)
        .bind(trainer_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_group_trainers(&self, group_id: Uuid) -> Result<Vec<TrainerAssignment>> {
        let assignments = sqlx::query_as::<_, TrainerAssignment>(
            "SELECT * FROM trainer_assignments WHERE training_group_id = $1 ORDER BY is_primary DESC",
        )
        .bind(group_id)
        .fetch_all(&self.db)
        .await?;

        Ok(assignments)
    }
}

/// Request-level checks for creating or updating a weekly slot.
pub fn validate_slot(weekday: i16, start_time: NaiveTime, end_time: NaiveTime) -> Result<(), String> {
    if !(0..=6).contains(&weekday) {
        return Err(format!("Weekday must be 0 (Monday) to 6 (Sunday), got {}", weekday));
    }
    if end_time <= start_time {
        return Err("End time must be after start time".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_slot() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        assert!(validate_slot(0, t(17, 0), t(18, 30)).is_ok());
        assert!(validate_slot(7, t(17, 0), t(18, 30)).is_err());
        assert!(validate_slot(0, t(18, 0), t(18, 0)).is_err());
        assert!(validate_slot(0, t(18, 0), t(17, 0)).is_err());
    }
}
