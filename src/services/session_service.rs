use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    AttendanceRecord, Cancellation, CancellationRequest, GenerateSessionsResponse,
    MarkAttendanceRequest, RecurringTraining, SessionDetail, SessionGroup, TrainingSession,
    UpdateSessionGroupRequest,
};

#[derive(Clone)]
pub struct SessionService {
    db: PgPool,
}

impl SessionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Materialize sessions (and their session groups) for one training
    /// over the given window. Idempotent: existing occurrences are kept.
    pub async fn generate_for_training(
        &self,
        training_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Option<GenerateSessionsResponse>> {
        let training = sqlx::query_as::<_, RecurringTraining>(
            "SELECT * FROM recurring_trainings WHERE id = $1",
        )
        .bind(training_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(training) = training else {
            return Ok(None);
        };

        let mut sessions_created = 0u64;
        for date in occurrence_dates(&training, from, to) {
            let result = sqlx::query(
                r#"
                INSERT INTO training_sessions (recurring_training_id, date)
                VALUES ($1, $2)
                ON CONFLICT (recurring_training_id, date) DO NOTHING
                "#,
            )
            .bind(training_id)
            .bind(date)
            .execute(&self.db)
            .await?;

            sessions_created += result.rows_affected();
        }

        // Materialize one session group per (session, training group)
        let result = sqlx::query(
            r#"
            INSERT INTO session_groups (training_session_id, training_group_id)
            SELECT s.id, g.id
            FROM training_sessions s
            JOIN training_groups g ON g.recurring_training_id = s.recurring_training_id
            WHERE s.recurring_training_id = $1 AND s.date >= $2 AND s.date <= $3
            ON CONFLICT (training_session_id, training_group_id) DO NOTHING
            "#,
        )
        .bind(training_id)
        .bind(from)
        .bind(to)
        .execute(&self.db)
        .await?;

        Ok(Some(GenerateSessionsResponse {
            sessions_created,
            session_groups_created: result.rows_affected(),
        }))
    }

    /// Generate sessions for every training whose validity window touches
    /// the given range.
    pub async fn generate_all(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<GenerateSessionsResponse> {
        let trainings = sqlx::query_as::<_, RecurringTraining>(
            r#"
            SELECT * FROM recurring_trainings
            WHERE valid_from <= $2 AND (valid_until IS NULL OR valid_until >= $1)
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.db)
        .await?;

        let mut totals = GenerateSessionsResponse {
            sessions_created: 0,
            session_groups_created: 0,
        };

        for training in trainings {
            if let Some(generated) = self.generate_for_training(training.id, from, to).await? {
                totals.sessions_created += generated.sessions_created;
                totals.session_groups_created += generated.session_groups_created;
            }
        }

        Ok(totals)
    }

    pub async fn list_sessions(
        &self,
        training_id: Option<Uuid>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TrainingSession>> {
        let mut query =
            "SELECT * FROM training_sessions WHERE date >= $1 AND date <= $2".to_string();
        if training_id.is_some() {
            query.push_str(" AND recurring_training_id = $3");
        }
        query.push_str(" ORDER BY date ASC");

        let mut query_builder = sqlx::query_as::<_, TrainingSession>(&query)
            .bind(from)
            .bind(to);
        if let Some(training_id) = training_id {
            query_builder = query_builder.bind(training_id);
        }

        let sessions = query_builder.fetch_all(&self.db).await?;

        Ok(sessions)
    }

    pub async fn get_session_detail(&self, session_id: Uuid) -> Result<Option<SessionDetail>> {
        let session = sqlx::query_as::<_, TrainingSession>(
            "SELECT * FROM training_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.db)
        .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        let training_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM recurring_trainings WHERE id = $1",
        )
        .bind(session.recurring_training_id)
        .fetch_one(&self.db)
        .await?;

        let groups = sqlx::query_as::<_, SessionGroup>(
            "SELECT * FROM session_groups WHERE training_session_id = $1 ORDER BY created_at",
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;

        Ok(Some(SessionDetail {
            session,
            training_name,
            groups,
        }))
    }

    pub async fn set_cancelled(
        &self,
        session_id: Uuid,
        cancelled: bool,
    ) -> Result<Option<TrainingSession>> {
        let session = sqlx::query_as::<_, TrainingSession>(
            "UPDATE training_sessions SET cancelled = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(session_id)
        .bind(cancelled)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    pub async fn set_completed(
        &self,
        session_id: Uuid,
        completed: bool,
    ) -> Result<Option<TrainingSession>> {
        let session = sqlx::query_as::<_, TrainingSession>(
            "UPDATE training_sessions SET completed = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(session_id)
        .bind(completed)
        .fetch_optional(&self.db)
        .await?;

        Ok(session)
    }

    /// Per-occurrence exercises and notes on a session group.
    pub async fn update_session_group(
        &self,
        session_id: Uuid,
        group_id: Uuid,
        request: UpdateSessionGroupRequest,
    ) -> Result<Option<SessionGroup>> {
        let group = sqlx::query_as::<_, SessionGroup>(
            r#"
            UPDATE session_groups
            SET exercises = COALESCE($3, exercises),
                notes = COALESCE($4, notes),
                updated_at = NOW()
            WHERE training_session_id = $1 AND training_group_id = $2
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(group_id)
        .bind(request.exercises)
        .bind(request.notes)
        .fetch_optional(&self.db)
        .await?;

        Ok(group)
    }

    /// Upsert one attendance record; re-marking overwrites the status.
    pub async fn mark_attendance(
        &self,
        session_id: Uuid,
        request: MarkAttendanceRequest,
        recorded_by: Option<Uuid>,
    ) -> Result<Option<AttendanceRecord>> {
        if !self.session_and_athlete_exist(session_id, request.athlete_id).await? {
            return Ok(None);
        }

        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance_records (training_session_id, athlete_id, status, recorded_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (training_session_id, athlete_id)
            DO UPDATE SET status = EXCLUDED.status,
                          recorded_by = EXCLUDED.recorded_by,
                          updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(request.athlete_id)
        .bind(request.status)
        .bind(recorded_by)
        .fetch_one(&self.db)
        .await?;

        Ok(Some(record))
    }

    pub async fn list_attendance(&self, session_id: Uuid) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance_records WHERE training_session_id = $1",
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    /// Record an athlete's advance cancellation for one session.
    pub async fn record_cancellation(
        &self,
        session_id: Uuid,
        request: CancellationRequest,
    ) -> Result<Option<Cancellation>> {
        if !self.session_and_athlete_exist(session_id, request.athlete_id).await? {
            return Ok(None);
        }

        let cancellation = sqlx::query_as::<_, Cancellation>(
            r#"
            INSERT INTO cancellations (training_session_id, athlete_id, reason)
            VALUES ($1, $2, $3)
            ON CONFLICT (training_session_id, athlete_id)
            DO UPDATE SET reason = EXCLUDED.reason
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(request.athlete_id)
        .bind(request.reason)
        .fetch_one(&self.db)
        .await?;

        Ok(Some(cancellation))
    }

    pub async fn list_cancellations(&self, session_id: Uuid) -> Result<Vec<Cancellation>> {
        let cancellations = sqlx::query_as::<_, Cancellation>(
            "SELECT * FROM cancellations WHERE training_session_id = $1",
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;

        Ok(cancellations)
    }

    async fn session_and_athlete_exist(&self, session_id: Uuid, athlete_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM training_sessions WHERE id = $1)
               AND EXISTS(SELECT 1 FROM athletes WHERE id = $2)
            "#,
        )
        .bind(session_id)
        .bind(athlete_id)
        .fetch_one(&self.db)
        .await?;

        Ok(exists)
    }
}

/// Expand a recurring training into concrete occurrence dates within
/// `[from, to]`, clipped to the training's validity window. Occurrences
/// are anchored to the first matching weekday on or after `valid_from`
/// and repeat every `interval_weeks` weeks.
pub fn occurrence_dates(
    training: &RecurringTraining,
    from: NaiveDate,
    to: NaiveDate,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let interval = training.interval_weeks.max(1) as i64;

    let anchor_offset = (7 + training.weekday as i64
        - training.valid_from.weekday().num_days_from_monday() as i64)
        % 7;
    let anchor = training.valid_from + Duration::days(anchor_offset);

    let window_end = match training.valid_until {
        Some(valid_until) => to.min(valid_until),
        None => to,
    };

    let mut date = anchor;
    if from > anchor {
        // Jump close to `from` without losing the anchor alignment
        let periods = (from - anchor).num_days() / (7 * interval);
        date = anchor + Duration::weeks(periods * interval);
        while date < from {
            date += Duration::weeks(interval);
        }
    }

    while date <= window_end {
        dates.push(date);
        date += Duration::weeks(interval);
    }

    dates
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};

    fn training(
        weekday: i16,
        interval_weeks: i16,
        valid_from: NaiveDate,
        valid_until: Option<NaiveDate>,
    ) -> RecurringTraining {
        RecurringTraining {
            id: Uuid::new_v4(),
            name: "Youth training".to_string(),
            weekday,
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            interval_weeks,
            valid_from,
            valid_until,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_occurrences_anchor_to_first_matching_weekday() {
        // 2025-01-01 is a Wednesday; first Monday on or after is 2025-01-06
        let training = training(0, 1, date(2025, 1, 1), None);

        let dates = occurrence_dates(&training, date(2025, 1, 1), date(2025, 1, 31));

        assert_eq!(
            dates,
            vec![
                date(2025, 1, 6),
                date(2025, 1, 13),
                date(2025, 1, 20),
                date(2025, 1, 27),
            ]
        );
    }

    #[test]
    fn test_biweekly_interval_skips_alternate_weeks() {
        let training = training(0, 2, date(2025, 1, 6), None);

        let dates = occurrence_dates(&training, date(2025, 1, 1), date(2025, 2, 10));

        assert_eq!(
            dates,
            vec![date(2025, 1, 6), date(2025, 1, 20), date(2025, 2, 3)]
        );
    }

    #[test]
    fn test_window_start_preserves_anchor_alignment() {
        // Biweekly from Jan 6; asking for February must continue the
        // Jan 6 + 2k weeks series, not restart it
        let training = training(0, 2, date(2025, 1, 6), None);

        let dates = occurrence_dates(&training, date(2025, 2, 1), date(2025, 3, 10));

        assert_eq!(
            dates,
            vec![date(2025, 2, 3), date(2025, 2, 17), date(2025, 3, 3)]
        );
    }

    #[test]
    fn test_valid_until_clips_the_series() {
        let training = training(0, 1, date(2025, 1, 6), Some(date(2025, 1, 20)));

        let dates = occurrence_dates(&training, date(2025, 1, 1), date(2025, 3, 1));

        assert_eq!(
            dates,
            vec![date(2025, 1, 6), date(2025, 1, 13), date(2025, 1, 20)]
        );
    }

    #[test]
    fn test_empty_when_window_precedes_validity() {
        let training = training(0, 1, date(2025, 6, 1), None);

        let dates = occurrence_dates(&training, date(2025, 1, 1), date(2025, 1, 31));

        assert!(dates.is_empty());
    }
}
