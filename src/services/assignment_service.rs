use anyhow::Result;
use chrono::NaiveTime;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::{
    weekday_name, AssignmentConflict, AssignmentOutcome, AssignmentValidation, AthleteAssignment,
    ConflictKind, GroupSchedule, SessionAthleteAssignment, SessionReassignmentOutcome,
};

const GROUP_SCHEDULE_SELECT: &str = r#"
    SELECT g.id AS group_id, g.name AS group_name,
           t.id AS training_id, t.name AS training_name,
           t.weekday, t.start_time, t.end_time
    FROM training_groups g
    JOIN recurring_trainings t ON t.id = g.recurring_training_id
"#;

/// Validates athlete-to-group assignments against the club's scheduling
/// rules before anything is written.
#[derive(Clone)]
pub struct AssignmentService {
    db: PgPool,
}

impl AssignmentService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Check whether assigning an athlete to a group is legal. Read-only;
    /// business-rule outcomes are reported as values, never as errors.
    pub async fn validate_assignment(
        &self,
        athlete_id: Uuid,
        new_group_id: Uuid,
    ) -> Result<AssignmentValidation> {
        let mut validation = AssignmentValidation::valid();

        if !athlete_exists(&self.db, athlete_id).await? {
            validation.add_error("Athlete not found");
            return Ok(validation);
        }

        let Some(target) = fetch_group_schedule(&self.db, new_group_id).await? else {
            validation.add_error("Training group not found");
            return Ok(validation);
        };

        let existing = fetch_athlete_schedules(&self.db, athlete_id).await?;
        evaluate_assignment(&target, &existing, &mut validation);

        Ok(validation)
    }

    /// Validate and insert in one transaction, closing the window between
    /// the advisory check and the write.
    pub async fn assign_athlete(
        &self,
        athlete_id: Uuid,
        group_id: Uuid,
    ) -> Result<AssignmentOutcome> {
        let mut tx = self.db.begin().await?;
        let mut validation = AssignmentValidation::valid();

        if !athlete_exists(&mut *tx, athlete_id).await? {
            validation.add_error("Athlete not found");
            return Ok(AssignmentOutcome {
                validation,
                assignment: None,
            });
        }

        let Some(target) = fetch_group_schedule(&mut *tx, group_id).await? else {
            validation.add_error("Training group not found");
            return Ok(AssignmentOutcome {
                validation,
                assignment: None,
            });
        };

        let existing = fetch_athlete_schedules(&mut *tx, athlete_id).await?;
        evaluate_assignment(&target, &existing, &mut validation);

        if !validation.is_valid {
            return Ok(AssignmentOutcome {
                validation,
                assignment: None,
            });
        }

        let assignment = sqlx::query_as::<_, AthleteAssignment>(
            r#"
            INSERT INTO athlete_assignments (athlete_id, training_group_id)
            VALUES ($1, $2)
            ON CONFLICT (athlete_id, training_group_id) DO NOTHING
            RETURNING id, athlete_id, training_group_id, created_at
            "#,
        )
        .bind(athlete_id)
        .bind(group_id)
        .fetch_optional(&mut *tx)
        .await?;

        match assignment {
            Some(assignment) => {
                tx.commit().await?;
                Ok(AssignmentOutcome {
                    validation,
                    assignment: Some(assignment),
                })
            }
            None => {
                validation.add_error(format!(
                    "Athlete is already assigned to group '{}'",
                    target.group_name
                ));
                Ok(AssignmentOutcome {
                    validation,
                    assignment: None,
                })
            }
        }
    }

    pub async fn remove_assignment(&self, athlete_id: Uuid, group_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM athlete_assignments WHERE athlete_id = $1 AND training_group_id = $2",
        )
        .bind(athlete_id)
        .bind(group_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_assignments(&self, athlete_id: Uuid) -> Result<Vec<GroupSchedule>> {
        fetch_athlete_schedules(&self.db, athlete_id).await
    }

    /// Pairwise scan of an athlete's current assignments, for the admin
    /// audit view of already-inconsistent data. O(n²) over n < 20.
    pub async fn get_all_conflicts(&self, athlete_id: Uuid) -> Result<Vec<AssignmentConflict>> {
        let assignments = fetch_athlete_schedules(&self.db, athlete_id).await?;
        Ok(pairwise_conflicts(&assignments))
    }

    /// Validate a one-off session-level reassignment (drag-and-drop move of
    /// an athlete into another group for a single session).
    pub async fn validate_session_reassignment(
        &self,
        athlete_id: Uuid,
        session_id: Uuid,
        target_group_id: Uuid,
    ) -> Result<AssignmentValidation> {
        evaluate_session_reassignment(&self.db, athlete_id, session_id, target_group_id).await
    }

    /// Validate and upsert the session-level override; a prior override
    /// for the same (session, athlete) pair is replaced.
    pub async fn reassign_for_session(
        &self,
        athlete_id: Uuid,
        session_id: Uuid,
        target_group_id: Uuid,
    ) -> Result<SessionReassignmentOutcome> {
        let mut tx = self.db.begin().await?;

        let validation =
            evaluate_session_reassignment(&mut *tx, athlete_id, session_id, target_group_id)
                .await?;

        if !validation.is_valid {
            return Ok(SessionReassignmentOutcome {
                validation,
                reassignment: None,
            });
        }

        let reassignment = sqlx::query_as::<_, SessionAthleteAssignment>(
            r#"
            INSERT INTO session_athlete_assignments (training_session_id, athlete_id, session_group_id)
            SELECT $1, $2, sg.id
            FROM session_groups sg
            WHERE sg.training_session_id = $1 AND sg.training_group_id = $3
            ON CONFLICT (training_session_id, athlete_id)
            DO UPDATE SET session_group_id = EXCLUDED.session_group_id
            RETURNING id, training_session_id, athlete_id, session_group_id, created_at
            "#,
        )
        .bind(session_id)
        .bind(athlete_id)
        .bind(target_group_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SessionReassignmentOutcome {
            validation,
            reassignment: Some(reassignment),
        })
    }
}

/// Half-open interval overlap: back-to-back slots (end A == start B) do
/// not overlap.
pub fn intervals_overlap(
    start_a: NaiveTime,
    end_a: NaiveTime,
    start_b: NaiveTime,
    end_b: NaiveTime,
) -> bool {
    start_a < end_b && end_a > start_b
}

/// Apply the assignment rules for one candidate group against the
/// athlete's existing persistent assignments.
pub fn evaluate_assignment(
    target: &GroupSchedule,
    existing: &[GroupSchedule],
    validation: &mut AssignmentValidation,
) {
    for current in existing {
        if current.training_id == target.training_id {
            validation.add_error(format!(
                "Athlete is already in group '{}' of training '{}'",
                current.group_name, current.training_name
            ));
        } else if current.weekday == target.weekday
            && intervals_overlap(
                target.start_time,
                target.end_time,
                current.start_time,
                current.end_time,
            )
        {
            validation.add_warning(format!(
                "Overlaps with '{}' ('{}', {} {}-{})",
                current.group_name,
                current.training_name,
                weekday_name(current.weekday),
                current.start_time.format("%H:%M"),
                current.end_time.format("%H:%M"),
            ));
        }
    }
}

/// Every colliding pair among the given assignments.
pub fn pairwise_conflicts(assignments: &[GroupSchedule]) -> Vec<AssignmentConflict> {
    let mut conflicts = Vec::new();

    for i in 0..assignments.len() {
        for j in (i + 1)..assignments.len() {
            let a = &assignments[i];
            let b = &assignments[j];

            let kind = if a.training_id == b.training_id {
                ConflictKind::SameTraining
            } else if a.weekday == b.weekday
                && intervals_overlap(a.start_time, a.end_time, b.start_time, b.end_time)
            {
                ConflictKind::TimeOverlap
            } else {
                continue;
            };

            conflicts.push(AssignmentConflict {
                kind,
                group1: a.group_name.clone(),
                group2: b.group_name.clone(),
                training1: a.training_name.clone(),
                training2: b.training_name.clone(),
                weekday: weekday_name(a.weekday).to_string(),
                time1: format!(
                    "{}-{}",
                    a.start_time.format("%H:%M"),
                    a.end_time.format("%H:%M")
                ),
                time2: format!(
                    "{}-{}",
                    b.start_time.format("%H:%M"),
                    b.end_time.format("%H:%M")
                ),
            });
        }
    }

    conflicts
}

async fn evaluate_session_reassignment<'e, E>(
    executor: E,
    athlete_id: Uuid,
    session_id: Uuid,
    target_group_id: Uuid,
) -> Result<AssignmentValidation>
where
    E: PgExecutor<'e>,
{
    let mut validation = AssignmentValidation::valid();

    let row = sqlx::query_as::<_, SessionReassignmentProbe>(
        r#"
        SELECT EXISTS(SELECT 1 FROM athletes WHERE id = $1) AS athlete_exists,
               EXISTS(SELECT 1 FROM training_sessions WHERE id = $2) AS session_exists,
               EXISTS(
                   SELECT 1 FROM session_groups
                   WHERE training_session_id = $2 AND training_group_id = $3
               ) AS session_group_exists,
               EXISTS(
                   SELECT 1 FROM session_athlete_assignments
                   WHERE training_session_id = $2 AND athlete_id = $1
               ) AS prior_reassignment
        "#,
    )
    .bind(athlete_id)
    .bind(session_id)
    .bind(target_group_id)
    .fetch_one(executor)
    .await?;

    if !row.athlete_exists {
        validation.add_error("Athlete not found");
    }
    if !row.session_exists {
        validation.add_error("Training session not found");
    }
    if row.athlete_exists && row.session_exists && !row.session_group_exists {
        validation.add_error("Target group is not part of this session");
    }
    if validation.is_valid && row.prior_reassignment {
        validation.add_warning("An earlier reassignment for this session will be overwritten");
    }

    Ok(validation)
}

#[derive(sqlx::FromRow)]
struct SessionReassignmentProbe {
    athlete_exists: bool,
    session_exists: bool,
    session_group_exists: bool,
    prior_reassignment: bool,
}

async fn athlete_exists<'e, E>(executor: E, athlete_id: Uuid) -> Result<bool>
where
    E: PgExecutor<'e>,
{
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM athletes WHERE id = $1)")
        .bind(athlete_id)
        .fetch_one(executor)
        .await?;

    Ok(exists)
}

async fn fetch_group_schedule<'e, E>(executor: E, group_id: Uuid) -> Result<Option<GroupSchedule>>
where
    E: PgExecutor<'e>,
{
    let query = format!("{GROUP_SCHEDULE_SELECT} WHERE g.id = $1");

    let schedule = sqlx::query_as::<_, GroupSchedule>(&query)
        .bind(group_id)
        .fetch_optional(executor)
        .await?;

    Ok(schedule)
}

async fn fetch_athlete_schedules<'e, E>(executor: E, athlete_id: Uuid) -> Result<Vec<GroupSchedule>>
where
    E: PgExecutor<'e>,
{
    let query = format!(
        r#"{GROUP_SCHEDULE_SELECT}
        JOIN athlete_assignments aa ON aa.training_group_id = g.id
        WHERE aa.athlete_id = $1
        ORDER BY t.weekday, t.start_time"#
    );

    let schedules = sqlx::query_as::<_, GroupSchedule>(&query)
        .bind(athlete_id)
        .fetch_all(executor)
        .await?;

    Ok(schedules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(
        group: &str,
        training: &str,
        weekday: i16,
        start: (u32, u32),
        end: (u32, u32),
    ) -> GroupSchedule {
        GroupSchedule {
            group_id: Uuid::new_v4(),
            group_name: group.to_string(),
            training_id: Uuid::new_v4(),
            training_name: training.to_string(),
            weekday,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
        }
    }

    #[test]
    fn test_overlap_is_strict_on_both_ends() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();

        assert!(intervals_overlap(t(17, 0), t(18, 30), t(18, 0), t(19, 0)));
        // back-to-back slots do not overlap
        assert!(!intervals_overlap(t(17, 0), t(18, 0), t(18, 0), t(19, 0)));
        assert!(!intervals_overlap(t(18, 0), t(19, 0), t(17, 0), t(18, 0)));
        // containment overlaps
        assert!(intervals_overlap(t(17, 0), t(19, 0), t(17, 30), t(18, 0)));
    }

    #[test]
    fn test_same_training_is_a_hard_error() {
        let existing = schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 30));
        let mut target = schedule("Advanced", "Monday Youth", 0, (17, 0), (18, 30));
        target.training_id = existing.training_id;

        let mut validation = AssignmentValidation::valid();
        evaluate_assignment(&target, &[existing], &mut validation);

        assert!(!validation.is_valid);
        assert_eq!(validation.errors.len(), 1);
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn test_overlapping_distinct_trainings_warn_only() {
        let existing = schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 30));
        let target = schedule("Sprint", "Monday Track", 0, (18, 0), (19, 0));

        let mut validation = AssignmentValidation::valid();
        evaluate_assignment(&target, &[existing], &mut validation);

        assert!(validation.is_valid);
        assert!(validation.errors.is_empty());
        assert_eq!(validation.warnings.len(), 1);
    }

    #[test]
    fn test_touching_intervals_produce_no_warning() {
        let existing = schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 0));
        let target = schedule("Sprint", "Monday Track", 0, (18, 0), (19, 0));

        let mut validation = AssignmentValidation::valid();
        evaluate_assignment(&target, &[existing], &mut validation);

        assert!(validation.is_valid);
        assert!(validation.warnings.is_empty());
    }

    #[test]
    fn test_pairwise_conflicts() {
        let a = schedule("Beginners", "Monday Youth", 0, (17, 0), (18, 30));
        let mut b = schedule("Advanced", "Monday Youth", 0, (17, 0), (18, 30));
        b.training_id = a.training_id;
        let c = schedule("Sprint", "Monday Track", 0, (18, 0), (19, 0));
        let d = schedule("Kraft", "Friday Strength", 4, (18, 0), (19, 0));

        let conflicts = pairwise_conflicts(&[a, b, c, d]);

        let kinds: Vec<ConflictKind> = conflicts.iter().map(|c| c.kind).collect();
        // a-b same training; a-c and b-c overlap; d collides with nothing
        assert_eq!(kinds.len(), 3);
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == ConflictKind::SameTraining)
                .count(),
            1
        );
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == ConflictKind::TimeOverlap)
                .count(),
            2
        );
    }
}
