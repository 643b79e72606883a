use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    AbsenceAlert, AbsenceScanRow, AttendanceBucket, AttendanceStatus, CategorizedAttendance,
    CategorizedScanRow, CompletedSessionRow, MonthlyAttendance, TrainerHours, TrainerTrainingRow,
};

/// Read-only aggregation over attendance data: dashboard rates, absence
/// alerting and the trainer-hours payroll report. All operations are a
/// single bulk fetch followed by an in-memory pass; fine at club scale.
#[derive(Clone)]
pub struct StatisticsService {
    db: PgPool,
}

impl StatisticsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Attendance of one athlete within calendar-month bounds.
    pub async fn monthly_attendance(
        &self,
        athlete_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<MonthlyAttendance> {
        let month_start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("Invalid month {}-{}", year, month))?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .expect("first of month is always valid");

        let statuses = sqlx::query_scalar::<_, AttendanceStatus>(
            r#"
            SELECT ar.status
            FROM attendance_records ar
            JOIN training_sessions s ON s.id = ar.training_session_id
            WHERE ar.athlete_id = $1 AND s.date >= $2 AND s.date < $3
            "#,
        )
        .bind(athlete_id)
        .bind(month_start)
        .bind(next_month)
        .fetch_all(&self.db)
        .await?;

        let total = statuses.len() as i64;
        let present = statuses
            .iter()
            .filter(|s| **s == AttendanceStatus::Present)
            .count() as i64;
        let excused = statuses
            .iter()
            .filter(|s| **s == AttendanceStatus::AbsentExcused)
            .count() as i64;
        let unexcused = statuses
            .iter()
            .filter(|s| **s == AttendanceStatus::AbsentUnexcused)
            .count() as i64;

        Ok(MonthlyAttendance {
            athlete_id,
            year,
            month,
            total_sessions: total,
            present,
            absent_excused: excused,
            absent_unexcused: unexcused,
            attendance_rate: rate_percent(present, total),
        })
    }

    /// Athletes whose absences within the trailing window reached the
    /// threshold. Both excused and unexcused absences count.
    pub async fn detect_absence_alerts(
        &self,
        threshold: i64,
        window_days: i64,
    ) -> Result<Vec<AbsenceAlert>> {
        let today = Utc::now().date_naive();
        let window_start = today - Duration::days(window_days);

        let rows = sqlx::query_as::<_, AbsenceScanRow>(
            r#"
            SELECT ar.athlete_id,
                   a.first_name || ' ' || a.last_name AS athlete_name,
                   ar.status, s.date
            FROM attendance_records ar
            JOIN training_sessions s ON s.id = ar.training_session_id
            JOIN athletes a ON a.id = ar.athlete_id
            WHERE s.completed = TRUE AND s.cancelled = FALSE
              AND s.date >= $1 AND s.date <= $2
              AND ar.status <> 'present'
            "#,
        )
        .bind(window_start)
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        Ok(aggregate_absence_alerts(&rows, threshold))
    }

    /// Attendance rates grouped by youth category and by recurring
    /// training over the given range.
    pub async fn categorized_attendance(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<CategorizedAttendance> {
        let rows = sqlx::query_as::<_, CategorizedScanRow>(
            r#"
            SELECT ar.status, a.category, t.id AS training_id, t.name AS training_name
            FROM attendance_records ar
            JOIN training_sessions s ON s.id = ar.training_session_id
            JOIN recurring_trainings t ON t.id = s.recurring_training_id
            JOIN athletes a ON a.id = ar.athlete_id
            WHERE s.date >= $1 AND s.date <= $2
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.db)
        .await?;

        let (by_category, by_training) = bucket_attendance(&rows);

        Ok(CategorizedAttendance {
            date_from,
            date_to,
            by_category,
            by_training,
        })
    }

    /// Payroll report: hours led per trainer over completed, non-cancelled
    /// sessions of trainings they are assigned to.
    pub async fn trainer_hours(
        &self,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> Result<Vec<TrainerHours>> {
        let sessions = sqlx::query_as::<_, CompletedSessionRow>(
            r#"
            SELECT t.id AS training_id, s.date, t.start_time, t.end_time
            FROM training_sessions s
            JOIN recurring_trainings t ON t.id = s.recurring_training_id
            WHERE s.completed = TRUE AND s.cancelled = FALSE
              AND s.date >= $1 AND s.date <= $2
            "#,
        )
        .bind(date_from)
        .bind(date_to)
        .fetch_all(&self.db)
        .await?;

        let links = sqlx::query_as::<_, TrainerTrainingRow>(
            r#"
            SELECT DISTINCT tr.id AS trainer_id, tr.name AS trainer_name,
                   tr.hourly_rate_cents, g.recurring_training_id AS training_id
            FROM trainer_assignments ta
            JOIN trainers tr ON tr.id = ta.trainer_id
            JOIN training_groups g ON g.id = ta.training_group_id
            WHERE tr.active = TRUE
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(compute_trainer_hours(&sessions, &links))
    }
}

/// present / total as nearest integer percent; 0 for an empty month.
pub fn rate_percent(present: i64, total: i64) -> i32 {
    if total == 0 {
        return 0;
    }
    ((present as f64 / total as f64) * 100.0).round() as i32
}

/// Tally absences per athlete and keep those at or above the threshold,
/// ordered by count descending.
pub fn aggregate_absence_alerts(rows: &[AbsenceScanRow], threshold: i64) -> Vec<AbsenceAlert> {
    let mut tallies: HashMap<Uuid, AbsenceAlert> = HashMap::new();

    for row in rows {
        let entry = tallies.entry(row.athlete_id).or_insert_with(|| AbsenceAlert {
            athlete_id: row.athlete_id,
            athlete_name: row.athlete_name.clone(),
            absence_count: 0,
            excused: 0,
            unexcused: 0,
            last_absence_date: row.date,
        });

        entry.absence_count += 1;
        match row.status {
            AttendanceStatus::AbsentExcused => entry.excused += 1,
            AttendanceStatus::AbsentUnexcused => entry.unexcused += 1,
            AttendanceStatus::Present => {}
        }
        if row.date > entry.last_absence_date {
            entry.last_absence_date = row.date;
        }
    }

    let mut alerts: Vec<AbsenceAlert> = tallies
        .into_values()
        .filter(|alert| alert.absence_count >= threshold)
        .collect();

    alerts.sort_by(|a, b| {
        b.absence_count
            .cmp(&a.absence_count)
            .then_with(|| a.athlete_name.cmp(&b.athlete_name))
    });

    alerts
}

/// Group attendance records into per-category and per-training buckets.
pub fn bucket_attendance(
    rows: &[CategorizedScanRow],
) -> (Vec<AttendanceBucket>, Vec<AttendanceBucket>) {
    let mut by_category: HashMap<String, (i64, i64)> = HashMap::new();
    let mut by_training: HashMap<String, (i64, i64)> = HashMap::new();

    for row in rows {
        let present = (row.status == AttendanceStatus::Present) as i64;

        let category = by_category
            .entry(row.category.as_str().to_string())
            .or_insert((0, 0));
        category.0 += 1;
        category.1 += present;

        let training = by_training
            .entry(row.training_name.clone())
            .or_insert((0, 0));
        training.0 += 1;
        training.1 += present;
    }

    (to_buckets(by_category), to_buckets(by_training))
}

fn to_buckets(groups: HashMap<String, (i64, i64)>) -> Vec<AttendanceBucket> {
    let mut buckets: Vec<AttendanceBucket> = groups
        .into_iter()
        .map(|(label, (total, present))| AttendanceBucket {
            label,
            total,
            present,
            attendance_rate: rate_percent(present, total),
        })
        .collect();

    buckets.sort_by(|a, b| a.label.cmp(&b.label));
    buckets
}

/// Sum session durations per trainer across the trainings they lead.
pub fn compute_trainer_hours(
    sessions: &[CompletedSessionRow],
    links: &[TrainerTrainingRow],
) -> Vec<TrainerHours> {
    let mut per_training: HashMap<Uuid, (i64, i64)> = HashMap::new();
    for session in sessions {
        let minutes = (session.end_time - session.start_time).num_minutes();
        let entry = per_training.entry(session.training_id).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += minutes;
    }

    let mut per_trainer: HashMap<Uuid, TrainerHours> = HashMap::new();
    for link in links {
        let Some(&(session_count, minutes)) = per_training.get(&link.training_id) else {
            continue;
        };

        let entry = per_trainer
            .entry(link.trainer_id)
            .or_insert_with(|| TrainerHours {
                trainer_id: link.trainer_id,
                trainer_name: link.trainer_name.clone(),
                session_count: 0,
                total_minutes: 0,
                total_hours: 0.0,
                pay_cents: None,
            });

        entry.session_count += session_count;
        entry.total_minutes += minutes;
        entry.total_hours = entry.total_minutes as f64 / 60.0;
        entry.pay_cents = link
            .hourly_rate_cents
            .map(|rate| rate as i64 * entry.total_minutes / 60);
    }

    let mut report: Vec<TrainerHours> = per_trainer.into_values().collect();
    report.sort_by(|a, b| a.trainer_name.cmp(&b.trainer_name));
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn test_rate_percent_rounds_to_nearest() {
        assert_eq!(rate_percent(2, 3), 67);
        assert_eq!(rate_percent(1, 3), 33);
        assert_eq!(rate_percent(3, 4), 75);
        assert_eq!(rate_percent(4, 4), 100);
    }

    #[test]
    fn test_rate_percent_empty_month_is_zero() {
        assert_eq!(rate_percent(0, 0), 0);
    }

    #[test]
    fn test_trainer_hours_sum_across_trainings() {
        let training_a = Uuid::new_v4();
        let training_b = Uuid::new_v4();
        let trainer = Uuid::new_v4();

        let session = |training_id, day| CompletedSessionRow {
            training_id,
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
        };

        let sessions = vec![
            session(training_a, 3),
            session(training_a, 10),
            session(training_b, 5),
        ];
        let links = vec![
            TrainerTrainingRow {
                trainer_id: trainer,
                trainer_name: "Alex Meier".to_string(),
                hourly_rate_cents: Some(1200),
                training_id: training_a,
            },
            TrainerTrainingRow {
                trainer_id: trainer,
                trainer_name: "Alex Meier".to_string(),
                hourly_rate_cents: Some(1200),
                training_id: training_b,
            },
        ];

        let report = compute_trainer_hours(&sessions, &links);

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].session_count, 3);
        assert_eq!(report[0].total_minutes, 270);
        assert_eq!(report[0].total_hours, 4.5);
        assert_eq!(report[0].pay_cents, Some(5400));
    }

    #[test]
    fn test_trainer_without_completed_sessions_is_omitted() {
        let trainer = Uuid::new_v4();
        let links = vec![TrainerTrainingRow {
            trainer_id: trainer,
            trainer_name: "Alex Meier".to_string(),
            hourly_rate_cents: None,
            training_id: Uuid::new_v4(),
        }];

        let report = compute_trainer_hours(&[], &links);

        assert!(report.is_empty());
    }
}
