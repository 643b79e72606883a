use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{AttendanceStatus, YouthCategory};

/// Attendance of one athlete within one calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyAttendance {
    pub athlete_id: Uuid,
    pub year: i32,
    pub month: u32,
    pub total_sessions: i64,
    pub present: i64,
    pub absent_excused: i64,
    pub absent_unexcused: i64,
    /// present / total, rounded to the nearest integer percent; 0 when empty.
    pub attendance_rate: i32,
}

/// An athlete whose absences within the trailing window reached the threshold.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AbsenceAlert {
    pub athlete_id: Uuid,
    pub athlete_name: String,
    pub absence_count: i64,
    pub excused: i64,
    pub unexcused: i64,
    pub last_absence_date: NaiveDate,
}

/// One attendance record as fetched for the absence scan.
#[derive(Debug, Clone, FromRow)]
pub struct AbsenceScanRow {
    pub athlete_id: Uuid,
    pub athlete_name: String,
    pub status: AttendanceStatus,
    pub date: NaiveDate,
}

/// One attendance record as fetched for the categorized statistics.
#[derive(Debug, Clone, FromRow)]
pub struct CategorizedScanRow {
    pub status: AttendanceStatus,
    pub category: YouthCategory,
    pub training_id: Uuid,
    pub training_name: String,
}

/// Attendance rate of one bucket (a youth category or a recurring training).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceBucket {
    pub label: String,
    pub total: i64,
    pub present: i64,
    pub attendance_rate: i32,
}

#[derive(Debug, Serialize)]
pub struct CategorizedAttendance {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub by_category: Vec<AttendanceBucket>,
    pub by_training: Vec<AttendanceBucket>,
}

/// One completed session joined with its training slot, for payroll.
#[derive(Debug, Clone, FromRow)]
pub struct CompletedSessionRow {
    pub training_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// One trainer-to-training link, for payroll.
#[derive(Debug, Clone, FromRow)]
pub struct TrainerTrainingRow {
    pub trainer_id: Uuid,
    pub trainer_name: String,
    pub hourly_rate_cents: Option<i32>,
    pub training_id: Uuid,
}

/// Payroll report line for one trainer over a date range.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrainerHours {
    pub trainer_id: Uuid,
    pub trainer_name: String,
    pub session_count: i64,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub pay_cents: Option<i64>,
}
