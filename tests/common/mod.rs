#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use club_manager::models::{
    AbsenceScanRow, AttendanceStatus, CategorizedScanRow, GroupSchedule, RecurringTraining,
    YouthCategory,
};

/// Fixture builders shared between the test suites.
pub struct Fixtures;

impl Fixtures {
    pub fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    pub fn group_schedule(
        group_name: &str,
        training_name: &str,
        weekday: i16,
        start: (u32, u32),
        end: (u32, u32),
    ) -> GroupSchedule {
        GroupSchedule {
            group_id: Uuid::new_v4(),
            group_name: group_name.to_string(),
            training_id: Uuid::new_v4(),
            training_name: training_name.to_string(),
            weekday,
            start_time: Self::time(start.0, start.1),
            end_time: Self::time(end.0, end.1),
        }
    }

    pub fn recurring_training(
        weekday: i16,
        interval_weeks: i16,
        valid_from: NaiveDate,
        valid_until: Option<NaiveDate>,
    ) -> RecurringTraining {
        RecurringTraining {
            id: Uuid::new_v4(),
            name: "Youth training".to_string(),
            weekday,
            start_time: Self::time(17, 0),
            end_time: Self::time(18, 30),
            interval_weeks,
            valid_from,
            valid_until,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    pub fn absence_row(
        athlete_id: Uuid,
        name: &str,
        status: AttendanceStatus,
        date: NaiveDate,
    ) -> AbsenceScanRow {
        AbsenceScanRow {
            athlete_id,
            athlete_name: name.to_string(),
            status,
            date,
        }
    }

    pub fn categorized_row(
        status: AttendanceStatus,
        category: YouthCategory,
        training_id: Uuid,
        training_name: &str,
    ) -> CategorizedScanRow {
        CategorizedScanRow {
            status,
            category,
            training_id,
            training_name: training_name.to_string(),
        }
    }
}
