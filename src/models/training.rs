use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A named weekly time slot, e.g. "Youth training, Monday 17:00-18:30".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurringTraining {
    pub id: Uuid,
    pub name: String,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub interval_weeks: i16,
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringTraining {
    pub fn chrono_weekday(&self) -> Weekday {
        match self.weekday {
            0 => Weekday::Mon,
            1 => Weekday::Tue,
            2 => Weekday::Wed,
            3 => Weekday::Thu,
            4 => Weekday::Fri,
            5 => Weekday::Sat,
            _ => Weekday::Sun,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Parse a wall-clock "HH:MM" string (the format the management UI submits).
pub fn parse_wall_clock(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| anyhow!("Invalid time '{}', expected HH:MM", value))
}

pub fn weekday_name(weekday: i16) -> &'static str {
    match weekday {
        0 => "Monday",
        1 => "Tuesday",
        2 => "Wednesday",
        3 => "Thursday",
        4 => "Friday",
        5 => "Saturday",
        _ => "Sunday",
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRecurringTrainingRequest {
    pub name: String,
    pub weekday: i16,
    pub start_time: String,
    pub end_time: String,
    pub interval_weeks: Option<i16>,
    pub valid_from: NaiveDate,
    pub valid_until: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRecurringTrainingRequest {
    pub name: Option<String>,
    pub weekday: Option<i16>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub interval_weeks: Option<i16>,
    pub valid_from: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
}

/// A subdivision of a recurring training, e.g. "Beginners".
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingGroup {
    pub id: Uuid,
    pub recurring_training_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTrainingGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Persistent athlete membership in a training group.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AthleteAssignment {
    pub id: Uuid,
    pub athlete_id: Uuid,
    pub training_group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Trainer responsibility for a training group.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TrainerAssignment {
    pub id: Uuid,
    pub trainer_id: Uuid,
    pub training_group_id: Uuid,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTrainerRequest {
    pub trainer_id: Uuid,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AssignAthleteRequest {
    pub training_group_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wall_clock() {
        assert_eq!(
            parse_wall_clock("17:00").unwrap(),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap()
        );
        assert_eq!(
            parse_wall_clock("08:45:00").unwrap(),
            NaiveTime::from_hms_opt(8, 45, 0).unwrap()
        );
        assert!(parse_wall_clock("25:00").is_err());
        assert!(parse_wall_clock("not a time").is_err());
    }
}
