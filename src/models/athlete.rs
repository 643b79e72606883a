use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "approval_status", rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "youth_category", rename_all = "snake_case")]
pub enum YouthCategory {
    U8,
    U10,
    U12,
    U15,
    U18,
    Adult,
}

impl YouthCategory {
    /// Category by age at the start of the season (January 1st of the given year).
    pub fn for_birth_date(birth_date: NaiveDate, season_year: i32) -> Self {
        let age = season_year - birth_date.year();
        match age {
            i32::MIN..=7 => YouthCategory::U8,
            8..=9 => YouthCategory::U10,
            10..=11 => YouthCategory::U12,
            12..=14 => YouthCategory::U15,
            15..=17 => YouthCategory::U18,
            _ => YouthCategory::Adult,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            YouthCategory::U8 => "u8",
            YouthCategory::U10 => "u10",
            YouthCategory::U12 => "u12",
            YouthCategory::U15 => "u15",
            YouthCategory::U18 => "u18",
            YouthCategory::Adult => "adult",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Athlete {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub category: YouthCategory,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub status: ApprovalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Athlete {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn contact_email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterAthleteRequest {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAthleteRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub emergency_contact: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approve: bool,
    /// Optional immediate group assignment on approval.
    pub training_group_id: Option<Uuid>,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youth_category_from_birth_date() {
        let birth = NaiveDate::from_ymd_opt(2018, 6, 1).unwrap();
        assert_eq!(
            YouthCategory::for_birth_date(birth, 2025),
            YouthCategory::U8
        );

        let birth = NaiveDate::from_ymd_opt(2012, 3, 15).unwrap();
        assert_eq!(
            YouthCategory::for_birth_date(birth, 2025),
            YouthCategory::U15
        );

        let birth = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        assert_eq!(
            YouthCategory::for_birth_date(birth, 2025),
            YouthCategory::Adult
        );
    }
}
