use chrono::NaiveTime;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{AthleteAssignment, SessionAthleteAssignment};

/// Outcome of an assignment validation. Hard errors block the write;
/// warnings are informational and do not prevent submission.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AssignmentValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl AssignmentValidation {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// A training group together with its parent training's weekly slot,
/// as seen by the conflict validator.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct GroupSchedule {
    pub group_id: Uuid,
    pub group_name: String,
    pub training_id: Uuid,
    pub training_name: String,
    pub weekday: i16,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Two groups of the same recurring training; never allowed.
    SameTraining,
    /// Distinct trainings on the same weekday with overlapping times.
    TimeOverlap,
}

/// A pair of existing assignments that collide, for the admin audit view.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentConflict {
    pub kind: ConflictKind,
    pub group1: String,
    pub group2: String,
    pub training1: String,
    pub training2: String,
    pub weekday: String,
    pub time1: String,
    pub time2: String,
}

/// Result of `assign_athlete`: the validation outcome plus the created
/// row when the assignment went through.
#[derive(Debug, Serialize)]
pub struct AssignmentOutcome {
    pub validation: AssignmentValidation,
    pub assignment: Option<AthleteAssignment>,
}

/// Result of a session-level reassignment.
#[derive(Debug, Serialize)]
pub struct SessionReassignmentOutcome {
    pub validation: AssignmentValidation,
    pub reassignment: Option<SessionAthleteAssignment>,
}
