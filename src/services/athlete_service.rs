use anyhow::Result;
use chrono::{Datelike, Utc};
use regex::Regex;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ApprovalStatus, Athlete, RegisterAthleteRequest, UpdateAthleteRequest, YouthCategory};

#[derive(Clone)]
pub struct AthleteService {
    db: PgPool,
}

impl AthleteService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a pending athlete from a public registration.
    pub async fn register(&self, request: RegisterAthleteRequest) -> Result<Athlete> {
        let category = YouthCategory::for_birth_date(request.birth_date, Utc::now().year());

        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            INSERT INTO athletes (
                first_name, last_name, birth_date, category, email, phone,
                guardian_name, guardian_phone, emergency_contact, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending')
            RETURNING *
            "#,
        )
        .bind(&request.first_name)
        .bind(&request.last_name)
        .bind(request.birth_date)
        .bind(category)
        .bind(&request.email)
        .bind(&request.phone)
        .bind(&request.guardian_name)
        .bind(&request.guardian_phone)
        .bind(&request.emergency_contact)
        .fetch_one(&self.db)
        .await?;

        Ok(athlete)
    }

    pub async fn get_by_id(&self, athlete_id: Uuid) -> Result<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>("SELECT * FROM athletes WHERE id = $1")
            .bind(athlete_id)
            .fetch_optional(&self.db)
            .await?;

        Ok(athlete)
    }

    pub async fn list(
        &self,
        status: Option<ApprovalStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Athlete>> {
        let mut query = "SELECT * FROM athletes".to_string();
        if status.is_some() {
            query.push_str(" WHERE status = $3");
        }
        query.push_str(" ORDER BY last_name, first_name LIMIT $1 OFFSET $2");

        let mut query_builder = sqlx::query_as::<_, Athlete>(&query).bind(limit).bind(offset);
        if let Some(status) = status {
            query_builder = query_builder.bind(status);
        }

        let athletes = query_builder.fetch_all(&self.db).await?;

        Ok(athletes)
    }

    pub async fn update(
        &self,
        athlete_id: Uuid,
        request: UpdateAthleteRequest,
    ) -> Result<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(
            r#"
            UPDATE athletes
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                birth_date = COALESCE($4, birth_date),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                guardian_name = COALESCE($7, guardian_name),
                guardian_phone = COALESCE($8, guardian_phone),
                emergency_contact = COALESCE($9, emergency_contact),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(athlete_id)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.birth_date)
        .bind(request.email)
        .bind(request.phone)
        .bind(request.guardian_name)
        .bind(request.guardian_phone)
        .bind(request.emergency_contact)
        .fetch_optional(&self.db)
        .await?;

        Ok(athlete)
    }

    pub async fn delete(&self, athlete_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM athletes WHERE id = $1")
            .bind(athlete_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Approval decision; the optional group assignment is handled by the
    /// caller through the assignment validator.
    pub async fn set_status(
        &self,
        athlete_id: Uuid,
        status: ApprovalStatus,
    ) -> Result<Option<Athlete>> {
        let athlete = sqlx::query_as::<_, Athlete>(
            "UPDATE athletes SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(athlete_id)
        .bind(status)
        .fetch_optional(&self.db)
        .await?;

        Ok(athlete)
    }

    /// Contact addresses for bulk mail: approved athletes, optionally
    /// narrowed to one training or group.
    pub async fn contact_emails(
        &self,
        training_id: Option<Uuid>,
        group_id: Option<Uuid>,
    ) -> Result<Vec<String>> {
        let mut query = r#"
            SELECT DISTINCT a.email
            FROM athletes a
        "#
        .to_string();

        if training_id.is_some() || group_id.is_some() {
            query.push_str(
                r#"
                JOIN athlete_assignments aa ON aa.athlete_id = a.id
                JOIN training_groups g ON g.id = aa.training_group_id
                "#,
            );
        }

        query.push_str(" WHERE a.status = 'approved' AND a.email IS NOT NULL");
        if group_id.is_some() {
            query.push_str(" AND g.id = $1");
        } else if training_id.is_some() {
            query.push_str(" AND g.recurring_training_id = $1");
        }

        let mut query_builder = sqlx::query_scalar::<_, String>(&query);
        if let Some(group_id) = group_id {
            query_builder = query_builder.bind(group_id);
        } else if let Some(training_id) = training_id {
            query_builder = query_builder.bind(training_id);
        }

        let emails = query_builder.fetch_all(&self.db).await?;

        Ok(emails)
    }
}

/// Request-level checks for the public registration endpoint.
pub fn validate_registration(request: &RegisterAthleteRequest) -> Result<(), String> {
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err("First and last name are required".to_string());
    }

    if let Some(email) = &request.email {
        if !is_valid_email(email) {
            return Err(format!("Invalid email address '{}'", email));
        }
    }

    Ok(())
}

pub fn is_valid_email(email: &str) -> bool {
    let pattern = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid");
    pattern.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn registration() -> RegisterAthleteRequest {
        RegisterAthleteRequest {
            first_name: "Mara".to_string(),
            last_name: "Weber".to_string(),
            birth_date: NaiveDate::from_ymd_opt(2012, 4, 2).unwrap(),
            email: Some("mara.weber@example.com".to_string()),
            phone: None,
            guardian_name: Some("Ines Weber".to_string()),
            guardian_phone: Some("+49 170 0000000".to_string()),
            emergency_contact: None,
        }
    }

    #[test]
    fn test_validate_registration() {
        assert!(validate_registration(&registration()).is_ok());

        let mut request = registration();
        request.first_name = " ".to_string();
        assert!(validate_registration(&request).is_err());

        let mut request = registration();
        request.email = Some("not-an-email".to_string());
        assert!(validate_registration(&request).is_err());
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("trainer@club.de"));
        assert!(!is_valid_email("trainer@club"));
        assert!(!is_valid_email("trainer club@club.de"));
    }
}
