use std::collections::HashMap;
use std::env;

use chrono::Utc;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::models::AbsenceAlert;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("No template registered for this email kind")]
    TemplateNotFound,
    #[error("Invalid email address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailKind {
    RegistrationApproved,
    RegistrationRejected,
    AbsenceAlert,
    BulkMessage,
}

#[derive(Debug, Clone)]
pub struct EmailTemplate {
    pub subject_template: String,
    pub text_template: String,
    pub html_template: String,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub enabled: bool,
}

impl SmtpConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap_or(587),
            username: env::var("SMTP_USERNAME").unwrap_or_default(),
            password: env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@club.example".to_string()),
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Club Manager".to_string()),
            enabled: env::var("EMAIL_ENABLED")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}

/// Values substituted into the email templates.
#[derive(Debug, Clone, Default)]
pub struct EmailContext {
    pub recipient_name: String,
    pub subject: String,
    pub message: String,
    pub details: String,
}

/// Per-recipient outcome of a bulk send.
#[derive(Debug, serde::Serialize)]
pub struct BulkEmailReport {
    pub requested: usize,
    pub sent: usize,
    pub failed: Vec<String>,
}

#[derive(Clone)]
pub struct EmailService {
    templates: HashMap<EmailKind, EmailTemplate>,
    smtp_config: SmtpConfig,
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl EmailService {
    pub fn new(smtp_config: SmtpConfig) -> Result<Self, EmailError> {
        let mut templates = HashMap::new();

        templates.insert(
            EmailKind::RegistrationApproved,
            EmailTemplate {
                subject_template: "Welcome to the club, {{recipient_name}}!".to_string(),
                text_template: include_str!("../templates/email/registration_approved.txt")
                    .to_string(),
                html_template: include_str!("../templates/email/registration_approved.html")
                    .to_string(),
            },
        );

        templates.insert(
            EmailKind::RegistrationRejected,
            EmailTemplate {
                subject_template: "Your club registration".to_string(),
                text_template: include_str!("../templates/email/registration_rejected.txt")
                    .to_string(),
                html_template: include_str!("../templates/email/registration_rejected.html")
                    .to_string(),
            },
        );

        templates.insert(
            EmailKind::AbsenceAlert,
            EmailTemplate {
                subject_template: "Absence alert: {{subject}}".to_string(),
                text_template: include_str!("../templates/email/absence_alert.txt").to_string(),
                html_template: include_str!("../templates/email/absence_alert.html").to_string(),
            },
        );

        templates.insert(
            EmailKind::BulkMessage,
            EmailTemplate {
                subject_template: "{{subject}}".to_string(),
                text_template: include_str!("../templates/email/bulk_message.txt").to_string(),
                html_template: include_str!("../templates/email/bulk_message.html").to_string(),
            },
        );

        let mailer = if smtp_config.enabled {
            let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp_config.host)?
                .port(smtp_config.port)
                .credentials(Credentials::new(
                    smtp_config.username.clone(),
                    smtp_config.password.clone(),
                ))
                .build();
            Some(transport)
        } else {
            None
        };

        Ok(Self {
            templates,
            smtp_config,
            mailer,
        })
    }

    pub fn from_env() -> Result<Self, EmailError> {
        Self::new(SmtpConfig::from_env())
    }

    /// Render and send one templated email.
    pub async fn send(
        &self,
        kind: EmailKind,
        to: &str,
        context: &EmailContext,
    ) -> Result<(), EmailError> {
        let template = self
            .templates
            .get(&kind)
            .ok_or(EmailError::TemplateNotFound)?;

        let subject = render_template(&template.subject_template, context);
        let text_body = render_template(&template.text_template, context);
        let html_body = render_template(&template.html_template, context);

        self.deliver(to, &subject, text_body, html_body).await?;

        tracing::info!("Sent {:?} email to {}", kind, to);
        Ok(())
    }

    /// Notify an athlete (or their guardian) about the approval decision.
    pub async fn send_registration_decision(
        &self,
        to: &str,
        recipient_name: &str,
        approved: bool,
        reason: Option<&str>,
    ) -> Result<(), EmailError> {
        let kind = if approved {
            EmailKind::RegistrationApproved
        } else {
            EmailKind::RegistrationRejected
        };

        let context = EmailContext {
            recipient_name: recipient_name.to_string(),
            message: reason.unwrap_or_default().to_string(),
            ..Default::default()
        };

        self.send(kind, to, &context).await
    }

    /// Absence digest for the admins: one email per recipient listing
    /// every athlete over the threshold.
    pub async fn send_absence_digest(
        &self,
        recipients: &[String],
        alerts: &[AbsenceAlert],
    ) -> Result<usize, EmailError> {
        if alerts.is_empty() || recipients.is_empty() {
            return Ok(0);
        }

        let context = EmailContext {
            subject: format!("{} athlete(s) over the absence threshold", alerts.len()),
            details: format_absence_lines(alerts),
            ..Default::default()
        };

        let mut sent = 0;
        for recipient in recipients {
            self.send(EmailKind::AbsenceAlert, recipient, &context).await?;
            sent += 1;
        }

        Ok(sent)
    }

    /// Bulk mail to the members; failures are tallied per recipient and
    /// do not abort the rest of the batch.
    pub async fn send_bulk(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<BulkEmailReport, EmailError> {
        let mut report = BulkEmailReport {
            requested: recipients.len(),
            sent: 0,
            failed: Vec::new(),
        };

        for recipient in recipients {
            let context = EmailContext {
                subject: subject.to_string(),
                message: body.to_string(),
                ..Default::default()
            };

            match self.send(EmailKind::BulkMessage, recipient, &context).await {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    tracing::warn!("Failed to send bulk email to {}: {}", recipient, e);
                    report.failed.push(recipient.clone());
                }
            }
        }

        Ok(report)
    }

    async fn deliver(
        &self,
        to: &str,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), EmailError> {
        let Some(mailer) = &self.mailer else {
            // Email delivery disabled (development, tests): log and move on
            tracing::info!(
                "Email delivery disabled; would send to {} with subject '{}'",
                to,
                subject
            );
            return Ok(());
        };

        let from: Mailbox = format!("{} <{}>", self.smtp_config.from_name, self.smtp_config.from_email)
            .parse()?;

        let message = Message::builder()
            .from(from)
            .to(to.parse()?)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text_body, html_body))?;

        mailer.send(message).await?;

        Ok(())
    }
}

/// Minimal placeholder substitution, one pass per known key.
pub fn render_template(template: &str, context: &EmailContext) -> String {
    template
        .replace("{{recipient_name}}", &context.recipient_name)
        .replace("{{subject}}", &context.subject)
        .replace("{{message}}", &context.message)
        .replace("{{details}}", &context.details)
        .replace("{{current_date}}", &Utc::now().format("%B %d, %Y").to_string())
}

/// One line per alerted athlete, for the digest body.
pub fn format_absence_lines(alerts: &[AbsenceAlert]) -> String {
    alerts
        .iter()
        .map(|alert| {
            format!(
                "- {}: {} absences ({} excused, {} unexcused), last on {}",
                alert.athlete_name,
                alert.absence_count,
                alert.excused,
                alert.unexcused,
                alert.last_absence_date
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    #[test]
    fn test_render_template() {
        let context = EmailContext {
            recipient_name: "Mara".to_string(),
            subject: "Summer break".to_string(),
            message: "No training in August.".to_string(),
            details: String::new(),
        };

        let rendered = render_template("Hi {{recipient_name}}: {{message}}", &context);

        assert_eq!(rendered, "Hi Mara: No training in August.");
    }

    #[test]
    fn test_format_absence_lines() {
        let alerts = vec![AbsenceAlert {
            athlete_id: Uuid::new_v4(),
            athlete_name: "Mara Weber".to_string(),
            absence_count: 4,
            excused: 1,
            unexcused: 3,
            last_absence_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        }];

        let lines = format_absence_lines(&alerts);

        assert!(lines.contains("Mara Weber"));
        assert!(lines.contains("4 absences"));
        assert!(lines.contains("2025-03-10"));
    }
}
