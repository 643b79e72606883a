use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::services::{EmailService, SessionService, StatisticsService, TrainerService};

/// Periodic background jobs: nightly session generation and the weekly
/// absence-alert digest for the admins.
pub struct SchedulerService {
    db: PgPool,
    config: AppConfig,
}

impl SchedulerService {
    pub fn new(db: PgPool, config: AppConfig) -> Self {
        Self { db, config }
    }

    /// Register the jobs and start the scheduler. The returned handle
    /// must be kept alive for the jobs to keep firing.
    pub async fn start(&self) -> Result<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create job scheduler: {}", e))?;

        scheduler
            .add(self.session_generation_job()?)
            .await
            .map_err(|e| anyhow!("Failed to add session generation job: {}", e))?;

        scheduler
            .add(self.absence_scan_job()?)
            .await
            .map_err(|e| anyhow!("Failed to add absence scan job: {}", e))?;

        scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start job scheduler: {}", e))?;

        info!("Background job scheduler started");

        Ok(scheduler)
    }

    /// Nightly at 03:15: keep the session horizon materialized.
    fn session_generation_job(&self) -> Result<Job> {
        let db = self.db.clone();
        let horizon_days = self.config.session_horizon_days;

        Job::new_async("0 15 3 * * *", move |_uuid, _lock| {
            let db = db.clone();
            Box::pin(async move {
                let sessions = SessionService::new(db);
                let today = Utc::now().date_naive();
                let until = today + Duration::days(horizon_days);

                match sessions.generate_all(today, until).await {
                    Ok(generated) => info!(
                        "Session generation: {} sessions, {} session groups created up to {}",
                        generated.sessions_created, generated.session_groups_created, until
                    ),
                    Err(e) => error!("Session generation failed: {}", e),
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create session generation job: {}", e))
    }

    /// Monday 06:30: scan the trailing window and mail the digest.
    fn absence_scan_job(&self) -> Result<Job> {
        let db = self.db.clone();
        let threshold = self.config.absence_alert_threshold;
        let window_days = self.config.absence_alert_window_days;

        Job::new_async("0 30 6 * * Mon", move |_uuid, _lock| {
            let db = db.clone();
            Box::pin(async move {
                let statistics = StatisticsService::new(db.clone());
                let trainers = TrainerService::new(db);

                let alerts = match statistics.detect_absence_alerts(threshold, window_days).await {
                    Ok(alerts) => alerts,
                    Err(e) => {
                        error!("Absence scan failed: {}", e);
                        return;
                    }
                };

                if alerts.is_empty() {
                    info!("Absence scan: no athlete over the threshold");
                    return;
                }

                let recipients = match trainers.admin_emails().await {
                    Ok(recipients) => recipients,
                    Err(e) => {
                        error!("Absence scan could not load admin emails: {}", e);
                        return;
                    }
                };

                let email = match EmailService::from_env() {
                    Ok(email) => email,
                    Err(e) => {
                        error!("Absence scan could not set up email transport: {}", e);
                        return;
                    }
                };

                match email.send_absence_digest(&recipients, &alerts).await {
                    Ok(sent) => info!(
                        "Absence scan: {} athlete(s) over threshold, digest sent to {} admin(s)",
                        alerts.len(),
                        sent
                    ),
                    Err(e) => error!("Absence digest sending failed: {}", e),
                }
            })
        })
        .map_err(|e| anyhow!("Failed to create absence scan job: {}", e))
    }
}
