use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::services::RefreshController;

/// Runs refresh-all periodically, on a fixed interval or a cron expression.
pub struct Scheduler {
    controller: Arc<RefreshController>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(controller: Arc<RefreshController>, config: SchedulerConfig) -> Self {
        Self {
            controller,
            config,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            info!("Scheduler is disabled in config");
            return Ok(());
        }

        *self.running.write().await = true;
        info!("Starting background scheduler");

        if let Some(cron_expr) = &self.config.cron_expression {
            self.run_with_cron(cron_expr).await
        } else {
            self.run_with_interval().await
        }
    }

    async fn run_with_cron(&self, cron_expr: &str) -> Result<()> {
        let mut sched = JobScheduler::new().await?;

        let controller = Arc::clone(&self.controller);
        let running = Arc::clone(&self.running);

        let job = Job::new_async(cron_expr, move |_uuid, _lock| {
            let controller = Arc::clone(&controller);
            let running = Arc::clone(&running);
            Box::pin(async move {
                if !*running.read().await {
                    return;
                }
                run_refresh_job(&controller).await;
            })
        })?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Series refresh scheduled: {}", cron_expr);

        loop {
            if !*self.running.read().await {
                break;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        sched.shutdown().await?;
        Ok(())
    }

    async fn run_with_interval(&self) -> Result<()> {
        let refresh_hours = self.config.refresh_interval_hours.max(1);

        info!("Scheduler running: series refresh every {}h", refresh_hours);

        let mut refresh_interval = interval(Duration::from_secs(u64::from(refresh_hours) * 60 * 60));

        loop {
            refresh_interval.tick().await;
            if !*self.running.read().await {
                break;
            }
            run_refresh_job(&self.controller).await;
        }

        Ok(())
    }

    pub async fn stop(&self) {
        info!("Stopping scheduler...");
        *self.running.write().await = false;
    }
}

async fn run_refresh_job(controller: &RefreshController) {
    let start = std::time::Instant::now();
    info!(event = "job_started", job_name = "refresh_series", "Starting scheduled series refresh");

    match controller.refresh_all().await {
        Ok(summary) if !summary.is_success() => {
            error!(
                event = "job_failed",
                job_name = "refresh_series",
                failed = summary.failed.len(),
                "Scheduled series refresh finished with failures"
            );
        }
        Ok(_) => {}
        Err(e) => {
            error!(event = "job_failed", job_name = "refresh_series", error = %e, "Scheduled series refresh failed");
        }
    }

    info!(
        event = "job_finished",
        job_name = "refresh_series",
        duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "Scheduled series refresh finished"
    );
}
