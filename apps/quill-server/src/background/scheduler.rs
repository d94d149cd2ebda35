//! Cron-style job scheduler using tokio-cron-scheduler.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::state::AppState;

/// Every five minutes, on the minute.
const MAINTENANCE_SCHEDULE: &str = "0 */5 * * * *";

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable scheduler.
    pub enabled: bool,
}

/// Cron job scheduler wrapper.
pub struct Scheduler {
    inner: JobScheduler,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler.
    pub async fn new(config: SchedulerConfig) -> Result<Self, JobSchedulerError> {
        let inner = JobScheduler::new().await?;
        Ok(Self { inner, config })
    }

    /// Add a cron job.
    pub async fn add_cron<F, Fut>(
        &self,
        schedule: &str,
        task: F,
    ) -> Result<uuid::Uuid, JobSchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + Clone + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let job = Job::new_async(schedule, move |_uuid, _lock| {
            let task = task.clone();
            Box::pin(async move {
                task().await;
            })
        })?;

        let id = self.inner.add(job).await?;
        tracing::info!(schedule = %schedule, job_id = %id, "Cron job registered");
        Ok(id)
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        if !self.config.enabled {
            tracing::info!("Scheduler disabled");
            return Ok(());
        }

        self.inner.start().await?;
        tracing::info!("Scheduler started");
        Ok(())
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}

/// Register and start the session purge and limiter prune jobs.
pub async fn start_maintenance(
    config: SchedulerConfig,
    state: &AppState,
) -> Result<Scheduler, JobSchedulerError> {
    let scheduler = Scheduler::new(config).await?;

    let sessions = state.sessions.clone();
    let limiter = state.limiter.clone();

    scheduler
        .add_cron(MAINTENANCE_SCHEDULE, move || {
            let sessions = sessions.clone();
            let limiter = limiter.clone();
            async move {
                match sessions.purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => tracing::info!(purged, "Expired sessions purged"),
                    Err(e) => tracing::error!(error = %e, "Session purge failed"),
                }

                if let Some(limiter) = limiter {
                    limiter.prune();
                }
            }
        })
        .await?;

    scheduler.start().await?;
    Ok(scheduler)
}
