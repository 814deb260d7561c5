use anyhow::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, interval};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::config::SchedulerConfig;
use crate::state::SharedState;

pub struct Scheduler {
    state: Arc<SharedState>,
    config: SchedulerConfig,
    running: Arc<RwLock<bool>>,
}

impl Scheduler {
    pub fn new(state: Arc<SharedState>, config: SchedulerConfig) -> Self {
        Self {
            state,
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

        let mut sched = JobScheduler::new().await?;

        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);

        // Nightly sweep: close any clock-in left open from the previous day
        let job = Job::new_async(
            self.config.auto_clock_out_cron.as_str(),
            move |_uuid, _lock| {
                let state = Arc::clone(&state);
                let running = Arc::clone(&running);
                Box::pin(async move {
                    if !*running.read().await {
                        return;
                    }
                    let start = std::time::Instant::now();
                    info!(
                        event = "job_started",
                        job_name = "auto_clock_out",
                        "Starting auto clock-out sweep"
                    );

                    match auto_clock_out(&state).await {
                        Ok(processed) => info!(
                            event = "job_finished",
                            job_name = "auto_clock_out",
                            processed = processed,
                            duration_ms =
                                u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                            "Auto clock-out sweep finished"
                        ),
                        Err(e) => error!(
                            event = "job_failed",
                            job_name = "auto_clock_out",
                            error = %e,
                            "Auto clock-out sweep failed"
                        ),
                    }
                })
            },
        )?;

        sched.add(job).await?;
        sched.start().await?;

        // Keep the scheduler task alive until told to stop
        let mut tick = interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            if !*self.running.read().await {
                break;
            }
        }

        Ok(())
    }

    pub async fn stop(&self) {
        *self.running.write().await = false;
    }

    /// One sweep, callable outside the cron loop.
    pub async fn run_once(&self) -> Result<u32> {
        auto_clock_out(&self.state).await
    }
}

/// Any employee whose latest clock event is a clock-in gets a system
/// clock-out record.
async fn auto_clock_out(state: &SharedState) -> Result<u32> {
    let employees = state.store.list_employees(None).await?;

    let mut processed = 0;
    for employee in employees {
        let last = state.store.latest_clock_event(&employee.id).await?;

        if matches!(last, Some(event) if event.activity_type == "clock_in") {
            state
                .store
                .record_activity(
                    &employee.id,
                    &employee.name,
                    "clock_out",
                    "Auto clock out (system)",
                )
                .await?;
            processed += 1;
        }
    }

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    async fn shared_state() -> Arc<SharedState> {
        let mut config = Config::default();
        config.general.database_path = "sqlite::memory:".to_string();
        config.general.max_db_connections = 1;
        config.general.min_db_connections = 1;
        Arc::new(SharedState::new(config).await.unwrap())
    }

    #[tokio::test]
    async fn sweep_closes_open_clock_ins() {
        let state = shared_state().await;
        let admin = state
            .store
            .get_employee_by_username("admin")
            .await
            .unwrap()
            .expect("bootstrap admin is seeded");

        state
            .store
            .record_activity(&admin.id, &admin.name, "clock_in", "Clocked in")
            .await
            .unwrap();

        let scheduler = Scheduler::new(Arc::clone(&state), crate::config::SchedulerConfig::default());
        assert_eq!(scheduler.run_once().await.unwrap(), 1);

        // The employee is clocked out now, so a second sweep is a no-op
        assert_eq!(scheduler.run_once().await.unwrap(), 0);

        let last = state
            .store
            .latest_clock_event(&admin.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.activity_type, "clock_out");
    }

    #[tokio::test]
    async fn sweep_ignores_employees_who_never_clocked_in() {
        let state = shared_state().await;

        let scheduler = Scheduler::new(state, crate::config::SchedulerConfig::default());
        assert_eq!(scheduler.run_once().await.unwrap(), 0);
    }
}
