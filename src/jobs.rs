//! Recurring background jobs: expiry sweep and counter reconciliation.
//!
//! Each job runs on its own [`tokio::time::interval`] and stops when the
//! shutdown channel flips to `true`. A run that is in progress when shutdown
//! is requested is allowed to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// Periods of the recurring jobs.
#[derive(Debug, Clone, Copy)]
pub struct JobSchedule {
    pub sweep_every: Duration,
    pub reconcile_every: Duration,
}

impl JobSchedule {
    pub fn from_secs(sweep_secs: u64, reconcile_secs: u64) -> Self {
        Self {
            sweep_every: Duration::from_secs(sweep_secs),
            reconcile_every: Duration::from_secs(reconcile_secs),
        }
    }
}

/// Spawns the sweep and reconciliation loops.
///
/// Both fire once right away, then on every tick. Await the returned handles
/// after signalling shutdown to let an in-flight run complete.
pub fn spawn<L>(
    service: Arc<LinkService<L>>,
    schedule: JobSchedule,
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<()>>
where
    L: LinkRepository + ?Sized,
{
    let sweep = {
        let service = Arc::clone(&service);
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            run_every("sweep", schedule.sweep_every, shutdown, move || {
                let service = Arc::clone(&service);
                async move {
                    if let Err(e) = service.sweep_expired().await {
                        error!("Expiry sweep failed: {}", e);
                    }
                }
            })
            .await;
        })
    };

    let reconcile = tokio::spawn(async move {
        run_every("reconcile", schedule.reconcile_every, shutdown, move || {
            let service = Arc::clone(&service);
            async move {
                if let Err(e) = service.reconcile_pending().await {
                    error!("Counter reconciliation failed: {}", e);
                }
            }
        })
        .await;
    });

    info!(
        sweep_secs = schedule.sweep_every.as_secs(),
        reconcile_secs = schedule.reconcile_every.as_secs(),
        "Background jobs started"
    );

    vec![sweep, reconcile]
}

async fn run_every<F, Fut>(
    name: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut job: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => job().await,
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!(job = name, "Background job stopped");
}
