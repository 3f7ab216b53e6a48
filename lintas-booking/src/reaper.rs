use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

use lintas_core::error::ReservationError;
use lintas_core::store::ReservationStore;

/// Background sweep that reclaims holds whose TTL has elapsed.
///
/// Owned by the process lifecycle: `main` spawns `run` at boot and flips
/// the shutdown channel when the server stops. The hold path also invokes
/// the same release logic inline, inside its own transaction, so the
/// reaper is a backstop rather than the only reclaimer.
pub struct Reaper {
    store: Arc<dyn ReservationStore>,
    period: Duration,
}

impl Reaper {
    pub fn new(store: Arc<dyn ReservationStore>, period: Duration) -> Self {
        Self { store, period }
    }

    /// One idempotent sweep: release every expired hold and free its seats.
    pub async fn sweep(&self) -> Result<u64, ReservationError> {
        self.store.release_expired(Utc::now()).await
    }

    /// Tick until the shutdown signal fires. A failed cycle is logged and
    /// retried on the next tick; it never terminates the task.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.period);
        info!("Expiry reaper started, period {:?}", self.period);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.sweep().await {
                        Ok(0) => {}
                        Ok(released) => info!("Reclaimed {} expired holds", released),
                        Err(err) => error!("Expiry sweep failed: {}", err),
                    }
                }
                _ = shutdown.changed() => {
                    info!("Expiry reaper stopped");
                    return;
                }
            }
        }
    }
}
