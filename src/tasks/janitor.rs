//! Expiration Janitor
//!
//! Background task that periodically drains due expiration markers and
//! removes the store entries they still describe.

use std::hash::Hash;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::time::MissedTickBehavior;
use tracing::{info, trace, warn};

use crate::cache::{Compute, ConcurrentStore, ExpirationQueue, Expiry};
use crate::error::{CacheError, Result};

/// Name given to every janitor thread
pub const JANITOR_THREAD_NAME: &str = "expiring-cache-janitor";

// == Sweep Report ==
/// What a single sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries removed because their marker came due
    pub removed: u64,
    /// Markers ignored because the key now holds a different entry
    pub stale: u64,
    /// Markers ignored because the key was already gone
    pub orphaned: u64,
}

impl SweepReport {
    /// Total number of markers consumed.
    pub fn markers(&self) -> u64 {
        self.removed + self.stale + self.orphaned
    }
}

// == Sweep ==
/// Drains every marker due at `now_ms` and reconciles it against the store.
///
/// A store entry is removed only when its deadline equals the marker's, so an
/// entry written after the marker was queued survives. Two writes that land on
/// the same deadline are indistinguishable here and the older marker removes
/// the newer entry.
pub fn sweep<K, V>(
    store: &ConcurrentStore<K, V>,
    queue: &ExpirationQueue<K>,
    now_ms: i64,
) -> SweepReport
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    let mut report = SweepReport::default();

    while let Some(marker) = queue.poll_ready_at(now_ms) {
        let deadline = Expiry::At(marker.expires_at);
        let lateness_ms = -marker.delay_ms(now_ms);
        let mut outcome = MarkerOutcome::Orphaned;

        store.compute(marker.key, |current| match current {
            None => Compute::Keep,
            Some(entry) if entry.expires_at == deadline => {
                outcome = MarkerOutcome::Removed;
                Compute::Remove
            }
            Some(_) => {
                outcome = MarkerOutcome::Stale;
                Compute::Keep
            }
        });

        trace!(?outcome, lateness_ms, "Processed expiration marker");
        match outcome {
            MarkerOutcome::Removed => report.removed += 1,
            MarkerOutcome::Stale => report.stale += 1,
            MarkerOutcome::Orphaned => report.orphaned += 1,
        }
    }

    report
}

#[derive(Debug, Clone, Copy)]
enum MarkerOutcome {
    Removed,
    Stale,
    Orphaned,
}

// == Janitor ==
/// Owned handle to a periodic background task.
///
/// The task runs on its own thread, driven by a single-threaded timer runtime,
/// first immediately and then once per interval. Runs never overlap. Dropping
/// the handle stops the task.
#[derive(Debug)]
pub struct Janitor {
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Janitor {
    /// Starts running `task` every `interval` on a dedicated thread.
    ///
    /// # Errors
    /// - `InvalidConfig` if `interval` is zero
    /// - `Scheduler` if the timer runtime or the thread cannot be created
    pub fn spawn<F>(interval: Duration, mut task: F) -> Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        if interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "janitor interval must be greater than zero".to_string(),
            ));
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let thread = thread::Builder::new()
            .name(JANITOR_THREAD_NAME.to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let mut ticker = tokio::time::interval(interval);
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    info!("Janitor started, interval: {:?}", interval);

                    loop {
                        tokio::select! {
                            biased;
                            // Fires on an explicit shutdown or when the handle is dropped
                            _ = &mut shutdown_rx => break,
                            _ = ticker.tick() => task(),
                        }
                    }

                    info!("Janitor stopped");
                });
            })?;

        Ok(Self {
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
            thread: Mutex::new(Some(thread)),
        })
    }

    // == Shutdown ==
    /// Stops the task and waits for an in-flight run to finish.
    ///
    /// Idempotent. Never waits on itself when called from the janitor thread.
    pub fn shutdown(&self) {
        if let Some(tx) = self.shutdown_tx.lock().take() {
            // The receiver is only gone if the thread already exited
            let _ = tx.send(());
        }

        let Some(handle) = self.thread.lock().take() else {
            return;
        };

        if handle.thread().id() == thread::current().id() {
            return;
        }

        if handle.join().is_err() {
            warn!("Janitor thread panicked before shutdown");
        }
    }

    /// Returns true until `shutdown` has been called.
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.lock().is_some()
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
