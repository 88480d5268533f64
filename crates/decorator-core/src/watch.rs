//! Long-running driver of the reconciler.
//!
//! `Starting` performs one synchronous fetch-and-reconcile, `Running` consumes the
//! watcher channels one event at a time, `Stopped` is reached on cancellation.
//!
//! Failure policy:
//! - metadata unavailable at startup: retried `startup_attempts` times, then fatal;
//! - first reconcile fails: fatal;
//! - any failure while running: logged, retried on the next poll;
//! - watcher task gone without cancellation: fatal.
use std::{fmt, sync::Arc, time::Duration};

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    error::{CoreError, MetadataError},
    metadata::{InstanceWatcher, MetadataSource, WatcherConfig, spawn_watcher},
    node::NodeClient,
    reconciler::{ReconcileOutcome, Reconciler},
};
use decorator_model::InstanceData;

/// Default number of startup metadata fetch attempts.
pub const DEFAULT_STARTUP_ATTEMPTS: u32 = 5;

/// Default delay between startup metadata fetch attempts.
pub const DEFAULT_STARTUP_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Timing settings of the watch loop.
#[derive(Debug, Clone, Copy)]
pub struct WatchConfig {
    /// Metadata polling interval.
    pub interval: Duration,
    /// Upper bound for a single metadata fetch.
    pub fetch_timeout: Duration,
    /// How many times the initial metadata fetch is tried before giving up.
    pub startup_attempts: u32,
    /// Pause between failed initial fetches.
    pub startup_retry_delay: Duration,
}

impl WatchConfig {
    /// Build a config with the default startup retry policy.
    ///
    /// # Errors
    /// [`CoreError::Config`] when `interval` or `fetch_timeout` is zero.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use decorator_core::WatchConfig;
    ///
    /// let cfg = WatchConfig::new(Duration::from_secs(300), Duration::from_secs(30)).unwrap();
    /// assert_eq!(cfg.startup_attempts, 5);
    /// assert!(WatchConfig::new(Duration::ZERO, Duration::from_secs(30)).is_err());
    /// ```
    pub fn new(interval: Duration, fetch_timeout: Duration) -> Result<Self, CoreError> {
        if interval.is_zero() {
            return Err(CoreError::Config("poll interval must be positive".into()));
        }
        if fetch_timeout.is_zero() {
            return Err(CoreError::Config("metadata fetch timeout must be positive".into()));
        }
        Ok(Self {
            interval,
            fetch_timeout,
            startup_attempts: DEFAULT_STARTUP_ATTEMPTS,
            startup_retry_delay: DEFAULT_STARTUP_RETRY_DELAY,
        })
    }
}

/// Lifecycle of a [`WatchLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Starting,
    Running,
    Stopped,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LoopState::Starting => "starting",
            LoopState::Running => "running",
            LoopState::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

/// Drives a [`Reconciler`] from a [`MetadataSource`].
pub struct WatchLoop<C> {
    reconciler: Reconciler<C>,
    source: Arc<dyn MetadataSource>,
    cfg: WatchConfig,
    state: LoopState,
}

impl<C: NodeClient> WatchLoop<C> {
    pub fn new(
        reconciler: Reconciler<C>,
        source: Arc<dyn MetadataSource>,
        cfg: WatchConfig,
    ) -> Self {
        Self {
            reconciler,
            source,
            cfg,
            state: LoopState::Starting,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn reconciler(&self) -> &Reconciler<C> {
        &self.reconciler
    }

    /// Run until `cancel` fires.
    ///
    /// Returns an error for startup failures and when the watcher task dies
    /// without being canceled; cancellation at any point is `Ok(())`.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), CoreError> {
        let res = self.run_inner(&cancel).await;
        self.set_state(LoopState::Stopped);
        res
    }

    async fn run_inner(&mut self, cancel: &CancellationToken) -> Result<(), CoreError> {
        let Some(initial) = self.fetch_initial(cancel).await? else {
            return Ok(());
        };

        match self.reconciler.reconcile(cancel, Some(&initial)).await {
            Ok(outcome) => log_outcome(&outcome),
            Err(CoreError::Canceled) => return Ok(()),
            Err(e) => {
                error!(error = %e, instance = ?initial, "initial node label sync failed");
                return Err(e);
            }
        }

        // Child token: the watcher stops with the loop even if the loop exits on its own.
        let watcher_cancel = cancel.child_token();
        let watcher_cfg = WatcherConfig::new(self.cfg.interval, self.cfg.fetch_timeout);
        let InstanceWatcher {
            mut updates,
            mut errors,
            handle,
        } = spawn_watcher(Arc::clone(&self.source), watcher_cfg, watcher_cancel.clone());

        self.set_state(LoopState::Running);
        let (mut updates_open, mut errors_open) = (true, true);
        let canceled = loop {
            if !updates_open && !errors_open {
                break false;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("cancellation requested");
                    break true;
                }
                msg = updates.recv(), if updates_open => match msg {
                    Some(data) => self.on_update(cancel, &data).await,
                    None => updates_open = false,
                },
                msg = errors.recv(), if errors_open => match msg {
                    Some(err) => self.on_watcher_error(&err),
                    None => errors_open = false,
                },
            }
        };

        watcher_cancel.cancel();
        let joined = handle.await;
        if canceled {
            if let Err(e) = joined {
                warn!(error = %e, "instance watcher task did not exit cleanly");
            }
            return Ok(());
        }

        // Channels closed without cancellation: the watcher died under us.
        let reason = match joined {
            Err(e) => e.to_string(),
            Ok(()) => "update channels closed".to_string(),
        };
        error!(reason = %reason, "instance watcher stopped, node labels are no longer maintained");
        Err(CoreError::WatcherStopped(reason))
    }

    /// Fetch the first instance document, retrying transient failures.
    ///
    /// `Ok(None)` means cancellation arrived first.
    async fn fetch_initial(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Option<InstanceData>, CoreError> {
        let attempts = self.cfg.startup_attempts.max(1);
        let mut attempt = 1;

        let last_err = loop {
            let res = tokio::select! {
                _ = cancel.cancelled() => return Ok(None),
                res = timeout(self.cfg.fetch_timeout, self.source.get_instance()) => {
                    res.unwrap_or_else(|_| Err(MetadataError::Timeout(self.cfg.fetch_timeout)))
                }
            };

            let err = match res {
                Ok(data) => return Ok(Some(data)),
                Err(e) => e,
            };
            if attempt >= attempts {
                break err;
            }

            warn!(
                error = %err,
                attempt,
                retry_in_ms = self.cfg.startup_retry_delay.as_millis() as u64,
                "initial instance data unavailable, retrying"
            );
            tokio::select! {
                _ = cancel.cancelled() => return Ok(None),
                _ = sleep(self.cfg.startup_retry_delay) => {}
            }
            attempt += 1;
        };

        error!(error = %last_err, attempts, "failed to get the initial instance data");
        Err(last_err.into())
    }

    async fn on_update(&self, cancel: &CancellationToken, data: &InstanceData) {
        match self.reconciler.reconcile(cancel, Some(data)).await {
            Ok(outcome) => log_outcome(&outcome),
            Err(CoreError::Canceled) => debug!("reconcile pass canceled"),
            Err(e) => error!(error = %e, instance = ?data, "failed to update node labels"),
        }
    }

    fn on_watcher_error(&self, err: &MetadataError) {
        self.reconciler.metrics().record_watcher_error();
        error!(error = %err, "got error from instance watcher");
    }

    fn set_state(&mut self, next: LoopState) {
        if self.state != next {
            info!(from = %self.state, to = %next, "watch loop state changed");
            self.state = next;
        }
    }
}

fn log_outcome(outcome: &ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::Unchanged => debug!("node labels unchanged"),
        ReconcileOutcome::Updated(changes) => debug!(
            set = ?changes.set,
            removed = ?changes.removed,
            "node labels changed"
        ),
    }
}
