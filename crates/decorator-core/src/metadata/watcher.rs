use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at, timeout},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::{error::MetadataError, metadata::MetadataSource};
use decorator_model::InstanceData;

/// Default capacity of the update and error channels.
pub const WATCHER_CHANNEL_CAPACITY: usize = 8;

/// Polling settings for [`spawn_watcher`].
#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    /// Delay between polls. The first poll happens one interval after start.
    pub interval: Duration,
    /// Upper bound for a single metadata fetch.
    pub timeout: Duration,
    /// Capacity of each outgoing channel.
    pub capacity: usize,
}

impl WatcherConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval,
            timeout,
            capacity: WATCHER_CHANNEL_CAPACITY,
        }
    }
}

/// Subscription returned by [`spawn_watcher`].
///
/// Fresh instance data arrives on `updates`, failed polls on `errors`.
/// Both channels close when the watcher task exits.
#[derive(Debug)]
pub struct InstanceWatcher {
    pub updates: mpsc::Receiver<InstanceData>,
    pub errors: mpsc::Receiver<MetadataError>,
    pub handle: JoinHandle<()>,
}

/// Start polling `source` in a background task.
///
/// The task stops when `cancel` fires or when both receivers are dropped.
/// Sends wait for channel capacity, so a slow consumer throttles polling.
pub fn spawn_watcher(
    source: Arc<dyn MetadataSource>,
    cfg: WatcherConfig,
    cancel: CancellationToken,
) -> InstanceWatcher {
    let capacity = cfg.capacity.max(1);
    let (update_tx, updates) = mpsc::channel(capacity);
    let (error_tx, errors) = mpsc::channel(capacity);

    let handle = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + cfg.interval, cfg.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let fetched = tokio::select! {
                _ = cancel.cancelled() => break,
                res = timeout(cfg.timeout, source.get_instance()) => {
                    res.unwrap_or_else(|_| Err(MetadataError::Timeout(cfg.timeout)))
                }
            };

            let delivered = match fetched {
                Ok(data) => {
                    trace!(id = data.id, "instance data polled");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        res = update_tx.send(data) => res.is_ok(),
                    }
                }
                Err(e) => {
                    trace!(error = %e, "instance poll failed");
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        res = error_tx.send(e) => res.is_ok(),
                    }
                }
            };

            if !delivered && update_tx.is_closed() && error_tx.is_closed() {
                break;
            }
        }
        debug!("instance watcher stopped");
    });

    InstanceWatcher {
        updates,
        errors,
        handle,
    }
}
