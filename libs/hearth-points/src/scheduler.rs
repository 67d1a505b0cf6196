//! Recurring Poll Tasks
//!
//! Drives a point's `update` on a fixed interval. Each handle owns its task:
//! a point removed from the platform calls `stop`, and dropping the handle
//! aborts the task as a backstop, so no poller outlives its point.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::reading::PollingPoint;

/// Owner of one recurring poll task
pub struct PollerHandle {
    name: String,
    handle: JoinHandle<()>,
}

impl PollerHandle {
    /// Cancel the recurring task
    pub fn stop(&self) {
        self.handle.abort();
        debug!("poller '{}' stopped", self.name);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start polling a point every `interval`. The first cycle runs immediately.
pub async fn spawn_poller<P>(point: Arc<RwLock<P>>, interval: Duration) -> PollerHandle
where
    P: PollingPoint + 'static,
{
    let name = point.read().await.name().to_string();
    debug!("poller '{}' every {:?}", name, interval);

    let task_point = Arc::clone(&point);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            task_point.write().await.update().await;
        }
    });

    PollerHandle { name, handle }
}

// ============================================================================
// Tests
// ============================================================================
