//! Delayed background tasks

use crate::error::Result;
use std::sync::Mutex;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// A unit of deferred work
pub type Task = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Runs tasks after a delay, fire-and-forget
pub trait TaskScheduler: Send + Sync {
    fn schedule(&self, task: Task, delay: Duration);
}

/// [`TaskScheduler`] on a tokio runtime. Tasks run on the blocking pool.
pub struct TokioScheduler {
    handle: Handle,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioScheduler {
    /// Scheduler on the current runtime
    pub fn new() -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| anyhow::anyhow!(e))?;
        Ok(Self::from_handle(handle))
    }

    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every task scheduled so far
    pub async fn wait(&self) {
        let handles: Vec<_> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("Scheduled task panicked: {}", e);
            }
        }
    }
}

impl TaskScheduler for TokioScheduler {
    fn schedule(&self, task: Task, delay: Duration) {
        let handle = self.handle.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            match tokio::task::spawn_blocking(task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::warn!("Scheduled task failed: {}", e),
                Err(e) => tracing::warn!("Scheduled task panicked: {}", e),
            }
        });

        match self.pending.lock() {
            Ok(mut pending) => {
                pending.retain(|h| !h.is_finished());
                pending.push(handle);
            }
            Err(poisoned) => poisoned.into_inner().push(handle),
        }
    }
}
