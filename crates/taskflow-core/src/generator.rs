use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::{TaskFactory, channels::TaskSender};

/// Feeds freshly created tasks into the task channel for a fixed time window.
pub struct TaskGenerator {
    factory: TaskFactory,
    cancel: CancellationToken,
}

impl TaskGenerator {
    pub fn new(factory: TaskFactory, cancel: CancellationToken) -> Self {
        Self { factory, cancel }
    }

    /// Produce tasks while less than `window` has elapsed since the call, then close `out`.
    ///
    /// A full channel blocks production until a worker frees a slot.
    /// Stops early on cancellation or when every consumer is gone.
    /// Returns the number of tasks handed to the channel.
    #[instrument(level = "debug", skip(self, out), fields(window_ms = window.as_millis() as u64))]
    pub async fn generate(&self, window: Duration, out: TaskSender) -> usize {
        let clock = self.factory.clock();
        let start = clock.monotonic();
        let mut sent = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                debug!("generation cancelled");
                break;
            }
            if clock.monotonic().saturating_sub(start) >= window {
                break;
            }

            let task = self.factory.create();
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    debug!("generation cancelled while waiting for queue space");
                    break;
                }
                res = out.send(task) => match res {
                    Ok(()) => sent += 1,
                    Err(task) => {
                        warn!(id = %task.id(), "task queue has no consumers; stopping generation");
                        break;
                    }
                },
            }
        }

        out.close();
        info!(sent, "task generation finished");
        sent
    }

    pub fn spawn(self, window: Duration, out: TaskSender) -> JoinHandle<usize> {
        tokio::spawn(async move { self.generate(window, out).await })
    }
}
