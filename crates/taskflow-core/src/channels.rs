//! Typed channels connecting the pipeline stages.
//!
//! A channel closes when its last sender is dropped.
//! Senders here are not `Clone` outside this crate, and `close` consumes the sender, so a stage can only close what it owns and only once.
//!
//! - task channel: generator -> workers (bounded, shared by all workers)
//! - success channel: workers -> aggregator
//! - failure channel: workers -> aggregator
use std::sync::Arc;

use taskflow_model::{Task, TaskFailure};
use tokio::sync::{Mutex, mpsc};
use tracing::trace;

pub fn task_channel(capacity: usize) -> (TaskSender, TaskReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (TaskSender(tx), TaskReceiver(Arc::new(Mutex::new(rx))))
}

pub fn success_channel(capacity: usize) -> (SuccessSender, SuccessReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (SuccessSender(tx), SuccessReceiver(rx))
}

pub fn failure_channel(capacity: usize) -> (FailureSender, FailureReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (FailureSender(tx), FailureReceiver(rx))
}

// ============================================================================
// Task channel
// ============================================================================

/// Producer side of the task queue. Owned by the generator.
#[derive(Debug)]
pub struct TaskSender(mpsc::Sender<Task>);

impl TaskSender {
    /// Waits while the buffer is full.
    ///
    /// Returns the task back if every worker is gone.
    pub async fn send(&self, task: Task) -> Result<(), Task> {
        self.0.send(task).await.map_err(|e| e.0)
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }

    pub fn close(self) {
        trace!("task channel closed by producer");
        drop(self.0);
    }
}

/// Consumer side of the task queue, shared by every worker.
///
/// The lock is held only while waiting for a single task.
#[derive(Debug, Clone)]
pub struct TaskReceiver(Arc<Mutex<mpsc::Receiver<Task>>>);

impl TaskReceiver {
    /// `None` once the producer closed the channel and the buffer is drained.
    pub async fn recv(&self) -> Option<Task> {
        self.0.lock().await.recv().await
    }

    /// Drop whatever is still buffered, returning how many tasks were discarded.
    pub async fn drain(&self) -> usize {
        let mut rx = self.0.lock().await;
        rx.close();
        let mut n = 0;
        while rx.try_recv().is_ok() {
            n += 1;
        }
        n
    }
}

// ============================================================================
// Success channel
// ============================================================================

#[derive(Debug)]
pub struct SuccessSender(mpsc::Sender<Task>);

impl SuccessSender {
    pub async fn send(&self, task: Task) -> Result<(), Task> {
        self.0.send(task).await.map_err(|e| e.0)
    }

    pub(crate) fn share(&self) -> Self {
        SuccessSender(self.0.clone())
    }

    pub fn close(self) {
        trace!("success channel handle released");
        drop(self.0);
    }
}

#[derive(Debug)]
pub struct SuccessReceiver(mpsc::Receiver<Task>);

impl SuccessReceiver {
    pub async fn recv(&mut self) -> Option<Task> {
        self.0.recv().await
    }
}

// ============================================================================
// Failure channel
// ============================================================================

#[derive(Debug)]
pub struct FailureSender(mpsc::Sender<TaskFailure>);

impl FailureSender {
    pub async fn send(&self, failure: TaskFailure) -> Result<(), TaskFailure> {
        self.0.send(failure).await.map_err(|e| e.0)
    }

    pub(crate) fn share(&self) -> Self {
        FailureSender(self.0.clone())
    }

    pub fn close(self) {
        trace!("failure channel handle released");
        drop(self.0);
    }
}

#[derive(Debug)]
pub struct FailureReceiver(mpsc::Receiver<TaskFailure>);

impl FailureReceiver {
    pub async fn recv(&mut self) -> Option<TaskFailure> {
        self.0.recv().await
    }
}
