use thiserror::Error;

use crate::TaskId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("task {0} already has a recorded result")]
    AlreadyCompleted(TaskId),
}
