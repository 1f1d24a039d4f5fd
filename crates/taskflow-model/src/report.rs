use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{TaskId, TaskResult, failure::rfc3339};

/// Presentation view of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub id: TaskId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub completed_at: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub result: Option<TaskResult>,
}

impl fmt::Display for TaskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task id {} time {}", self.id, rfc3339(&self.created_at))?;
        if let Some(done) = &self.completed_at {
            write!(f, " done {}", rfc3339(done))?;
        }
        if let Some(result) = &self.result {
            write!(f, "; {}", result.message())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn pending_report_omits_optional_fields() {
        let report = TaskReport {
            id: TaskId::from("5"),
            created_at: datetime!(2024-05-01 12:00:00 UTC),
            completed_at: None,
            result: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"id":"5","createdAt":"2024-05-01T12:00:00Z"}"#);
        assert_eq!(report.to_string(), "task id 5 time 2024-05-01T12:00:00Z");
    }

    #[test]
    fn completed_report_renders_result() {
        let report = TaskReport {
            id: TaskId::from("5"),
            created_at: datetime!(2024-05-01 12:00:00 UTC),
            completed_at: Some(datetime!(2024-05-01 12:00:01 UTC)),
            result: Some(TaskResult::success()),
        };
        assert_eq!(
            report.to_string(),
            "task id 5 time 2024-05-01T12:00:00Z done 2024-05-01T12:00:01Z; task has been succeeded"
        );

        let json = serde_json::to_string(&report).unwrap();
        let back: TaskReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
