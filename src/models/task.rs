//! Task and task comment models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An internal work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: i64,
    /// Short title
    pub title: String,
    /// Full description
    pub description: Option<String>,
    /// Workflow status
    pub status: TaskStatus,
    /// Priority
    pub priority: TaskPriority,
    /// User who created the task
    pub creator_id: i64,
    /// Assigned user, if any
    pub assignee_id: Option<i64>,
    /// Due date, if any
    pub due_date: Option<NaiveDate>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new open task
    pub fn new(title: String, creator_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            title,
            description: None,
            status: TaskStatus::Open,
            priority: TaskPriority::Medium,
            creator_id,
            assignee_id: None,
            due_date: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Open,
    /// Being worked on
    InProgress,
    /// Awaiting review
    Review,
    /// Finished
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "open"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Review => write!(f, "review"),
            TaskStatus::Done => write!(f, "done"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TaskStatus::Open),
            "in_progress" => Ok(TaskStatus::InProgress),
            "review" => Ok(TaskStatus::Review),
            "done" => Ok(TaskStatus::Done),
            _ => Err(anyhow::anyhow!("Invalid task status: {}", s)),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
        }
    }
}

impl FromStr for TaskPriority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(anyhow::anyhow!("Invalid task priority: {}", s)),
        }
    }
}

/// A comment on a task. Comments are flat, ordered by creation time,
/// and removed together with the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskComment {
    /// Unique identifier
    pub id: i64,
    /// Task the comment belongs to
    pub task_id: i64,
    /// Comment author
    pub author_id: i64,
    /// Comment body
    pub content: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl TaskComment {
    /// Create a new comment
    pub fn new(task_id: i64, author_id: i64, content: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            task_id,
            author_id,
            content,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<i64>,
    pub due_date: Option<NaiveDate>,
}

/// Input for updating a task
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub assignee_id: Option<Option<i64>>,
    pub due_date: Option<Option<NaiveDate>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_new_defaults() {
        let task = Task::new("Cut the trailer".to_string(), 4);

        assert_eq!(task.status, TaskStatus::Open);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.assignee_id.is_none());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            TaskStatus::Open,
            TaskStatus::InProgress,
            TaskStatus::Review,
            TaskStatus::Done,
        ] {
            assert_eq!(TaskStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert!(TaskStatus::from_str("cancelled").is_err());
    }

    #[test]
    fn test_priority_roundtrip() {
        for priority in [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High] {
            assert_eq!(
                TaskPriority::from_str(&priority.to_string()).unwrap(),
                priority
            );
        }
    }
}
