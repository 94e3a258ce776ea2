//! Task service
//!
//! Business logic for internal work items and their comments: creation
//! with assignee validation, status updates, filtered listings, and
//! flat comment threads that disappear with their task.

use crate::db::repositories::{TaskCommentRepository, TaskFilter, TaskRepository, UserRepository};
use crate::models::{
    CreateTaskInput, ListParams, Task, TaskComment, UpdateTaskInput, UserRole,
};
use crate::services::token::AccessClaims;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Error types for task service operations
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Task not found
    #[error("Task not found")]
    NotFound,

    /// Comment not found
    #[error("Comment not found")]
    CommentNotFound,

    /// Referenced assignee does not exist
    #[error("Assignee not found")]
    AssigneeNotFound,

    /// Actor is not allowed to perform this operation
    #[error("Not allowed")]
    Forbidden,

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Task service
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    comment_repo: Arc<dyn TaskCommentRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl TaskService {
    /// Create a new task service
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        comment_repo: Arc<dyn TaskCommentRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            repo,
            comment_repo,
            user_repo,
        }
    }

    /// Create a task, recorded against the acting user
    pub async fn create(
        &self,
        actor: &AccessClaims,
        input: CreateTaskInput,
    ) -> Result<Task, TaskServiceError> {
        if input.title.trim().is_empty() {
            return Err(TaskServiceError::ValidationError(
                "Task title cannot be empty".to_string(),
            ));
        }

        if let Some(assignee_id) = input.assignee_id {
            self.check_assignee(assignee_id).await?;
        }

        let mut task = Task::new(input.title.trim().to_string(), actor.user_id);
        task.description = input.description;
        task.priority = input.priority.unwrap_or_default();
        task.assignee_id = input.assignee_id;
        task.due_date = input.due_date;

        self.repo
            .create(&task)
            .await
            .context("Failed to create task")
            .map_err(Into::into)
    }

    /// Get a task by ID
    pub async fn get(&self, id: i64) -> Result<Task, TaskServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get task")?
            .ok_or(TaskServiceError::NotFound)
    }

    /// List tasks matching the filter
    pub async fn list(
        &self,
        filter: &TaskFilter,
        params: &ListParams,
    ) -> Result<(Vec<Task>, i64), TaskServiceError> {
        self.repo
            .list(filter, params)
            .await
            .context("Failed to list tasks")
            .map_err(Into::into)
    }

    /// Update a task. Any authenticated user may move status and edit
    /// fields; reassignment validates the assignee.
    pub async fn update(&self, id: i64, input: UpdateTaskInput) -> Result<Task, TaskServiceError> {
        let mut task = self.get(id).await?;

        if let Some(title) = input.title {
            if title.trim().is_empty() {
                return Err(TaskServiceError::ValidationError(
                    "Task title cannot be empty".to_string(),
                ));
            }
            task.title = title.trim().to_string();
        }
        if let Some(description) = input.description {
            task.description = if description.trim().is_empty() {
                None
            } else {
                Some(description)
            };
        }
        if let Some(status) = input.status {
            task.status = status;
        }
        if let Some(priority) = input.priority {
            task.priority = priority;
        }
        if let Some(assignee_id) = input.assignee_id {
            if let Some(assignee_id) = assignee_id {
                self.check_assignee(assignee_id).await?;
            }
            task.assignee_id = assignee_id;
        }
        if let Some(due_date) = input.due_date {
            task.due_date = due_date;
        }

        self.repo
            .update(&task)
            .await
            .context("Failed to update task")
            .map_err(Into::into)
    }

    /// Delete a task and its comments. Creator or admin only.
    pub async fn delete(&self, actor: &AccessClaims, id: i64) -> Result<(), TaskServiceError> {
        let task = self.get(id).await?;

        if actor.role != UserRole::Admin && actor.user_id != task.creator_id {
            return Err(TaskServiceError::Forbidden);
        }

        self.repo
            .delete(id)
            .await
            .context("Failed to delete task")
            .map_err(Into::into)
    }

    /// List a task's comments, oldest first
    pub async fn list_comments(&self, task_id: i64) -> Result<Vec<TaskComment>, TaskServiceError> {
        // Surface 404 for unknown tasks rather than an empty thread
        self.get(task_id).await?;

        self.comment_repo
            .list_by_task(task_id)
            .await
            .context("Failed to list comments")
            .map_err(Into::into)
    }

    /// Add a comment to a task
    pub async fn add_comment(
        &self,
        actor: &AccessClaims,
        task_id: i64,
        content: &str,
    ) -> Result<TaskComment, TaskServiceError> {
        self.get(task_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(TaskServiceError::ValidationError(
                "Comment cannot be empty".to_string(),
            ));
        }

        self.comment_repo
            .create(&TaskComment::new(task_id, actor.user_id, content.to_string()))
            .await
            .context("Failed to create comment")
            .map_err(Into::into)
    }

    /// Delete a comment. Author or admin only; the comment must belong
    /// to the given task.
    pub async fn delete_comment(
        &self,
        actor: &AccessClaims,
        task_id: i64,
        comment_id: i64,
    ) -> Result<(), TaskServiceError> {
        let comment = self
            .comment_repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .ok_or(TaskServiceError::CommentNotFound)?;

        if comment.task_id != task_id {
            return Err(TaskServiceError::CommentNotFound);
        }
        if actor.role != UserRole::Admin && actor.user_id != comment.author_id {
            return Err(TaskServiceError::Forbidden);
        }

        self.comment_repo
            .delete(comment_id)
            .await
            .context("Failed to delete comment")
            .map_err(Into::into)
    }

    async fn check_assignee(&self, assignee_id: i64) -> Result<(), TaskServiceError> {
        self.user_repo
            .get_by_id(assignee_id)
            .await
            .context("Failed to check assignee")?
            .ok_or(TaskServiceError::AssigneeNotFound)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxTaskCommentRepository, SqlxTaskRepository, SqlxUserRepository, UserRepository as _,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::{TaskStatus, User, UserRole};

    async fn setup() -> (TaskService, AccessClaims, AccessClaims, AccessClaims) {
        let pool = create_test_pool().await.unwrap();
        migrations::run_migrations(&pool).await.unwrap();

        let users = SqlxUserRepository::new(pool.clone());
        let mut claims = Vec::new();
        for (name, role) in [
            ("creator", UserRole::Member),
            ("helper", UserRole::Member),
            ("boss", UserRole::Admin),
        ] {
            let user = users
                .create(&User::new(
                    name.to_string(),
                    format!("{}@example.com", name),
                    "hash".to_string(),
                    role,
                ))
                .await
                .unwrap();
            claims.push(AccessClaims {
                user_id: user.id,
                username: name.to_string(),
                role,
            });
        }

        let service = TaskService::new(
            SqlxTaskRepository::shared(pool.clone()),
            SqlxTaskCommentRepository::shared(pool.clone()),
            SqlxUserRepository::shared(pool),
        );
        (
            service,
            claims.remove(0),
            claims.remove(0),
            claims.remove(0),
        )
    }

    fn input(title: &str) -> CreateTaskInput {
        CreateTaskInput {
            title: title.to_string(),
            description: None,
            priority: None,
            assignee_id: None,
            due_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_records_creator() {
        let (service, creator, _, _) = setup().await;

        let task = service.create(&creator, input("Edit intro")).await.unwrap();
        assert_eq!(task.creator_id, creator.user_id);
        assert_eq!(task.status, TaskStatus::Open);
    }

    #[tokio::test]
    async fn test_create_validates_assignee() {
        let (service, creator, helper, _) = setup().await;

        let mut bad = input("T");
        bad.assignee_id = Some(9999);
        assert!(matches!(
            service.create(&creator, bad).await,
            Err(TaskServiceError::AssigneeNotFound)
        ));

        let mut ok = input("T");
        ok.assignee_id = Some(helper.user_id);
        let task = service.create(&creator, ok).await.unwrap();
        assert_eq!(task.assignee_id, Some(helper.user_id));
    }

    #[tokio::test]
    async fn test_status_update() {
        let (service, creator, _, _) = setup().await;
        let task = service.create(&creator, input("T")).await.unwrap();

        let updated = service
            .update(
                task.id,
                UpdateTaskInput {
                    status: Some(TaskStatus::Done),
                    ..UpdateTaskInput::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_delete_requires_creator_or_admin() {
        let (service, creator, helper, admin) = setup().await;

        let task = service.create(&creator, input("T")).await.unwrap();
        assert!(matches!(
            service.delete(&helper, task.id).await,
            Err(TaskServiceError::Forbidden)
        ));

        service.delete(&admin, task.id).await.unwrap();

        let task = service.create(&creator, input("T2")).await.unwrap();
        service.delete(&creator, task.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_comment_flow() {
        let (service, creator, helper, admin) = setup().await;
        let task = service.create(&creator, input("T")).await.unwrap();

        service
            .add_comment(&creator, task.id, "First note")
            .await
            .unwrap();
        let helper_comment = service
            .add_comment(&helper, task.id, "Second note")
            .await
            .unwrap();

        let comments = service.list_comments(task.id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content, "First note");

        // Author mismatch is forbidden; admin may remove anything
        assert!(matches!(
            service
                .delete_comment(&creator, task.id, helper_comment.id)
                .await,
            Err(TaskServiceError::Forbidden)
        ));
        service
            .delete_comment(&admin, task.id, helper_comment.id)
            .await
            .unwrap();

        assert_eq!(service.list_comments(task.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_comment_rejected() {
        let (service, creator, _, _) = setup().await;
        let task = service.create(&creator, input("T")).await.unwrap();

        let result = service.add_comment(&creator, task.id, "   ").await;
        assert!(matches!(result, Err(TaskServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_comments_for_unknown_task() {
        let (service, _, _, _) = setup().await;
        assert!(matches!(
            service.list_comments(404).await,
            Err(TaskServiceError::NotFound)
        ));
    }
}
