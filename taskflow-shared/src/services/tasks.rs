/// Task service
///
/// Listing goes through the query filter builder with the caller's scope;
/// every other operation checks role or assignment before touching the
/// store. Non-admins may read their own tasks and toggle completion, nothing
/// else.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{
    authorization::{require_admin, require_task_access},
    middleware::AuthContext,
};
use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{NewTask, TaskDetail, TaskPatch};
use crate::query::{Pagination, Scope, TaskQuery};
use crate::store::{TaskStore, UserStore};

/// Fields an admin supplies to create a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: Option<bool>,
    pub assigned_to: Uuid,
}

/// One page of a task listing
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    /// Records in this page
    pub count: usize,

    /// Records matching the filter across all pages
    pub total: u64,

    pub pagination: Pagination,
    pub data: Vec<TaskDetail>,
}

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskStore>, users: Arc<dyn UserStore>) -> Self {
        Self { tasks, users }
    }

    /// Filtered, sorted, paginated listing
    ///
    /// Non-admins are always narrowed to tasks assigned to them, on top of
    /// whatever filters they pass.
    pub async fn list(&self, auth: &AuthContext, params: &[(String, String)]) -> ServiceResult<TaskPage> {
        let scope = if auth.is_admin() {
            Scope::All
        } else {
            Scope::AssignedTo(auth.user_id)
        };

        let query = TaskQuery::parse(params, scope)?;
        let total = self.tasks.count(&query.filter).await?;
        let data = self.tasks.find(&query).await?;

        debug!(
            user_id = %auth.user_id,
            total,
            page = query.page.page,
            limit = query.page.limit,
            "Listed tasks"
        );

        Ok(TaskPage {
            count: data.len(),
            total,
            pagination: query.page.links(total),
            data,
        })
    }

    pub async fn get(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<TaskDetail> {
        let detail = self
            .tasks
            .find_detail(id)
            .await?
            .ok_or_else(task_not_found)?;

        require_task_access(auth, detail.assigned_to.id)?;
        Ok(detail)
    }

    /// Creates a task owned by the calling admin
    pub async fn create(&self, auth: &AuthContext, input: CreateTask) -> ServiceResult<TaskDetail> {
        require_admin(auth)?;
        self.ensure_user_exists(input.assigned_to).await?;

        let new_task = NewTask {
            name: input.name.trim().to_string(),
            description: input.description,
            start_date: input.start_date,
            end_date: input.end_date,
            is_active: input.is_active.unwrap_or(true),
            assigned_to: input.assigned_to,
            created_by: auth.user_id,
        };
        new_task.validate().map_err(ServiceError::BadRequest)?;

        let task = self.tasks.insert(new_task).await?;
        info!(task_id = %task.id, assigned_to = %task.assigned_to, "Task created");

        self.detail(task.id).await
    }

    /// Partial update; re-validates the assignee and the schedule
    pub async fn update(&self, auth: &AuthContext, id: Uuid, patch: TaskPatch) -> ServiceResult<TaskDetail> {
        require_admin(auth)?;

        let mut task = self.tasks.find_by_id(id).await?.ok_or_else(task_not_found)?;

        if let Some(assignee) = patch.assigned_to {
            self.ensure_user_exists(assignee).await?;
        }

        patch.apply(&mut task);
        task.validate().map_err(ServiceError::BadRequest)?;
        task.touch(Utc::now());
        self.tasks.save(&task).await?;

        info!(task_id = %task.id, "Task updated");
        self.detail(task.id).await
    }

    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<()> {
        require_admin(auth)?;

        if !self.tasks.delete(id).await? {
            return Err(task_not_found());
        }

        info!(task_id = %id, "Task deleted");
        Ok(())
    }

    /// Marks a task complete or not; open to the assignee and admins
    pub async fn set_completion(
        &self,
        auth: &AuthContext,
        id: Uuid,
        is_completed: Option<bool>,
        completion_date: Option<DateTime<Utc>>,
    ) -> ServiceResult<TaskDetail> {
        let mut task = self.tasks.find_by_id(id).await?.ok_or_else(task_not_found)?;
        require_task_access(auth, task.assigned_to)?;

        let now = Utc::now();
        task.apply_completion(is_completed, completion_date, now);
        task.touch(now);
        self.tasks.save(&task).await?;

        info!(task_id = %task.id, is_completed = task.is_completed, "Task completion updated");
        self.detail(task.id).await
    }

    async fn ensure_user_exists(&self, id: Uuid) -> ServiceResult<()> {
        match self.users.find_by_id(id).await? {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound("Assigned user not found".to_string())),
        }
    }

    async fn detail(&self, id: Uuid) -> ServiceResult<TaskDetail> {
        self.tasks.find_detail(id).await?.ok_or_else(task_not_found)
    }
}

fn task_not_found() -> ServiceError {
    ServiceError::NotFound("Task not found".to_string())
}
