/// Task model
///
/// A task is assigned to exactly one user and created by an admin.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description VARCHAR(1250),
///     start_date TIMESTAMPTZ NOT NULL,
///     end_date TIMESTAMPTZ NOT NULL,
///     completion_date TIMESTAMPTZ,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     assigned_to UUID NOT NULL REFERENCES users(id),
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT tasks_schedule_check CHECK (end_date >= start_date)
/// );
/// ```
///
/// `updated_at` is refreshed by [`Task::touch`] before every save rather than
/// by a trigger, so the timestamp change is visible at the call site.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum description length (characters)
pub const MAX_DESCRIPTION_LENGTH: usize = 1250;
pub const MAX_NAME_LENGTH: usize = 255;

/// Task record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,

    /// Present only while `is_completed` is true
    pub completion_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_completed: bool,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Checks the record-level invariants
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(
            &self.name,
            self.description.as_deref(),
            self.start_date,
            self.end_date,
        )
    }

    /// Refreshes the modification timestamp
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    /// Applies a completion update
    ///
    /// An explicit `completion_date` wins. Marking complete without a date
    /// stamps `now` unless a date already exists. A task that ends up not
    /// completed never keeps a completion date.
    pub fn apply_completion(
        &mut self,
        is_completed: Option<bool>,
        completion_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        if let Some(flag) = is_completed {
            self.is_completed = flag;
        }

        if !self.is_completed {
            self.completion_date = None;
            return;
        }

        match completion_date {
            Some(date) => self.completion_date = Some(date),
            None if self.completion_date.is_none() => self.completion_date = Some(now),
            None => {}
        }
    }
}

/// Input for creating a task
#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub assigned_to: Uuid,
    pub created_by: Uuid,
}

impl NewTask {
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(
            &self.name,
            self.description.as_deref(),
            self.start_date,
            self.end_date,
        )
    }

    /// Materialises the record with a fresh id and timestamps
    pub fn into_task(self, id: Uuid, now: DateTime<Utc>) -> Task {
        Task {
            id,
            name: self.name,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            completion_date: None,
            is_active: self.is_active,
            is_completed: false,
            assigned_to: self.assigned_to,
            created_by: self.created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial task update applied by an admin
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub assigned_to: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl TaskPatch {
    pub fn apply(self, task: &mut Task) {
        if let Some(v) = self.name.filter(|n| !n.trim().is_empty()) {
            task.name = v;
        }
        if let Some(v) = self.description {
            task.description = Some(v);
        }
        if let Some(v) = self.start_date {
            task.start_date = v;
        }
        if let Some(v) = self.end_date {
            task.end_date = v;
        }
        if let Some(v) = self.assigned_to {
            task.assigned_to = v;
        }
        if let Some(v) = self.is_active {
            task.is_active = v;
        }
    }
}

/// Minimal user projection embedded in task responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Task with `assignedTo` and `createdBy` resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub is_completed: bool,
    pub assigned_to: UserRef,
    pub created_by: UserRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskDetail {
    pub fn new(task: Task, assigned_to: UserRef, created_by: UserRef) -> Self {
        Self {
            id: task.id,
            name: task.name,
            description: task.description,
            start_date: task.start_date,
            end_date: task.end_date,
            completion_date: task.completion_date,
            is_active: task.is_active,
            is_completed: task.is_completed,
            assigned_to,
            created_by,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

fn validate_fields(
    name: &str,
    description: Option<&str>,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Task name is required".to_string());
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(format!("Task name cannot be more than {} characters", MAX_NAME_LENGTH));
    }

    if let Some(desc) = description {
        if desc.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(format!(
                "Description cannot be more than {} characters",
                MAX_DESCRIPTION_LENGTH
            ));
        }
    }

    if end_date < start_date {
        return Err("End date must be after or equal to start date".to_string());
    }

    Ok(())
}
