/// In-memory store
///
/// Implements both gateways over `RwLock`-guarded maps and enforces the same
/// constraints as the SQL schema (unique email, schedule check, no password
/// during first login, foreign keys), so services behave identically against
/// either backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::task::{NewTask, Task, TaskDetail, UserRef};
use crate::models::user::{NewUser, User};
use crate::query::{compare_tasks, Filter, Page, TaskQuery};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_user(user: &User) -> StoreResult<()> {
    user.validate().map_err(StoreError::Invalid)?;

    if user.is_first_login && user.password_hash.is_some() {
        return Err(StoreError::Invalid(
            "Password cannot be set while first login is pending".to_string(),
        ));
    }
    Ok(())
}

fn user_ref(users: &HashMap<Uuid, User>, id: Uuid) -> StoreResult<UserRef> {
    users
        .get(&id)
        .map(|u| UserRef {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
        })
        .ok_or_else(|| StoreError::Reference(format!("user {}", id)))
}

fn detail(users: &HashMap<Uuid, User>, task: &Task) -> StoreResult<TaskDetail> {
    Ok(TaskDetail::new(
        task.clone(),
        user_ref(users, task.assigned_to)?,
        user_ref(users, task.created_by)?,
    ))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn insert(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email".to_string()));
        }

        let user = user.into_user(Uuid::new_v4(), Utc::now());
        check_user(&user)?;
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_otp(
        &self,
        email: &str,
        otp_digest: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email && u.otp_matches(otp_digest, now))
            .cloned())
    }

    async fn find_by_reset_token(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.reset_token_matches(token_digest, now))
            .cloned())
    }

    async fn save(&self, user: &User) -> StoreResult<()> {
        check_user(user)?;
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(StoreError::NotFound("User".to_string()));
        }

        if users.values().any(|u| u.id != user.id && u.email == user.email) {
            return Err(StoreError::Duplicate("email".to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn list(&self, page: Page) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut all: Vec<&User> = users.values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        Ok(all
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let tasks = self.tasks.read().await;
        if tasks.values().any(|t| t.assigned_to == id || t.created_by == id) {
            return Err(StoreError::Reference("tasks".to_string()));
        }

        Ok(self.users.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert(&self, task: NewTask) -> StoreResult<Task> {
        task.validate().map_err(StoreError::Invalid)?;

        {
            let users = self.users.read().await;
            user_ref(&users, task.assigned_to)?;
            user_ref(&users, task.created_by)?;
        }

        let task = task.into_task(Uuid::new_v4(), Utc::now());
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).cloned())
    }

    async fn find_detail(&self, id: Uuid) -> StoreResult<Option<TaskDetail>> {
        let tasks = self.tasks.read().await;
        let Some(task) = tasks.get(&id) else {
            return Ok(None);
        };

        let users = self.users.read().await;
        detail(&users, task).map(Some)
    }

    async fn save(&self, task: &Task) -> StoreResult<()> {
        task.validate().map_err(StoreError::Invalid)?;

        {
            let users = self.users.read().await;
            user_ref(&users, task.assigned_to)?;
            user_ref(&users, task.created_by)?;
        }

        let mut tasks = self.tasks.write().await;
        if !tasks.contains_key(&task.id) {
            return Err(StoreError::NotFound("Task".to_string()));
        }

        tasks.insert(task.id, task.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tasks.write().await.remove(&id).is_some())
    }

    async fn count(&self, filter: &Filter) -> StoreResult<u64> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| filter.matches(t))
            .count() as u64)
    }

    async fn find(&self, query: &TaskQuery) -> StoreResult<Vec<TaskDetail>> {
        let tasks = self.tasks.read().await;
        let mut matching: Vec<&Task> = tasks.values().filter(|t| query.filter.matches(t)).collect();
        matching.sort_by(|a, b| compare_tasks(a, b, &query.sort));

        let users = self.users.read().await;
        matching
            .into_iter()
            .skip(query.page.skip() as usize)
            .take(query.page.limit as usize)
            .map(|t| detail(&users, t))
            .collect()
    }

    async fn count_referencing(&self, user_id: Uuid) -> StoreResult<u64> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.assigned_to == user_id || t.created_by == user_id)
            .count() as u64)
    }
}
