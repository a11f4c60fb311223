/// Admin user management

use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::auth::{authorization::require_admin, middleware::AuthContext, password};
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{
    normalize_email, validate_profile, Address, NewUser, Role, UserPatch, UserProfile,
};
use crate::query::{Page, Pagination};
use crate::store::{TaskStore, UserStore};

/// Fields an admin supplies to create an account directly
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub mobile_number: String,
    pub address: Option<Address>,
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserPage {
    pub count: usize,
    pub total: u64,
    pub pagination: Pagination,
    pub data: Vec<UserProfile>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    tasks: Arc<dyn TaskStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, tasks: Arc<dyn TaskStore>) -> Self {
        Self { users, tasks }
    }

    pub async fn list(&self, auth: &AuthContext, page: Page) -> ServiceResult<UserPage> {
        require_admin(auth)?;

        let total = self.users.count().await?;
        let data: Vec<UserProfile> = self
            .users
            .list(page)
            .await?
            .iter()
            .map(UserProfile::from)
            .collect();

        Ok(UserPage {
            count: data.len(),
            total,
            pagination: page.links(total),
            data,
        })
    }

    pub async fn get(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<UserProfile> {
        require_admin(auth)?;
        self.users
            .find_by_id(id)
            .await?
            .map(|u| UserProfile::from(&u))
            .ok_or_else(user_not_found)
    }

    /// Creates an active account with its password already set
    pub async fn create(&self, auth: &AuthContext, input: CreateUser) -> ServiceResult<UserProfile> {
        require_admin(auth)?;
        password::validate_password(&input.password).map_err(ServiceError::BadRequest)?;

        let email = normalize_email(&input.email);
        validate_profile(&input.first_name, &input.last_name, &email, &input.mobile_number)
            .map_err(ServiceError::BadRequest)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("User already exists".to_string()));
        }

        let user = self
            .users
            .insert(NewUser {
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                email,
                password_hash: Some(password::hash_password(&input.password)?),
                mobile_number: input.mobile_number.trim().to_string(),
                address: input.address,
                role: input.role.unwrap_or_default(),
                is_active: true,
                is_first_login: false,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, created_by = %auth.user_id, "User created");
        Ok(UserProfile::from(&user))
    }

    pub async fn update(&self, auth: &AuthContext, id: Uuid, mut patch: UserPatch) -> ServiceResult<UserProfile> {
        require_admin(auth)?;

        let mut user = self.users.find_by_id(id).await?.ok_or_else(user_not_found)?;

        if let Some(email) = patch.email.take() {
            let email = normalize_email(&email);
            if let Some(other) = self.users.find_by_email(&email).await? {
                if other.id != user.id {
                    return Err(ServiceError::Conflict("Email already in use".to_string()));
                }
            }
            patch.email = Some(email);
        }

        patch.apply(&mut user);
        user.validate().map_err(ServiceError::BadRequest)?;
        self.users.save(&user).await?;

        info!(user_id = %user.id, "User updated");
        Ok(UserProfile::from(&user))
    }

    /// Removes a user that no task references
    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<()> {
        require_admin(auth)?;

        if id == auth.user_id {
            return Err(ServiceError::BadRequest(
                "You cannot delete your own account".to_string(),
            ));
        }

        let referencing = self.tasks.count_referencing(id).await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "User is referenced by {} task(s)",
                referencing
            )));
        }

        if !self.users.delete(id).await? {
            return Err(user_not_found());
        }

        info!(user_id = %id, deleted_by = %auth.user_id, "User deleted");
        Ok(())
    }
}

fn user_not_found() -> ServiceError {
    ServiceError::NotFound("User not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::task::NewTask;
    use crate::store::MemoryStore;
    use chrono::{Duration, Utc};

    fn admin() -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
        }
    }

    fn input(email: &str) -> CreateUser {
        CreateUser {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            mobile_number: "+15550002222".to_string(),
            address: None,
            role: None,
        }
    }

    fn service() -> (UserService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (UserService::new(store.clone(), store.clone()), store)
    }

    #[tokio::test]
    async fn test_create_sets_password_and_defaults_role() {
        let (service, store) = service();
        let profile = service.create(&admin(), input("G@X.com")).await.unwrap();

        assert_eq!(profile.email, "g@x.com");
        assert_eq!(profile.role, Role::User);
        assert!(profile.is_active);
        assert!(!profile.is_first_login);

        let stored = UserStore::find_by_id(store.as_ref(), profile.id).await.unwrap().unwrap();
        assert!(stored.password_hash.is_some());
    }

    #[tokio::test]
    async fn test_create_requires_admin_and_unique_email() {
        let (service, _) = service();
        let user = AuthContext {
            user_id: Uuid::new_v4(),
            role: Role::User,
        };
        assert!(matches!(
            service.create(&user, input("g@x.com")).await,
            Err(ServiceError::Forbidden(_))
        ));

        service.create(&admin(), input("g@x.com")).await.unwrap();
        assert!(matches!(
            service.create(&admin(), input("g@x.com")).await,
            Err(ServiceError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let (service, _) = service();
        for i in 0..3 {
            service.create(&admin(), input(&format!("u{i}@x.com"))).await.unwrap();
        }

        let page = service
            .list(&admin(), Page::from_raw(Some("1"), Some("2")))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.count, 2);
        assert!(page.pagination.next.is_some());
        assert!(page.pagination.prev.is_none());
    }

    #[tokio::test]
    async fn test_update_checks_email_collision() {
        let (service, _) = service();
        let a = service.create(&admin(), input("a@x.com")).await.unwrap();
        service.create(&admin(), input("b@x.com")).await.unwrap();

        let clash = UserPatch {
            email: Some("B@x.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&admin(), a.id, clash).await,
            Err(ServiceError::Conflict(_))
        ));

        let patch = UserPatch {
            is_active: Some(false),
            role: Some(Role::Admin),
            ..Default::default()
        };
        let updated = service.update(&admin(), a.id, patch).await.unwrap();
        assert!(!updated.is_active);
        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_oversized_names_are_bad_requests() {
        let (service, store) = service();

        let mut long = input("long@x.com");
        long.first_name = "x".repeat(101);
        assert!(matches!(
            service.create(&admin(), long).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(UserStore::find_by_email(store.as_ref(), "long@x.com").await.unwrap().is_none());

        let user = service.create(&admin(), input("short@x.com")).await.unwrap();
        let patch = UserPatch {
            last_name: Some("y".repeat(101)),
            ..Default::default()
        };
        assert!(matches!(
            service.update(&admin(), user.id, patch).await,
            Err(ServiceError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let (service, store) = service();
        let me = service.create(&admin(), input("me@x.com")).await.unwrap();
        let busy = service.create(&admin(), input("busy@x.com")).await.unwrap();
        let idle = service.create(&admin(), input("idle@x.com")).await.unwrap();

        let now = Utc::now();
        TaskStore::insert(
            store.as_ref(),
            NewTask {
                name: "Job".to_string(),
                description: None,
                start_date: now,
                end_date: now + Duration::days(1),
                is_active: true,
                assigned_to: busy.id,
                created_by: me.id,
            },
        )
        .await
        .unwrap();

        let me_ctx = AuthContext {
            user_id: me.id,
            role: Role::Admin,
        };

        assert!(matches!(
            service.delete(&me_ctx, me.id).await,
            Err(ServiceError::BadRequest(_))
        ));
        assert!(matches!(
            service.delete(&me_ctx, busy.id).await,
            Err(ServiceError::Conflict(_))
        ));

        service.delete(&me_ctx, idle.id).await.unwrap();
        assert!(matches!(
            service.get(&me_ctx, idle.id).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.delete(&me_ctx, idle.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
