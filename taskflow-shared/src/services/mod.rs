/// Business services
///
/// Each service holds its gateways as trait objects, so the same code runs
/// against PostgreSQL in production and [`crate::store::MemoryStore`] in
/// tests.

pub mod identity;
pub mod tasks;
pub mod users;

use std::sync::Arc;

pub use identity::{IdentityService, IdentitySettings, InviteOutcome, LoginOutcome, UserInvite};
pub use tasks::{CreateTask, TaskPage, TaskService};
pub use users::{CreateUser, UserPage, UserService};

use crate::notify::Mailer;
use crate::store::{TaskStore, UserStore};

/// All services wired to one set of gateways
#[derive(Clone)]
pub struct Services {
    pub identity: IdentityService,
    pub tasks: TaskService,
    pub users: UserService,
}

impl Services {
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        mailer: Arc<dyn Mailer>,
        settings: IdentitySettings,
    ) -> Self {
        Self {
            identity: IdentityService::new(users.clone(), mailer, settings),
            tasks: TaskService::new(tasks.clone(), users.clone()),
            users: UserService::new(users, tasks),
        }
    }
}
