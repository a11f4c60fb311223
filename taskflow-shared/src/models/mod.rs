/// Domain records for Taskflow
///
/// Models are plain data: persistence lives behind the gateways in
/// [`crate::store`], and pre-persist steps (password hashing, timestamp
/// refresh, completion rules) are explicit methods invoked by the services.
///
/// # Models
///
/// - `user`: Accounts, roles, onboarding secrets, response projections
/// - `task`: Tasks, patches, and the populated `TaskDetail` view

pub mod task;
pub mod user;
