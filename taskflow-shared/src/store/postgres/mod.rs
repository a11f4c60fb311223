/// PostgreSQL gateways
///
/// Both stores wrap a cloned `PgPool`; creating them is free.

mod task;
mod user;

pub use task::PgTaskStore;
pub use user::PgUserStore;
