/// Database layer
///
/// - `pool`: PostgreSQL connection pool with startup health check
/// - `migrations`: Embedded schema migrations
///
/// Queries live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
