//! # Taskflow Shared Library
//!
//! This crate contains the domain types, persistence gateways, and business
//! logic behind the Taskflow API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, session tokens, OTP/reset secrets, role checks
//! - `models`: User and task records
//! - `db`: PostgreSQL pool and migrations
//! - `store`: Persistence gateway traits with PostgreSQL and in-memory backends
//! - `query`: Translation of list query parameters into scoped task queries
//! - `notify`: Email delivery
//! - `services`: Identity & onboarding engine, task and user services
//! - `error`: Domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod query;
pub mod services;
pub mod store;

/// Current version of the Taskflow shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
