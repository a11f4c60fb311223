/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Invitation, OTP verification, login, and password recovery
/// - `users`: Admin user management and password changes
/// - `tasks`: Task listing and management

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
