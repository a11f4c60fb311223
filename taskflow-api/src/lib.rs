//! # Taskflow API Server Library
//!
//! HTTP surface of Taskflow: routing, request validation, authentication
//! middleware, and the mapping from service errors to JSON responses.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration from environment variables
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating JSON and path extractors
//! - `middleware`: JWT authentication and security headers
//! - `response`: Success envelope
//! - `routes`: API route handlers
//! - `validation`: Custom field validators

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod validation;
