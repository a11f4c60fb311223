/// Middleware modules for the API server
///
/// - `auth`: Bearer-token authentication
/// - `security`: Security response headers

pub mod auth;
pub mod security;
