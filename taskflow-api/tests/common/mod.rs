/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory stores and a recording mailer behind the real router
/// - Seeded admin account and session token
/// - Request helpers returning status and parsed JSON body

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use taskflow_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskflow_shared::{
    auth::{
        jwt::{create_token, Claims},
        password::hash_password,
    },
    models::user::{NewUser, Role, User},
    notify::{templates, MemoryMailer},
    store::{MemoryStore, UserStore},
};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "admin-password";

/// Test context with an in-memory backend
pub struct TestContext {
    pub app: Router,
    pub config: Config,
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<MemoryMailer>,
    pub admin: User,
    pub admin_token: String,
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "postgresql://unused"),
        ("JWT_SECRET", "integration-test-secret-at-least-32-chars"),
        ("PUBLIC_URL", "http://taskflow.test"),
    ]);

    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
        .expect("test configuration is valid")
}

impl TestContext {
    /// Builds the app and seeds an active admin with a password
    pub async fn new() -> Self {
        let config = test_config();
        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(MemoryMailer::new());

        let admin = seed_user(&store, ADMIN_EMAIL, ADMIN_PASSWORD, Role::Admin).await;
        let admin_token = token_for(&config, &admin);

        let state = AppState::new(store.clone(), store.clone(), mailer.clone(), config.clone());
        let app = build_router(state);

        Self {
            app,
            config,
            store,
            mailer,
            admin,
            admin_token,
        }
    }

    /// Sends a request and returns the status with the JSON body (`Null` if empty)
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("host", "taskflow.test");

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("non-JSON body: {}", String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.request("PUT", uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, None).await
    }

    /// OTP from the most recent email to `email`
    pub fn last_otp(&self, email: &str) -> String {
        let message = self.mailer.last_to(email).expect("no email sent");
        templates::extract_otp(&message.html).expect("email carries an OTP")
    }

    /// Reset token from the most recent email to `email`
    pub fn last_reset_token(&self, email: &str) -> String {
        let message = self.mailer.last_to(email).expect("no email sent");
        templates::extract_reset_token(&message.html).expect("email carries a reset link")
    }

    /// Seeds an active user with a password and returns it with a session token
    pub async fn user_with_token(&self, email: &str, role: Role) -> (User, String) {
        let user = seed_user(&self.store, email, "user-password", role).await;
        let token = token_for(&self.config, &user);
        (user, token)
    }
}

pub async fn seed_user(store: &MemoryStore, email: &str, password: &str, role: Role) -> User {
    let mut new_user = NewUser::invited(
        "Test".to_string(),
        "User".to_string(),
        email.to_string(),
        "+1234567890".to_string(),
        None,
        role,
    );
    new_user.password_hash = Some(hash_password(password).unwrap());
    new_user.is_first_login = false;

    UserStore::insert(store, new_user).await.unwrap()
}

pub fn token_for(config: &Config, user: &User) -> String {
    let claims = Claims::new(user.id, user.role, Duration::hours(1));
    create_token(&claims, &config.jwt.secret).unwrap()
}
