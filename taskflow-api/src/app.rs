/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskflow_api::{app::{build_router, AppState}, config::Config};
/// use taskflow_shared::{notify::LogMailer, store::{PgTaskStore, PgUserStore}};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = sqlx::PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(
///     Arc::new(PgUserStore::new(pool.clone())),
///     Arc::new(PgTaskStore::new(pool)),
///     Arc::new(LogMailer),
///     config,
/// );
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    middleware::{auth::jwt_auth_layer, security::SecurityHeadersLayer},
    routes,
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskflow_shared::{
    notify::Mailer,
    services::Services,
    store::{TaskStore, UserStore},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every field
/// is reference-counted.
#[derive(Clone)]
pub struct AppState {
    /// Identity, task, and user services
    pub services: Services,

    /// User gateway, kept for health checks
    pub users: Arc<dyn UserStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        tasks: Arc<dyn TaskStore>,
        mailer: Arc<dyn Mailer>,
        config: Config,
    ) -> Self {
        let services = Services::new(users.clone(), tasks, mailer, config.identity_settings());
        Self {
            services,
            users,
            config: Arc::new(config),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health
/// └── /api/
///     ├── /auth/
///     │   ├── POST /invite-admin                 (public)
///     │   ├── POST /invite-user                  (admin)
///     │   ├── POST /verify-otp                   (public)
///     │   ├── POST /resend-otp                   (public)
///     │   ├── POST /setup-password               (public)
///     │   ├── POST /login                        (public)
///     │   ├── GET  /me                           (authenticated)
///     │   ├── POST /forgot-password              (public)
///     │   └── PUT  /reset-password/:resettoken   (public)
///     ├── /users/                                (authenticated)
///     │   ├── GET, POST /
///     │   ├── PUT  /change-password
///     │   └── GET, PUT, DELETE /:id
///     └── /tasks/                                (authenticated)
///         ├── GET, POST /
///         ├── GET, PUT, DELETE /:id
///         └── PUT /:id/completion
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (per-router basis)
pub fn build_router(state: AppState) -> Router {
    let auth = || axum::middleware::from_fn_with_state(state.clone(), jwt_auth_layer);

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/invite-admin", post(routes::auth::invite_admin))
        .route("/verify-otp", post(routes::auth::verify_otp))
        .route("/resend-otp", post(routes::auth::resend_otp))
        .route("/setup-password", post(routes::auth::setup_password))
        .route("/login", post(routes::auth::login))
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route("/reset-password/:resettoken", put(routes::auth::reset_password));

    let protected_auth_routes = Router::new()
        .route("/invite-user", post(routes::auth::invite_user))
        .route("/me", get(routes::auth::me))
        .layer(auth());

    let user_routes = Router::new()
        .route("/", get(routes::users::list_users).post(routes::users::create_user))
        .route("/change-password", put(routes::users::change_password))
        .route(
            "/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .layer(auth());

    let task_routes = Router::new()
        .route("/", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route("/:id/completion", put(routes::tasks::set_completion))
        .layer(auth());

    let api_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/users", user_routes)
        .nest("/tasks", task_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let production = state.config.api.production;

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(production))
        .with_state(state)
}
