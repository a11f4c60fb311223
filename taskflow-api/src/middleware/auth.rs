/// JWT authentication middleware
///
/// Validates the `Authorization: Bearer <token>` header and injects the
/// caller's `AuthContext` into request extensions, where handlers pick it
/// up with `Extension<AuthContext>`. Role checks happen in the services.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use taskflow_shared::auth::middleware::authenticate;

use crate::{app::AppState, error::ApiError};

pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), state.jwt_secret()).map_err(|e| {
        tracing::debug!(error = %e, path = %req.uri().path(), "Rejected request");
        ApiError::from(e)
    })?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
