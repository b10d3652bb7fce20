use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::state::AppState;

/// Caller identity resolved from the Authorization header
#[derive(Clone, Copy, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Guard placed in front of every study route. Rejected callers get a 401 whose
/// body tells the client where to sign in.
pub async fn require_auth(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match state.users.validate_request(header.as_deref()).await {
        Ok(user_id) => {
            tracing::debug!("Authenticated request for user {}", user_id);
            request.extensions_mut().insert(AuthUser { user_id });
            next.run(request).await
        }
        Err(AuthError::Database(err)) => {
            tracing::error!("User lookup failed during authentication: {}", err);
            ApiError::from(err).into_response()
        }
        Err(err) => {
            tracing::warn!("Authentication rejected: {}", err);
            auth_redirect_response(&state.auth_redirect)
        }
    }
}

pub fn auth_redirect_response(location: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "location": location }))).into_response()
}
