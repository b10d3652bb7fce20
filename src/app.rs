use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::config::{AppConfig, SecurityConfig, StorageBackend};
use crate::database::{schema, DatabaseManager};
use crate::handlers::{self, study};
use crate::middleware::require_auth;
use crate::services::{MemoryStudyStore, MemoryUserDirectory, PgStudyStore, PgUserDirectory};
use crate::state::AppState;

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let study_routes = Router::new()
        .route(
            "/study",
            get(study::get)
                .post(study::post)
                .put(study::put)
                .delete(study::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let router = Router::new()
        // Public
        .route("/health", get(handlers::health))
        // Protected
        .merge(study_routes)
        .layer(cors_layer(&config.security));

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Wire storage backends according to configuration
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let secret = config.security.jwt_secret.clone();
    if secret.is_empty() {
        warn!("JWT_SECRET is not set; every /study request will be rejected");
    }

    match config.database.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to Postgres")?;
            schema::ensure_schema(&pool).await.context("failed to prepare study schema")?;

            Ok(AppState::new(
                Arc::new(PgStudyStore::new(pool.clone())),
                Arc::new(PgUserDirectory::new(pool, secret)),
                config.auth_redirect(),
            ))
        }
        StorageBackend::Memory => {
            let users = MemoryUserDirectory::new(secret.clone());
            seed_dev_user(&users, &secret, config.security.jwt_expiry_hours).await;

            Ok(AppState::new(
                Arc::new(MemoryStudyStore::new()),
                Arc::new(users),
                config.auth_redirect(),
            ))
        }
    }
}

/// The memory backend has no login service behind it, so register one user and log a token for it
async fn seed_dev_user(users: &MemoryUserDirectory, secret: &str, expiry_hours: u64) {
    let user_id = std::env::var("STUDY_DEV_USER_ID")
        .ok()
        .and_then(|id| Uuid::parse_str(&id).ok())
        .unwrap_or_else(Uuid::new_v4);
    let username = std::env::var("STUDY_DEV_USERNAME").unwrap_or_else(|_| "dev".to_string());

    let user = users.add_user(user_id, &username).await;
    info!("Memory backend: registered user '{}' ({})", user.username, user.id);

    match generate_jwt(&Claims::new(user.id, expiry_hours), secret) {
        Ok(token) => info!("Memory backend: bearer token for '{}': {}", user.username, token),
        Err(e) => warn!("Memory backend: no token minted for '{}': {}", user.username, e),
    }
}
