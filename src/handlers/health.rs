use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET /health - liveness plus storage reachability
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.studies.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "storage": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "storage unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "storage_error": e.to_string()
                    }
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use serde_json::Value;
    use uuid::Uuid;

    use super::*;
    use crate::database::models::{Cluster, NewStudy, Study, StudySummary, StudyUpdate};
    use crate::database::DatabaseError;
    use crate::services::{CreateError, MemoryStudyStore, MemoryUserDirectory, StudyStore};

    /// Every call fails as if the pool could not hand out a connection
    struct UnreachableStore;

    fn unreachable() -> DatabaseError {
        DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)
    }

    #[async_trait]
    impl StudyStore for UnreachableStore {
        async fn get_studies(&self, _user_id: Uuid) -> Result<Vec<StudySummary>, DatabaseError> {
            Err(unreachable())
        }

        async fn get_study(&self, _study_id: &str, _user_id: Uuid) -> Result<Option<Study>, DatabaseError> {
            Err(unreachable())
        }

        async fn get_clusters(&self, _study_id: &str, _user_id: Uuid) -> Result<Option<Vec<Cluster>>, DatabaseError> {
            Err(unreachable())
        }

        async fn create_study(&self, _user_id: Uuid, _study: NewStudy) -> Result<StudySummary, CreateError> {
            Err(CreateError::Database(unreachable()))
        }

        async fn update_study(
            &self,
            _study_id: &str,
            _user_id: Uuid,
            _edit_date: DateTime<Utc>,
            _update: StudyUpdate,
        ) -> Result<bool, DatabaseError> {
            Err(unreachable())
        }

        async fn delete_study(&self, _study_id: &str, _user_id: Uuid) -> Result<bool, DatabaseError> {
            Err(unreachable())
        }

        async fn health_check(&self) -> Result<(), DatabaseError> {
            Err(unreachable())
        }
    }

    async fn check_health(studies: Arc<dyn StudyStore>) -> (StatusCode, Value) {
        let state = AppState::new(studies, Arc::new(MemoryUserDirectory::new("secret")), "/auth/");
        let response = health(State(state)).await.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn reachable_storage_is_ok() {
        let (status, body) = check_health(Arc::new(MemoryStudyStore::new())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["storage"], "ok");
    }

    #[tokio::test]
    async fn failing_storage_is_degraded() {
        let (status, body) = check_health(Arc::new(UnreachableStore)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert_eq!(body["data"]["status"], "degraded");
        assert!(body["data"]["storage_error"].as_str().is_some_and(|e| !e.is_empty()));
    }
}
