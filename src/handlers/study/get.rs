use axum::{
    extract::{RawQuery, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::{is_set, QueryParams};

#[derive(Debug, Default)]
pub struct StudyQuery {
    pub username: Option<String>,
    pub id: Option<String>,
    pub clusters: Option<String>,
}

impl StudyQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut params = QueryParams::parse(raw);
        StudyQuery {
            username: params.take("username"),
            id: params.take("id"),
            clusters: params.take("clusters"),
        }
    }
}

/// GET /study
///
/// - `?username=1`            → `{"username": ...}` of the caller
/// - `?id=<id>&clusters=1`    → `{"clusters": [...]}`
/// - `?id=<id>`               → `{"study": {...}}`
/// - no parameters            → `{"studies": [...]}` owned by the caller
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RawQuery(raw): RawQuery,
) -> Result<Json<Value>, ApiError> {
    let query = StudyQuery::from_raw(raw.as_deref());

    if is_set(&query.username).is_some() {
        let username = state
            .users
            .get_username(user.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        return Ok(Json(json!({ "username": username })));
    }

    if let Some(study_id) = is_set(&query.id) {
        if is_set(&query.clusters).is_some() {
            let clusters = state
                .studies
                .get_clusters(study_id, user.user_id)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("Study {} not found", study_id)))?;
            tracing::debug!("Loaded {} clusters for study {}", clusters.len(), study_id);
            return Ok(Json(json!({ "clusters": clusters })));
        }

        let study = state
            .studies
            .get_study(study_id, user.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Study {} not found", study_id)))?;
        return Ok(Json(json!({ "study": study })));
    }

    let studies = state.studies.get_studies(user.user_id).await?;
    Ok(Json(json!({ "studies": studies })))
}
