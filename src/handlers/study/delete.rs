use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    Extension,
};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::IdQuery;

/// DELETE /study?id=<id> - 204 when removed, 500 when nothing was deleted
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RawQuery(raw): RawQuery,
) -> Result<StatusCode, ApiError> {
    let query = IdQuery::from_raw(raw.as_deref());
    let study_id = query.require_id()?;

    if state.studies.delete_study(study_id, user.user_id).await? {
        tracing::info!("Deleted study {} for user {}", study_id, user.user_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        tracing::warn!("Delete of study {} by user {} failed", study_id, user.user_id);
        Ok(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
