use axum::{
    extract::{rejection::JsonRejection, RawQuery, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::database::models::StudyUpdate;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::state::AppState;

use super::{truthy, IdQuery};

/// Build a partial update from the recognized body keys.
/// A falsy `isLive` ends the study, stamping `end_date` with `now`.
pub fn build_update(body: &Map<String, Value>, now: DateTime<Utc>) -> Result<StudyUpdate, ApiError> {
    let mut update = StudyUpdate::default();

    if let Some(title) = body.get("title") {
        update.title = Some(string_field("title", title)?);
    }

    if let Some(is_live) = body.get("isLive") {
        let live = truthy(is_live);
        update.is_live = Some(live);
        if !live {
            update.end_date = Some(now);
        }
    }

    if let Some(description) = body.get("description") {
        update.description = Some(string_field("description", description)?);
    }

    Ok(update)
}

fn string_field(name: &str, value: &Value) -> Result<String, ApiError> {
    value.as_str().map(str::to_owned).ok_or_else(|| {
        let field_errors = [(name.to_string(), "Must be a string".to_string())].into_iter().collect();
        ApiError::validation_error("Invalid field format", Some(field_errors))
    })
}

/// PUT /study?id=<id> - edit title, description or live status.
/// 200 on success, 400 when the body names no editable field.
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    RawQuery(raw): RawQuery,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let query = IdQuery::from_raw(raw.as_deref());
    let study_id = query.require_id()?;
    let Json(body) = payload?;
    let body = body
        .as_object()
        .ok_or_else(|| ApiError::invalid_json("Request body must be a JSON object"))?;

    let edit_date = Utc::now();
    let update = build_update(body, edit_date)?;

    if update.is_empty() {
        return Ok(StatusCode::BAD_REQUEST);
    }

    if state.studies.update_study(study_id, user.user_id, edit_date, update).await? {
        tracing::debug!("Updated study {}", study_id);
        Ok(StatusCode::OK)
    } else {
        tracing::warn!("Update of study {} by user {} matched nothing", study_id, user.user_id);
        Ok(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
