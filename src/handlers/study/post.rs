use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::study::{DEFAULT_SORT_TYPE, UNDEFINED_LINK};
use crate::database::models::NewStudy;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::CreateError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudyRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub cards: Option<Value>,
    pub message: Option<String>,
    pub link: Option<String>,
    pub sort_type: Option<String>,
    pub categories: Option<Value>,
}

impl CreateStudyRequest {
    /// Apply defaults and check required fields
    pub fn into_new_study(self) -> Result<NewStudy, ApiError> {
        let mut missing = Vec::new();
        if self.title.is_none() {
            missing.push("title");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.cards.is_none() {
            missing.push("cards");
        }
        if self.message.is_none() {
            missing.push("message");
        }

        match (self.title, self.description, self.cards, self.message) {
            (Some(title), Some(description), Some(cards), Some(message)) => Ok(NewStudy {
                title,
                description,
                cards,
                message,
                link: self.link.unwrap_or_else(|| UNDEFINED_LINK.to_string()),
                sort_type: self.sort_type.unwrap_or_else(|| DEFAULT_SORT_TYPE.to_string()),
                categories: self.categories.unwrap_or_else(|| json!({})),
            }),
            _ => Err(ApiError::missing_fields(missing)),
        }
    }
}

/// POST /study - create a study owned by the caller
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateStudyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let new_study = request.into_new_study()?;

    let study = match state.studies.create_study(user.user_id, new_study).await {
        Ok(summary) => summary,
        Err(CreateError::Invalid(message)) => {
            tracing::debug!("Study creation rejected for user {}: {}", user.user_id, message);
            return Ok((StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response());
        }
        Err(CreateError::Database(err)) => return Err(err.into()),
    };

    Ok(Json(json!({ "study": study })).into_response())
}
