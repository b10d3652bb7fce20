// handlers/study - the /study resource, one file per verb.
// Every route here sits behind middleware::require_auth, so handlers receive an AuthUser.

pub mod delete;
pub mod get;
pub mod post;
pub mod put;

pub use delete::delete;
pub use get::get;
pub use post::post;
pub use put::put;

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ApiError;

/// Decoded query string keeping the first value of a repeated key
#[derive(Debug, Default)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut params = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
        }
        QueryParams(params)
    }

    pub fn take(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }
}

/// `?id=` for the verbs that target one study
#[derive(Debug, Default)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn from_raw(raw: Option<&str>) -> Self {
        let mut params = QueryParams::parse(raw);
        IdQuery { id: params.take("id") }
    }

    pub fn require_id(&self) -> Result<&str, ApiError> {
        is_set(&self.id).ok_or_else(|| ApiError::bad_request("Missing study id"))
    }
}

/// A query parameter counts as set only when present and non-empty
pub fn is_set(param: &Option<String>) -> Option<&str> {
    param.as_deref().filter(|value| !value.is_empty())
}

/// Loose truthiness for JSON flags: false, 0, "", null, [] and {} are all false
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
