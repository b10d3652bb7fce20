use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use thiserror::Error;

use crate::cli::config::EnvironmentConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("not authenticated; sign in at {location} and run `study auth login --token <token>`")]
    Unauthenticated { location: String },
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Thin HTTP client for the /study resource
pub struct StudyClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// Response of a call whose body may be empty (PUT, DELETE)
#[derive(Debug)]
pub struct Outcome {
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl StudyClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn from_config(config: &EnvironmentConfig) -> Self {
        Self::new(config.server_url.clone(), config.token.clone())
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Outcome, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str::<Value>(&text).ok()
        };

        if status == StatusCode::UNAUTHORIZED {
            let location = body
                .as_ref()
                .and_then(|b| b.get("location"))
                .and_then(Value::as_str)
                .unwrap_or("the login page")
                .to_string();
            return Err(ClientError::Unauthenticated { location });
        }

        Ok(Outcome { status, body })
    }

    /// Like `send`, but any non-2xx status becomes an error
    async fn send_ok(&self, builder: RequestBuilder) -> Result<Value, ClientError> {
        let outcome = self.send(builder).await?;
        if !outcome.status.is_success() {
            return Err(ClientError::Status {
                status: outcome.status,
                body: outcome.body.map(|b| b.to_string()).unwrap_or_default(),
            });
        }
        Ok(outcome.body.unwrap_or(Value::Null))
    }

    pub async fn health(&self) -> Result<Outcome, ClientError> {
        self.send(self.request(Method::GET, "/health")).await
    }

    pub async fn username(&self) -> Result<Value, ClientError> {
        self.send_ok(self.request(Method::GET, "/study").query(&[("username", "1")])).await
    }

    pub async fn list(&self) -> Result<Value, ClientError> {
        self.send_ok(self.request(Method::GET, "/study")).await
    }

    pub async fn show(&self, id: &str, clusters: bool) -> Result<Value, ClientError> {
        let mut builder = self.request(Method::GET, "/study").query(&[("id", id)]);
        if clusters {
            builder = builder.query(&[("clusters", "1")]);
        }
        self.send_ok(builder).await
    }

    pub async fn create(&self, body: &Value) -> Result<Outcome, ClientError> {
        self.send(self.request(Method::POST, "/study").json(body)).await
    }

    pub async fn update(&self, id: &str, body: &Value) -> Result<Outcome, ClientError> {
        self.send(self.request(Method::PUT, "/study").query(&[("id", id)]).json(body)).await
    }

    pub async fn delete(&self, id: &str) -> Result<Outcome, ClientError> {
        self.send(self.request(Method::DELETE, "/study").query(&[("id", id)])).await
    }
}
