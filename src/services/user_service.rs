use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{claims_from_header, AuthError};
use crate::database::manager::DatabaseError;

/// Maps an opaque Authorization header to a known user
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn validate_request(&self, auth_header: Option<&str>) -> Result<Uuid, AuthError>;

    async fn get_username(&self, user_id: Uuid) -> Result<Option<String>, DatabaseError>;
}

/// Bearer-JWT validation backed by the `users` table
pub struct PgUserDirectory {
    pool: PgPool,
    jwt_secret: String,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool, jwt_secret: impl Into<String>) -> Self {
        Self {
            pool,
            jwt_secret: jwt_secret.into(),
        }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn validate_request(&self, auth_header: Option<&str>) -> Result<Uuid, AuthError> {
        let claims = claims_from_header(auth_header, &self.jwt_secret)?;

        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(claims.sub)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        if !exists {
            return Err(AuthError::UnknownUser(claims.sub));
        }
        Ok(claims.sub)
    }

    async fn get_username(&self, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
        let username: Option<(String,)> = sqlx::query_as("SELECT username FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(username.map(|(name,)| name))
    }
}
