use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Cluster, NewStudy, Study, StudySummary, StudyUpdate};

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    /// Rejected by validation; the message is reported back to the client
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Persistence for studies and their clusters. Reads are scoped to the owning user.
#[async_trait]
pub trait StudyStore: Send + Sync {
    async fn get_studies(&self, user_id: Uuid) -> Result<Vec<StudySummary>, DatabaseError>;

    async fn get_study(&self, study_id: &str, user_id: Uuid) -> Result<Option<Study>, DatabaseError>;

    /// `None` when the study does not exist for this user
    async fn get_clusters(&self, study_id: &str, user_id: Uuid) -> Result<Option<Vec<Cluster>>, DatabaseError>;

    /// Summary of the stored study, timestamps as persisted
    async fn create_study(&self, user_id: Uuid, study: NewStudy) -> Result<StudySummary, CreateError>;

    /// Returns false when no study matched
    async fn update_study(
        &self,
        study_id: &str,
        user_id: Uuid,
        edit_date: DateTime<Utc>,
        update: StudyUpdate,
    ) -> Result<bool, DatabaseError>;

    /// Returns false when no study matched
    async fn delete_study(&self, study_id: &str, user_id: Uuid) -> Result<bool, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

/// Checks shared by every backend before a study is written
pub fn validate_new_study(study: &NewStudy) -> Result<(), CreateError> {
    if study.title.trim().is_empty() {
        return Err(CreateError::Invalid("Study title must not be empty".to_string()));
    }
    if !study.cards.is_array() {
        return Err(CreateError::Invalid("Study cards must be a list".to_string()));
    }
    if !study.categories.is_object() && !study.categories.is_array() {
        return Err(CreateError::Invalid("Study categories must be an object or a list".to_string()));
    }
    Ok(())
}

pub struct PgStudyStore {
    pool: PgPool,
}

impl PgStudyStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Ids that are not UUIDs cannot exist in Postgres
    fn parse_id(study_id: &str) -> Option<Uuid> {
        Uuid::parse_str(study_id.trim()).ok()
    }
}

const STUDY_COLUMNS: &str = r#"
    id::text AS id, title, description, message, link, cards, sort_type, categories,
    is_live, abandoned_no, completed_no, created_date, launched_date, edit_date, end_date
"#;

#[async_trait]
impl StudyStore for PgStudyStore {
    async fn get_studies(&self, user_id: Uuid) -> Result<Vec<StudySummary>, DatabaseError> {
        let rows = sqlx::query_as::<_, StudySummary>(
            "SELECT id::text AS id, title, abandoned_no, completed_no, edit_date, is_live, launched_date
             FROM studies
             WHERE user_id = $1
             ORDER BY edit_date DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_study(&self, study_id: &str, user_id: Uuid) -> Result<Option<Study>, DatabaseError> {
        let Some(id) = Self::parse_id(study_id) else {
            return Ok(None);
        };

        let query = format!("SELECT {} FROM studies WHERE id = $1 AND user_id = $2", STUDY_COLUMNS);
        let study = sqlx::query_as::<_, Study>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(study)
    }

    async fn get_clusters(&self, study_id: &str, user_id: Uuid) -> Result<Option<Vec<Cluster>>, DatabaseError> {
        let Some(id) = Self::parse_id(study_id) else {
            return Ok(None);
        };

        let (owned,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM studies WHERE id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        if !owned {
            return Ok(None);
        }

        let clusters = sqlx::query_as::<_, Cluster>(
            "SELECT id::text AS id, name, cards, created_date
             FROM clusters
             WHERE study_id = $1
             ORDER BY created_date, name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(clusters))
    }

    async fn create_study(&self, user_id: Uuid, study: NewStudy) -> Result<StudySummary, CreateError> {
        validate_new_study(&study)?;

        let id = Uuid::new_v4();
        let now = Utc::now();

        let summary = sqlx::query_as::<_, StudySummary>(
            "INSERT INTO studies (
                id, user_id, title, description, message, link, cards, sort_type, categories,
                is_live, abandoned_no, completed_no, created_date, launched_date, edit_date
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, 0, 0, $10, $10, $10)
             RETURNING id::text AS id, title, abandoned_no, completed_no, edit_date, is_live, launched_date",
        )
        .bind(id)
        .bind(user_id)
        .bind(&study.title)
        .bind(&study.description)
        .bind(&study.message)
        .bind(&study.link)
        .bind(&study.cards)
        .bind(&study.sort_type)
        .bind(&study.categories)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        tracing::info!("Created study {} for user {}", summary.id, user_id);
        Ok(summary)
    }

    async fn update_study(
        &self,
        study_id: &str,
        user_id: Uuid,
        edit_date: DateTime<Utc>,
        update: StudyUpdate,
    ) -> Result<bool, DatabaseError> {
        let Some(id) = Self::parse_id(study_id) else {
            return Ok(false);
        };

        let result = sqlx::query(
            "UPDATE studies SET
                title = COALESCE($3, title),
                is_live = COALESCE($4, is_live),
                description = COALESCE($5, description),
                end_date = COALESCE($6, end_date),
                edit_date = $7
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(update.title)
        .bind(update.is_live)
        .bind(update.description)
        .bind(update.end_date)
        .bind(edit_date)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_study(&self, study_id: &str, user_id: Uuid) -> Result<bool, DatabaseError> {
        let Some(id) = Self::parse_id(study_id) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM studies WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_study() -> NewStudy {
        NewStudy {
            title: "Menu".to_string(),
            description: "d".to_string(),
            cards: json!([]),
            message: "m".to_string(),
            link: "undefined".to_string(),
            sort_type: "open".to_string(),
            categories: json!({}),
        }
    }

    #[test]
    fn accepts_minimal_study() {
        assert!(validate_new_study(&new_study()).is_ok());
    }

    #[test]
    fn rejects_blank_title() {
        let mut study = new_study();
        study.title = "   ".to_string();
        let err = validate_new_study(&study).unwrap_err();
        assert_eq!(err.to_string(), "Study title must not be empty");
    }

    #[test]
    fn rejects_non_list_cards() {
        let mut study = new_study();
        study.cards = json!("card");
        assert!(matches!(validate_new_study(&study), Err(CreateError::Invalid(_))));
    }

    #[test]
    fn non_uuid_ids_never_parse() {
        assert!(PgStudyStore::parse_id("42").is_none());
        assert!(PgStudyStore::parse_id(&Uuid::new_v4().to_string()).is_some());
    }
}
