//! In-process backends for local development (`STORAGE_BACKEND=memory`) and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{claims_from_header, AuthError};
use crate::database::manager::DatabaseError;
use crate::database::models::{Cluster, NewStudy, Study, StudyId, StudySummary, StudyUpdate, User};

use super::study_service::{validate_new_study, CreateError, StudyStore};
use super::user_service::UserDirectory;

struct OwnedStudy {
    owner: Uuid,
    study: Study,
    clusters: Vec<Cluster>,
}

#[derive(Default)]
pub struct MemoryStudyStore {
    studies: RwLock<HashMap<StudyId, OwnedStudy>>,
}

impl MemoryStudyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a study under a caller-chosen id (seeding and tests)
    pub async fn insert_study(&self, owner: Uuid, study: Study) {
        let mut studies = self.studies.write().await;
        studies.insert(
            study.id.clone(),
            OwnedStudy {
                owner,
                study,
                clusters: Vec::new(),
            },
        );
    }

    /// Attach a cluster to an existing study. Returns false when the study is unknown.
    pub async fn add_cluster(&self, study_id: &str, name: &str, cards: Value) -> bool {
        let mut studies = self.studies.write().await;
        match studies.get_mut(study_id) {
            Some(entry) => {
                entry.clusters.push(Cluster {
                    id: Uuid::new_v4().to_string(),
                    name: name.to_string(),
                    cards,
                    created_date: Utc::now(),
                });
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl StudyStore for MemoryStudyStore {
    async fn get_studies(&self, user_id: Uuid) -> Result<Vec<StudySummary>, DatabaseError> {
        let studies = self.studies.read().await;
        let mut summaries: Vec<StudySummary> = studies
            .values()
            .filter(|entry| entry.owner == user_id)
            .map(|entry| StudySummary::from(&entry.study))
            .collect();
        summaries.sort_by(|a, b| b.edit_date.cmp(&a.edit_date));
        Ok(summaries)
    }

    async fn get_study(&self, study_id: &str, user_id: Uuid) -> Result<Option<Study>, DatabaseError> {
        let studies = self.studies.read().await;
        Ok(studies
            .get(study_id)
            .filter(|entry| entry.owner == user_id)
            .map(|entry| entry.study.clone()))
    }

    async fn get_clusters(&self, study_id: &str, user_id: Uuid) -> Result<Option<Vec<Cluster>>, DatabaseError> {
        let studies = self.studies.read().await;
        Ok(studies
            .get(study_id)
            .filter(|entry| entry.owner == user_id)
            .map(|entry| entry.clusters.clone()))
    }

    async fn create_study(&self, user_id: Uuid, study: NewStudy) -> Result<StudySummary, CreateError> {
        validate_new_study(&study)?;

        let now = Utc::now();
        let record = Study {
            id: Uuid::new_v4().to_string(),
            title: study.title,
            description: study.description,
            message: study.message,
            link: study.link,
            cards: study.cards,
            sort_type: study.sort_type,
            categories: study.categories,
            is_live: true,
            abandoned_no: 0,
            completed_no: 0,
            created_date: now,
            launched_date: now,
            edit_date: now,
            end_date: None,
        };

        let summary = StudySummary::from(&record);
        self.insert_study(user_id, record).await;
        Ok(summary)
    }

    async fn update_study(
        &self,
        study_id: &str,
        user_id: Uuid,
        edit_date: DateTime<Utc>,
        update: StudyUpdate,
    ) -> Result<bool, DatabaseError> {
        let mut studies = self.studies.write().await;
        match studies.get_mut(study_id).filter(|entry| entry.owner == user_id) {
            Some(entry) => {
                update.apply(&mut entry.study, edit_date);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_study(&self, study_id: &str, user_id: Uuid) -> Result<bool, DatabaseError> {
        let mut studies = self.studies.write().await;
        let owned = studies.get(study_id).map_or(false, |entry| entry.owner == user_id);
        if owned {
            studies.remove(study_id);
        }
        Ok(owned)
    }
}

/// Users held in memory; tokens are still real JWTs signed with the configured secret
pub struct MemoryUserDirectory {
    jwt_secret: String,
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserDirectory {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            users: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_user(&self, id: Uuid, username: &str) -> User {
        let user = User {
            id,
            username: username.to_string(),
            created_at: Utc::now(),
        };
        self.users.write().await.insert(id, user.clone());
        user
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn validate_request(&self, auth_header: Option<&str>) -> Result<Uuid, AuthError> {
        let claims = claims_from_header(auth_header, &self.jwt_secret)?;
        if !self.users.read().await.contains_key(&claims.sub) {
            return Err(AuthError::UnknownUser(claims.sub));
        }
        Ok(claims.sub)
    }

    async fn get_username(&self, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
        Ok(self.users.read().await.get(&user_id).map(|u| u.username.clone()))
    }
}
