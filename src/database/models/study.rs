use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Study identifiers are opaque strings on the wire; the Postgres backend stores UUIDs
pub type StudyId = String;

pub const DEFAULT_SORT_TYPE: &str = "open";
pub const UNDEFINED_LINK: &str = "undefined";

/// Full study detail as returned by `GET /study?id=...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    pub id: StudyId,
    pub title: String,
    pub description: String,
    pub message: String,
    pub link: String,
    pub cards: Value,
    pub sort_type: String,
    pub categories: Value,
    pub is_live: bool,
    pub abandoned_no: i32,
    pub completed_no: i32,
    pub created_date: DateTime<Utc>,
    pub launched_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

/// List form of a study, also returned by a successful create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudySummary {
    pub id: StudyId,
    pub title: String,
    pub abandoned_no: i32,
    pub completed_no: i32,
    pub edit_date: DateTime<Utc>,
    pub is_live: bool,
    pub launched_date: DateTime<Utc>,
}

impl From<&Study> for StudySummary {
    fn from(study: &Study) -> Self {
        Self {
            id: study.id.clone(),
            title: study.title.clone(),
            abandoned_no: study.abandoned_no,
            completed_no: study.completed_no,
            edit_date: study.edit_date,
            is_live: study.is_live,
            launched_date: study.launched_date,
        }
    }
}

/// Creation input after request defaults have been applied
#[derive(Debug, Clone, PartialEq)]
pub struct NewStudy {
    pub title: String,
    pub description: String,
    pub cards: Value,
    pub message: String,
    pub link: String,
    pub sort_type: String,
    pub categories: Value,
}

/// Partial update; only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudyUpdate {
    pub title: Option<String>,
    pub is_live: Option<bool>,
    pub description: Option<String>,
    pub end_date: Option<DateTime<Utc>>,
}

impl StudyUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.is_live.is_none() && self.description.is_none() && self.end_date.is_none()
    }

    /// Apply to an in-memory study. The caller supplies the edit timestamp.
    pub fn apply(&self, study: &mut Study, edit_date: DateTime<Utc>) {
        if let Some(title) = &self.title {
            study.title = title.clone();
        }
        if let Some(is_live) = self.is_live {
            study.is_live = is_live;
        }
        if let Some(description) = &self.description {
            study.description = description.clone();
        }
        if let Some(end_date) = self.end_date {
            study.end_date = Some(end_date);
        }
        study.edit_date = edit_date;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(now: DateTime<Utc>) -> Study {
        Study {
            id: "s1".to_string(),
            title: "Navigation".to_string(),
            description: "Sort the menu".to_string(),
            message: "Thanks!".to_string(),
            link: UNDEFINED_LINK.to_string(),
            cards: json!([{"id": 1, "name": "Home"}]),
            sort_type: DEFAULT_SORT_TYPE.to_string(),
            categories: json!({}),
            is_live: true,
            abandoned_no: 2,
            completed_no: 5,
            created_date: now,
            launched_date: now,
            edit_date: now,
            end_date: None,
        }
    }

    #[test]
    fn study_serializes_camel_case() {
        let v = serde_json::to_value(sample(Utc::now())).unwrap();
        assert_eq!(v["sortType"], "open");
        assert_eq!(v["isLive"], true);
        assert_eq!(v["completedNo"], 5);
        assert!(v.get("endDate").is_some());
        assert!(v.get("sort_type").is_none());
    }

    #[test]
    fn summary_carries_listing_fields() {
        let now = Utc::now();
        let study = sample(now);
        let summary = StudySummary::from(&study);
        assert_eq!(summary.id, "s1");
        assert_eq!(summary.title, "Navigation");
        assert_eq!(summary.abandoned_no, 2);
        assert_eq!(summary.completed_no, 5);
        assert_eq!(summary.edit_date, now);
        assert_eq!(summary.launched_date, now);
    }

    #[test]
    fn update_applies_only_present_fields() {
        let created = Utc::now() - chrono::Duration::days(1);
        let mut study = sample(created);
        let edit = Utc::now();
        let update = StudyUpdate {
            is_live: Some(false),
            end_date: Some(edit),
            ..Default::default()
        };
        update.apply(&mut study, edit);

        assert_eq!(study.title, "Navigation");
        assert!(!study.is_live);
        assert_eq!(study.end_date, Some(edit));
        assert_eq!(study.edit_date, edit);
    }

    #[test]
    fn empty_update_detected() {
        assert!(StudyUpdate::default().is_empty());
        assert!(!StudyUpdate { title: Some("x".into()), ..Default::default() }.is_empty());
    }
}
