use std::sync::Arc;

use crate::services::{StudyStore, UserDirectory};

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub studies: Arc<dyn StudyStore>,
    pub users: Arc<dyn UserDirectory>,
    /// Body `location` of every 401 response
    pub auth_redirect: Arc<str>,
}

impl AppState {
    pub fn new(
        studies: Arc<dyn StudyStore>,
        users: Arc<dyn UserDirectory>,
        auth_redirect: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            studies,
            users,
            auth_redirect: auth_redirect.into(),
        }
    }
}
