pub mod memory;
pub mod study_service;
pub mod user_service;

pub use memory::{MemoryStudyStore, MemoryUserDirectory};
pub use study_service::{CreateError, PgStudyStore, StudyStore};
pub use user_service::{PgUserDirectory, UserDirectory};
