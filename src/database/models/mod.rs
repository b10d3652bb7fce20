pub mod cluster;
pub mod study;
pub mod user;

pub use cluster::Cluster;
pub use study::{NewStudy, Study, StudyId, StudySummary, StudyUpdate};
pub use user::User;
