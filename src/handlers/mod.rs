// handlers/mod.rs - HTTP handlers
//
// Public (no auth): /health
// Protected (Authorization header, see middleware::auth): /study

pub mod health;
pub mod study;

pub use health::health;
