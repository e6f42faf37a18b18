//! # Gradebook - Academic Analytics
//!
//! Read-only reporting layer over a normalized academic-records schema.
//!
//! Gradebook provides:
//! - Entity types for teachers, disciplines, groups, students and grades
//! - Declarative query specifications rendered to parameterized SQL
//! - Twelve fixed analytical reports (averages, rosters, latest session)
//! - SQLite-backed storage with JSON dataset import

pub mod model;
pub mod storage;
pub mod query;
pub mod config;
pub mod output;
pub mod ui;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports for convenient access
pub use model::{Average, Dataset, RecordId};
pub use query::{AnalyticsEngine, QuerySpec, RelationalStore};
pub use storage::SqliteStore;

/// Result type alias for Gradebook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Gradebook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset error: {0}")]
    Dataset(#[from] serde_json::Error),
}
