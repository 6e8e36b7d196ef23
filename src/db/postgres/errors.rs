use chrono::{DateTime, FixedOffset};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Rows for this `as_of` already exist. Expected whenever the upstream
    /// timestamp has not advanced since the previous run.
    #[error("snapshot for {as_of} already stored")]
    DuplicateSnapshot { as_of: DateTime<FixedOffset> },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
