pub mod admin_users;
pub mod categories;
pub mod cookies;
pub mod items;
pub mod session;
pub mod storage;
pub mod tokens;

use thiserror::Error;

/// Failures surfaced by the persistence and storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    RecordNotFound,
    #[error("edit conflict")]
    EditConflict,
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("store did not respond within the deadline")]
    Timeout,
    #[error("file storage: {0}")]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
