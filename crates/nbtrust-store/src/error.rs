//! Error types for store operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A mutating operation was attempted on a store opened readonly.
    #[error("store is readonly")]
    Readonly,
    /// The database does not exist and creation was not allowed.
    #[error("signature database not found: {}", .0.display())]
    NotFound(PathBuf),
    /// SQLite reported a failure.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    /// I/O error while preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored row could not be interpreted.
    #[error("corrupt signature record: {0}")]
    Corrupt(String),
    /// The handle is still shared with an in-flight operation.
    #[error("store is busy; await pending operations before closing")]
    Busy,
    /// The blocking worker running the operation failed.
    #[error("store task failed: {0}")]
    Task(String),
    /// Options were rejected before opening.
    #[error("invalid store options: {0}")]
    InvalidOptions(String),
}
