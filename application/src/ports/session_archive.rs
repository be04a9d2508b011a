//! Port for end-of-session persistence.
//!
//! At shutdown the supervisor hands the full [`SessionRecord`] to this port.
//! The filesystem adapter writes one pretty-printed JSON file per session.

use async_trait::async_trait;
use marionette_domain::SessionRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while archiving a session
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Port for saving a finished session
#[async_trait]
pub trait SessionArchive: Send + Sync {
    /// Persist the record. Returns the archive path, or `None` when the
    /// adapter does not write anywhere.
    async fn save(&self, record: &SessionRecord) -> Result<Option<PathBuf>, ArchiveError>;
}

/// No-op implementation for tests and when session archiving is disabled
pub struct NoSessionArchive;

#[async_trait]
impl SessionArchive for NoSessionArchive {
    async fn save(&self, _record: &SessionRecord) -> Result<Option<PathBuf>, ArchiveError> {
        Ok(None)
    }
}
