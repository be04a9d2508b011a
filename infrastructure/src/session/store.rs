//! Filesystem session archive.
//!
//! Writes the full [`SessionRecord`] as pretty-printed JSON to
//! `marionette_<session_id>_<YYYYMMDD_HHMMSS>.json` in the log directory.

use async_trait::async_trait;
use marionette_application::ports::session_archive::{ArchiveError, SessionArchive};
use marionette_domain::SessionRecord;
use std::path::PathBuf;
use tracing::debug;

pub struct FsSessionArchive {
    dir: PathBuf,
}

impl FsSessionArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SessionArchive for FsSessionArchive {
    async fn save(&self, record: &SessionRecord) -> Result<Option<PathBuf>, ArchiveError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = format!(
            "marionette_{}_{}.json",
            record.session_id,
            record.ended_at.format("%Y%m%d_%H%M%S"),
        );
        let path = self.dir.join(filename);

        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json).await?;

        debug!(path = %path.display(), "session record written");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record() -> SessionRecord {
        SessionRecord {
            session_id: "ab12cd34".to_string(),
            started_at: Utc::now(),
            ended_at: Utc::now(),
            total_interactions: 2,
            total_interventions: 1,
            interactions: Vec::new(),
            interventions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn archive_writes_named_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsSessionArchive::new(dir.path());

        let path = archive.save(&record()).await.unwrap().unwrap();
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("marionette_ab12cd34_"));
        assert!(name.ends_with(".json"));

        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["session_id"], "ab12cd34");
        assert_eq!(value["total_interventions"], 1);
    }

    #[tokio::test]
    async fn archive_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = FsSessionArchive::new(dir.path().join("logs"));
        assert!(archive.save(&record()).await.unwrap().is_some());
    }
}
