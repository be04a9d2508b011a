//! `[logging]` section: transcript and archive locations

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for transcripts, archives, and the operation log
    pub log_dir: String,
    /// Write the end-of-session JSON archive
    pub save_session_logs: bool,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: "./marionette_logs".to_string(),
            save_session_logs: true,
        }
    }
}
