//! Configuration issue reporting

use serde::{Deserialize, Serialize};

/// Severity of a configuration issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Configuration is usable, but something looks wrong
    Warning,
    /// Configuration cannot be used as-is
    Error,
}

/// A single issue found while validating configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    /// Dotted path of the offending field, e.g. "monitors.debug_loop_window"
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_helpers() {
        let w = ConfigIssue::warning("models.flash", "empty model name");
        assert!(!w.is_error());
        let e = ConfigIssue::error("monitors.debug_loop_window", "must be at least 2");
        assert!(e.is_error());
        assert_eq!(e.field, "monitors.debug_loop_window");
    }
}
