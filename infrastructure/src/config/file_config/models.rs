//! `[models]` section: Flash/Pro model ids

use marionette_domain::{ConfigIssue, Model, ModelPair};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelsConfig {
    /// Fast tier model id
    pub flash: String,
    /// Deep tier model id
    pub pro: String,
}

impl Default for FileModelsConfig {
    fn default() -> Self {
        Self {
            flash: Model::default_flash().as_str().to_string(),
            pro: Model::default_pro().as_str().to_string(),
        }
    }
}

impl FileModelsConfig {
    pub fn to_pair(&self) -> ModelPair {
        ModelPair {
            flash: self.flash.parse().expect("Model::from_str is infallible"),
            pro: self.pro.parse().expect("Model::from_str is infallible"),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.flash.trim().is_empty() {
            issues.push(ConfigIssue::error("models.flash", "model id is empty"));
        }
        if self.pro.trim().is_empty() {
            issues.push(ConfigIssue::error("models.pro", "model id is empty"));
        }
        issues
    }
}
