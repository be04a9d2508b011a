//! Model value object for the supervision tiers

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A hosted generative model used for supervision (Value Object)
///
/// Marionette runs two tiers side by side: a fast model for real-time
/// pattern detection and a deep model for strategic judgment. The known
/// variants are the defaults for those tiers; anything else round-trips
/// through `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    /// Fast tier default ("gemini-2.0-flash-exp")
    Flash2,
    /// Deep tier default ("gemini-exp-1206")
    ProExp,
    /// Any other model id, passed through verbatim
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Flash2 => "gemini-2.0-flash-exp",
            Model::ProExp => "gemini-exp-1206",
            Model::Custom(s) => s,
        }
    }

    /// Default model for the fast tier
    pub fn default_flash() -> Model {
        Model::Flash2
    }

    /// Default model for the deep tier
    pub fn default_pro() -> Model {
        Model::ProExp
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "gemini-2.0-flash-exp" => Model::Flash2,
            "gemini-exp-1206" => Model::ProExp,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().expect("Model::from_str is infallible"))
    }
}

/// The pair of models driving a supervision session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPair {
    /// Fast tier: debug-loop and sycophancy checks
    pub flash: Model,
    /// Deep tier: goal analysis, drift, prompt review, pivots
    pub pro: Model,
}

impl Default for ModelPair {
    fn default() -> Self {
        Self {
            flash: Model::default_flash(),
            pro: Model::default_pro(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_round_trip() {
        let flash: Model = "gemini-2.0-flash-exp".parse().unwrap();
        assert_eq!(flash, Model::Flash2);
        assert_eq!(flash.as_str(), "gemini-2.0-flash-exp");

        let pro: Model = "gemini-exp-1206".parse().unwrap();
        assert_eq!(pro, Model::ProExp);
    }

    #[test]
    fn unknown_id_becomes_custom() {
        let m: Model = "gemini-1.5-pro".parse().unwrap();
        assert_eq!(m, Model::Custom("gemini-1.5-pro".to_string()));
        assert_eq!(m.as_str(), "gemini-1.5-pro");
    }

    #[test]
    fn serde_as_plain_string() {
        let json = serde_json::to_string(&Model::Flash2).unwrap();
        assert_eq!(json, "\"gemini-2.0-flash-exp\"");

        let back: Model = serde_json::from_str("\"gemini-exp-1206\"").unwrap();
        assert_eq!(back, Model::ProExp);
    }

    #[test]
    fn default_pair() {
        let pair = ModelPair::default();
        assert_eq!(pair.flash, Model::Flash2);
        assert_eq!(pair.pro, Model::ProExp);
    }
}
