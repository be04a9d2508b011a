//! Parsing of raw model replies into verdicts
//!
//! Models are asked for bare JSON but routinely wrap it in markdown code
//! fences anyway. [`strip_code_fences`] tolerates that, and
//! [`parse_json_reply`] keeps the raw reply on failure so callers can log it.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// A model reply that could not be parsed as the expected JSON shape
#[derive(Error, Debug)]
#[error("model reply is not valid JSON: {source}")]
pub struct ReplyParseError {
    #[source]
    pub source: serde_json::Error,
    /// The reply text as received, fences stripped
    pub raw: String,
}

/// Strip a leading ```json / ``` fence and a trailing ``` fence, then trim.
///
/// Replies without fences pass through unchanged.
pub fn strip_code_fences(reply: &str) -> &str {
    let mut text = reply.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Parse a model reply as JSON after stripping code fences
pub fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T, ReplyParseError> {
    let stripped = strip_code_fences(reply);
    serde_json::from_str(stripped).map_err(|source| ReplyParseError {
        source,
        raw: stripped.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervision::verdicts::LoopVerdict;

    #[test]
    fn strips_json_fence() {
        let reply = "```json\n{\"in_loop\": true}\n```";
        assert_eq!(strip_code_fences(reply), "{\"in_loop\": true}");
    }

    #[test]
    fn strips_bare_fence() {
        let reply = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(reply), "{\"a\": 1}");
    }

    #[test]
    fn passes_unfenced_reply_through() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  \n"), "{\"a\": 1}");
    }

    #[test]
    fn parses_fenced_verdict() {
        let reply = "```json\n{\"in_loop\": true, \"confidence\": 90}\n```";
        let verdict: LoopVerdict = parse_json_reply(reply).unwrap();
        assert!(verdict.in_loop);
        assert_eq!(verdict.confidence, 90);
    }

    #[test]
    fn parse_failure_keeps_raw_reply() {
        let err = parse_json_reply::<LoopVerdict>("I think the agent is stuck").unwrap_err();
        assert_eq!(err.raw, "I think the agent is stuck");
    }
}
