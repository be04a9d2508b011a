//! Pattern heuristics that run before any model is consulted

use crate::session::entities::ErrorRecord;

/// Agreement markers scanned for in agent output (case-insensitive)
pub const AGREEMENT_PHRASES: [&str; 9] = [
    "you're absolutely right",
    "great idea",
    "perfect",
    "excellent point",
    "that's a fantastic",
    "i completely agree",
    "you're correct",
    "brilliant",
    "exactly what we need",
];

/// Prefix length compared when testing errors for exact repetition
pub const ERROR_PREFIX_CHARS: usize = 200;

/// Count how many agreement phrases appear in the output
pub fn count_agreement_phrases(output: &str) -> usize {
    let lower = output.to_lowercase();
    AGREEMENT_PHRASES
        .iter()
        .filter(|phrase| lower.contains(*phrase))
        .count()
}

/// True when every error in the window shares the same leading
/// [`ERROR_PREFIX_CHARS`] characters.
///
/// Windows of fewer than two errors are never considered identical.
pub fn errors_identical(window: &[ErrorRecord]) -> bool {
    if window.len() < 2 {
        return false;
    }
    let prefix = |record: &ErrorRecord| -> String {
        record.message.chars().take(ERROR_PREFIX_CHARS).collect()
    };
    let first = prefix(&window[0]);
    window.iter().skip(1).all(|r| prefix(r) == first)
}
