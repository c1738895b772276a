use super::{marker_qualifies, NAME_OFFSET};

const MARKER: &str = "Plaintiff";

/// The plaintiff name runs from NAME_OFFSET after the marker up to this
/// terminator on the party heading line.
const END_MARKER: &str = "Relationship";

/// Extract the plaintiff name from the first qualifying "Plaintiff" marker.
/// Returns an empty string when no qualifying occurrence exists or the
/// terminator never shows up: the degenerate case, not an error.
pub fn extract(tokens: &[&str]) -> String {
    for (idx, token) in tokens.iter().enumerate() {
        if *token != MARKER || !marker_qualifies(tokens, idx) {
            continue;
        }
        let start = idx + NAME_OFFSET;
        let end = match tokens[idx..].iter().position(|t| *t == END_MARKER) {
            Some(offset) => idx + offset,
            None => return String::new(),
        };
        if end <= start {
            return String::new();
        }
        return tokens[start..end].join(" ");
    }
    String::new()
}
