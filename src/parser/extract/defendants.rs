use serde::Serialize;

use super::{marker_qualifies, NAME_OFFSET};

const MARKER: &str = "Defendant";

/// Tokens captured after a qualifying marker. A defendant block never spans
/// more of the template than this; the tail of the window is junk the run
/// grouping is expected to throw away.
const WINDOW_LEN: usize = 47;

/// A trailing candidate of exactly this length is a truncated rendering
/// artifact, not a real name; its presence poisons the whole candidate list.
const ARTIFACT_LEN: usize = 3;

/// Tokens taken from the window start when falling back to the raw window.
const FALLBACK_TOKENS: usize = 3;

/// Defendant list shape, resolved once here so callers never re-inspect it.
#[derive(Debug, Clone, Serialize)]
pub enum Defendants {
    Single(String),
    Multiple(Vec<String>),
}

impl Defendants {
    /// Display string for the sink; multiple names joined with ", ".
    pub fn display(&self) -> String {
        match self {
            Defendants::Single(name) => name.clone(),
            Defendants::Multiple(names) => names.join(", "),
        }
    }
}

/// Extract defendant name(s) from the first qualifying "Defendant" marker.
/// Returns None when no qualifying marker exists at all, a no-result signal
/// distinct from an empty name; such cases produce no output row.
pub fn extract(tokens: &[&str]) -> Option<Defendants> {
    let idx = tokens
        .iter()
        .enumerate()
        .find(|(idx, token)| **token == MARKER && marker_qualifies(tokens, *idx))
        .map(|(idx, _)| idx)?;

    let start = (idx + NAME_OFFSET).min(tokens.len());
    let end = (start + WINDOW_LEN).min(tokens.len());
    let window = &tokens[start..end];

    // Maximal runs of fully upper-case, slash-free tokens are the name
    // candidates; any token failing the predicate ends the current run.
    let mut candidates: Vec<String> = Vec::new();
    let mut run: Vec<&str> = Vec::new();
    for token in window {
        if is_name_token(token) {
            run.push(token);
        } else if !run.is_empty() {
            candidates.push(std::mem::take(&mut run).join(" "));
        }
    }
    if !run.is_empty() {
        candidates.push(run.join(" "));
    }

    let last_len = candidates.last().map(|name| name.chars().count());
    match last_len {
        Some(len) if len == ARTIFACT_LEN => {
            // Truncation artifact at the tail: distrust the grouping and take
            // the window's opening tokens as the one name instead.
            let name = window
                .iter()
                .take(FALLBACK_TOKENS)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            Some(Defendants::Single(name))
        }
        Some(_) => {
            if candidates.len() == 1 {
                Some(Defendants::Single(candidates.remove(0)))
            } else {
                Some(Defendants::Multiple(candidates))
            }
        }
        None => {
            let name = window
                .iter()
                .take(FALLBACK_TOKENS)
                .filter(|token| **token != "Relationship")
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            Some(Defendants::Single(name))
        }
    }
}

/// Python-str.isupper semantics: at least one uppercase letter, no lowercase
/// ones. Uncased characters (digits, punctuation) don't break a name token.
fn is_name_token(token: &str) -> bool {
    !token.contains('/')
        && token.chars().any(|c| c.is_uppercase())
        && !token.chars().any(|c| c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> Vec<&str> {
        text.split_whitespace().collect()
    }

    #[test]
    fn single_defendant() {
        let tokens = tokenize("Defendant Name / DOE JOHN ALLEN Relationship case closed");
        let result = extract(&tokens).unwrap();
        assert!(matches!(result, Defendants::Single(ref name) if name == "DOE JOHN ALLEN"));
    }

    #[test]
    fn multiple_defendants() {
        let tokens =
            tokenize("Defendant Name / DOE JOHN and also ROE JANE Relationship end of record");
        let result = extract(&tokens).unwrap();
        match result {
            Defendants::Multiple(names) => assert_eq!(names, vec!["DOE JOHN", "ROE JANE"]),
            other => panic!("expected Multiple, got {:?}", other),
        }
        assert_eq!(extract(&tokens).unwrap().display(), "DOE JOHN, ROE JANE");
    }

    #[test]
    fn sex_in_window_is_not_a_defendant_block() {
        let tokens = tokenize("Defendant Sex Male DOE JOHN SMITH Relationship trailing tokens");
        assert!(extract(&tokens).is_none());
    }

    #[test]
    fn trailing_artifact_falls_back_to_window_start() {
        let tokens = tokenize("Defendant Name / DOE JOHN ALLEN something DOB more words here");
        let result = extract(&tokens).unwrap();
        assert!(matches!(result, Defendants::Single(ref name) if name == "DOE JOHN ALLEN"));
    }

    #[test]
    fn no_candidates_falls_back_and_drops_relationship() {
        let tokens = tokenize("Defendant Name / Relationship john doe lowercase words only here");
        let result = extract(&tokens).unwrap();
        assert!(matches!(result, Defendants::Single(ref name) if name == "john doe"));
    }

    #[test]
    fn slash_breaks_a_run() {
        let tokens = tokenize("Defendant Name / DOE JOHN N/A ROE JANE Relationship end here");
        let result = extract(&tokens).unwrap();
        match result {
            Defendants::Multiple(names) => assert_eq!(names, vec!["DOE JOHN", "ROE JANE"]),
            other => panic!("expected Multiple, got {:?}", other),
        }
    }

    #[test]
    fn no_marker_is_none() {
        let tokens = tokenize("nothing about parties on this page at all");
        assert!(extract(&tokens).is_none());
    }
}
