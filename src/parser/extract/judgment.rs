use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

const MARKER: &str = "Judgments";

/// Exact continuation rendered under the heading when a case carries no
/// judgment. Anything else means one was entered.
const NO_JUDGMENTS: [&str; 4] = ["There", "are", "no", "judgments"];

/// Dates as the court site renders them, e.g. 10/31/2023.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}/\d{1,2}/\d{4}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JudgmentStatus {
    Yes,
    No,
}

impl JudgmentStatus {
    /// Single-letter flag used in the output sheet.
    pub fn flag(&self) -> &'static str {
        match self {
            JudgmentStatus::Yes => "Y",
            JudgmentStatus::No => "N",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Judgment {
    pub status: JudgmentStatus,
    pub date: Option<NaiveDate>,
}

/// Extract judgment status and date from the first "Judgments" heading.
/// A judgment with no date after the heading is a recoverable unknown
/// (status Yes, date None), not an error. No heading at all → None.
pub fn extract(tokens: &[&str]) -> Option<Judgment> {
    let idx = tokens.iter().position(|token| *token == MARKER)?;
    let tail = &tokens[idx + 1..];

    if tail.starts_with(&NO_JUDGMENTS) {
        return Some(Judgment {
            status: JudgmentStatus::No,
            date: None,
        });
    }

    let date = tail
        .iter()
        .find_map(|token| DATE_RE.find(token))
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%m/%d/%Y").ok());
    if date.is_none() {
        warn!("judgment entered but no date found after the Judgments heading");
    }
    Some(Judgment {
        status: JudgmentStatus::Yes,
        date,
    })
}
