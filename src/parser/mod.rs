pub mod extract;

use extract::CaseRecord;

/// Single-pass pipeline: rendered page text → token stream → extracted case.
/// The text must already be whitespace-normalized (see fetch::flatten_html);
/// every extractor scans the same token stream independently.
pub fn process_case(case_number: &str, url: &str, text: &str) -> CaseRecord {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    extract::extract_all(case_number, url, &tokens)
}
