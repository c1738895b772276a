use anyhow::Result;
use tracing::info;

use crate::fetch::Fetcher;

/// Every case number issued by the justice courts starts with this series
/// prefix; it is the only stable hook on the search-results page.
const CASE_PREFIX: &str = "CC";

/// Generic real-estate words dropped from a park name for the broadened
/// retry search.
const BROADEN_STOPLIST: &[&str] = &[
    "mobile",
    "rv",
    "park",
    "home",
    "subdivision",
    "resort",
    "estate",
    "estates",
    "community",
    "trailer",
];

/// Build the case-search URL for a party name and filing year.
pub fn search_url(base: &str, name: &str, year: i32) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    format!("{}?bName={}&year={}", base, tokens.join("%20"), year)
}

/// Collect every token carrying the case-series prefix, in order of
/// appearance. Duplicates are kept: a case rendered twice is reported twice
/// and the caller decides what to do about it.
pub fn case_numbers(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter(|token| token.starts_with(CASE_PREFIX))
        .map(str::to_string)
        .collect()
}

/// Lowercase the name tokens and drop the stoplist words. Can legitimately
/// return an empty list (a name made entirely of stoplist words); callers
/// must skip the retry then instead of issuing a malformed query.
pub fn broaden(name: &str) -> Vec<String> {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .filter(|word| !BROADEN_STOPLIST.contains(&word.as_str()))
        .collect()
}

/// Search for a party's cases: one pass with the full name, then a single
/// broadened retry if nothing came back. An empty result is Ok, not an error.
pub async fn discover(
    fetcher: &Fetcher,
    base: &str,
    name: &str,
    year: i32,
) -> Result<Vec<String>> {
    let url = search_url(base, name, year);
    info!("searching: {}", url);
    let text = fetcher.fetch_text(&url).await?;
    let mut found = case_numbers(&text);

    if found.is_empty() {
        let broadened = broaden(name);
        if broadened.is_empty() {
            return Ok(found);
        }
        let url = search_url(base, &broadened.join(" "), year);
        info!("no cases found, retrying broadened: {}", url);
        let text = fetcher.fetch_text(&url).await?;
        found = case_numbers(&text);
    }

    Ok(found)
}
