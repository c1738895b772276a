use serde::Serialize;
use tracing::warn;

/// Category labels that may follow a dollar figure in the judgment table.
const LABELS: &[&str] = &[
    "Total",
    "Attorney",
    "Costs",
    "Utilities",
    "Undesignated",
    "Tax",
    "Notice",
    "Late",
    "Rent",
];

/// Monetary buckets accumulated from the judgment table, in whole cents so
/// sums stay exact.
#[derive(Debug, Default, Clone, Serialize)]
pub struct AmountBuckets {
    pub total: i64,
    pub rent: i64,
    pub attorney_fees: i64,
    pub tax: i64,
    pub utilities: i64,
    pub late_charge: i64,
    pub notice_fees: i64,
    pub costs: i64,
    pub undesignated: i64,
}

impl AmountBuckets {
    /// Recomputed grand total: every bucket plus the page's declared Total
    /// term. The declared figure is never reported on its own.
    pub fn total_amount(&self) -> i64 {
        self.total
            + self.rent
            + self.attorney_fees
            + self.tax
            + self.utilities
            + self.late_charge
            + self.notice_fees
            + self.costs
            + self.undesignated
    }
}

/// Accumulate every `$`-bearing token into the bucket named by the token
/// right after it. The first figure labeled Total ends the scan. A rent
/// figure without a thousands comma lands in late_charge; kept from the
/// production behavior pending confirmation (see DESIGN.md).
pub fn extract(tokens: &[&str]) -> AmountBuckets {
    let mut buckets = AmountBuckets::default();

    for (idx, token) in tokens.iter().enumerate() {
        if !token.contains('$') {
            continue;
        }
        let Some(label) = tokens.get(idx + 1) else {
            continue;
        };
        let Some(cents) = parse_cents(token) else {
            if LABELS.contains(label) {
                warn!("unparseable amount {:?} before label {}", token, label);
            }
            continue;
        };
        match *label {
            "Total" => {
                buckets.total += cents;
                break;
            }
            "Attorney" => buckets.attorney_fees += cents,
            "Costs" => buckets.costs += cents,
            "Utilities" => buckets.utilities += cents,
            "Undesignated" => buckets.undesignated += cents,
            "Tax" => buckets.tax += cents,
            "Notice" => buckets.notice_fees += cents,
            "Late" => buckets.late_charge += cents,
            "Rent" => {
                if token.contains(',') {
                    buckets.rent += cents;
                } else {
                    buckets.late_charge += cents;
                }
            }
            _ => {}
        }
    }

    buckets
}

/// Parse "$1,234.56" into cents. Parentheses are stripped, not negated:
/// "($15.00)" parses as 1500.
fn parse_cents(token: &str) -> Option<i64> {
    let cleaned: String = token
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '(' | ')'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let (dollars, frac) = match cleaned.split_once('.') {
        Some((dollars, frac)) => (dollars, frac),
        None => (cleaned.as_str(), ""),
    };
    let dollars: i64 = if dollars.is_empty() {
        0
    } else {
        dollars.parse().ok()?
    };
    let cents = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        2 => frac.parse::<i64>().ok()?,
        _ => return None,
    };
    Some(dollars * 100 + cents)
}

/// Render cents as a two-decimal figure for the sheet.
pub fn format_cents(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}
