use std::fs;
use std::io::{self, Write};
use std::mem::take;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

use crate::parser::extract::{amounts::format_cents, CaseRecord, JudgmentStatus};

/// Rows are flushed to the sheet in batches of this size to bound memory and
/// write volume against the sink.
pub const BATCH_SIZE: usize = 20;

/// Output sheet columns, one row per defendant-bearing case.
pub const COLUMNS: [&str; 14] = [
    "plaintiff",
    "hyperlink_formula",
    "defendants",
    "judgments",
    "judgment_date",
    "total_amount",
    "rent",
    "attorney_fees",
    "tax",
    "utilities",
    "late_charge",
    "notice_fees",
    "costs",
    "undesignated",
];

/// Build the output row for a case, or None when the case must be excluded:
/// no defendant block at all, or an empty plaintiff (an empty plaintiff must
/// never silently ship).
pub fn build_row(record: &CaseRecord) -> Option<Vec<String>> {
    let defendants = record.defendants.as_ref()?;
    if record.plaintiff.is_empty() {
        warn!("case {}: no plaintiff found, row excluded", record.case_number);
        return None;
    }

    let (judgment_flag, judgment_date) = match &record.judgment {
        Some(judgment) => {
            let date = match (judgment.status, judgment.date) {
                (_, Some(date)) => date.format("%-m/%-d/%Y").to_string(),
                (JudgmentStatus::No, None) => "N/A".to_string(),
                (JudgmentStatus::Yes, None) => String::new(),
            };
            (judgment.status.flag().to_string(), date)
        }
        None => (String::new(), String::new()),
    };

    let a = &record.amounts;
    Some(vec![
        record.plaintiff.clone(),
        hyperlink_formula(&record.url, &record.case_number),
        defendants.display(),
        judgment_flag,
        judgment_date,
        format_cents(a.total_amount()),
        format_cents(a.rent),
        format_cents(a.attorney_fees),
        format_cents(a.tax),
        format_cents(a.utilities),
        format_cents(a.late_charge),
        format_cents(a.notice_fees),
        format_cents(a.costs),
        format_cents(a.undesignated),
    ])
}

fn hyperlink_formula(url: &str, case_number: &str) -> String {
    format!("=HYPERLINK(\"{}\", \"{}\")", url, case_number)
}

/// Party names from the roster sheet: first column, header row skipped.
pub fn load_roster(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    Ok(parse_rows(&text)
        .into_iter()
        .skip(1)
        .filter_map(|row| row.into_iter().next())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect())
}

/// The output sheet: an append-only CSV the run keeps extending.
pub struct Sheet {
    path: PathBuf,
}

impl Sheet {
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Append rows starting at the first row whose column 1 is blank (or the
    /// end of the sheet). Everything above the insertion point is preserved;
    /// the blank tail is replaced. A missing sheet is created with a header
    /// row first.
    pub fn append_rows(&self, rows: &[Vec<String>]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut sheet_rows = match fs::read_to_string(&self.path) {
            Ok(text) => parse_rows(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                vec![COLUMNS.iter().map(|c| c.to_string()).collect()]
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read sheet {}", self.path.display())
                });
            }
        };

        let insert_at = sheet_rows
            .iter()
            .position(|row| row.first().map_or(true, |cell| cell.is_empty()))
            .unwrap_or(sheet_rows.len());
        sheet_rows.truncate(insert_at);
        sheet_rows.extend(rows.iter().cloned());

        let mut buf: Vec<u8> = Vec::new();
        for row in &sheet_rows {
            write_row(&mut buf, row)?;
        }
        fs::write(&self.path, buf)
            .with_context(|| format!("failed to write sheet {}", self.path.display()))?;
        Ok(rows.len())
    }
}

// ── CSV plumbing ──

/// Minimal CSV parser, quote and CRLF tolerant.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                rows.push(take(&mut row));
            }
            _ => field.push(ch),
        }
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::extract::{AmountBuckets, CaseRecord, Defendants, Judgment};

    fn record() -> CaseRecord {
        CaseRecord {
            case_number: "CC2023017083".to_string(),
            url: "https://example.test/CaseInfo?casenumber=CC2023017083000".to_string(),
            plaintiff: "CHAPARRAL ESTATES MHP LLC".to_string(),
            defendants: Some(Defendants::Single("DOE JOHN ALLEN".to_string())),
            judgment: Some(Judgment {
                status: JudgmentStatus::Yes,
                date: chrono::NaiveDate::from_ymd_opt(2023, 10, 31),
            }),
            amounts: AmountBuckets {
                rent: 182_600,
                late_charge: 15_000,
                attorney_fees: 3_500,
                costs: 7_600,
                total: 208_700,
                ..AmountBuckets::default()
            },
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("jc_scraper_{}_{}.csv", name, std::process::id()))
    }

    #[test]
    fn row_layout() {
        let row = build_row(&record()).unwrap();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], "CHAPARRAL ESTATES MHP LLC");
        assert_eq!(
            row[1],
            "=HYPERLINK(\"https://example.test/CaseInfo?casenumber=CC2023017083000\", \"CC2023017083\")"
        );
        assert_eq!(row[2], "DOE JOHN ALLEN");
        assert_eq!(row[3], "Y");
        assert_eq!(row[4], "10/31/2023");
        assert_eq!(row[5], "4174.00");
        assert_eq!(row[6], "1826.00");
    }

    #[test]
    fn no_judgment_renders_na_date() {
        let mut r = record();
        r.judgment = Some(Judgment {
            status: JudgmentStatus::No,
            date: None,
        });
        let row = build_row(&r).unwrap();
        assert_eq!(row[3], "N");
        assert_eq!(row[4], "N/A");
    }

    #[test]
    fn unknown_judgment_renders_blank() {
        let mut r = record();
        r.judgment = None;
        let row = build_row(&r).unwrap();
        assert_eq!(row[3], "");
        assert_eq!(row[4], "");
    }

    #[test]
    fn empty_plaintiff_excluded() {
        let mut r = record();
        r.plaintiff = String::new();
        assert!(build_row(&r).is_none());
    }

    #[test]
    fn missing_defendants_excluded() {
        let mut r = record();
        r.defendants = None;
        assert!(build_row(&r).is_none());
    }

    #[test]
    fn quoted_formula_survives_parse() {
        let row = build_row(&record()).unwrap();
        let mut buf = Vec::new();
        write_row(&mut buf, &row).unwrap();
        let parsed = parse_rows(std::str::from_utf8(&buf).unwrap());
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0], row);
    }

    #[test]
    fn roster_skips_header_and_blanks() {
        let path = temp_path("roster");
        fs::write(&path, "park_name,notes\nDesert Sky MHP,active\n,\nChaparral Estates,\n")
            .unwrap();
        let roster = load_roster(&path).unwrap();
        assert_eq!(roster, vec!["Desert Sky MHP", "Chaparral Estates"]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn append_creates_sheet_with_header() {
        let path = temp_path("create");
        let _ = fs::remove_file(&path);
        let sheet = Sheet::open(&path);
        let written = sheet.append_rows(&[build_row(&record()).unwrap()]).unwrap();
        assert_eq!(written, 1);
        let rows = parse_rows(&fs::read_to_string(&path).unwrap());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "plaintiff");
        assert_eq!(rows[1][0], "CHAPARRAL ESTATES MHP LLC");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn append_starts_at_first_blank_first_column() {
        let path = temp_path("blank");
        fs::write(
            &path,
            "plaintiff,link,defendants\nOLD PARK LLC,x,y\n,stale,tail\nGARBAGE,below,blank\n",
        )
        .unwrap();
        let sheet = Sheet::open(&path);
        sheet
            .append_rows(&[vec!["NEW PARK LLC".to_string(), "a".to_string(), "b".to_string()]])
            .unwrap();
        let rows = parse_rows(&fs::read_to_string(&path).unwrap());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][0], "OLD PARK LLC");
        assert_eq!(rows[2][0], "NEW PARK LLC");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn append_nothing_is_a_noop() {
        let path = temp_path("noop");
        let _ = fs::remove_file(&path);
        let sheet = Sheet::open(&path);
        assert_eq!(sheet.append_rows(&[]).unwrap(), 0);
        assert!(!path.exists());
    }
}
