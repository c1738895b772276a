mod discovery;
mod fetch;
mod parser;
mod sheet;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{error, info};

use crate::fetch::Fetcher;
use crate::parser::extract::{amounts::format_cents, CaseRecord};
use crate::sheet::Sheet;

const SEARCH_BASE: &str =
    "https://justicecourts.maricopa.gov/app/courtrecords/caseSearchResults";
const DETAIL_BASE: &str = "https://justicecourts.maricopa.gov/app/courtrecords/CaseInfo";

/// Detail pages are addressed by the case number plus this fixed suffix.
const CASE_NUMBER_SUFFIX: &str = "000";

#[derive(Parser)]
#[command(name = "jc_scraper", about = "Maricopa justice-court eviction case scraper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FetchOpts {
    /// Seconds slept before every outbound request
    #[arg(long, default_value = "12")]
    delay: u64,
    /// Accept invalid TLS certificates (the court site's chain is often broken)
    #[arg(long)]
    insecure: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Sweep a roster of park names and append case rows to the sheet
    Run {
        /// Roster CSV; party names in column 1, header row skipped
        #[arg(long)]
        roster: PathBuf,
        /// Output sheet CSV
        #[arg(long)]
        out: PathBuf,
        /// Filing year passed to the case search
        #[arg(long)]
        year: i32,
        /// Max parks to process (default: whole roster)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        /// Seconds slept after a failed park or case before continuing
        #[arg(long, default_value = "60")]
        cooldown: u64,
        #[command(flatten)]
        fetch: FetchOpts,
    },
    /// Search one party name and print the case numbers found
    Search {
        name: String,
        #[arg(long)]
        year: i32,
        #[command(flatten)]
        fetch: FetchOpts,
    },
    /// Fetch a single case and print the extracted record
    Case {
        case_number: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        fetch: FetchOpts,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            roster,
            out,
            year,
            limit,
            cooldown,
            fetch,
        } => run_roster(&roster, &out, year, limit, cooldown, &fetch).await,
        Commands::Search { name, year, fetch } => {
            let fetcher = Fetcher::new(fetch.delay, fetch.insecure)?;
            let found = discovery::discover(&fetcher, SEARCH_BASE, &name, year).await?;
            if found.is_empty() {
                println!("No cases found.");
            }
            for case_number in found {
                println!("{}", case_number);
            }
            Ok(())
        }
        Commands::Case {
            case_number,
            json,
            fetch,
        } => {
            let fetcher = Fetcher::new(fetch.delay, fetch.insecure)?;
            let record = scrape_case(&fetcher, &case_number).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_record(&record);
            }
            Ok(())
        }
    }
}

/// The batch sweep: strictly sequential, one park then one case at a time.
/// Nothing here is fatal; a failed park or case is logged, slept through,
/// and skipped.
async fn run_roster(
    roster: &PathBuf,
    out: &PathBuf,
    year: i32,
    limit: Option<usize>,
    cooldown_secs: u64,
    fetch: &FetchOpts,
) -> Result<()> {
    let mut parks = sheet::load_roster(roster)?;
    if let Some(n) = limit {
        parks.truncate(n);
    }
    if parks.is_empty() {
        println!("Roster is empty.");
        return Ok(());
    }

    let fetcher = Fetcher::new(fetch.delay, fetch.insecure)?;
    let out = Sheet::open(out);
    let cooldown = Duration::from_secs(cooldown_secs);

    let pb = ProgressBar::new(parks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut buffer: Vec<Vec<String>> = Vec::new();
    let mut written = 0usize;

    for park in &parks {
        pb.set_message(park.clone());
        if let Err(e) = process_park(
            &fetcher, &out, park, year, cooldown, &mut buffer, &mut written,
        )
        .await
        {
            error!("park {} failed: {:#}", park, e);
            tokio::time::sleep(cooldown).await;
        }
        pb.inc(1);
    }

    if !buffer.is_empty() {
        written += out.append_rows(&buffer)?;
        buffer.clear();
    }
    pb.finish_and_clear();

    println!("Done: {} parks processed, {} rows written.", parks.len(), written);
    Ok(())
}

async fn process_park(
    fetcher: &Fetcher,
    out: &Sheet,
    park: &str,
    year: i32,
    cooldown: Duration,
    buffer: &mut Vec<Vec<String>>,
    written: &mut usize,
) -> Result<()> {
    let case_numbers = discovery::discover(fetcher, SEARCH_BASE, park, year).await?;
    if case_numbers.is_empty() {
        info!("{}: no cases found", park);
        return Ok(());
    }
    info!("{}: {} case(s)", park, case_numbers.len());

    for case_number in &case_numbers {
        if buffer.len() >= sheet::BATCH_SIZE {
            *written += out.append_rows(buffer)?;
            buffer.clear();
            info!("batch flushed to sheet");
        }

        match scrape_case(fetcher, case_number).await {
            Ok(record) => {
                if let Some(row) = sheet::build_row(&record) {
                    info!("{}: plaintiff {}", case_number, record.plaintiff);
                    buffer.push(row);
                }
            }
            Err(e) => {
                error!("case {} failed: {:#}", case_number, e);
                tokio::time::sleep(cooldown).await;
            }
        }
    }
    Ok(())
}

async fn scrape_case(fetcher: &Fetcher, case_number: &str) -> Result<CaseRecord> {
    let url = detail_url(case_number);
    let text = fetcher.fetch_text(&url).await?;
    Ok(parser::process_case(case_number, &url, &text))
}

fn detail_url(case_number: &str) -> String {
    format!(
        "{}?casenumber={}{}",
        DETAIL_BASE, case_number, CASE_NUMBER_SUFFIX
    )
}

fn print_record(record: &CaseRecord) {
    let defendants = record
        .defendants
        .as_ref()
        .map(|d| d.display())
        .unwrap_or_else(|| "-".to_string());
    let (judgment, judgment_date) = match &record.judgment {
        Some(j) => (
            j.status.flag().to_string(),
            j.date
                .map(|d| d.format("%-m/%-d/%Y").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        None => ("-".to_string(), "-".to_string()),
    };

    let a = &record.amounts;
    println!("Case Number:   {}", record.case_number);
    println!("Plaintiff:     {}", record.plaintiff);
    println!("Defendants:    {}", defendants);
    println!("Judgment:      {}", judgment);
    println!("Judgment Date: {}", judgment_date);
    println!("Rent:          {}", format_cents(a.rent));
    println!("Attorney Fees: {}", format_cents(a.attorney_fees));
    println!("Tax:           {}", format_cents(a.tax));
    println!("Utilities:     {}", format_cents(a.utilities));
    println!("Late Charges:  {}", format_cents(a.late_charge));
    println!("Notice Fees:   {}", format_cents(a.notice_fees));
    println!("Costs:         {}", format_cents(a.costs));
    println!("Undesignated:  {}", format_cents(a.undesignated));
    println!("Total Amount:  {}", format_cents(a.total_amount()));
}
