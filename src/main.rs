mod api;
mod download;
mod error;
mod export;
mod parser;
mod pipeline;
mod progress;
mod settings;
mod transport;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

use api::{Endpoints, SearchQuery};
use download::DocumentFormat;
use parser::paragraphs::ParagraphLabel;
use pipeline::{RecordAssembler, RunOutcome};
use progress::ProgressEvent;
use transport::HttpTransport;

#[derive(Parser)]
#[command(name = "ad_scraper", about = "FAA Airworthiness Directive search and extraction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search ADs for a make/model and export the matches to CSV
    Search {
        /// Aircraft make as it appears in AD titles (e.g. "Boeing")
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        make: String,
        /// Model that must appear in the Applicability paragraph (e.g. "747")
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        model: String,
        /// Earliest publication date, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        since: NaiveDate,
        /// Directory for the CSV file
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Download AD documents by AD number
    Fetch {
        /// AD numbers, separately or comma-separated (e.g. 2020-15-14,2018-04-07)
        #[arg(required = true, value_delimiter = ',')]
        ad_numbers: Vec<String>,
        #[arg(short, long, value_enum, default_value_t = DocumentFormat::Html)]
        format: DocumentFormat,
        /// Target directory (default: the user's download folder)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
    /// Extract paragraphs and fields from a saved AD HTML file
    Parse {
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search {
            make,
            model,
            since,
            out_dir,
        } => run_search(&make, &model, since, &out_dir).await,
        Commands::Fetch {
            ad_numbers,
            format,
            out_dir,
        } => run_fetch(ad_numbers, format, out_dir).await,
        Commands::Parse { file } => run_parse(&file),
    };

    if let Some(line) = done_line(t0.elapsed()) {
        println!("\n{}", line);
    }

    result
}

async fn run_search(
    make: &str,
    model: &str,
    since: NaiveDate,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let settings = settings::Settings::load()?;
    let transport = HttpTransport::new(&settings.user_agent)?;
    let assembler = RecordAssembler::new(transport, Endpoints::new(&settings.api_base_url));
    let query = SearchQuery::new(make, model, &since.format("%Y-%m-%d").to_string());

    println!("Starting search for {} {} ADs since {}...", make, model, query.start_date);
    let pb = spinner();
    let outcome = assembler
        .assemble(&query, &mut |event: &ProgressEvent| {
            print_event(&pb, &mut std::io::stdout(), event);
            if let ProgressEvent::Processed { ad_number } = event {
                pb.set_message(ad_number.clone());
            }
        })
        .await;
    pb.finish_and_clear();

    let records = match outcome {
        RunOutcome::Records(records) => records,
        RunOutcome::NoMatches => return Ok(()),
    };

    let path = export::write_csv(out_dir, make, model, &records)
        .context("Failed to save CSV file")?;
    println!("SUCCESS: Saved {} ADs to {}", records.len(), path.display());
    Ok(())
}

async fn run_fetch(
    ad_numbers: Vec<String>,
    format: DocumentFormat,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let ad_numbers: Vec<String> = ad_numbers
        .into_iter()
        .map(|ad| ad.trim().to_string())
        .filter(|ad| !ad.is_empty())
        .collect();
    if ad_numbers.is_empty() {
        bail!("No valid AD numbers given");
    }

    let dir = out_dir
        .or_else(dirs::download_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let settings = settings::Settings::load()?;
    let transport = HttpTransport::new(&settings.user_agent)?;
    let endpoints = Endpoints::new(&settings.api_base_url);

    println!(
        "Starting download for {} AD(s) to {} ({:?} format)...",
        ad_numbers.len(),
        dir.display(),
        format
    );
    let pb = spinner();
    download::fetch_all(
        &transport,
        &endpoints,
        &ad_numbers,
        format,
        &dir,
        &mut |event: &ProgressEvent| print_event(&pb, &mut std::io::stdout(), event),
    )
    .await;
    pb.finish_and_clear();
    Ok(())
}

fn run_parse(file: &Path) -> anyhow::Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let doc = parser::process_html(&html);

    for label in ParagraphLabel::ALL {
        println!(
            "({}) {}:\n  {}\n",
            label.letter(),
            label.heading(),
            doc.paragraphs.text(label)
        );
    }
    println!("ATA Number:          {}", doc.fields.ata_code_text());
    println!("Subject Description: {}", doc.fields.ata_subject_text());
    println!("Superseded ADs:      {}", doc.fields.superseded_text());
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Write one progress line to `out` with the spinner cleared. Also runs when
/// the bar is hidden (stderr not a terminal).
fn print_event(pb: &ProgressBar, out: &mut impl Write, event: &ProgressEvent) {
    pb.suspend(|| {
        let _ = writeln!(out, "{}", event);
    });
}

fn done_line(elapsed: Duration) -> Option<String> {
    (elapsed.as_secs() >= 1).then(|| format!("Done in {}", HumanDuration(elapsed)))
}
