use anyhow::Result;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use url::Url;

use rust_list_scraper::config::{OutputFormat, ScraperConfig};
use rust_list_scraper::error::ScraperError;
use rust_list_scraper::fetcher::HttpFetcher;
use rust_list_scraper::output::{output_path, save};
use rust_list_scraper::scraper::{Termination, WebScraper};
use rust_list_scraper::selection::{Chooser, FixedSelection, InteractivePrompt};
use rust_list_scraper::utils::normalize_url;
use rust_list_scraper::logging;

/// CLI arguments
#[derive(Parser, Debug)]
#[command(name = "rust-list-scraper")]
#[command(about = "Flexible listing scraper for any website", long_about = None)]
struct Args {
    /// Website URL to scrape (prompted for when omitted)
    #[arg(short, long)]
    url: Option<String>,

    /// Maximum number of pages to scrape [default: 3]
    #[arg(short, long)]
    pages: Option<usize>,

    /// Fields to extract without prompting, e.g. "h2,p" or "all"
    #[arg(short, long)]
    fields: Option<String>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file (defaults to <host>_data.<ext>)
    #[arg(short, long)]
    output: Option<String>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fetch attempts per page
    #[arg(long)]
    retries: Option<u32>,

    /// Pause between fetch attempts in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Pause between pages in milliseconds
    #[arg(long)]
    page_delay_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Log file, appended to on every run
    #[arg(long)]
    log_file: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Config file values first, then any flag given on the command line.
    fn resolve_config(&self) -> Result<ScraperConfig> {
        let mut config = match &self.config {
            Some(path) => ScraperConfig::load(path)?,
            None => ScraperConfig::default(),
        };

        if let Some(pages) = self.pages {
            config.max_pages = pages;
        }
        if let Some(fields) = &self.fields {
            config.fields = Some(
                fields
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(retries) = self.retries {
            config.max_attempts = retries;
        }
        if let Some(delay) = self.retry_delay_ms {
            config.retry_delay_ms = delay;
        }
        if let Some(delay) = self.page_delay_ms {
            config.page_delay_ms = delay;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(log_file) = &self.log_file {
            config.log_file = log_file.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match args.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("An error occurred: {:#}", e);
            return;
        }
    };

    if let Err(e) = logging::init(Path::new(&config.log_file), args.verbose) {
        eprintln!("Logging to {} is unavailable: {:#}", config.log_file, e);
    }

    // The run blocks on stdin, so the interrupt is handled on a worker thread.
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Scraping interrupted by user");
            std::process::exit(0);
        }
    });

    let log_file = config.log_file.clone();
    if let Err(e) = run(args.url, args.pages.is_some(), config).await {
        log::error!("Unexpected error: {:#}", e);
        println!("An error occurred. Check {} for details.", log_file);
    }
}

async fn run(url: Option<String>, pages_given: bool, mut config: ScraperConfig) -> Result<()> {
    let raw_url = match url {
        Some(url) => url,
        None => {
            let url = prompt_line("Enter website URL (e.g., https://www.bbc.com/news): ")?;
            if !pages_given {
                config.max_pages = prompt_max_pages(config.max_pages)?;
            }
            url
        }
    };

    let url = normalize_url(&raw_url);
    let parsed = Url::parse(&url).map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", url, e)))?;

    let fetcher = HttpFetcher::new(&config)?;
    let chooser = match &config.fields {
        Some(fields) => Chooser::Fixed(FixedSelection::new(fields.clone())),
        None => Chooser::Interactive(InteractivePrompt::new(io::stdin().lock(), io::stdout())),
    };

    let mut scraper = WebScraper::new(fetcher, chooser, &config);
    let report = scraper.run(parsed.as_str()).await;

    match report.termination {
        Termination::FirstFetchFailed => {
            println!("Failed to fetch the page. Check the URL or try again.");
            return Ok(());
        }
        // the orchestrator already told the operator why
        Termination::NoContainers | Termination::NoContentTypes | Termination::NoSelection => {
            return Ok(());
        }
        _ => {}
    }

    if report.results.is_empty() {
        println!("No data scraped. Try different selections or URL.");
        log::warn!("No data scraped");
        return Ok(());
    }

    let path = output_path(&parsed, config.format, config.output.as_deref());
    let written = save(&report.results, &path, config.format)?;
    println!("Saved {} items to {}", written, path.display());

    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_max_pages(default: usize) -> Result<usize> {
    loop {
        let answer = prompt_line(&format!(
            "Max pages to scrape (default {}, press Enter to use default): ",
            default
        ))?;
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse() {
            Ok(pages) => return Ok(pages),
            Err(_) => println!("Please enter a whole number."),
        }
    }
}
