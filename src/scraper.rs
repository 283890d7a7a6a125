use scraper::Html;
use std::collections::HashSet;
use std::fmt;

use crate::config::ScraperConfig;
use crate::extractor::{FieldSchema, RowExtractor};
use crate::fetcher::PageSource;
use crate::output::ResultSet;
use crate::pagination::find_next_page;
use crate::selection::FieldChooser;
use crate::structure_analyzer::StructureAnalyzer;
use crate::utils::{RateLimiter, site_root};

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    FirstFetchFailed,
    NoContainers,
    NoContentTypes,
    NoSelection,
    NoNextPage,
    PageLimit,
    Revisited(String),
    FetchFailed { page: usize },
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::FirstFetchFailed => write!(f, "first page could not be fetched"),
            Termination::NoContainers => write!(f, "no content containers found"),
            Termination::NoContentTypes => write!(f, "no content types detected"),
            Termination::NoSelection => write!(f, "no fields selected"),
            Termination::NoNextPage => write!(f, "no more pages to scrape"),
            Termination::PageLimit => write!(f, "page limit reached"),
            Termination::Revisited(url) => write!(f, "next page {} was already scraped", url),
            Termination::FetchFailed { page } => write!(f, "page {} could not be fetched", page),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub termination: Termination,
    pub pages_scraped: usize,
    pub results: ResultSet,
}

impl RunReport {
    fn stopped(termination: Termination) -> Self {
        Self {
            termination,
            pages_scraped: 0,
            results: ResultSet::default(),
        }
    }
}

/// Drives fetch → analyze → select → extract → paginate for one site.
pub struct WebScraper<S, C> {
    source: S,
    chooser: C,
    analyzer: StructureAnalyzer,
    max_pages: usize,
    page_delay: RateLimiter,
}

impl<S: PageSource, C: FieldChooser> WebScraper<S, C> {
    pub fn new(source: S, chooser: C, config: &ScraperConfig) -> Self {
        Self {
            source,
            chooser,
            analyzer: StructureAnalyzer::from_config(config),
            max_pages: config.max_pages,
            page_delay: RateLimiter::from_millis(config.page_delay_ms),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn run(&mut self, url: &str) -> RunReport {
        log::info!("🚀 Starting scrape of {} (max {} pages)", url, self.max_pages);

        let first_page = match self.source.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("{}", e);
                return RunReport::stopped(Termination::FirstFetchFailed);
            }
        };

        // Schema and container tag are fixed here for the whole run.
        let (container_tag, schema) = match self.select_fields(&first_page) {
            Ok(chosen) => chosen,
            Err(termination) => {
                log::error!("Stopping: {}", termination);
                return RunReport::stopped(termination);
            }
        };

        let extractor = RowExtractor::new(&container_tag, &schema);
        // Next links resolve against the site root, not the current page.
        let base_url = site_root(url);
        let mut results = ResultSet::new(schema.labels());
        let mut visited = HashSet::new();
        let mut current_url = url.to_string();
        let mut html = first_page;
        let mut pages_scraped = 0;

        let termination = loop {
            if pages_scraped >= self.max_pages {
                break Termination::PageLimit;
            }

            pages_scraped += 1;
            visited.insert(current_url.clone());
            log::info!(
                "Scraping page {}: {} (<{}> containers)",
                pages_scraped,
                current_url,
                extractor.container_tag()
            );

            let next_url = {
                let document = Html::parse_document(&html);
                results.extend(extractor.extract(&document));
                find_next_page(&document, &base_url)
            };

            let Some(next_url) = next_url else {
                break Termination::NoNextPage;
            };
            if pages_scraped >= self.max_pages {
                break Termination::PageLimit;
            }
            if visited.contains(&next_url) {
                break Termination::Revisited(next_url);
            }

            self.page_delay.wait().await;
            match self.source.fetch(&next_url).await {
                Ok(body) => {
                    html = body;
                    current_url = next_url;
                }
                Err(e) => {
                    log::error!("{}", e);
                    break Termination::FetchFailed {
                        page: pages_scraped + 1,
                    };
                }
            }
        };

        log::info!(
            "✅ Finished after {} page(s), {} items collected: {}",
            pages_scraped,
            results.len(),
            termination
        );

        RunReport {
            termination,
            pages_scraped,
            results,
        }
    }

    fn select_fields(&mut self, html: &str) -> Result<(String, FieldSchema), Termination> {
        let document = Html::parse_document(html);
        let analysis = self.analyzer.analyze(&document);

        let Some(container_tag) = analysis.container_tag() else {
            println!("No content containers found. Try another URL.");
            return Err(Termination::NoContainers);
        };
        if analysis.content_types.is_empty() {
            println!("No content types detected. Try another URL.");
            return Err(Termination::NoContentTypes);
        }

        let selection = self.chooser.choose(&analysis.content_types);
        let schema = FieldSchema::from_selection(&analysis.content_types, &selection);
        if schema.is_empty() {
            println!("No data selected. Exiting.");
            return Err(Termination::NoSelection);
        }

        log::info!("Extracting {:?} from <{}> containers", schema.labels(), container_tag);
        Ok((container_tag.to_string(), schema))
    }
}
