// Rust List Scraper Library
//
// Detects repeated content blocks on a listing page, extracts the chosen text
// fields from every block, and follows "next page" links up to a page budget.

pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod logging;
pub mod output;
pub mod pagination;
pub mod scraper;
pub mod selection;
pub mod structure_analyzer;
pub mod utils;

// Re-export main types for convenience
pub use config::{OutputFormat, ScraperConfig};
pub use error::{FetchError, ScraperError, SelectionError};
pub use extractor::{Field, FieldSchema, Record, RowExtractor};
pub use fetcher::{HttpFetcher, PageSource};
pub use output::ResultSet;
pub use pagination::find_next_page;
pub use crate::scraper::{RunReport, Termination, WebScraper};
pub use selection::{Chooser, FieldChooser, FixedSelection, InteractivePrompt};
pub use structure_analyzer::{ContainerCandidate, ContentTypeInfo, StructureAnalysis, StructureAnalyzer};
pub use utils::{clean_text, normalize_url, RateLimiter, SENTINEL, USER_AGENT};
