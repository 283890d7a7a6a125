use thiserror::Error;

/// Failure of a single page fetch after every retry was spent.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch {url} after {attempts} attempt(s): {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

/// Operator input that could not be turned into a selection.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{index} is outside 1..={max}")]
    OutOfRange { index: i64, max: usize },
}

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
