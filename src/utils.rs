use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// Browser-like identity sent with every request
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Placeholder for missing or empty text
pub const SENTINEL: &str = "N/A";

/// Collapse whitespace runs, trim, and substitute the sentinel for empty input.
pub fn clean_text(text: Option<&str>) -> String {
    let cleaned = text
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default();

    if cleaned.is_empty() {
        SENTINEL.to_string()
    } else {
        cleaned
    }
}

/// First `max_chars` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Prefix `https://` when the operator omitted the scheme.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// `www.example.com` -> `www_example_com`, port kept as `_8080`.
pub fn host_stem(url: &Url) -> String {
    let host = url.host_str().unwrap_or("output").replace('.', "_");
    match url.port() {
        Some(port) => format!("{}_{}", host, port),
        None => host,
    }
}

/// `scheme://host[:port]` of `url`, the base that next-page links resolve
/// against. Unparseable input is returned unchanged.
pub fn site_root(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let origin = parsed.origin();
            if origin.is_tuple() {
                origin.ascii_serialization()
            } else {
                url.to_string()
            }
        }
        Err(_) => url.to_string(),
    }
}

/// Fixed pause used for retry backoff and between pages.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    delay_ms: u64,
}

impl RateLimiter {
    pub fn from_millis(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub async fn wait(&self) {
        if self.delay_ms > 0 {
            sleep(self.delay()).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_collapses_whitespace() {
        assert_eq!(clean_text(Some("  Hello \n\t  world  ")), "Hello world");
        assert_eq!(clean_text(Some("a\u{00a0}\u{00a0}b")), "a b");
    }

    #[test]
    fn test_clean_text_never_empty() {
        assert_eq!(clean_text(None), SENTINEL);
        assert_eq!(clean_text(Some("")), SENTINEL);
        assert_eq!(clean_text(Some(" \n\t ")), SENTINEL);
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 50), "short");
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com/news"), "https://example.com/news");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url(" https://example.com "), "https://example.com");
    }

    #[test]
    fn test_host_stem() {
        let url = Url::parse("https://www.bbc.com/news").unwrap();
        assert_eq!(host_stem(&url), "www_bbc_com");

        let url = Url::parse("http://127.0.0.1:8080/list").unwrap();
        assert_eq!(host_stem(&url), "127_0_0_1_8080");
    }

    #[test]
    fn test_site_root() {
        assert_eq!(site_root("https://example.com/news/list.html"), "https://example.com");
        assert_eq!(site_root("http://127.0.0.1:8080/a/b?page=2"), "http://127.0.0.1:8080");
        assert_eq!(site_root("https://example.com:443/news"), "https://example.com");
        assert_eq!(site_root("not a url"), "not a url");
    }

    #[test]
    fn test_rate_limiter_creation() {
        assert_eq!(RateLimiter::from_millis(250).delay(), Duration::from_millis(250));
        assert_eq!(RateLimiter::from_millis(0).delay(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_delay_returns_immediately() {
        let start = std::time::Instant::now();
        RateLimiter::from_millis(0).wait().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }
}
