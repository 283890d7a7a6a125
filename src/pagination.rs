use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("anchor selector is valid"));

static NEXT_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)next|page \d+").expect("pagination pattern is valid"));

/// Locate the "next page" link and resolve it against `base_url`.
///
/// An anchor whose class mentions "next" takes priority; only when none exists
/// is anchor text matched against `next` / `page N`. If the chosen anchor has
/// no `href`, there is no next page.
pub fn find_next_page(document: &Html, base_url: &str) -> Option<String> {
    let anchors: Vec<ElementRef> = document.select(&ANCHOR).collect();

    let candidate = match anchors.iter().find(|a| has_next_class(a)) {
        Some(anchor) => {
            log::debug!("Next link matched by class: {:?}", anchor.value().attr("class"));
            anchor
        }
        None => {
            let anchor = anchors.iter().find(|a| has_next_text(a))?;
            log::debug!("Next link matched by text: {:?}", anchor.text().collect::<String>().trim());
            anchor
        }
    };

    let href = candidate.value().attr("href")?;
    let base = match Url::parse(base_url) {
        Ok(base) => base,
        Err(e) => {
            log::warn!("Cannot resolve next link against {}: {}", base_url, e);
            return None;
        }
    };

    match base.join(href) {
        Ok(next) => {
            log::debug!("Resolved next link '{}' to {}", href, next);
            Some(next.to_string())
        }
        Err(e) => {
            log::warn!("Ignoring malformed next link '{}': {}", href, e);
            None
        }
    }
}

fn has_next_class(anchor: &ElementRef) -> bool {
    anchor
        .value()
        .attr("class")
        .is_some_and(|class| class.to_lowercase().contains("next"))
}

fn has_next_text(anchor: &ElementRef) -> bool {
    let text: String = anchor.text().collect();
    NEXT_TEXT.is_match(&text)
}
