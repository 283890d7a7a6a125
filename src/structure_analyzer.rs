use scraper::{ElementRef, Html, Selector};

use crate::config::ScraperConfig;
use crate::utils::{clean_text, truncate_chars};

const SAMPLE_CHARS: usize = 50;

/// One kind of text-bearing tag found on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeInfo {
    pub tag: String,
    /// Uppercased tag name, also used as the output column name
    pub label: String,
    pub count: usize,
    pub sample: String,
}

/// An element that looks like it wraps one repeated item
#[derive(Debug, Clone)]
pub struct ContainerCandidate<'a> {
    pub tag: String,
    pub element: ElementRef<'a>,
}

#[derive(Debug, Clone)]
pub struct StructureAnalysis<'a> {
    pub containers: Vec<ContainerCandidate<'a>>,
    pub content_types: Vec<ContentTypeInfo>,
}

impl StructureAnalysis<'_> {
    /// Tag of the first qualifying container, in whitelist order.
    pub fn container_tag(&self) -> Option<&str> {
        self.containers.first().map(|c| c.tag.as_str())
    }
}

/// Whitelist-driven detection of repeating containers and content tags
pub struct StructureAnalyzer {
    container_tags: Vec<String>,
    content_tags: Vec<String>,
}

impl Default for StructureAnalyzer {
    fn default() -> Self {
        let config = ScraperConfig::default();
        Self::with_tags(config.container_tags, config.content_tags)
    }
}

impl StructureAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tags(container_tags: Vec<String>, content_tags: Vec<String>) -> Self {
        Self {
            container_tags,
            content_tags,
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::with_tags(config.container_tags.clone(), config.content_tags.clone())
    }

    pub fn analyze<'a>(&self, document: &'a Html) -> StructureAnalysis<'a> {
        let containers = self.find_containers(document);
        let content_types = self.summarize_content(document);

        log::info!(
            "Detected {} content types: {:?}",
            content_types.len(),
            content_types.iter().map(|c| c.label.as_str()).collect::<Vec<_>>()
        );
        if let Some(first) = containers.first() {
            log::info!(
                "Found {} candidate containers, using <{}>",
                containers.len(),
                first.tag
            );
        }

        StructureAnalysis {
            containers,
            content_types,
        }
    }

    fn find_containers<'a>(&self, document: &'a Html) -> Vec<ContainerCandidate<'a>> {
        let content_selectors = compile(&self.content_tags);
        let mut containers = Vec::new();

        for tag in &self.container_tags {
            let Some(selector) = parse_tag(tag) else {
                continue;
            };
            for element in document.select(&selector) {
                if has_content_descendant(element, &content_selectors) {
                    containers.push(ContainerCandidate {
                        tag: tag.clone(),
                        element,
                    });
                }
            }
        }

        containers
    }

    fn summarize_content(&self, document: &Html) -> Vec<ContentTypeInfo> {
        let mut content_types = Vec::new();

        for tag in &self.content_tags {
            let Some(selector) = parse_tag(tag) else {
                continue;
            };
            let mut matches = document.select(&selector);
            let Some(first) = matches.next() else {
                continue;
            };
            let count = 1 + matches.count();

            let text: String = first.text().collect();
            content_types.push(ContentTypeInfo {
                tag: tag.clone(),
                label: tag.to_uppercase(),
                count,
                sample: truncate_chars(&clean_text(Some(&text)), SAMPLE_CHARS),
            });
        }

        content_types.retain(|info| info.count > 0);
        content_types
    }
}

pub(crate) fn parse_tag(tag: &str) -> Option<Selector> {
    match Selector::parse(tag) {
        Ok(selector) => Some(selector),
        Err(e) => {
            log::warn!("Ignoring tag '{}': {}", tag, e);
            None
        }
    }
}

fn compile(tags: &[String]) -> Vec<Selector> {
    tags.iter().filter_map(|t| parse_tag(t)).collect()
}

fn has_content_descendant(element: ElementRef, selectors: &[Selector]) -> bool {
    selectors
        .iter()
        .any(|selector| element.select(selector).next().is_some())
}
