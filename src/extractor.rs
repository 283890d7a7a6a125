use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

use crate::structure_analyzer::{parse_tag, ContentTypeInfo};
use crate::utils::{clean_text, SENTINEL};

/// Output column name -> cleaned text, one per container instance.
pub type Record = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub tag: String,
    pub label: String,
}

/// The columns chosen on the first page, reused for every later page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSchema {
    fields: Vec<Field>,
}

impl FieldSchema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Map 1-based selection indices back to tags; unknown indices are dropped.
    pub fn from_selection(content_types: &[ContentTypeInfo], selection: &[usize]) -> Self {
        let fields = selection
            .iter()
            .filter_map(|&i| i.checked_sub(1).and_then(|i| content_types.get(i)))
            .map(|info| Field {
                tag: info.tag.clone(),
                label: info.label.clone(),
            })
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn labels(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.label.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builds one record per container using a fixed schema.
pub struct RowExtractor {
    container_tag: String,
    container: Option<Selector>,
    fields: Vec<(Field, Option<Selector>)>,
}

impl RowExtractor {
    pub fn new(container_tag: &str, schema: &FieldSchema) -> Self {
        let fields = schema
            .fields()
            .iter()
            .map(|field| (field.clone(), parse_tag(&field.tag)))
            .collect();

        Self {
            container_tag: container_tag.to_string(),
            container: parse_tag(container_tag),
            fields,
        }
    }

    pub fn container_tag(&self) -> &str {
        &self.container_tag
    }

    pub fn extract(&self, document: &Html) -> Vec<Record> {
        let Some(container) = &self.container else {
            log::warn!("Container tag <{}> is not selectable", self.container_tag);
            return Vec::new();
        };

        let rows: Vec<Record> = document
            .select(container)
            .map(|element| self.build_row(element))
            .collect();

        log::info!("Scraped {} items from page", rows.len());
        rows
    }

    fn build_row(&self, container: ElementRef) -> Record {
        let row: Record = self
            .fields
            .iter()
            .map(|(field, selector)| {
                let text = selector
                    .as_ref()
                    .and_then(|s| container.select(s).next())
                    .map(|element| element.text().collect::<String>());
                let value = match text {
                    Some(text) => clean_text(Some(&text)),
                    None => SENTINEL.to_string(),
                };
                (field.label.clone(), value)
            })
            .collect();
        log::debug!("Row from <{}>: {:?}", self.container_tag, row);
        row
    }
}

/// One-shot form of [`RowExtractor::extract`].
pub fn extract(document: &Html, container_tag: &str, schema: &FieldSchema) -> Vec<Record> {
    RowExtractor::new(container_tag, schema).extract(document)
}
