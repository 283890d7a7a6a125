use std::io::{self, BufRead, Write};

use crate::error::SelectionError;
use crate::structure_analyzer::ContentTypeInfo;

/// Turns the detected content types into the 1-based indices to extract.
pub trait FieldChooser {
    fn choose(&mut self, content_types: &[ContentTypeInfo]) -> Vec<usize>;
}

/// Parse `1,3`, `2`, or `all` against a list of `available` entries.
///
/// Blank items are skipped and repeated indices keep their first position,
/// so an empty line parses to an empty selection.
pub fn parse_selection(input: &str, available: usize) -> Result<Vec<usize>, SelectionError> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok((1..=available).collect());
    }

    let mut selected = Vec::new();
    for item in input.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let parsed: i64 = item
            .parse()
            .map_err(|_| SelectionError::NotANumber(item.to_string()))?;
        let index = match usize::try_from(parsed) {
            Ok(index) if (1..=available).contains(&index) => index,
            _ => {
                return Err(SelectionError::OutOfRange {
                    index: parsed,
                    max: available,
                });
            }
        };
        if !selected.contains(&index) {
            selected.push(index);
        }
    }

    Ok(selected)
}

/// Line-based prompt over any reader/writer pair.
pub struct InteractivePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> InteractivePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn run(&mut self, content_types: &[ContentTypeInfo]) -> io::Result<Vec<usize>> {
        if content_types.is_empty() {
            writeln!(self.output, "No content types detected. Try another URL.")?;
            log::error!("No content types detected");
            return Ok(Vec::new());
        }

        writeln!(self.output, "\nFound the following content types:")?;
        for (i, info) in content_types.iter().enumerate() {
            writeln!(
                self.output,
                "{}. {} ({} found, e.g., '{}...')",
                i + 1,
                info.label,
                info.count,
                info.sample
            )?;
        }

        loop {
            write!(
                self.output,
                "\nEnter numbers to extract (e.g., '1,2' or '1' for single item, or 'all'): "
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                log::warn!("Input closed before a selection was made");
                return Ok(Vec::new());
            }

            match parse_selection(&line, content_types.len()) {
                Ok(selected) => {
                    log::debug!("Parsed selection {:?} from {:?}", selected, line.trim());
                    return Ok(selected);
                }
                Err(SelectionError::OutOfRange { .. }) => {
                    writeln!(self.output, "Invalid selection. Please enter numbers within the range.")?;
                }
                Err(SelectionError::NotANumber(_)) => {
                    writeln!(self.output, "Please enter valid numbers separated by commas or 'all'.")?;
                }
            }
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: BufRead, W: Write> FieldChooser for InteractivePrompt<R, W> {
    fn choose(&mut self, content_types: &[ContentTypeInfo]) -> Vec<usize> {
        match self.run(content_types) {
            Ok(selected) => selected,
            Err(e) => {
                log::error!("Selection prompt failed: {}", e);
                Vec::new()
            }
        }
    }
}

/// Pre-configured field list for unattended runs: tag names or `all`.
#[derive(Debug, Clone)]
pub struct FixedSelection {
    fields: Vec<String>,
}

impl FixedSelection {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Accepts `h2,p` style flag values.
    pub fn parse(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl FieldChooser for FixedSelection {
    fn choose(&mut self, content_types: &[ContentTypeInfo]) -> Vec<usize> {
        if self.fields.iter().any(|f| f.eq_ignore_ascii_case("all")) {
            return (1..=content_types.len()).collect();
        }

        let mut selected = Vec::new();
        for field in &self.fields {
            let position = content_types
                .iter()
                .position(|info| info.tag.eq_ignore_ascii_case(field) || info.label == *field);
            match position {
                Some(i) if !selected.contains(&(i + 1)) => selected.push(i + 1),
                Some(_) => {}
                None => log::warn!("Field '{}' was not detected on the first page, skipping", field),
            }
        }

        log::info!("Using configured fields: {:?}", self.fields);
        selected
    }
}

/// Chooser picked at startup: configured fields when present, else the prompt.
pub enum Chooser<R, W> {
    Fixed(FixedSelection),
    Interactive(InteractivePrompt<R, W>),
}

impl<R: BufRead, W: Write> FieldChooser for Chooser<R, W> {
    fn choose(&mut self, content_types: &[ContentTypeInfo]) -> Vec<usize> {
        match self {
            Chooser::Fixed(fixed) => fixed.choose(content_types),
            Chooser::Interactive(prompt) => prompt.choose(content_types),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn content_types() -> Vec<ContentTypeInfo> {
        ["h2", "p", "time"]
            .iter()
            .map(|tag| ContentTypeInfo {
                tag: tag.to_string(),
                label: tag.to_uppercase(),
                count: 3,
                sample: format!("{} sample", tag),
            })
            .collect()
    }

    fn prompt_with(input: &str) -> InteractivePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        InteractivePrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_parse_selection_all() {
        assert_eq!(parse_selection("all", 3), Ok(vec![1, 2, 3]));
        assert_eq!(parse_selection(" ALL\n", 2), Ok(vec![1, 2]));
    }

    #[test]
    fn test_parse_selection_list() {
        assert_eq!(parse_selection("1,3", 3), Ok(vec![1, 3]));
        assert_eq!(parse_selection(" 2 , 1 ,, ", 3), Ok(vec![2, 1]));
        assert_eq!(parse_selection("3,3,1", 3), Ok(vec![3, 1]));
        assert_eq!(parse_selection("", 3), Ok(vec![]));
    }

    #[test]
    fn test_parse_selection_errors() {
        assert_eq!(
            parse_selection("4", 3),
            Err(SelectionError::OutOfRange { index: 4, max: 3 })
        );
        assert_eq!(
            parse_selection("0", 3),
            Err(SelectionError::OutOfRange { index: 0, max: 3 })
        );
        assert_eq!(
            parse_selection("1,two", 3),
            Err(SelectionError::NotANumber("two".to_string()))
        );
        assert_eq!(
            parse_selection("-1", 3),
            Err(SelectionError::OutOfRange { index: -1, max: 3 })
        );
        assert_eq!(
            parse_selection("2,-5", 3),
            Err(SelectionError::OutOfRange { index: -5, max: 3 })
        );
    }

    #[test]
    fn test_prompt_lists_types_and_accepts_choice() {
        let mut prompt = prompt_with("1,2\n");
        let selected = prompt.choose(&content_types());
        assert_eq!(selected, vec![1, 2]);

        let (_, output) = prompt.into_inner();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("1. H2 (3 found, e.g., 'h2 sample...')"));
        assert!(output.contains("3. TIME (3 found, e.g., 'time sample...')"));
    }

    #[test]
    fn test_prompt_reprompts_until_valid() {
        let mut prompt = prompt_with("abc\n-1\n9\nall\n");
        let selected = prompt.choose(&content_types());
        assert_eq!(selected, vec![1, 2, 3]);

        let (_, output) = prompt.into_inner();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("Please enter valid numbers separated by commas or 'all'."));
        assert!(output.contains("Invalid selection. Please enter numbers within the range."));
    }

    #[test]
    fn test_prompt_end_of_input_selects_nothing() {
        let mut prompt = prompt_with("oops\n");
        assert!(prompt.choose(&content_types()).is_empty());
    }

    #[test]
    fn test_prompt_without_content_types() {
        let mut prompt = prompt_with("1\n");
        assert!(prompt.choose(&[]).is_empty());

        let (_, output) = prompt.into_inner();
        assert!(String::from_utf8(output).unwrap().contains("No content types detected"));
    }

    #[test]
    fn test_fixed_selection_by_tag() {
        let mut fixed = FixedSelection::parse("time, H2, video, h2");
        assert_eq!(fixed.choose(&content_types()), vec![3, 1]);
    }

    #[test]
    fn test_fixed_selection_all() {
        let mut fixed = FixedSelection::new(vec!["all".to_string()]);
        assert_eq!(fixed.choose(&content_types()), vec![1, 2, 3]);
    }

    #[test]
    fn test_chooser_dispatch() {
        let mut chooser: Chooser<Cursor<Vec<u8>>, Vec<u8>> =
            Chooser::Fixed(FixedSelection::parse("p"));
        assert_eq!(chooser.choose(&content_types()), vec![2]);

        let mut chooser = Chooser::Interactive(prompt_with("3\n"));
        assert_eq!(chooser.choose(&content_types()), vec![3]);
    }
}
