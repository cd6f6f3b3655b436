//! Block metadata heuristics.
//!
//! Each heuristic is a named [`PatternMatcher`] so it can be tested and tuned
//! on its own; [`MetadataExtractor`] is the single seam the stitching stage
//! depends on.

use regex::Regex;
use tracing::warn;

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, Result};
use crate::types::PerformerBlock;

/// Turns a raw line group into an annotated [`PerformerBlock`].
pub trait MetadataExtractor: Send + Sync {
    fn annotate(&self, lines: Vec<String>) -> PerformerBlock;

    fn name(&self) -> &str;
}

/// A compiled pattern whose first capture group is the extracted value.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    pub fn new(name: &str, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| ExtractError::Pattern {
            name: name.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// First capture of the first match in `text`.
    pub fn first_capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Label / name / printed page / header detection from configured patterns.
pub struct RegexMetadataExtractor {
    label: PatternMatcher,
    name: PatternMatcher,
    printed_page: PatternMatcher,
    header: PatternMatcher,
}

impl RegexMetadataExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let patterns = &config.patterns;
        Ok(Self {
            label: PatternMatcher::new("label", &patterns.label)?,
            name: PatternMatcher::new("name", &patterns.name)?,
            printed_page: PatternMatcher::new("printed_page", &patterns.printed_page)?,
            header: PatternMatcher::new("header", &patterns.header)?,
        })
    }

    pub fn label(&self, text: &str) -> Option<String> {
        self.label.first_capture(text).map(str::to_string)
    }

    pub fn performer_name(&self, text: &str) -> Option<String> {
        self.name
            .first_capture(text)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    /// Printed page number. A number too large for a `u32` is logged and
    /// treated as missing so it never takes part in page continuity.
    pub fn printed_page(&self, text: &str) -> Option<u32> {
        let page = self.printed_page.first_capture(text)?;
        match page.parse() {
            Ok(number) => Some(number),
            Err(e) => {
                warn!("Ignoring printed page {:?}: {}", page, e);
                None
            }
        }
    }

    /// True if any single line is a column header.
    pub fn has_header(&self, lines: &[String]) -> bool {
        lines.iter().any(|line| self.header.is_match(line))
    }
}

impl MetadataExtractor for RegexMetadataExtractor {
    fn annotate(&self, lines: Vec<String>) -> PerformerBlock {
        let text = lines.join("\n");
        PerformerBlock {
            label: self.label(&text),
            name: self.performer_name(&text),
            printed_page: self.printed_page(&text),
            has_header: self.has_header(&lines),
            lines,
        }
    }

    fn name(&self) -> &str {
        "RegexMetadataExtractor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> RegexMetadataExtractor {
        RegexMetadataExtractor::from_config(&ExtractionConfig::default()).unwrap()
    }

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_annotate_full_block() {
        let block = extractor().annotate(lines(&[
            "Performer: Jane Doe Label: A3 ID: 12",
            "Set Measure Counts Side 1-Side 2 Front-Back",
            "1 0 Side 1: On 50 yd ln On Front Hash",
            "Printed: 09/01/2026 Page 2 of 4",
        ]));

        assert_eq!(block.label.as_deref(), Some("A3"));
        assert_eq!(block.name.as_deref(), Some("Jane Doe"));
        assert_eq!(block.printed_page, Some(2));
        assert!(block.has_header);
        assert_eq!(block.lines.len(), 4);
    }

    #[test]
    fn test_name_stops_at_end_of_line() {
        let extractor = extractor();
        let text = "Performer: John Smith\nSymbol: T Label: T7";
        assert_eq!(extractor.performer_name(text).as_deref(), Some("John Smith"));
        assert_eq!(extractor.label(text).as_deref(), Some("T7"));
    }

    #[test]
    fn test_name_stops_at_id_field() {
        let extractor = extractor();
        assert_eq!(
            extractor.performer_name("performer: Sam Lee ID: 4").as_deref(),
            Some("Sam Lee")
        );
    }

    #[test]
    fn test_blank_name_is_none() {
        assert_eq!(extractor().performer_name("Performer:   "), None);
    }

    #[test]
    fn test_missing_metadata() {
        let block = extractor().annotate(lines(&["3 1-4 8 Side 2 On 40 yd ln", "4 5-8 8"]));
        assert_eq!(block.label, None);
        assert_eq!(block.name, None);
        assert_eq!(block.printed_page, None);
        assert!(!block.has_header);
    }

    #[test]
    fn test_oversized_printed_page_is_ignored() {
        let extractor = extractor();
        assert_eq!(extractor.printed_page("Page 4294967295 of 9"), Some(u32::MAX));
        assert_eq!(extractor.printed_page("Printed: today Page 99999999999 of 9"), None);
    }

    #[test]
    fn test_header_must_start_the_line() {
        let extractor = extractor();
        assert!(extractor.has_header(&lines(&["set   measure counts"])));
        assert!(!extractor.has_header(&lines(&["Notes: Set Measure Counts below"])));
    }

    #[test]
    fn test_invalid_pattern_reports_name() {
        let mut config = ExtractionConfig::default();
        config.patterns.printed_page = "Page (".to_string();
        let err = RegexMetadataExtractor::from_config(&config).err().unwrap();
        assert!(matches!(err, ExtractError::Pattern { ref name, .. } if name == "printed_page"));
    }
}
