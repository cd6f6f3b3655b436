use regex::Regex;

use crate::config::ExtractionConfig;
use crate::error::{ExtractError, Result};
use crate::types::SetRecord;

/// Outcome of parsing one line as a coordinate row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Row(SetRecord),
    /// Line doesn't start with a set id
    NotARow,
    /// Line starts like a row but its fields can't be read
    Malformed { set_id: String, reason: String },
}

/// Parses `<set id> <measure/counts> <coordinate text>` rows.
pub struct RowParser {
    row_start: Regex,
}

impl RowParser {
    pub fn new(row_start_pattern: &str) -> Result<Self> {
        let row_start = Regex::new(row_start_pattern).map_err(|source| ExtractError::Pattern {
            name: "row_start".to_string(),
            source,
        })?;
        Ok(Self { row_start })
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        Self::new(&config.patterns.row_start)
    }

    /// Whether the line looks like a data row rather than a header or
    /// identity line.
    pub fn is_row_start(&self, line: &str) -> bool {
        self.row_start.is_match(line)
    }

    pub fn parse(&self, line: &str) -> RowOutcome {
        let Some(caps) = self.row_start.captures(line) else {
            return RowOutcome::NotARow;
        };

        let set_id = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let remainder = caps.get(2).map_or("", |m| m.as_str()).trim();

        let tokens: Vec<&str> = remainder.split_whitespace().collect();
        if tokens.is_empty() {
            return RowOutcome::Malformed {
                set_id,
                reason: "no fields after set id".to_string(),
            };
        }

        let (measure_range, count_token, consumed) = measure_and_counts(&tokens);
        let counts = match count_token.map(|token| (token, to_count(token))) {
            Some((_, Some(count))) => Some(count),
            Some((token, None)) => {
                return RowOutcome::Malformed {
                    set_id,
                    reason: format!("count {token} out of range"),
                };
            }
            None => None,
        };
        let coord_tokens = &tokens[consumed..];
        let (side_text, fb_text) = split_coordinates(coord_tokens);

        RowOutcome::Row(SetRecord {
            set_id,
            measure_range,
            counts,
            side_text,
            fb_text,
            raw_coords: coord_tokens.join(" "),
            position: None,
        })
    }
}

/// Digits with at most one decimal point.
fn is_integer_like(token: &str) -> bool {
    let mut digits = 0;
    let mut points = 0;
    for c in token.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

/// Truncates decimals; `None` when the value doesn't fit a `u32`.
fn to_count(token: &str) -> Option<u32> {
    let value = token.parse::<f64>().ok()?.trunc();
    (0.0..=f64::from(u32::MAX))
        .contains(&value)
        .then_some(value as u32)
}

/// Decide which of the leading tokens are the measure range and the count.
/// Returns (measure_range, count token, tokens consumed).
fn measure_and_counts<'t>(tokens: &[&'t str]) -> (String, Option<&'t str>, usize) {
    match tokens {
        [t0, t1, ..] => match (is_integer_like(t0), is_integer_like(t1)) {
            // "1 16" or "1-4 16"
            (_, true) => (t0.to_string(), Some(*t1), 2),
            // "16 Side ..." reads as a count with the measure missing
            (true, false) => (String::new(), Some(*t0), 1),
            // "1-4 Side ..." reads as a measure with the count missing
            (false, false) => (t0.to_string(), None, 1),
        },
        [t0] if is_integer_like(t0) => (String::new(), Some(*t0), 1),
        [t0] => (t0.to_string(), None, 1),
        [] => (String::new(), None, 0),
    }
}

/// Split coordinate text after the first "ln"/"line" token. Without a marker
/// everything stays on the side component and front/back is left empty.
fn split_coordinates(tokens: &[&str]) -> (String, String) {
    let marker = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("ln") || t.eq_ignore_ascii_case("line"));

    match marker {
        Some(idx) => (tokens[..=idx].join(" "), tokens[idx + 1..].join(" ")),
        None => (tokens.join(" "), String::new()),
    }
}
