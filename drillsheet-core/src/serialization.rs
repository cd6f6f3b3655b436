use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{ExtractError, Result};
use crate::types::*;

/// Output shape of the extracted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The result object: sheets, debug counters and diagnostics
    #[default]
    Result,
    /// One row per set with the performer columns repeated
    Flat,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "result" => Ok(OutputFormat::Result),
            "flat" => Ok(OutputFormat::Flat),
            other => Err(format!("unknown format `{other}` (expected result or flat)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Result => f.write_str("result"),
            OutputFormat::Flat => f.write_str("flat"),
        }
    }
}

/// A set row joined with its sheet's performer columns, for spreadsheet-style
/// import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatSetRow {
    pub performer_label: String,
    pub performer_name: Option<String>,
    pub printed_page_number: Option<u32>,
    pub physical_pdf_page_index: usize,
    pub set_id: String,
    pub measure_range: String,
    pub counts: Option<u32>,
    pub side_text: String,
    pub fb_text: String,
    pub raw_coords: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_steps: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_steps: Option<f32>,
}

impl ExtractedSheet {
    pub fn to_flat_rows(&self) -> Vec<FlatSetRow> {
        self.sets
            .iter()
            .map(|set| FlatSetRow {
                performer_label: self.performer_label.clone(),
                performer_name: self.performer_name.clone(),
                printed_page_number: self.printed_page_number,
                physical_pdf_page_index: self.physical_pdf_page_index,
                set_id: set.set_id.clone(),
                measure_range: set.measure_range.clone(),
                counts: set.counts,
                side_text: set.side_text.clone(),
                fb_text: set.fb_text.clone(),
                raw_coords: set.raw_coords.clone(),
                x_steps: set.position.map(|p| p.x_steps),
                y_steps: set.position.map(|p| p.y_steps),
            })
            .collect()
    }
}

impl ExtractionResult {
    pub fn to_flat_format(&self) -> Vec<FlatSetRow> {
        self.sheets.iter().flat_map(ExtractedSheet::to_flat_rows).collect()
    }

    pub fn to_json_with_format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Result => to_json(self),
            OutputFormat::Flat => to_json(&self.to_flat_format()),
        }
    }

    pub fn save_with_format(&self, path: &str, format: OutputFormat) -> Result<()> {
        let json = self.to_json_with_format(format)?;
        write_output(path, &json)
    }
}

/// Render several pages at once: an array of result objects, or a single
/// flat row list spanning every page.
pub fn pages_to_json(results: &[ExtractionResult], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Result => to_json(results),
        OutputFormat::Flat => {
            let rows: Vec<FlatSetRow> = results
                .iter()
                .flat_map(ExtractionResult::to_flat_format)
                .collect();
            to_json(&rows)
        }
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|source| ExtractError::Serialize { source })
}

pub fn write_output(path: &str, json: &str) -> Result<()> {
    std::fs::write(path, json).map_err(|source| ExtractError::Io {
        path: path.to_string(),
        source,
    })
}
