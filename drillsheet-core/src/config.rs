use crate::error::{ExtractError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_min_text_length_threshold() -> usize {
    200
}

fn default_y_tolerance() -> f32 {
    3.0
}

fn default_ocr_dpi() -> u32 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Native text with this many characters or fewer falls back to OCR
    #[serde(default = "default_min_text_length_threshold")]
    pub min_text_length_threshold: usize,
    /// Vertical distance (page units) within which words share a line
    #[serde(default = "default_y_tolerance")]
    pub y_tolerance: f32,
    /// Render resolution requested from the OCR collaborator
    #[serde(default = "default_ocr_dpi")]
    pub ocr_dpi: u32,
    /// Run the four quadrant OCR requests concurrently
    #[serde(default = "default_true")]
    pub parallel_quadrants: bool,
    #[serde(default)]
    pub markers: MarkerConfig,
    #[serde(default)]
    pub patterns: PatternConfig,
    #[serde(default)]
    pub stitching: StitchingConfig,
    #[serde(default)]
    pub coordinates: CoordinateConfig,
}

/// Literal structural markers used for block segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Starts a new performer block
    pub performer: String,
    /// Page footer; closes the current block
    pub footer: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            performer: "Performer:".to_string(),
            footer: "Printed:".to_string(),
        }
    }
}

/// Regex patterns for block metadata and row detection. Each pattern's first
/// capture group is the extracted value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    pub label: String,
    pub name: String,
    pub printed_page: String,
    /// Matched against single lines
    pub header: String,
    /// Group 1 is the set id, group 2 the remainder of the row
    pub row_start: String,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            label: r"(?i)Label:\s*([A-Za-z0-9]+)".to_string(),
            // Multi-line: the name ends at its own line break, so
            // "Performer: John\nSymbol: T Label: T7" yields "John". A
            // single-line `$` would find no terminator there and yield none.
            name: r"(?im)Performer:\s*(.*?)(?:\s+Label:|\s+ID:|$)".to_string(),
            printed_page: r"(?i)Page\s+(\d+)\s+of\s+\d+".to_string(),
            // Anchored: a header line starts with the column titles. OCR
            // lines carrying a prefix can use an unanchored override.
            header: r"(?i)^Set\s+Measure\s+Counts".to_string(),
            row_start: r"^(\d+[A-Z]?)\s+(.*)".to_string(),
        }
    }
}

/// Which block's printed page survives a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PagePolicy {
    /// Keep the first block's page; take the later page only if none was set
    #[default]
    KeepEarliest,
    /// Take the later block's page whenever it has one
    KeepLatest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StitchingConfig {
    #[serde(default)]
    pub page_policy: PagePolicy,
    /// Same label on consecutive printed pages
    #[serde(default = "default_true")]
    pub enable_page_continuity: bool,
    /// Headerless row-only block continuing the previous one
    #[serde(default = "default_true")]
    pub enable_headerless_continuation: bool,
}

impl Default for StitchingConfig {
    fn default() -> Self {
        Self {
            page_policy: PagePolicy::default(),
            enable_page_continuity: true,
            enable_headerless_continuation: true,
        }
    }
}

/// Named football field layouts with their front/back checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldProfile {
    #[default]
    HighSchool,
    College,
}

impl std::str::FromStr for FieldProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "high_school" | "hs" => Ok(FieldProfile::HighSchool),
            "college" | "ncaa" => Ok(FieldProfile::College),
            other => Err(format!("unknown field `{other}` (expected high_school or college)")),
        }
    }
}

impl FieldProfile {
    /// Field named by a hash designation printed on a chart: `HS` or `CH`.
    /// Pro hashes (`PH`) have no layout here.
    pub fn from_hash_designation(designation: &str) -> Option<Self> {
        match designation.to_ascii_uppercase().as_str() {
            "HS" => Some(FieldProfile::HighSchool),
            "CH" => Some(FieldProfile::College),
            _ => None,
        }
    }

    /// Steps from center-front for (front sideline, front hash, back hash,
    /// back sideline). Behind the front sideline is negative.
    pub fn checkpoints(self) -> FieldCheckpoints {
        match self {
            FieldProfile::HighSchool => FieldCheckpoints {
                front_sideline: 0.0,
                front_hash: -28.0,
                back_hash: -56.0,
                back_sideline: -85.0,
            },
            FieldProfile::College => FieldCheckpoints {
                front_sideline: 0.0,
                front_hash: -32.0,
                back_hash: -52.0,
                back_sideline: -85.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldCheckpoints {
    pub front_sideline: f32,
    pub front_hash: f32,
    pub back_hash: f32,
    pub back_sideline: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoordinateConfig {
    /// Resolve side/front-back text into step offsets
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub field: FieldProfile,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length_threshold: default_min_text_length_threshold(),
            y_tolerance: default_y_tolerance(),
            ocr_dpi: default_ocr_dpi(),
            parallel_quadrants: true,
            markers: MarkerConfig::default(),
            patterns: PatternConfig::default(),
            stitching: StitchingConfig::default(),
            coordinates: CoordinateConfig::default(),
        }
    }
}

impl ExtractionConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|source| ExtractError::Config { source })
    }

    /// Load config from a YAML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load config with fallback to default
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("Failed to load config from {p}, using defaults: {e}");
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
