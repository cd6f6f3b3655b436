use serde::{Deserialize, Serialize};
use std::fmt;

use crate::diagnostics::Diagnostic;

// ===== WORD MODEL =====
// Both upstream sources (native text extraction, OCR) are normalized into
// `Word` before anything in the pipeline sees them.

/// A single positioned token with an axis-aligned bounding box.
///
/// Coordinates follow the page convention of the producing source: y grows
/// downwards, so `y0` is the top edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
    pub text: String,
    /// Recognition confidence in [0, 1]; absent for native text extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl Word {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32, text: impl Into<String>) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
            text: text.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Re-establish `x0 <= x1` and `y0 <= y1` for words that were
    /// deserialized from an untrusted dump.
    pub fn normalized(self) -> Self {
        let confidence = self.confidence;
        let mut word = Self::new(self.x0, self.y0, self.x1, self.y1, self.text);
        word.confidence = confidence;
        word
    }

    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Axis-aligned rectangle in page units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// Page dimensions used for midpoint computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
}

impl PageGeometry {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn midpoint(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

// ===== QUADRANTS =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// Fixed processing order. Output of every quadrant-wise step is
    /// reassembled in this order regardless of completion order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Classify a point against the page midpoints. Points exactly on a
    /// midpoint fall to the right/bottom side.
    pub fn classify(x: f32, y: f32, x_mid: f32, y_mid: f32) -> Self {
        match (y < y_mid, x < x_mid) {
            (true, true) => Quadrant::TopLeft,
            (true, false) => Quadrant::TopRight,
            (false, true) => Quadrant::BottomLeft,
            (false, false) => Quadrant::BottomRight,
        }
    }

    pub fn of_word(word: &Word, geometry: &PageGeometry) -> Self {
        let (cx, cy) = word.center();
        let (x_mid, y_mid) = geometry.midpoint();
        Self::classify(cx, cy, x_mid, y_mid)
    }

    pub fn index(self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::TopRight => 1,
            Quadrant::BottomLeft => 2,
            Quadrant::BottomRight => 3,
        }
    }

    /// The page region covered by this quadrant.
    pub fn clip(self, geometry: &PageGeometry) -> Rect {
        let (x_mid, y_mid) = geometry.midpoint();
        let (x0, x1) = match self {
            Quadrant::TopLeft | Quadrant::BottomLeft => (0.0, x_mid),
            Quadrant::TopRight | Quadrant::BottomRight => (x_mid, geometry.width),
        };
        let (y0, y1) = match self {
            Quadrant::TopLeft | Quadrant::TopRight => (0.0, y_mid),
            Quadrant::BottomLeft | Quadrant::BottomRight => (y_mid, geometry.height),
        };
        Rect { x0, y0, x1, y1 }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "top_left",
            Quadrant::TopRight => "top_right",
            Quadrant::BottomLeft => "bottom_left",
            Quadrant::BottomRight => "bottom_right",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ===== OCR DETECTIONS =====

/// One OCR detection: a quadrilateral region, recognized text and a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrDetection {
    /// Four corner points `[x, y]`, in any winding order
    pub quad: [[f32; 2]; 4],
    pub text: String,
    pub confidence: f32,
}

impl OcrDetection {
    /// Collapse the quadrilateral to its axis-aligned bounding box.
    pub fn into_word(self) -> Word {
        let xs = self.quad.map(|p| p[0]);
        let ys = self.quad.map(|p| p[1]);
        let min = |v: [f32; 4]| v.into_iter().fold(f32::INFINITY, f32::min);
        let max = |v: [f32; 4]| v.into_iter().fold(f32::NEG_INFINITY, f32::max);
        Word::new(min(xs), min(ys), max(xs), max(ys), self.text).with_confidence(self.confidence)
    }
}

// ===== BLOCKS AND SHEETS =====

/// A run of lines believed to belong to one performer's printed record.
///
/// Mutable while stitching; treated as frozen afterwards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformerBlock {
    pub label: Option<String>,
    pub name: Option<String>,
    pub printed_page: Option<u32>,
    pub has_header: bool,
    pub lines: Vec<String>,
}

impl PerformerBlock {
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }
}

/// Stage position resolved to steps from center-front of the field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldPosition {
    pub x_steps: f32,
    pub y_steps: f32,
}

/// One parsed coordinate row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub set_id: String,
    /// Empty when the row only carried a count
    pub measure_range: String,
    pub counts: Option<u32>,
    pub side_text: String,
    /// Front/back component; empty when no split marker was found
    pub fb_text: String,
    pub raw_coords: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<FieldPosition>,
}

impl SetRecord {
    /// Coordinate text was present but could not be split into side and
    /// front/back components.
    pub fn has_unsplit_coordinates(&self) -> bool {
        self.fb_text.is_empty() && !self.raw_coords.is_empty()
    }
}

/// Final per-performer record for one physical page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSheet {
    pub performer_label: String,
    pub performer_name: Option<String>,
    pub printed_page_number: Option<u32>,
    pub sets: Vec<SetRecord>,
    pub physical_pdf_page_index: usize,
}

// ===== RESULT OBJECT =====

/// Which upstream word source the page was reconstructed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSource {
    Text,
    Ocr,
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Text => f.write_str("text"),
            TextSource::Ocr => f.write_str("ocr"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugInfo {
    /// Literal performer markers seen in the reconstructed text
    pub performer_marker_count: usize,
    /// Distinct labels across the emitted sheets
    pub extracted_labels_count: usize,
    pub text_source: TextSource,
}

/// The serialization-ready output for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub sheets: Vec<ExtractedSheet>,
    pub debug: DebugInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}
