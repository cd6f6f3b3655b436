//! Page Sources
//!
//! The pipeline never decodes documents itself. It reads native words and
//! page geometry through [`NativeTextSource`] and asks an [`OcrEngine`] for
//! quadrant recognition when the native text layer is too thin.
//!
//! ```text
//! Document ──► NativeTextSource ──► words ─┐
//!                                          ├──► PageProcessor
//!   quadrant clip ──► OcrEngine ──► detections ─┘
//! ```
//!
//! ## Available Sources
//!
//! - [`JsonPageDump`] - replays words and OCR detections recorded as JSON

pub mod dump;

pub use dump::{DumpPage, JsonPageDump, PageDump, QuadrantDetections};

use crate::error::Result;
use crate::types::{OcrDetection, PageGeometry, Quadrant, Rect, Word};

/// Native text layer of a multi-page document.
pub trait NativeTextSource: Send + Sync {
    fn page_count(&self) -> usize;

    /// Page size in the same units as the word boxes
    fn geometry(&self, page_index: usize) -> Result<PageGeometry>;

    /// Words with exact boxes and no confidence, in any order
    fn words(&self, page_index: usize) -> Result<Vec<Word>>;

    /// Source name for logging
    fn name(&self) -> &str;
}

/// One OCR call: render `clip` of the page at `dpi` and recognize it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadrantRequest {
    pub page_index: usize,
    pub quadrant: Quadrant,
    pub clip: Rect,
    pub dpi: u32,
}

impl QuadrantRequest {
    pub fn new(page_index: usize, quadrant: Quadrant, geometry: &PageGeometry, dpi: u32) -> Self {
        Self {
            page_index,
            quadrant,
            clip: quadrant.clip(geometry),
            dpi,
        }
    }
}

/// Recognizes text in a page region.
///
/// Called concurrently for the four quadrants of a page, hence `Send + Sync`.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, request: &QuadrantRequest) -> anyhow::Result<Vec<OcrDetection>>;

    /// Engine name for logging
    fn name(&self) -> &str;
}
