use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{NativeTextSource, OcrEngine, QuadrantRequest};
use crate::error::{ExtractError, Result};
use crate::types::{OcrDetection, PageGeometry, Quadrant, Word};

/// Serialized form of a recorded document.
///
/// ```json
/// {"pages": [{"width": 612, "height": 792,
///             "words": [{"x0": 72, "y0": 90, "x1": 130, "y1": 102, "text": "Performer:"}],
///             "ocr": {"top_left": [{"quad": [[0,0],[9,0],[9,9],[0,9]], "text": "1", "confidence": 0.9}]}}]}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDump {
    pub pages: Vec<DumpPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DumpPage {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub words: Vec<Word>,
    /// Recorded recognizer output per quadrant; absent when the page was
    /// never run through OCR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr: Option<QuadrantDetections>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadrantDetections {
    #[serde(default)]
    pub top_left: Vec<OcrDetection>,
    #[serde(default)]
    pub top_right: Vec<OcrDetection>,
    #[serde(default)]
    pub bottom_left: Vec<OcrDetection>,
    #[serde(default)]
    pub bottom_right: Vec<OcrDetection>,
}

impl QuadrantDetections {
    pub fn get(&self, quadrant: Quadrant) -> &[OcrDetection] {
        match quadrant {
            Quadrant::TopLeft => &self.top_left,
            Quadrant::TopRight => &self.top_right,
            Quadrant::BottomLeft => &self.bottom_left,
            Quadrant::BottomRight => &self.bottom_right,
        }
    }
}

/// Replays a [`PageDump`] as both the native text layer and the OCR engine.
#[derive(Debug, Clone)]
pub struct JsonPageDump {
    name: String,
    dump: PageDump,
}

impl JsonPageDump {
    pub fn new(name: impl Into<String>, dump: PageDump) -> Result<Self> {
        if dump.pages.is_empty() {
            return Err(ExtractError::NoInput);
        }
        Ok(Self {
            name: name.into(),
            dump,
        })
    }

    pub fn from_json_str(name: &str, content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Err(ExtractError::NoInput);
        }
        let dump: PageDump = serde_json::from_str(content)
            .map_err(|source| ExtractError::InvalidPageDump { source })?;
        debug!("Loaded {} page(s) from {}", dump.pages.len(), name);
        Self::new(name, dump)
    }

    pub fn from_reader<R: Read>(name: &str, mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(|source| ExtractError::Io {
                path: name.to_string(),
                source,
            })?;
        Self::from_json_str(name, &content)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ExtractError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_json_str(&display, &content)
    }

    pub fn page(&self, page_index: usize) -> Result<&DumpPage> {
        self.dump
            .pages
            .get(page_index)
            .ok_or(ExtractError::PageOutOfRange {
                index: page_index,
                page_count: self.dump.pages.len(),
            })
    }
}

impl NativeTextSource for JsonPageDump {
    fn page_count(&self) -> usize {
        self.dump.pages.len()
    }

    fn geometry(&self, page_index: usize) -> Result<PageGeometry> {
        let page = self.page(page_index)?;
        Ok(PageGeometry::new(page.width, page.height))
    }

    fn words(&self, page_index: usize) -> Result<Vec<Word>> {
        let page = self.page(page_index)?;
        Ok(page.words.iter().cloned().map(Word::normalized).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl OcrEngine for JsonPageDump {
    fn recognize(&self, request: &QuadrantRequest) -> anyhow::Result<Vec<OcrDetection>> {
        let page = self.page(request.page_index)?;
        let Some(ocr) = &page.ocr else {
            anyhow::bail!(
                "no OCR output recorded for page {} in {}",
                request.page_index,
                self.name
            );
        };
        Ok(ocr.get(request.quadrant).to_vec())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
