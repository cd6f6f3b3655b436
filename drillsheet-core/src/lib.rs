// Drillsheet Core Library
//
// Reconstructs per-performer coordinate sheets from the positioned words of a
// drill chart page. Document decoding and OCR sit behind the traits in
// `sources`; everything from reading order to set rows lives here.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod processor;
pub mod rules;
pub mod serialization;
pub mod sources;
pub mod types;

// Re-export main types and functions for easy use
pub use config::ExtractionConfig;
pub use diagnostics::{Diagnostic, Diagnostics, MergeRule};
pub use error::{ExtractError, Result};
pub use processor::{PageProcessor, PipelineStages};
pub use serialization::{pages_to_json, FlatSetRow, OutputFormat};
pub use sources::{JsonPageDump, NativeTextSource, OcrEngine, QuadrantRequest};
pub use types::*;
