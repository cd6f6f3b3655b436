use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ExtractionConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ExtractError, Result};
use crate::layout::{LineAssembler, ReadingOrderReconstructor};
use crate::rules::{
    BlockSegmenter, BlockStitcher, CoordinateNormalizer, LabelFilterRule, MetadataExtractor,
    RegexMetadataExtractor, RowOutcome, RowParser, RuleEngine,
};
use crate::sources::{NativeTextSource, OcrEngine, QuadrantRequest};
use crate::types::*;

/// Captured intermediate outputs from each pipeline stage
/// Used for testing and stage dumps; lets you inspect each boundary
#[derive(Debug, Clone, serde::Serialize)]
pub struct PipelineStages {
    pub text_source: TextSource,
    pub lines: Vec<String>,
    pub raw_blocks: Vec<Vec<String>>,
    /// Stitched and label-filtered blocks
    pub blocks: Vec<PerformerBlock>,
    pub result: ExtractionResult,
}

/// Simple profiler that collects timings for pipeline steps
pub struct StepProfiler {
    enabled: bool,
    timings: Vec<(String, Duration)>,
}

impl StepProfiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            timings: Vec::new(),
        }
    }

    pub fn time_step<F, R>(&mut self, step_name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if !self.enabled {
            return f();
        }

        let start = Instant::now();
        let result = f();
        let elapsed = start.elapsed();

        self.timings.push((step_name.to_string(), elapsed));
        debug!("{}: {:.0}ms", step_name, elapsed.as_millis());

        result
    }

    pub fn timings(&self) -> &[(String, Duration)] {
        &self.timings
    }

    pub fn log_summary(&self, page_index: usize) {
        if !self.enabled || self.timings.is_empty() {
            return;
        }

        let total: Duration = self.timings.iter().map(|(_, d)| *d).sum();
        for (step, duration) in &self.timings {
            let percentage = if total.is_zero() {
                0.0
            } else {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            };
            info!(
                "page {} {:.<30} {:.0}ms ({:.1}%)",
                page_index,
                step,
                duration.as_millis(),
                percentage
            );
        }
        info!("page {} {:.<30} {:.0}ms", page_index, "Total", total.as_millis());
    }
}

/// Runs one physical page through layout, segmentation, stitching and row
/// parsing. Holds no per-page state, so one processor serves any number of
/// pages, concurrently if needed.
pub struct PageProcessor {
    config: ExtractionConfig,
    metadata: Box<dyn MetadataExtractor>,
    row_parser: RowParser,
    normalizer: Option<CoordinateNormalizer>,
    ocr: Option<Arc<dyn OcrEngine>>,
    profiling: bool,
}

impl PageProcessor {
    /// Compile the configured patterns. Fails on an invalid pattern.
    pub fn new(config: ExtractionConfig) -> Result<Self> {
        let metadata = Box::new(RegexMetadataExtractor::from_config(&config)?);
        let row_parser = RowParser::from_config(&config)?;
        let normalizer = config
            .coordinates
            .enabled
            .then(|| CoordinateNormalizer::new(config.coordinates.field));

        Ok(Self {
            config,
            metadata,
            row_parser,
            normalizer,
            ocr: None,
            profiling: false,
        })
    }

    pub fn with_ocr_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    pub fn with_metadata_extractor(mut self, extractor: Box<dyn MetadataExtractor>) -> Self {
        self.metadata = extractor;
        self
    }

    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiling = enabled;
        self
    }

    /// Extract one page of `source`.
    pub fn process_page<S>(&self, source: &S, page_index: usize) -> Result<ExtractionResult>
    where
        S: NativeTextSource + ?Sized,
    {
        Ok(self.process_page_capture_stages(source, page_index)?.result)
    }

    /// Extract every page of `source`. Pages are independent and run in
    /// parallel; results come back in page order.
    pub fn process_pages<S>(&self, source: &S) -> Result<Vec<ExtractionResult>>
    where
        S: NativeTextSource + ?Sized,
    {
        let page_count = source.page_count();
        if page_count == 0 {
            return Err(ExtractError::NoInput);
        }
        info!("Processing {} page(s) from {}", page_count, source.name());

        (0..page_count)
            .into_par_iter()
            .map(|page_index| self.process_page(source, page_index))
            .collect()
    }

    /// Extract one page and keep every intermediate stage.
    pub fn process_page_capture_stages<S>(
        &self,
        source: &S,
        page_index: usize,
    ) -> Result<PipelineStages>
    where
        S: NativeTextSource + ?Sized,
    {
        let page_count = source.page_count();
        if page_count == 0 {
            return Err(ExtractError::NoInput);
        }
        if page_index >= page_count {
            return Err(ExtractError::PageOutOfRange {
                index: page_index,
                page_count,
            });
        }

        let geometry = source.geometry(page_index)?;
        let words = source.words(page_index)?;
        Ok(self.process_words(page_index, &geometry, words))
    }

    /// Run the pipeline on words already pulled from a page.
    pub fn process_words(
        &self,
        page_index: usize,
        geometry: &PageGeometry,
        words: Vec<Word>,
    ) -> PipelineStages {
        let mut profiler = StepProfiler::new(self.profiling);
        let mut diagnostics = Diagnostics::new();

        let text_length: usize = words.iter().map(Word::char_count).sum();
        let text_source = if text_length > self.config.min_text_length_threshold {
            TextSource::Text
        } else {
            TextSource::Ocr
        };
        debug!(
            "Page {}: {} native chars (threshold {}), using {}",
            page_index, text_length, self.config.min_text_length_threshold, text_source
        );

        let lines = match text_source {
            TextSource::Text => {
                profiler.time_step("Native layout", || self.native_lines(geometry, words))
            }
            TextSource::Ocr => profiler.time_step("OCR layout", || {
                self.ocr_lines(page_index, geometry, &mut diagnostics)
            }),
        };

        let raw_blocks = profiler.time_step("Segmentation", || {
            BlockSegmenter::new(&self.config).segment(&lines)
        });

        let blocks = profiler.time_step("Stitching", || {
            debug!(
                "Annotating {} blocks with {}",
                raw_blocks.len(),
                self.metadata.name()
            );
            let annotated = raw_blocks
                .iter()
                .cloned()
                .map(|block| self.metadata.annotate(block))
                .collect();
            RuleEngine::new()
                .with_rule(BlockStitcher::new(&self.config, &self.row_parser))
                .with_rule(LabelFilterRule)
                .apply_rules(annotated, &mut diagnostics)
        });

        let sheets: Vec<ExtractedSheet> = profiler.time_step("Row parsing", || {
            blocks
                .iter()
                .filter_map(|block| self.build_sheet(page_index, block, &mut diagnostics))
                .collect()
        });

        let debug = self.debug_info(&lines, &sheets, text_source);
        info!(
            "Page {}: {} lines, {} blocks, {} sheets, {} diagnostics ({})",
            page_index,
            lines.len(),
            raw_blocks.len(),
            sheets.len(),
            diagnostics.entries().len(),
            text_source
        );
        profiler.log_summary(page_index);

        PipelineStages {
            text_source,
            lines,
            raw_blocks,
            blocks,
            result: ExtractionResult {
                sheets,
                debug,
                diagnostics: diagnostics.into_vec(),
            },
        }
    }

    fn reconstructor(&self) -> ReadingOrderReconstructor {
        ReadingOrderReconstructor::new(self.config.y_tolerance)
    }

    fn assembler(&self) -> LineAssembler {
        LineAssembler::new(self.config.y_tolerance)
    }

    fn native_lines(&self, geometry: &PageGeometry, words: Vec<Word>) -> Vec<String> {
        let ordered = self.reconstructor().reconstruct(geometry, words);
        self.assembler().assemble(&ordered)
    }

    /// OCR each quadrant and concatenate the per-quadrant lines in fixed
    /// order. A failed quadrant contributes nothing.
    fn ocr_lines(
        &self,
        page_index: usize,
        geometry: &PageGeometry,
        diagnostics: &mut Diagnostics,
    ) -> Vec<String> {
        let Some(engine) = self.ocr.as_deref() else {
            warn!("Page {}: native text too short and no OCR engine configured", page_index);
            for quadrant in Quadrant::ALL {
                diagnostics.record(Diagnostic::CollaboratorFailure {
                    quadrant,
                    message: "no OCR engine configured".to_string(),
                });
            }
            return Vec::new();
        };

        let recognize =
            |quadrant: &Quadrant| self.quadrant_lines(engine, page_index, geometry, *quadrant);
        let outcomes: Vec<anyhow::Result<Vec<String>>> = if self.config.parallel_quadrants {
            Quadrant::ALL.par_iter().map(recognize).collect()
        } else {
            Quadrant::ALL.iter().map(recognize).collect()
        };

        let mut lines = Vec::new();
        for (quadrant, outcome) in Quadrant::ALL.into_iter().zip(outcomes) {
            match outcome {
                Ok(quadrant_lines) => {
                    debug!(
                        "Page {} {}: {} OCR lines",
                        page_index,
                        quadrant,
                        quadrant_lines.len()
                    );
                    lines.extend(quadrant_lines);
                }
                Err(e) => {
                    warn!(
                        "Page {} {}: OCR via {} failed: {:#}",
                        page_index,
                        quadrant,
                        engine.name(),
                        e
                    );
                    diagnostics.record(Diagnostic::CollaboratorFailure {
                        quadrant,
                        message: format!("{e:#}"),
                    });
                }
            }
        }
        lines
    }

    fn quadrant_lines(
        &self,
        engine: &dyn OcrEngine,
        page_index: usize,
        geometry: &PageGeometry,
        quadrant: Quadrant,
    ) -> anyhow::Result<Vec<String>> {
        let request = QuadrantRequest::new(page_index, quadrant, geometry, self.config.ocr_dpi);
        let words: Vec<Word> = engine
            .recognize(&request)?
            .into_iter()
            .map(OcrDetection::into_word)
            .collect();
        let ordered = self.reconstructor().sort_quadrant(words);
        Ok(self.assembler().assemble(&ordered))
    }

    fn build_sheet(
        &self,
        page_index: usize,
        block: &PerformerBlock,
        diagnostics: &mut Diagnostics,
    ) -> Option<ExtractedSheet> {
        let label = block.label.clone()?;
        let mut sets = Vec::new();

        for line in &block.lines {
            match self.row_parser.parse(line) {
                RowOutcome::Row(mut record) => {
                    if record.has_unsplit_coordinates() {
                        diagnostics.record(Diagnostic::SplitAmbiguity {
                            set_id: record.set_id.clone(),
                            raw_coords: record.raw_coords.clone(),
                        });
                    }
                    if let Some(normalizer) = &self.normalizer {
                        record.position = normalizer.normalize(&record);
                    }
                    sets.push(record);
                }
                RowOutcome::NotARow => {}
                RowOutcome::Malformed { set_id, reason } => {
                    debug!("Skipping set {} row {:?}: {}", set_id, line, reason);
                    diagnostics.record(Diagnostic::RowParseFailure {
                        line: line.clone(),
                        reason,
                    });
                }
            }
        }

        Some(ExtractedSheet {
            performer_label: label,
            performer_name: block.name.clone(),
            printed_page_number: block.printed_page,
            sets,
            physical_pdf_page_index: page_index,
        })
    }

    fn debug_info(
        &self,
        lines: &[String],
        sheets: &[ExtractedSheet],
        text_source: TextSource,
    ) -> DebugInfo {
        let performer_marker_count = lines
            .join("\n")
            .matches(self.config.markers.performer.as_str())
            .count();
        let labels: BTreeSet<&str> = sheets
            .iter()
            .map(|sheet| sheet.performer_label.as_str())
            .collect();

        DebugInfo {
            performer_marker_count,
            extracted_labels_count: labels.len(),
            text_source,
        }
    }
}
