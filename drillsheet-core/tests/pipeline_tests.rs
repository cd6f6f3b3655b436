//! Pipeline boundary tests.
//!
//! These tests replay the recorded page dump in `test_fixtures/pages/` and
//! assert properties at the pipeline boundaries:
//!
//! - Boundary 1 (layout): text source choice, line order across quadrants
//! - Boundary 2 (output): the JSON contract consumed by the desktop importer
//!
//! Page 0 carries a native text layer, page 1 only recorded OCR output and
//! page 2 neither.

use std::path::PathBuf;
use std::sync::Arc;

use drillsheet_core::{
    pages_to_json, Diagnostic, ExtractError, ExtractionConfig, ExtractionResult, JsonPageDump,
    MergeRule, OutputFormat, PageProcessor, Quadrant, TextSource,
};
use serde_json::Value;

// ============================================================================
// Fixture helpers
// ============================================================================

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_fixtures/pages")
}

fn load_dump() -> Arc<JsonPageDump> {
    let path = fixtures_dir().join("drill_chart.json");
    Arc::new(
        JsonPageDump::from_path(&path)
            .unwrap_or_else(|e| panic!("Missing fixture {}: {}", path.display(), e)),
    )
}

fn processor_with(config: ExtractionConfig) -> (PageProcessor, Arc<JsonPageDump>) {
    let dump = load_dump();
    let processor = PageProcessor::new(config)
        .expect("default patterns compile")
        .with_ocr_engine(dump.clone());
    (processor, dump)
}

fn processor() -> (PageProcessor, Arc<JsonPageDump>) {
    processor_with(ExtractionConfig::default())
}

fn result_json(result: &ExtractionResult) -> Value {
    let json = result
        .to_json_with_format(OutputFormat::Result)
        .expect("result serializes");
    serde_json::from_str(&json).expect("valid JSON")
}

fn set_ids(sheet: &Value) -> Vec<&str> {
    sheet["sets"]
        .as_array()
        .map(|sets| sets.iter().filter_map(|s| s["set_id"].as_str()).collect())
        .unwrap_or_default()
}

// ============================================================================
// Boundary 1: layout
// ============================================================================

mod layout_boundary {
    use super::*;

    #[test]
    fn text_layer_lines_follow_quadrant_order() {
        let (processor, dump) = processor();
        let stages = processor
            .process_page_capture_stages(dump.as_ref(), 0)
            .unwrap();

        assert_eq!(stages.text_source, TextSource::Text);
        assert_eq!(stages.lines.len(), 16);
        assert_eq!(stages.lines[0], "Performer: Jane Doe Label: A3 ID: 17");
        assert_eq!(stages.lines[4], "Printed: 09/01/2026 Page 1 of 2");
        assert_eq!(stages.lines[5], "Performer: Jane Doe Label: A3 ID: 17");
        assert_eq!(stages.lines[9], "Performer: Sam Lee Label: B1");
        assert_eq!(stages.lines[14], "3 5-8 8 Side 2: On 30 yd ln On Back Hash");
    }

    #[test]
    fn ocr_detections_on_one_row_join_into_one_line() {
        let (processor, dump) = processor();
        let stages = processor
            .process_page_capture_stages(dump.as_ref(), 1)
            .unwrap();

        assert_eq!(stages.text_source, TextSource::Ocr);
        assert_eq!(
            stages.lines,
            vec![
                "Performer: Ana Ruiz Label: C2",
                "Set Measure Counts Side 1-Side 2 Front-Back",
                "1 0 Side 1: 2 steps Outside 20 yd ln On Front side line",
                "2 16 Side 1: On 15 yd ln 8.0 steps behind Front Hash",
                "Printed: 09/01/2026 Page 1 of 1",
            ]
        );
    }

    #[test]
    fn threshold_override_forces_ocr() {
        let mut config = ExtractionConfig::default();
        config.min_text_length_threshold = 10_000;
        let (processor, dump) = processor_with(config);

        // Page 0 has no recorded OCR, so every quadrant fails
        let result = processor.process_page(dump.as_ref(), 0).unwrap();
        assert_eq!(result.debug.text_source, TextSource::Ocr);
        assert!(result.sheets.is_empty());
        assert_eq!(result.diagnostics.len(), 4);
    }
}

// ============================================================================
// Boundary 2: output contract
// ============================================================================

mod output_boundary {
    use super::*;

    #[test]
    fn stitched_sheets_from_text_layer() {
        let (processor, dump) = processor();
        let result = processor.process_page(dump.as_ref(), 0).unwrap();
        let json = result_json(&result);

        let sheets = json["sheets"].as_array().unwrap();
        assert_eq!(sheets.len(), 2);

        // Continued on the next printed page: one sheet, earliest page kept
        assert_eq!(sheets[0]["performer_label"], "A3");
        assert_eq!(sheets[0]["performer_name"], "Jane Doe");
        assert_eq!(sheets[0]["printed_page_number"], 1);
        assert_eq!(set_ids(&sheets[0]), vec!["1", "2", "3"]);

        // Header-less continuation absorbed, page backfilled
        assert_eq!(sheets[1]["performer_label"], "B1");
        assert_eq!(sheets[1]["printed_page_number"], 1);
        assert_eq!(set_ids(&sheets[1]), vec!["1", "2A", "3"]);

        for sheet in sheets {
            assert_eq!(sheet["physical_pdf_page_index"], 0);
        }

        assert_eq!(json["debug"]["performer_marker_count"], 3);
        assert_eq!(json["debug"]["extracted_labels_count"], 2);
        assert_eq!(json["debug"]["text_source"], "text");
    }

    #[test]
    fn set_fields_match_importer_keys() {
        let (processor, dump) = processor();
        let json = result_json(&processor.process_page(dump.as_ref(), 0).unwrap());

        let set = &json["sheets"][0]["sets"][1];
        assert_eq!(set["set_id"], "2");
        assert_eq!(set["measure_range"], "1-16");
        assert_eq!(set["counts"], 16);
        assert_eq!(set["side_text"], "Side 1: 4 steps Inside 45 yd ln");
        assert_eq!(set["fb_text"], "2.0 steps behind Front Hash");
        assert_eq!(
            set["raw_coords"],
            "Side 1: 4 steps Inside 45 yd ln 2.0 steps behind Front Hash"
        );
        assert!(set.get("position").is_none());

        let unsplit = &json["sheets"][1]["sets"][1];
        assert_eq!(unsplit["counts"], Value::Null);
        assert_eq!(unsplit["side_text"], "Side 2 45");
        assert_eq!(unsplit["fb_text"], "");
    }

    #[test]
    fn merges_and_ambiguities_are_reported() {
        let (processor, dump) = processor();
        let result = processor.process_page(dump.as_ref(), 0).unwrap();

        assert_eq!(
            result.diagnostics,
            vec![
                Diagnostic::BlocksMerged {
                    rule: MergeRule::PageContinuity,
                    label: Some("A3".to_string()),
                    merged_lines: 4,
                },
                Diagnostic::BlocksMerged {
                    rule: MergeRule::HeaderlessContinuation,
                    label: Some("B1".to_string()),
                    merged_lines: 2,
                },
                Diagnostic::SplitAmbiguity {
                    set_id: "2A".to_string(),
                    raw_coords: "Side 2 45".to_string(),
                },
            ]
        );

        let json = result_json(&result);
        assert_eq!(json["diagnostics"][0]["kind"], "blocks_merged");
        assert_eq!(json["diagnostics"][0]["rule"], "page_continuity");
    }

    #[test]
    fn ocr_page_output() {
        let (processor, dump) = processor();
        let json = result_json(&processor.process_page(dump.as_ref(), 1).unwrap());

        assert_eq!(json["debug"]["text_source"], "ocr");
        assert_eq!(json["debug"]["performer_marker_count"], 1);
        let sheet = &json["sheets"][0];
        assert_eq!(sheet["performer_label"], "C2");
        assert_eq!(sheet["performer_name"], "Ana Ruiz");
        assert_eq!(sheet["physical_pdf_page_index"], 1);
        assert_eq!(set_ids(sheet), vec!["1", "2"]);
        assert!(json.get("diagnostics").is_none());
    }

    #[test]
    fn page_without_any_text_reports_collaborator_failures() {
        let (processor, dump) = processor();
        let result = processor.process_page(dump.as_ref(), 2).unwrap();

        assert!(result.sheets.is_empty());
        let quadrants: Vec<Quadrant> = result
            .diagnostics
            .iter()
            .filter_map(|d| match d {
                Diagnostic::CollaboratorFailure { quadrant, .. } => Some(*quadrant),
                _ => None,
            })
            .collect();
        assert_eq!(quadrants, Quadrant::ALL.to_vec());
    }

    #[test]
    fn coordinates_resolved_when_enabled() {
        let mut config = ExtractionConfig::default();
        config.coordinates.enabled = true;
        let (processor, dump) = processor_with(config);
        let json = result_json(&processor.process_page(dump.as_ref(), 1).unwrap());

        let sets = &json["sheets"][0]["sets"];
        assert_eq!(sets[0]["position"]["x_steps"], -50.0);
        assert_eq!(sets[0]["position"]["y_steps"], 0.0);
        assert_eq!(sets[1]["position"]["x_steps"], -56.0);
        assert_eq!(sets[1]["position"]["y_steps"], -36.0);
    }

    #[test]
    fn all_pages_in_page_order() {
        let (processor, dump) = processor();
        let results = processor.process_pages(dump.as_ref()).unwrap();
        assert_eq!(results.len(), 3);

        let json: Value =
            serde_json::from_str(&pages_to_json(&results, OutputFormat::Result).unwrap()).unwrap();
        let pages = json.as_array().unwrap();
        assert_eq!(pages[0]["debug"]["text_source"], "text");
        assert_eq!(pages[1]["sheets"][0]["physical_pdf_page_index"], 1);
        assert_eq!(pages[2]["sheets"].as_array().map(Vec::len), Some(0));

        let flat: Value =
            serde_json::from_str(&pages_to_json(&results, OutputFormat::Flat).unwrap()).unwrap();
        // 3 + 3 sets on page 0, 2 on page 1
        assert_eq!(flat.as_array().map(Vec::len), Some(8));
        assert_eq!(flat[6]["performer_label"], "C2");
    }
}

// ============================================================================
// Input errors
// ============================================================================

mod input_errors {
    use super::*;

    #[test]
    fn page_index_out_of_range() {
        let (processor, dump) = processor();
        let err = processor.process_page(dump.as_ref(), 7).unwrap_err();
        assert!(matches!(err, ExtractError::PageOutOfRange { index: 7, page_count: 3 }));
        assert_eq!(err.to_string(), "Page index 7 out of range");
    }

    #[test]
    fn empty_dump_is_no_input() {
        let err = JsonPageDump::from_json_str("stdin", "").unwrap_err();
        assert_eq!(err.to_string(), "No page data provided");
    }

    #[test]
    fn invalid_pattern_rejected_at_construction() {
        let mut config = ExtractionConfig::default();
        config.patterns.row_start = "^(\\d+".to_string();
        assert!(matches!(
            PageProcessor::new(config),
            Err(ExtractError::Pattern { .. })
        ));
    }
}
