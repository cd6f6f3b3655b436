// Block-level rules - each stage of turning page lines into sheets lives in
// its own sub-module:
// - segmentation.rs: split lines into raw performer blocks
// - metadata.rs: label / name / page / header heuristics
// - engine.rs: BlockRule trait, RuleEngine and the label filter
// - stitching.rs: page-break and headerless continuation merges
// - row_parser.rs: set rows out of block lines
// - coordinates.rs: optional step-offset resolution

pub mod coordinates;
pub mod engine;
pub mod metadata;
pub mod row_parser;
pub mod segmentation;
pub mod stitching;

pub use coordinates::CoordinateNormalizer;
pub use engine::*;
pub use metadata::{MetadataExtractor, PatternMatcher, RegexMetadataExtractor};
pub use row_parser::{RowOutcome, RowParser};
pub use segmentation::BlockSegmenter;
pub use stitching::BlockStitcher;
