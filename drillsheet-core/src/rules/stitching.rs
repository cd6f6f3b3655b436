use std::collections::VecDeque;

use tracing::debug;

use super::engine::BlockRule;
use super::row_parser::RowParser;
use crate::config::{ExtractionConfig, PagePolicy};
use crate::diagnostics::{Diagnostic, Diagnostics, MergeRule};
use crate::types::PerformerBlock;

// BlockStitcher - reassembles one logical sheet per performer from blocks
// split across page breaks or continued without a repeated header
pub struct BlockStitcher<'a> {
    config: &'a ExtractionConfig,
    row_parser: &'a RowParser,
}

impl<'a> BlockStitcher<'a> {
    pub fn new(config: &'a ExtractionConfig, row_parser: &'a RowParser) -> Self {
        Self { config, row_parser }
    }

    /// Merge blocks front to back. The head of the queue keeps absorbing its
    /// successor until no rule applies, then it is emitted. Every merge pops
    /// one block off the queue, so the loop is bounded by the input length.
    pub fn stitch(
        &self,
        blocks: Vec<PerformerBlock>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<PerformerBlock> {
        let mut queue: VecDeque<PerformerBlock> = blocks.into();
        let mut stitched = Vec::with_capacity(queue.len());

        while let Some(mut current) = queue.pop_front() {
            loop {
                let rule = match queue.front() {
                    Some(next) => self.merge_rule(&current, next),
                    None => None,
                };
                let Some(rule) = rule else {
                    break;
                };
                let Some(next) = queue.pop_front() else {
                    break;
                };
                self.merge(&mut current, next, rule, diagnostics);
            }
            stitched.push(current);
        }

        stitched
    }

    /// Which rule, if any, says `next` continues `current`.
    pub fn merge_rule(&self, current: &PerformerBlock, next: &PerformerBlock) -> Option<MergeRule> {
        let stitching = &self.config.stitching;

        if stitching.enable_page_continuity && is_page_continuation(current, next) {
            return Some(MergeRule::PageContinuity);
        }

        if stitching.enable_headerless_continuation && self.is_headerless_continuation(current, next)
        {
            return Some(MergeRule::HeaderlessContinuation);
        }

        None
    }

    fn is_headerless_continuation(&self, current: &PerformerBlock, next: &PerformerBlock) -> bool {
        if next.has_header {
            return false;
        }
        let starts_with_row = next
            .first_line()
            .is_some_and(|line| self.row_parser.is_row_start(line));
        if !starts_with_row {
            return false;
        }

        match (&current.label, &next.label) {
            (Some(a), Some(b)) => a == b,
            (None, Some(_)) => false,
            (_, None) => true,
        }
    }

    fn merge(
        &self,
        current: &mut PerformerBlock,
        next: PerformerBlock,
        rule: MergeRule,
        diagnostics: &mut Diagnostics,
    ) {
        debug!(
            "Merging blocks ({:?}): {} p{:?} <- {} p{:?}",
            rule,
            current.label.as_deref().unwrap_or("-"),
            current.printed_page,
            next.label.as_deref().unwrap_or("-"),
            next.printed_page
        );

        let merged_lines = next.lines.len();
        current.lines.extend(next.lines);

        if current.label.is_none() {
            current.label = next.label;
        }
        if current.name.is_none() {
            current.name = next.name;
        }
        current.printed_page = match self.config.stitching.page_policy {
            PagePolicy::KeepEarliest => current.printed_page.or(next.printed_page),
            PagePolicy::KeepLatest => next.printed_page.or(current.printed_page),
        };
        current.has_header |= next.has_header;

        diagnostics.record(Diagnostic::BlocksMerged {
            rule,
            label: current.label.clone(),
            merged_lines,
        });
    }
}

/// Same non-null label on consecutive printed pages.
fn is_page_continuation(current: &PerformerBlock, next: &PerformerBlock) -> bool {
    match (
        &current.label,
        &next.label,
        current.printed_page,
        next.printed_page,
    ) {
        (Some(a), Some(b), Some(page), Some(next_page)) => {
            a == b && page.checked_add(1) == Some(next_page)
        }
        _ => false,
    }
}

impl BlockRule for BlockStitcher<'_> {
    fn apply(
        &self,
        blocks: Vec<PerformerBlock>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<PerformerBlock> {
        self.stitch(blocks, diagnostics)
    }

    fn name(&self) -> &str {
        "BlockStitcher"
    }
}
