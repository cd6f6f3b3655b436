use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::types::PerformerBlock;

/// A pass over the annotated blocks of one page.
pub trait BlockRule {
    fn apply(&self, blocks: Vec<PerformerBlock>, diagnostics: &mut Diagnostics)
        -> Vec<PerformerBlock>;

    fn name(&self) -> &str;
}

/// Trace block summaries after a rule ran
pub fn debug_pipeline_blocks(rule_name: &str, blocks: &[PerformerBlock]) {
    for (index, block) in blocks.iter().enumerate() {
        trace!(
            rule = rule_name,
            index,
            label = block.label.as_deref().unwrap_or("-"),
            page = ?block.printed_page,
            header = block.has_header,
            lines = block.lines.len(),
            "block"
        );
    }
}

/// Runs block rules in sequence.
pub struct RuleEngine<'a> {
    rules: Vec<Box<dyn BlockRule + 'a>>,
}

impl<'a> RuleEngine<'a> {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl BlockRule + 'a) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn apply_rules(
        &self,
        mut blocks: Vec<PerformerBlock>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<PerformerBlock> {
        for rule in &self.rules {
            let before = blocks.len();
            blocks = rule.apply(blocks, diagnostics);
            debug!("{}: {} -> {} blocks", rule.name(), before, blocks.len());
            debug_pipeline_blocks(rule.name(), &blocks);
        }
        blocks
    }
}

impl Default for RuleEngine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

// LabelFilterRule - the label is the sheet's join key downstream, so blocks
// still unlabeled after stitching are dropped
pub struct LabelFilterRule;

impl BlockRule for LabelFilterRule {
    fn apply(
        &self,
        blocks: Vec<PerformerBlock>,
        diagnostics: &mut Diagnostics,
    ) -> Vec<PerformerBlock> {
        blocks
            .into_iter()
            .filter(|block| {
                if block.label.is_some() {
                    return true;
                }
                debug!(
                    "Dropping unlabeled block ({} lines) starting {:?}",
                    block.lines.len(),
                    block.first_line()
                );
                diagnostics.record(Diagnostic::UnlabeledBlock {
                    first_line: block.first_line().map(str::to_string),
                    line_count: block.lines.len(),
                });
                false
            })
            .collect()
    }

    fn name(&self) -> &str {
        "LabelFilter"
    }
}
