use crate::config::ExtractionConfig;

// BlockSegmenter - splits page lines into raw performer blocks on the
// performer marker (opens a block) and the footer marker (closes one)
pub struct BlockSegmenter<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> BlockSegmenter<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    /// Every line lands in exactly one block; none are dropped.
    pub fn segment(&self, lines: &[String]) -> Vec<Vec<String>> {
        let performer = self.config.markers.performer.as_str();
        let footer = self.config.markers.footer.as_str();

        let mut blocks = Vec::new();
        let mut current: Vec<String> = Vec::new();

        for line in lines {
            if line.contains(performer) && !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }

            current.push(line.clone());

            if line.contains(footer) {
                blocks.push(std::mem::take(&mut current));
            }
        }

        if !current.is_empty() {
            blocks.push(current);
        }

        blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_two_performer_blocks_with_footers() {
        let config = ExtractionConfig::default();
        let blocks = BlockSegmenter::new(&config).segment(&lines(&[
            "Performer: Jane Doe Label: A3",
            "1 0 Side 1: On 50 yd ln On Front Hash",
            "Printed: 09/01/2026 Page 1 of 2",
            "Performer: Sam Lee Label: B1",
            "1 0 Side 2: On 45 yd ln On Back Hash",
            "Printed: 09/01/2026 Page 1 of 2",
        ]));

        assert_eq!(blocks.len(), 2);
        for block in &blocks {
            assert!(block.first().unwrap().contains("Performer:"));
            assert!(block.last().unwrap().contains("Printed:"));
            assert_eq!(block.len(), 3);
        }
    }

    #[test]
    fn test_performer_marker_closes_open_block() {
        let config = ExtractionConfig::default();
        let blocks = BlockSegmenter::new(&config).segment(&lines(&[
            "Performer: A Label: A1",
            "1 8 Side 1 On 50 yd ln",
            "Performer: B Label: B1",
            "1 8 Side 2 On 50 yd ln",
        ]));

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0][0], "Performer: A Label: A1");
        assert_eq!(blocks[1][0], "Performer: B Label: B1");
    }

    #[test]
    fn test_leading_and_trailing_lines_kept() {
        let config = ExtractionConfig::default();
        let input = lines(&[
            "2 8 Side 1 On 45 yd ln",
            "Printed: 09/01/2026",
            "3 8 Side 1 On 40 yd ln",
        ]);
        let blocks = BlockSegmenter::new(&config).segment(&input);

        assert_eq!(blocks, vec![input[..2].to_vec(), input[2..].to_vec()]);
        let total: usize = blocks.iter().map(Vec::len).sum();
        assert_eq!(total, input.len());
    }

    #[test]
    fn test_no_lines() {
        let config = ExtractionConfig::default();
        assert!(BlockSegmenter::new(&config).segment(&[]).is_empty());
    }
}
