use crate::types::Word;

/// Groups an already ordered word sequence into text lines.
///
/// Uses the same tolerance rule as the per-quadrant sort, but keeps the input
/// order inside each line: the sequence is expected to come out of
/// [`super::ReadingOrderReconstructor`].
pub struct LineAssembler {
    y_tolerance: f32,
}

impl LineAssembler {
    pub fn new(y_tolerance: f32) -> Self {
        Self { y_tolerance }
    }

    /// Split the sequence into runs of words sharing a line.
    pub fn group<'a>(&self, words: &'a [Word]) -> Vec<Vec<&'a Word>> {
        let mut lines = Vec::new();
        let Some(first) = words.first() else {
            return lines;
        };

        let mut reference_y = first.y0;
        let mut current: Vec<&Word> = Vec::new();

        for word in words {
            if (word.y0 - reference_y).abs() > self.y_tolerance {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                reference_y = word.y0;
            }
            current.push(word);
        }

        if !current.is_empty() {
            lines.push(current);
        }

        lines
    }

    /// Space-joined text of each line.
    pub fn assemble(&self, words: &[Word]) -> Vec<String> {
        self.group(words)
            .into_iter()
            .map(|line| {
                line.iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}
