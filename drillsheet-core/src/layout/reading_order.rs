//! Quadrant-first reading order.
//!
//! Printed coordinate sheets are usually laid out four-up: one performer per
//! page quadrant. A single global top-to-bottom, left-to-right sort would
//! interleave rows from performers that sit side by side, so words are first
//! split by quadrant and only then sorted line-major, column-minor.

use crate::types::{PageGeometry, Quadrant, Word};

pub struct ReadingOrderReconstructor {
    y_tolerance: f32,
}

impl ReadingOrderReconstructor {
    pub fn new(y_tolerance: f32) -> Self {
        Self { y_tolerance }
    }

    /// Order all words of a page. The output is a permutation of the input.
    pub fn reconstruct(&self, geometry: &PageGeometry, words: Vec<Word>) -> Vec<Word> {
        let mut ordered = Vec::with_capacity(words.len());
        for quadrant_words in self.partition(geometry, words) {
            ordered.extend(self.sort_quadrant(quadrant_words));
        }
        ordered
    }

    /// Split words into quadrants, indexed in [`Quadrant::ALL`] order.
    pub fn partition(&self, geometry: &PageGeometry, words: Vec<Word>) -> [Vec<Word>; 4] {
        let mut quadrants: [Vec<Word>; 4] = Default::default();
        for word in words {
            let quadrant = Quadrant::of_word(&word, geometry);
            quadrants[quadrant.index()].push(word);
        }
        quadrants
    }

    /// Sort one quadrant's words by top edge, cluster them into lines within
    /// the tolerance, and sort each line left to right.
    pub fn sort_quadrant(&self, mut words: Vec<Word>) -> Vec<Word> {
        words.sort_by(|a, b| a.y0.total_cmp(&b.y0));

        let mut reference_y = match words.first() {
            Some(word) => word.y0,
            None => return words,
        };

        let mut ordered = Vec::with_capacity(words.len());
        let mut line: Vec<Word> = Vec::new();

        for word in words {
            if (word.y0 - reference_y).abs() > self.y_tolerance {
                flush_line(&mut line, &mut ordered);
                reference_y = word.y0;
            }
            line.push(word);
        }
        flush_line(&mut line, &mut ordered);

        ordered
    }
}

fn flush_line(line: &mut Vec<Word>, ordered: &mut Vec<Word>) {
    line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    ordered.append(line);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(x: f32, y: f32, text: &str) -> Word {
        Word::new(x, y, x + 20.0, y + 8.0, text)
    }

    fn texts(words: &[Word]) -> Vec<&str> {
        words.iter().map(|w| w.text.as_str()).collect()
    }

    #[test]
    fn test_empty_page() {
        let reconstructor = ReadingOrderReconstructor::new(3.0);
        let ordered = reconstructor.reconstruct(&PageGeometry::new(600.0, 800.0), Vec::new());
        assert!(ordered.is_empty());
    }

    #[test]
    fn test_quadrants_never_interleave() {
        let page = PageGeometry::new(600.0, 800.0);
        // Two performers side by side; rows share the same y across columns.
        let words = vec![
            word(350.0, 100.0, "B1"),
            word(50.0, 100.0, "A1"),
            word(350.0, 120.0, "B2"),
            word(50.0, 120.0, "A2"),
            word(50.0, 500.0, "C1"),
            word(350.0, 500.0, "D1"),
        ];

        let ordered = ReadingOrderReconstructor::new(3.0).reconstruct(&page, words);
        assert_eq!(texts(&ordered), vec!["A1", "A2", "B1", "B2", "C1", "D1"]);
    }

    #[test]
    fn test_words_within_tolerance_sorted_left_to_right() {
        let reconstructor = ReadingOrderReconstructor::new(3.0);
        let words = vec![
            word(120.0, 11.5, "16"),
            word(10.0, 10.0, "1"),
            word(60.0, 12.0, "1"),
            word(10.0, 30.0, "2"),
        ];

        let ordered = reconstructor.sort_quadrant(words);
        assert_eq!(texts(&ordered), vec!["1", "1", "16", "2"]);
        assert_eq!(ordered[1].x0, 60.0);
    }

    #[test]
    fn test_line_reference_is_first_word_of_cluster() {
        // 10 -> 12.5 -> 15: the third word is 5 away from the reference (10),
        // so it starts a new line even though it's close to its neighbour.
        let reconstructor = ReadingOrderReconstructor::new(3.0);
        let words = vec![
            word(50.0, 15.0, "c"),
            word(30.0, 12.5, "b"),
            word(90.0, 10.0, "a"),
        ];

        let ordered = reconstructor.sort_quadrant(words);
        assert_eq!(texts(&ordered), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_output_is_permutation_of_input() {
        let page = PageGeometry::new(612.0, 792.0);
        let mut words = Vec::new();
        for i in 0..60 {
            let x = ((i * 37) % 600) as f32;
            let y = ((i * 53) % 780) as f32;
            words.push(word(x, y, &format!("w{i}")));
        }

        let ordered = ReadingOrderReconstructor::new(3.0).reconstruct(&page, words.clone());
        assert_eq!(ordered.len(), words.len());

        let mut expected: Vec<String> = words.iter().map(|w| w.text.clone()).collect();
        let mut actual: Vec<String> = ordered.iter().map(|w| w.text.clone()).collect();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);

        // Quadrant indices must be non-decreasing along the output.
        let indices: Vec<usize> = ordered
            .iter()
            .map(|w| Quadrant::of_word(w, &page).index())
            .collect();
        assert!(indices.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}
