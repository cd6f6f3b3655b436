//! Resolves printed coordinate text into step offsets on an 8-to-5 field.
//!
//! The x axis runs side 1 (negative) to side 2 (positive) with the 50 yard
//! line at 0. The y axis starts at the front sideline and goes negative
//! toward the back sideline.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::config::{FieldCheckpoints, FieldProfile};
use crate::types::{FieldPosition, SetRecord};

const STEPS_PER_FIVE_YARDS: f32 = 8.0;

static SIDE_ONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(?:s1|side\s*1|side\s*a|left)(?:\b|:|$)").unwrap()
});

static SIDE_TWO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\s)(?:s2|side\s*2|side\s*b|right)(?:\b|:|$)").unwrap()
});

static YARD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d{1,2})\s*(?:yds?|yard)\b").unwrap());

static LATERAL_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:steps?|stps?)?\s*(inside|outside)\s*(\d{1,2})\s*(?:yds?|yard)\b")
        .unwrap()
});

// Trailing group: optional hash designation such as "(HS)" or "CH"
static FB_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(?:steps?|stps?)?\s*(in\s+front\s+of|behind)\s*(front|back)\s*(hash|side\s*line)(?:\s*\(?(HS|CH|PH)\b\)?)?")
        .unwrap()
});

static FB_ON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bon\s*(front|back)\s*(hash|side\s*line)(?:\s*\(?(HS|CH|PH)\b\)?)?").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    One,
    Two,
}

impl Side {
    /// Side named in the text; side 1 when nothing matches.
    pub fn detect(text: &str) -> Self {
        if SIDE_ONE.is_match(text) {
            Side::One
        } else if SIDE_TWO.is_match(text) {
            Side::Two
        } else {
            Side::One
        }
    }

    fn sign(self) -> f32 {
        match self {
            Side::One => -1.0,
            Side::Two => 1.0,
        }
    }
}

/// Steps from the 50 for yard line `yard` on `side`.
pub fn yard_line_steps(yard: u32, side: Side) -> f32 {
    let steps = ((50.0 - yard as f32) / 5.0 * STEPS_PER_FIVE_YARDS).abs();
    if steps == 0.0 {
        return 0.0;
    }
    side.sign() * steps
}

pub struct CoordinateNormalizer {
    checkpoints: FieldCheckpoints,
}

impl CoordinateNormalizer {
    pub fn new(profile: FieldProfile) -> Self {
        Self {
            checkpoints: profile.checkpoints(),
        }
    }

    /// Both axes must resolve; otherwise the row keeps its raw text only.
    pub fn normalize(&self, record: &SetRecord) -> Option<FieldPosition> {
        let x_steps = self.lateral(&record.side_text);
        let y_steps = self.front_back(&record.fb_text);
        match (x_steps, y_steps) {
            (Some(x_steps), Some(y_steps)) => Some(FieldPosition { x_steps, y_steps }),
            _ => {
                trace!(set = %record.set_id, ?x_steps, ?y_steps, "coordinates unresolved");
                None
            }
        }
    }

    pub fn lateral(&self, text: &str) -> Option<f32> {
        let side = Side::detect(text);

        if let Some(caps) = LATERAL_OFFSET.captures(text) {
            let distance: f32 = caps[1].parse().ok()?;
            let yard: u32 = caps[3].parse().ok()?;
            let base = yard_line_steps(yard, side);
            let toward_center = caps[2].eq_ignore_ascii_case("inside");
            // Inside moves toward 0 on either side
            let delta = if toward_center { -distance } else { distance };
            return Some(base + side.sign() * delta);
        }

        let yard: u32 = YARD_LINE.captures(text)?[1].parse().ok()?;
        Some(yard_line_steps(yard, side))
    }

    pub fn front_back(&self, text: &str) -> Option<f32> {
        if let Some(caps) = FB_OFFSET.captures(text) {
            let distance: f32 = caps[1].parse().ok()?;
            let base = self.checkpoint(&caps[3], &caps[4], caps.get(5).map(|m| m.as_str()));
            let in_front = caps[2].to_ascii_lowercase().starts_with("in");
            return Some(if in_front { base + distance } else { base - distance });
        }

        let caps = FB_ON.captures(text)?;
        Some(self.checkpoint(&caps[1], &caps[2], caps.get(3).map(|m| m.as_str())))
    }

    /// A hash designation picks that field's hashes for this row; without
    /// one, or for a designation with no known layout, the configured field
    /// applies.
    fn checkpoint(&self, which: &str, kind: &str, designation: Option<&str>) -> f32 {
        let front = which.eq_ignore_ascii_case("front");
        let hash = kind.eq_ignore_ascii_case("hash");
        let checkpoints = designation
            .and_then(FieldProfile::from_hash_designation)
            .map_or(self.checkpoints, FieldProfile::checkpoints);
        match (front, hash) {
            (true, true) => checkpoints.front_hash,
            (false, true) => checkpoints.back_hash,
            (true, false) => checkpoints.front_sideline,
            (false, false) => checkpoints.back_sideline,
        }
    }
}
