//! Category tables.
//!
//! Every categorical field has a fixed, ordered vocabulary of StatsBomb ids.
//! A raw id maps to its 1-based position in the list (the bucket) and encodes
//! as `bucket / len`. Ids outside the vocabulary are a hard error.

use thiserror::Error;

/// Errors from encoding a single raw field value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("unknown category {value} for field '{field}'")]
    UnknownCategory { field: &'static str, value: u64 },
    #[error("malformed value for field '{field}': expected {expected}")]
    Malformed {
        field: &'static str,
        expected: &'static str,
    },
}

/// An ordered set of known raw ids for one categorical field.
#[derive(Debug)]
pub struct Vocabulary {
    pub name: &'static str,
    pub values: &'static [u64],
}

impl Vocabulary {
    pub const fn new(name: &'static str, values: &'static [u64]) -> Self {
        Vocabulary { name, values }
    }

    /// Number of classes.
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the 1-based bucket of a raw id.
    pub fn bucket(&self, raw: u64) -> Option<usize> {
        self.values.iter().position(|&v| v == raw).map(|i| i + 1)
    }

    /// Encoded value of a bucket.
    pub fn bucket_value(&self, bucket: usize) -> f32 {
        bucket as f32 / self.len() as f32
    }

    /// Encodes an optional raw id. Absence encodes as 0.
    pub fn encode(&self, raw: Option<u64>) -> Result<f32, FieldError> {
        match raw {
            None => Ok(0.0),
            Some(v) => self
                .bucket(v)
                .map(|b| self.bucket_value(b))
                .ok_or(FieldError::UnknownCategory {
                    field: self.name,
                    value: v,
                }),
        }
    }

    /// Returns true if `value` is 0 or one of the `k / len` encodings.
    pub fn is_valid_encoding(&self, value: f32) -> bool {
        value == 0.0 || self.nearest_bucket(value).is_some_and(|b| {
            (self.bucket_value(b) - value).abs() < 1e-4
        })
    }

    /// Nearest non-zero bucket to an encoded value, if the value is positive.
    pub fn nearest_bucket(&self, value: f32) -> Option<usize> {
        if value.is_nan() || value <= 0.0 || self.is_empty() {
            return None;
        }
        let n = self.len() as f32;
        let k = (value * n).round().clamp(1.0, n);
        Some(k as usize)
    }

    /// Snaps an arbitrary value onto the closest valid encoding, 0 included.
    pub fn snap(&self, value: f32) -> f32 {
        let half_step = 0.5 / self.len() as f32;
        if value < half_step {
            return 0.0;
        }
        match self.nearest_bucket(value) {
            Some(b) => self.bucket_value(b),
            None => 0.0,
        }
    }
}

const fn span<const N: usize>(start: u64) -> [u64; N] {
    let mut out = [0u64; N];
    let mut i = 0;
    while i < N {
        out[i] = start + i as u64;
        i += 1;
    }
    out
}

const EVENT_TYPE_IDS: [u64; 34] = [
    2, 3, 4, 5, 6, 8, 9, 10, 14, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 30, 33, 34,
    35, 36, 37, 38, 39, 40, 41, 42, 43,
];
const PLAY_PATTERN_IDS: [u64; 9] = span(1);
const PERIOD_IDS: [u64; 5] = span(1);
const SECOND_IDS: [u64; 60] = span(0);
const POSITION_IDS: [u64; 25] = span(1);
const FOUL_TYPE_IDS: [u64; 6] = span(19);
const GK_BODY_PART_IDS: [u64; 7] = span(35);
const PASS_TYPE_IDS: [u64; 7] = span(61);
const SHOT_TECHNIQUE_IDS: [u64; 7] = span(89);

pub static EVENT_TYPE: Vocabulary = Vocabulary::new("event type", &EVENT_TYPE_IDS);
pub static PLAY_PATTERN: Vocabulary = Vocabulary::new("play pattern", &PLAY_PATTERN_IDS);
pub static PERIOD: Vocabulary = Vocabulary::new("period", &PERIOD_IDS);
pub static SECOND: Vocabulary = Vocabulary::new("second", &SECOND_IDS);
pub static POSITION: Vocabulary = Vocabulary::new("position", &POSITION_IDS);

pub static DUEL_TYPE: Vocabulary = Vocabulary::new("duel type", &[10, 11]);
pub static DUEL_OUTCOME: Vocabulary = Vocabulary::new("duel outcome", &[1, 4, 13, 14, 15, 16, 17]);
pub static BODY_PART: Vocabulary = Vocabulary::new("body part", &[37, 38, 40, 70]);
pub static DRIBBLE_OUTCOME: Vocabulary = Vocabulary::new("dribble outcome", &[8, 9]);
pub static SUBSTITUTION_OUTCOME: Vocabulary = Vocabulary::new("substitution outcome", &[102, 103]);
pub static FOUL_TYPE: Vocabulary = Vocabulary::new("foul committed type", &FOUL_TYPE_IDS);
pub static CARD: Vocabulary = Vocabulary::new("card", &[5, 6, 7]);
/// Bad-behaviour cards carry their own ids, distinct from foul cards.
pub static BAD_BEHAVIOUR_CARD: Vocabulary = Vocabulary::new("bad behaviour card", &[65, 66, 67]);

pub static GK_TYPE: Vocabulary = Vocabulary::new(
    "goalkeeper type",
    &[25, 26, 27, 28, 29, 30, 31, 32, 33, 34, 109, 110, 113, 114],
);
pub static GK_OUTCOME: Vocabulary = Vocabulary::new(
    "goalkeeper outcome",
    &[1, 4, 13, 14, 15, 16, 17, 47, 48, 49, 50, 51, 52, 53, 55, 56, 58, 59, 117],
);
pub static GK_POSITION: Vocabulary = Vocabulary::new("goalkeeper position", &[42, 43, 44]);
pub static GK_TECHNIQUE: Vocabulary = Vocabulary::new("goalkeeper technique", &[45, 46]);
pub static GK_BODY_PART: Vocabulary = Vocabulary::new("goalkeeper body part", &GK_BODY_PART_IDS);

// Older match files record a lost 50/50 as outcome 1.
pub static FIFTY_FIFTY_OUTCOME: Vocabulary =
    Vocabulary::new("50/50 outcome", &[1, 108, 109, 147, 148]);

pub static PASS_TYPE: Vocabulary = Vocabulary::new("pass type", &PASS_TYPE_IDS);
pub static PASS_HEIGHT: Vocabulary = Vocabulary::new("pass height", &[1, 2, 3]);
pub static PASS_BODY_PART: Vocabulary =
    Vocabulary::new("pass body part", &[37, 38, 40, 68, 69, 70, 106]);
pub static PASS_OUTCOME: Vocabulary = Vocabulary::new("pass outcome", &[9, 74, 75, 76, 77]);
pub static PASS_TECHNIQUE: Vocabulary = Vocabulary::new("pass technique", &[104, 105, 107, 108]);

pub static BALL_RECEIPT_OUTCOME: Vocabulary = Vocabulary::new("ball receipt outcome", &[9]);

pub static SHOT_TYPE: Vocabulary = Vocabulary::new("shot type", &[61, 62, 65, 87, 88]);
pub static SHOT_TECHNIQUE: Vocabulary = Vocabulary::new("shot technique", &SHOT_TECHNIQUE_IDS);
pub static SHOT_OUTCOME: Vocabulary =
    Vocabulary::new("shot outcome", &[96, 97, 98, 99, 100, 101, 115, 116]);
