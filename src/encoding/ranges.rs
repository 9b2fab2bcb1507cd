//! Min-max normalization ranges and the boolean encoding.

/// A closed normalization domain. Invariant: `min < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Range { min, max }
    }

    /// Clamps `v` into the domain and scales it to `[0, 1]`.
    ///
    /// Non-finite input is treated as absent and yields 0.
    pub fn normalize(&self, v: f64) -> f32 {
        if !v.is_finite() {
            return 0.0;
        }
        let clamped = v.clamp(self.min, self.max);
        ((clamped - self.min) / (self.max - self.min)) as f32
    }

    pub fn encode(&self, v: Option<f64>) -> f32 {
        v.map_or(0.0, |v| self.normalize(v))
    }

    /// Maps an encoded value back into the domain.
    pub fn denormalize(&self, v: f32) -> f64 {
        self.min + f64::from(v) * (self.max - self.min)
    }
}

pub const PITCH_X: Range = Range::new(0.0, 120.0);
pub const PITCH_Y: Range = Range::new(0.0, 80.0);
pub const DURATION: Range = Range::new(0.0, 3.0);
pub const PASS_LENGTH: Range = Range::new(0.0, 120.0);
pub const PASS_ANGLE: Range = Range::new(-3.15, 3.15);
pub const SHOT_END_Z: Range = Range::new(0.0, 5.0);
pub const XG: Range = Range::new(0.0, 1.0);

/// Encodes a boolean: absent 0, false 0.5, true 1.
pub fn flag(v: Option<bool>) -> f32 {
    match v {
        None => 0.0,
        Some(false) => 0.5,
        Some(true) => 1.0,
    }
}

/// Snaps a value to the nearest of `{0, 0.5, 1}`.
pub fn snap_flag(v: f32) -> f32 {
    if v < 0.25 {
        0.0
    } else if v < 0.75 {
        0.5
    } else {
        1.0
    }
}
