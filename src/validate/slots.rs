//! Expected value domain of each slot, derived from the field tables.

use crate::encoding::field::{Custom, Encoder};
use crate::encoding::layout::*;
use crate::encoding::vocab::{self, Vocabulary};
use crate::extract::mapping;
use crate::schema::EventType;

/// The set of values a slot may hold.
#[derive(Debug, Clone, Copy)]
pub enum SlotKind {
    /// `{0} ∪ {k / N}`.
    Categorical(&'static Vocabulary),
    /// `{0, 0.5, 1}`.
    Flag,
    /// `[0, 1]`.
    Range,
    /// `{0, 1}`.
    Team,
}

static COMMON_SLOTS: [SlotKind; COMMON_WIDTH] = [
    SlotKind::Categorical(&vocab::EVENT_TYPE),
    SlotKind::Categorical(&vocab::PLAY_PATTERN),
    SlotKind::Range,
    SlotKind::Range,
    SlotKind::Range,
    SlotKind::Flag,
    SlotKind::Flag,
    SlotKind::Flag,
    SlotKind::Categorical(&vocab::PERIOD),
    SlotKind::Categorical(&vocab::SECOND),
    SlotKind::Categorical(&vocab::POSITION),
    SlotKind::Range,
    SlotKind::Team,
    SlotKind::Team,
    SlotKind::Categorical(&vocab::POSITION),
];

pub fn common_slots() -> impl Iterator<Item = (usize, SlotKind)> {
    COMMON_SLOTS.iter().copied().enumerate()
}

/// Slots written by an event type's table, with their domains.
pub fn region_slots(kind: EventType, layout: FeatureLayout) -> Vec<(usize, SlotKind)> {
    let mut out = Vec::new();
    for spec in mapping::fields(kind) {
        match spec.encoder {
            Encoder::Categorize(v) => out.push((spec.slot, SlotKind::Categorical(v))),
            Encoder::Flag => out.push((spec.slot, SlotKind::Flag)),
            Encoder::Normalize(_) => out.push((spec.slot, SlotKind::Range)),
            Encoder::Custom(Custom::RecipientPosition | Custom::ReplacementPosition) => {
                out.push((spec.slot, SlotKind::Categorical(&vocab::POSITION)))
            }
            Encoder::Custom(Custom::FreezeFrame) => {
                out.extend((0..2 * FREEZE_FRAME_PLAYERS).map(|i| (spec.slot + i, SlotKind::Range)));
                if layout == FeatureLayout::Extended {
                    for i in 0..FREEZE_FRAME_PLAYERS {
                        out.push((SLOT_FREEZE_FRAME_META + 2 * i, SlotKind::Flag));
                        out.push((
                            SLOT_FREEZE_FRAME_META + 2 * i + 1,
                            SlotKind::Categorical(&vocab::POSITION),
                        ));
                    }
                }
            }
        }
    }
    out
}

const TOLERANCE: f32 = 1e-4;

impl SlotKind {
    /// Returns true if `v` is a value this slot can hold.
    pub fn admits(self, v: f32) -> bool {
        match self {
            SlotKind::Categorical(vocab) => vocab.is_valid_encoding(v),
            SlotKind::Flag => [0.0, 0.5, 1.0].iter().any(|f| (v - f).abs() < TOLERANCE),
            SlotKind::Range => (0.0..=1.0).contains(&v),
            SlotKind::Team => v.abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE,
        }
    }

    /// Nearest admissible value, after clipping to `[0, 1]`.
    pub fn snap(self, v: f32) -> f32 {
        let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        match self {
            SlotKind::Categorical(vocab) => vocab.snap(v),
            SlotKind::Flag => crate::encoding::ranges::snap_flag(v),
            SlotKind::Range => v,
            SlotKind::Team => {
                if v < 0.5 {
                    0.0
                } else {
                    1.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_region_kinds() {
        let slots = region_slots(EventType::Pass, FeatureLayout::Compact);
        assert_eq!(slots.len(), 18);
        assert!(matches!(slots[1], (s, SlotKind::Range) if s == SLOT_PASS + 1));
        assert!(matches!(slots[17].1, SlotKind::Categorical(v) if v.name == "position"));
    }

    #[test]
    fn shot_region_grows_with_extended_layout() {
        assert_eq!(region_slots(EventType::Shot, FeatureLayout::Compact).len(), 13 + 44);
        assert_eq!(region_slots(EventType::Shot, FeatureLayout::Extended).len(), 13 + 88);
    }

    #[test]
    fn admits_and_snaps() {
        assert!(SlotKind::Flag.admits(0.5));
        assert!(!SlotKind::Flag.admits(0.7));
        assert_eq!(SlotKind::Flag.snap(0.7), 0.5);
        assert!(SlotKind::Team.admits(1.0));
        assert!(!SlotKind::Team.admits(0.5));
        assert_eq!(SlotKind::Team.snap(0.6), 1.0);
        assert_eq!(SlotKind::Range.snap(1.3), 1.0);
        assert_eq!(SlotKind::Range.snap(f32::NAN), 0.0);
        let cat = SlotKind::Categorical(&vocab::CARD);
        assert!(cat.admits(2.0 / 3.0));
        assert_eq!(cat.snap(0.6), 2.0 / 3.0);
    }
}
