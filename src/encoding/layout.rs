//! Feature vector slot layout.
//!
//! Every row has the same width and every slot has one fixed meaning. Slots
//! 0..15 are filled for all events; each event type owns a contiguous region
//! after that. The shot region ends with 22 freeze-frame (x, y) pairs.
//!
//! Layout (compact, 128 slots):
//!   [0:15]    common block
//!   [15:17]   ball recovery       [17:19]   duel
//!   [19:22]   block               [22:24]   clearance
//!   [24:28]   dribble             [28:30]   substitution
//!   [30:33]   foul won            [33:38]   foul committed
//!   [38:45]   goalkeeper          [45]      bad behaviour
//!   [46]      50/50               [47:65]   pass
//!   [65]      interception        [66]      miscontrol
//!   [67]      injury stoppage     [68]      ball receipt
//!   [69:71]   carry               [71:84]   shot
//!   [84:128]  shot freeze frame, 22 x (x, y)
//!
//! The extended layout appends 22 x (teammate, position) freeze-frame
//! metadata pairs at [128:172].

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::EventType;

/// Width of the compact layout.
pub const VECTOR_SIZE: usize = 128;

/// Maximum number of freeze-frame players encoded.
pub const FREEZE_FRAME_PLAYERS: usize = 22;

/// Width of the extended layout.
pub const EXTENDED_VECTOR_SIZE: usize = VECTOR_SIZE + 2 * FREEZE_FRAME_PLAYERS;

// Common block.
pub const SLOT_EVENT_TYPE: usize = 0;
pub const SLOT_PLAY_PATTERN: usize = 1;
pub const SLOT_LOCATION_X: usize = 2;
pub const SLOT_LOCATION_Y: usize = 3;
pub const SLOT_DURATION: usize = 4;
pub const SLOT_UNDER_PRESSURE: usize = 5;
pub const SLOT_OUT: usize = 6;
pub const SLOT_COUNTERPRESS: usize = 7;
pub const SLOT_PERIOD: usize = 8;
pub const SLOT_SECOND: usize = 9;
pub const SLOT_POSITION: usize = 10;
pub const SLOT_MINUTE: usize = 11;
pub const SLOT_TEAM: usize = 12;
pub const SLOT_POSSESSION_TEAM: usize = 13;
pub const SLOT_PLAYER_POSITION: usize = 14;
pub const COMMON_WIDTH: usize = 15;

// Type-specific region starts.
pub const SLOT_BALL_RECOVERY: usize = 15;
pub const SLOT_DUEL: usize = 17;
pub const SLOT_BLOCK: usize = 19;
pub const SLOT_CLEARANCE: usize = 22;
pub const SLOT_DRIBBLE: usize = 24;
pub const SLOT_SUBSTITUTION: usize = 28;
pub const SLOT_FOUL_WON: usize = 30;
pub const SLOT_FOUL_COMMITTED: usize = 33;
pub const SLOT_GOALKEEPER: usize = 38;
pub const SLOT_BAD_BEHAVIOUR: usize = 45;
pub const SLOT_FIFTY_FIFTY: usize = 46;
pub const SLOT_PASS: usize = 47;
pub const SLOT_INTERCEPTION: usize = 65;
pub const SLOT_MISCONTROL: usize = 66;
pub const SLOT_INJURY_STOPPAGE: usize = 67;
pub const SLOT_BALL_RECEIPT: usize = 68;
pub const SLOT_CARRY: usize = 69;
pub const SLOT_SHOT: usize = 71;
pub const SLOT_FREEZE_FRAME: usize = 84;
pub const SLOT_FREEZE_FRAME_META: usize = VECTOR_SIZE;

/// Row layout variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureLayout {
    /// 128 slots; freeze-frame metadata is not encoded.
    #[default]
    Compact,
    /// 172 slots; freeze-frame teammate flag and position follow the compact block.
    Extended,
}

impl FeatureLayout {
    pub const fn width(self) -> usize {
        match self {
            FeatureLayout::Compact => VECTOR_SIZE,
            FeatureLayout::Extended => EXTENDED_VECTOR_SIZE,
        }
    }

    /// Slot region owned by an event type under this layout.
    pub fn region(self, t: EventType) -> Range<usize> {
        let base = type_region(t);
        if t == EventType::Shot && self == FeatureLayout::Extended {
            base.start..EXTENDED_VECTOR_SIZE
        } else {
            base
        }
    }
}

impl fmt::Display for FeatureLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureLayout::Compact => write!(f, "compact"),
            FeatureLayout::Extended => write!(f, "extended"),
        }
    }
}

impl FromStr for FeatureLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(FeatureLayout::Compact),
            "extended" => Ok(FeatureLayout::Extended),
            other => Err(format!("unknown layout '{}'", other)),
        }
    }
}

/// Compact-layout region of an event type. Types without a mapping get an
/// empty range.
pub const fn type_region(t: EventType) -> Range<usize> {
    use EventType::*;
    match t {
        BallRecovery => SLOT_BALL_RECOVERY..SLOT_DUEL,
        Duel => SLOT_DUEL..SLOT_BLOCK,
        Block => SLOT_BLOCK..SLOT_CLEARANCE,
        Clearance => SLOT_CLEARANCE..SLOT_DRIBBLE,
        Dribble => SLOT_DRIBBLE..SLOT_SUBSTITUTION,
        Substitution => SLOT_SUBSTITUTION..SLOT_FOUL_WON,
        FoulWon => SLOT_FOUL_WON..SLOT_FOUL_COMMITTED,
        FoulCommitted => SLOT_FOUL_COMMITTED..SLOT_GOALKEEPER,
        GoalKeeper => SLOT_GOALKEEPER..SLOT_BAD_BEHAVIOUR,
        BadBehaviour => SLOT_BAD_BEHAVIOUR..SLOT_FIFTY_FIFTY,
        FiftyFifty => SLOT_FIFTY_FIFTY..SLOT_PASS,
        Pass => SLOT_PASS..SLOT_INTERCEPTION,
        Interception => SLOT_INTERCEPTION..SLOT_MISCONTROL,
        Miscontrol => SLOT_MISCONTROL..SLOT_INJURY_STOPPAGE,
        InjuryStoppage => SLOT_INJURY_STOPPAGE..SLOT_BALL_RECEIPT,
        BallReceipt => SLOT_BALL_RECEIPT..SLOT_CARRY,
        Carry => SLOT_CARRY..SLOT_SHOT,
        Shot => SLOT_SHOT..VECTOR_SIZE,
        _ => COMMON_WIDTH..COMMON_WIDTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ALL_EVENT_TYPES;

    #[test]
    fn regions_tile_the_compact_vector() {
        let mut owner = [None::<EventType>; VECTOR_SIZE];
        for t in ALL_EVENT_TYPES {
            for slot in type_region(t) {
                assert!(
                    owner[slot].is_none(),
                    "slot {} claimed by {:?} and {:?}",
                    slot,
                    owner[slot],
                    t
                );
                owner[slot] = Some(t);
            }
        }
        for (slot, o) in owner.iter().enumerate() {
            assert_eq!(o.is_none(), slot < COMMON_WIDTH, "slot {} coverage", slot);
        }
    }

    #[test]
    fn freeze_frame_fills_the_shot_tail() {
        assert_eq!(SLOT_FREEZE_FRAME + 2 * FREEZE_FRAME_PLAYERS, VECTOR_SIZE);
        assert_eq!(FeatureLayout::Extended.width(), 172);
        assert_eq!(FeatureLayout::Extended.region(EventType::Shot), 71..172);
        assert_eq!(FeatureLayout::Compact.region(EventType::Shot), 71..128);
    }

    #[test]
    fn layout_parses() {
        assert_eq!("Extended".parse::<FeatureLayout>(), Ok(FeatureLayout::Extended));
        assert!("wide".parse::<FeatureLayout>().is_err());
        assert_eq!(FeatureLayout::default().to_string(), "compact");
    }
}
