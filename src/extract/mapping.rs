//! Per-event-type field tables.
//!
//! Each entry binds a path in the type's sub-object to an absolute slot and
//! an encoder. Types whose rows carry only the common block have an empty
//! table.

use crate::encoding::field::{Custom, Encoder, FieldSpec};
use crate::encoding::layout::*;
use crate::encoding::ranges::{self, Range};
use crate::encoding::vocab::{self, Vocabulary};
use crate::schema::EventType;

const fn cat(path: &'static str, slot: usize, vocab: &'static Vocabulary) -> FieldSpec {
    FieldSpec::new(path, slot, Encoder::Categorize(vocab))
}

const fn flag(path: &'static str, slot: usize) -> FieldSpec {
    FieldSpec::new(path, slot, Encoder::Flag)
}

const fn norm(path: &'static str, slot: usize, range: Range) -> FieldSpec {
    FieldSpec::new(path, slot, Encoder::Normalize(range))
}

const fn custom(path: &'static str, slot: usize, c: Custom) -> FieldSpec {
    FieldSpec::new(path, slot, Encoder::Custom(c))
}

const NONE: &[FieldSpec] = &[];

static BALL_RECOVERY: &[FieldSpec] = &[
    flag("offensive", SLOT_BALL_RECOVERY),
    flag("recovery_failure", SLOT_BALL_RECOVERY + 1),
];

static DUEL: &[FieldSpec] = &[
    cat("type", SLOT_DUEL, &vocab::DUEL_TYPE),
    cat("outcome", SLOT_DUEL + 1, &vocab::DUEL_OUTCOME),
];

static BLOCK: &[FieldSpec] = &[
    flag("deflection", SLOT_BLOCK),
    flag("offensive", SLOT_BLOCK + 1),
    flag("save_block", SLOT_BLOCK + 2),
];

static CLEARANCE: &[FieldSpec] = &[
    flag("aerial_won", SLOT_CLEARANCE),
    cat("body_part", SLOT_CLEARANCE + 1, &vocab::BODY_PART),
];

static INTERCEPTION: &[FieldSpec] = &[cat("outcome", SLOT_INTERCEPTION, &vocab::DUEL_OUTCOME)];

static DRIBBLE: &[FieldSpec] = &[
    flag("overrun", SLOT_DRIBBLE),
    flag("nutmeg", SLOT_DRIBBLE + 1),
    cat("outcome", SLOT_DRIBBLE + 2, &vocab::DRIBBLE_OUTCOME),
    flag("no_touch", SLOT_DRIBBLE + 3),
];

static SHOT: &[FieldSpec] = &[
    cat("type", SLOT_SHOT, &vocab::SHOT_TYPE),
    norm("end_location[0]", SLOT_SHOT + 1, ranges::PITCH_X),
    norm("end_location[1]", SLOT_SHOT + 2, ranges::PITCH_Y),
    norm("end_location[2]", SLOT_SHOT + 3, ranges::SHOT_END_Z),
    flag("aerial_won", SLOT_SHOT + 4),
    flag("follows_dribble", SLOT_SHOT + 5),
    flag("first_time", SLOT_SHOT + 6),
    flag("open_goal", SLOT_SHOT + 7),
    norm("statsbomb_xg", SLOT_SHOT + 8, ranges::XG),
    flag("deflected", SLOT_SHOT + 9),
    cat("technique", SLOT_SHOT + 10, &vocab::SHOT_TECHNIQUE),
    cat("body_part", SLOT_SHOT + 11, &vocab::BODY_PART),
    cat("outcome", SLOT_SHOT + 12, &vocab::SHOT_OUTCOME),
    custom("freeze_frame", SLOT_FREEZE_FRAME, Custom::FreezeFrame),
];

static SUBSTITUTION: &[FieldSpec] = &[
    cat("outcome", SLOT_SUBSTITUTION, &vocab::SUBSTITUTION_OUTCOME),
    custom("replacement", SLOT_SUBSTITUTION + 1, Custom::ReplacementPosition),
];

static FOUL_WON: &[FieldSpec] = &[
    flag("defensive", SLOT_FOUL_WON),
    flag("advantage", SLOT_FOUL_WON + 1),
    flag("penalty", SLOT_FOUL_WON + 2),
];

static FOUL_COMMITTED: &[FieldSpec] = &[
    cat("type", SLOT_FOUL_COMMITTED, &vocab::FOUL_TYPE),
    flag("offensive", SLOT_FOUL_COMMITTED + 1),
    flag("advantage", SLOT_FOUL_COMMITTED + 2),
    flag("penalty", SLOT_FOUL_COMMITTED + 3),
    cat("card", SLOT_FOUL_COMMITTED + 4, &vocab::CARD),
];

static GOALKEEPER: &[FieldSpec] = &[
    cat("type", SLOT_GOALKEEPER, &vocab::GK_TYPE),
    cat("outcome", SLOT_GOALKEEPER + 1, &vocab::GK_OUTCOME),
    cat("position", SLOT_GOALKEEPER + 2, &vocab::GK_POSITION),
    cat("technique", SLOT_GOALKEEPER + 3, &vocab::GK_TECHNIQUE),
    cat("body_part", SLOT_GOALKEEPER + 4, &vocab::GK_BODY_PART),
    norm("end_location[0]", SLOT_GOALKEEPER + 5, ranges::PITCH_X),
    norm("end_location[1]", SLOT_GOALKEEPER + 6, ranges::PITCH_Y),
];

static BAD_BEHAVIOUR: &[FieldSpec] =
    &[cat("card", SLOT_BAD_BEHAVIOUR, &vocab::BAD_BEHAVIOUR_CARD)];

static PASS: &[FieldSpec] = &[
    cat("type", SLOT_PASS, &vocab::PASS_TYPE),
    norm("length", SLOT_PASS + 1, ranges::PASS_LENGTH),
    norm("angle", SLOT_PASS + 2, ranges::PASS_ANGLE),
    cat("height", SLOT_PASS + 3, &vocab::PASS_HEIGHT),
    norm("end_location[0]", SLOT_PASS + 4, ranges::PITCH_X),
    norm("end_location[1]", SLOT_PASS + 5, ranges::PITCH_Y),
    flag("backheel", SLOT_PASS + 6),
    flag("deflected", SLOT_PASS + 7),
    flag("miscommunication", SLOT_PASS + 8),
    flag("cross", SLOT_PASS + 9),
    flag("cut_back", SLOT_PASS + 10),
    flag("switch", SLOT_PASS + 11),
    flag("shot_assist", SLOT_PASS + 12),
    flag("goal_assist", SLOT_PASS + 13),
    cat("body_part", SLOT_PASS + 14, &vocab::PASS_BODY_PART),
    cat("outcome", SLOT_PASS + 15, &vocab::PASS_OUTCOME),
    cat("technique", SLOT_PASS + 16, &vocab::PASS_TECHNIQUE),
    custom("recipient", SLOT_PASS + 17, Custom::RecipientPosition),
];

static FIFTY_FIFTY: &[FieldSpec] = &[cat("outcome", SLOT_FIFTY_FIFTY, &vocab::FIFTY_FIFTY_OUTCOME)];

static MISCONTROL: &[FieldSpec] = &[flag("aerial_won", SLOT_MISCONTROL)];

static INJURY_STOPPAGE: &[FieldSpec] = &[flag("in_chain", SLOT_INJURY_STOPPAGE)];

static BALL_RECEIPT: &[FieldSpec] =
    &[cat("outcome", SLOT_BALL_RECEIPT, &vocab::BALL_RECEIPT_OUTCOME)];

static CARRY: &[FieldSpec] = &[
    norm("end_location[0]", SLOT_CARRY, ranges::PITCH_X),
    norm("end_location[1]", SLOT_CARRY + 1, ranges::PITCH_Y),
];

/// Field table of an event type.
pub fn fields(t: EventType) -> &'static [FieldSpec] {
    use EventType::*;
    match t {
        BallRecovery => BALL_RECOVERY,
        Duel => DUEL,
        Block => BLOCK,
        Clearance => CLEARANCE,
        Interception => INTERCEPTION,
        Dribble => DRIBBLE,
        Shot => SHOT,
        Substitution => SUBSTITUTION,
        FoulWon => FOUL_WON,
        FoulCommitted => FOUL_COMMITTED,
        GoalKeeper => GOALKEEPER,
        BadBehaviour => BAD_BEHAVIOUR,
        Pass => PASS,
        FiftyFifty => FIFTY_FIFTY,
        Miscontrol => MISCONTROL,
        InjuryStoppage => INJURY_STOPPAGE,
        BallReceipt => BALL_RECEIPT,
        Carry => CARRY,
        Dispossessed | CameraOn | Offside | Pressure | HalfStart | OwnGoalAgainst
        | OwnGoalFor | PlayerOn | PlayerOff | Shield | HalfEnd | StartingXi
        | TacticalShift | Error | DribbledPast | RefereeBallDrop => NONE,
    }
}

/// The table entry writing `slot`, if any, searching only `t`'s table.
pub fn spec_for_slot(t: EventType, slot: usize) -> Option<&'static FieldSpec> {
    fields(t).iter().find(|f| f.slot == slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ALL_EVENT_TYPES;

    #[test]
    fn fields_cover_their_region_exactly() {
        for t in ALL_EVENT_TYPES {
            let region = type_region(t);
            let mut slots: Vec<usize> = fields(t)
                .iter()
                .flat_map(|f| match f.encoder {
                    Encoder::Custom(Custom::FreezeFrame) => {
                        (f.slot..f.slot + 2 * FREEZE_FRAME_PLAYERS).collect::<Vec<_>>()
                    }
                    _ => vec![f.slot],
                })
                .collect();
            slots.sort_unstable();
            let expected: Vec<usize> = region.collect();
            assert_eq!(slots, expected, "{:?} table does not tile its region", t);
        }
    }

    #[test]
    fn discarded_types_have_no_fields() {
        for t in ALL_EVENT_TYPES.iter().filter(|t| t.is_discarded()) {
            assert!(fields(*t).is_empty(), "{:?}", t);
        }
    }

    #[test]
    fn pass_recipient_is_last_pass_slot() {
        let spec = spec_for_slot(EventType::Pass, SLOT_INTERCEPTION - 1).unwrap();
        assert_eq!(spec.path, "recipient");
    }
}
