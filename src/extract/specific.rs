//! Type-specific regions, driven by the field tables in `mapping`.

use serde_json::{Map, Value};
use tracing::warn;

use crate::anonymize::MatchState;
use crate::encoding::field::{category_id, lookup, number, Custom, Encoder, FieldSpec};
use crate::encoding::layout::{FeatureLayout, FREEZE_FRAME_PLAYERS, SLOT_FREEZE_FRAME_META};
use crate::encoding::ranges::{self, flag};
use crate::encoding::vocab::{self, FieldError};
use crate::schema::{Event, EventType};

use super::mapping;
use super::ExtractError;

/// Writes the region owned by `kind`.
///
/// A missing or non-object sub-object leaves the region at 0. `state` is
/// only read: substitution side effects are applied by the caller after the
/// row is complete.
pub fn extract_specific(
    event: &Event,
    kind: EventType,
    state: &MatchState,
    layout: FeatureLayout,
    row: &mut [f32],
) -> Result<(), ExtractError> {
    let fields = mapping::fields(kind);
    if fields.is_empty() {
        return Ok(());
    }
    let Some(obj) = event.sub_object() else {
        return Ok(());
    };
    for spec in fields {
        match spec.encoder {
            Encoder::Custom(c) => apply_custom(c, spec, event, obj, state, layout, row)?,
            enc => row[spec.slot] = enc.encode(lookup(obj, spec.path), spec.path)?,
        }
    }
    Ok(())
}

fn apply_custom(
    custom: Custom,
    spec: &FieldSpec,
    event: &Event,
    obj: &Map<String, Value>,
    state: &MatchState,
    layout: FeatureLayout,
    row: &mut [f32],
) -> Result<(), FieldError> {
    match custom {
        Custom::RecipientPosition => {
            let recipient = category_id(lookup(obj, spec.path), spec.path)?;
            let position = recipient.and_then(|p| state.resolve_position(p));
            row[spec.slot] = vocab::POSITION.encode(position)?;
        }
        Custom::ReplacementPosition => {
            let outgoing = event.player_id().and_then(|p| state.resolve_position(p));
            row[spec.slot] = vocab::POSITION.encode(outgoing)?;
        }
        Custom::FreezeFrame => {
            let Some(entries) = lookup(obj, spec.path).and_then(Value::as_array) else {
                return Ok(());
            };
            if entries.len() > FREEZE_FRAME_PLAYERS {
                warn!(
                    index = event.index,
                    players = entries.len(),
                    "freeze frame truncated to {} players",
                    FREEZE_FRAME_PLAYERS
                );
            }
            for (i, entry) in entries.iter().take(FREEZE_FRAME_PLAYERS).enumerate() {
                let Some(player) = entry.as_object() else {
                    continue;
                };
                encode_frame_player(player, i, spec.slot, layout, row)?;
            }
        }
    }
    Ok(())
}

fn encode_frame_player(
    player: &Map<String, Value>,
    i: usize,
    base: usize,
    layout: FeatureLayout,
    row: &mut [f32],
) -> Result<(), FieldError> {
    let x = number(lookup(player, "location[0]"), "freeze_frame.location")?;
    let y = number(lookup(player, "location[1]"), "freeze_frame.location")?;
    row[base + 2 * i] = ranges::PITCH_X.encode(x);
    row[base + 2 * i + 1] = ranges::PITCH_Y.encode(y);

    if layout == FeatureLayout::Extended {
        let teammate = player.get("teammate").and_then(Value::as_bool);
        let position = category_id(player.get("position"), "freeze_frame.position")?;
        row[SLOT_FREEZE_FRAME_META + 2 * i] = flag(teammate);
        row[SLOT_FREEZE_FRAME_META + 2 * i + 1] = vocab::POSITION.encode(position)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::layout::*;
    use crate::schema::{IdName, LineupEntry};
    use serde_json::json;

    fn event_with(type_id: u64, key: &str, sub: Value) -> Event {
        let mut e = Event::new(type_id, 1, 10, 0);
        e.details.insert(key.to_string(), sub);
        e
    }

    fn run(e: &Event, state: &MatchState, layout: FeatureLayout) -> Vec<f32> {
        let mut row = vec![0.0; layout.width()];
        extract_specific(e, e.kind().unwrap(), state, layout, &mut row).unwrap();
        row
    }

    fn state_with(players: &[(u64, u64)]) -> MatchState {
        let mut s = MatchState::new();
        let lineup: Vec<LineupEntry> = players
            .iter()
            .map(|&(p, pos)| LineupEntry {
                player: IdName::new(p),
                position: IdName::new(pos),
                jersey_number: None,
            })
            .collect();
        s.update_lineup(1, &lineup);
        s
    }

    #[test]
    fn foul_committed_card_only() {
        let e = event_with(22, "foul_committed", json!({"card": {"id": 7}}));
        let row = run(&e, &MatchState::new(), FeatureLayout::Compact);
        assert_eq!(&row[SLOT_FOUL_COMMITTED..SLOT_GOALKEEPER], &[0.0, 0.5, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn empty_sub_object_sets_flags_false() {
        let e = event_with(2, "ball_recovery", json!({}));
        let row = run(&e, &MatchState::new(), FeatureLayout::Compact);
        assert_eq!(&row[SLOT_BALL_RECOVERY..SLOT_DUEL], &[0.5, 0.5]);
    }

    #[test]
    fn missing_sub_object_leaves_region_zero() {
        let e = Event::new(2, 1, 10, 0);
        let row = run(&e, &MatchState::new(), FeatureLayout::Compact);
        assert!(row.iter().all(|&v| v == 0.0));

        let mismatched = event_with(2, "duel", json!({"type": {"id": 10}}));
        let row = run(&mismatched, &MatchState::new(), FeatureLayout::Compact);
        assert!(row.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn duel_categories() {
        let e = event_with(4, "duel", json!({"type": {"id": 11}, "outcome": {"id": 13}}));
        let row = run(&e, &MatchState::new(), FeatureLayout::Compact);
        assert_eq!(row[SLOT_DUEL], 1.0);
        assert_eq!(row[SLOT_DUEL + 1], 3.0 / 7.0);
    }

    #[test]
    fn pass_recipient_resolves_to_position() {
        let state = state_with(&[(1, 1), (2, 2), (3, 3), (4, 4), (7, 6)]);
        let e = event_with(30, "pass", json!({"recipient": {"id": 7, "name": "R"}}));
        let row = run(&e, &state, FeatureLayout::Compact);
        assert_eq!(row[SLOT_INTERCEPTION - 1], 6.0 / 25.0);
    }

    #[test]
    fn unknown_recipient_defaults_to_zero() {
        let e = event_with(30, "pass", json!({"recipient": {"id": 99}}));
        let row = run(&e, &state_with(&[(7, 6)]), FeatureLayout::Compact);
        assert_eq!(row[SLOT_INTERCEPTION - 1], 0.0);
    }

    #[test]
    fn pass_continuous_fields() {
        let e = event_with(
            30,
            "pass",
            json!({"length": 60.0, "angle": 0.0, "end_location": [150.0, -3.0], "cross": true}),
        );
        let row = run(&e, &MatchState::new(), FeatureLayout::Compact);
        assert_eq!(row[SLOT_PASS + 1], 0.5);
        assert_eq!(row[SLOT_PASS + 2], 0.5);
        assert_eq!(row[SLOT_PASS + 4], 1.0, "end x clamped");
        assert_eq!(row[SLOT_PASS + 5], 0.0, "end y clamped");
        assert_eq!(row[SLOT_PASS + 9], 1.0);
        assert_eq!(row[SLOT_PASS + 10], 0.5);
    }

    #[test]
    fn substitution_reads_outgoing_position() {
        let state = state_with(&[(5, 9)]);
        let mut e = event_with(
            19,
            "substitution",
            json!({"outcome": {"id": 103}, "replacement": {"id": 50}}),
        );
        e.player = Some(IdName::new(5));
        let row = run(&e, &state, FeatureLayout::Compact);
        assert_eq!(row[SLOT_SUBSTITUTION], 1.0);
        assert_eq!(row[SLOT_SUBSTITUTION + 1], 9.0 / 25.0);
    }

    #[test]
    fn freeze_frame_fills_leading_pairs() {
        let frame = json!([
            {"location": [60.0, 40.0], "teammate": true, "position": {"id": 1}},
            {"location": [120.0, 0.0], "teammate": false, "position": {"id": 25}},
            {"location": [30.0, 20.0], "teammate": true, "position": {"id": 5}}
        ]);
        let e = event_with(16, "shot", json!({"freeze_frame": frame}));
        let row = run(&e, &MatchState::new(), FeatureLayout::Compact);
        assert_eq!(
            &row[SLOT_FREEZE_FRAME..SLOT_FREEZE_FRAME + 6],
            &[0.5, 0.5, 1.0, 0.0, 0.25, 0.25]
        );
        assert!(row[SLOT_FREEZE_FRAME + 6..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn extended_layout_adds_frame_metadata() {
        let frame = json!([
            {"location": [60.0, 40.0], "teammate": true, "position": {"id": 1}},
            {"location": [120.0, 0.0], "teammate": false, "position": {"id": 25}}
        ]);
        let e = event_with(16, "shot", json!({"freeze_frame": frame}));
        let row = run(&e, &MatchState::new(), FeatureLayout::Extended);
        assert_eq!(
            &row[SLOT_FREEZE_FRAME_META..SLOT_FREEZE_FRAME_META + 4],
            &[1.0, 1.0 / 25.0, 0.5, 1.0]
        );
        assert!(row[SLOT_FREEZE_FRAME_META + 4..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn oversize_freeze_frame_is_truncated() {
        let frame: Vec<Value> = (0..25)
            .map(|i| json!({"location": [i as f64 * 3.75, 10.0]}))
            .collect();
        let e = event_with(16, "shot", json!({"freeze_frame": frame}));
        let row = run(&e, &MatchState::new(), FeatureLayout::Compact);
        assert_eq!(row.len(), VECTOR_SIZE);
        assert_eq!(row[VECTOR_SIZE - 2], 0.65625, "22nd player is the last encoded");
    }

    #[test]
    fn unknown_category_in_sub_object_fails() {
        let e = event_with(16, "shot", json!({"outcome": {"id": 1}}));
        let mut row = vec![0.0; VECTOR_SIZE];
        let err = extract_specific(
            &e,
            EventType::Shot,
            &MatchState::new(),
            FeatureLayout::Compact,
            &mut row,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Field(FieldError::UnknownCategory { value: 1, .. })
        ));
    }
}
