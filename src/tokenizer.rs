//! Match tokenizer.
//!
//! Walks one match's events in timeline order and produces one row per
//! non-discarded event. Discarded events (period markers, lineups, camera
//! notes) produce no row but still update the match state.

use thiserror::Error;
use tracing::{debug, warn};

use crate::anonymize::{AnonymizeError, MatchState};
use crate::clock::MatchClock;
use crate::encoding::field::{category_id, lookup};
use crate::encoding::{FeatureLayout, FieldError};
use crate::extract::{extract_common, extract_specific, observe_teams, ExtractError};
use crate::schema::{Event, EventType};

/// Fatal error for one match. `index` is the event's position in the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenizeError {
    #[error("event {index}: unregistered event type {type_id}")]
    SchemaDrift { index: usize, type_id: u64 },
    #[error("event {index}: {source}")]
    Field { index: usize, source: FieldError },
    #[error("event {index}: {source}")]
    Anonymize {
        index: usize,
        source: AnonymizeError,
    },
}

impl TokenizeError {
    fn at(index: usize, err: ExtractError) -> Self {
        match err {
            ExtractError::Field(source) => TokenizeError::Field { index, source },
            ExtractError::Anonymize(source) => TokenizeError::Anonymize { index, source },
        }
    }

    /// Position of the offending event.
    pub fn index(&self) -> usize {
        match self {
            TokenizeError::SchemaDrift { index, .. }
            | TokenizeError::Field { index, .. }
            | TokenizeError::Anonymize { index, .. } => *index,
        }
    }
}

/// Row-major matrix of encoded events.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMatrix {
    width: usize,
    data: Vec<f32>,
    /// Input position of the event behind each row.
    source_index: Vec<usize>,
}

impl TokenMatrix {
    pub fn new(width: usize) -> Self {
        Self::with_capacity(width, 0)
    }

    pub fn with_capacity(width: usize, rows: usize) -> Self {
        TokenMatrix {
            width,
            data: Vec::with_capacity(width * rows),
            source_index: Vec::with_capacity(rows),
        }
    }

    /// Appends a row. `row` must be exactly `width` long.
    pub fn push_row(&mut self, source_index: usize, row: &[f32]) {
        debug_assert_eq!(row.len(), self.width);
        self.data.extend_from_slice(row);
        self.source_index.push(source_index);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.source_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_index.is_empty()
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.width..(i + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.width.max(1))
    }

    pub fn source_index(&self, i: usize) -> usize {
        self.source_index[i]
    }

    pub fn source_indices(&self) -> &[usize] {
        &self.source_index
    }

    /// Flat row-major data.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Copies the matrix into a `(rows, width)` array.
    #[cfg(feature = "ndarray")]
    pub fn to_array2(&self) -> Result<ndarray::Array2<f32>, ndarray::ShapeError> {
        ndarray::Array2::from_shape_vec((self.len(), self.width), self.data.clone())
    }
}

/// Tokenizes matches under one layout. Holds no per-match state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    layout: FeatureLayout,
}

impl Tokenizer {
    pub fn new(layout: FeatureLayout) -> Self {
        Tokenizer { layout }
    }

    pub fn layout(&self) -> FeatureLayout {
        self.layout
    }

    /// Tokenizes one match with fresh state.
    pub fn tokenize(&self, events: &[Event]) -> Result<TokenMatrix, TokenizeError> {
        let minute = MatchClock::scan(events).minute_range();
        let mut state = MatchState::new();
        let width = self.layout.width();
        let mut matrix = TokenMatrix::with_capacity(width, events.len());
        let mut row = vec![0.0f32; width];

        for (index, event) in events.iter().enumerate() {
            let kind = event.kind().ok_or(TokenizeError::SchemaDrift {
                index,
                type_id: event.event_type.id,
            })?;

            if kind.is_discarded() {
                apply_discarded(event, kind, &mut state)
                    .map_err(|e| TokenizeError::at(index, e))?;
                continue;
            }

            row.fill(0.0);
            extract_common(event, &mut state, minute, &mut row)
                .map_err(|e| TokenizeError::at(index, e))?;
            extract_specific(event, kind, &state, self.layout, &mut row)
                .map_err(|e| TokenizeError::at(index, e))?;
            matrix.push_row(index, &row);

            if kind == EventType::Substitution {
                apply_substitution(event, &mut state)
                    .map_err(|e| TokenizeError::at(index, e.into()))?;
            }
        }

        debug!(
            events = events.len(),
            rows = matrix.len(),
            max_minute = minute.max,
            "match tokenized"
        );
        Ok(matrix)
    }
}

/// Tokenizes one match under `layout`.
pub fn tokenize_match(
    events: &[Event],
    layout: FeatureLayout,
) -> Result<TokenMatrix, TokenizeError> {
    Tokenizer::new(layout).tokenize(events)
}

fn apply_discarded(
    event: &Event,
    kind: EventType,
    state: &mut MatchState,
) -> Result<(), ExtractError> {
    observe_teams(event, state)?;
    if matches!(kind, EventType::StartingXi | EventType::TacticalShift) {
        match (event.team_id(), &event.tactics) {
            (Some(team), Some(tactics)) => state.update_lineup(team, &tactics.lineup),
            _ => warn!(index = event.index, "lineup event without team or tactics"),
        }
    }
    Ok(())
}

fn apply_substitution(event: &Event, state: &mut MatchState) -> Result<(), FieldError> {
    let replacement = match event.sub_object() {
        Some(sub) => category_id(lookup(sub, "replacement"), "replacement")?,
        None => None,
    };
    match (event.team_id(), event.player_id(), replacement) {
        (Some(team), Some(off), Some(on)) => {
            let position = event.position.as_ref().map(|p| p.id);
            state.apply_substitution(team, off, on, position);
        }
        _ => warn!(index = event.index, "substitution without team, player or replacement"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::layout::*;
    use crate::schema::{IdName, LineupEntry, Tactics};
    use serde_json::json;

    fn starting_xi(team: u64, players: &[(u64, u64)]) -> Event {
        let mut e = Event::new(35, 1, 0, 0);
        e.team = Some(IdName::new(team));
        e.tactics = Some(Tactics {
            formation: Some(442),
            lineup: players
                .iter()
                .map(|&(p, pos)| LineupEntry {
                    player: IdName::new(p),
                    position: IdName::new(pos),
                    jersey_number: None,
                })
                .collect(),
        });
        e
    }

    fn on_ball(type_id: u64, team: u64, player: u64, minute: u64) -> Event {
        let mut e = Event::new(type_id, 1, minute, 0);
        e.team = Some(IdName::new(team));
        e.possession_team = Some(IdName::new(team));
        e.player = Some(IdName::new(player));
        e
    }

    #[test]
    fn discarded_events_emit_no_rows_but_set_state() {
        let events = vec![
            Event::new(18, 1, 0, 0),
            starting_xi(100, &[(1, 1)]),
            starting_xi(200, &[(2, 1)]),
            on_ball(43, 100, 1, 1),
            Event::new(34, 1, 45, 0),
        ];
        let m = tokenize_match(&events, FeatureLayout::Compact).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.source_index(0), 3);
        assert_eq!(m.row(0)[SLOT_TEAM], 0.0);
        assert_eq!(m.row(0)[SLOT_PLAYER_POSITION], 1.0 / 25.0);
    }

    #[test]
    fn team_codes_follow_lineup_order() {
        let mut e = on_ball(43, 100, 1, 1);
        e.possession_team = Some(IdName::new(200));
        let events = vec![starting_xi(100, &[]), starting_xi(200, &[]), e];
        let m = tokenize_match(&events, FeatureLayout::Compact).unwrap();
        assert_eq!(m.row(0)[SLOT_TEAM], 0.0);
        assert_eq!(m.row(0)[SLOT_POSSESSION_TEAM], 1.0);
    }

    #[test]
    fn third_team_aborts_the_match() {
        let events = vec![on_ball(43, 1, 5, 0), on_ball(43, 2, 6, 0), on_ball(43, 3, 7, 1)];
        let err = tokenize_match(&events, FeatureLayout::Compact).unwrap_err();
        assert!(matches!(err, TokenizeError::Anonymize { index: 2, .. }));
    }

    #[test]
    fn unregistered_type_is_schema_drift() {
        let events = vec![on_ball(43, 1, 5, 0), Event::new(7, 1, 0, 0)];
        let err = tokenize_match(&events, FeatureLayout::Compact).unwrap_err();
        assert_eq!(err, TokenizeError::SchemaDrift { index: 1, type_id: 7 });
        assert_eq!(err.to_string(), "event 1: unregistered event type 7");
    }

    #[test]
    fn minute_is_normalized_against_match_max() {
        let mut late = on_ball(43, 1, 5, 90);
        late.period = 2;
        let events = vec![on_ball(43, 1, 5, 0), on_ball(43, 1, 5, 45), late];
        let m = tokenize_match(&events, FeatureLayout::Compact).unwrap();
        assert_eq!(m.row(0)[SLOT_MINUTE], 0.0);
        assert_eq!(m.row(1)[SLOT_MINUTE], 0.5);
        assert_eq!(m.row(2)[SLOT_MINUTE], 1.0);
    }

    #[test]
    fn substitution_updates_later_rows() {
        let mut sub = on_ball(19, 100, 8, 60);
        sub.position = Some(IdName::new(10));
        sub.details.insert(
            "substitution".into(),
            json!({"outcome": {"id": 103}, "replacement": {"id": 80}}),
        );
        let mut pass = on_ball(30, 100, 1, 61);
        pass.details.insert("pass".into(), json!({"recipient": {"id": 80}}));
        let events = vec![starting_xi(100, &[(1, 1), (8, 10)]), sub, pass];

        let m = tokenize_match(&events, FeatureLayout::Compact).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.row(0)[SLOT_SUBSTITUTION + 1], 10.0 / 25.0);
        assert_eq!(m.row(0)[SLOT_PLAYER_POSITION], 10.0 / 25.0);
        assert_eq!(m.row(1)[SLOT_INTERCEPTION - 1], 10.0 / 25.0, "replacement resolved");
    }

    #[test]
    fn retokenizing_is_identical() {
        let events = vec![
            starting_xi(100, &[(1, 1)]),
            on_ball(43, 100, 1, 3),
            on_ball(42, 200, 2, 4),
        ];
        let a = tokenize_match(&events, FeatureLayout::Extended).unwrap();
        let b = tokenize_match(&events, FeatureLayout::Extended).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.width(), EXTENDED_VECTOR_SIZE);
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn matrix_converts_to_array() {
        let events = vec![on_ball(43, 100, 1, 3), on_ball(42, 100, 1, 4)];
        let m = tokenize_match(&events, FeatureLayout::Compact).unwrap();
        let a = m.to_array2().unwrap();
        assert_eq!(a.shape(), &[2, VECTOR_SIZE]);
        assert_eq!(a[[1, SLOT_EVENT_TYPE]], m.row(1)[SLOT_EVENT_TYPE]);
    }

    #[test]
    fn bad_behaviour_card_tokenizes() {
        let mut e = on_ball(24, 100, 1, 30);
        e.details.insert(
            "bad_behaviour".into(),
            json!({"card": {"id": 65, "name": "Yellow Card"}}),
        );
        let m = tokenize_match(&[e], FeatureLayout::Compact).unwrap();
        assert_eq!(m.row(0)[SLOT_BAD_BEHAVIOUR], 1.0 / 3.0);
    }

    #[test]
    fn empty_match_is_empty_matrix() {
        let m = tokenize_match(&[], FeatureLayout::Compact).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.rows().count(), 0);
    }
}
