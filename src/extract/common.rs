//! Common block: slots 0..15, filled for every emitted row.

use crate::anonymize::MatchState;
use crate::encoding::layout::*;
use crate::encoding::ranges::{self, flag, Range};
use crate::encoding::vocab;
use crate::schema::Event;

use super::ExtractError;

/// Writes the common block of `row`.
///
/// Team and possession team are resolved through `state`, which assigns new
/// codes on first sight. The acting player's position reflects the lineup
/// before this event's own side effects.
pub fn extract_common(
    event: &Event,
    state: &mut MatchState,
    minute: Range,
    row: &mut [f32],
) -> Result<(), ExtractError> {
    row[SLOT_EVENT_TYPE] = vocab::EVENT_TYPE.encode(Some(event.event_type.id))?;
    row[SLOT_PLAY_PATTERN] = vocab::PLAY_PATTERN.encode(event.play_pattern.as_ref().map(|p| p.id))?;

    if let Some([x, y, ..]) = event.location.as_deref() {
        row[SLOT_LOCATION_X] = ranges::PITCH_X.normalize(*x);
        row[SLOT_LOCATION_Y] = ranges::PITCH_Y.normalize(*y);
    }
    row[SLOT_DURATION] = ranges::DURATION.encode(event.duration);

    row[SLOT_UNDER_PRESSURE] = flag(Some(event.under_pressure.unwrap_or(false)));
    row[SLOT_OUT] = flag(Some(event.out.unwrap_or(false)));
    row[SLOT_COUNTERPRESS] = flag(Some(event.counterpress.unwrap_or(false)));

    row[SLOT_PERIOD] = vocab::PERIOD.encode(Some(event.period))?;
    row[SLOT_SECOND] = vocab::SECOND.encode(Some(event.second))?;
    row[SLOT_POSITION] = vocab::POSITION.encode(event.position.as_ref().map(|p| p.id))?;
    row[SLOT_MINUTE] = minute.normalize(event.minute as f64);

    let (team, possession) = observe_teams(event, state)?;
    row[SLOT_TEAM] = team.map_or(0.0, f32::from);
    row[SLOT_POSSESSION_TEAM] = possession.map_or(0.0, f32::from);

    let acting = event.player_id().and_then(|p| state.resolve_position(p));
    row[SLOT_PLAYER_POSITION] = vocab::POSITION.encode(acting)?;
    Ok(())
}

/// Resolves the team and possession team of an event, registering unseen ids.
pub fn observe_teams(
    event: &Event,
    state: &mut MatchState,
) -> Result<(Option<u8>, Option<u8>), ExtractError> {
    let team = event.team_id().map(|t| state.resolve_team(t)).transpose()?;
    let possession = event
        .possession_team_id()
        .map(|t| state.resolve_team(t))
        .transpose()?;
    Ok((team, possession))
}
