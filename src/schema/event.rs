//! Structured form of one StatsBomb event record.
//!
//! Only the attributes shared by every event are typed. The type-specific
//! nested object (`pass`, `shot`, `duel`, ...) is kept as raw JSON in
//! `details` and read through path lookups by the extractors, since its
//! shape depends on the event type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::event_type::EventType;

/// An `{ "id": .., "name": .. }` reference, the shape StatsBomb uses for
/// every enumerated or identified value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdName {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl IdName {
    pub fn new(id: u64) -> Self {
        IdName { id, name: None }
    }
}

/// One player entry in a `tactics.lineup` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub player: IdName,
    pub position: IdName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u32>,
}

/// The `tactics` block of starting XI and tactical shift events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tactics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formation: Option<u32>,
    #[serde(default)]
    pub lineup: Vec<LineupEntry>,
}

/// A single match event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub index: usize,
    #[serde(rename = "type")]
    pub event_type: IdName,
    pub period: u64,
    pub minute: u64,
    pub second: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<IdName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possession_team: Option<IdName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play_pattern: Option<IdName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player: Option<IdName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<IdName>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub under_pressure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpress: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tactics: Option<Tactics>,
    /// Every remaining key, including the type-specific sub-object.
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Event {
    /// Creates a bare event of the given type, used mostly by tests and benches.
    pub fn new(type_id: u64, period: u64, minute: u64, second: u64) -> Self {
        Event {
            id: None,
            index: 0,
            event_type: IdName::new(type_id),
            period,
            minute,
            second,
            location: None,
            team: None,
            possession_team: None,
            play_pattern: None,
            player: None,
            position: None,
            duration: None,
            under_pressure: None,
            out: None,
            counterpress: None,
            tactics: None,
            details: Map::new(),
        }
    }

    /// Returns the known event type, or `None` for an unregistered id.
    pub fn kind(&self) -> Option<EventType> {
        EventType::from_id(self.event_type.id)
    }

    /// Returns a raw top-level key that is not one of the typed attributes.
    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details.get(key)
    }

    /// Returns the type-specific sub-object for this event, if present and
    /// shaped as a JSON object.
    pub fn sub_object(&self) -> Option<&Map<String, Value>> {
        let key = self.kind()?.detail_key()?;
        self.details.get(key)?.as_object()
    }

    pub fn team_id(&self) -> Option<u64> {
        self.team.as_ref().map(|t| t.id)
    }

    pub fn possession_team_id(&self) -> Option<u64> {
        self.possession_team.as_ref().map(|t| t.id)
    }

    pub fn player_id(&self) -> Option<u64> {
        self.player.as_ref().map(|p| p.id)
    }

    /// Timeline key used for chronological checks.
    pub fn clock(&self) -> (u64, u64, u64) {
        (self.period, self.minute, self.second)
    }
}
