//! StatsBomb event type definitions.
//!
//! All 34 event types of the open-data schema are enumerated in ascending id
//! order. Type metadata (upstream id, display name, the JSON key of the nested
//! detail object, and whether the type is discarded from the output) is stored
//! in a compile-time lookup table indexed by the `EventType` discriminant.

/// The number of known event types.
pub const EVENT_TYPE_COUNT: usize = 34;

/// A StatsBomb event type.
///
/// Variants are in ascending order of their upstream id. The `#[repr(u8)]`
/// attribute enables use as an array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    BallRecovery = 0,     // 2
    Dispossessed = 1,     // 3
    Duel = 2,             // 4
    CameraOn = 3,         // 5
    Block = 4,            // 6
    Offside = 5,          // 8
    Clearance = 6,        // 9
    Interception = 7,     // 10
    Dribble = 8,          // 14
    Shot = 9,             // 16
    Pressure = 10,        // 17
    HalfStart = 11,       // 18
    Substitution = 12,    // 19
    OwnGoalAgainst = 13,  // 20
    FoulWon = 14,         // 21
    FoulCommitted = 15,   // 22
    GoalKeeper = 16,      // 23
    BadBehaviour = 17,    // 24
    OwnGoalFor = 18,      // 25
    PlayerOn = 19,        // 26
    PlayerOff = 20,       // 27
    Shield = 21,          // 28
    Pass = 22,            // 30
    FiftyFifty = 23,      // 33
    HalfEnd = 24,         // 34
    StartingXi = 25,      // 35
    TacticalShift = 26,   // 36
    Error = 27,           // 37
    Miscontrol = 28,      // 38
    DribbledPast = 29,    // 39
    InjuryStoppage = 30,  // 40
    RefereeBallDrop = 31, // 41
    BallReceipt = 32,     // 42
    Carry = 33,           // 43
}

/// All event type variants in index order.
pub const ALL_EVENT_TYPES: [EventType; EVENT_TYPE_COUNT] = [
    EventType::BallRecovery, EventType::Dispossessed, EventType::Duel,
    EventType::CameraOn, EventType::Block, EventType::Offside,
    EventType::Clearance, EventType::Interception, EventType::Dribble,
    EventType::Shot, EventType::Pressure, EventType::HalfStart,
    EventType::Substitution, EventType::OwnGoalAgainst, EventType::FoulWon,
    EventType::FoulCommitted, EventType::GoalKeeper, EventType::BadBehaviour,
    EventType::OwnGoalFor, EventType::PlayerOn, EventType::PlayerOff,
    EventType::Shield, EventType::Pass, EventType::FiftyFifty,
    EventType::HalfEnd, EventType::StartingXi, EventType::TacticalShift,
    EventType::Error, EventType::Miscontrol, EventType::DribbledPast,
    EventType::InjuryStoppage, EventType::RefereeBallDrop, EventType::BallReceipt,
    EventType::Carry,
];

impl EventType {
    /// Returns the upstream StatsBomb type id.
    pub const fn id(self) -> u64 {
        EVENT_TYPE_INFO[self as usize].id
    }

    /// Returns the upstream display name.
    pub const fn name(self) -> &'static str {
        EVENT_TYPE_INFO[self as usize].name
    }

    /// Returns the JSON key under which this type's detail object lives, if any.
    pub const fn detail_key(self) -> Option<&'static str> {
        EVENT_TYPE_INFO[self as usize].detail_key
    }

    /// Returns true if events of this type produce no output row.
    pub const fn is_discarded(self) -> bool {
        EVENT_TYPE_INFO[self as usize].discarded
    }

    /// Looks up an event type by its upstream id.
    pub fn from_id(id: u64) -> Option<EventType> {
        ALL_EVENT_TYPES.iter().copied().find(|t| t.id() == id)
    }
}

/// Static metadata for an event type.
pub struct EventTypeInfo {
    pub id: u64,
    pub name: &'static str,
    pub detail_key: Option<&'static str>,
    pub discarded: bool,
}

/// Compile-time lookup table: index by `EventType as usize`.
pub static EVENT_TYPE_INFO: [EventTypeInfo; EVENT_TYPE_COUNT] = [
    EventTypeInfo { id: 2, name: "Ball Recovery", detail_key: Some("ball_recovery"), discarded: false },
    EventTypeInfo { id: 3, name: "Dispossessed", detail_key: None, discarded: false },
    EventTypeInfo { id: 4, name: "Duel", detail_key: Some("duel"), discarded: false },
    EventTypeInfo { id: 5, name: "Camera On", detail_key: None, discarded: true },
    EventTypeInfo { id: 6, name: "Block", detail_key: Some("block"), discarded: false },
    EventTypeInfo { id: 8, name: "Offside", detail_key: None, discarded: false },
    EventTypeInfo { id: 9, name: "Clearance", detail_key: Some("clearance"), discarded: false },
    EventTypeInfo { id: 10, name: "Interception", detail_key: Some("interception"), discarded: false },
    EventTypeInfo { id: 14, name: "Dribble", detail_key: Some("dribble"), discarded: false },
    EventTypeInfo { id: 16, name: "Shot", detail_key: Some("shot"), discarded: false },
    EventTypeInfo { id: 17, name: "Pressure", detail_key: None, discarded: false },
    EventTypeInfo { id: 18, name: "Half Start", detail_key: None, discarded: true },
    EventTypeInfo { id: 19, name: "Substitution", detail_key: Some("substitution"), discarded: false },
    EventTypeInfo { id: 20, name: "Own Goal Against", detail_key: None, discarded: false },
    EventTypeInfo { id: 21, name: "Foul Won", detail_key: Some("foul_won"), discarded: false },
    EventTypeInfo { id: 22, name: "Foul Committed", detail_key: Some("foul_committed"), discarded: false },
    EventTypeInfo { id: 23, name: "Goal Keeper", detail_key: Some("goalkeeper"), discarded: false },
    EventTypeInfo { id: 24, name: "Bad Behaviour", detail_key: Some("bad_behaviour"), discarded: false },
    EventTypeInfo { id: 25, name: "Own Goal For", detail_key: None, discarded: false },
    EventTypeInfo { id: 26, name: "Player On", detail_key: None, discarded: false },
    EventTypeInfo { id: 27, name: "Player Off", detail_key: Some("player_off"), discarded: false },
    EventTypeInfo { id: 28, name: "Shield", detail_key: None, discarded: false },
    EventTypeInfo { id: 30, name: "Pass", detail_key: Some("pass"), discarded: false },
    EventTypeInfo { id: 33, name: "50/50", detail_key: Some("50_50"), discarded: false },
    EventTypeInfo { id: 34, name: "Half End", detail_key: None, discarded: true },
    EventTypeInfo { id: 35, name: "Starting XI", detail_key: None, discarded: true },
    EventTypeInfo { id: 36, name: "Tactical Shift", detail_key: None, discarded: true },
    EventTypeInfo { id: 37, name: "Error", detail_key: None, discarded: false },
    EventTypeInfo { id: 38, name: "Miscontrol", detail_key: Some("miscontrol"), discarded: false },
    EventTypeInfo { id: 39, name: "Dribbled Past", detail_key: None, discarded: false },
    EventTypeInfo { id: 40, name: "Injury Stoppage", detail_key: Some("injury_stoppage"), discarded: false },
    EventTypeInfo { id: 41, name: "Referee Ball-Drop", detail_key: None, discarded: false },
    EventTypeInfo { id: 42, name: "Ball Receipt*", detail_key: Some("ball_receipt"), discarded: false },
    EventTypeInfo { id: 43, name: "Carry", detail_key: Some("carry"), discarded: false },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_discriminants() {
        for (i, t) in ALL_EVENT_TYPES.iter().enumerate() {
            assert_eq!(*t as usize, i, "{:?} out of place", t);
        }
    }

    #[test]
    fn ids_are_strictly_ascending() {
        for pair in EVENT_TYPE_INFO.windows(2) {
            assert!(pair[0].id < pair[1].id, "{} !< {}", pair[0].id, pair[1].id);
        }
    }

    #[test]
    fn from_id_round_trips() {
        for t in ALL_EVENT_TYPES {
            assert_eq!(EventType::from_id(t.id()), Some(t));
        }
        assert_eq!(EventType::from_id(1), None);
        assert_eq!(EventType::from_id(7), None);
        assert_eq!(EventType::from_id(44), None);
    }

    #[test]
    fn discarded_set() {
        let discarded: Vec<u64> = ALL_EVENT_TYPES
            .iter()
            .filter(|t| t.is_discarded())
            .map(|t| t.id())
            .collect();
        assert_eq!(discarded, vec![5, 18, 34, 35, 36]);
    }
}
