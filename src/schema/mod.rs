//! Input schema: event records and the closed set of event types.

pub mod event;
pub mod event_type;

pub use event::{Event, IdName, LineupEntry, Tactics};
pub use event_type::{EventType, ALL_EVENT_TYPES, EVENT_TYPE_COUNT, EVENT_TYPE_INFO};
