//! Per-field encoding: category tables, normalization ranges, encoders, and
//! the slot layout they write into.

pub mod field;
pub mod layout;
pub mod ranges;
pub mod vocab;

pub use field::{Custom, Encoder, FieldSpec};
pub use layout::{FeatureLayout, EXTENDED_VECTOR_SIZE, FREEZE_FRAME_PLAYERS, VECTOR_SIZE};
pub use ranges::{flag, Range};
pub use vocab::{FieldError, Vocabulary};
