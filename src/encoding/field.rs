//! Field encoders and the declarative field specification.
//!
//! A `FieldSpec` binds a path inside an event's sub-object to an output slot
//! and an `Encoder`. The three table-driven encoders are applied here; the
//! custom derivations need match state and are applied by the extractors.

use serde_json::{Map, Value};

use super::ranges::{flag, Range};
use super::vocab::{FieldError, Vocabulary};

/// A derivation that needs more than the raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Custom {
    /// Pass recipient id resolved to the recipient's lineup position.
    RecipientPosition,
    /// Position of the player leaving in a substitution.
    ReplacementPosition,
    /// Shot freeze-frame list spread over the trailing coordinate slots.
    FreezeFrame,
}

/// How one raw field value becomes one slot value.
#[derive(Debug, Clone, Copy)]
pub enum Encoder {
    Categorize(&'static Vocabulary),
    Flag,
    Normalize(Range),
    Custom(Custom),
}

/// One nested field of a type-specific sub-object.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub path: &'static str,
    pub slot: usize,
    pub encoder: Encoder,
}

impl FieldSpec {
    pub const fn new(path: &'static str, slot: usize, encoder: Encoder) -> Self {
        FieldSpec {
            path,
            slot,
            encoder,
        }
    }
}

impl Encoder {
    /// Encodes a raw value read from a present sub-object.
    ///
    /// A missing flag reads as false, since the upstream feed omits false
    /// flags. Custom encoders return 0 here.
    pub fn encode(&self, raw: Option<&Value>, field: &'static str) -> Result<f32, FieldError> {
        match self {
            Encoder::Categorize(vocab) => vocab.encode(category_id(raw, field)?),
            Encoder::Flag => Ok(flag(Some(boolean(raw, field)?))),
            Encoder::Normalize(range) => Ok(range.encode(number(raw, field)?)),
            Encoder::Custom(_) => Ok(0.0),
        }
    }
}

/// Resolves a dotted path with optional array indices, e.g. `end_location[2]`
/// or `recipient.id`.
pub fn lookup<'a>(obj: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = index_segment(obj, segments.next()?)?;
    for segment in segments {
        current = index_segment(current.as_object()?, segment)?;
    }
    Some(current)
}

fn index_segment<'a>(obj: &'a Map<String, Value>, segment: &str) -> Option<&'a Value> {
    match segment.split_once('[') {
        None => obj.get(segment),
        Some((key, rest)) => {
            let i: usize = rest.strip_suffix(']')?.parse().ok()?;
            obj.get(key)?.as_array()?.get(i)
        }
    }
}

/// Reads a categorical id from an `{ "id": .. }` object or a bare integer.
pub fn category_id(raw: Option<&Value>, field: &'static str) -> Result<Option<u64>, FieldError> {
    let malformed = FieldError::Malformed {
        field,
        expected: "an id reference",
    };
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(o)) => match o.get("id") {
            Some(Value::Number(n)) => n.as_u64().map(Some).ok_or(malformed),
            _ => Err(malformed),
        },
        Some(Value::Number(n)) => n.as_u64().map(Some).ok_or(malformed),
        Some(_) => Err(malformed),
    }
}

pub fn number(raw: Option<&Value>, field: &'static str) -> Result<Option<f64>, FieldError> {
    match raw {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(FieldError::Malformed {
            field,
            expected: "a number",
        }),
    }
}

pub fn boolean(raw: Option<&Value>, field: &'static str) -> Result<bool, FieldError> {
    match raw {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(FieldError::Malformed {
            field,
            expected: "a boolean",
        }),
    }
}
