//! Event -> row extraction.
//!
//! `common` fills the slots shared by every event; `specific` applies the
//! declarative per-type field tables from `mapping`.

pub mod common;
pub mod mapping;
pub mod specific;

use thiserror::Error;

use crate::anonymize::AnonymizeError;
use crate::encoding::FieldError;

pub use common::{extract_common, observe_teams};
pub use specific::extract_specific;

/// Failure while extracting one event.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error(transparent)]
    Anonymize(#[from] AnonymizeError),
}
