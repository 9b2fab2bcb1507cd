//! Touchline: StatsBomb event tokenizer.
//!
//! Turns a match's event list into a matrix of fixed-width feature rows, one
//! per kept event, with every value in [0, 1]. Also validates rows (tokenized
//! or generated) against the slot layout and runs batches of matches in
//! parallel.

pub mod anonymize;
pub mod batch;
pub mod clock;
pub mod config;
pub mod encoding;
pub mod export;
pub mod extract;
pub mod schema;
pub mod source;
pub mod tokenizer;
pub mod validate;

pub use config::TokenizerConfig;
pub use encoding::FeatureLayout;
pub use schema::{Event, EventType};
pub use tokenizer::{tokenize_match, TokenMatrix, TokenizeError, Tokenizer};
pub use validate::{SequenceReport, Strictness, Validator, ValidatorConfig};
