//! Row and sequence validation.
//!
//! Checks that rows (tokenized or produced by a generative model) are
//! well-formed under the slot layout: every slot of the common block and of
//! the event's own region lies in its encoder's domain, and every other slot
//! is 0. Sequence checks add chronology, possession continuity, location
//! jumps and time gaps between consecutive rows. `align_row` snaps generated
//! rows onto the nearest well-formed values.

pub mod report;
pub mod slots;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::encoding::layout::*;
use crate::encoding::{ranges, vocab};
use crate::schema::EventType;
use crate::tokenizer::TokenMatrix;

pub use report::{Issue, IssueCode, RowReport, SequenceReport, Severity};
use slots::{common_slots, region_slots, SlotKind};

/// Approximate pitch diagonal in metres, used to scale normalized distances.
const PITCH_DIAGONAL: f32 = 145.0;

/// Shots from below this normalized x are taken from deep in the shooter's half.
const OWN_HALF_SHOT_X: f32 = 0.3;

/// Goalkeeper actions are expected within this normalized distance of either goal line.
const GOALKEEPER_AREA_X: f32 = 0.2;

/// Largest tolerated gap in metres between a pass's length and its start-to-end distance.
const MAX_PASS_LENGTH_GAP: f64 = 10.0;

/// Event types across which the possession team may flip.
const POSSESSION_CHANGE_EVENTS: [EventType; 13] = [
    EventType::Interception,
    EventType::Duel,
    EventType::FiftyFifty,
    EventType::Pass,
    EventType::Shot,
    EventType::Clearance,
    EventType::Miscontrol,
    EventType::Dispossessed,
    EventType::DribbledPast,
    EventType::Error,
    EventType::FoulWon,
    EventType::FoulCommitted,
    EventType::GoalKeeper,
];

/// Selects how harshly soft problems are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Strict,
    #[default]
    Moderate,
    Lenient,
}

impl FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Strictness::Strict),
            "moderate" => Ok(Strictness::Moderate),
            "lenient" => Ok(Strictness::Lenient),
            other => Err(format!("unknown strictness '{}'", other)),
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strictness::Strict => write!(f, "strict"),
            Strictness::Moderate => write!(f, "moderate"),
            Strictness::Lenient => write!(f, "lenient"),
        }
    }
}

/// Validator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub strictness: Strictness,
    /// Largest gap in seconds between consecutive rows of one period.
    pub max_time_gap: f64,
    /// Largest distance in metres between consecutive row locations.
    pub max_location_jump: f64,
    /// Minute bound the minute slot was normalized against.
    pub max_minute: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            strictness: Strictness::Moderate,
            max_time_gap: 30.0,
            max_location_jump: 70.0,
            max_minute: 90,
        }
    }
}

/// Validates rows of one layout.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidatorConfig,
    layout: FeatureLayout,
}

impl Validator {
    pub fn new(config: ValidatorConfig, layout: FeatureLayout) -> Self {
        Validator { config, layout }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Sets the minute bound, e.g. from the match clock of a tokenized match.
    pub fn with_max_minute(mut self, max_minute: u64) -> Self {
        self.config.max_minute = max_minute.max(1);
        self
    }

    /// Error unless lenient, then warning.
    fn hard(&self) -> Severity {
        match self.config.strictness {
            Strictness::Lenient => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Warning unless lenient, then info.
    fn soft(&self) -> Severity {
        match self.config.strictness {
            Strictness::Lenient => Severity::Info,
            _ => Severity::Warning,
        }
    }

    /// Validates a single row.
    pub fn validate_row(&self, row: &[f32]) -> RowReport {
        let mut report = RowReport::new();
        let width = self.layout.width();
        if row.len() != width {
            report.push(Issue::new(
                IssueCode::InvalidVectorSize,
                Severity::Error,
                format!("expected {} slots, got {}", width, row.len()),
            ));
            return report;
        }

        let nan: Vec<usize> = (0..width).filter(|&i| row[i].is_nan()).collect();
        if let Some(&first) = nan.first() {
            report.push(
                Issue::new(
                    IssueCode::NanValues,
                    Severity::Error,
                    format!("{} NaN slots", nan.len()),
                )
                .at_slot(first),
            );
        }
        let outside: Vec<usize> = (0..width)
            .filter(|&i| row[i] < 0.0 || row[i] > 1.0)
            .collect();
        if let Some(&first) = outside.first() {
            report.push(
                Issue::new(
                    IssueCode::ValuesOutOfRange,
                    Severity::Error,
                    format!("{} slots outside [0, 1]", outside.len()),
                )
                .at_slot(first),
            );
        }

        let Some(kind) = decode_event_type(row[SLOT_EVENT_TYPE]) else {
            report.push(
                Issue::new(
                    IssueCode::UnknownEventType,
                    Severity::Error,
                    format!("slot value {} is not an event type", row[SLOT_EVENT_TYPE]),
                )
                .at_slot(SLOT_EVENT_TYPE),
            );
            return report;
        };
        report.event_type = Some(kind.id());

        let region = region_slots(kind, self.layout);
        for (slot, slot_kind) in common_slots().skip(1).chain(region.iter().copied()) {
            self.check_slot(row, slot, slot_kind, &mut report);
        }

        let mut owned = vec![false; width];
        owned[..COMMON_WIDTH].fill(true);
        for (slot, _) in &region {
            owned[*slot] = true;
        }
        let stray: Vec<usize> = (0..width).filter(|&i| !owned[i] && row[i] != 0.0).collect();
        if let Some(&first) = stray.first() {
            let severity = match self.config.strictness {
                Strictness::Strict => Severity::Error,
                Strictness::Moderate => Severity::Warning,
                Strictness::Lenient => Severity::Info,
            };
            report.push(
                Issue::new(
                    IssueCode::StraySlot,
                    severity,
                    format!("{} slots set outside the {} region", stray.len(), kind.name()),
                )
                .at_slot(first),
            );
        }

        self.check_semantics(row, kind, &mut report);
        debug!(
            event_type = kind.id(),
            issues = report.issues.len(),
            "row validated"
        );
        report
    }

    fn check_slot(&self, row: &[f32], slot: usize, kind: SlotKind, report: &mut RowReport) {
        let v = row[slot];
        if v.is_nan() || kind.admits(v) {
            return;
        }
        let code = match kind {
            SlotKind::Categorical(_) => IssueCode::CategoricalOutOfRange,
            SlotKind::Flag => IssueCode::BooleanOutOfRange,
            SlotKind::Team => IssueCode::TeamOutOfRange,
            // Already reported as out of [0, 1].
            SlotKind::Range => return,
        };
        report.push(Issue::new(code, Severity::Error, format!("value {}", v)).at_slot(slot));
    }

    fn check_semantics(&self, row: &[f32], kind: EventType, report: &mut RowReport) {
        let start = (row[SLOT_LOCATION_X], row[SLOT_LOCATION_Y]);
        match kind {
            EventType::Pass => self.check_pass(row, start, report),
            EventType::Carry => {
                let end = (row[SLOT_CARRY], row[SLOT_CARRY + 1]);
                if has_location(start) && has_location(end) && distance(start, end) < 0.01 {
                    report.push(Issue::new(
                        IssueCode::CarryNoMovement,
                        self.hard(),
                        "carry ends where it starts",
                    ));
                }
            }
            EventType::Shot => self.check_shot(row, start, report),
            EventType::GoalKeeper => {
                let x = start.0;
                if (GOALKEEPER_AREA_X..=1.0 - GOALKEEPER_AREA_X).contains(&x) {
                    report.push(
                        Issue::new(
                            IssueCode::GoalkeeperUnusualLocation,
                            self.soft(),
                            format!("goalkeeper action at x={:.3}", x),
                        )
                        .at_slot(SLOT_LOCATION_X),
                    );
                }
            }
            _ => {}
        }
    }

    fn check_pass(&self, row: &[f32], start: (f32, f32), report: &mut RowReport) {
        let end = (row[SLOT_PASS + 4], row[SLOT_PASS + 5]);
        if !has_location(start) || !has_location(end) {
            return;
        }
        if distance(start, end) < 0.01 {
            report.push(Issue::new(
                IssueCode::PassNoMovement,
                self.hard(),
                "pass ends where it starts",
            ));
        }
        let travelled = metres(start, end);
        let length = ranges::PASS_LENGTH.denormalize(row[SLOT_PASS + 1]);
        if (travelled - length).abs() > MAX_PASS_LENGTH_GAP {
            report.push(
                Issue::new(
                    IssueCode::PassLengthMismatch,
                    self.hard(),
                    format!(
                        "pass length {:.1}m against {:.1}m between start and end",
                        length, travelled
                    ),
                )
                .at_slot(SLOT_PASS + 1),
            );
        }
    }

    fn check_shot(&self, row: &[f32], start: (f32, f32), report: &mut RowReport) {
        if has_location(start) {
            if start.0 < OWN_HALF_SHOT_X {
                let severity = match self.config.strictness {
                    Strictness::Strict => Severity::Error,
                    _ => Severity::Warning,
                };
                report.push(
                    Issue::new(
                        IssueCode::UnusualShotLocation,
                        severity,
                        format!("shot taken from x={:.3}", start.0),
                    )
                    .at_slot(SLOT_LOCATION_X),
                );
            }
            let end = (row[SLOT_SHOT + 1], row[SLOT_SHOT + 2]);
            if (end.0 - start.0).abs() < 0.01 && (end.1 - start.1).abs() < 0.01 {
                report.push(Issue::new(
                    IssueCode::ShotNoMovement,
                    Severity::Warning,
                    "shot ends where it starts",
                ));
            }
        }

        let frame = &row[SLOT_FREEZE_FRAME..VECTOR_SIZE];
        if frame.iter().all(|&v| v == 0.0) {
            report.push(Issue::new(
                IssueCode::MissingFreezeFrame,
                self.soft(),
                "shot has no freeze frame",
            ));
            return;
        }
        for (i, pair) in frame.chunks_exact(2).enumerate() {
            let (x, y) = (pair[0], pair[1]);
            let present = x > 0.0 || y > 0.0;
            if present && !((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y)) {
                report.push(
                    Issue::new(
                        IssueCode::InvalidFreezeFramePosition,
                        Severity::Error,
                        format!("freeze-frame player {} at ({}, {})", i, x, y),
                    )
                    .at_slot(SLOT_FREEZE_FRAME + 2 * i),
                );
            }
        }
    }

    /// Validates an ordered run of rows from one match.
    pub fn validate_sequence<'a, I>(&self, rows: I) -> SequenceReport
    where
        I: IntoIterator<Item = &'a [f32]>,
    {
        let rows: Vec<&[f32]> = rows.into_iter().collect();
        let mut report = SequenceReport {
            rows: rows.iter().map(|r| self.validate_row(r)).collect(),
            issues: Vec::new(),
        };
        let width = self.layout.width();
        for (i, pair) in rows.windows(2).enumerate() {
            let (curr, next) = (pair[0], pair[1]);
            if curr.len() != width || next.len() != width {
                continue;
            }
            self.check_transition(i, curr, next, &mut report.issues);
        }
        debug!(
            rows = report.rows.len(),
            sequence_issues = report.issues.len(),
            "sequence validated"
        );
        report
    }

    /// Validates every row of a tokenized match.
    pub fn validate_matrix(&self, matrix: &TokenMatrix) -> SequenceReport {
        self.validate_sequence(matrix.rows())
    }

    fn check_transition(&self, i: usize, curr: &[f32], next: &[f32], issues: &mut Vec<Issue>) {
        let (a, b) = (self.clock(curr), self.clock(next));
        if b.0 < a.0 || (b.0 == a.0 && b.1 < a.1) {
            issues.push(Issue::new(
                IssueCode::NonChronologicalOrder,
                Severity::Error,
                format!("rows {} and {} are out of order", i, i + 1),
            ));
        } else if b.0 == a.0 && b.1 - a.1 > self.config.max_time_gap {
            issues.push(Issue::new(
                IssueCode::LargeTimeGap,
                self.soft(),
                format!("{:.1}s between rows {} and {}", b.1 - a.1, i, i + 1),
            ));
        }

        if (curr[SLOT_POSSESSION_TEAM] - next[SLOT_POSSESSION_TEAM]).abs() > 0.01 {
            let changes = |row: &[f32]| {
                decode_event_type(row[SLOT_EVENT_TYPE])
                    .is_some_and(|t| POSSESSION_CHANGE_EVENTS.contains(&t))
            };
            if !changes(curr) && !changes(next) {
                issues.push(Issue::new(
                    IssueCode::InvalidPossessionChange,
                    self.hard(),
                    format!("possession flips between rows {} and {}", i, i + 1),
                ));
            }
        }

        let p = (curr[SLOT_LOCATION_X], curr[SLOT_LOCATION_Y]);
        let q = (next[SLOT_LOCATION_X], next[SLOT_LOCATION_Y]);
        if has_location(p) && has_location(q) {
            let metres = distance(p, q) * PITCH_DIAGONAL;
            if f64::from(metres) > self.config.max_location_jump {
                issues.push(Issue::new(
                    IssueCode::ImplausibleLocationJump,
                    self.hard(),
                    format!("{:.1}m jump between rows {} and {}", metres, i, i + 1),
                ));
            }
        }
    }

    /// (period, seconds into the match clock) decoded from a row.
    fn clock(&self, row: &[f32]) -> (usize, f64) {
        let period = vocab::PERIOD.nearest_bucket(row[SLOT_PERIOD]).unwrap_or(0);
        let minute = f64::from(row[SLOT_MINUTE]) * self.config.max_minute as f64;
        let second = vocab::SECOND
            .nearest_bucket(row[SLOT_SECOND])
            .map_or(0, |b| b - 1);
        (period, (minute * 60.0).round() + second as f64)
    }

    /// Snaps a generated row onto the nearest well-formed row in place.
    ///
    /// Values are clipped to `[0, 1]`, the event type is snapped first, then
    /// every slot of the common block and of that type's region is snapped to
    /// its domain and all other slots are cleared.
    pub fn align_row(&self, row: &mut [f32]) {
        for v in row.iter_mut() {
            *v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        }
        if row.len() != self.layout.width() {
            return;
        }
        row[SLOT_EVENT_TYPE] = vocab::EVENT_TYPE.snap(row[SLOT_EVENT_TYPE]);
        let Some(kind) = decode_event_type(row[SLOT_EVENT_TYPE]) else {
            return;
        };
        let region = region_slots(kind, self.layout);
        let mut owned = vec![false; row.len()];
        for (slot, slot_kind) in common_slots().chain(region.iter().copied()) {
            row[slot] = slot_kind.snap(row[slot]);
            owned[slot] = true;
        }
        for (v, owned) in row.iter_mut().zip(owned) {
            if !owned {
                *v = 0.0;
            }
        }
    }
}

/// Event type encoded in slot 0, if the value is a valid non-zero encoding.
pub fn decode_event_type(v: f32) -> Option<EventType> {
    if !vocab::EVENT_TYPE.is_valid_encoding(v) {
        return None;
    }
    let bucket = vocab::EVENT_TYPE.nearest_bucket(v)?;
    EventType::from_id(vocab::EVENT_TYPE.values[bucket - 1])
}

fn has_location(p: (f32, f32)) -> bool {
    p.0 != 0.0 || p.1 != 0.0
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Pitch distance in metres between two normalized locations.
fn metres(a: (f32, f32), b: (f32, f32)) -> f64 {
    let dx = ranges::PITCH_X.denormalize(a.0) - ranges::PITCH_X.denormalize(b.0);
    let dy = ranges::PITCH_Y.denormalize(a.1) - ranges::PITCH_Y.denormalize(b.1);
    (dx * dx + dy * dy).sqrt()
}
