//! Validation issues and reports.

use std::fmt;

use serde::Serialize;

/// How serious an issue is. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    InvalidVectorSize,
    NanValues,
    ValuesOutOfRange,
    UnknownEventType,
    CategoricalOutOfRange,
    BooleanOutOfRange,
    TeamOutOfRange,
    StraySlot,
    PassNoMovement,
    PassLengthMismatch,
    CarryNoMovement,
    UnusualShotLocation,
    ShotNoMovement,
    MissingFreezeFrame,
    InvalidFreezeFramePosition,
    GoalkeeperUnusualLocation,
    NonChronologicalOrder,
    InvalidPossessionChange,
    ImplausibleLocationJump,
    LargeTimeGap,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::InvalidVectorSize => "INVALID_VECTOR_SIZE",
            IssueCode::NanValues => "NAN_VALUES",
            IssueCode::ValuesOutOfRange => "VALUES_OUT_OF_RANGE",
            IssueCode::UnknownEventType => "UNKNOWN_EVENT_TYPE",
            IssueCode::CategoricalOutOfRange => "CATEGORICAL_OUT_OF_RANGE",
            IssueCode::BooleanOutOfRange => "BOOLEAN_OUT_OF_RANGE",
            IssueCode::TeamOutOfRange => "TEAM_OUT_OF_RANGE",
            IssueCode::StraySlot => "STRAY_SLOT",
            IssueCode::PassNoMovement => "PASS_NO_MOVEMENT",
            IssueCode::PassLengthMismatch => "PASS_LENGTH_MISMATCH",
            IssueCode::CarryNoMovement => "CARRY_NO_MOVEMENT",
            IssueCode::UnusualShotLocation => "UNUSUAL_SHOT_LOCATION",
            IssueCode::ShotNoMovement => "SHOT_NO_MOVEMENT",
            IssueCode::MissingFreezeFrame => "MISSING_FREEZE_FRAME",
            IssueCode::InvalidFreezeFramePosition => "INVALID_FREEZE_FRAME_POSITION",
            IssueCode::GoalkeeperUnusualLocation => "GOALKEEPER_UNUSUAL_LOCATION",
            IssueCode::NonChronologicalOrder => "NON_CHRONOLOGICAL_ORDER",
            IssueCode::InvalidPossessionChange => "INVALID_POSSESSION_CHANGE",
            IssueCode::ImplausibleLocationJump => "IMPLAUSIBLE_LOCATION_JUMP",
            IssueCode::LargeTimeGap => "LARGE_TIME_GAP",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One problem found in a row or between rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub code: IssueCode,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<usize>,
}

impl Issue {
    pub fn new(code: IssueCode, severity: Severity, message: impl Into<String>) -> Self {
        Issue {
            code,
            severity,
            message: message.into(),
            slot: None,
        }
    }

    pub fn at_slot(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}] {}: {}", level, self.code, self.message)?;
        if let Some(slot) = self.slot {
            write!(f, " (slot {})", slot)?;
        }
        Ok(())
    }
}

fn count(issues: &[Issue], severity: Severity) -> usize {
    issues.iter().filter(|i| i.severity == severity).count()
}

/// Score penalizing 0.2 per error, 0.05 per warning, 0.01 per info, floored at 0.
pub fn issue_score(issues: &[Issue]) -> f64 {
    let penalty = 0.2 * count(issues, Severity::Error) as f64
        + 0.05 * count(issues, Severity::Warning) as f64
        + 0.01 * count(issues, Severity::Info) as f64;
    (1.0 - penalty).max(0.0)
}

/// Validation result for one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowReport {
    /// Upstream type id decoded from slot 0, if decodable.
    pub event_type: Option<u64>,
    pub issues: Vec<Issue>,
}

impl RowReport {
    pub fn new() -> Self {
        RowReport {
            event_type: None,
            issues: Vec::new(),
        }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn errors(&self) -> usize {
        count(&self.issues, Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        count(&self.issues, Severity::Warning)
    }

    pub fn infos(&self) -> usize {
        count(&self.issues, Severity::Info)
    }

    pub fn is_valid(&self) -> bool {
        self.errors() == 0
    }

    pub fn score(&self) -> f64 {
        issue_score(&self.issues)
    }
}

impl Default for RowReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validation result for an ordered run of rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SequenceReport {
    pub rows: Vec<RowReport>,
    /// Issues between consecutive rows.
    pub issues: Vec<Issue>,
}

impl SequenceReport {
    pub fn valid_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_valid()).count()
    }

    pub fn is_valid(&self) -> bool {
        self.valid_rows() == self.rows.len() && count(&self.issues, Severity::Error) == 0
    }

    pub fn total_errors(&self) -> usize {
        self.rows.iter().map(RowReport::errors).sum::<usize>() + count(&self.issues, Severity::Error)
    }

    pub fn total_warnings(&self) -> usize {
        self.rows.iter().map(RowReport::warnings).sum::<usize>()
            + count(&self.issues, Severity::Warning)
    }

    /// Mean row score minus 0.2 per sequence error and 0.05 per sequence
    /// warning, floored at 0. An empty sequence scores 0.
    pub fn score(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let mean = self.rows.iter().map(RowReport::score).sum::<f64>() / self.rows.len() as f64;
        let penalty = 0.2 * count(&self.issues, Severity::Error) as f64
            + 0.05 * count(&self.issues, Severity::Warning) as f64;
        (mean - penalty).max(0.0)
    }
}

impl fmt::Display for SequenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} rows, {} valid, {} errors, {} warnings, score {:.2}",
            self.rows.len(),
            self.valid_rows(),
            self.total_errors(),
            self.total_warnings(),
            self.score()
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            for issue in &row.issues {
                writeln!(f, "  row {}: {}", i, issue)?;
            }
        }
        for issue in &self.issues {
            writeln!(f, "  sequence: {}", issue)?;
        }
        Ok(())
    }
}
