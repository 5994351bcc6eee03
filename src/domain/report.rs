use super::source::SourceKey;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a Raw Row did not become a Record. Checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    TooFewCells { found: usize, min: usize },
    MissingName,
    BadRank(String),
    HeaderRow(String),
    Unparsable { field: &'static str, value: String },
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejected::TooFewCells { found, min } => write!(f, "{found} cells, need {min}"),
            Rejected::MissingName => f.write_str("name missing or out of bounds"),
            Rejected::BadRank(rank) => write!(f, "rank '{rank}' is not a positive integer"),
            Rejected::HeaderRow(label) => write!(f, "header label '{label}'"),
            Rejected::Unparsable { field, value } => write!(f, "{field} = '{value}' unparsable"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub too_few_cells: usize,
    pub missing_name: usize,
    pub bad_rank: usize,
    pub header_row: usize,
    pub unparsable: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, reason: &Rejected) {
        match reason {
            Rejected::TooFewCells { .. } => self.too_few_cells += 1,
            Rejected::MissingName => self.missing_name += 1,
            Rejected::BadRank(_) => self.bad_rank += 1,
            Rejected::HeaderRow(_) => self.header_row += 1,
            Rejected::Unparsable { .. } => self.unparsable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.too_few_cells + self.missing_name + self.bad_rank + self.header_row + self.unparsable
    }
}

/// Per-year progress. `Failed` can follow any other stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearStage {
    Pending,
    Navigated,
    Expanded,
    Extracted,
    Validated,
    Persisted,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearReport {
    pub source: SourceKey,
    pub year: u16,
    pub stage: YearStage,
    /// Last stage reached before a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_after: Option<YearStage>,
    pub expansions: usize,
    pub rows_seen: usize,
    pub records: usize,
    pub rejected: RejectionCounts,
    pub coerced_fields: usize,
    pub duplicates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl YearReport {
    pub fn pending(source: SourceKey, year: u16) -> Self {
        Self {
            source,
            year,
            stage: YearStage::Pending,
            failed_after: None,
            expansions: 0,
            rows_seen: 0,
            records: 0,
            rejected: RejectionCounts::default(),
            coerced_fields: 0,
            duplicates: 0,
            schema_warning: None,
            artifact: None,
            error: None,
        }
    }

    pub fn advance(&mut self, stage: YearStage) {
        self.stage = stage;
    }

    pub fn fail(&mut self, error: impl ToString) {
        self.failed_after = Some(self.stage);
        self.stage = YearStage::Failed;
        self.error = Some(error.to_string());
    }

    pub fn is_failed(&self) -> bool {
        self.stage == YearStage::Failed
    }
}

/// Written next to the artifacts after every run.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub finished_at: String,
    pub version: String,
    pub records_written: usize,
    pub years_failed: usize,
    pub years: Vec<YearReport>,
}

impl RunSummary {
    pub fn new(years: Vec<YearReport>) -> Self {
        let records_written = years
            .iter()
            .filter(|r| r.stage == YearStage::Persisted)
            .map(|r| r.records)
            .sum();

        Self {
            finished_at: Local::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            records_written,
            years_failed: years.iter().filter(|r| r.is_failed()).count(),
            years,
        }
    }
}
