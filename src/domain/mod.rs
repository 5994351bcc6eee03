mod raw_row;
mod records;
mod report;
pub(crate) mod schema;
mod source;

pub use raw_row::{RawCell, RawRow};
pub use records::{
    Record, RecordKind, RosterPlayer, TeamSeasonStats, TransferPlayerStats, TransferPortalEntry,
};
pub use report::{Rejected, RejectionCounts, RunSummary, YearReport, YearStage};
pub use schema::TableSchema;
pub use source::{
    LoadStrategy, PaginationSpec, RowLayout, SourceDescriptor, SourceKey, WaitUntil,
    DEFAULT_TEAM, DEFAULT_YEARS,
};
