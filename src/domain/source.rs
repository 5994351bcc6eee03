use super::records::RecordKind;
use super::schema::{self, TableSchema};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_YEARS: [u16; 4] = [2022, 2023, 2024, 2025];
pub const DEFAULT_TEAM: &str = "Illinois";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKey {
    Roster,
    TeamData,
    TransferPlayers,
    TransferPortal,
}

impl SourceKey {
    pub const ALL: [SourceKey; 4] = [
        SourceKey::Roster,
        SourceKey::TeamData,
        SourceKey::TransferPlayers,
        SourceKey::TransferPortal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKey::Roster => "roster",
            SourceKey::TeamData => "team-data",
            SourceKey::TransferPlayers => "transfer-players",
            SourceKey::TransferPortal => "transfer-portal",
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s.trim())
            .ok_or_else(|| format!("unknown source '{s}'"))
    }
}

/// When navigation counts as done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    DomContentLoaded,
    NetworkIdle,
}

#[derive(Debug, Clone, Copy)]
pub struct LoadStrategy {
    pub wait: WaitUntil,
    pub timeout: Duration,
    /// Fixed delay after navigation so client-side tables finish rendering.
    pub settle: Duration,
}

#[derive(Debug, Clone)]
pub enum RowLayout {
    /// Rows of a table; one Raw Cell per matching cell element.
    Table {
        row_selector: String,
        cell_selector: String,
    },
    /// Repeated card elements; one Raw Cell per field sub-selector, in order.
    Cards {
        card_selector: String,
        fields: Vec<String>,
    },
}

#[derive(Debug, Clone)]
pub struct PaginationSpec {
    pub control_selector: String,
    pub max_attempts: usize,
    pub settle: Duration,
}

/// One scrapeable table layout: where it lives, how to load and expand it,
/// and how its cells map to a record.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub key: SourceKey,
    pub url_template: String,
    pub team: String,
    pub load: LoadStrategy,
    pub rows: RowLayout,
    pub pagination: Option<PaginationSpec>,
    pub schema: &'static TableSchema,
    pub record_kind: RecordKind,
    pub artifact_prefix: String,
    /// Whether an empty Year Batch still replaces the artifact.
    pub write_empty: bool,
}

fn table(row_selector: &str) -> RowLayout {
    RowLayout::Table {
        row_selector: row_selector.to_string(),
        cell_selector: "td".to_string(),
    }
}

fn network_idle(settle_secs: u64) -> LoadStrategy {
    LoadStrategy {
        wait: WaitUntil::NetworkIdle,
        timeout: Duration::from_secs(60),
        settle: Duration::from_secs(settle_secs),
    }
}

impl SourceDescriptor {
    pub fn builtin(key: SourceKey, team: &str) -> Self {
        match key {
            SourceKey::Roster => Self {
                key,
                url_template: "https://barttorvik.com/team.php?year={year}&team={team}".into(),
                team: team.to_string(),
                load: network_idle(3),
                rows: table("div.teamFive table tbody tr"),
                pagination: None,
                schema: &schema::ROSTER,
                record_kind: RecordKind::RosterPlayer,
                artifact_prefix: format!("{}-roster", slug(team)),
                write_empty: true,
            },
            SourceKey::TeamData => Self {
                key,
                url_template: "https://barttorvik.com/team-tables_each.php?year={year}&top=0&conlimit=All&venue=All&type=All&yax=3".into(),
                team: team.to_string(),
                load: network_idle(5),
                rows: table("tr"),
                pagination: None,
                schema: &schema::TEAM_DATA,
                record_kind: RecordKind::TeamSeasonStats,
                artifact_prefix: "team-data".into(),
                write_empty: true,
            },
            SourceKey::TransferPlayers => Self {
                key,
                url_template: "https://barttorvik.com/playerstat.php?link=y&xvalue=trans&year={year}&minmin=0&start={prev_year}1101&end={year}0501".into(),
                team: team.to_string(),
                load: network_idle(5),
                rows: table("tr"),
                pagination: Some(PaginationSpec {
                    control_selector: "th#expand a".into(),
                    max_attempts: 6,
                    settle: Duration::from_secs(2),
                }),
                schema: &schema::TRANSFER_PLAYERS,
                record_kind: RecordKind::TransferPlayerStats,
                artifact_prefix: "transfer-players".into(),
                write_empty: true,
            },
            SourceKey::TransferPortal => Self {
                key,
                url_template: "https://247sports.com/season/{year}-basketball/transferportaltop/"
                    .into(),
                team: team.to_string(),
                load: LoadStrategy {
                    wait: WaitUntil::DomContentLoaded,
                    timeout: Duration::from_secs(30),
                    settle: Duration::from_secs(5),
                },
                rows: RowLayout::Cards {
                    card_selector: ".transfer-player, .transfer-entry".into(),
                    fields: schema::TRANSFER_PORTAL_CARD_FIELDS
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                },
                pagination: Some(PaginationSpec {
                    control_selector: "button.action-button.transfer-group-loadMore".into(),
                    max_attempts: 15,
                    settle: Duration::from_secs(3),
                }),
                schema: &schema::TRANSFER_PORTAL,
                record_kind: RecordKind::TransferPortalEntry,
                artifact_prefix: "transfers-247sports".into(),
                write_empty: false,
            },
        }
    }

    pub fn url(&self, year: u16) -> String {
        self.url_template
            .replace("{prev_year}", &year.saturating_sub(1).to_string())
            .replace("{year}", &year.to_string())
            .replace("{team}", &self.team)
    }

    pub fn artifact_name(&self, year: u16) -> String {
        format!("{}-{}.json", self.artifact_prefix, year)
    }

    /// Scales every fixed delay; `0.0` turns them all off.
    pub fn scale_delays(&mut self, factor: f64) {
        let factor = factor.max(0.0);
        self.load.settle = self.load.settle.mul_f64(factor);
        if let Some(pagination) = self.pagination.as_mut() {
            pagination.settle = pagination.settle.mul_f64(factor);
        }
    }
}

fn slug(team: &str) -> String {
    team.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}
