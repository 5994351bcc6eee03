//! Positional column schemas.
//!
//! Every source maps table cells to record fields purely by index. The maps
//! live here as data so that a markup change upstream is a diff to one table
//! (and a version bump), not an edit scattered through extraction code.

use super::raw_row::RawCell;

/// What to take out of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRead {
    /// The cell's trimmed, flattened text.
    Text,
    /// Text of the nested anchor; empty when the cell has no link.
    Anchor,
    /// Text of the nested anchor, falling back to the flattened text.
    AnchorOrText,
    /// Text of the nth nested `div`; empty when absent.
    Div(usize),
    /// Text of the nth nested `div`, falling back to the flattened text.
    DivOrText(usize),
    /// `href` of the cell's link.
    Href,
    /// `src` of the cell's image.
    ImageSrc,
    /// One part of the text split on a separator, trimmed.
    Split { separator: &'static str, part: usize },
}

impl CellRead {
    pub fn read<'a>(&self, cell: &'a RawCell) -> &'a str {
        match *self {
            CellRead::Text => cell.text.as_str(),
            CellRead::Anchor => cell.anchor_text.as_deref().unwrap_or(""),
            CellRead::AnchorOrText => match cell.anchor_text.as_deref() {
                Some(anchor) if !anchor.is_empty() => anchor,
                _ => cell.text.as_str(),
            },
            CellRead::Div(n) => cell.divs.get(n).map(String::as_str).unwrap_or(""),
            CellRead::DivOrText(n) => match cell.divs.get(n) {
                Some(div) if !div.is_empty() => div.as_str(),
                _ => cell.text.as_str(),
            },
            CellRead::Href => cell.href.as_deref().unwrap_or(""),
            CellRead::ImageSrc => cell.image_src.as_deref().unwrap_or(""),
            CellRead::Split { separator, part } => {
                cell.text.split(separator).nth(part).unwrap_or("").trim()
            }
        }
    }
}

/// How a read value is coerced into the record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Omitted from the record when empty.
    OptionalText,
    Integer,
    Float,
    /// Float after stripping everything but digits and dots ("★ 94.5" -> 94.5).
    Rating,
    /// Jersey number with the leading `#` removed, kept as text.
    Jersey,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub index: usize,
    pub field: &'static str,
    pub read: CellRead,
    pub kind: FieldKind,
}

const fn col(index: usize, field: &'static str, read: CellRead, kind: FieldKind) -> ColumnSpec {
    ColumnSpec {
        index,
        field,
        read,
        kind,
    }
}

const fn text(index: usize, field: &'static str) -> ColumnSpec {
    col(index, field, CellRead::Text, FieldKind::Text)
}

const fn float(index: usize, field: &'static str) -> ColumnSpec {
    col(index, field, CellRead::Text, FieldKind::Float)
}

const fn int(index: usize, field: &'static str) -> ColumnSpec {
    col(index, field, CellRead::Text, FieldKind::Integer)
}

/// Which cell holds the entity name and how long it may be.
#[derive(Debug, Clone, Copy)]
pub struct NameColumn {
    pub index: usize,
    pub read: CellRead,
    pub min_len: usize,
    pub max_len: Option<usize>,
}

/// Rejects a row whose cell (read as `read`) equals one of `labels`.
/// Header rows are otherwise structurally indistinguishable from data rows.
#[derive(Debug, Clone, Copy)]
pub struct HeaderGuard {
    pub index: usize,
    pub read: CellRead,
    pub labels: &'static [&'static str],
}

#[derive(Debug)]
pub struct TableSchema {
    pub name: &'static str,
    pub version: u32,
    pub min_cells: usize,
    pub name_column: NameColumn,
    pub rank_column: Option<usize>,
    pub header_guards: &'static [HeaderGuard],
    pub columns: &'static [ColumnSpec],
}

impl TableSchema {
    /// Number of cells a row needs for every mapped column to be present.
    pub fn width(&self) -> usize {
        self.columns
            .iter()
            .map(|c| c.index + 1)
            .max()
            .unwrap_or(0)
    }
}

pub static ROSTER: TableSchema = TableSchema {
    name: "roster",
    version: 1,
    min_cells: 10,
    name_column: NameColumn {
        index: 4,
        read: CellRead::AnchorOrText,
        min_len: 1,
        max_len: None,
    },
    rank_column: None,
    header_guards: &[
        HeaderGuard {
            index: 0,
            read: CellRead::Text,
            labels: &["Rk"],
        },
        HeaderGuard {
            index: 4,
            read: CellRead::AnchorOrText,
            labels: &["Player"],
        },
    ],
    columns: &[
        text(0, "rk"),
        text(1, "pick"),
        col(2, "number", CellRead::Div(0), FieldKind::Jersey),
        col(2, "class", CellRead::Div(1), FieldKind::Text),
        text(3, "height"),
        col(4, "name", CellRead::AnchorOrText, FieldKind::Text),
        text(5, "recruitRank"),
        col(6, "team", CellRead::AnchorOrText, FieldKind::Text),
        col(7, "conf", CellRead::AnchorOrText, FieldKind::Text),
        text(8, "games"),
        text(9, "role"),
        text(10, "minPct"),
        text(11, "prpg"),
        text(12, "dprpg"),
        text(13, "bpm"),
        text(14, "obpm"),
        text(15, "dbpm"),
        text(16, "ortg"),
        text(17, "drtg"),
        text(18, "usg"),
        text(19, "efg"),
        text(20, "ts"),
        text(21, "or"),
        text(22, "dr"),
        text(23, "ast"),
        text(24, "to"),
        text(25, "ato"),
        text(26, "blk"),
        text(27, "stl"),
        text(28, "ftr"),
        text(29, "fc40"),
        text(30, "dunks"),
        text(31, "dunksPct"),
        text(32, "close2"),
        text(33, "close2Pct"),
        text(34, "far2"),
        text(35, "far2Pct"),
        text(36, "ft"),
        text(37, "ftPct"),
        text(38, "twop"),
        text(39, "twopPct"),
        text(40, "threepr"),
        text(41, "threep100"),
        text(42, "threep"),
        text(43, "threepPct"),
        text(44, "ast2"),
        text(45, "reb"),
        text(46, "pts"),
    ],
};

pub static TEAM_DATA: TableSchema = TableSchema {
    name: "team-data",
    version: 1,
    min_cells: 40,
    name_column: NameColumn {
        index: 1,
        read: CellRead::Text,
        min_len: 2,
        max_len: Some(100),
    },
    rank_column: None,
    header_guards: &[HeaderGuard {
        index: 0,
        read: CellRead::Text,
        labels: &[
            "", "Team", "Adj OE", "Adj DE", "Barthag", "Record", "Wins", "Games", "eFG",
            "eFG D.", "FT Rate", "FT Rate D", "TOV%", "TOV% D", "O Reb%", "Op OReb%", "Raw T",
            "2P %", "2P % D.", "3P %", "3P % D.", "Blk %", "Blked %", "Ast %", "Op Ast %",
            "3P Rate", "3P Rate D", "Adj. T", "Avg Hgt.", "Eff. Hgt.", "Exp.", "Year", "PAKE",
            "PASE", "Talent", "FT%", "Op. FT%", "PPP Off.", "PPP Def.", "Elite SOS",
        ],
    }],
    columns: &[
        text(1, "team"),
        float(2, "adjOe"),
        float(3, "adjDe"),
        float(4, "barthag"),
        text(5, "record"),
        int(6, "wins"),
        int(7, "games"),
        float(8, "efg"),
        float(9, "efgD"),
        float(10, "ftRate"),
        float(11, "ftRateD"),
        float(12, "tovPct"),
        float(13, "tovPctD"),
        float(14, "oRebPct"),
        float(15, "opORebPct"),
        float(16, "rawT"),
        float(17, "twoPPct"),
        float(18, "twoPPctD"),
        float(19, "threePPct"),
        float(20, "threePPctD"),
        float(21, "blkPct"),
        float(22, "blkedPct"),
        float(23, "astPct"),
        float(24, "opAstPct"),
        float(25, "threePRate"),
        float(26, "threePRateD"),
        float(27, "adjT"),
        float(28, "avgHgt"),
        float(29, "effHgt"),
        float(30, "exp"),
        int(31, "year"),
        float(32, "pake"),
        float(33, "pase"),
        float(34, "talent"),
        float(35, "ftPct"),
        float(36, "opFtPct"),
        float(37, "pppOff"),
        float(38, "pppDef"),
        float(39, "eliteSos"),
    ],
};

pub static TRANSFER_PLAYERS: TableSchema = TableSchema {
    name: "transfer-players",
    version: 1,
    min_cells: 10,
    name_column: NameColumn {
        index: 4,
        read: CellRead::Anchor,
        min_len: 1,
        max_len: None,
    },
    rank_column: Some(0),
    header_guards: &[
        HeaderGuard {
            index: 0,
            read: CellRead::Text,
            labels: &["Rk"],
        },
        HeaderGuard {
            index: 4,
            read: CellRead::Anchor,
            labels: &["Player"],
        },
        HeaderGuard {
            index: 6,
            read: CellRead::Anchor,
            labels: &["Team"],
        },
        HeaderGuard {
            index: 7,
            read: CellRead::Anchor,
            labels: &["Conf"],
        },
    ],
    columns: &[
        int(0, "rk"),
        text(1, "pick"),
        col(2, "playerClass", CellRead::DivOrText(1), FieldKind::Text),
        text(3, "height"),
        col(4, "player", CellRead::Anchor, FieldKind::Text),
        text(5, "recruitRank"),
        col(6, "team", CellRead::Anchor, FieldKind::Text),
        col(7, "conf", CellRead::Anchor, FieldKind::Text),
        int(8, "g"),
        text(9, "role"),
        float(10, "minPct"),
        float(11, "prpg"),
        float(12, "dPrpg"),
        float(13, "bpm"),
        float(14, "obpm"),
        float(15, "dbpm"),
        float(16, "ortg"),
        float(17, "drtg"),
        float(18, "usg"),
        float(19, "efg"),
        float(20, "ts"),
        float(21, "or"),
        float(22, "dr"),
        float(23, "ast"),
        float(24, "to"),
        float(25, "aTo"),
        float(26, "blk"),
        float(27, "stl"),
        float(28, "ftr"),
        float(29, "fc40"),
        text(30, "dunks"),
        float(31, "dunksPct"),
        text(32, "close2"),
        float(33, "close2Pct"),
        text(34, "far2"),
        float(35, "far2Pct"),
        text(36, "ft"),
        float(37, "ftPct"),
        text(38, "twoP"),
        float(39, "twoPPct"),
        float(40, "threePr"),
        float(41, "threeP100"),
        text(42, "threeP"),
        float(43, "threePPct"),
    ],
};

/// Card sub-selectors for the transfer portal, in cell order.
pub static TRANSFER_PORTAL_CARD_FIELDS: &[&str] = &[
    "h3 a, .player-name a, a[href*=\"/Player/\"]",
    ".rating, .player-rating",
    ".trend, .transfer-trend",
    ".position, .player-position",
    ".bio, .player-bio",
    ".status, .transfer-status",
    ".source-school, .transfer-from",
    ".destination-school, .transfer-to",
    ".player-avatar img, .player-image img",
];

pub static TRANSFER_PORTAL: TableSchema = TableSchema {
    name: "transfer-portal",
    version: 1,
    min_cells: 9,
    name_column: NameColumn {
        index: 0,
        read: CellRead::Text,
        min_len: 1,
        max_len: None,
    },
    rank_column: None,
    header_guards: &[],
    columns: &[
        text(0, "name"),
        col(1, "rating", CellRead::Text, FieldKind::Rating),
        text(2, "trend"),
        text(3, "position"),
        col(
            4,
            "height",
            CellRead::Split {
                separator: " / ",
                part: 0,
            },
            FieldKind::Text,
        ),
        col(
            4,
            "weight",
            CellRead::Split {
                separator: " / ",
                part: 1,
            },
            FieldKind::Text,
        ),
        text(5, "status"),
        text(6, "sourceSchool"),
        col(7, "destinationSchool", CellRead::Text, FieldKind::OptionalText),
        col(8, "imageUrl", CellRead::ImageSrc, FieldKind::Text),
        col(0, "playerUrl", CellRead::Href, FieldKind::Text),
    ],
};
