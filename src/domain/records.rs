use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A player row from a team roster page. Every stat is kept as displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RosterPlayer {
    pub rk: String,
    pub pick: String,
    pub number: String,
    #[serde(rename = "class")]
    pub player_class: String,
    pub height: String,
    pub name: String,
    pub recruit_rank: String,
    pub team: String,
    pub conf: String,
    pub games: String,
    pub role: String,
    pub min_pct: String,
    pub prpg: String,
    pub dprpg: String,
    pub bpm: String,
    pub obpm: String,
    pub dbpm: String,
    pub ortg: String,
    pub drtg: String,
    pub usg: String,
    pub efg: String,
    pub ts: String,
    pub or: String,
    pub dr: String,
    pub ast: String,
    pub to: String,
    pub ato: String,
    pub blk: String,
    pub stl: String,
    pub ftr: String,
    pub fc40: String,
    pub dunks: String,
    pub dunks_pct: String,
    pub close2: String,
    pub close2_pct: String,
    pub far2: String,
    pub far2_pct: String,
    pub ft: String,
    pub ft_pct: String,
    pub twop: String,
    pub twop_pct: String,
    pub threepr: String,
    pub threep100: String,
    pub threep: String,
    pub threep_pct: String,
    pub ast2: String,
    pub reb: String,
    pub pts: String,
    pub left_after_season: bool,
}

/// One team's season aggregates from the team tables page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamSeasonStats {
    pub team: String,
    pub adj_oe: f64,
    pub adj_de: f64,
    pub barthag: f64,
    pub record: String,
    pub wins: i64,
    pub games: i64,
    pub efg: f64,
    pub efg_d: f64,
    pub ft_rate: f64,
    pub ft_rate_d: f64,
    pub tov_pct: f64,
    pub tov_pct_d: f64,
    pub o_reb_pct: f64,
    pub op_o_reb_pct: f64,
    pub raw_t: f64,
    pub two_p_pct: f64,
    pub two_p_pct_d: f64,
    pub three_p_pct: f64,
    pub three_p_pct_d: f64,
    pub blk_pct: f64,
    pub blked_pct: f64,
    pub ast_pct: f64,
    pub op_ast_pct: f64,
    pub three_p_rate: f64,
    pub three_p_rate_d: f64,
    pub adj_t: f64,
    pub avg_hgt: f64,
    pub eff_hgt: f64,
    pub exp: f64,
    pub year: i64,
    pub pake: f64,
    pub pase: f64,
    pub talent: f64,
    pub ft_pct: f64,
    pub op_ft_pct: f64,
    pub ppp_off: f64,
    pub ppp_def: f64,
    pub elite_sos: f64,
}

/// Season stats for a player who transferred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferPlayerStats {
    pub rk: i64,
    pub pick: String,
    pub player: String,
    pub player_class: String,
    pub height: String,
    pub recruit_rank: String,
    pub team: String,
    pub conf: String,
    pub g: i64,
    pub role: String,
    pub min_pct: f64,
    pub prpg: f64,
    pub d_prpg: f64,
    pub bpm: f64,
    pub obpm: f64,
    pub dbpm: f64,
    pub ortg: f64,
    pub drtg: f64,
    pub usg: f64,
    pub efg: f64,
    pub ts: f64,
    pub or: f64,
    pub dr: f64,
    pub ast: f64,
    pub to: f64,
    pub a_to: f64,
    pub blk: f64,
    pub stl: f64,
    pub ftr: f64,
    pub fc40: f64,
    pub dunks: String,
    pub dunks_pct: f64,
    pub close2: String,
    pub close2_pct: f64,
    pub far2: String,
    pub far2_pct: f64,
    pub ft: String,
    pub ft_pct: f64,
    pub two_p: String,
    pub two_p_pct: f64,
    pub three_pr: f64,
    pub three_p100: f64,
    pub three_p: String,
    pub three_p_pct: f64,
}

/// A transfer-portal card.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferPortalEntry {
    pub name: String,
    pub rating: f64,
    pub trend: String,
    pub position: String,
    pub height: String,
    pub weight: String,
    pub status: String,
    pub source_school: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_school: Option<String>,
    pub image_url: String,
    pub player_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    RosterPlayer,
    TeamSeasonStats,
    TransferPlayerStats,
    TransferPortalEntry,
}

/// The typed output unit. Serialized untagged, so an artifact is a flat list
/// of field objects. Fields missing on read fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Roster(RosterPlayer),
    TeamSeason(TeamSeasonStats),
    TransferPlayer(TransferPlayerStats),
    TransferPortal(TransferPortalEntry),
}

impl RecordKind {
    /// Builds the typed record from decoded fields.
    pub fn decode(&self, fields: Map<String, Value>) -> serde_json::Result<Record> {
        self.from_value(Value::Object(fields))
    }

    pub fn from_value(&self, value: Value) -> serde_json::Result<Record> {
        Ok(match self {
            RecordKind::RosterPlayer => Record::Roster(serde_json::from_value(value)?),
            RecordKind::TeamSeasonStats => Record::TeamSeason(serde_json::from_value(value)?),
            RecordKind::TransferPlayerStats => {
                Record::TransferPlayer(serde_json::from_value(value)?)
            }
            RecordKind::TransferPortalEntry => {
                Record::TransferPortal(serde_json::from_value(value)?)
            }
        })
    }
}

impl Record {
    pub fn name(&self) -> &str {
        match self {
            Record::Roster(p) => &p.name,
            Record::TeamSeason(t) => &t.team,
            Record::TransferPlayer(p) => &p.player,
            Record::TransferPortal(e) => &e.name,
        }
    }
}
