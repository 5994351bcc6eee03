use crate::error::{Result, ScrapeError};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{info, warn};

/// Rewrites a transfer-players artifact in place, giving every player a
/// `ppg` field. Returns the number of players updated.
pub async fn add_ppg(path: &Path) -> Result<usize> {
    info!("Reading players from {:?}", path);
    let content = tokio::fs::read_to_string(path).await?;
    let mut data: Value = serde_json::from_str(&content)?;

    let updated = apply(&mut data)?;

    tokio::fs::write(path, serde_json::to_string_pretty(&data)?).await?;
    info!("Updated {:?} with ppg for {updated} players", path);
    Ok(updated)
}

fn apply(data: &mut Value) -> Result<usize> {
    let players = match data {
        Value::Array(players) => players,
        Value::Object(wrapper) => match wrapper.get_mut("players") {
            Some(Value::Array(players)) => players,
            _ => {
                return Err(ScrapeError::Other(
                    "expected a `players` list in the top-level object".into(),
                ))
            }
        },
        _ => {
            return Err(ScrapeError::Other(
                "expected a list of players or an object with a `players` list".into(),
            ))
        }
    };

    let mut updated = 0;
    for player in players.iter_mut() {
        match player {
            Value::Object(fields) => {
                let ppg = points_per_game(fields);
                fields.insert("ppg".into(), Value::from(ppg));
                updated += 1;
            }
            other => warn!("Skipping non-object player entry: {other}"),
        }
    }

    Ok(updated)
}

/// Points from made shots only, per game, rounded to one decimal with ties
/// going to the even digit. Missing or zero games count as one game.
pub fn points_per_game(player: &Map<String, Value>) -> f64 {
    let made = |key: &str| player.get(key).and_then(Value::as_str).map_or(0, made_shots);

    let points = 2 * made("twoP") + 3 * made("threeP") + made("ft");
    let games = player
        .get("g")
        .and_then(|g| g.as_i64().or_else(|| g.as_f64().map(|f| f as i64)))
        .filter(|&g| g > 0)
        .unwrap_or(1);

    (points as f64 / games as f64 * 10.0).round_ties_even() / 10.0
}

/// Made count of a "made-attempts" string such as "124-227".
fn made_shots(stat: &str) -> i64 {
    stat.split('-')
        .next()
        .and_then(|made| made.trim().parse().ok())
        .unwrap_or(0)
}
