//! League snapshots: rosters, match history, and optional history summaries.

use std::collections::HashMap;
use std::path::Path;

use itertools::Itertools;
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{DataSource, MATCHES_FILE, PLAYER_STATS_FILE, SUMMARY_FILE};
use crate::error::{MatchupError, MatchupResult};
use crate::history::{summarize, PlayerSummary, SeasonStat};
use crate::player::{normalize_name, Match, Player};

static DEMO_PLAYERS_JSON: &str = include_str!("../data/demo/player_stats_latest.json");
static DEMO_MATCHES_JSON: &str = include_str!("../data/demo/all_matches_latest.json");
static DEMO_SUMMARY_JSON: &str = include_str!("../data/demo/combined/player_summary.json");

const CURRENT_SEASON: &str = "current";

static DEMO_LEAGUE: Lazy<League> = Lazy::new(|| {
    League::from_json(DEMO_PLAYERS_JSON, DEMO_MATCHES_JSON, Some(DEMO_SUMMARY_JSON))
        .expect("Failed to parse demo league")
});

/// Everything the recommendation core needs, as immutable snapshots.
#[derive(Debug, Clone, Default)]
pub struct League {
    pub players: Vec<Player>,
    pub matches: Vec<Match>,
    pub teams: Vec<String>,
}

fn parse_rows<T: serde::de::DeserializeOwned>(json: &str, kind: &str) -> MatchupResult<Vec<T>> {
    let rows: Vec<Value> = serde_json::from_str(json)?;
    let total = rows.len();
    let parsed: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(i, row)| match serde_json::from_value(row) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("skipping malformed {} row {}: {}", kind, i, e);
                None
            }
        })
        .collect();
    if parsed.len() < total {
        warn!("{} of {} {} rows skipped", total - parsed.len(), total, kind);
    }
    Ok(parsed)
}

impl League {
    /// Drops forfeited matches, applies summaries by player name, and
    /// collects the sorted team list.
    pub fn from_parts(
        players: Vec<Player>,
        matches: Vec<Match>,
        summaries: Option<HashMap<String, PlayerSummary>>,
    ) -> League {
        let players: Vec<Player> = match &summaries {
            Some(summaries) => {
                for name in summaries.keys() {
                    if !players.iter().any(|p| &p.name == name) {
                        warn!("summary for unknown player '{}'", name);
                    }
                }
                players
                    .iter()
                    .map(|p| match summaries.get(&p.name) {
                        Some(summary) => summary.apply(p),
                        None => p.clone(),
                    })
                    .collect()
            }
            None => players,
        };

        let total_matches = matches.len();
        let matches: Vec<Match> = matches.into_iter().filter(|m| !m.forfeit).collect();

        let teams: Vec<String> = players
            .iter()
            .map(|p| p.team.clone())
            .filter(|t| !t.is_empty())
            .unique()
            .sorted()
            .collect();

        info!(
            players = players.len(),
            matches = matches.len(),
            forfeits = total_matches - matches.len(),
            teams = teams.len(),
            "league loaded"
        );
        League {
            players,
            matches,
            teams,
        }
    }

    pub fn from_json(
        players_json: &str,
        matches_json: &str,
        summary_json: Option<&str>,
    ) -> MatchupResult<League> {
        let players = parse_rows::<Player>(players_json, "player")?;
        let matches = parse_rows::<Match>(matches_json, "match")?;
        let summaries = summary_json
            .map(serde_json::from_str::<HashMap<String, PlayerSummary>>)
            .transpose()?;
        Ok(League::from_parts(players, matches, summaries))
    }

    /// Like `from_json`, but the enrichment fields come from `derive_summaries`.
    pub fn from_json_derived(players_json: &str, matches_json: &str) -> MatchupResult<League> {
        let players = parse_rows::<Player>(players_json, "player")?;
        let matches = parse_rows::<Match>(matches_json, "match")?;
        let summaries = derive_summaries(&players, &matches);
        Ok(League::from_parts(players, matches, Some(summaries)))
    }

    /// Reads a data directory. Without a summary file, summaries are derived
    /// from the snapshot itself.
    pub fn load(dir: &Path) -> MatchupResult<League> {
        let read = |name: &str| {
            let path = dir.join(name);
            std::fs::read_to_string(&path).map_err(|source| MatchupError::Io { path, source })
        };
        let players = read(PLAYER_STATS_FILE)?;
        let matches = read(MATCHES_FILE)?;
        match read(SUMMARY_FILE) {
            Ok(summary) => League::from_json(&players, &matches, Some(&summary)),
            Err(_) => {
                info!("no player summary in {}, deriving from match history", dir.display());
                League::from_json_derived(&players, &matches)
            }
        }
    }

    pub fn open(source: &DataSource) -> MatchupResult<League> {
        match source {
            DataSource::Dir(dir) => League::load(dir),
            DataSource::Demo => Ok(DEMO_LEAGUE.clone()),
        }
    }

    /// Resolves a team name: exact (case-insensitive) first, then substring.
    pub fn find_team(&self, query: &str) -> MatchupResult<&str> {
        let key = normalize_name(query);
        self.teams
            .iter()
            .find(|t| normalize_name(t) == key)
            .or_else(|| self.teams.iter().find(|t| normalize_name(t).contains(&key)))
            .map(String::as_str)
            .ok_or_else(|| MatchupError::TeamNotFound(query.to_string()))
    }

    /// A team's players in roster order.
    pub fn team_players(&self, query: &str) -> MatchupResult<Vec<Player>> {
        let team = self.find_team(query)?;
        Ok(self
            .players
            .iter()
            .filter(|p| p.team == team)
            .cloned()
            .collect())
    }

    /// Looks up a player by exact name, then case-insensitively.
    pub fn player(&self, name: &str) -> MatchupResult<&Player> {
        let key = normalize_name(name);
        self.players
            .iter()
            .find(|p| p.name == name)
            .or_else(|| self.players.iter().find(|p| normalize_name(&p.name) == key))
            .ok_or_else(|| MatchupError::PlayerNotFound(name.to_string()))
    }
}

/// Summaries for every player, treating the snapshot as a single season:
/// one season line from the roster row, ratings from the match history.
pub fn derive_summaries(players: &[Player], matches: &[Match]) -> HashMap<String, PlayerSummary> {
    players
        .iter()
        .map(|p| {
            let season = SeasonStat {
                season_name: CURRENT_SEASON.to_string(),
                season_year: 0,
                team: Some(p.team.clone()).filter(|t| !t.is_empty()),
                handicap: Some(p.handicap),
            };
            (p.name.clone(), summarize(&p.name, &[season], matches))
        })
        .collect()
}

/// `roster` without the named players (case-insensitive).
pub fn without(roster: Vec<Player>, excluded: &[String]) -> Vec<Player> {
    let excluded: Vec<String> = excluded.iter().map(|n| normalize_name(n)).collect();
    roster
        .into_iter()
        .filter(|p| !excluded.contains(&normalize_name(&p.name)))
        .collect()
}
