//! Derives the optional player enrichment fields from multi-season records.
//! `data::derive_summaries` runs this over a single-season snapshot when a
//! data directory has no precomputed summary file.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::player::{HandicapTrend, Match, Player, RatingTrend};

pub const BASE_RATING: f64 = 1500.0;
pub const RATING_STEP: f64 = 32.0;

const TREND_WINDOW: usize = 5;
const TREND_THRESHOLD: f64 = 20.0;
const RECENT_MATCHES: usize = 10;

/// One player's line in one season's final standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonStat {
    pub season_name: String,
    pub season_year: u32,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub handicap: Option<f64>,
}

impl SeasonStat {
    pub fn new(season_name: &str, season_year: u32, team: &str, handicap: f64) -> SeasonStat {
        SeasonStat {
            season_name: season_name.to_string(),
            season_year,
            team: Some(team.to_string()),
            handicap: Some(handicap),
        }
    }

    fn sort_key(&self) -> (u32, u8) {
        (self.season_year, season_index(&self.season_name))
    }
}

/// Position of a season within its year; unknown names sort first.
pub fn season_index(season_name: &str) -> u8 {
    match season_name.to_lowercase().as_str() {
        "spring" => 1,
        "summer" => 2,
        "fall" => 3,
        _ => 0,
    }
}

/// Summary of a player's history, as stored in `player_summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSummary {
    pub name: String,
    pub current_team: Option<String>,
    pub current_handicap: Option<f64>,
    pub handicap_trend: HandicapTrend,
    pub handicap_changed_recently: bool,
    pub recent_win_percentage: f64,
    pub elo_rating: f64,
    pub rating_trend: RatingTrend,
    pub seasons_played: u32,
    pub team_history: Vec<String>,
}

impl Default for PlayerSummary {
    fn default() -> Self {
        PlayerSummary {
            name: String::new(),
            current_team: None,
            current_handicap: None,
            handicap_trend: HandicapTrend::Stable,
            handicap_changed_recently: false,
            recent_win_percentage: 0.0,
            elo_rating: BASE_RATING,
            rating_trend: RatingTrend::Stable,
            seasons_played: 1,
            team_history: Vec::new(),
        }
    }
}

impl PlayerSummary {
    /// Copy of `player` carrying this summary's enrichment fields.
    pub fn apply(&self, player: &Player) -> Player {
        Player {
            handicap_trend: self.handicap_trend,
            handicap_changed_recently: self.handicap_changed_recently,
            rating_trend: self.rating_trend,
            seasons_played: Some(self.seasons_played.max(1)),
            ..player.clone()
        }
    }
}

fn handicaps(stats: &[SeasonStat]) -> Vec<f64> {
    stats.iter().filter_map(|s| s.handicap).collect()
}

/// Last known handicap against the first, over chronologically sorted stats.
pub fn handicap_trend(stats: &[SeasonStat]) -> HandicapTrend {
    let hcps = handicaps(stats);
    match (hcps.first(), hcps.last()) {
        (Some(first), Some(last)) if hcps.len() >= 2 => {
            if last > first {
                HandicapTrend::Increasing
            } else if last < first {
                HandicapTrend::Decreasing
            } else {
                HandicapTrend::Stable
            }
        }
        _ => HandicapTrend::Stable,
    }
}

/// Whether the two most recent seasons list different handicaps.
pub fn handicap_changed_recently(stats: &[SeasonStat]) -> bool {
    match stats {
        [.., prev, last] => prev.handicap != last.handicap,
        _ => false,
    }
}

/// Win/loss rating over non-forfeit results in order, and its recent trend.
pub fn rating(results: &[bool]) -> (f64, RatingTrend) {
    let mut history = vec![BASE_RATING];
    let mut current = BASE_RATING;
    for &won in results {
        current += if won { RATING_STEP } else { -RATING_STEP };
        history.push(current);
    }

    // A base-only history means no results at all.
    if history.len() < 3 {
        return (current, RatingTrend::Stable);
    }
    let recent = &history[history.len() - TREND_WINDOW.min(history.len())..];
    let (start, end) = (recent[0], recent[recent.len() - 1]);
    let trend = if end > start + TREND_THRESHOLD {
        RatingTrend::Improving
    } else if end < start - TREND_THRESHOLD {
        RatingTrend::Declining
    } else {
        RatingTrend::Stable
    };
    (current, trend)
}

/// Win percentage (0-100) over the last ten results.
pub fn recent_win_percentage(results: &[bool]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let recent = &results[results.len() - RECENT_MATCHES.min(results.len())..];
    let wins = recent.iter().filter(|&&w| w).count();
    wins as f64 / recent.len() as f64 * 100.0
}

fn team_history(name: &str, stats: &[SeasonStat], matches: &[&Match]) -> Vec<String> {
    let mut teams: Vec<String> = Vec::new();
    for team in stats.iter().filter_map(|s| s.team.as_ref()) {
        if teams.last() != Some(team) {
            teams.push(team.clone());
        }
    }
    if teams.is_empty() {
        let mut seen = HashSet::new();
        for m in matches {
            let team = if m.home_player == name {
                m.home_team.as_ref()
            } else {
                m.away_team.as_ref()
            };
            if let Some(team) = team {
                if seen.insert(team.clone()) {
                    teams.push(team.clone());
                }
            }
        }
    }
    teams
}

/// Builds `name`'s summary from their season lines and all matches.
pub fn summarize(name: &str, stats: &[SeasonStat], matches: &[Match]) -> PlayerSummary {
    let mut stats = stats.to_vec();
    stats.sort_by_key(SeasonStat::sort_key);

    let mut own: Vec<&Match> = matches.iter().filter(|m| m.involves(name)).collect();
    own.sort_by(|a, b| {
        let da = a.date.as_deref().unwrap_or("0000-00-00");
        let db = b.date.as_deref().unwrap_or("0000-00-00");
        da.cmp(db)
    });
    let results: Vec<bool> = own
        .iter()
        .filter(|m| !m.forfeit)
        .map(|m| m.won_by(name))
        .collect();

    let (elo_rating, rating_trend) = rating(&results);
    let team_history = team_history(name, &stats, &own);
    let seasons: HashSet<(&str, u32)> = stats
        .iter()
        .map(|s| (s.season_name.as_str(), s.season_year))
        .collect();

    PlayerSummary {
        name: name.to_string(),
        current_team: team_history.last().cloned(),
        current_handicap: stats.last().and_then(|s| s.handicap),
        handicap_trend: handicap_trend(&stats),
        handicap_changed_recently: handicap_changed_recently(&stats),
        recent_win_percentage: recent_win_percentage(&results),
        elo_rating,
        rating_trend,
        seasons_played: seasons.len() as u32,
        team_history,
    }
}
