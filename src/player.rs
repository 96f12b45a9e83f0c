use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Direction a player's handicap has moved across seasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandicapTrend {
    #[default]
    Stable,
    Increasing,
    Decreasing,
}

impl fmt::Display for HandicapTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandicapTrend::Stable => write!(f, "stable"),
            HandicapTrend::Increasing => write!(f, "increasing"),
            HandicapTrend::Decreasing => write!(f, "decreasing"),
        }
    }
}

/// Direction of a player's rating over their most recent matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingTrend {
    #[default]
    Stable,
    Improving,
    Declining,
}

impl fmt::Display for RatingTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatingTrend::Stable => write!(f, "stable"),
            RatingTrend::Improving => write!(f, "improving"),
            RatingTrend::Declining => write!(f, "declining"),
        }
    }
}

/// How one player's handicap compares to an opponent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandicapRelation {
    Lower,
    Equal,
    Higher,
}

impl HandicapRelation {
    /// Relation of `own` to `opponent`.
    pub fn between(own: f64, opponent: f64) -> HandicapRelation {
        match own.partial_cmp(&opponent) {
            Some(Ordering::Less) => HandicapRelation::Lower,
            Some(Ordering::Greater) => HandicapRelation::Higher,
            _ => HandicapRelation::Equal,
        }
    }

    /// The same relation seen from the other side of the table.
    pub fn inverse(self) -> HandicapRelation {
        match self {
            HandicapRelation::Lower => HandicapRelation::Higher,
            HandicapRelation::Higher => HandicapRelation::Lower,
            HandicapRelation::Equal => HandicapRelation::Equal,
        }
    }
}

impl fmt::Display for HandicapRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandicapRelation::Lower => write!(f, "lower"),
            HandicapRelation::Equal => write!(f, "equal"),
            HandicapRelation::Higher => write!(f, "higher"),
        }
    }
}

/// A rostered player as supplied by the caller.
///
/// The enrichment fields are optional in the source data and default to
/// `stable` trends, no recent handicap change, and one season played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub team: String,
    pub handicap: f64,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub handicap_trend: HandicapTrend,
    #[serde(default)]
    pub handicap_changed_recently: bool,
    #[serde(default)]
    pub rating_trend: RatingTrend,
    #[serde(default)]
    pub seasons_played: Option<u32>,
}

impl Player {
    pub fn new(name: &str, handicap: f64) -> Player {
        Player {
            name: name.to_string(),
            team: String::new(),
            handicap,
            wins: 0,
            losses: 0,
            handicap_trend: HandicapTrend::Stable,
            handicap_changed_recently: false,
            rating_trend: RatingTrend::Stable,
            seasons_played: None,
        }
    }

    pub fn with_team(mut self, team: &str) -> Player {
        self.team = team.to_string();
        self
    }

    pub fn with_record(mut self, wins: u32, losses: u32) -> Player {
        self.wins = wins;
        self.losses = losses;
        self
    }

    /// Marks the handicap as recently changed in the given direction.
    pub fn with_handicap_change(mut self, trend: HandicapTrend) -> Player {
        self.handicap_trend = trend;
        self.handicap_changed_recently = trend != HandicapTrend::Stable;
        self
    }

    pub fn with_rating_trend(mut self, trend: RatingTrend) -> Player {
        self.rating_trend = trend;
        self
    }

    pub fn with_seasons(mut self, seasons: u32) -> Player {
        self.seasons_played = Some(seasons);
        self
    }

    /// Seasons played, treating a missing or zero count as one season.
    pub fn seasons(&self) -> u32 {
        self.seasons_played.filter(|&s| s > 0).unwrap_or(1)
    }

    pub fn total_games(&self) -> u32 {
        self.wins + self.losses
    }

    pub fn win_pct(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            0.0
        } else {
            self.wins as f64 / total as f64
        }
    }

    pub fn display_name(&self) -> String {
        format_name(&self.name)
    }
}

/// A historical match between two players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub home_player: String,
    pub away_player: String,
    #[serde(rename = "homeHCP")]
    pub home_hcp: f64,
    #[serde(rename = "awayHCP")]
    pub away_hcp: f64,
    #[serde(default)]
    pub winner: Option<String>,
    #[serde(default)]
    pub forfeit: bool,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// One player's view of a match: own handicap, opponent handicap, and result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSide {
    pub own_hcp: f64,
    pub opponent_hcp: f64,
    pub won: bool,
}

impl Match {
    pub fn new(home: &str, home_hcp: f64, away: &str, away_hcp: f64, winner: &str) -> Match {
        Match {
            home_player: home.to_string(),
            away_player: away.to_string(),
            home_hcp,
            away_hcp,
            winner: Some(winner.to_string()),
            forfeit: false,
            home_team: None,
            away_team: None,
            date: None,
        }
    }

    pub fn forfeited(mut self) -> Match {
        self.forfeit = true;
        self
    }

    pub fn on(mut self, date: &str) -> Match {
        self.date = Some(date.to_string());
        self
    }

    pub fn involves(&self, name: &str) -> bool {
        self.home_player == name || self.away_player == name
    }

    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.home_player == a && self.away_player == b)
            || (self.home_player == b && self.away_player == a)
    }

    pub fn won_by(&self, name: &str) -> bool {
        self.winner.as_deref() == Some(name)
    }

    /// The match from `name`'s seat, or `None` if they did not play in it.
    pub fn side_of(&self, name: &str) -> Option<MatchSide> {
        let (own_hcp, opponent_hcp) = if self.home_player == name {
            (self.home_hcp, self.away_hcp)
        } else if self.away_player == name {
            (self.away_hcp, self.home_hcp)
        } else {
            return None;
        };
        Some(MatchSide {
            own_hcp,
            opponent_hcp,
            won: self.won_by(name),
        })
    }
}

pub fn find_player<'a>(players: &'a [Player], name: &str) -> Option<&'a Player> {
    players.iter().find(|p| p.name == name)
}

/// Case-insensitive, whitespace-trimmed name key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// "First Middle Last" becomes "First Middle L.".
pub fn format_name(full_name: &str) -> String {
    let parts: Vec<&str> = full_name.split(' ').collect();
    if parts.len() <= 1 {
        return full_name.to_string();
    }
    let last = parts[parts.len() - 1];
    match last.chars().next() {
        Some(initial) => format!("{} {}.", parts[..parts.len() - 1].join(" "), initial),
        None => full_name.to_string(),
    }
}
