//! Pairwise win-probability model.
//!
//! The estimate starts from a coin flip and is nudged by each player's record
//! against opponents in the same handicap relation, the handicap gap, recent
//! handicap/rating trends, experience, and finally direct head-to-head
//! results. The result is always inside `[MIN_PROBABILITY, MAX_PROBABILITY]`.

use std::fmt;

use rayon::prelude::*;

use crate::player::{
    find_player, normalize_name, HandicapRelation, HandicapTrend, Match, Player, RatingTrend,
};

pub const NEUTRAL_PROBABILITY: f64 = 0.5;
pub const MIN_PROBABILITY: f64 = 0.1;
pub const MAX_PROBABILITY: f64 = 0.9;

const MAX_HISTORY_WEIGHT: f64 = 0.3;
const FULL_WEIGHT_MATCHES: f64 = 10.0;
const HANDICAP_POINT_VALUE: f64 = 0.01;
const HANDICAP_RISE_SHIFT: f64 = 0.03;
const HANDICAP_DROP_SHIFT: f64 = 0.02;
const RATING_TREND_SHIFT: f64 = 0.03;
const EXPERIENCE_SCALE: f64 = 0.02;
const HEAD_TO_HEAD_WEIGHT: f64 = 0.3;

/// Win rate over a filtered set of matches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Performance {
    pub win_rate: f64,
    pub matches: usize,
}

impl Performance {
    const NONE: Performance = Performance {
        win_rate: NEUTRAL_PROBABILITY,
        matches: 0,
    };

    fn from_counts(wins: usize, matches: usize) -> Performance {
        if matches == 0 {
            Performance::NONE
        } else {
            Performance {
                win_rate: wins as f64 / matches as f64,
                matches,
            }
        }
    }
}

/// Every term that went into a single probability estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityBreakdown {
    pub relation: HandicapRelation,
    pub own_history: Performance,
    pub opponent_history: Performance,
    /// Probability after blending both histories into the 50/50 prior.
    pub base: f64,
    pub handicap_adjustment: f64,
    pub trend_adjustment: f64,
    pub experience_adjustment: f64,
    pub head_to_head: Option<Performance>,
    /// Value before clamping.
    pub raw: f64,
    pub probability: f64,
}

impl fmt::Display for ProbabilityBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}% (base {:.1}%, hcp {:+.1}%, trend {:+.1}%, exp {:+.1}%)",
            self.probability * 100.0,
            self.base * 100.0,
            self.handicap_adjustment * 100.0,
            self.trend_adjustment * 100.0,
            self.experience_adjustment * 100.0,
        )
    }
}

/// How `name` has done in matches where their own handicap stood in
/// `relation` to the opponent's. Forfeits are ignored.
pub fn handicap_performance(
    name: &str,
    relation: HandicapRelation,
    matches: &[Match],
) -> Performance {
    let (wins, total) = matches
        .iter()
        .filter(|m| !m.forfeit)
        .filter_map(|m| m.side_of(name))
        .filter(|side| HandicapRelation::between(side.own_hcp, side.opponent_hcp) == relation)
        .fold((0usize, 0usize), |(w, t), side| {
            (w + usize::from(side.won), t + 1)
        });
    Performance::from_counts(wins, total)
}

/// Linear ramp to the 30% ceiling at ten matches.
fn history_weight(matches: usize) -> f64 {
    (matches as f64 / FULL_WEIGHT_MATCHES * MAX_HISTORY_WEIGHT).min(MAX_HISTORY_WEIGHT)
}

fn blend(current: f64, rate: f64, weight: f64) -> f64 {
    current * (1.0 - weight) + rate * weight
}

fn handicap_change_shift(player: &Player) -> f64 {
    if !player.handicap_changed_recently {
        return 0.0;
    }
    match player.handicap_trend {
        HandicapTrend::Increasing => -HANDICAP_RISE_SHIFT,
        HandicapTrend::Decreasing => HANDICAP_DROP_SHIFT,
        HandicapTrend::Stable => 0.0,
    }
}

fn rating_shift(player: &Player) -> f64 {
    match player.rating_trend {
        RatingTrend::Improving => RATING_TREND_SHIFT,
        RatingTrend::Declining => -RATING_TREND_SHIFT,
        RatingTrend::Stable => 0.0,
    }
}

/// Exact-name head-to-head between `a` and `b`, from `a`'s side.
fn direct_matches(a: &str, b: &str, matches: &[Match]) -> Option<Performance> {
    let (wins, total) = matches
        .iter()
        .filter(|m| !m.forfeit && m.is_between(a, b))
        .fold((0usize, 0usize), |(w, t), m| (w + usize::from(m.won_by(a)), t + 1));
    (total > 0).then(|| Performance::from_counts(wins, total))
}

/// Full term-by-term estimate that `a` beats `b`, or `None` if either name
/// is missing from `players`.
pub fn probability_breakdown(
    a: &str,
    b: &str,
    players: &[Player],
    matches: &[Match],
) -> Option<ProbabilityBreakdown> {
    let pa = find_player(players, a)?;
    let pb = find_player(players, b)?;

    let relation = HandicapRelation::between(pa.handicap, pb.handicap);
    let own_history = handicap_performance(a, relation, matches);
    let opponent_history = handicap_performance(b, relation.inverse(), matches);

    let mut base = NEUTRAL_PROBABILITY;
    if own_history.matches > 0 {
        base = blend(base, own_history.win_rate, history_weight(own_history.matches));
    }
    if opponent_history.matches > 0 {
        base = blend(
            base,
            1.0 - opponent_history.win_rate,
            history_weight(opponent_history.matches),
        );
    }

    let handicap_adjustment = (pa.handicap - pb.handicap) * HANDICAP_POINT_VALUE;
    let trend_adjustment = handicap_change_shift(pa) - handicap_change_shift(pb)
        + rating_shift(pa)
        - rating_shift(pb);
    let experience_adjustment =
        EXPERIENCE_SCALE * (pa.seasons() as f64 / pb.seasons() as f64 + 1.0).ln();

    let mut raw = base + handicap_adjustment + trend_adjustment + experience_adjustment;

    let head_to_head = direct_matches(a, b, matches);
    if let Some(h2h) = head_to_head {
        raw = blend(raw, h2h.win_rate, HEAD_TO_HEAD_WEIGHT);
    }

    let probability = if raw.is_finite() {
        raw.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
    } else {
        NEUTRAL_PROBABILITY
    };

    Some(ProbabilityBreakdown {
        relation,
        own_history,
        opponent_history,
        base,
        handicap_adjustment,
        trend_adjustment,
        experience_adjustment,
        head_to_head,
        raw,
        probability,
    })
}

/// Probability that `a` beats `b`. Unknown players give exactly 0.5.
pub fn win_probability(a: &str, b: &str, players: &[Player], matches: &[Match]) -> f64 {
    probability_breakdown(a, b, players, matches)
        .map(|bd| bd.probability)
        .unwrap_or(NEUTRAL_PROBABILITY)
}

/// Probabilities for every (ours, theirs) pair, row-major in input order.
pub fn probability_matrix(
    ours: &[Player],
    theirs: &[Player],
    players: &[Player],
    matches: &[Match],
) -> Vec<Vec<f64>> {
    ours.par_iter()
        .map(|o| {
            theirs
                .iter()
                .map(|t| win_probability(&o.name, &t.name, players, matches))
                .collect()
        })
        .collect()
}

/// Direct record between two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadToHead {
    pub first_wins: usize,
    pub second_wins: usize,
    pub total: usize,
}

/// Head-to-head record using case-insensitive names; forfeits excluded.
pub fn head_to_head_record(first: &str, second: &str, matches: &[Match]) -> HeadToHead {
    let first = normalize_name(first);
    let second = normalize_name(second);
    let mut record = HeadToHead::default();

    for m in matches.iter().filter(|m| !m.forfeit) {
        let home = normalize_name(&m.home_player);
        let away = normalize_name(&m.away_player);
        let between = (home == first && away == second) || (home == second && away == first);
        if !between {
            continue;
        }
        record.total += 1;
        let winner = m.winner.as_deref().map(normalize_name);
        if winner.as_deref() == Some(first.as_str()) {
            record.first_wins += 1;
        } else if winner.as_deref() == Some(second.as_str()) {
            record.second_wins += 1;
        }
    }
    record
}

/// Win rate split by the player's own handicap relation to the opponent.
/// Buckets without matches report 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WinRates {
    pub lower: f64,
    pub equal: f64,
    pub higher: f64,
}

impl WinRates {
    pub fn get(&self, relation: HandicapRelation) -> f64 {
        match relation {
            HandicapRelation::Lower => self.lower,
            HandicapRelation::Equal => self.equal,
            HandicapRelation::Higher => self.higher,
        }
    }
}

pub fn win_rates_by_handicap(name: &str, matches: &[Match]) -> WinRates {
    let key = normalize_name(name);
    // (wins, total) per relation: lower, equal, higher
    let mut buckets = [(0usize, 0usize); 3];

    for m in matches.iter().filter(|m| !m.forfeit) {
        let (own, opp) = if normalize_name(&m.home_player) == key {
            (m.home_hcp, m.away_hcp)
        } else if normalize_name(&m.away_player) == key {
            (m.away_hcp, m.home_hcp)
        } else {
            continue;
        };
        let idx = match HandicapRelation::between(own, opp) {
            HandicapRelation::Lower => 0,
            HandicapRelation::Equal => 1,
            HandicapRelation::Higher => 2,
        };
        buckets[idx].1 += 1;
        if m.winner.as_deref().map(normalize_name).as_deref() == Some(key.as_str()) {
            buckets[idx].0 += 1;
        }
    }

    let rate = |(wins, total): (usize, usize)| {
        if total > 0 {
            wins as f64 / total as f64
        } else {
            0.0
        }
    };
    WinRates {
        lower: rate(buckets[0]),
        equal: rate(buckets[1]),
        higher: rate(buckets[2]),
    }
}
