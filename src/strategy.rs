use tracing::{debug, warn};

use crate::error::{MatchupError, MatchupResult};
use crate::hungarian::{solve_assignment, CostMatrix};
use crate::player::{Match, Player};
use crate::probability::{probability_matrix, win_probability, NEUTRAL_PROBABILITY};

fn finite_or_neutral(probability: f64) -> f64 {
    if probability.is_finite() {
        probability
    } else {
        NEUTRAL_PROBABILITY
    }
}

/// Cost cell for a win probability: `1 - p`, with invalid input at 0.5.
pub fn cost_of(probability: f64) -> f64 {
    1.0 - finite_or_neutral(probability)
}

/// Index of the highest score; the earliest index wins ties.
fn arg_max(scores: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.into_iter().enumerate() {
        if best.map_or(true, |(_, b)| score > b) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Mean win probability of each of `ours` against every player in `theirs`.
pub fn blind_scores(
    ours: &[Player],
    theirs: &[Player],
    players: &[Player],
    matches: &[Match],
) -> Vec<f64> {
    if theirs.is_empty() {
        return vec![NEUTRAL_PROBABILITY; ours.len()];
    }
    probability_matrix(ours, theirs, players, matches)
        .into_iter()
        .map(|row| row.into_iter().map(finite_or_neutral).sum::<f64>() / theirs.len() as f64)
        .collect()
}

/// Player to commit before the opponent's pick for the game is known.
///
/// Picks the candidate with the best average probability against the whole
/// remaining opposing pool.
pub fn pick_blind<'a>(
    ours: &'a [Player],
    theirs: &[Player],
    players: &[Player],
    matches: &[Match],
) -> MatchupResult<&'a Player> {
    match ours {
        [] => return Err(MatchupError::NoCandidates),
        [only] => {
            debug!(player = %only.name, "blind pick: single candidate");
            return Ok(only);
        }
        _ => {}
    }
    if theirs.is_empty() {
        debug!(player = %ours[0].name, "blind pick: no opponents left");
        return Ok(&ours[0]);
    }

    let scores = blind_scores(ours, theirs, players, matches);
    let best = arg_max(scores.iter().copied()).ok_or(MatchupError::NoCandidates)?;
    debug!(
        player = %ours[best].name,
        average = scores[best],
        "blind pick: best average probability"
    );
    Ok(&ours[best])
}

/// Candidate with the highest direct probability against `opponent`.
pub fn best_direct_response<'a>(
    opponent: &Player,
    ours: &'a [Player],
    players: &[Player],
    matches: &[Match],
) -> MatchupResult<&'a Player> {
    let best = arg_max(
        ours.iter()
            .map(|p| finite_or_neutral(win_probability(&p.name, &opponent.name, players, matches))),
    )
    .ok_or(MatchupError::NoCandidates)?;
    Ok(&ours[best])
}

/// Rows are `ours`; column 0 is `opponent`, the rest are `others` in order.
pub fn response_cost_matrix(
    opponent: &Player,
    ours: &[Player],
    others: &[Player],
    players: &[Player],
    matches: &[Match],
) -> CostMatrix {
    let mut columns = Vec::with_capacity(others.len() + 1);
    columns.push(opponent.clone());
    columns.extend(others.iter().cloned());

    let rows: Vec<Vec<f64>> = probability_matrix(ours, &columns, players, matches)
        .into_iter()
        .map(|row| row.into_iter().map(cost_of).collect())
        .collect();
    CostMatrix::from_rows(&rows)
}

/// Player to send against a revealed opponent in game `game`.
///
/// Solves the assignment over all remaining matchups and returns whoever is
/// paired with the revealed opponent, so later games are not starved of good
/// matchups. In the last game this reduces to the best direct matchup.
pub fn pick_best_response<'a>(
    game: usize,
    opponent: &Player,
    ours: &'a [Player],
    theirs_remaining: &[Player],
    players: &[Player],
    matches: &[Match],
) -> MatchupResult<&'a Player> {
    match ours {
        [] => return Err(MatchupError::NoCandidates),
        [only] => {
            debug!(game, player = %only.name, "response: single candidate");
            return Ok(only);
        }
        _ => {}
    }

    let others: Vec<Player> = theirs_remaining
        .iter()
        .filter(|p| p.name != opponent.name)
        .cloned()
        .collect();

    if others.is_empty() {
        let pick = best_direct_response(opponent, ours, players, matches)?;
        debug!(game, player = %pick.name, "response: last game, direct matchup");
        return Ok(pick);
    }

    let matrix = response_cost_matrix(opponent, ours, &others, players, matches);
    let assigned = solve_assignment(&matrix)
        .into_iter()
        .find(|&(r, c)| c == 0 && r < ours.len())
        .map(|(r, _)| r);

    match assigned {
        Some(row) => {
            debug!(
                game,
                player = %ours[row].name,
                opponent = %opponent.name,
                "response: assignment"
            );
            Ok(&ours[row])
        }
        None => {
            warn!(game, opponent = %opponent.name, "no assignment for revealed opponent, using direct matchup");
            best_direct_response(opponent, ours, players, matches)
        }
    }
}

/// One matchup in a full lineup.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing<'a> {
    pub ours: &'a Player,
    pub theirs: &'a Player,
    pub probability: f64,
}

/// Globally optimal pairing of every remaining player, in `ours` order.
/// Players left over on the larger side are unpaired.
pub fn optimal_lineup<'a>(
    ours: &'a [Player],
    theirs: &'a [Player],
    players: &[Player],
    matches: &[Match],
) -> Vec<Pairing<'a>> {
    let probabilities = probability_matrix(ours, theirs, players, matches);
    let costs: Vec<Vec<f64>> = probabilities
        .iter()
        .map(|row| row.iter().copied().map(cost_of).collect())
        .collect();
    let mut pairs = solve_assignment(&CostMatrix::from_rows(&costs));
    pairs.sort_unstable();
    pairs
        .into_iter()
        .map(|(r, c)| Pairing {
            ours: &ours[r],
            theirs: &theirs[c],
            probability: finite_or_neutral(probabilities[r][c]),
        })
        .collect()
}

pub fn expected_wins(pairings: &[Pairing<'_>]) -> f64 {
    pairings.iter().map(|p| p.probability).sum()
}
