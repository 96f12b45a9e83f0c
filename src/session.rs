//! Game-by-game flow for one team match.
//!
//! A match is four games. The coin flip decides who commits blind: the side
//! that lost the flip picks blind in games 1 and 4, the winner in games 2
//! and 3. `MatchSession` keeps the two available pools and asks the
//! selection strategy for a recommendation at each of our decision points.

use std::fmt;

use tracing::debug;

use crate::error::{MatchupError, MatchupResult};
use crate::player::{Match, Player};
use crate::probability::win_probability;
use crate::strategy::{pick_best_response, pick_blind};

pub const NUM_GAMES: usize = 4;

/// Whether our (home) side commits blind in `game` (1-based).
pub fn is_home_selecting_blind(game: usize, won_coin_flip: bool) -> bool {
    if won_coin_flip {
        game == 2 || game == 3
    } else {
        game == 1 || game == 4
    }
}

/// What the session is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// We commit blind in this game.
    OurBlindPick(usize),
    /// The opponent reveals their pick for this game.
    OpponentPick(usize),
    /// We answer the opponent's revealed pick.
    OurResponse(usize),
    Complete,
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextAction::OurBlindPick(g) => write!(f, "game {}: our blind pick", g),
            NextAction::OpponentPick(g) => write!(f, "game {}: opponent pick", g),
            NextAction::OurResponse(g) => write!(f, "game {}: our response", g),
            NextAction::Complete => write!(f, "complete"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSlot {
    pub ours: Option<Player>,
    pub theirs: Option<Player>,
}

impl GameSlot {
    fn is_complete(&self) -> bool {
        self.ours.is_some() && self.theirs.is_some()
    }
}

/// A finished game with its pre-match probability.
#[derive(Debug, Clone, PartialEq)]
pub struct GameResult {
    pub game: usize,
    pub ours: Player,
    pub theirs: Player,
    pub probability: f64,
}

#[derive(Debug, Clone)]
pub struct MatchSession {
    won_coin_flip: bool,
    ours_available: Vec<Player>,
    theirs_available: Vec<Player>,
    games: [GameSlot; NUM_GAMES],
}

impl MatchSession {
    pub fn new(ours: Vec<Player>, theirs: Vec<Player>, won_coin_flip: bool) -> MatchSession {
        MatchSession {
            won_coin_flip,
            ours_available: ours,
            theirs_available: theirs,
            games: Default::default(),
        }
    }

    pub fn won_coin_flip(&self) -> bool {
        self.won_coin_flip
    }

    pub fn ours_available(&self) -> &[Player] {
        &self.ours_available
    }

    pub fn theirs_available(&self) -> &[Player] {
        &self.theirs_available
    }

    pub fn game(&self, game: usize) -> MatchupResult<&GameSlot> {
        if !(1..=NUM_GAMES).contains(&game) {
            return Err(MatchupError::InvalidGame(game));
        }
        Ok(&self.games[game - 1])
    }

    /// First game (1-based) that still needs a pick.
    pub fn current_game(&self) -> Option<usize> {
        self.games.iter().position(|g| !g.is_complete()).map(|i| i + 1)
    }

    pub fn is_complete(&self) -> bool {
        self.current_game().is_none()
    }

    pub fn we_select_blind(&self) -> bool {
        self.current_game()
            .is_some_and(|g| is_home_selecting_blind(g, self.won_coin_flip))
    }

    pub fn next_action(&self) -> NextAction {
        let Some(game) = self.current_game() else {
            return NextAction::Complete;
        };
        let slot = &self.games[game - 1];
        if is_home_selecting_blind(game, self.won_coin_flip) {
            if slot.ours.is_none() {
                NextAction::OurBlindPick(game)
            } else {
                NextAction::OpponentPick(game)
            }
        } else if slot.theirs.is_none() {
            NextAction::OpponentPick(game)
        } else {
            NextAction::OurResponse(game)
        }
    }

    /// Recommendation for our current decision point.
    pub fn recommend(&self, players: &[Player], matches: &[Match]) -> MatchupResult<&Player> {
        match self.next_action() {
            NextAction::OurBlindPick(_) => {
                pick_blind(&self.ours_available, &self.theirs_available, players, matches)
            }
            NextAction::OurResponse(game) => {
                let opponent = self.games[game - 1]
                    .theirs
                    .as_ref()
                    .ok_or(MatchupError::OutOfTurn {
                        game,
                        expected: "opponent pick",
                    })?;
                pick_best_response(
                    game,
                    opponent,
                    &self.ours_available,
                    &self.theirs_available,
                    players,
                    matches,
                )
            }
            NextAction::OpponentPick(game) => Err(MatchupError::OutOfTurn {
                game,
                expected: "opponent pick",
            }),
            NextAction::Complete => Err(MatchupError::SessionComplete),
        }
    }

    fn take(pool: &mut Vec<Player>, name: &str) -> MatchupResult<Player> {
        let idx = pool
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| MatchupError::PlayerUnavailable(name.to_string()))?;
        Ok(pool.remove(idx))
    }

    /// Commit one of our players to the current game.
    pub fn record_ours(&mut self, name: &str) -> MatchupResult<usize> {
        let game = match self.next_action() {
            NextAction::OurBlindPick(g) | NextAction::OurResponse(g) => g,
            NextAction::OpponentPick(game) => {
                return Err(MatchupError::OutOfTurn {
                    game,
                    expected: "opponent pick",
                })
            }
            NextAction::Complete => return Err(MatchupError::SessionComplete),
        };
        let player = Self::take(&mut self.ours_available, name)?;
        debug!(game, player = %player.name, "recorded our pick");
        self.games[game - 1].ours = Some(player);
        Ok(game)
    }

    /// Record the opponent's player for the current game.
    pub fn record_theirs(&mut self, name: &str) -> MatchupResult<usize> {
        let game = match self.next_action() {
            NextAction::OpponentPick(g) => g,
            NextAction::OurBlindPick(game) | NextAction::OurResponse(game) => {
                return Err(MatchupError::OutOfTurn {
                    game,
                    expected: "our pick",
                })
            }
            NextAction::Complete => return Err(MatchupError::SessionComplete),
        };
        let player = Self::take(&mut self.theirs_available, name)?;
        debug!(game, player = %player.name, "recorded opponent pick");
        self.games[game - 1].theirs = Some(player);
        Ok(game)
    }

    /// Completed games with our pre-match win probability for each.
    pub fn summary(&self, players: &[Player], matches: &[Match]) -> Vec<GameResult> {
        self.games
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| match (&slot.ours, &slot.theirs) {
                (Some(ours), Some(theirs)) => Some(GameResult {
                    game: i + 1,
                    probability: win_probability(&ours.name, &theirs.name, players, matches),
                    ours: ours.clone(),
                    theirs: theirs.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

pub fn expected_game_wins(results: &[GameResult]) -> f64 {
    results.iter().map(|r| r.probability).sum()
}
