use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::data::League;
use crate::display::{probability_bar, summary_table};
use crate::player::{normalize_name, Player};
use crate::probability::win_probability;
use crate::session::{expected_game_wins, MatchSession, NextAction, NUM_GAMES};

fn prompt(message: &str, default: Option<&str>, reader: &mut dyn BufRead, writer: &mut dyn Write) -> String {
    if let Some(d) = default {
        write!(writer, "{} [{}]: ", message, d).ok();
    } else {
        write!(writer, "{}: ", message).ok();
    }
    writer.flush().ok();

    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => "q".to_string(),
        Ok(_) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                default.unwrap_or("").to_string()
            } else {
                trimmed
            }
        }
        Err(_) => "q".to_string(),
    }
}

/// Resolves a list number (1-based), full name, or unique name prefix.
pub fn parse_player_choice<'a>(answer: &str, pool: &'a [Player]) -> Option<&'a Player> {
    if let Ok(n) = answer.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| pool.get(i));
    }
    let key = normalize_name(answer);
    if key.is_empty() {
        return None;
    }
    if let Some(exact) = pool.iter().find(|p| normalize_name(&p.name) == key) {
        return Some(exact);
    }
    let mut prefixed = pool.iter().filter(|p| normalize_name(&p.name).starts_with(&key));
    match (prefixed.next(), prefixed.next()) {
        (Some(only), None) => Some(only),
        _ => None,
    }
}

fn print_pool(title: &str, pool: &[Player], writer: &mut dyn Write) {
    writeln!(writer, "\n  {}", title.bold()).ok();
    for (i, p) in pool.iter().enumerate() {
        writeln!(
            writer,
            "    {}  {} {}",
            format!("{}.", i + 1).bold(),
            p.name,
            format!("(hcp {})", p.handicap).dimmed()
        )
        .ok();
    }
}

struct QuitSession;

fn choose(
    label: &str,
    pool: &[Player],
    default: Option<&str>,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<String, QuitSession> {
    loop {
        let answer = prompt(label, default, reader, writer);
        if answer.to_lowercase() == "q" {
            return Err(QuitSession);
        }
        if let Some(p) = parse_player_choice(&answer, pool) {
            return Ok(p.name.clone());
        }
        writeln!(writer, "  {}", "Unknown player. Enter a number or name from the list.".red()).ok();
    }
}

pub fn play_command(league: &League, ours: Vec<Player>, theirs: Vec<Player>, won_coin_flip: bool) {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut reader = stdin.lock();
    let mut writer = stdout.lock();
    run_interactive_session(league, ours, theirs, won_coin_flip, &mut reader, &mut writer);
}

pub fn run_interactive_session(
    league: &League,
    ours: Vec<Player>,
    theirs: Vec<Player>,
    won_coin_flip: bool,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) {
    writeln!(writer).ok();
    writeln!(writer, "{}", "Match Night \u{2014} game-by-game lineup advisor".cyan().bold()).ok();
    writeln!(
        writer,
        "Coin flip {}. Type {} at any prompt to quit.",
        if won_coin_flip { "won" } else { "lost" },
        "'q'".bold()
    )
    .ok();

    let mut session = MatchSession::new(ours, theirs, won_coin_flip);
    if run_games(league, &mut session, reader, writer).is_err() {
        writeln!(writer, "\n{}\n", "Session ended.".cyan().bold()).ok();
        return;
    }

    let results = session.summary(&league.players, &league.matches);
    writeln!(writer, "\n{}", "Summary".cyan().bold()).ok();
    writeln!(writer, "{}", summary_table(&results)).ok();
    writeln!(
        writer,
        "  Expected games won: {:.2} of {}",
        expected_game_wins(&results),
        NUM_GAMES
    )
    .ok();
}

fn run_games(
    league: &League,
    session: &mut MatchSession,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<(), QuitSession> {
    loop {
        let action = session.next_action();
        match action {
            NextAction::Complete => return Ok(()),
            NextAction::OpponentPick(game) => {
                if session.theirs_available().is_empty() {
                    writeln!(writer, "  {}", "Opponent has no players left.".red()).ok();
                    return Err(QuitSession);
                }
                writeln!(writer, "\n{}", format!("Game {}", game).cyan().bold()).ok();
                print_pool("Opponent players", session.theirs_available(), writer);
                let name = choose("  Opponent pick", session.theirs_available(), None, reader, writer)?;
                if let Err(e) = session.record_theirs(&name) {
                    writeln!(writer, "  {}", e.to_string().red()).ok();
                }
            }
            NextAction::OurBlindPick(game) | NextAction::OurResponse(game) => {
                if matches!(action, NextAction::OurBlindPick(_)) {
                    writeln!(writer, "\n{}", format!("Game {} \u{2014} we pick blind", game).cyan().bold()).ok();
                }
                let recommended = match session.recommend(&league.players, &league.matches) {
                    Ok(p) => p.name.clone(),
                    Err(e) => {
                        writeln!(writer, "  {}", e.to_string().red()).ok();
                        return Err(QuitSession);
                    }
                };
                let slot_opponent = session
                    .game(game)
                    .ok()
                    .and_then(|slot| slot.theirs.as_ref())
                    .map(|p| p.name.clone());
                match &slot_opponent {
                    Some(opp) => {
                        let p = win_probability(&recommended, opp, &league.players, &league.matches);
                        writeln!(
                            writer,
                            "  {} {} vs {}  {}",
                            "Recommended:".bold(),
                            recommended.green().bold(),
                            opp,
                            probability_bar(p, 20)
                        )
                        .ok();
                    }
                    None => {
                        writeln!(writer, "  {} {}", "Recommended:".bold(), recommended.green().bold()).ok();
                    }
                }
                print_pool("Our players", session.ours_available(), writer);
                let name = choose(
                    "  Our pick",
                    session.ours_available(),
                    Some(recommended.as_str()),
                    reader,
                    writer,
                )?;
                if let Err(e) = session.record_ours(&name) {
                    writeln!(writer, "  {}", e.to_string().red()).ok();
                }
            }
        }
    }
}
