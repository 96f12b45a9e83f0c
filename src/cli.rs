use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use crate::config::DataSource;
use crate::data::{without, League};
use crate::display::{
    breakdown_table, head_to_head_line, lineup_table, print_error, print_section, print_success,
    probability_bar, probability_grid, recommendation_line, roster_table,
};
use crate::error::{MatchupError, MatchupResult};
use crate::play::play_command;
use crate::player::Player;
use crate::probability::{
    head_to_head_record, probability_breakdown, probability_matrix, win_probability,
    win_rates_by_handicap,
};
use crate::session::NUM_GAMES;
use crate::strategy::{blind_scores, expected_wins, optimal_lineup, pick_best_response, pick_blind};

#[derive(Parser)]
#[command(name = "matchup", version = "1.0.0", about = "Team match advisor \u{2014} win probabilities and lineup selection.")]
struct Cli {
    /// League data directory (overrides MATCHUP_DATA_DIR; defaults to the demo league)
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum Coin {
    Won,
    Lost,
    Random,
}

impl Coin {
    fn won(&self) -> bool {
        match self {
            Coin::Won => true,
            Coin::Lost => false,
            Coin::Random => rand::random::<bool>(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List teams in the league
    Teams,
    /// Show a team's roster
    Roster {
        /// Team name (case-insensitive, partial match allowed)
        team: String,
    },
    /// Win probability of one player over another, with the factor breakdown
    Prob {
        /// Our player
        player: String,
        /// Opponent
        opponent: String,
    },
    /// Head-to-head record and handicap split for two players
    H2h {
        player: String,
        opponent: String,
    },
    /// Probability grid for every pairing between two teams
    Grid {
        #[arg(long)]
        ours: String,
        #[arg(long)]
        theirs: String,
        /// Players to leave out (either side)
        #[arg(long = "out")]
        out: Vec<String>,
    },
    /// Optimal full lineup across all remaining pairings
    Lineup {
        #[arg(long)]
        ours: String,
        #[arg(long)]
        theirs: String,
        /// Players to leave out (either side)
        #[arg(long = "out")]
        out: Vec<String>,
    },
    /// Recommend whom to commit blind
    Blind {
        #[arg(long)]
        ours: String,
        #[arg(long)]
        theirs: String,
        /// Players already used in earlier games (either side)
        #[arg(long = "used")]
        used: Vec<String>,
    },
    /// Recommend whom to send against a revealed opponent
    Respond {
        /// Game number (1-4)
        #[arg(short, long)]
        game: usize,
        /// The opponent's revealed player
        #[arg(long)]
        opponent: String,
        #[arg(long)]
        ours: String,
        #[arg(long)]
        theirs: String,
        /// Players already used in earlier games (either side)
        #[arg(long = "used")]
        used: Vec<String>,
    },
    /// Interactive game-by-game advisor for a full match
    Play {
        #[arg(long)]
        ours: String,
        #[arg(long)]
        theirs: String,
        /// Coin flip result
        #[arg(long, default_value = "random")]
        coin: Coin,
        /// Players sitting out tonight (either side)
        #[arg(long = "out")]
        out: Vec<String>,
    },
}

pub fn run() {
    let cli = Cli::parse();
    dispatch(cli);
}

pub fn run_with_args(args: Vec<String>) {
    let cli = Cli::parse_from(args);
    dispatch(cli);
}

fn dispatch(cli: Cli) {
    let source = DataSource::resolve(cli.data);
    let league = match League::open(&source) {
        Ok(league) => league,
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Teams => cmd_teams(&league, &source),
        Commands::Roster { team } => cmd_roster(&league, &team),
        Commands::Prob { player, opponent } => cmd_prob(&league, &player, &opponent),
        Commands::H2h { player, opponent } => cmd_h2h(&league, &player, &opponent),
        Commands::Grid { ours, theirs, out } => cmd_grid(&league, &ours, &theirs, &out),
        Commands::Lineup { ours, theirs, out } => cmd_lineup(&league, &ours, &theirs, &out),
        Commands::Blind { ours, theirs, used } => {
            blind_command(&league, &ours, &theirs, &used, &mut io::stdout().lock())
        }
        Commands::Respond {
            game,
            opponent,
            ours,
            theirs,
            used,
        } => respond_command(
            &league,
            game,
            &opponent,
            &ours,
            &theirs,
            &used,
            &mut io::stdout().lock(),
        ),
        Commands::Play {
            ours,
            theirs,
            coin,
            out,
        } => cmd_play(&league, &ours, &theirs, coin, &out),
    };

    if let Err(e) = result {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn rosters(
    league: &League,
    ours: &str,
    theirs: &str,
    excluded: &[String],
) -> MatchupResult<(Vec<Player>, Vec<Player>)> {
    let ours = without(league.team_players(ours)?, excluded);
    let theirs = without(league.team_players(theirs)?, excluded);
    Ok((ours, theirs))
}

fn cmd_teams(league: &League, source: &DataSource) -> MatchupResult<()> {
    println!("{} {}", "Teams in".bold(), source.to_string().dimmed());
    for team in &league.teams {
        let count = league.players.iter().filter(|p| &p.team == team).count();
        println!("  {}  {}", team.bold(), format!("({} players)", count).dimmed());
    }
    Ok(())
}

fn cmd_roster(league: &League, team: &str) -> MatchupResult<()> {
    let name = league.find_team(team)?;
    let players = league.team_players(name)?;
    println!("{}", roster_table(name, &players));
    Ok(())
}

fn cmd_prob(league: &League, player: &str, opponent: &str) -> MatchupResult<()> {
    let a = league.player(player)?;
    let b = league.player(opponent)?;
    let breakdown = probability_breakdown(&a.name, &b.name, &league.players, &league.matches)
        .ok_or_else(|| MatchupError::PlayerNotFound(player.to_string()))?;

    println!(
        "\n  {} ({}) vs {} ({})",
        a.name.bold(),
        a.handicap,
        b.name.bold(),
        b.handicap
    );
    println!("  {}", probability_bar(breakdown.probability, 30));
    println!("{}", breakdown_table(&breakdown));

    let reverse = win_probability(&b.name, &a.name, &league.players, &league.matches);
    print_section(
        "Reverse view",
        &format!("{} over {}: {:.1}%", b.name, a.name, reverse * 100.0),
    );
    Ok(())
}

fn cmd_h2h(league: &League, player: &str, opponent: &str) -> MatchupResult<()> {
    let a = league.player(player)?;
    let b = league.player(opponent)?;
    let record = head_to_head_record(&a.name, &b.name, &league.matches);
    println!("\n  {}", head_to_head_line(&a.name, &b.name, &record));

    for p in [a, b] {
        let rates = win_rates_by_handicap(&p.name, &league.matches);
        print_section(
            &p.name,
            &format!(
                "as lower hcp {:.0}% | equal {:.0}% | higher {:.0}%",
                rates.lower * 100.0,
                rates.equal * 100.0,
                rates.higher * 100.0
            ),
        );
    }
    Ok(())
}

fn cmd_grid(league: &League, ours: &str, theirs: &str, out: &[String]) -> MatchupResult<()> {
    let (ours, theirs) = rosters(league, ours, theirs, out)?;
    let grid = probability_matrix(&ours, &theirs, &league.players, &league.matches);
    println!("{}", probability_grid(&ours, &theirs, &grid));
    Ok(())
}

fn cmd_lineup(league: &League, ours: &str, theirs: &str, out: &[String]) -> MatchupResult<()> {
    let (ours, theirs) = rosters(league, ours, theirs, out)?;
    let lineup = optimal_lineup(&ours, &theirs, &league.players, &league.matches);
    println!("{}", lineup_table(&lineup));
    print_section(
        "Expected wins",
        &format!("{:.2} of {}", expected_wins(&lineup), lineup.len()),
    );
    Ok(())
}

/// Ranks `ours` by average probability against the remaining pool and
/// writes the blind recommendation.
pub fn blind_command(
    league: &League,
    ours: &str,
    theirs: &str,
    used: &[String],
    writer: &mut dyn Write,
) -> MatchupResult<()> {
    let (ours, theirs) = rosters(league, ours, theirs, used)?;
    let pick = pick_blind(&ours, &theirs, &league.players, &league.matches)?;

    let scores = blind_scores(&ours, &theirs, &league.players, &league.matches);
    let mut ranked: Vec<(&Player, f64)> = ours.iter().zip(scores).collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    writeln!(writer, "\n{}", "Average win probability vs remaining pool".cyan().bold()).ok();
    for (p, score) in ranked {
        writeln!(writer, "  {:<24} {}", p.display_name(), probability_bar(score, 20)).ok();
    }

    writeln!(writer, "\n{}", recommendation_line("Blind pick:", pick, "")).ok();
    Ok(())
}

/// Writes the player to send against `opponent` in `game`.
pub fn respond_command(
    league: &League,
    game: usize,
    opponent: &str,
    ours: &str,
    theirs: &str,
    used: &[String],
    writer: &mut dyn Write,
) -> MatchupResult<()> {
    if !(1..=NUM_GAMES).contains(&game) {
        return Err(MatchupError::InvalidGame(game));
    }
    let opponent = league.player(opponent)?.clone();
    let (ours, theirs) = rosters(league, ours, theirs, used)?;
    let pick = pick_best_response(
        game,
        &opponent,
        &ours,
        &theirs,
        &league.players,
        &league.matches,
    )?;
    let p = win_probability(&pick.name, &opponent.name, &league.players, &league.matches);
    writeln!(
        writer,
        "\n{}",
        recommendation_line(
            &format!("Game {} vs {}:", game, opponent.name),
            pick,
            &probability_bar(p, 20),
        )
    )
    .ok();
    Ok(())
}

fn cmd_play(league: &League, ours: &str, theirs: &str, coin: Coin, out: &[String]) -> MatchupResult<()> {
    let (ours, theirs) = rosters(league, ours, theirs, out)?;
    if ours.is_empty() {
        return Err(MatchupError::NoCandidates);
    }
    let won = coin.won();
    if won {
        print_success("We won the coin flip.");
    }
    play_command(league, ours, theirs, won);
    Ok(())
}
