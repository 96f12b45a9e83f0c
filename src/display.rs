use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::player::{HandicapTrend, Player, RatingTrend};
use crate::probability::{HeadToHead, ProbabilityBreakdown};
use crate::session::GameResult;
use crate::strategy::Pairing;

pub fn probability_bar(probability: f64, width: usize) -> String {
    let filled = ((probability * width as f64) as usize).min(width);
    let bar: String = "\u{2588}".repeat(filled) + &"\u{2591}".repeat(width - filled);
    let pct = format!("{:.1}%", probability * 100.0);

    if probability >= 0.6 {
        format!("{} {}", bar.green(), pct)
    } else if probability >= 0.4 {
        format!("{} {}", bar.yellow(), pct)
    } else {
        format!("{} {}", bar.red(), pct)
    }
}

fn pct_cell(probability: f64) -> Cell {
    let text = format!("{:.1}%", probability * 100.0);
    let styled = if probability >= 0.6 {
        text.green().bold().to_string()
    } else if probability < 0.4 {
        text.red().to_string()
    } else {
        text
    };
    Cell::new(styled).set_alignment(CellAlignment::Right)
}

fn handicap_trend_label(player: &Player) -> String {
    let label = match player.handicap_trend {
        HandicapTrend::Stable => "stable".dimmed().to_string(),
        HandicapTrend::Increasing => "\u{2191} up".to_string(),
        HandicapTrend::Decreasing => "\u{2193} down".to_string(),
    };
    if player.handicap_changed_recently {
        format!("{} *", label)
    } else {
        label
    }
}

fn rating_trend_label(trend: RatingTrend) -> String {
    match trend {
        RatingTrend::Stable => "stable".dimmed().to_string(),
        RatingTrend::Improving => "improving".green().to_string(),
        RatingTrend::Declining => "declining".red().to_string(),
    }
}

pub fn roster_table(team: &str, players: &[Player]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Player"),
        Cell::new("HCP").set_alignment(CellAlignment::Right),
        Cell::new("W-L").set_alignment(CellAlignment::Right),
        Cell::new("Win %").set_alignment(CellAlignment::Right),
        Cell::new("Handicap"),
        Cell::new("Form"),
        Cell::new("Seasons").set_alignment(CellAlignment::Right),
    ]);

    for p in players {
        table.add_row(vec![
            Cell::new(p.display_name().bold().to_string()),
            Cell::new(format!("{}", p.handicap)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{}-{}", p.wins, p.losses)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", p.win_pct() * 100.0)).set_alignment(CellAlignment::Right),
            Cell::new(handicap_trend_label(p)),
            Cell::new(rating_trend_label(p.rating_trend)),
            Cell::new(p.seasons()).set_alignment(CellAlignment::Right),
        ]);
    }

    format!("  {}\n{}", team.bold(), table)
}

/// Rows are `ours`, columns `theirs`; `grid[r][c]` is our win probability.
pub fn probability_grid(ours: &[Player], theirs: &[Player], grid: &[Vec<f64>]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("")];
    for t in theirs {
        header.push(Cell::new(t.display_name()).set_alignment(CellAlignment::Center));
    }
    table.set_header(header);

    for (o, row) in ours.iter().zip(grid) {
        let mut cells = vec![Cell::new(
            format!("{} ({})", o.display_name(), o.handicap).bold().to_string(),
        )];
        cells.extend(row.iter().map(|&p| pct_cell(p)));
        table.add_row(cells);
    }

    table.to_string()
}

pub fn lineup_table(pairings: &[Pairing<'_>]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Ours"),
        Cell::new("Theirs"),
        Cell::new("Win %").set_alignment(CellAlignment::Right),
    ]);
    for p in pairings {
        table.add_row(vec![
            Cell::new(p.ours.display_name().bold().to_string()),
            Cell::new(p.theirs.display_name()),
            pct_cell(p.probability),
        ]);
    }
    table.to_string()
}

pub fn summary_table(results: &[GameResult]) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Game").set_alignment(CellAlignment::Center),
        Cell::new("Ours"),
        Cell::new("Theirs"),
        Cell::new("Win %").set_alignment(CellAlignment::Right),
    ]);
    for r in results {
        table.add_row(vec![
            Cell::new(r.game).set_alignment(CellAlignment::Center),
            Cell::new(r.ours.display_name().bold().to_string()),
            Cell::new(r.theirs.display_name()),
            pct_cell(r.probability),
        ]);
    }
    table.to_string()
}

pub fn breakdown_table(breakdown: &ProbabilityBreakdown) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Factor").set_alignment(CellAlignment::Left),
        Cell::new("Value").set_alignment(CellAlignment::Right),
    ]);

    let signed = |v: f64| format!("{:+.1}%", v * 100.0);
    table.add_row(vec![
        Cell::new("Handicap relation".bold().to_string()),
        Cell::new(breakdown.relation.to_string()),
    ]);
    table.add_row(vec![
        Cell::new("Own record vs relation".bold().to_string()),
        Cell::new(format!(
            "{:.0}% over {}",
            breakdown.own_history.win_rate * 100.0,
            breakdown.own_history.matches
        )),
    ]);
    table.add_row(vec![
        Cell::new("Opponent record as inverse".bold().to_string()),
        Cell::new(format!(
            "{:.0}% over {}",
            breakdown.opponent_history.win_rate * 100.0,
            breakdown.opponent_history.matches
        )),
    ]);
    table.add_row(vec![
        Cell::new("Blended base".bold().to_string()),
        Cell::new(format!("{:.1}%", breakdown.base * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Handicap gap".bold().to_string()),
        Cell::new(signed(breakdown.handicap_adjustment)),
    ]);
    table.add_row(vec![
        Cell::new("Trends".bold().to_string()),
        Cell::new(signed(breakdown.trend_adjustment)),
    ]);
    table.add_row(vec![
        Cell::new("Experience".bold().to_string()),
        Cell::new(signed(breakdown.experience_adjustment)),
    ]);
    let h2h = match breakdown.head_to_head {
        Some(h) => format!("{:.0}% over {} (30% weight)", h.win_rate * 100.0, h.matches),
        None => "none".dimmed().to_string(),
    };
    table.add_row(vec![Cell::new("Head-to-head".bold().to_string()), Cell::new(h2h)]);

    table.to_string()
}

pub fn head_to_head_line(first: &str, second: &str, record: &HeadToHead) -> String {
    if record.total == 0 {
        return format!("{} and {} have not played", first, second).dimmed().to_string();
    }
    format!(
        "{} {} - {} {} ({} matches)",
        first.bold(),
        record.first_wins,
        record.second_wins,
        second.bold(),
        record.total
    )
}

/// `label` followed by the player's full name and an optional detail.
pub fn recommendation_line(label: &str, player: &Player, detail: &str) -> String {
    format!(
        "  {} {}  {}",
        label.cyan().bold(),
        player.name.green().bold(),
        detail
    )
}

pub fn print_section(title: &str, content: &str) {
    println!("\n{}", title.cyan().bold());
    println!("  {}", content);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn print_success(msg: &str) {
    println!("{}", msg.green().bold());
}
