use matchup_cli::cli::{blind_command, respond_command, run_with_args};
use matchup_cli::config::DataSource;
use matchup_cli::data::{without, League};
use matchup_cli::error::MatchupError;
use matchup_cli::strategy::{pick_best_response, pick_blind};

fn run(args: &[&str]) {
    let mut argv = vec!["matchup".to_string()];
    argv.extend(args.iter().map(|a| a.to_string()));
    run_with_args(argv);
}

fn demo() -> League {
    League::open(&DataSource::Demo).unwrap()
}

fn used(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Commands against the built-in demo league
// ---------------------------------------------------------------------------

#[test]
fn test_teams_and_roster() {
    run(&["teams"]);
    run(&["roster", "corner"]);
}

#[test]
fn test_probability_commands() {
    run(&["prob", "Alice Moreno", "frank liu"]);
    run(&["h2h", "Alice Moreno", "Frank Liu"]);
    run(&["grid", "--ours", "Corner Pocket", "--theirs", "Cue Tips", "--out", "Erin Walsh"]);
}

#[test]
fn test_selection_commands() {
    run(&["lineup", "--ours", "Corner Pocket", "--theirs", "Bank Shots"]);
    run(&["blind", "--ours", "Corner Pocket", "--theirs", "Bank Shots", "--used", "Alice Moreno"]);
    run(&[
        "respond", "--game", "3", "--opponent", "Gina Rossi", "--ours", "Corner Pocket",
        "--theirs", "Bank Shots", "--used", "Frank Liu", "--used", "Ben Okafor",
    ]);
}

// ---------------------------------------------------------------------------
// Recommendation output
// ---------------------------------------------------------------------------

#[test]
fn test_blind_command_prints_pick() {
    let league = demo();
    let excluded = used(&["Alice Moreno"]);
    let mut out = Vec::new();
    blind_command(&league, "corner", "bank", &excluded, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let ours = without(league.team_players("Corner Pocket").unwrap(), &excluded);
    let theirs = league.team_players("Bank Shots").unwrap();
    let expected = pick_blind(&ours, &theirs, &league.players, &league.matches).unwrap();

    assert!(text.contains("Blind pick:"), "{}", text);
    assert!(text.contains(&expected.name), "{}", text);
    assert!(!text.contains("Alice Moreno"), "{}", text);
}

#[test]
fn test_respond_command_prints_pick() {
    let league = demo();
    let excluded = used(&["Frank Liu", "Ben Okafor"]);
    let mut out = Vec::new();
    respond_command(&league, 3, "gina rossi", "Corner Pocket", "Bank Shots", &excluded, &mut out)
        .unwrap();
    let text = String::from_utf8(out).unwrap();

    let opponent = league.player("Gina Rossi").unwrap();
    let ours = without(league.team_players("Corner Pocket").unwrap(), &excluded);
    let theirs = without(league.team_players("Bank Shots").unwrap(), &excluded);
    let expected =
        pick_best_response(3, opponent, &ours, &theirs, &league.players, &league.matches).unwrap();

    assert!(text.contains("Game 3 vs Gina Rossi:"), "{}", text);
    assert!(text.contains(&expected.name), "{}", text);
    assert!(text.contains('%'));
}

#[test]
fn test_respond_command_rejects_bad_input() {
    let league = demo();
    let mut out = Vec::new();
    assert!(matches!(
        respond_command(&league, 5, "Gina Rossi", "Corner Pocket", "Bank Shots", &[], &mut out),
        Err(MatchupError::InvalidGame(5))
    ));
    assert!(matches!(
        blind_command(&league, "Rockets", "Bank Shots", &[], &mut out),
        Err(MatchupError::TeamNotFound(_))
    ));
    assert!(out.is_empty());
}
