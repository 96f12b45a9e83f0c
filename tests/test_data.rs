use std::path::PathBuf;

use matchup_cli::config::{DataSource, MATCHES_FILE, PLAYER_STATS_FILE};
use matchup_cli::data::{derive_summaries, without, League};
use matchup_cli::error::MatchupError;
use matchup_cli::player::{HandicapTrend, RatingTrend};

const PLAYERS: &str = r#"[
  {"team": "Sharks", "name": "Ann Lee", "handicap": 5, "wins": 3, "losses": 1, "winPercentage": "75.0%"},
  {"team": "Sharks", "name": "Bo Park", "handicap": 3},
  {"team": "Jets", "name": "Cy Dunn", "handicap": 4.5},
  {"team": "Jets", "handicap": 2}
]"#;

const MATCHES: &str = r#"[
  {"homePlayer": "Ann Lee", "awayPlayer": "Cy Dunn", "homeHCP": 5, "awayHCP": 4, "winner": "Ann Lee", "forfeit": false},
  {"homePlayer": "Bo Park", "awayPlayer": "Cy Dunn", "homeHCP": 3, "awayHCP": 4, "winner": "Cy Dunn", "forfeit": true},
  {"homePlayer": "Bo Park", "awayPlayer": "Cy Dunn", "homeHCP": 3, "awayHCP": 4, "winner": null}
]"#;

const SUMMARY: &str = r#"{
  "Bo Park": {"name": "Bo Park", "handicap_trend": "increasing", "handicap_changed_recently": true,
              "rating_trend": "declining", "seasons_played": 4}
}"#;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[test]
fn test_from_json_skips_malformed_rows() {
    let league = League::from_json(PLAYERS, MATCHES, None).unwrap();
    assert_eq!(league.players.len(), 3);
    assert_eq!(league.players[2].handicap, 4.5);
    assert_eq!(league.teams, vec!["Jets", "Sharks"]);
}

#[test]
fn test_forfeits_dropped_on_load() {
    let league = League::from_json(PLAYERS, MATCHES, None).unwrap();
    assert_eq!(league.matches.len(), 2);
    assert!(league.matches.iter().all(|m| !m.forfeit));
    assert!(league.matches[1].winner.is_none());
}

#[test]
fn test_summary_enriches_players() {
    let league = League::from_json(PLAYERS, MATCHES, Some(SUMMARY)).unwrap();
    let bo = league.player("bo park").unwrap();
    assert_eq!(bo.handicap_trend, HandicapTrend::Increasing);
    assert!(bo.handicap_changed_recently);
    assert_eq!(bo.rating_trend, RatingTrend::Declining);
    assert_eq!(bo.seasons(), 4);

    let ann = league.player("Ann Lee").unwrap();
    assert_eq!(ann.seasons_played, None);
    assert_eq!(ann.wins, 3);
}

#[test]
fn test_invalid_json_is_an_error() {
    assert!(matches!(
        League::from_json("{not json", MATCHES, None),
        Err(MatchupError::JsonError(_))
    ));
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

#[test]
fn test_find_team() {
    let league = League::from_json(PLAYERS, MATCHES, None).unwrap();
    assert_eq!(league.find_team("JETS").unwrap(), "Jets");
    assert_eq!(league.find_team("shar").unwrap(), "Sharks");
    assert!(matches!(
        league.find_team("Rockets"),
        Err(MatchupError::TeamNotFound(_))
    ));
}

#[test]
fn test_team_players_and_without() {
    let league = League::from_json(PLAYERS, MATCHES, None).unwrap();
    let sharks = league.team_players("sharks").unwrap();
    assert_eq!(sharks.len(), 2);
    let rest = without(sharks, &["ANN LEE".to_string()]);
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name, "Bo Park");
}

#[test]
fn test_unknown_player() {
    let league = League::from_json(PLAYERS, MATCHES, None).unwrap();
    assert!(matches!(
        league.player("Nobody"),
        Err(MatchupError::PlayerNotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

#[test]
fn test_demo_league() {
    let league = League::open(&DataSource::Demo).unwrap();
    assert_eq!(league.teams, vec!["Bank Shots", "Corner Pocket", "Cue Tips"]);
    assert_eq!(league.players.len(), 15);
    assert_eq!(league.matches.len(), 90);
    for team in &league.teams {
        assert_eq!(league.team_players(team).unwrap().len(), 5);
    }

    let carla = league.player("Carla Diaz").unwrap();
    assert_eq!(carla.handicap_trend, HandicapTrend::Increasing);
    assert!(carla.handicap_changed_recently);
    assert_eq!(league.player("Frank Liu").unwrap().seasons(), 6);
}

#[test]
fn test_load_directory() {
    let dir = std::env::temp_dir().join(format!("matchup-data-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(PLAYER_STATS_FILE), PLAYERS).unwrap();
    std::fs::write(dir.join(MATCHES_FILE), MATCHES).unwrap();

    let league = League::open(&DataSource::Dir(dir.clone())).unwrap();
    assert_eq!(league.players.len(), 3);
    // No summary file: every player gets a derived single-season summary.
    assert!(league.players.iter().all(|p| p.seasons_played == Some(1)));
    assert!(league.players.iter().all(|p| !p.handicap_changed_recently));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_load_missing_directory() {
    let dir = PathBuf::from("/nonexistent/matchup-data");
    match League::load(&dir) {
        Err(MatchupError::Io { path, .. }) => assert_eq!(path, dir.join(PLAYER_STATS_FILE)),
        other => panic!("expected Io error, got {:?}", other.map(|l| l.players.len())),
    }
}

// ---------------------------------------------------------------------------
// Derived summaries
// ---------------------------------------------------------------------------

#[test]
fn test_derive_summaries_from_match_history() {
    let players = r#"[
      {"team": "Sharks", "name": "Ann Lee", "handicap": 5},
      {"team": "Jets", "name": "Cy Dunn", "handicap": 4}
    ]"#;
    let matches = r#"[
      {"homePlayer": "Ann Lee", "awayPlayer": "Cy Dunn", "homeHCP": 5, "awayHCP": 4, "winner": "Ann Lee", "date": "2024-01-04"},
      {"homePlayer": "Cy Dunn", "awayPlayer": "Ann Lee", "homeHCP": 4, "awayHCP": 5, "winner": "Ann Lee", "date": "2024-01-01"},
      {"homePlayer": "Ann Lee", "awayPlayer": "Cy Dunn", "homeHCP": 5, "awayHCP": 4, "winner": "Ann Lee", "date": "2024-01-03"},
      {"homePlayer": "Cy Dunn", "awayPlayer": "Ann Lee", "homeHCP": 4, "awayHCP": 5, "winner": "Cy Dunn", "date": "2024-01-05", "forfeit": true}
    ]"#;

    let league = League::from_json_derived(players, matches).unwrap();
    assert_eq!(league.matches.len(), 3);
    let ann = league.player("Ann Lee").unwrap();
    assert_eq!(ann.rating_trend, RatingTrend::Improving);
    assert_eq!(ann.handicap_trend, HandicapTrend::Stable);
    assert_eq!(ann.seasons(), 1);
    assert_eq!(league.player("Cy Dunn").unwrap().rating_trend, RatingTrend::Declining);

    let summaries = derive_summaries(&league.players, &league.matches);
    assert_eq!(summaries["Ann Lee"].team_history, vec!["Sharks"]);
    assert_eq!(summaries["Ann Lee"].current_handicap, Some(5.0));
}
