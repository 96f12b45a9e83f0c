use approx::assert_abs_diff_eq;
use matchup_cli::error::MatchupError;
use matchup_cli::player::Player;
use matchup_cli::probability::win_probability;
use matchup_cli::session::*;

fn rosters() -> (Vec<Player>, Vec<Player>, Vec<Player>) {
    let ours = vec![
        Player::new("Ace", 7.0),
        Player::new("Bea", 5.0),
        Player::new("Cal", 3.0),
        Player::new("Dot", 2.0),
        Player::new("Eli", 4.0),
    ];
    let theirs = vec![
        Player::new("Wes", 6.0),
        Player::new("Xia", 4.0),
        Player::new("Yul", 3.0),
        Player::new("Zed", 2.0),
    ];
    let players = ours.iter().chain(&theirs).cloned().collect();
    (ours, theirs, players)
}

// ---------------------------------------------------------------------------
// Full match flow
// ---------------------------------------------------------------------------

#[test]
fn test_full_match_after_winning_flip() {
    let (ours, theirs, players) = rosters();
    let mut session = MatchSession::new(ours, theirs, true);
    let opponent_order = ["Xia", "Wes", "Zed", "Yul"];

    for (i, opp) in opponent_order.iter().enumerate() {
        let game = i + 1;
        assert_eq!(session.current_game(), Some(game));

        if is_home_selecting_blind(game, true) {
            assert_eq!(session.next_action(), NextAction::OurBlindPick(game));
            let pick = session.recommend(&players, &[]).unwrap().name.clone();
            assert_eq!(session.record_ours(&pick).unwrap(), game);
            assert_eq!(session.record_theirs(opp).unwrap(), game);
        } else {
            assert_eq!(session.next_action(), NextAction::OpponentPick(game));
            assert!(matches!(
                session.recommend(&players, &[]),
                Err(MatchupError::OutOfTurn { .. })
            ));
            session.record_theirs(opp).unwrap();
            assert_eq!(session.next_action(), NextAction::OurResponse(game));
            let pick = session.recommend(&players, &[]).unwrap().name.clone();
            session.record_ours(&pick).unwrap();
        }
    }

    assert!(session.is_complete());
    assert_eq!(session.next_action(), NextAction::Complete);
    assert_eq!(session.ours_available().len(), 1);
    assert!(session.theirs_available().is_empty());
    assert!(matches!(
        session.recommend(&players, &[]),
        Err(MatchupError::SessionComplete)
    ));
    assert!(matches!(session.record_theirs("Wes"), Err(MatchupError::SessionComplete)));
}

#[test]
fn test_lost_flip_schedule() {
    let (ours, theirs, players) = rosters();
    let mut session = MatchSession::new(ours, theirs, false);
    assert!(!session.won_coin_flip());

    let mut actions = Vec::new();
    while !session.is_complete() {
        let action = session.next_action();
        actions.push(action);
        match action {
            NextAction::OurBlindPick(_) | NextAction::OurResponse(_) => {
                let pick = session.recommend(&players, &[]).unwrap().name.clone();
                session.record_ours(&pick).unwrap();
            }
            NextAction::OpponentPick(_) => {
                let name = session.theirs_available()[0].name.clone();
                session.record_theirs(&name).unwrap();
            }
            NextAction::Complete => unreachable!(),
        }
    }

    assert_eq!(
        actions,
        vec![
            NextAction::OurBlindPick(1),
            NextAction::OpponentPick(1),
            NextAction::OpponentPick(2),
            NextAction::OurResponse(2),
            NextAction::OpponentPick(3),
            NextAction::OurResponse(3),
            NextAction::OurBlindPick(4),
            NextAction::OpponentPick(4),
        ]
    );
}

#[test]
fn test_each_player_used_once() {
    let (ours, theirs, players) = rosters();
    let mut session = MatchSession::new(ours, theirs, false);
    while !session.is_complete() {
        match session.next_action() {
            NextAction::OpponentPick(_) => {
                let name = session.theirs_available()[0].name.clone();
                session.record_theirs(&name).unwrap();
            }
            _ => {
                let pick = session.recommend(&players, &[]).unwrap().name.clone();
                session.record_ours(&pick).unwrap();
            }
        }
    }

    let results = session.summary(&players, &[]);
    let mut ours_used: Vec<&str> = results.iter().map(|r| r.ours.name.as_str()).collect();
    ours_used.sort_unstable();
    ours_used.dedup();
    assert_eq!(ours_used.len(), NUM_GAMES);
}

#[test]
fn test_unknown_player_rejected() {
    let (ours, theirs, _) = rosters();
    let mut session = MatchSession::new(ours, theirs, false);
    assert!(matches!(
        session.record_ours("Nobody"),
        Err(MatchupError::PlayerUnavailable(_))
    ));
    assert_eq!(session.next_action(), NextAction::OurBlindPick(1));
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[test]
fn test_summary_of_partial_match() {
    let (ours, theirs, players) = rosters();
    let mut session = MatchSession::new(ours, theirs, false);
    session.record_ours("Bea").unwrap();
    session.record_theirs("Wes").unwrap();
    session.record_theirs("Zed").unwrap();

    let results = session.summary(&players, &[]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].game, 1);
    assert_eq!(results[0].ours.name, "Bea");
    assert_eq!(results[0].theirs.name, "Wes");
    assert_abs_diff_eq!(
        expected_game_wins(&results),
        win_probability("Bea", "Wes", &players, &[])
    );

    let slot = session.game(2).unwrap();
    assert!(slot.ours.is_none());
    assert_eq!(slot.theirs.as_ref().map(|p| p.name.as_str()), Some("Zed"));
}

#[test]
fn test_next_action_display() {
    assert_eq!(NextAction::OurBlindPick(2).to_string(), "game 2: our blind pick");
    assert_eq!(NextAction::Complete.to_string(), "complete");
}
