use pretty_assertions::assert_eq;
use tennis_scoreboard::{
    MatchStatus, Player, PlayerId, Score, Side, TennisMatch, format_set_results,
};


fn new_match() -> TennisMatch {
    TennisMatch::new(
        Player::new(PlayerId(1), "Alice".to_owned()),
        Player::new(PlayerId(2), "Bob".to_owned()),
    )
}

// Replays a whitespace-separated log of point winners ("1" or "2").
fn replay_points(mut tennis_match: TennisMatch, log: &str) -> TennisMatch {
    for c in log.chars().filter(|c| !c.is_whitespace()) {
        let winner = match c {
            '1' => Side::One,
            '2' => Side::Two,
            _ => panic!("Unexpected point winner notation: {}", c),
        };
        tennis_match = tennis_match.add_point(winner);
    }
    tennis_match
}

fn game_log(winner: Side) -> String {
    match winner {
        Side::One => "1111".to_owned(),
        Side::Two => "2222".to_owned(),
    }
}

fn set_log(winner: Side) -> String { game_log(winner).repeat(6) }

fn assert_score_invariants(score: &Score) {
    let sets = score.sets();
    assert_eq!(score.finished_sets().len() as u32, sets[Side::One] + sets[Side::Two]);
    if score.tie_break().is_some() {
        assert!(score.games().values().all(|&games| games == 6));
        assert_eq!(score.points(), Score::new().points());
    }
}

#[test]
fn straight_sets_match() {
    let finished = replay_points(new_match(), &set_log(Side::One).repeat(2));
    assert_eq!(finished.status(), MatchStatus::Victory(Side::One));
    assert_eq!(finished.winner().map(|p| p.name.as_str()), Some("Alice"));
    assert_eq!(format_set_results(finished.score().final_view()), "6:0, 6:0");
}

#[test]
fn three_set_match_with_tie_break() {
    // Set 1: games alternate to 6-6, player one takes the tie-break 7-0.
    // Set 2 goes to player two, set 3 to player one.
    let mut log = String::new();
    for game in 0..12 {
        log += &game_log(if game % 2 == 0 { Side::One } else { Side::Two });
    }
    log += "1111111"; // tie-break, seven straight points
    log += &set_log(Side::Two);
    log += &set_log(Side::One);

    let finished = replay_points(new_match(), &log);
    assert_eq!(finished.status(), MatchStatus::Victory(Side::One));
    assert_eq!(
        format_set_results(finished.score().final_view()),
        "7:6 (7:0), 0:6, 6:0"
    );
    assert_eq!(finished.score().sets()[Side::One], 2);
    assert_eq!(finished.score().sets()[Side::Two], 1);
}

#[test]
fn invariants_hold_after_every_point() {
    let mut log = String::new();
    for game in 0..12 {
        log += &game_log(if game % 2 == 0 { Side::One } else { Side::Two });
    }
    log += "121212 121212 11"; // tie-break drags to 7-6, then 8-6
    log += &set_log(Side::Two);

    let mut tennis_match = new_match();
    for c in log.chars().filter(|c| !c.is_whitespace()) {
        let winner = if c == '1' { Side::One } else { Side::Two };
        tennis_match = tennis_match.add_point(winner);
        assert_score_invariants(tennis_match.score());
    }
    assert_eq!(tennis_match.score().sets()[Side::One], 1);
    assert_eq!(tennis_match.score().sets()[Side::Two], 1);
}

#[test]
fn replay_is_deterministic() {
    let mut log = set_log(Side::Two);
    log += &game_log(Side::One).repeat(5);
    log += "12121212"; // a long deuce exchange
    let a = replay_points(new_match(), &log);
    let b = replay_points(new_match(), &log);
    assert_eq!(a.score(), b.score());
    assert_eq!(a.live_view().score, b.live_view().score);
}
