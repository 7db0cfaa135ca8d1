use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::player::{ByPlayer, Player, Side};
use crate::score::{SETS_TO_WIN_MATCH, Score};


#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(Uuid);

impl MatchId {
    pub fn new() -> Self { MatchId(Uuid::new_v4()) }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for MatchId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(MatchId(Uuid::parse_str(s)?)) }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum MatchStatus {
    Active,
    Victory(Side),
}

// A single match between two players: their identities, a generated match id
// and the current score. Replacing the score wholesale is the only mutation
// path, modeled as "produce a new match".
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TennisMatch {
    id: MatchId,
    players: ByPlayer<Player>,
    score: Score,
}

impl TennisMatch {
    pub fn new(player_one: Player, player_two: Player) -> Self {
        TennisMatch {
            id: MatchId::new(),
            players: ByPlayer::from_array([player_one, player_two]),
            score: Score::new(),
        }
    }

    pub fn id(&self) -> MatchId { self.id }
    pub fn player(&self, side: Side) -> &Player { &self.players[side] }
    pub fn score(&self) -> &Score { &self.score }

    // Best-of-three: the first side with two sets takes the match.
    pub fn status(&self) -> MatchStatus {
        match Side::iter().find(|&side| self.score.sets()[side] >= SETS_TO_WIN_MATCH) {
            Some(side) => MatchStatus::Victory(side),
            None => MatchStatus::Active,
        }
    }

    pub fn is_finished(&self) -> bool { self.status() != MatchStatus::Active }

    pub fn winner(&self) -> Option<&Player> {
        match self.status() {
            MatchStatus::Victory(side) => Some(&self.players[side]),
            MatchStatus::Active => None,
        }
    }

    // Callers must check `is_finished` first: recording a point against a
    // finished match is a contract violation, not a recoverable error.
    pub fn add_point(&self, winner: Side) -> TennisMatch {
        assert!(
            !self.is_finished(),
            "{}",
            crate::internal_error_message!("point recorded against finished match {}", self.id)
        );
        TennisMatch {
            id: self.id,
            players: self.players.clone(),
            score: self.score.add_point(winner),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;

    fn test_match() -> TennisMatch {
        TennisMatch::new(
            Player::new(PlayerId(1), "Alice".to_owned()),
            Player::new(PlayerId(2), "Bob".to_owned()),
        )
    }

    fn win_game(mut m: TennisMatch, winner: Side) -> TennisMatch {
        for _ in 0..4 {
            m = m.add_point(winner);
        }
        m
    }

    fn win_set(mut m: TennisMatch, winner: Side) -> TennisMatch {
        for _ in 0..6 {
            m = win_game(m, winner);
        }
        m
    }

    #[test]
    fn match_finishes_at_two_sets() {
        let mut m = test_match();
        assert_eq!(m.status(), MatchStatus::Active);
        m = win_set(m, Side::Two);
        assert_eq!(m.status(), MatchStatus::Active);
        assert_eq!(m.winner(), None);
        m = win_set(m, Side::One);
        m = win_set(m, Side::One);
        assert_eq!(m.status(), MatchStatus::Victory(Side::One));
        assert_eq!(m.winner().map(|p| p.name.as_str()), Some("Alice"));
        assert_eq!(m.score().finished_sets().len(), 3);
    }

    #[test]
    #[should_panic(expected = "Internal error")]
    fn point_against_finished_match_panics() {
        let mut m = test_match();
        m = win_set(m, Side::Two);
        m = win_set(m, Side::Two);
        m.add_point(Side::One);
    }

    #[test]
    fn players_keep_their_sides() {
        let m = test_match();
        assert_eq!(m.player(Side::One).name, "Alice");
        assert_eq!(m.player(Side::Two).name, "Bob");
        let m = m.add_point(Side::Two);
        assert_eq!(m.player(Side::One).name, "Alice");
        assert_eq!(m.player(Side::Two).id, PlayerId(2));
    }
}
