use enum_map::enum_map;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::internal_panic;
use crate::player::{ByPlayer, Side};


pub(crate) const GAMES_TO_WIN_SET: u32 = 6;
pub(crate) const SET_WIN_MARGIN: u32 = 2;
pub(crate) const TIE_BREAK_POINTS_TO_WIN: u32 = 7;
pub(crate) const TIE_BREAK_WIN_MARGIN: u32 = 2;
pub(crate) const SETS_TO_WIN_MATCH: u32 = 2;

// Point tally within a single game. Not a linear counter: `Advantage` exists
// only transiently while the game is at deuce.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Display, Serialize, Deserialize,
)]
pub enum PointState {
    #[default]
    #[strum(serialize = "0")]
    Love,
    #[strum(serialize = "15")]
    Fifteen,
    #[strum(serialize = "30")]
    Thirty,
    #[strum(serialize = "40")]
    Forty,
    #[strum(serialize = "AD")]
    Advantage,
}

impl PointState {
    // Progression along Love → Fifteen → Thirty → Forty. Winning a point at
    // Forty or Advantage wins the game instead, so there is no next state.
    fn next(self) -> PointState {
        use PointState::*;
        match self {
            Love => Fifteen,
            Fifteen => Thirty,
            Thirty => Forty,
            Forty | Advantage => internal_panic!("no normal point progression from {:?}", self),
        }
    }
}

// Running point tally of a 6-6 tie-break. Lives for exactly one set-ending
// episode: created when the games reach 6-6, folded into a `SetResult` when
// one side gets at least seven points with a margin of two.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct TieBreak {
    points: ByPlayer<u32>,
}

impl TieBreak {
    pub fn new() -> Self { Self::default() }

    pub fn points(&self) -> ByPlayer<u32> { self.points }

    pub fn add_point(self, winner: Side) -> TieBreak {
        let mut points = self.points;
        points[winner] += 1;
        TieBreak { points }
    }

    // No cap: 6-6 continues until somebody leads by two, e.g. 10-8.
    pub fn is_finished(&self) -> bool {
        let (a, b) = (self.points[Side::One], self.points[Side::Two]);
        let (lead, trail) = if a > b { (a, b) } else { (b, a) };
        lead >= TIE_BREAK_POINTS_TO_WIN && lead - trail >= TIE_BREAK_WIN_MARGIN
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct TieBreakResult {
    pub points: ByPlayer<u32>,
}

// Immutable record of a completed set: the final game tally plus the final
// tie-break tally if the set was decided by one.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SetResult {
    pub games: ByPlayer<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tie_break: Option<TieBreakResult>,
}

// The score of a match in progress. Every transition produces a new value;
// nothing is ever mutated in place, so a `Score` can be freely snapshotted.
//
// Invariants:
//   - `tie_break` is present iff the current set is in a 6-6 tie-break, and
//     `points` is frozen at Love-Love for its duration;
//   - `finished_sets.len()` equals the total number of sets won;
//   - `points` and `games` are zeroed at the start of every game/set.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct Score {
    points: ByPlayer<PointState>,
    games: ByPlayer<u32>,
    sets: ByPlayer<u32>,
    tie_break: Option<TieBreak>,
    finished_sets: Vec<SetResult>,
}

impl Score {
    pub fn new() -> Self { Self::default() }

    pub fn points(&self) -> ByPlayer<PointState> { self.points }
    pub fn games(&self) -> ByPlayer<u32> { self.games }
    pub fn sets(&self) -> ByPlayer<u32> { self.sets }
    pub fn tie_break(&self) -> Option<TieBreak> { self.tie_break }
    pub fn finished_sets(&self) -> &[SetResult] { &self.finished_sets }

    // Records a single point for `winner` and returns the resulting score.
    // Total for every reachable score; the caller is responsible for not
    // feeding points into a match that is already over.
    pub fn add_point(&self, winner: Side) -> Score {
        use PointState::*;
        if self.tie_break.is_some() {
            self.add_tie_break_point(winner)
        } else if self.points.values().any(|&p| p == Advantage)
            || self.points.values().all(|&p| p == Forty)
        {
            self.add_deuce_point(winner)
        } else if self.points[winner] == Forty {
            self.win_game(winner)
        } else {
            self.add_normal_point(winner)
        }
    }

    fn add_normal_point(&self, winner: Side) -> Score {
        let mut points = self.points;
        points[winner] = points[winner].next();
        Score { points, ..self.clone() }
    }

    fn add_deuce_point(&self, winner: Side) -> Score {
        use PointState::*;
        if self.points.values().all(|&p| p == Forty) {
            let mut points = self.points;
            points[winner] = Advantage;
            Score { points, ..self.clone() }
        } else if self.points[winner] == Advantage {
            self.win_game(winner)
        } else {
            // The opponent held the advantage: back to deuce.
            Score { points: enum_map! { _ => Forty }, ..self.clone() }
        }
    }

    fn win_game(&self, winner: Side) -> Score {
        let mut games = self.games;
        games[winner] += 1;
        let margin = games[winner].saturating_sub(games[winner.opponent()]);
        if games[winner] >= GAMES_TO_WIN_SET && margin >= SET_WIN_MARGIN {
            self.win_set(winner, games, None)
        } else if games.values().all(|&g| g == GAMES_TO_WIN_SET) {
            Score {
                points: ByPlayer::default(),
                games,
                tie_break: Some(TieBreak::new()),
                ..self.clone()
            }
        } else {
            Score { points: ByPlayer::default(), games, ..self.clone() }
        }
    }

    fn win_set(&self, winner: Side, final_games: ByPlayer<u32>, tie_break: Option<TieBreakResult>)
        -> Score
    {
        let mut sets = self.sets;
        sets[winner] += 1;
        let mut finished_sets = self.finished_sets.clone();
        finished_sets.push(SetResult { games: final_games, tie_break });
        Score {
            points: ByPlayer::default(),
            games: ByPlayer::default(),
            sets,
            tie_break: None,
            finished_sets,
        }
    }

    fn add_tie_break_point(&self, winner: Side) -> Score {
        let Some(tie_break) = self.tie_break else {
            internal_panic!("tie-break point recorded without an active tie-break");
        };
        let tie_break = tie_break.add_point(winner);
        if tie_break.is_finished() {
            // The tie-break winner always takes the deciding game of the set.
            let mut games = self.games;
            games[winner] += 1;
            self.win_set(winner, games, Some(TieBreakResult { points: tie_break.points() }))
        } else {
            Score { tie_break: Some(tie_break), ..self.clone() }
        }
    }
}
