use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::player::{ByPlayer, Side};
use crate::score::{Score, SetResult};
use crate::tennis_match::TennisMatch;


// Flat projection of an ongoing score for rendering. While a tie-break is on,
// its running point counts take the place of game points.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct LiveScore {
    pub points: ByPlayer<String>,
    pub games: ByPlayer<u32>,
    pub sets: ByPlayer<u32>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct MatchLiveView {
    pub player_names: ByPlayer<String>,
    pub score: LiveScore,
}

impl Score {
    pub fn live_view(&self) -> LiveScore {
        let points = match self.tie_break() {
            Some(tie_break) => tie_break.points().map(|_, n| n.to_string()),
            None => self.points().map(|_, p| p.to_string()),
        };
        LiveScore {
            points,
            games: self.games(),
            sets: self.sets(),
        }
    }

    // Per-set summary of a finished match. Unlike `live_view`, this does not
    // depend on the transient point/game/tie-break fields.
    pub fn final_view(&self) -> &[SetResult] { self.finished_sets() }
}

impl TennisMatch {
    pub fn live_view(&self) -> MatchLiveView {
        MatchLiveView {
            player_names: ByPlayer::from_fn(|side| self.player(side).name.clone()),
            score: self.score().live_view(),
        }
    }
}

impl fmt::Display for SetResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.games[Side::One], self.games[Side::Two])?;
        if let Some(tie_break) = &self.tie_break {
            write!(f, " ({}:{})", tie_break.points[Side::One], tie_break.points[Side::Two])?;
        }
        Ok(())
    }
}

pub fn format_set_results(results: &[SetResult]) -> String {
    results.iter().map(|set| set.to_string()).join(", ")
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::player::{Player, PlayerId};

    fn played_out(points: &[Side]) -> Score {
        points.iter().fold(Score::new(), |score, &winner| score.add_point(winner))
    }

    #[test]
    fn live_view_shows_point_labels() {
        let score = played_out(&[Side::One, Side::One, Side::Two]);
        let view = score.live_view();
        assert_eq!(view.points[Side::One], "30");
        assert_eq!(view.points[Side::Two], "15");
        assert_eq!(view.games[Side::One], 0);
        assert_eq!(view.sets[Side::Two], 0);
    }

    #[test]
    fn live_view_shows_advantage_label() {
        let deuce = [Side::One, Side::Two].repeat(3);
        let score = played_out(&deuce).add_point(Side::Two);
        assert_eq!(score.live_view().points[Side::Two], "AD");
        assert_eq!(score.live_view().points[Side::One], "40");
    }

    #[test]
    fn live_view_substitutes_tie_break_points() {
        // Six games each, then three tie-break points for player one.
        let mut score = Score::new();
        for game in 0..12 {
            let winner = if game % 2 == 0 { Side::One } else { Side::Two };
            for _ in 0..4 {
                score = score.add_point(winner);
            }
        }
        assert!(score.tie_break().is_some());
        for _ in 0..3 {
            score = score.add_point(Side::One);
        }
        let view = score.live_view();
        assert_eq!(view.points[Side::One], "3");
        assert_eq!(view.points[Side::Two], "0");
        assert_eq!(view.games[Side::One], 6);
        assert_eq!(view.games[Side::Two], 6);
    }

    #[test]
    fn match_live_view_carries_player_names() {
        let m = TennisMatch::new(
            Player::new(PlayerId(1), "Alice".to_owned()),
            Player::new(PlayerId(2), "Bob".to_owned()),
        );
        let view = m.live_view();
        assert_eq!(view.player_names[Side::One], "Alice");
        assert_eq!(view.player_names[Side::Two], "Bob");
    }

    #[test]
    fn set_result_formatting() {
        let plain = SetResult { games: ByPlayer::from_array([6, 4]), tie_break: None };
        assert_eq!(plain.to_string(), "6:4");
        let with_tie_break = SetResult {
            games: ByPlayer::from_array([6, 7]),
            tie_break: Some(crate::score::TieBreakResult {
                points: ByPlayer::from_array([5, 7]),
            }),
        };
        assert_eq!(with_tie_break.to_string(), "6:7 (5:7)");
        assert_eq!(format_set_results(&[plain, with_tie_break]), "6:4, 6:7 (5:7)");
    }
}
