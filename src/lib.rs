#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod display;
pub mod error;
pub mod player;
pub mod score;
pub mod tennis_match;

pub use display::{LiveScore, MatchLiveView, format_set_results};
pub use player::{ByPlayer, Player, PlayerId, Side};
pub use score::{PointState, Score, SetResult, TieBreak, TieBreakResult};
pub use tennis_match::{MatchId, MatchStatus, TennisMatch};
