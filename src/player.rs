use derive_new::new;
use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};
use strum::EnumIter;


// A pair of per-player values, always indexed so that the first component
// belongs to `Side::One` and the second to `Side::Two`.
pub type ByPlayer<T> = EnumMap<Side, T>;

#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Enum, EnumIter, Serialize, Deserialize,
)]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub i64);

// Stable player identity resolved by the player directory. The scoring engine
// never mutates a player.
#[derive(Clone, PartialEq, Eq, Debug, new, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}
