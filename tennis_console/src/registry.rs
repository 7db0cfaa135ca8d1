use dashmap::DashMap;
use tennis_scoreboard::{MatchId, TennisMatch};

// Matches currently in progress, keyed by match id. Purely a lookup
// structure: all scoring decisions stay inside `TennisMatch`.
//
// `update` is the per-key atomic read-modify-write the point-recording flow
// relies on: the closure observes the latest stored value and its result
// replaces that value while the entry stays locked.
pub struct MatchRegistry {
    matches: DashMap<MatchId, TennisMatch>,
}

impl MatchRegistry {
    pub fn new() -> Self { MatchRegistry { matches: DashMap::new() } }

    pub fn put(&self, tennis_match: TennisMatch) {
        self.matches.insert(tennis_match.id(), tennis_match);
    }

    pub fn find(&self, id: MatchId) -> Option<TennisMatch> {
        self.matches.get(&id).map(|entry| entry.value().clone())
    }

    pub fn delete(&self, id: MatchId) { self.matches.remove(&id); }

    pub fn update(
        &self, id: MatchId, f: impl FnOnce(&TennisMatch) -> TennisMatch,
    ) -> Option<TennisMatch> {
        let mut entry = self.matches.get_mut(&id)?;
        let updated = f(entry.value());
        *entry.value_mut() = updated.clone();
        Some(updated)
    }
}
