use tennis_scoreboard::Player;
use tide::utils::async_trait;
use time::OffsetDateTime;

// A finished match as it goes into durable storage. `score_summary` is the
// JSON-encoded per-set history produced from `Score::final_view`.
#[derive(Debug)]
pub struct FinishedMatchRow {
    pub match_uuid: String,
    pub player1_id: i64,
    pub player2_id: i64,
    pub winner_id: i64,
    pub score_summary: String,
    pub finished_at: Option<OffsetDateTime>,
}

// A finished match joined with player names, as shown on the match list page.
#[derive(Debug)]
pub struct FinishedMatchView {
    pub match_uuid: String,
    pub player1_name: String,
    pub player2_name: String,
    pub winner_name: String,
    pub score_summary: String,
    pub finished_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

#[async_trait]
pub trait DatabaseReader {
    // Returns one page of finished matches, newest first, together with the
    // total number of matches satisfying the filter.
    async fn finished_matches(
        &self, page: Page, player_name_filter: Option<&str>,
    ) -> Result<(Vec<FinishedMatchView>, u64), anyhow::Error>;
}

#[async_trait]
pub trait DatabaseWriter {
    async fn create_tables(&self) -> anyhow::Result<()>;
    // Resolves a display name to a stable player identity, creating one if
    // absent.
    async fn find_or_create_player(&self, name: &str) -> anyhow::Result<Player>;
    async fn add_finished_match(&self, row: FinishedMatchRow) -> anyhow::Result<()>;
}
