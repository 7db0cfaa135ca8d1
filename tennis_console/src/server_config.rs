use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DatabaseOptions {
    Sqlite(String),
    Postgres(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub database_options: DatabaseOptions,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    // Finished matches per page on the match list.
    #[serde(default = "default_matches_page_size")]
    pub matches_page_size: u64,
}

fn default_http_port() -> u16 { 8080 }
fn default_matches_page_size() -> u64 { 5 }
