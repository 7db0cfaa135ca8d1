use std::sync::Arc;

use log::info;

use crate::database::SqlxDatabase;
use crate::http_server_state::{HttpServerState, HttpServerStateImpl};
use crate::match_handlers_tide::Handlers;
use crate::persistence::{DatabaseReader, DatabaseWriter};
use crate::registry::MatchRegistry;
use crate::server_config::{DatabaseOptions, ServerConfig};

pub fn run(config: ServerConfig) {
    match config.database_options.clone() {
        DatabaseOptions::Sqlite(address) => {
            let db = SqlxDatabase::<sqlx::Sqlite>::new(&address)
                .unwrap_or_else(|_| panic!("Cannot connect to SQLite DB {address}"));
            run_tide(config, db);
        }
        DatabaseOptions::Postgres(address) => {
            let db = SqlxDatabase::<sqlx::Postgres>::new(&address)
                .unwrap_or_else(|_| panic!("Cannot connect to Postgres DB {address}"));
            run_tide(config, db);
        }
    }
}

fn run_tide<DB: Sync + Send + 'static + DatabaseReader + DatabaseWriter>(
    config: ServerConfig, db: DB,
) {
    async_std::task::block_on(db.create_tables()).expect("Cannot initialize the database");

    let mut app = tide::with_state(Arc::new(HttpServerStateImpl {
        db,
        registry: MatchRegistry::new(),
        matches_page_size: config.matches_page_size,
    }));
    Handlers::<HttpServerState<DB>>::register_handlers(&mut app);

    info!("Listening on port {}", config.http_port);
    async_std::task::block_on(async {
        app.listen(format!("0.0.0.0:{}", config.http_port)).await
    })
    .expect("Failed to start the tide server");
}
