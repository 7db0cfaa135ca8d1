use std::sync::Arc;

use crate::persistence::{DatabaseReader, DatabaseWriter};
use crate::registry::MatchRegistry;

pub struct HttpServerStateImpl<DB> {
    pub db: DB,
    pub registry: MatchRegistry,
    pub matches_page_size: u64,
}

pub type HttpServerState<DB> = Arc<HttpServerStateImpl<DB>>;

impl<DB> crate::match_handlers_tide::SuitableServerState for HttpServerState<DB>
where
    DB: Sync + Send + 'static + DatabaseReader + DatabaseWriter,
{
    type DB = DB;

    fn db(&self) -> &Self::DB { &self.db }

    fn registry(&self) -> &MatchRegistry { &self.registry }

    fn matches_page_size(&self) -> u64 { self.matches_page_size }
}
