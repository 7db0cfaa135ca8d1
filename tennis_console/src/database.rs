use log::error;
use sqlx::prelude::*;
use tennis_scoreboard::{Player, PlayerId};
use tide::utils::async_trait;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::persistence::*;

pub struct SqlxDatabase<DB: sqlx::Database> {
    pub pool: sqlx::Pool<DB>,
}

impl<DB: sqlx::Database> Clone for SqlxDatabase<DB> {
    fn clone(&self) -> Self { Self { pool: self.pool.clone() } }
}

impl SqlxDatabase<sqlx::Sqlite> {
    pub fn new(db_address: &str) -> Result<Self, anyhow::Error> {
        let options = sqlx::sqlite::SqliteConnectOptions::new()
            .filename(db_address)
            .create_if_missing(true);
        let pool = async_std::task::block_on(sqlx::SqlitePool::connect_with(options))?;
        Ok(Self { pool })
    }
}

impl SqlxDatabase<sqlx::Postgres> {
    pub fn new(db_address: &str) -> Result<Self, anyhow::Error> {
        let options = sqlx::postgres::PgPoolOptions::new();
        let pool = async_std::task::block_on(options.connect(db_address))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl<DB> DatabaseReader for SqlxDatabase<DB>
where
    DB: sqlx::Database,
    for<'q> i64: sqlx::Type<DB> + sqlx::Encode<'q, DB> + sqlx::Decode<'q, DB>,
    for<'q> String: sqlx::Type<DB> + sqlx::Encode<'q, DB> + sqlx::Decode<'q, DB>,
    for<'q> bool: sqlx::Type<DB> + sqlx::Encode<'q, DB> + sqlx::Decode<'q, DB>,
    for<'q> OffsetDateTime: sqlx::Type<DB> + sqlx::Encode<'q, DB>,
    for<'q> PrimitiveDateTime: sqlx::Type<DB> + sqlx::Decode<'q, DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> <DB as sqlx::Database>::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'s> &'s str: sqlx::ColumnIndex<DB::Row>,
{
    async fn finished_matches(
        &self, page: Page, player_name_filter: Option<&str>,
    ) -> Result<(Vec<FinishedMatchView>, u64), anyhow::Error> {
        let no_filter = player_name_filter.is_none();
        let filter = player_name_filter.unwrap_or_default().to_owned();
        let total: i64 = sqlx::query::<DB>(
            "SELECT COUNT(*) AS total
             FROM matches m
             JOIN players p1 ON p1.id = m.player1
             JOIN players p2 ON p2.id = m.player2
             WHERE ($1 OR p1.name = $2 OR p2.name = $2)",
        )
        .bind(no_filter)
        .bind(filter.clone())
        .fetch_one(&self.pool)
        .await?
        .try_get("total")?;

        let rows = sqlx::query::<DB>(
            "SELECT
                m.uuid,
                p1.name AS player1_name,
                p2.name AS player2_name,
                w.name AS winner_name,
                m.score,
                m.finished_at
             FROM matches m
             JOIN players p1 ON p1.id = m.player1
             JOIN players p2 ON p2.id = m.player2
             JOIN players w ON w.id = m.winner
             WHERE ($1 OR p1.name = $2 OR p2.name = $2)
             ORDER BY m.id DESC
             LIMIT $3 OFFSET $4",
        )
        .bind(no_filter)
        .bind(filter)
        .bind(page.limit as i64)
        .bind(page.offset as i64)
        .fetch_all(&self.pool)
        .await?;
        let (oks, errs): (Vec<_>, _) = rows
            .into_iter()
            .map(|row| -> Result<_, anyhow::Error> {
                Ok(FinishedMatchView {
                    match_uuid: row.try_get("uuid")?,
                    player1_name: row.try_get("player1_name")?,
                    player2_name: row.try_get("player2_name")?,
                    winner_name: row.try_get("winner_name")?,
                    score_summary: row.try_get("score")?,
                    // Timestamps are re-coded because the Postgres TIMESTAMP
                    // datatype can only be decoded as PrimitiveDateTime, while
                    // to get OffsetDateTime, TIMESTAMPZ would be needed which
                    // is not supported everywhere. Encoding has no such issue:
                    // the library converts to UTC and encodes.
                    finished_at: Option::map(
                        row.try_get("finished_at")?,
                        PrimitiveDateTime::assume_utc,
                    ),
                })
            })
            .partition(Result::is_ok);
        if !errs.is_empty() {
            error!(
                "Failed to parse rows from the DB; sample errors: {:?}",
                errs.iter()
                    .take(5)
                    .map(|x| x.as_ref().err().unwrap().to_string())
                    .collect::<Vec<_>>()
            );
        }
        if oks.is_empty() && !errs.is_empty() {
            // None of the rows parsed, return the first error.
            Err(errs.into_iter().next().unwrap().unwrap_err())
        } else {
            Ok((oks.into_iter().map(Result::unwrap).collect(), total as u64))
        }
    }
}

pub trait HasIdColumnDefinition {
    const ID_COLUMN_DEFINITION: &'static str;
}

impl HasIdColumnDefinition for sqlx::Sqlite {
    const ID_COLUMN_DEFINITION: &'static str = "id INTEGER PRIMARY KEY";
}

impl HasIdColumnDefinition for sqlx::Postgres {
    const ID_COLUMN_DEFINITION: &'static str = "id BIGSERIAL PRIMARY KEY";
}

#[async_trait]
impl<DB> DatabaseWriter for SqlxDatabase<DB>
where
    DB: sqlx::Database + HasIdColumnDefinition,
    for<'q> i64: sqlx::Type<DB> + sqlx::Encode<'q, DB> + sqlx::Decode<'q, DB>,
    for<'q> String: sqlx::Type<DB> + sqlx::Encode<'q, DB> + sqlx::Decode<'q, DB>,
    for<'q> OffsetDateTime: sqlx::Type<DB> + sqlx::Encode<'q, DB>,
    for<'q> Option<OffsetDateTime>: sqlx::Encode<'q, DB>,
    for<'c> &'c mut DB::Connection: sqlx::Executor<'c, Database = DB>,
    for<'q> <DB as sqlx::Database>::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    for<'s> &'s str: sqlx::ColumnIndex<DB::Row>,
{
    async fn create_tables(&self) -> anyhow::Result<()> {
        let id_column_definition = DB::ID_COLUMN_DEFINITION;
        sqlx::query(
            format!(
                "CREATE TABLE IF NOT EXISTS players (
                {id_column_definition},
                name TEXT NOT NULL UNIQUE)",
            )
            .as_str(),
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            format!(
                "CREATE TABLE IF NOT EXISTS matches (
                {id_column_definition},
                uuid TEXT NOT NULL UNIQUE,
                player1 BIGINT NOT NULL REFERENCES players(id),
                player2 BIGINT NOT NULL REFERENCES players(id),
                winner BIGINT NOT NULL REFERENCES players(id),
                score TEXT,
                finished_at TIMESTAMP)",
            )
            .as_str(),
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_or_create_player(&self, name: &str) -> anyhow::Result<Player> {
        if let Some(row) = sqlx::query::<DB>("SELECT id, name FROM players WHERE name = $1")
            .bind(name.to_owned())
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(Player::new(PlayerId(row.try_get("id")?), row.try_get("name")?));
        }
        // Two concurrent creators may race here. The unique index turns the
        // insert into a no-op for the loser and the re-read sees the winner's
        // row either way.
        sqlx::query::<DB>("INSERT INTO players (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name.to_owned())
            .execute(&self.pool)
            .await?;
        let row = sqlx::query::<DB>("SELECT id, name FROM players WHERE name = $1")
            .bind(name.to_owned())
            .fetch_one(&self.pool)
            .await?;
        Ok(Player::new(PlayerId(row.try_get("id")?), row.try_get("name")?))
    }

    async fn add_finished_match(&self, row: FinishedMatchRow) -> anyhow::Result<()> {
        // Idempotent by match uuid, so a retried finalization cannot insert
        // the same match twice.
        sqlx::query::<DB>(
            "INSERT INTO matches (uuid, player1, player2, winner, score, finished_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (uuid) DO NOTHING",
        )
        .bind(row.match_uuid)
        .bind(row.player1_id)
        .bind(row.player2_id)
        .bind(row.winner_id)
        .bind(row.score_summary)
        .bind(row.finished_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
