use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

use crate::application::errors::StoreError;
use crate::domain::entities::GuildRecord;
use crate::domain::traits::GuildStore;

/// SQLite-backed guild enablement store
pub struct SqliteGuildStore {
    conn: Mutex<Connection>,
    default_cogs: Vec<String>,
}

impl SqliteGuildStore {
    pub fn new(path: impl AsRef<Path>, default_cogs: Vec<String>) -> SqliteResult<Self> {
        Self::from_connection(Connection::open(path)?, default_cogs)
    }

    pub fn in_memory(default_cogs: Vec<String>) -> SqliteResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, default_cogs)
    }

    fn from_connection(conn: Connection, default_cogs: Vec<String>) -> SqliteResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            default_cogs,
        };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap_or_else(std::sync::PoisonError::into_inner);

        conn.execute(
            "CREATE TABLE IF NOT EXISTS guild_configs (
                guild_id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        // rowid keeps insertion order of the enabled set
        conn.execute(
            "CREATE TABLE IF NOT EXISTS guild_cogs (
                guild_id TEXT NOT NULL,
                cog_id TEXT NOT NULL,
                PRIMARY KEY (guild_id, cog_id),
                FOREIGN KEY (guild_id) REFERENCES guild_configs(guild_id)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_guild_cogs_guild ON guild_cogs(guild_id)",
            [],
        )?;

        Ok(())
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> SqliteResult<T>) -> Result<T, StoreError> {
        let mut conn = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&mut conn)?)
    }
}

fn read_record(conn: &Connection, guild_id: &str) -> SqliteResult<Option<GuildRecord>> {
    let exists = conn
        .query_row(
            "SELECT guild_id FROM guild_configs WHERE guild_id = ?1",
            [guild_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    if exists.is_none() {
        return Ok(None);
    }

    let mut stmt = conn.prepare(
        "SELECT cog_id FROM guild_cogs WHERE guild_id = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map([guild_id], |row| row.get::<_, String>(0))?;

    let mut cogs = Vec::new();
    for cog in rows {
        cogs.push(cog?);
    }
    Ok(Some(GuildRecord {
        guild_id: guild_id.to_string(),
        cogs_enabled: cogs,
    }))
}

fn upsert_guild(conn: &Connection, guild_id: &str) -> SqliteResult<bool> {
    let inserted = conn.execute(
        "INSERT OR IGNORE INTO guild_configs (guild_id) VALUES (?1)",
        [guild_id],
    )?;
    conn.execute(
        "UPDATE guild_configs SET updated_at = datetime('now') WHERE guild_id = ?1",
        [guild_id],
    )?;
    Ok(inserted > 0)
}

#[async_trait]
impl GuildStore for SqliteGuildStore {
    async fn find_one(&self, guild_id: &str) -> Result<Option<GuildRecord>, StoreError> {
        self.with_conn(|conn| read_record(conn, guild_id))
    }

    async fn upsert_add_to_set(&self, guild_id: &str, cog_id: &str) -> Result<GuildRecord, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            upsert_guild(&tx, guild_id)?;
            tx.execute(
                "INSERT OR IGNORE INTO guild_cogs (guild_id, cog_id) VALUES (?1, ?2)",
                rusqlite::params![guild_id, cog_id],
            )?;
            let record = read_record(&tx, guild_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(record)
        })
    }

    async fn upsert_pull(&self, guild_id: &str, cog_id: &str) -> Result<GuildRecord, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            upsert_guild(&tx, guild_id)?;
            tx.execute(
                "DELETE FROM guild_cogs WHERE guild_id = ?1 AND cog_id = ?2",
                rusqlite::params![guild_id, cog_id],
            )?;
            let record = read_record(&tx, guild_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(record)
        })
    }

    async fn create_with_defaults(&self, guild_id: &str) -> Result<GuildRecord, StoreError> {
        let defaults = self.default_cogs.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            if upsert_guild(&tx, guild_id)? {
                for cog_id in &defaults {
                    tx.execute(
                        "INSERT OR IGNORE INTO guild_cogs (guild_id, cog_id) VALUES (?1, ?2)",
                        rusqlite::params![guild_id, cog_id],
                    )?;
                }
            }
            let record = read_record(&tx, guild_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            tx.commit()?;
            Ok(record)
        })
    }
}
