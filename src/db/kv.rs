use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct KvError(pub String);

impl std::fmt::Display for KvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<sqlx::Error> for KvError {
    fn from(e: sqlx::Error) -> Self {
        KvError(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for KvError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        KvError(e.to_string())
    }
}

/// Key-value persistence contract.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, KvError>;

    async fn save(&self, key: &str, value: &[u8]) -> Result<(), KvError>;

    /// Write several keys. Backends that can should make this all-or-nothing.
    async fn save_batch(&self, entries: &[(String, Vec<u8>)]) -> Result<(), KvError> {
        for (key, value) in entries {
            self.save(key, value).await?;
        }
        Ok(())
    }
}

pub struct SqliteKv {
    pool: SqlitePool,
}

impl SqliteKv {
    pub async fn connect(database_url: &str) -> Result<Self, KvError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        // Every connection to `:memory:` opens its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!().run(&pool).await?;

        Ok(Self { pool })
    }
}

const UPSERT: &str = "INSERT INTO kv (key, value, updated_at) VALUES (?, ?, strftime('%Y-%m-%dT%H:%M:%S', 'now')) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";

#[async_trait]
impl KvStore for SqliteKv {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        let row: Option<(Vec<u8>,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.0))
    }

    async fn save(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_batch(&self, entries: &[(String, Vec<u8>)]) -> Result<(), KvError> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query(UPSERT)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

/// Process-local backend. Data is lost on restart.
#[derive(Default)]
pub struct MemoryKv {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, KvError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn save(&self, key: &str, value: &[u8]) -> Result<(), KvError> {
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
