use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::model::NormalizedRecord;

mod postgrest;
mod sqlite;
#[cfg(test)]
mod tests;

pub use postgrest::PostgrestStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("unexpected response: {0}")]
    Response(String),
}

/// Destination for normalized listing records.
///
/// `insert` is all-or-nothing from the caller's point of view: either the
/// whole slice is accepted or the call fails.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(&self, records: &[NormalizedRecord]) -> Result<usize, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    /// Removes every row from the table.
    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Highest stored `property_number` starting with `prefix`.
    async fn latest_property_number(&self, prefix: &str) -> Result<Option<String>, StoreError>;

    fn describe(&self) -> String;
}

pub fn open_store(config: &StoreConfig) -> Result<Box<dyn RecordStore>> {
    let store: Box<dyn RecordStore> = match config {
        StoreConfig::Postgrest {
            base_url,
            api_key,
            table,
        } => Box::new(PostgrestStore::new(base_url, api_key, table)?),
        StoreConfig::Sqlite { path, table } => Box::new(SqliteStore::open(path, table)?),
    };
    Ok(store)
}
