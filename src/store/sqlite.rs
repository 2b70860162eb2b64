use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};

use super::{RecordStore, StoreError};
use crate::model::{FieldValue, NormalizedRecord};
use crate::util::{ensure_directory, now_utc_string};

/// Local SQLite table with the same insert contract as the hosted store.
pub struct SqliteStore {
    connection: Mutex<Connection>,
    table: String,
    label: String,
}

impl SqliteStore {
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_directory(parent)?;
            }
        }

        let connection = Connection::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        connection
            .pragma_update(None, "journal_mode", "WAL")
            .context("failed to set journal_mode=WAL")?;
        connection
            .pragma_update(None, "synchronous", "NORMAL")
            .context("failed to set synchronous=NORMAL")?;

        Self::with_connection(connection, table, format!("sqlite:{}", path.display()))
    }

    #[cfg(test)]
    pub fn open_in_memory(table: &str) -> Result<Self> {
        let connection = Connection::open_in_memory().context("failed to open :memory:")?;
        Self::with_connection(connection, table, "sqlite::memory:".to_string())
    }

    fn with_connection(connection: Connection, table: &str, label: String) -> Result<Self> {
        ensure_schema(&connection, table)?;
        Ok(Self {
            connection: Mutex::new(connection),
            table: table.to_string(),
            label: format!("{label}#{table}"),
        })
    }

    pub(super) fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection
            .lock()
            .map_err(|_| StoreError::Response("sqlite connection lock poisoned".to_string()))
    }
}

fn ensure_schema(connection: &Connection, table: &str) -> Result<()> {
    connection
        .execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
              property_number TEXT PRIMARY KEY,
              property_name TEXT,
              register_date TEXT,
              status TEXT,
              record_json TEXT NOT NULL,
              inserted_at TEXT NOT NULL
            );
            "
        ))
        .with_context(|| format!("failed to create table {table}"))
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, records: &[NormalizedRecord]) -> Result<usize, StoreError> {
        let mut connection = self.lock()?;
        let tx = connection.transaction()?;
        let inserted_at = now_utc_string();

        {
            let mut statement = tx.prepare(&format!(
                "INSERT INTO {} (property_number, property_name, register_date, status, record_json, inserted_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                self.table
            ))?;

            for record in records {
                let register_date = match record.get("register_date") {
                    Some(FieldValue::Date(date)) => {
                        Some(date.format("%Y-%m-%d").to_string())
                    }
                    _ => None,
                };
                statement.execute(params![
                    record.property_number,
                    record.text("property_name"),
                    register_date,
                    record.text("status"),
                    serde_json::to_string(record)?,
                    inserted_at,
                ])?;
            }
        }

        tx.commit()?;
        Ok(records.len())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let connection = self.lock()?;
        let count: i64 = connection.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count.max(0) as u64)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let connection = self.lock()?;
        connection.execute(&format!("DELETE FROM {}", self.table), [])?;
        Ok(())
    }

    async fn latest_property_number(&self, prefix: &str) -> Result<Option<String>, StoreError> {
        let connection = self.lock()?;
        // Sequences past 9999 widen the id, so order by length first.
        let latest = connection
            .query_row(
                &format!(
                    "SELECT property_number FROM {}
                     WHERE property_number LIKE ?1
                     ORDER BY length(property_number) DESC, property_number DESC
                     LIMIT 1",
                    self.table
                ),
                params![format!("{prefix}%")],
                |row| row.get(0),
            )
            .optional()?;
        Ok(latest)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
