use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::FixedOffset;

use crate::cli::{StoreArgs, StoreKind, UploadMode};

pub const DEFAULT_SQLITE_FILENAME: &str = "realty.sqlite";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Postgrest {
        base_url: String,
        api_key: String,
        table: String,
    },
    Sqlite {
        path: PathBuf,
        table: String,
    },
}

impl StoreConfig {
    pub fn from_args(args: &StoreArgs, output_dir: &Path) -> Result<Self> {
        validate_table_name(&args.table)?;

        match args.store {
            StoreKind::Postgrest => {
                let base_url = non_blank(args.store_url.as_deref()).context(
                    "missing store endpoint: set SUPABASE_URL or pass --store-url",
                )?;
                let api_key = non_blank(args.store_key.as_deref()).context(
                    "missing store credentials: set SUPABASE_ANON_KEY or pass --store-key",
                )?;

                Ok(Self::Postgrest {
                    base_url: base_url.trim_end_matches('/').to_string(),
                    api_key: api_key.to_string(),
                    table: args.table.clone(),
                })
            }
            StoreKind::Sqlite => Ok(Self::Sqlite {
                path: args
                    .sqlite_path
                    .clone()
                    .unwrap_or_else(|| output_dir.join(DEFAULT_SQLITE_FILENAME)),
                table: args.table.clone(),
            }),
        }
    }

    /// Same as [`StoreConfig::from_args`], except a hosted store with neither
    /// endpoint nor key set is reported as absent instead of as an error.
    pub fn from_args_if_configured(args: &StoreArgs, output_dir: &Path) -> Result<Option<Self>> {
        let unset = args.store == StoreKind::Postgrest
            && non_blank(args.store_url.as_deref()).is_none()
            && non_blank(args.store_key.as_deref()).is_none();
        if unset {
            return Ok(None);
        }
        Self::from_args(args, output_dir).map(Some)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSettings {
    pub mode: UploadMode,
    pub batch_size: usize,
    pub pause: Duration,
}

impl UploadSettings {
    pub fn new(mode: UploadMode, batch_size: usize, pause_ms: u64) -> Self {
        Self {
            mode,
            batch_size: batch_size.max(1),
            pause: Duration::from_millis(pause_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    pub webhook_url: String,
}

impl NotifyConfig {
    pub fn from_option(url: Option<&str>) -> Option<Self> {
        non_blank(url).map(|webhook_url| Self {
            webhook_url: webhook_url.to_string(),
        })
    }
}

pub fn run_offset(hours: i32) -> Result<FixedOffset> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .with_context(|| format!("invalid --id-utc-offset-hours: {hours}"))
}

// Table names are interpolated into SQL and URLs.
fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if !valid {
        bail!("invalid table name: {table:?}");
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
