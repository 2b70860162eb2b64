use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "realty",
    version,
    about = "Property listing CSV ingest and upload tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Ingest(IngestArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum UploadMode {
    Batch,
    PerRow,
}

impl UploadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Batch => "batch",
            Self::PerRow => "per-row",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StoreKind {
    Postgrest,
    Sqlite,
}

/// Store selection and credentials shared by every command that talks to the store.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    #[arg(long, value_enum, default_value_t = StoreKind::Postgrest)]
    pub store: StoreKind,

    #[arg(long, env = "SUPABASE_URL")]
    pub store_url: Option<String>,

    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    pub store_key: Option<String>,

    #[arg(long, default_value = "properties")]
    pub table: String,

    #[arg(long)]
    pub sqlite_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long)]
    pub csv: PathBuf,

    #[arg(long, default_value = ".cache/realty")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub report_ids: bool,

    #[arg(long)]
    pub field_map: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = UploadMode::Batch)]
    pub mode: UploadMode,

    #[arg(long, default_value_t = 50)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 100)]
    pub pause_ms: u64,

    #[arg(long, default_value_t = 9, allow_negative_numbers = true)]
    pub id_utc_offset_hours: i32,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Delete every stored row before uploading.
    #[arg(long, default_value_t = false)]
    pub replace: bool,

    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/realty")]
    pub output_dir: PathBuf,

    #[arg(long, default_value_t = false)]
    pub skip_store: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}
