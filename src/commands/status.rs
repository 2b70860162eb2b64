use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::ingest::REPORT_FILE_PREFIX;
use crate::config::StoreConfig;
use crate::model::UploadRunReport;
use crate::store::open_store;
use crate::util::latest_json_with_prefix;

pub async fn run(args: StatusArgs) -> Result<()> {
    let reports_dir = args.output_dir.join("reports");

    info!(output_dir = %args.output_dir.display(), "status requested");

    match latest_json_with_prefix(&reports_dir, REPORT_FILE_PREFIX)? {
        Some(path) => {
            let raw =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
            let report: UploadRunReport = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?;

            info!(
                path = %path.display(),
                run_id = %report.run_id,
                generated_at = %report.generated_at,
                status = %report.status,
                source = %report.source.path,
                mode = %report.settings.mode,
                store = %report.settings.store.clone().unwrap_or_default(),
                lines_read = report.counts.lines_read,
                skipped = report.counts.skipped,
                accepted = report.counts.accepted,
                succeeded = report.counts.succeeded,
                failed = report.counts.failed,
                "loaded latest upload report"
            );
            for warning in &report.warnings {
                warn!(warning = %warning, "report warning");
            }
        }
        None => warn!(path = %reports_dir.display(), "no upload reports found"),
    }

    if args.skip_store {
        return Ok(());
    }

    let Some(config) = StoreConfig::from_args_if_configured(&args.store, &args.output_dir)? else {
        info!("store not configured; skipping row count");
        return Ok(());
    };
    let store = open_store(&config)?;
    match store.count().await {
        Ok(rows) => info!(store = %store.describe(), rows, "store status"),
        Err(err) => warn!(store = %store.describe(), error = %err, "failed to count store rows"),
    }

    Ok(())
}
