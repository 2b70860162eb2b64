use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::json;

use crate::config::NotifyConfig;
use crate::model::UploadRunReport;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts `{"text": ...}` to an incoming-webhook URL (Slack format).
pub async fn send_webhook(config: &NotifyConfig, text: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(WEBHOOK_TIMEOUT)
        .build()
        .context("failed to build http client")?;

    let response = client
        .post(&config.webhook_url)
        .json(&json!({ "text": text }))
        .send()
        .await
        .context("webhook request failed")?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("webhook returned {status}: {body}");
    }

    Ok(())
}

pub fn summary_text(report: &UploadRunReport) -> String {
    let counts = &report.counts;
    let mut text = format!(
        "Listing upload {} ({})\nsource: {}\naccepted {} / skipped {} / uploaded {} / failed {}",
        report.run_id,
        report.status,
        report.source.path,
        counts.accepted,
        counts.skipped,
        counts.succeeded,
        counts.failed,
    );

    if let Some(store) = &report.settings.store {
        text.push_str(&format!("\nstore: {store}"));
    }
    for warning in &report.warnings {
        text.push_str(&format!("\nwarning: {warning}"));
    }

    text
}
