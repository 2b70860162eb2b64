use super::*;

pub(super) struct ReportInputs<'a> {
    pub(super) run_id: &'a str,
    pub(super) source_path: &'a Path,
    pub(super) source_sha256: String,
    pub(super) settings: UploadSettings,
    pub(super) store_label: Option<String>,
    pub(super) id_utc_offset_hours: i32,
    pub(super) include_ids: bool,
    pub(super) replace: bool,
}

pub(super) fn build_report(
    inputs: ReportInputs<'_>,
    outcome: &NormalizeOutcome,
    upload: Option<UploadResult>,
) -> UploadRunReport {
    let completed = upload.is_some();
    let status = if completed { "completed" } else { "dry-run" };

    let mut warnings = outcome.warnings.clone();
    if !outcome.unmapped_headers.is_empty() {
        warnings.push(format!(
            "{} source column(s) not in the field map were ignored",
            outcome.unmapped_headers.len()
        ));
    }

    let upload = upload.unwrap_or_default();
    if upload.failed > 0 {
        warnings.push(format!("{} record(s) failed to upload", upload.failed));
    }

    let accepted_ids = inputs.include_ids.then(|| {
        outcome
            .records
            .iter()
            .map(|record| record.property_number.clone())
            .collect::<Vec<String>>()
    });
    let failed_ids = inputs.include_ids.then(|| upload.failed_ids.clone());

    UploadRunReport {
        manifest_version: REPORT_MANIFEST_VERSION,
        run_id: inputs.run_id.to_string(),
        generated_at: now_utc_string(),
        status: status.to_string(),
        source: ReportSource {
            path: inputs.source_path.display().to_string(),
            sha256: inputs.source_sha256,
            header_count: outcome.header_count,
            unmapped_headers: outcome.unmapped_headers.clone(),
        },
        settings: ReportSettings {
            mode: inputs.settings.mode.as_str().to_string(),
            batch_size: inputs.settings.batch_size,
            pause_ms: u64::try_from(inputs.settings.pause.as_millis()).unwrap_or(u64::MAX),
            store: inputs.store_label,
            id_utc_offset_hours: inputs.id_utc_offset_hours,
            replace: inputs.replace,
        },
        counts: ReportCounts {
            lines_read: outcome.lines_read,
            blank_lines: outcome.blank_lines,
            skipped: outcome.skipped,
            accepted: outcome.records.len(),
            attempted: upload.attempted,
            succeeded: upload.succeeded,
            failed: upload.failed,
        },
        upload_state: completed.then_some(upload.state),
        failures: upload.failures,
        batch_failures: upload.batch_failures,
        accepted_ids,
        failed_ids,
        warnings,
    }
}
