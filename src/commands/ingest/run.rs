use super::*;

pub async fn run(args: IngestArgs) -> Result<()> {
    let started_ts = Utc::now();
    let run_id = format!("ingest-{}", utc_compact_string(started_ts));
    let offset = run_offset(args.id_utc_offset_hours)?;
    let run_date = local_date(started_ts, offset);
    let settings = UploadSettings::new(args.mode, args.batch_size, args.pause_ms);

    // Configuration problems end the run before any input is read.
    let store_config = if args.dry_run {
        None
    } else {
        Some(StoreConfig::from_args(&args.store, &args.output_dir)?)
    };
    let notify_config = NotifyConfig::from_option(args.slack_webhook_url.as_deref());

    let field_map = match &args.field_map {
        Some(path) => FieldMap::from_json_file(path)?,
        None => FieldMap::builtin(),
    };
    let coercer = ValueCoercer::new()?;

    let report_path = args.report_path.clone().unwrap_or_else(|| {
        args.output_dir.join("reports").join(format!(
            "{REPORT_FILE_PREFIX}{}.json",
            utc_compact_string(started_ts)
        ))
    });

    let store = store_config.as_ref().map(open_store).transpose()?;

    info!(
        run_id = %run_id,
        csv = %args.csv.display(),
        run_date = %run_date,
        fields = field_map.len(),
        dry_run = args.dry_run,
        replace = args.replace,
        "starting ingest"
    );

    let content = fs::read_to_string(&args.csv)
        .with_context(|| format!("failed to read {}", args.csv.display()))?;
    let source_sha256 = sha256_file(&args.csv)?;

    // The source is readable before anything in the store is touched.
    let first_sequence = match store.as_deref() {
        Some(store) => starting_sequence(store, run_date, args.replace).await?,
        None => 1,
    };

    let outcome = normalize_source(&content, &field_map, &coercer, run_date, first_sequence);
    for warning in &outcome.warnings {
        warn!(warning = %warning, "source warning");
    }
    if !outcome.unmapped_headers.is_empty() {
        info!(
            columns = ?outcome.unmapped_headers,
            "ignoring columns without a field mapping"
        );
    }
    info!(
        lines = outcome.lines_read,
        blank = outcome.blank_lines,
        skipped = outcome.skipped,
        accepted = outcome.records.len(),
        "normalized source rows"
    );

    let upload = match store.as_deref() {
        Some(store) => {
            let prepared = prepare_all(&outcome.records, run_date);
            let uploader = BatchUploader::new(store, settings);
            Some(uploader.upload(&prepared).await)
        }
        None => {
            info!("dry run: upload skipped");
            None
        }
    };

    let report = build_report(
        ReportInputs {
            run_id: &run_id,
            source_path: &args.csv,
            source_sha256,
            settings,
            store_label: store.as_ref().map(|store| store.describe()),
            id_utc_offset_hours: args.id_utc_offset_hours,
            include_ids: args.report_ids,
            replace: args.replace && store.is_some(),
        },
        &outcome,
        upload,
    );

    write_json_pretty(&report_path, &report)?;
    info!(path = %report_path.display(), "wrote upload run report");
    info!(
        accepted = report.counts.accepted,
        skipped = report.counts.skipped,
        succeeded = report.counts.succeeded,
        failed = report.counts.failed,
        "ingest completed"
    );

    if let Some(notify_config) = &notify_config {
        let text = notify::summary_text(&report);
        match notify::send_webhook(notify_config, &text).await {
            Ok(()) => info!("sent run summary to webhook"),
            Err(err) => warn!(error = %err, "failed to send run summary to webhook"),
        }
    }

    Ok(())
}

/// First sequence number for this run's property numbers. A replace run
/// clears the store and starts at 1; otherwise numbering continues after the
/// highest number already stored for the run date.
pub(super) async fn starting_sequence(
    store: &dyn RecordStore,
    run_date: NaiveDate,
    replace: bool,
) -> Result<usize> {
    if replace {
        store
            .delete_all()
            .await
            .with_context(|| format!("failed to clear {}", store.describe()))?;
        info!(store = %store.describe(), "cleared existing rows before upload");
        return Ok(1);
    }

    let prefix = property_number_prefix(run_date);
    match store.latest_property_number(&prefix).await {
        Ok(latest) => {
            let sequence = next_sequence(latest.as_deref(), &prefix);
            if let Some(latest) = latest {
                info!(latest = %latest, next = sequence, "continuing property number sequence");
            }
            Ok(sequence)
        }
        Err(err) => {
            warn!(
                error = %err,
                "failed to read existing property numbers; numbering from 1"
            );
            Ok(1)
        }
    }
}
