use super::*;

/// Pushes records to a [`RecordStore`] in fixed-size batches.
///
/// A rejected batch never stops the run. In [`UploadMode::Batch`] the whole
/// batch is counted as failed; in [`UploadMode::PerRow`] its records are
/// re-sent one at a time so the rejected rows can be named. There is no retry
/// beyond that, and batches are separated by a fixed pause.
pub(super) struct BatchUploader<'a> {
    store: &'a dyn RecordStore,
    settings: UploadSettings,
}

impl<'a> BatchUploader<'a> {
    pub(super) fn new(store: &'a dyn RecordStore, settings: UploadSettings) -> Self {
        Self { store, settings }
    }

    pub(super) async fn upload(&self, records: &[NormalizedRecord]) -> UploadResult {
        let mut result = UploadResult::default();
        let batch_size = self.settings.batch_size.max(1);
        let total_batches = records.len().div_ceil(batch_size);

        info!(
            store = %self.store.describe(),
            mode = self.settings.mode.as_str(),
            records = records.len(),
            batch_size,
            total_batches,
            "starting upload"
        );

        for (index, batch) in records.chunks(batch_size).enumerate() {
            let batch_number = index + 1;
            result.state = UploadState::Uploading {
                batch: batch_number,
            };
            result.attempted += batch.len();

            info!(
                batch = batch_number,
                total_batches,
                records = batch.len(),
                "uploading batch"
            );

            match self.store.insert(batch).await {
                Ok(inserted) => {
                    if inserted != batch.len() {
                        warn!(
                            batch = batch_number,
                            expected = batch.len(),
                            reported = inserted,
                            "store reported a different insert count"
                        );
                    }
                    result.succeeded += batch.len();
                }
                Err(err) => {
                    warn!(batch = batch_number, error = %err, "batch insert failed");
                    match self.settings.mode {
                        UploadMode::Batch => {
                            record_batch_failure(&mut result, batch_number, batch, err.to_string())
                        }
                        UploadMode::PerRow => self.upload_rows(batch, &mut result).await,
                    }
                }
            }

            if batch_number < total_batches && !self.settings.pause.is_zero() {
                tokio::time::sleep(self.settings.pause).await;
            }
        }

        result.state = UploadState::Done;
        info!(
            attempted = result.attempted,
            succeeded = result.succeeded,
            failed = result.failed,
            "upload finished"
        );

        result
    }

    async fn upload_rows(&self, batch: &[NormalizedRecord], result: &mut UploadResult) {
        for record in batch {
            match self.store.insert(std::slice::from_ref(record)).await {
                Ok(_) => result.succeeded += 1,
                Err(err) => {
                    warn!(
                        property_number = %record.property_number,
                        error = %err,
                        "row insert failed"
                    );
                    result.failed += 1;
                    result.failed_ids.push(record.property_number.clone());
                    result.failures.push(UploadFailure {
                        property_number: record.property_number.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
    }
}

fn record_batch_failure(
    result: &mut UploadResult,
    batch_number: usize,
    batch: &[NormalizedRecord],
    error: String,
) {
    let first = batch
        .first()
        .map(|record| record.property_number.clone())
        .unwrap_or_default();
    let last = batch
        .last()
        .map(|record| record.property_number.clone())
        .unwrap_or_default();

    result.failed += batch.len();
    result
        .failed_ids
        .extend(batch.iter().map(|record| record.property_number.clone()));
    result.batch_failures.push(BatchFailure {
        batch_number,
        first_property_number: first,
        last_property_number: last,
        record_count: batch.len(),
        error,
    });
}
