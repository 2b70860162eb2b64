use super::*;

pub(super) const DEFAULT_STATUS: &str = "거래가능";
pub(super) const DEFAULT_PROPERTY_NAME: &str = "매물명 없음";

const KNOWN_STATUSES: [&str; 4] = ["거래가능", "거래보류", "거래완료", "거래철회"];
const STATUS_ALIASES: [(&str, &str); 2] = [("확인필요", "거래가능"), ("매물철회", "거래철회")];

pub(super) fn canonical_status(raw: Option<&str>) -> &'static str {
    let Some(status) = raw.map(str::trim).filter(|status| !status.is_empty()) else {
        return DEFAULT_STATUS;
    };

    if let Some((_, target)) = STATUS_ALIASES.iter().find(|(alias, _)| *alias == status) {
        return *target;
    }

    KNOWN_STATUSES
        .iter()
        .find(|known| **known == status)
        .copied()
        .unwrap_or(DEFAULT_STATUS)
}

/// Fills the columns the store requires. Runs after the identity gate, so a
/// record reaching here already has a name or a register date in the source.
pub(super) fn prepare_for_upload(mut record: NormalizedRecord, run_date: NaiveDate) -> NormalizedRecord {
    let status = canonical_status(record.text(STATUS_FIELD));
    record.set(STATUS_FIELD, FieldValue::Text(status.to_string()));

    if record.is_missing(PROPERTY_NAME_FIELD) {
        record.set(
            PROPERTY_NAME_FIELD,
            FieldValue::Text(DEFAULT_PROPERTY_NAME.to_string()),
        );
    }

    if record.is_missing(REGISTER_DATE_FIELD) {
        record.set(REGISTER_DATE_FIELD, FieldValue::Date(run_date));
    }

    record.set(IS_DELETED_FIELD, FieldValue::Bool(false));
    record
}

pub(super) fn prepare_all(records: &[NormalizedRecord], run_date: NaiveDate) -> Vec<NormalizedRecord> {
    records
        .iter()
        .cloned()
        .map(|record| prepare_for_upload(record, run_date))
        .collect()
}
