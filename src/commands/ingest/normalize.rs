use super::*;

#[derive(Debug, Default)]
pub(super) struct NormalizeOutcome {
    pub(super) records: Vec<NormalizedRecord>,
    pub(super) header_count: usize,
    pub(super) unmapped_headers: Vec<String>,
    pub(super) lines_read: usize,
    pub(super) blank_lines: usize,
    pub(super) skipped: usize,
    pub(super) warnings: Vec<String>,
}

/// Generated listing identifier: run date (`YYYYMMDD`) plus a 1-based,
/// zero-padded sequence. Unique within one run only.
pub(super) fn property_number(run_date: NaiveDate, sequence: usize) -> String {
    format!("{}{:04}", property_number_prefix(run_date), sequence)
}

pub(super) fn property_number_prefix(run_date: NaiveDate) -> String {
    run_date.format("%Y%m%d").to_string()
}

/// Sequence that follows `latest`, the highest stored number for the same
/// date prefix. Anything unparseable starts over at 1.
pub(super) fn next_sequence(latest: Option<&str>, prefix: &str) -> usize {
    latest
        .and_then(|number| number.strip_prefix(prefix))
        .and_then(|sequence| sequence.parse::<usize>().ok())
        .map_or(1, |sequence| sequence.saturating_add(1))
}

/// Maps one row onto the columns resolved from the header. Cells missing
/// from a short row read as empty. A floors column fills two fields.
pub(super) fn map_row(
    resolved: &ResolvedHeaders,
    cells: &[String],
    coercer: &ValueCoercer,
) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();
    for (index, spec) in &resolved.columns {
        let raw = cells.get(*index).map(String::as_str).unwrap_or("");
        fields.insert(spec.field.clone(), coercer.coerce(spec.kind, raw));
        if spec.kind == FieldKind::Floors {
            fields.insert(FLOOR_TOTAL_FIELD.to_string(), coercer.floor_total(raw));
        }
    }
    fields
}

/// A row is kept when its listing-name or register-date cell has any text.
pub(super) fn has_identity(resolved: &ResolvedHeaders, cells: &[String]) -> bool {
    let non_empty = |index: Option<usize>| {
        index
            .and_then(|index| cells.get(index))
            .map(|cell| !cell.trim().is_empty())
            .unwrap_or(false)
    };
    non_empty(resolved.property_name_index) || non_empty(resolved.register_date_index)
}

pub(super) fn normalize_source(
    content: &str,
    field_map: &FieldMap,
    coercer: &ValueCoercer,
    run_date: NaiveDate,
    first_sequence: usize,
) -> NormalizeOutcome {
    let mut outcome = NormalizeOutcome::default();
    let mut lines = source_lines(content);

    let Some(header_line) = lines.find(|line| !is_blank_line(line)) else {
        outcome
            .warnings
            .push("source has no header line".to_string());
        return outcome;
    };

    let headers = parse_header(header_line);
    let resolved = field_map.resolve(&headers);
    outcome.header_count = headers.len();
    outcome.unmapped_headers = resolved.unmapped.clone();

    if resolved.columns.is_empty() {
        outcome
            .warnings
            .push("no source header matches the field map".to_string());
    }
    if resolved.property_name_index.is_none() && resolved.register_date_index.is_none() {
        outcome.warnings.push(format!(
            "header has neither {PROPERTY_NAME_FIELD} nor {REGISTER_DATE_FIELD} column; every row will be skipped"
        ));
    }

    for line in lines {
        outcome.lines_read += 1;
        if is_blank_line(line) {
            outcome.blank_lines += 1;
            continue;
        }

        let cells = split_row(line);
        if !has_identity(&resolved, &cells) {
            outcome.skipped += 1;
            continue;
        }

        let sequence = first_sequence + outcome.records.len();
        outcome.records.push(NormalizedRecord {
            property_number: property_number(run_date, sequence),
            fields: map_row(&resolved, &cells, coercer),
        });

        let accepted = outcome.records.len();
        if accepted % 500 == 0 {
            info!(accepted, "normalizing rows");
        }
    }

    outcome
}
