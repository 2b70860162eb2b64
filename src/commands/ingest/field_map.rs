use super::*;

pub(super) const PROPERTY_NAME_FIELD: &str = "property_name";
pub(super) const REGISTER_DATE_FIELD: &str = "register_date";
pub(super) const STATUS_FIELD: &str = "status";
pub(super) const IS_DELETED_FIELD: &str = "is_deleted";
pub(super) const FLOOR_TOTAL_FIELD: &str = "floor_total";

const TRUTHY_TOKENS: [&str; 3] = ["true", "1", "yes"];
const NULL_TEXT_TOKEN: &str = "-";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(super) enum FieldKind {
    #[default]
    Text,
    Boolean,
    Date,
    /// `current/total` floor text. The mapped column gets the leading number,
    /// `floor_total` gets the number after the slash.
    Floors,
}

// Source header label (as exported from the team listing sheet) -> column.
const BUILTIN_FIELDS: &[(&str, &str, FieldKind)] = &[
    ("등록일", "register_date", FieldKind::Date),
    ("공유여부", "shared", FieldKind::Boolean),
    ("담당자", "manager", FieldKind::Text),
    ("매물상태", "status", FieldKind::Text),
    ("재등록사유", "re_register_reason", FieldKind::Text),
    ("매물종류", "property_type", FieldKind::Text),
    ("매물명", "property_name", FieldKind::Text),
    ("동", "dong", FieldKind::Text),
    ("호", "ho", FieldKind::Text),
    ("소재지", "address", FieldKind::Text),
    ("거래유형", "trade_type", FieldKind::Text),
    ("금액", "price", FieldKind::Text),
    ("공급/전용 (㎡)", "supply_area_sqm", FieldKind::Text),
    ("공급/전용 (평)", "supply_area_pyeong", FieldKind::Text),
    ("해당층/총층", "floor_current", FieldKind::Floors),
    ("룸/욕실", "rooms", FieldKind::Text),
    ("방향(거실기준)", "direction", FieldKind::Text),
    ("관리비", "management_fee", FieldKind::Text),
    ("주차", "parking", FieldKind::Text),
    ("입주가능일", "move_in_date", FieldKind::Date),
    ("사용승인", "approval_date", FieldKind::Date),
    ("특이사항", "special_notes", FieldKind::Text),
    ("담당자MEMO", "manager_memo", FieldKind::Text),
    ("거래완료날짜", "completion_date", FieldKind::Date),
    ("거주자", "resident", FieldKind::Text),
    ("임차유형", "rent_type", FieldKind::Text),
    ("임차금액", "rent_amount", FieldKind::Text),
    ("계약기간", "contract_period", FieldKind::Text),
    ("사진", "has_photo", FieldKind::Boolean),
    ("영상", "has_video", FieldKind::Boolean),
    ("출연", "has_appearance", FieldKind::Boolean),
    ("공동중개", "joint_brokerage", FieldKind::Text),
    ("공동연락처", "joint_contact", FieldKind::Text),
    ("광고상태", "ad_status", FieldKind::Text),
    ("광고기간", "ad_period", FieldKind::Text),
    ("등록완료번호", "registration_number", FieldKind::Text),
    ("소유자", "owner_name", FieldKind::Text),
    ("주민(법인)등록번호", "owner_id", FieldKind::Text),
    ("소유주 연락처", "owner_contact", FieldKind::Text),
    ("연락처 관계", "contact_relation", FieldKind::Text),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct FieldSpec {
    pub(super) field: String,
    pub(super) kind: FieldKind,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct FieldMapEntry {
    pub(super) label: String,
    pub(super) field: String,
    #[serde(default)]
    pub(super) kind: FieldKind,
}

/// Immutable header-label to column mapping for one run.
#[derive(Debug, Clone)]
pub(super) struct FieldMap {
    by_label: HashMap<String, FieldSpec>,
}

/// Header positions resolved against a [`FieldMap`].
#[derive(Debug, Clone, Default)]
pub(super) struct ResolvedHeaders {
    pub(super) columns: Vec<(usize, FieldSpec)>,
    pub(super) unmapped: Vec<String>,
    pub(super) property_name_index: Option<usize>,
    pub(super) register_date_index: Option<usize>,
}

impl FieldMap {
    pub(super) fn builtin() -> Self {
        let by_label = BUILTIN_FIELDS
            .iter()
            .map(|(label, field, kind)| {
                (
                    (*label).to_string(),
                    FieldSpec {
                        field: (*field).to_string(),
                        kind: *kind,
                    },
                )
            })
            .collect();
        Self { by_label }
    }

    pub(super) fn from_entries(entries: Vec<FieldMapEntry>) -> Result<Self> {
        if entries.is_empty() {
            bail!("field map has no entries");
        }

        let mut by_label = HashMap::with_capacity(entries.len());
        for entry in entries {
            let label = entry.label.trim().to_string();
            let field = entry.field.trim().to_string();
            if label.is_empty() || field.is_empty() {
                bail!("field map entry has an empty label or field: {label:?} -> {field:?}");
            }
            if field == IS_DELETED_FIELD {
                bail!("field map may not target reserved column {IS_DELETED_FIELD}");
            }

            let spec = FieldSpec {
                field,
                kind: entry.kind,
            };
            if by_label.insert(label.clone(), spec).is_some() {
                bail!("field map lists label {label:?} more than once");
            }
        }

        Ok(Self { by_label })
    }

    pub(super) fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let entries: Vec<FieldMapEntry> = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Self::from_entries(entries).with_context(|| format!("invalid field map {}", path.display()))
    }

    pub(super) fn lookup(&self, label: &str) -> Option<&FieldSpec> {
        self.by_label.get(label.trim())
    }

    pub(super) fn len(&self) -> usize {
        self.by_label.len()
    }

    pub(super) fn resolve(&self, headers: &[String]) -> ResolvedHeaders {
        let mut resolved = ResolvedHeaders::default();

        for (index, label) in headers.iter().enumerate() {
            let Some(spec) = self.lookup(label) else {
                if !label.is_empty() {
                    resolved.unmapped.push(label.clone());
                }
                continue;
            };

            match spec.field.as_str() {
                PROPERTY_NAME_FIELD => resolved.property_name_index = Some(index),
                REGISTER_DATE_FIELD => resolved.register_date_index = Some(index),
                _ => {}
            }
            resolved.columns.push((index, spec.clone()));
        }

        resolved
    }
}

/// Turns raw cell text into typed values. Never fails: anything it cannot
/// read becomes `null` (dates, text) or `false` (booleans).
#[derive(Debug, Clone)]
pub(super) struct ValueCoercer {
    date_pattern: Regex,
    floor_current: Regex,
    floor_total: Regex,
}

impl ValueCoercer {
    pub(super) fn new() -> Result<Self> {
        let date_pattern =
            Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").context("failed to compile date regex")?;
        let floor_current = Regex::new(r"^([0-9]+)").context("failed to compile floor regex")?;
        let floor_total = Regex::new(r"/([0-9]+)").context("failed to compile floor regex")?;
        Ok(Self {
            date_pattern,
            floor_current,
            floor_total,
        })
    }

    pub(super) fn coerce(&self, kind: FieldKind, raw: &str) -> FieldValue {
        match kind {
            FieldKind::Boolean => FieldValue::Bool(coerce_bool(Some(raw))),
            FieldKind::Date => self
                .coerce_date(raw)
                .map(FieldValue::Date)
                .unwrap_or(FieldValue::Null),
            FieldKind::Floors => capture_text(&self.floor_current, raw),
            FieldKind::Text => coerce_text(raw)
                .map(|text| FieldValue::Text(text.to_string()))
                .unwrap_or(FieldValue::Null),
        }
    }

    /// Total-floor companion value of a [`FieldKind::Floors`] cell.
    pub(super) fn floor_total(&self, raw: &str) -> FieldValue {
        capture_text(&self.floor_total, raw)
    }

    pub(super) fn coerce_date(&self, raw: &str) -> Option<NaiveDate> {
        let text = raw.trim();
        if !self.date_pattern.is_match(text) {
            return None;
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
    }
}

pub(super) fn coerce_bool(raw: Option<&str>) -> bool {
    let Some(text) = raw.map(str::trim) else {
        return false;
    };
    TRUTHY_TOKENS
        .iter()
        .any(|token| text.eq_ignore_ascii_case(token))
}

pub(super) fn coerce_text(raw: &str) -> Option<&str> {
    let text = raw.trim();
    if text.is_empty() || text == NULL_TEXT_TOKEN {
        None
    } else {
        Some(text)
    }
}

fn capture_text(pattern: &Regex, raw: &str) -> FieldValue {
    pattern
        .captures(raw.trim())
        .and_then(|captures| captures.get(1))
        .map(|number| FieldValue::Text(number.as_str().to_string()))
        .unwrap_or(FieldValue::Null)
}
