use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::utils::error::{EtlError, Result};

pub const OPEN_HOUSE_KEY: &str = "OpenHouseKey";
pub const OPEN_HOUSE_START_TIME: &str = "OpenHouseStartTime";
pub const OPEN_HOUSE_END_TIME: &str = "OpenHouseEndTime";
pub const DATE_MODIFIED: &str = "DateModified";
pub const OPEN_HOUSE_DATE: &str = "OpenHouseDate";
pub const ZIPCODE: &str = "Zipcode";
pub const LISTING_KEY: &str = "ListingKey";
pub const OPEN_HOUSE_METHOD: &str = "OpenHouseMethod";
pub const STATE: &str = "State";

/// Fields that must exist somewhere in a non-empty batch.
pub const REQUIRED_FIELDS: [&str; 4] = [
    OPEN_HOUSE_KEY,
    OPEN_HOUSE_START_TIME,
    OPEN_HOUSE_END_TIME,
    DATE_MODIFIED,
];

/// One field of a raw JSON record, keeping "key not present" apart from `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RawField {
    #[default]
    Absent,
    Null,
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl RawField {
    pub fn is_absent(&self) -> bool {
        matches!(self, RawField::Absent)
    }

    /// Identifier-like rendering: strings as-is, numbers in decimal.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawField::Absent | RawField::Null => None,
            RawField::Text(s) => Some(s.clone()),
            RawField::Number(n) => Some(n.to_string()),
            RawField::Other(v) => Some(v.to_string()),
        }
    }
}

impl From<Option<serde_json::Value>> for RawField {
    fn from(value: Option<serde_json::Value>) -> Self {
        match value {
            None => RawField::Absent,
            Some(serde_json::Value::Null) => RawField::Null,
            Some(serde_json::Value::String(s)) => RawField::Text(s),
            Some(serde_json::Value::Number(n)) => RawField::Number(n),
            Some(other) => RawField::Other(other),
        }
    }
}

/// Outcome of parsing a single raw field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldParse<T> {
    Parsed(T),
    Missing,
    Invalid(String),
}

impl<T> FieldParse<T> {
    pub fn ok(self) -> Option<T> {
        match self {
            FieldParse::Parsed(value) => Some(value),
            FieldParse::Missing | FieldParse::Invalid(_) => None,
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, FieldParse::Parsed(_))
    }
}

/// An open-house record as it arrives from the listing feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub open_house_key: RawField,
    pub open_house_start_time: RawField,
    pub open_house_end_time: RawField,
    pub date_modified: RawField,
    pub open_house_date: RawField,
    pub zipcode: RawField,
    pub listing_key: RawField,
    pub open_house_method: RawField,
    pub state: RawField,
}

impl RawRecord {
    /// Builds a record from one JSON object. Unknown keys are ignored.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let mut obj = match value {
            serde_json::Value::Object(obj) => obj,
            other => {
                return Err(EtlError::schema(
                    "<record>",
                    format!("expected a JSON object, found {}", json_kind(&other)),
                ))
            }
        };

        let mut take = |name: &str| RawField::from(obj.remove(name));

        Ok(Self {
            open_house_key: take(OPEN_HOUSE_KEY),
            open_house_start_time: take(OPEN_HOUSE_START_TIME),
            open_house_end_time: take(OPEN_HOUSE_END_TIME),
            date_modified: take(DATE_MODIFIED),
            open_house_date: take(OPEN_HOUSE_DATE),
            zipcode: take(ZIPCODE),
            listing_key: take(LISTING_KEY),
            open_house_method: take(OPEN_HOUSE_METHOD),
            state: take(STATE),
        })
    }

    /// Looks a field up by its feed name.
    pub fn field(&self, name: &str) -> Option<&RawField> {
        match name {
            OPEN_HOUSE_KEY => Some(&self.open_house_key),
            OPEN_HOUSE_START_TIME => Some(&self.open_house_start_time),
            OPEN_HOUSE_END_TIME => Some(&self.open_house_end_time),
            DATE_MODIFIED => Some(&self.date_modified),
            OPEN_HOUSE_DATE => Some(&self.open_house_date),
            ZIPCODE => Some(&self.zipcode),
            LISTING_KEY => Some(&self.listing_key),
            OPEN_HOUSE_METHOD => Some(&self.open_house_method),
            STATE => Some(&self.state),
            _ => None,
        }
    }
}

/// Parses a feed document: an array of objects, or a single object.
pub fn raw_records_from_json(document: serde_json::Value) -> Result<Vec<RawRecord>> {
    match document {
        serde_json::Value::Array(items) => items.into_iter().map(RawRecord::from_json).collect(),
        obj @ serde_json::Value::Object(_) => Ok(vec![RawRecord::from_json(obj)?]),
        other => Err(EtlError::schema(
            "<document>",
            format!("expected an array of records, found {}", json_kind(&other)),
        )),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CleanRecord {
    pub open_house_key: String,
    pub listing_key: Option<String>,
    pub open_house_method: Option<String>,
    pub open_house_start_time: DateTime<Utc>,
    pub open_house_end_time: DateTime<Utc>,
    pub open_house_date: Option<NaiveDate>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub date_modified: DateTime<Utc>,
}

impl CleanRecord {
    /// Calendar day the open house is counted under: `OpenHouseDate`, else the
    /// UTC date of the start time.
    pub fn event_date(&self) -> NaiveDate {
        self.open_house_date
            .unwrap_or_else(|| self.open_house_start_time.date_naive())
    }
}

/// Validated records with unique `OpenHouseKey`s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedDataset {
    records: Vec<CleanRecord>,
}

impl CleanedDataset {
    pub(crate) fn from_unique(records: Vec<CleanRecord>) -> Self {
        Self { records }
    }

    /// Rebuilds a dataset from persisted rows, rejecting duplicate keys.
    pub fn from_records(records: Vec<CleanRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.open_house_key.as_str()) {
                return Err(EtlError::ValidationError {
                    message: format!(
                        "duplicate {} `{}` in cleaned dataset",
                        OPEN_HOUSE_KEY, record.open_house_key
                    ),
                });
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[CleanRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&CleanRecord> {
        self.records.iter().find(|r| r.open_house_key == key)
    }
}

/// Per-batch counters for records the validator filtered out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub raw_records: usize,
    pub missing_key: usize,
    pub invalid_start_time: usize,
    pub invalid_end_time: usize,
    pub invalid_date_modified: usize,
    pub duplicates_superseded: usize,
    pub cleaned_records: usize,
}

impl CleanReport {
    pub fn dropped(&self) -> usize {
        self.missing_key + self.invalid_start_time + self.invalid_end_time + self.invalid_date_modified
    }
}

/// Output of the processing pipeline's transform step.
#[derive(Debug, Clone)]
pub struct TransformResult {
    pub dataset: CleanedDataset,
    pub report: CleanReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekCount {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Week")]
    pub week: u32,
    #[serde(rename = "StartOfWeek")]
    pub start_of_week: NaiveDate,
    #[serde(rename = "EndOfWeek")]
    pub end_of_week: NaiveDate,
    #[serde(rename = "OpenHouseCount")]
    pub open_house_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZipCount {
    #[serde(rename = "Zipcode")]
    pub zipcode: String,
    #[serde(rename = "OpenHouseCount")]
    pub open_house_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCumulative {
    #[serde(rename = "OpenHouseDate")]
    pub open_house_date: NaiveDate,
    pub daily_cumulative_total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    BusiestWeek,
    TopZipCodes,
    DailyCumulativeTotal,
}

impl QueryKind {
    pub const ALL: [QueryKind; 3] = [
        QueryKind::BusiestWeek,
        QueryKind::TopZipCodes,
        QueryKind::DailyCumulativeTotal,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            QueryKind::BusiestWeek => "Week with the Most Open Houses",
            QueryKind::TopZipCodes => "Top-5 Zip Codes with the Most Open Houses",
            QueryKind::DailyCumulativeTotal => "Daily Cumulative Total of Open Houses Over Time",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            QueryKind::BusiestWeek => &["Year", "Week", "StartOfWeek", "EndOfWeek", "OpenHouseCount"],
            QueryKind::TopZipCodes => &["Zipcode", "OpenHouseCount"],
            QueryKind::DailyCumulativeTotal => &["OpenHouseDate", "daily_cumulative_total"],
        }
    }
}

/// A small result table produced fresh by each query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "query", content = "rows", rename_all = "snake_case")]
pub enum AggregateResult {
    BusiestWeek(Vec<WeekCount>),
    TopZipCodes(Vec<ZipCount>),
    DailyCumulativeTotal(Vec<DailyCumulative>),
}

impl AggregateResult {
    pub fn kind(&self) -> QueryKind {
        match self {
            AggregateResult::BusiestWeek(_) => QueryKind::BusiestWeek,
            AggregateResult::TopZipCodes(_) => QueryKind::TopZipCodes,
            AggregateResult::DailyCumulativeTotal(_) => QueryKind::DailyCumulativeTotal,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            AggregateResult::BusiestWeek(rows) => rows.len(),
            AggregateResult::TopZipCodes(rows) => rows.len(),
            AggregateResult::DailyCumulativeTotal(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells rendered as strings, in `QueryKind::columns` order.
    pub fn cells(&self) -> Vec<Vec<String>> {
        match self {
            AggregateResult::BusiestWeek(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        r.year.to_string(),
                        r.week.to_string(),
                        r.start_of_week.to_string(),
                        r.end_of_week.to_string(),
                        r.open_house_count.to_string(),
                    ]
                })
                .collect(),
            AggregateResult::TopZipCodes(rows) => rows
                .iter()
                .map(|r| vec![r.zipcode.clone(), r.open_house_count.to_string()])
                .collect(),
            AggregateResult::DailyCumulativeTotal(rows) => rows
                .iter()
                .map(|r| {
                    vec![
                        r.open_house_date.to_string(),
                        r.daily_cumulative_total.to_string(),
                    ]
                })
                .collect(),
        }
    }
}

/// The three dashboard tables, computed from one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardReport {
    pub total_records: usize,
    pub results: Vec<AggregateResult>,
}

impl DashboardReport {
    pub const TITLE: &'static str = "Open House Dashboard";

    pub fn result(&self, kind: QueryKind) -> Option<&AggregateResult> {
        self.results.iter().find(|r| r.kind() == kind)
    }
}
