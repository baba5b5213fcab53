//! Validation and deduplication of raw open-house records.
//!
//! A record survives when it has an `OpenHouseKey` plus parseable start, end
//! and `DateModified` timestamps. Among survivors sharing a key, the one with
//! the latest `DateModified` is kept; on an exact tie the record seen first in
//! the input wins.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;

use crate::domain::model::{
    CleanRecord, CleanReport, CleanedDataset, FieldParse, RawField, RawRecord, REQUIRED_FIELDS,
};
use crate::utils::error::{EtlError, Result};

const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

const NAIVE_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

/// Parses a timestamp string into UTC. Values without an offset are taken as UTC.
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub fn parse_timestamp_field(field: &RawField) -> FieldParse<DateTime<Utc>> {
    match field {
        RawField::Absent | RawField::Null => FieldParse::Missing,
        RawField::Text(s) => match parse_utc_timestamp(s) {
            Some(ts) => FieldParse::Parsed(ts),
            None => FieldParse::Invalid(s.clone()),
        },
        RawField::Number(n) => FieldParse::Invalid(n.to_string()),
        RawField::Other(v) => FieldParse::Invalid(v.to_string()),
    }
}

/// `OpenHouseDate` is a calendar day; full timestamps contribute their UTC date.
pub fn parse_date_field(field: &RawField) -> FieldParse<NaiveDate> {
    match field {
        RawField::Absent | RawField::Null => FieldParse::Missing,
        RawField::Text(s) => {
            let trimmed = s.trim();
            match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
                Ok(date) => FieldParse::Parsed(date),
                Err(_) => match parse_utc_timestamp(trimmed) {
                    Some(ts) => FieldParse::Parsed(ts.date_naive()),
                    None => FieldParse::Invalid(s.clone()),
                },
            }
        }
        RawField::Number(n) => FieldParse::Invalid(n.to_string()),
        RawField::Other(v) => FieldParse::Invalid(v.to_string()),
    }
}

pub fn parse_key_field(field: &RawField) -> FieldParse<String> {
    match field.as_text() {
        Some(key) => FieldParse::Parsed(key),
        None => FieldParse::Missing,
    }
}

/// Fails when a required field is missing from every record of a non-empty batch.
pub fn check_schema(records: &[RawRecord]) -> Result<()> {
    if records.is_empty() {
        return Ok(());
    }

    for name in REQUIRED_FIELDS {
        let present = records
            .iter()
            .any(|r| r.field(name).is_some_and(|f| !f.is_absent()));
        if !present {
            return Err(EtlError::schema(
                name,
                format!("field is absent from all {} input records", records.len()),
            ));
        }
    }
    Ok(())
}

enum Verdict {
    Keep(CleanRecord),
    MissingKey,
    InvalidStart,
    InvalidEnd,
    InvalidDateModified,
}

fn validate_record(record: RawRecord) -> Verdict {
    // Start and end are parsed before the key check so every record gets both markers.
    let start = parse_timestamp_field(&record.open_house_start_time);
    let end = parse_timestamp_field(&record.open_house_end_time);

    let Some(key) = parse_key_field(&record.open_house_key).ok() else {
        return Verdict::MissingKey;
    };
    let Some(start) = start.ok() else {
        return Verdict::InvalidStart;
    };
    let Some(end) = end.ok() else {
        return Verdict::InvalidEnd;
    };
    let Some(date_modified) = parse_timestamp_field(&record.date_modified).ok() else {
        return Verdict::InvalidDateModified;
    };

    Verdict::Keep(CleanRecord {
        open_house_key: key,
        listing_key: record.listing_key.as_text(),
        open_house_method: record.open_house_method.as_text(),
        open_house_start_time: start,
        open_house_end_time: end,
        open_house_date: parse_date_field(&record.open_house_date).ok(),
        state: record.state.as_text(),
        zipcode: record.zipcode.as_text(),
        date_modified,
    })
}

/// Validates and deduplicates a batch, returning the cleaned dataset.
pub fn clean(records: Vec<RawRecord>) -> Result<CleanedDataset> {
    clean_with_report(records).map(|(dataset, _)| dataset)
}

/// Like [`clean`], also returning counts of what was dropped and why.
pub fn clean_with_report(records: Vec<RawRecord>) -> Result<(CleanedDataset, CleanReport)> {
    check_schema(&records)?;

    let mut report = CleanReport {
        raw_records: records.len(),
        ..CleanReport::default()
    };

    let mut survivors: Vec<CleanRecord> = Vec::new();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();

    for (index, record) in records.into_iter().enumerate() {
        let candidate = match validate_record(record) {
            Verdict::Keep(candidate) => candidate,
            Verdict::MissingKey => {
                report.missing_key += 1;
                tracing::debug!(index, "dropping record without OpenHouseKey");
                continue;
            }
            Verdict::InvalidStart => {
                report.invalid_start_time += 1;
                tracing::debug!(index, "dropping record with invalid OpenHouseStartTime");
                continue;
            }
            Verdict::InvalidEnd => {
                report.invalid_end_time += 1;
                tracing::debug!(index, "dropping record with invalid OpenHouseEndTime");
                continue;
            }
            Verdict::InvalidDateModified => {
                report.invalid_date_modified += 1;
                tracing::debug!(index, "dropping record with invalid DateModified");
                continue;
            }
        };

        match slot_by_key.get(&candidate.open_house_key) {
            Some(&slot) => {
                report.duplicates_superseded += 1;
                // Strictly later wins, so the earlier record keeps ties.
                if candidate.date_modified > survivors[slot].date_modified {
                    survivors[slot] = candidate;
                }
            }
            None => {
                slot_by_key.insert(candidate.open_house_key.clone(), survivors.len());
                survivors.push(candidate);
            }
        }
    }

    report.cleaned_records = survivors.len();

    tracing::info!(
        raw = report.raw_records,
        cleaned = report.cleaned_records,
        missing_key = report.missing_key,
        invalid_start_time = report.invalid_start_time,
        invalid_end_time = report.invalid_end_time,
        invalid_date_modified = report.invalid_date_modified,
        duplicates_superseded = report.duplicates_superseded,
        "validated open house batch"
    );

    Ok((CleanedDataset::from_unique(survivors), report))
}
