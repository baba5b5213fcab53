//! Columnar storage of the cleaned dataset.
//!
//! The file is a JSON document holding one array per column plus a schema
//! header. Optional columns keep `null` apart from the empty string, so a
//! dataset reloads exactly as it was written.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::{
    CleanRecord, CleanedDataset, DATE_MODIFIED, LISTING_KEY, OPEN_HOUSE_DATE, OPEN_HOUSE_END_TIME,
    OPEN_HOUSE_KEY, OPEN_HOUSE_METHOD, OPEN_HOUSE_START_TIME, STATE, ZIPCODE,
};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};

pub const FORMAT_NAME: &str = "open-house-columnar";
pub const FORMAT_VERSION: u32 = 1;

/// Column order of the persisted dataset; matches `CleanRecord`'s field order.
pub const DATASET_COLUMNS: [&str; 9] = [
    OPEN_HOUSE_KEY,
    LISTING_KEY,
    OPEN_HOUSE_METHOD,
    OPEN_HOUSE_START_TIME,
    OPEN_HOUSE_END_TIME,
    OPEN_HOUSE_DATE,
    STATE,
    ZIPCODE,
    DATE_MODIFIED,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub r#type: String,
    pub nullable: bool,
}

fn dataset_schema() -> Vec<ColumnSchema> {
    let column = |name: &str, r#type: &str, nullable: bool| ColumnSchema {
        name: name.to_string(),
        r#type: r#type.to_string(),
        nullable,
    };
    vec![
        column(OPEN_HOUSE_KEY, "utf8", false),
        column(LISTING_KEY, "utf8", true),
        column(OPEN_HOUSE_METHOD, "utf8", true),
        column(OPEN_HOUSE_START_TIME, "timestamp[utc]", false),
        column(OPEN_HOUSE_END_TIME, "timestamp[utc]", false),
        column(OPEN_HOUSE_DATE, "date", true),
        column(STATE, "utf8", true),
        column(ZIPCODE, "utf8", true),
        column(DATE_MODIFIED, "timestamp[utc]", false),
    ]
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DatasetColumns {
    open_house_key: Vec<String>,
    listing_key: Vec<Option<String>>,
    open_house_method: Vec<Option<String>>,
    open_house_start_time: Vec<DateTime<Utc>>,
    open_house_end_time: Vec<DateTime<Utc>>,
    open_house_date: Vec<Option<NaiveDate>>,
    state: Vec<Option<String>>,
    zipcode: Vec<Option<String>>,
    date_modified: Vec<DateTime<Utc>>,
}

impl DatasetColumns {
    fn from_records(records: &[CleanRecord]) -> Self {
        let mut columns = Self::default();
        for r in records {
            columns.open_house_key.push(r.open_house_key.clone());
            columns.listing_key.push(r.listing_key.clone());
            columns.open_house_method.push(r.open_house_method.clone());
            columns.open_house_start_time.push(r.open_house_start_time);
            columns.open_house_end_time.push(r.open_house_end_time);
            columns.open_house_date.push(r.open_house_date);
            columns.state.push(r.state.clone());
            columns.zipcode.push(r.zipcode.clone());
            columns.date_modified.push(r.date_modified);
        }
        columns
    }

    fn lengths(&self) -> [(&'static str, usize); 9] {
        [
            (OPEN_HOUSE_KEY, self.open_house_key.len()),
            (LISTING_KEY, self.listing_key.len()),
            (OPEN_HOUSE_METHOD, self.open_house_method.len()),
            (OPEN_HOUSE_START_TIME, self.open_house_start_time.len()),
            (OPEN_HOUSE_END_TIME, self.open_house_end_time.len()),
            (OPEN_HOUSE_DATE, self.open_house_date.len()),
            (STATE, self.state.len()),
            (ZIPCODE, self.zipcode.len()),
            (DATE_MODIFIED, self.date_modified.len()),
        ]
    }

    fn into_records(self) -> Vec<CleanRecord> {
        let mut listing_key = self.listing_key.into_iter();
        let mut open_house_method = self.open_house_method.into_iter();
        let mut state = self.state.into_iter();
        let mut zipcode = self.zipcode.into_iter();

        // Lengths are checked by the caller, so every iterator yields in step.
        self.open_house_key
            .into_iter()
            .enumerate()
            .map(|(i, open_house_key)| CleanRecord {
                open_house_key,
                listing_key: listing_key.next().flatten(),
                open_house_method: open_house_method.next().flatten(),
                open_house_start_time: self.open_house_start_time[i],
                open_house_end_time: self.open_house_end_time[i],
                open_house_date: self.open_house_date[i],
                state: state.next().flatten(),
                zipcode: zipcode.next().flatten(),
                date_modified: self.date_modified[i],
            })
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ColumnarFile {
    format: String,
    version: u32,
    row_count: usize,
    schema: Vec<ColumnSchema>,
    columns: DatasetColumns,
}

pub fn encode_dataset(dataset: &CleanedDataset) -> Result<Vec<u8>> {
    let file = ColumnarFile {
        format: FORMAT_NAME.to_string(),
        version: FORMAT_VERSION,
        row_count: dataset.len(),
        schema: dataset_schema(),
        columns: DatasetColumns::from_records(dataset.records()),
    };
    Ok(serde_json::to_vec(&file)?)
}

pub fn decode_dataset(bytes: &[u8]) -> Result<CleanedDataset> {
    let document: serde_json::Value = serde_json::from_slice(bytes)?;

    if document.get("format").and_then(|f| f.as_str()) != Some(FORMAT_NAME) {
        return Err(EtlError::schema("format", format!("not an {} file", FORMAT_NAME)));
    }
    let columns = document
        .get("columns")
        .and_then(|c| c.as_object())
        .ok_or_else(|| EtlError::schema("columns", "column table missing"))?;
    for column in DATASET_COLUMNS {
        if !columns.contains_key(column) {
            return Err(EtlError::schema(column, "column missing from persisted dataset"));
        }
    }

    let file: ColumnarFile = serde_json::from_value(document)?;
    if file.version != FORMAT_VERSION {
        return Err(EtlError::schema(
            "version",
            format!("unsupported version {}", file.version),
        ));
    }
    for (name, len) in file.columns.lengths() {
        if len != file.row_count {
            return Err(EtlError::schema(
                name,
                format!("column has {} values, expected {}", len, file.row_count),
            ));
        }
    }

    CleanedDataset::from_records(file.columns.into_records())
}

pub async fn save_dataset<S: Storage>(storage: &S, path: &str, dataset: &CleanedDataset) -> Result<()> {
    let bytes = encode_dataset(dataset)?;
    tracing::debug!("Writing cleaned dataset ({} bytes) to {}", bytes.len(), path);
    storage.write_file(path, &bytes).await
}

pub async fn load_dataset<S: Storage>(storage: &S, path: &str) -> Result<CleanedDataset> {
    let bytes = storage.read_file(path).await?;
    let dataset = decode_dataset(&bytes)?;
    tracing::debug!("Loaded {} cleaned records from {}", dataset.len(), path);
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{aggregation, validator};
    use crate::domain::model::RawRecord;
    use serde_json::json;

    fn sample() -> CleanedDataset {
        CleanedDataset::from_records(vec![
            CleanRecord {
                open_house_key: "98765".to_string(),
                listing_key: Some("12345".to_string()),
                open_house_method: Some("Virtual".to_string()),
                open_house_start_time: "2023-06-19T09:00:00Z".parse().unwrap(),
                open_house_end_time: "2023-06-19T11:00:00Z".parse().unwrap(),
                open_house_date: Some("2023-06-19".parse().unwrap()),
                state: Some("CA".to_string()),
                zipcode: Some("92630".to_string()),
                date_modified: "2023-06-19T13:00:00Z".parse().unwrap(),
            },
            CleanRecord {
                open_house_key: "11111".to_string(),
                listing_key: None,
                open_house_method: None,
                open_house_start_time: "2023-06-20T09:00:00Z".parse().unwrap(),
                open_house_end_time: "2023-06-20T11:00:00Z".parse().unwrap(),
                open_house_date: None,
                state: None,
                zipcode: None,
                date_modified: "2023-06-20T13:00:00Z".parse().unwrap(),
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_encoded_dataset_is_column_oriented() {
        let bytes = encode_dataset(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["format"], FORMAT_NAME);
        assert_eq!(value["row_count"], 2);
        let names: Vec<&str> = value["schema"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, DATASET_COLUMNS.to_vec());
        assert_eq!(value["columns"]["OpenHouseKey"], json!(["98765", "11111"]));
        assert_eq!(value["columns"]["Zipcode"], json!(["92630", null]));
        assert_eq!(value["columns"]["OpenHouseStartTime"][0], "2023-06-19T09:00:00Z");
    }

    #[test]
    fn test_empty_dataset_reloads_empty() {
        let bytes = encode_dataset(&CleanedDataset::default()).unwrap();
        let decoded = decode_dataset(&bytes).unwrap();

        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_restores_optional_cells() {
        let original = sample();
        let decoded = decode_dataset(&encode_dataset(&original).unwrap()).unwrap();

        assert_eq!(decoded, original);
        assert_eq!(decoded.get("11111").unwrap().zipcode, None);
    }

    #[test]
    fn test_empty_strings_survive_reload() {
        let raw = RawRecord::from_json(json!({
            "OpenHouseKey": "1",
            "ListingKey": "",
            "OpenHouseStartTime": "2023-06-18T08:00:00Z",
            "OpenHouseEndTime": "2023-06-18T10:00:00Z",
            "Zipcode": "",
            "DateModified": "2023-06-18T12:00:00Z"
        }))
        .unwrap();
        let cleaned = validator::clean(vec![raw]).unwrap();

        let reloaded = decode_dataset(&encode_dataset(&cleaned).unwrap()).unwrap();

        assert_eq!(reloaded, cleaned);
        assert_eq!(reloaded.records()[0].zipcode.as_deref(), Some(""));
        assert_eq!(reloaded.records()[0].listing_key.as_deref(), Some(""));
        assert_eq!(reloaded.records()[0].state, None);
        assert_eq!(
            aggregation::top_zip_codes(&reloaded, aggregation::TOP_ZIP_CODES),
            aggregation::top_zip_codes(&cleaned, aggregation::TOP_ZIP_CODES)
        );
    }

    #[test]
    fn test_decode_rejects_missing_column() {
        let mut value: serde_json::Value =
            serde_json::from_slice(&encode_dataset(&sample()).unwrap()).unwrap();
        value["columns"].as_object_mut().unwrap().remove("Zipcode");

        let err = decode_dataset(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, EtlError::SchemaError { ref field, .. } if field == "Zipcode"));
    }

    #[test]
    fn test_decode_rejects_ragged_columns() {
        let mut value: serde_json::Value =
            serde_json::from_slice(&encode_dataset(&sample()).unwrap()).unwrap();
        value["columns"]["State"].as_array_mut().unwrap().pop();

        let err = decode_dataset(&serde_json::to_vec(&value).unwrap()).unwrap_err();
        assert!(matches!(err, EtlError::SchemaError { ref field, .. } if field == "State"));
    }

    #[test]
    fn test_decode_rejects_foreign_document() {
        let err = decode_dataset(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, EtlError::SchemaError { .. }));
    }
}
