//! Flattening of snapshot records into schema rows.
//!
//! A key is written only when the source field is present. Nested objects
//! become lists of rows: the billing period is a one-element list, report
//! types and files keep their length (an empty list stays empty).

use serde_json::{Map, Number, Value};

use super::SnapshotListError;
use crate::client::{BillingPeriod, FilesItem, ReportTypesItem, SnapshotListSnapshotsItem};

/// A flattened record keyed by schema attribute name.
pub type FlatRow = Map<String, Value>;

/// Flatten one snapshot into a row.
///
/// # Errors
///
/// Returns [`SnapshotListError::Conversion`] if a timestamp does not fit the
/// schema integer.
pub fn flatten_snapshot(model: &SnapshotListSnapshotsItem) -> Result<FlatRow, SnapshotListError> {
    let mut row = FlatRow::new();

    insert_str(&mut row, "account_id", model.account_id.as_ref());
    insert_str(&mut row, "month", model.month.as_ref());
    insert_str(&mut row, "account_type", model.account_type.as_ref());
    if let Some(value) = &model.expected_processed_at {
        row.insert(
            "expected_processed_at".into(),
            schema_int("expected_processed_at", value)?,
        );
    }
    insert_str(&mut row, "state", model.state.as_ref());
    if let Some(period) = &model.billing_period {
        row.insert(
            "billing_period".into(),
            Value::Array(vec![Value::Object(flatten_billing_period(period))]),
        );
    }
    insert_str(&mut row, "snapshot_id", model.snapshot_id.as_ref());
    insert_str(&mut row, "charset", model.charset.as_ref());
    insert_str(&mut row, "compression", model.compression.as_ref());
    insert_str(&mut row, "content_type", model.content_type.as_ref());
    insert_str(&mut row, "bucket", model.bucket.as_ref());
    insert_str(&mut row, "version", model.version.as_ref());
    insert_str(&mut row, "created_on", model.created_on.as_ref());
    if let Some(report_types) = &model.report_types {
        let items = report_types
            .iter()
            .map(|item| Value::Object(flatten_report_type(item)))
            .collect();
        row.insert("report_types".into(), Value::Array(items));
    }
    if let Some(files) = &model.files {
        let items = files
            .iter()
            .map(|item| Value::Object(flatten_file(item)))
            .collect();
        row.insert("files".into(), Value::Array(items));
    }
    if let Some(value) = &model.processed_at {
        row.insert("processed_at".into(), schema_int("processed_at", value)?);
    }

    Ok(row)
}

fn flatten_billing_period(model: &BillingPeriod) -> FlatRow {
    let mut row = FlatRow::new();
    insert_str(&mut row, "start", model.start.as_ref());
    insert_str(&mut row, "end", model.end.as_ref());
    row
}

fn flatten_report_type(model: &ReportTypesItem) -> FlatRow {
    let mut row = FlatRow::new();
    insert_str(&mut row, "type", model.report_type.as_ref());
    insert_str(&mut row, "version", model.version.as_ref());
    row
}

fn flatten_file(model: &FilesItem) -> FlatRow {
    let mut row = FlatRow::new();
    insert_str(&mut row, "report_types", model.report_types.as_ref());
    insert_str(&mut row, "location", model.location.as_ref());
    insert_str(&mut row, "account_id", model.account_id.as_ref());
    row
}

fn insert_str(row: &mut FlatRow, key: &str, value: Option<&String>) {
    if let Some(value) = value {
        row.insert(key.to_string(), Value::String(value.clone()));
    }
}

/// Narrow a wire timestamp to the schema's `i64` integer.
fn schema_int(field: &'static str, value: &Number) -> Result<Value, SnapshotListError> {
    value
        .as_i64()
        .map(Value::from)
        .ok_or_else(|| SnapshotListError::Conversion {
            field,
            value: value.to_string(),
        })
}
