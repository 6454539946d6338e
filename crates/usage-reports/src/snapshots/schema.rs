//! Declarative schema of the `ibm_billing_snapshot_list` data source.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::flatten::FlatRow;

/// Data source type name.
pub const DATA_SOURCE_NAME: &str = "ibm_billing_snapshot_list";

/// Value type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    String,
    Int,
    /// List of nested objects described by [`Attribute::elem`].
    List,
}

/// Who sets an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Required,
    Optional,
    Computed,
}

/// One schema attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub presence: Presence,
    pub description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elem: Option<&'static [Attribute]>,
}

impl Attribute {
    const fn computed(name: &'static str, kind: AttributeType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            presence: Presence::Computed,
            description,
            elem: None,
        }
    }

    const fn computed_list(
        name: &'static str,
        description: &'static str,
        elem: &'static [Attribute],
    ) -> Self {
        Self {
            name,
            kind: AttributeType::List,
            presence: Presence::Computed,
            description,
            elem: Some(elem),
        }
    }
}

const BILLING_PERIOD: &[Attribute] = &[
    Attribute::computed(
        "start",
        AttributeType::String,
        "Date and time of start of billing in the respective snapshot.",
    ),
    Attribute::computed(
        "end",
        AttributeType::String,
        "Date and time of end of billing in the respective snapshot.",
    ),
];

const REPORT_TYPES: &[Attribute] = &[
    Attribute::computed(
        "type",
        AttributeType::String,
        "The type of billing report of the snapshot. Possible values are [account_summary, enterprise_summary, account_resource_instance_usage].",
    ),
    Attribute::computed("version", AttributeType::String, "Version of the snapshot."),
];

const FILES: &[Attribute] = &[
    Attribute::computed(
        "report_types",
        AttributeType::String,
        "The type of billing report stored. Possible values are [account_summary, enterprise_summary, account_resource_instance_usage].",
    ),
    Attribute::computed(
        "location",
        AttributeType::String,
        "Absolute path of the billing report in the COS instance.",
    ),
    Attribute::computed(
        "account_id",
        AttributeType::String,
        "Account ID for which billing report is captured.",
    ),
];

/// Attributes of one element of `snapshots`.
pub const SNAPSHOT: &[Attribute] = &[
    Attribute::computed(
        "account_id",
        AttributeType::String,
        "Account ID for which billing report snapshot is configured.",
    ),
    Attribute::computed("month", AttributeType::String, "Month of captured snapshot."),
    Attribute::computed(
        "account_type",
        AttributeType::String,
        "Type of account. Possible values are [enterprise, account].",
    ),
    Attribute::computed(
        "expected_processed_at",
        AttributeType::Int,
        "Timestamp of snapshot processed.",
    ),
    Attribute::computed(
        "state",
        AttributeType::String,
        "Status of the billing snapshot configuration. Possible values are [enabled, disabled].",
    ),
    Attribute::computed_list(
        "billing_period",
        "Period of billing in snapshot.",
        BILLING_PERIOD,
    ),
    Attribute::computed("snapshot_id", AttributeType::String, "Id of the snapshot captured."),
    Attribute::computed("charset", AttributeType::String, "Character encoding used."),
    Attribute::computed(
        "compression",
        AttributeType::String,
        "Compression format of the snapshot report.",
    ),
    Attribute::computed(
        "content_type",
        AttributeType::String,
        "Type of content stored in snapshot report.",
    ),
    Attribute::computed(
        "bucket",
        AttributeType::String,
        "The name of the COS bucket to store the snapshot of the billing reports.",
    ),
    Attribute::computed("version", AttributeType::String, "Version of the snapshot."),
    Attribute::computed(
        "created_on",
        AttributeType::String,
        "Date and time of creation of snapshot.",
    ),
    Attribute::computed_list(
        "report_types",
        "List of report types configured for the snapshot.",
        REPORT_TYPES,
    ),
    Attribute::computed_list("files", "List of location of reports.", FILES),
    Attribute::computed(
        "processed_at",
        AttributeType::Int,
        "Timestamp at which snapshot is captured.",
    ),
];

/// Top-level attributes of the data source.
pub const DATA_SOURCE: &[Attribute] = &[
    Attribute {
        name: "month",
        kind: AttributeType::String,
        presence: Presence::Required,
        description: "The month for which billing report snapshot is requested.  Format is yyyy-mm.",
        elem: None,
    },
    Attribute {
        name: "date_from",
        kind: AttributeType::Int,
        presence: Presence::Optional,
        description: "Timestamp in milliseconds for which billing report snapshot is requested.",
        elem: None,
    },
    Attribute {
        name: "date_to",
        kind: AttributeType::Int,
        presence: Presence::Optional,
        description: "Timestamp in milliseconds for which billing report snapshot is requested.",
        elem: None,
    },
    Attribute::computed("snapshotcount", AttributeType::Int, "Number of total snapshots."),
    Attribute::computed_list("snapshots", "", SNAPSHOT),
];

/// The data source schema as a JSON document: its type name and attributes.
#[must_use]
pub fn document() -> Value {
    serde_json::json!({
        "name": DATA_SOURCE_NAME,
        "attributes": DATA_SOURCE,
    })
}

/// A flattened row that does not match the schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("undeclared attribute: {0}")]
    Undeclared(String),

    #[error("attribute {name} should be of type {expected:?}")]
    TypeMismatch {
        name: String,
        expected: AttributeType,
    },
}

/// Look up an attribute by name.
#[must_use]
pub fn find(attributes: &'static [Attribute], name: &str) -> Option<&'static Attribute> {
    attributes.iter().find(|a| a.name == name)
}

/// Check that every key in `row` is declared in `attributes` with a matching type.
///
/// Nested lists are checked recursively against their element attributes.
///
/// # Errors
///
/// Returns the first offending attribute, with its dotted path.
pub fn check_row(attributes: &'static [Attribute], row: &FlatRow) -> Result<(), SchemaError> {
    check_object(attributes, row, "")
}

fn check_object(
    attributes: &'static [Attribute],
    row: &FlatRow,
    prefix: &str,
) -> Result<(), SchemaError> {
    for (key, value) in row {
        let path = format!("{prefix}{key}");
        let attribute = find(attributes, key).ok_or_else(|| SchemaError::Undeclared(path.clone()))?;
        let mismatch = || SchemaError::TypeMismatch {
            name: path.clone(),
            expected: attribute.kind,
        };

        match (attribute.kind, value) {
            (AttributeType::String, Value::String(_)) => {}
            (AttributeType::Int, Value::Number(n)) if n.is_i64() => {}
            (AttributeType::List, Value::Array(items)) => {
                let elem = attribute.elem.unwrap_or(&[]);
                for (i, item) in items.iter().enumerate() {
                    let nested = item.as_object().ok_or_else(mismatch)?;
                    check_object(elem, nested, &format!("{path}.{i}."))?;
                }
            }
            _ => return Err(mismatch()),
        }
    }
    Ok(())
}
