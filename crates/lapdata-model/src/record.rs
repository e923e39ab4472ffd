//! Record shape shared by the write and load engines

use crate::error::{ModelError, Result};
use lapdata_graph::Value;
use std::collections::BTreeMap;

/// One element of a repeated group: name -> value.
pub type GroupRow = BTreeMap<String, Value>;

/// A flat record keyed by descriptor name.
pub type Record = BTreeMap<String, Field>;

#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Scalar(Value),
    /// Repeated sub-records, in insertion order.
    Group(Vec<GroupRow>),
}

impl Field {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&[GroupRow]> {
        match self {
            Self::Group(rows) => Some(rows),
            Self::Scalar(_) => None,
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<GroupRow>> for Field {
    fn from(rows: Vec<GroupRow>) -> Self {
        Self::Group(rows)
    }
}

/// Parse a JSON object into a [`Record`].
///
/// Arrays become groups and must hold objects of scalars. `null` values are
/// treated as absent.
pub fn record_from_json(json: &serde_json::Value) -> Result<Record> {
    let object = json.as_object().ok_or_else(|| ModelError::InvalidRecord {
        key: String::new(),
        message: "expected a JSON object".to_string(),
    })?;

    let mut record = Record::new();
    for (key, value) in object {
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::Array(items) => {
                let rows = items
                    .iter()
                    .map(|item| group_row_from_json(key, item))
                    .collect::<Result<Vec<_>>>()?;
                record.insert(key.clone(), Field::Group(rows));
            }
            other => {
                let value = Value::from_json(other).ok_or_else(|| ModelError::InvalidRecord {
                    key: key.clone(),
                    message: format!("unsupported value {other}"),
                })?;
                record.insert(key.clone(), Field::Scalar(value));
            }
        }
    }
    Ok(record)
}

fn group_row_from_json(key: &str, item: &serde_json::Value) -> Result<GroupRow> {
    let object = item.as_object().ok_or_else(|| ModelError::InvalidRecord {
        key: key.to_string(),
        message: "group elements must be objects".to_string(),
    })?;

    let mut row = GroupRow::new();
    for (name, value) in object {
        if value.is_null() {
            continue;
        }
        let value = Value::from_json(value).ok_or_else(|| ModelError::InvalidRecord {
            key: format!("{key}.{name}"),
            message: format!("unsupported value {value}"),
        })?;
        row.insert(name.clone(), value);
    }
    Ok(row)
}

pub fn record_to_json(record: &Record) -> serde_json::Value {
    let object = record
        .iter()
        .map(|(name, field)| {
            let json = match field {
                Field::Scalar(value) => value.to_json(),
                Field::Group(rows) => serde_json::Value::Array(
                    rows.iter()
                        .map(|row| {
                            serde_json::Value::Object(
                                row.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
                            )
                        })
                        .collect(),
                ),
            };
            (name.clone(), json)
        })
        .collect();
    serde_json::Value::Object(object)
}
