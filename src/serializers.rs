//! Row to JSON conversion shared by every resource handler.
//!
//! Each row type derives `Serialize`, which fixes its field table at compile
//! time: foreign keys are plain id columns, decimals render as fixed-point
//! strings, dates and times as ISO-8601 strings and NULL columns as `null`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Flat mapping of column name to JSON value.
pub type Record = Map<String, Value>;

/// A stored entity exposed through the HTTP API.
pub trait Resource: Serialize {
    /// Entity name used in response messages, e.g. `"Job application"`.
    const LABEL: &'static str;
}

pub fn to_record<T: Resource>(row: &T) -> AppResult<Record> {
    match serde_json::to_value(row)? {
        Value::Object(fields) => Ok(fields),
        other => Err(AppError::internal(format!(
            "{} serialized to a non-object value: {other}",
            T::LABEL
        ))),
    }
}

pub fn to_records<T: Resource>(rows: &[T]) -> AppResult<Vec<Record>> {
    rows.iter().map(to_record).collect()
}
