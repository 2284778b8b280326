use rusqlite::types::Value;

use crate::types::RowValues;

/// Convert `RowValues` into owned rusqlite values.
///
/// Booleans become 0/1, timestamps `YYYY-MM-DD HH:MM:SS[.fff]` text, and
/// JSON its serialized text.
#[must_use]
pub fn convert_params(params: &[RowValues]) -> Vec<Value> {
    params
        .iter()
        .map(|param| match param {
            RowValues::Int(i) => Value::Integer(*i),
            RowValues::Float(f) => Value::Real(*f),
            RowValues::Text(s) => Value::Text(s.clone()),
            RowValues::Bool(b) => Value::Integer(i64::from(*b)),
            RowValues::Timestamp(dt) => Value::Text(dt.format("%F %T%.f").to_string()),
            RowValues::Null => Value::Null,
            RowValues::JSON(jsval) => Value::Text(jsval.to_string()),
            RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
        })
        .collect()
}
