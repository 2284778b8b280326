use std::sync::Arc;

use bb8::Pool;
use rusqlite::types::Value;
use rusqlite::{Row, Statement, params_from_iter};

use super::manager::{SqliteManager, run_blocking};
use super::params::convert_params;
use crate::error::SqlScopeError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Check out a connection and run `text` on the blocking pool, fetching rows
/// or reporting the affected-row count when the statement has no columns.
pub(crate) async fn query(
    pool: &Pool<SqliteManager>,
    text: &str,
    values: &[RowValues],
) -> Result<ResultSet, SqlScopeError> {
    let conn = pool.get().await?;
    let handle = Arc::clone(&*conn);
    let sql = text.to_owned();
    let params = convert_params(values);

    run_blocking(handle, move |sqlite| {
        let mut stmt = sqlite.prepare(&sql)?;
        if stmt.column_count() == 0 {
            let count = stmt.execute(params_from_iter(params.iter()))?;
            return Ok(ResultSet::from_rows_affected(count));
        }
        build_result_set(&mut stmt, &params)
    })
    .await
}

/// Extract a `RowValues` from a rusqlite row.
///
/// # Errors
/// Returns `SqlScopeError::SqliteError` if the value cannot be read.
pub fn sqlite_extract_value(row: &Row<'_>, idx: usize) -> Result<RowValues, SqlScopeError> {
    let value: Value = row.get(idx)?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Run a prepared statement and collect every row.
///
/// # Errors
/// Returns `SqlScopeError::SqliteError` if execution or decoding fails.
pub fn build_result_set(
    stmt: &mut Statement<'_>,
    params: &[Value],
) -> Result<ResultSet, SqlScopeError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    while let Some(row) = rows.next()? {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(sqlite_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
