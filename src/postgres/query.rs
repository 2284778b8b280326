use std::sync::Arc;

use bb8::Pool;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tokio_postgres::types::Type;
use tokio_postgres::{Row, Statement};

use super::manager::PgManager;
use super::params::{Params, affected_rows};
use crate::error::SqlScopeError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Check out a client, prepare `text`, and either fetch rows or report the
/// affected-row count when the statement returns no columns.
pub(crate) async fn query(
    pool: &Pool<PgManager>,
    text: &str,
    values: &[RowValues],
) -> Result<ResultSet, SqlScopeError> {
    let client = pool.get().await?;
    let stmt = client.prepare(text).await?;
    let params = Params::convert(values);

    if stmt.columns().is_empty() {
        let count = client.execute(&stmt, params.as_refs()).await?;
        return Ok(ResultSet::from_rows_affected(affected_rows(count)?));
    }

    let rows = client.query(&stmt, params.as_refs()).await?;
    build_result_set(&stmt, &rows)
}

/// Build a result set using statement metadata for column names.
///
/// # Errors
/// Returns errors from row value extraction.
pub fn build_result_set(stmt: &Statement, rows: &[Row]) -> Result<ResultSet, SqlScopeError> {
    let column_names: Vec<String> = stmt
        .columns()
        .iter()
        .map(|col| col.name().to_string())
        .collect();
    let column_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(rows.len());
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let mut row_values = Vec::with_capacity(column_count);
        for idx in 0..column_count {
            row_values.push(postgres_extract_value(row, idx)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

/// Extract a `RowValues` from a `tokio_postgres` row at the given index.
///
/// Any other column type is read as text, which only succeeds for text-like
/// types (`TEXT`, `VARCHAR`, `BPCHAR`, `NAME`, enums). Types such as
/// `NUMERIC`, `UUID` or `INET` need a `::text` cast in the query.
///
/// # Errors
/// Returns `SqlScopeError::PostgresError` if the column cannot be decoded,
/// including an uncast column of an unmapped non-text type.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<RowValues, SqlScopeError> {
    let value = match *row.columns()[idx].type_() {
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(RowValues::Int),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| RowValues::Float(f64::from(v))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(RowValues::Float),
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(RowValues::Bool),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(RowValues::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| RowValues::Timestamp(v.naive_utc())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|v| RowValues::Text(v.to_string())),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<Value>>(idx)?.map(RowValues::JSON),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(RowValues::Blob),
        _ => row.try_get::<_, Option<String>>(idx)?.map(RowValues::Text),
    };
    Ok(value.unwrap_or(RowValues::Null))
}
