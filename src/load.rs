use crate::error::{EtlError, Result};
use polars::prelude::{AnyValue, DataFrame, DataType, Series};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use std::fs::File;
use std::path::Path;
use tracing::{info, instrument};

/// Writes `table` as CSV with a leading zero-based row index column,
/// replacing whatever was at `path`.
#[instrument(skip(table), fields(rows = table.height()))]
pub fn save_csv(table: &DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    let header = std::iter::once("").chain(table.get_column_names().into_iter().map(|c| c.as_str()));
    wtr.write_record(header)?;

    let columns = series_of(table);
    for idx in 0..table.height() {
        let mut record = vec![idx.to_string()];
        for series in &columns {
            record.push(cell_text(&series.get(idx)?));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    info!(path = %path.display(), "Saved table to CSV");
    Ok(())
}

/// Writes `table` into `table_name`, dropping any existing table of that
/// name first. No index column is written.
#[instrument(skip(table, conn), fields(rows = table.height()))]
pub fn save_db(table: &DataFrame, conn: &Connection, table_name: &str) -> Result<()> {
    if !is_identifier(table_name) {
        return Err(EtlError::InvalidTableName(table_name.to_string()));
    }
    if let Some(bad) = table.get_column_names().into_iter().find(|c| !is_identifier(c)) {
        return Err(EtlError::Schema(format!("invalid column name '{}'", bad)));
    }

    let columns = series_of(table);
    let column_defs = columns
        .iter()
        .map(|s| format!("\"{}\" {}", s.name(), sql_type(s.dtype())))
        .collect::<Vec<_>>()
        .join(", ");
    let column_list = columns
        .iter()
        .map(|s| format!("\"{}\"", s.name()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");

    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS \"{table}\";\nCREATE TABLE \"{table}\" ({defs});",
        table = table_name,
        defs = column_defs
    ))?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            table_name, column_list, placeholders
        ))?;
        for idx in 0..table.height() {
            let row = columns
                .iter()
                .map(|s| Ok(sql_value(s.get(idx)?)))
                .collect::<Result<Vec<SqlValue>>>()?;
            stmt.execute(params_from_iter(row))?;
        }
    }
    tx.commit()?;

    info!(table = table_name, "Loaded table into database");
    Ok(())
}

fn series_of(table: &DataFrame) -> Vec<&Series> {
    table
        .get_columns()
        .iter()
        .map(|c| c.as_materialized_series())
        .collect()
}

fn sql_type(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Float32 | DataType::Float64 => "REAL",
        DataType::Boolean => "INTEGER",
        d if d.is_integer() => "INTEGER",
        _ => "TEXT",
    }
}

fn sql_value(value: AnyValue<'_>) -> SqlValue {
    match value {
        AnyValue::Null => SqlValue::Null,
        AnyValue::Boolean(b) => SqlValue::Integer(b as i64),
        AnyValue::Float32(v) => SqlValue::Real(v as f64),
        AnyValue::Float64(v) => SqlValue::Real(v),
        AnyValue::String(s) => SqlValue::Text(s.to_string()),
        AnyValue::StringOwned(s) => SqlValue::Text(s.to_string()),
        other if other.dtype().is_integer() => match other.extract::<i64>() {
            Some(v) => SqlValue::Integer(v),
            None => SqlValue::Text(other.to_string()),
        },
        other => SqlValue::Text(other.to_string()),
    }
}

/// CSV rendering: nulls empty, floats in shortest form with `.0` kept on
/// integral values.
fn cell_text(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Float32(v) => format_real(*v as f64),
        AnyValue::Float64(v) => format_real(*v),
        other => other.to_string(),
    }
}

fn format_real(v: f64) -> String {
    let s = v.to_string();
    if v.is_finite() && !s.contains('.') {
        format!("{}.0", s)
    } else {
        s
    }
}

/// Plain identifiers only (`[A-Za-z_][A-Za-z0-9_]*`).
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
