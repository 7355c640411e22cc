use crate::error::Result;
use polars::prelude::{AnyValue, DataFrame, IntoColumn, PlSmallStr, Series};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::io::Write;
use tracing::{debug, instrument};

/// Runs `sql` and writes the statement followed by its result set to `out`.
#[instrument(skip(conn, out))]
pub fn run_query(sql: &str, conn: &Connection, out: &mut dyn Write) -> Result<DataFrame> {
    writeln!(out, "{}", sql)?;

    let mut stmt = conn.prepare(sql)?;
    let names: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

    let mut cells: Vec<Vec<AnyValue<'static>>> = vec![Vec::new(); names.len()];
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        for (idx, column) in cells.iter_mut().enumerate() {
            column.push(from_sql_value(row.get_ref(idx)?));
        }
    }

    let columns = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Ok(Series::from_any_values(name.into(), &values, false)?.into_column()))
        .collect::<Result<Vec<_>>>()?;
    let result = DataFrame::new(columns)?;

    debug!(rows = result.height(), "Query returned");
    writeln!(out, "{}", result)?;
    Ok(result)
}

fn from_sql_value(value: ValueRef<'_>) -> AnyValue<'static> {
    match value {
        ValueRef::Null => AnyValue::Null,
        ValueRef::Integer(v) => AnyValue::Int64(v),
        ValueRef::Real(v) => AnyValue::Float64(v),
        ValueRef::Text(bytes) => AnyValue::StringOwned(PlSmallStr::from(String::from_utf8_lossy(bytes).as_ref())),
        ValueRef::Blob(bytes) => AnyValue::StringOwned(PlSmallStr::from(format!("<{} bytes>", bytes.len()))),
    }
}
