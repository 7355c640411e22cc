use crate::app::ports::PageSource;
use crate::config::EtlConfig;
use crate::constants::*;
use crate::error::Result;
use crate::extract::extract;
use crate::load::{save_csv, save_db};
use crate::progress_log::ProgressLog;
use crate::query::run_query;
use crate::transform::transform;
use rusqlite::Connection;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Result of a complete pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rows: usize,
    pub output_csv: PathBuf,
    pub db_path: PathBuf,
    pub table_name: String,
    pub avg_gbp_billion: Option<f64>,
}

/// The three read queries run after loading, in order.
pub fn fixed_queries(table_name: &str) -> [String; 3] {
    [
        format!("SELECT * from {}", table_name),
        format!("SELECT AVG(MC_GBP_Billion) FROM {}", table_name),
        format!("SELECT Name from {} LIMIT 5", table_name),
    ]
}

/// Runs extract, transform, CSV load, database load and the fixed queries,
/// in that order, stopping at the first error.
///
/// Tables and query results are written to `out`; stage completions go to
/// the progress log at `config.log_path`.
#[instrument(skip_all, fields(url = %config.url))]
pub fn run(config: &EtlConfig, source: &dyn PageSource, out: &mut dyn Write) -> Result<RunSummary> {
    let progress = ProgressLog::new(&config.log_path);
    progress.log(MSG_START)?;

    let extracted = extract(source, &config.url, &config.table_attribs)?;
    writeln!(out, "{}", extracted)?;
    progress.log(MSG_EXTRACTED)?;

    let transformed = transform(&extracted, &config.exchange_rate_path)?;
    writeln!(out, "{}", transformed)?;
    progress.log(MSG_TRANSFORMED)?;

    save_csv(&transformed, &config.output_csv_path)?;
    progress.log(MSG_CSV_SAVED)?;

    let conn = Connection::open(&config.db_path)?;
    progress.log(MSG_DB_CONNECTED)?;

    save_db(&transformed, &conn, &config.table_name)?;
    progress.log(MSG_DB_LOADED)?;

    let [select_all, average, top_names] = fixed_queries(&config.table_name);
    run_query(&select_all, &conn, out)?;
    let avg_gbp_billion = run_query(&average, &conn, out)?
        .get_columns()
        .first()
        .and_then(|c| c.as_materialized_series().get(0).ok())
        .and_then(|v| v.extract::<f64>());
    run_query(&top_names, &conn, out)?;

    progress.log(MSG_DONE)?;
    conn.close().map_err(|(_, e)| e)?;

    let summary = RunSummary {
        rows: transformed.height(),
        output_csv: config.output_csv_path.clone(),
        db_path: config.db_path.clone(),
        table_name: config.table_name.clone(),
        avg_gbp_billion,
    };
    info!(
        rows = summary.rows,
        csv = %summary.output_csv.display(),
        db = %summary.db_path.display(),
        "ETL run finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_queries() {
        let queries = fixed_queries("Largest_banks");
        assert_eq!(queries[0], "SELECT * from Largest_banks");
        assert_eq!(queries[1], "SELECT AVG(MC_GBP_Billion) FROM Largest_banks");
        assert_eq!(queries[2], "SELECT Name from Largest_banks LIMIT 5");
    }
}
