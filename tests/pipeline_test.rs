use largest_banks_etl::app::ports::PageSource;
use largest_banks_etl::config::EtlConfig;
use largest_banks_etl::error::{EtlError, Result};
use largest_banks_etl::pipeline;
use rusqlite::Connection;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const PAGE: &str = r#"
<html><body>
<h2>By market capitalization</h2>
<table class="wikitable">
<tbody>
<tr><th>Rank</th><th>Bank name</th><th>Market cap<br/>(US$ billion)</th></tr>
<tr><td>1</td><td><a href="/wiki/JPMorgan_Chase">JPMorgan Chase</a></td><td>432.92
</td></tr>
<tr><td>2</td><td><a href="/wiki/Bank_of_America">Bank of America</a></td><td>231.52
</td></tr>
<tr><td>3</td><td>Industrial and Commercial Bank of China</td><td>194.56
</td></tr>
<tr><td>4</td><td>Agricultural Bank of China</td><td>160.68
</td></tr>
<tr><td>5</td><td>HDFC Bank</td><td>157.91
</td></tr>
<tr><td>6</td><td>Wells Fargo</td><td>155.87
</td></tr>
</tbody>
</table>
<table><tbody><tr><td>1</td><td>Other table</td><td>1.0</td></tr></tbody></table>
</body></html>
"#;

const RATES: &str = "Currency,Rate\nEUR,0.93\nGBP,0.8\nINR,82.95\n";

struct StaticPage(String);

impl PageSource for StaticPage {
    fn fetch(&self, _url: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

struct Unreachable;

impl PageSource for Unreachable {
    fn fetch(&self, url: &str) -> Result<String> {
        Err(EtlError::HttpStatus {
            url: url.to_string(),
            status: 503,
        })
    }
}

fn setup(rates: &str) -> (TempDir, EtlConfig) {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("exchange_rate.csv"), rates).unwrap();
    let config = EtlConfig {
        url: "http://banks.test/list".to_string(),
        db_path: dir.path().join("Banks.db"),
        exchange_rate_path: dir.path().join("exchange_rate.csv"),
        output_csv_path: dir.path().join("Largest_banks_data.csv"),
        log_path: dir.path().join("code_log.txt"),
        ..EtlConfig::default()
    };
    (dir, config)
}

fn log_messages(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.split_once(" : ").unwrap().1.to_string())
        .collect()
}

#[test]
fn test_full_run_produces_all_artifacts() {
    let (_dir, config) = setup(RATES);
    let mut out = Vec::new();

    let summary = pipeline::run(&config, &StaticPage(PAGE.to_string()), &mut out).unwrap();
    assert_eq!(summary.rows, 6);

    let csv = fs::read_to_string(&config.output_csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], ",Name,MC_USD_Billion,MC_GBP_Billion,MC_EUR_Billion,MC_INR_Billion");
    assert_eq!(lines[1], "0,JPMorgan Chase,432.92,346.34,402.62,35910.71");

    let conn = Connection::open(&config.db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM Largest_banks", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 6);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("SELECT * from Largest_banks\n"));
    assert!(printed.contains("SELECT AVG(MC_GBP_Billion) FROM Largest_banks\n"));
    assert!(printed.contains("SELECT Name from Largest_banks LIMIT 5\n"));
    // LIMIT 5 leaves the sixth bank out of the last dump
    let last_dump = printed.rsplit("LIMIT 5\n").next().unwrap();
    assert!(last_dump.contains("HDFC Bank"));
    assert!(!last_dump.contains("Wells Fargo"));

    let expected_avg = [346.34, 185.22, 155.65, 128.54, 126.33, 124.7].iter().sum::<f64>() / 6.0;
    assert!((summary.avg_gbp_billion.unwrap() - expected_avg).abs() < 1e-6);

    assert_eq!(
        log_messages(&config.log_path),
        vec![
            "Preliminaries complete. Initiating ETL process",
            "Data extraction complete. Initiating Transformation process",
            "Data transformation complete. Initiating Loading process",
            "Data saved to CSV file",
            "SQL Connection initiated.",
            "Data loaded to Database as a table, Executing queries",
            "Process Complete",
        ]
    );
}

#[test]
fn test_rerun_is_byte_identical_and_replaces_table() {
    let (_dir, config) = setup(RATES);

    pipeline::run(&config, &StaticPage(PAGE.to_string()), &mut Vec::new()).unwrap();
    let first_csv = fs::read(&config.output_csv_path).unwrap();

    pipeline::run(&config, &StaticPage(PAGE.to_string()), &mut Vec::new()).unwrap();
    let second_csv = fs::read(&config.output_csv_path).unwrap();

    assert_eq!(first_csv, second_csv);

    let conn = Connection::open(&config.db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM Largest_banks", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 6);
    assert_eq!(log_messages(&config.log_path).len(), 14);
}

#[test]
fn test_missing_currency_writes_no_output() {
    let (_dir, config) = setup("Currency,Rate\nGBP,0.8\nINR,82.95\n");

    let err = pipeline::run(&config, &StaticPage(PAGE.to_string()), &mut Vec::new()).unwrap_err();

    assert!(matches!(err, EtlError::MissingCurrency(ref code) if code == "EUR"));
    assert!(!config.output_csv_path.exists());
    assert!(!config.db_path.exists());
    assert_eq!(
        log_messages(&config.log_path),
        vec![
            "Preliminaries complete. Initiating ETL process",
            "Data extraction complete. Initiating Transformation process",
        ]
    );
}

#[test]
fn test_unreachable_page_only_logs_start() {
    let (_dir, config) = setup(RATES);

    let err = pipeline::run(&config, &Unreachable, &mut Vec::new()).unwrap_err();

    assert!(matches!(err, EtlError::HttpStatus { status: 503, .. }));
    assert!(!config.output_csv_path.exists());
    assert!(!config.db_path.exists());
    assert_eq!(
        log_messages(&config.log_path),
        vec!["Preliminaries complete. Initiating ETL process"]
    );
}

#[test]
fn test_malformed_market_cap_aborts_before_loading() {
    let (_dir, config) = setup(RATES);
    let page = PAGE.replace("231.52", "231.52[5]");

    let err = pipeline::run(&config, &StaticPage(page), &mut Vec::new()).unwrap_err();

    match err {
        EtlError::InvalidNumber { row, value } => {
            assert_eq!(row, 1);
            assert_eq!(value, "231.52[5]");
        }
        other => panic!("expected invalid number, got {:?}", other),
    }
    assert!(!config.output_csv_path.exists());
}
