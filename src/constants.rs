/// Defaults for a run with no configuration file.
pub const DEFAULT_URL: &str =
    "https://web.archive.org/web/20230908091635/https://en.wikipedia.org/wiki/List_of_largest_banks";
pub const DEFAULT_DB_PATH: &str = "Banks.db";
pub const DEFAULT_TABLE_NAME: &str = "Largest_banks";
pub const DEFAULT_EXCHANGE_RATE_PATH: &str = "./exchange_rate.csv";
pub const DEFAULT_OUTPUT_CSV_PATH: &str = "./Largest_banks_data.csv";
pub const DEFAULT_LOG_PATH: &str = "./code_log.txt";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

// Column names of the persisted table
pub const NAME_COLUMN: &str = "Name";
pub const USD_COLUMN: &str = "MC_USD_Billion";

/// Currencies derived from the USD market cap, in output column order.
pub const TARGET_CURRENCIES: [&str; 3] = ["GBP", "EUR", "INR"];

/// Column holding the market cap converted to `code`.
pub fn currency_column(code: &str) -> String {
    format!("MC_{}_Billion", code)
}

pub fn default_table_attribs() -> Vec<String> {
    vec![NAME_COLUMN.to_string(), USD_COLUMN.to_string()]
}

// Progress log messages, one per pipeline stage
pub const MSG_START: &str = "Preliminaries complete. Initiating ETL process";
pub const MSG_EXTRACTED: &str = "Data extraction complete. Initiating Transformation process";
pub const MSG_TRANSFORMED: &str = "Data transformation complete. Initiating Loading process";
pub const MSG_CSV_SAVED: &str = "Data saved to CSV file";
pub const MSG_DB_CONNECTED: &str = "SQL Connection initiated.";
pub const MSG_DB_LOADED: &str = "Data loaded to Database as a table, Executing queries";
pub const MSG_DONE: &str = "Process Complete";
