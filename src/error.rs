use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP request to {url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Unexpected page layout: {0}")]
    Layout(String),

    #[error("Table schema error: {0}")]
    Schema(String),

    #[error("DataFrame error: {0}")]
    Frame(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Exchange rate for currency '{0}' not found")]
    MissingCurrency(String),

    #[error("Exchange rate for currency '{code}' must be a positive number, got {rate}")]
    InvalidRate { code: String, rate: f64 },

    #[error("Row {row}: '{value}' is not a valid number")]
    InvalidNumber { row: usize, value: String },

    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EtlError>;
