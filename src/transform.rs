use crate::constants::{currency_column, TARGET_CURRENCIES, USD_COLUMN};
use crate::error::{EtlError, Result};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct RateRecord {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Units of each currency per US dollar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRates {
    rates: HashMap<String, f64>,
}

impl ExchangeRates {
    /// Reads a `Currency,Rate` CSV file.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut rates = HashMap::new();
        for record in csv_reader.deserialize() {
            let record: RateRecord = record?;
            if !record.rate.is_finite() || record.rate <= 0.0 {
                return Err(EtlError::InvalidRate {
                    code: record.currency,
                    rate: record.rate,
                });
            }
            // Later rows win over earlier ones for the same code
            rates.insert(record.currency, record.rate);
        }
        Ok(Self { rates })
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    fn require(&self, code: &str) -> Result<f64> {
        self.get(code)
            .ok_or_else(|| EtlError::MissingCurrency(code.to_string()))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl FromIterator<(String, f64)> for ExchangeRates {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

/// Loads the rates at `rate_source_path` and converts `table` with them.
#[instrument(skip(table), fields(rows = table.height()))]
pub fn transform(table: &DataFrame, rate_source_path: &Path) -> Result<DataFrame> {
    let rates = ExchangeRates::from_csv_path(rate_source_path)?;
    info!(currencies = rates.len(), "Loaded exchange rates");
    convert(table, &rates)
}

/// Parses the USD market cap as a number and appends one rounded column per
/// target currency (GBP, EUR, INR).
///
/// Fails on the first missing currency or unparseable market cap, so nothing
/// downstream ever sees a partially converted table.
pub fn convert(table: &DataFrame, rates: &ExchangeRates) -> Result<DataFrame> {
    let targets = TARGET_CURRENCIES
        .iter()
        .map(|code| rates.require(code).map(|rate| (*code, rate)))
        .collect::<Result<Vec<(&str, f64)>>>()?;

    let usd = market_caps(table)?;

    let mut converted = table.clone();
    converted.with_column(usd.clone().into_series())?;

    for (code, rate) in targets {
        debug!(currency = code, rate, "Deriving converted column");
        let derived = (&usd * rate)
            .apply_values(round2)
            .with_name(currency_column(code).into());
        converted.with_column(derived.into_series())?;
    }

    Ok(converted)
}

/// Rounds to two decimals, ties to even.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round_ties_even() / 100.0
}

/// The USD market cap column as floats. Text cells must parse completely.
fn market_caps(table: &DataFrame) -> Result<Float64Chunked> {
    let column = table
        .column(USD_COLUMN)
        .map_err(|_| EtlError::Schema(format!("column '{}' not found", USD_COLUMN)))?;

    let values = match column.dtype() {
        DataType::String => column
            .str()?
            .iter()
            .enumerate()
            .map(|(row, cell)| parse_market_cap(row, cell))
            .collect::<Result<Vec<f64>>>()?,
        _ => column
            .cast(&DataType::Float64)?
            .f64()?
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                cell.ok_or_else(|| EtlError::InvalidNumber {
                    row,
                    value: String::new(),
                })
            })
            .collect::<Result<Vec<f64>>>()?,
    };

    Ok(Float64Chunked::from_vec(USD_COLUMN.into(), values))
}

fn parse_market_cap(row: usize, cell: Option<&str>) -> Result<f64> {
    cell.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .ok_or_else(|| EtlError::InvalidNumber {
            row,
            value: cell.unwrap_or_default().to_string(),
        })
}
