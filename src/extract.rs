use crate::app::ports::PageSource;
use crate::error::{EtlError, Result};
use polars::prelude::{Column, DataFrame};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};

// Page layout: data rows live in the first <tbody>; the bank name and its
// market cap are the 2nd and 3rd <td> of each row.
const TABLE_BODY_SELECTOR: &str = "tbody";
const ROW_SELECTOR: &str = "tr";
const CELL_SELECTOR: &str = "td";
const NAME_CELL: usize = 1;
const MARKET_CAP_CELL: usize = 2;

/// Fetches `url` and parses the bank table out of it.
#[instrument(skip(source, expected_columns))]
pub fn extract(source: &dyn PageSource, url: &str, expected_columns: &[String]) -> Result<DataFrame> {
    let body = source.fetch(url)?;
    info!(bytes = body.len(), "Fetched source page");
    let table = parse_bank_table(&body, expected_columns)?;
    info!(rows = table.height(), "Extracted bank table");
    Ok(table)
}

/// Parses the first table body of `html` into a `(name, market cap)` frame
/// whose columns are `expected_columns`.
///
/// Rows without `<td>` cells (header rows) are skipped. Cell text is
/// whitespace-trimmed and kept as text; numeric conversion happens later.
pub fn parse_bank_table(html: &str, expected_columns: &[String]) -> Result<DataFrame> {
    if expected_columns.len() != 2 {
        return Err(EtlError::Schema(format!(
            "expected 2 column names (name, market cap), got {}",
            expected_columns.len()
        )));
    }

    let document = Html::parse_document(html);
    let tbody_selector = selector(TABLE_BODY_SELECTOR)?;
    let row_selector = selector(ROW_SELECTOR)?;
    let cell_selector = selector(CELL_SELECTOR)?;

    let tbody = document
        .select(&tbody_selector)
        .next()
        .ok_or_else(|| EtlError::Layout("page contains no table body".to_string()))?;

    let mut names = Vec::new();
    let mut market_caps = Vec::new();
    for (row_idx, row) in tbody.select(&row_selector).enumerate() {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();
        if cells.is_empty() {
            debug!(row = row_idx, "Skipping row without data cells");
            continue;
        }
        if cells.len() <= MARKET_CAP_CELL {
            return Err(EtlError::Layout(format!(
                "table row {} has {} cells, expected at least {}",
                row_idx,
                cells.len(),
                MARKET_CAP_CELL + 1
            )));
        }
        names.push(cell_text(&cells[NAME_CELL]));
        market_caps.push(cell_text(&cells[MARKET_CAP_CELL]));
    }

    let table = DataFrame::new(vec![
        Column::new(expected_columns[0].as_str().into(), names),
        Column::new(expected_columns[1].as_str().into(), market_caps),
    ])?;
    Ok(table)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| EtlError::Layout(format!("invalid selector '{}': {:?}", css, e)))
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}
