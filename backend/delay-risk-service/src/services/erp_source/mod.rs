// ============================================
// ERP open-orders source
// ============================================
// Reads open orders exported from the ERP as CSV (header row + one order per
// line). Identifier, categorical and date columns of the record contract stay
// text as exported; every other cell has its type inferred and the contract
// decides later whether it is acceptable.

use crate::error::{Result, ScoringError};
use crate::models::{FieldValue, OrderRecord};
use crate::services::contract::{FieldKind, RecordContract};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub fn load_open_orders<P: AsRef<Path>>(
    path: P,
    contract: &RecordContract,
) -> Result<Vec<OrderRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        ScoringError::DataSource(format!("failed to open {}: {}", path.display(), e))
    })?;

    let records = read_open_orders(file, contract)?;
    info!(path = %path.display(), orders = records.len(), "Loaded open orders");
    Ok(records)
}

pub fn read_open_orders<R: Read>(
    reader: R,
    contract: &RecordContract,
) -> Result<Vec<OrderRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let textual: Vec<bool> = headers
        .iter()
        .map(|field| {
            matches!(
                contract.kind_of(field),
                Some(FieldKind::Identifier | FieldKind::Categorical | FieldKind::Date)
            )
        })
        .collect();

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let record = headers
            .iter()
            .zip(row.iter())
            .zip(&textual)
            .map(|((field, cell), &textual)| {
                let value = if textual {
                    text_cell(cell)
                } else {
                    parse_cell(cell)
                };
                (field.to_string(), value)
            })
            .collect::<OrderRecord>();
        records.push(record);
    }

    Ok(records)
}

fn text_cell(raw: &str) -> FieldValue {
    match raw.trim() {
        "" => FieldValue::Null,
        cell => FieldValue::Text(cell.to_string()),
    }
}

fn parse_cell(raw: &str) -> FieldValue {
    let cell = raw.trim();

    if cell.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(integer) = cell.parse::<i64>() {
        return FieldValue::Integer(integer);
    }
    if cell.eq_ignore_ascii_case("true") {
        return FieldValue::Bool(true);
    }
    if cell.eq_ignore_ascii_case("false") {
        return FieldValue::Bool(false);
    }
    if let Ok(float) = cell.parse::<f64>() {
        return FieldValue::Float(float);
    }

    FieldValue::Text(cell.to_string())
}
