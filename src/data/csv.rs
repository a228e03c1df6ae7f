// CSV record loading
// Author: Gabriel Demetrios Lafis

use std::io::Read;

use super::{DataError, Row, Value};

/// Parse CSV text into rows. Cells load as strings (`cast` turns them
/// numeric later); empty cells load as Null. With `has_header` off,
/// columns are named `column_0`, `column_1`, ...
pub fn rows_from_csv_str(
    text: &str,
    has_header: bool,
    delimiter: char,
) -> Result<Vec<Row>, DataError> {
    rows_from_csv_reader(text.as_bytes(), has_header, delimiter)
}

/// Parse CSV from a reader into rows.
pub fn rows_from_csv_reader<R: Read>(
    reader: R,
    has_header: bool,
    delimiter: char,
) -> Result<Vec<Row>, DataError> {
    let mut csv_reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(has_header)
        .flexible(false)
        .from_reader(reader);

    let mut headers: Vec<String> = if has_header {
        csv_reader
            .headers()
            .map_err(|e| DataError::Parse(e.to_string()))?
            .iter()
            .map(|s| s.to_string())
            .collect()
    } else {
        Vec::new()
    };

    let mut rows = Vec::new();

    for result in csv_reader.records() {
        let record = result.map_err(|e| DataError::Parse(e.to_string()))?;

        // Generate column names from the first record if no header
        if headers.is_empty() {
            headers = (0..record.len()).map(|i| format!("column_{}", i)).collect();
        }

        let mut row = Row::with_capacity(headers.len());
        for (name, cell) in headers.iter().zip(record.iter()) {
            let value = if cell.is_empty() {
                Value::Null
            } else {
                Value::String(cell.to_string())
            };
            row.set(name.clone(), value);
        }
        rows.push(row);
    }

    log::debug!("{} rows read from CSV", rows.len());
    Ok(rows)
}
