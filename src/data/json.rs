// JSON record loading
// Author: Gabriel Demetrios Lafis

use std::io::Read;

use serde_json::Value as JsonValue;

use super::{DataError, Row, Value};

/// Convert a JSON value to a cell value. Arrays and nested objects are
/// not part of the scalar row model and are rejected by the callers.
fn json_to_value(json: &JsonValue) -> Result<Value, DataError> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(DataError::Parse(format!("Unrepresentable number: {}", n)))
            }
        },
        JsonValue::String(s) => Ok(Value::String(s.clone())),
        JsonValue::Array(_) | JsonValue::Object(_) => Err(DataError::Parse(
            "Nested arrays/objects are not supported as cell values".to_string(),
        )),
    }
}

fn json_array_to_rows(json: JsonValue) -> Result<Vec<Row>, DataError> {
    let array = match json {
        JsonValue::Array(array) => array,
        _ => {
            return Err(DataError::Parse(
                "JSON root is not an array of records".to_string(),
            ));
        },
    };

    let mut rows = Vec::with_capacity(array.len());

    for item in &array {
        let obj = item.as_object().ok_or_else(|| {
            DataError::Parse("Array element is not an object".to_string())
        })?;

        let mut row = Row::with_capacity(obj.len());
        for (name, value) in obj {
            row.set(name.clone(), json_to_value(value)?);
        }
        rows.push(row);
    }

    log::debug!("{} rows read from JSON", rows.len());
    Ok(rows)
}

/// Parse a JSON array of objects into rows.
///
/// The root must be an array and every element an object with scalar
/// values; anything else fails the whole construction.
pub fn rows_from_json_str(text: &str) -> Result<Vec<Row>, DataError> {
    let json: JsonValue =
        serde_json::from_str(text).map_err(|e| DataError::Parse(e.to_string()))?;
    json_array_to_rows(json)
}

/// Parse a JSON array of objects from a reader into rows. This is the
/// landing point for remote fetches: the transport hands over a body
/// reader and a failed or malformed body surfaces as a `DataError`.
pub fn rows_from_json_reader<R: Read>(reader: R) -> Result<Vec<Row>, DataError> {
    let json: JsonValue =
        serde_json::from_reader(reader).map_err(|e| DataError::Parse(e.to_string()))?;
    json_array_to_rows(json)
}
