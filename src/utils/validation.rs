// Validation utilities
// Author: Gabriel Demetrios Lafis

use crate::data::{Row, Value};

/// Validate that every record carries the same field names as the first
/// one. The engine tolerates heterogeneous rows, but most callers expect
/// a common shape; this is the check to run at the input boundary.
pub fn validate_homogeneous(rows: &[Row]) -> Result<(), String> {
    let first = match rows.first() {
        Some(first) => first,
        None => return Ok(()),
    };

    for (i, row) in rows.iter().enumerate().skip(1) {
        if row.len() != first.len() {
            return Err(format!(
                "Row {} has {} fields, expected {}",
                i,
                row.len(),
                first.len()
            ));
        }

        for name in first.names() {
            if !row.contains(name) {
                return Err(format!("Row {} is missing field '{}'", i, name));
            }
        }
    }

    Ok(())
}

/// Validate that every record carries the named fields.
pub fn validate_required_fields(rows: &[Row], required: &[&str]) -> Result<(), String> {
    for (i, row) in rows.iter().enumerate() {
        for name in required {
            if !row.contains(name) {
                return Err(format!("Row {} is missing field '{}'", i, name));
            }
        }
    }

    Ok(())
}

/// Validate that a value is not missing
pub fn validate_not_missing(value: &Value, name: &str) -> Result<(), String> {
    if value.is_missing() {
        Err(format!("'{}' cannot be missing", name))
    } else {
        Ok(())
    }
}

/// Validate that a numeric value is in range
pub fn validate_range<T: PartialOrd + std::fmt::Display>(
    value: T,
    min: T,
    max: T,
    name: &str,
) -> Result<(), String> {
    if value < min || value > max {
        Err(format!(
            "'{}' must be between {} and {}",
            name, min, max
        ))
    } else {
        Ok(())
    }
}
