// Rust Tabular Model Engine
// Author: Gabriel Demetrios Lafis

//! # Rust Tabular Model Engine
//!
//! An in-memory tabular model and analytics engine written in Rust.
//!
//! ## Features
//!
//! - Record loading from JSON arrays and CSV text
//! - Lazily evaluated calculated fields that can reference each other
//! - Measures (aggregation formulas) evaluated over groups of rows
//! - Map / filter / sort / select / remove / cast / head transformations
//! - Grouping with optional column pivoting
//! - Cube evaluation mixing dimensions and measures under slicer context
//! - Composable, per-subscriber filter predicates (slicers)
//! - Inner / left / right / outer joins with a caller-supplied combinator
//! - Univariate statistics (sum, mean, percentile, mode, variance,
//!   standard deviation, correlation)
//!
//! ## Example
//!
//! ```rust
//! use rust_tabular_model_engine::{Row, Table, Value};
//!
//! // Wrap raw records into a table
//! let people = Table::create(vec![
//!     Row::from(vec![("name", Value::from("Tony")), ("sex", Value::from("m")), ("age", Value::from(25))]),
//!     Row::from(vec![("name", Value::from("Sarah")), ("sex", Value::from("f")), ("age", Value::from(42))]),
//!     Row::from(vec![("name", Value::from("Michael")), ("sex", Value::from("m")), ("age", Value::from(51))]),
//! ]);
//!
//! // Declare a calculated field and a measure on the model
//! let model = people
//!     .calculate("age_band", |row, _, _| {
//!         match row.get("age").unwrap().as_f64() {
//!             Some(age) => Value::Integer(((age / 10.0).floor() * 10.0) as i64),
//!             None => Value::Null,
//!         }
//!     })
//!     .measure("count", |group, _, _| Value::Integer(group.count() as i64));
//!
//! // Cube: one row per sex, with the measure evaluated per group
//! let by_sex = model.cube(&["sex", "count"]).unwrap();
//! assert_eq!(by_sex.count(), 2);
//! ```

pub mod data;
pub mod model;
pub mod utils;

// Re-export main types
pub use data::{DataError, Row, Value};
pub use model::{FieldCategory, JoinType, ModelError, RowView, Series, Table};
pub use utils::{AppError, AppResult, Config};
