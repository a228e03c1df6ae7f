// Model module for the tabular engine
// Author: Gabriel Demetrios Lafis

mod cube;
mod group;
mod join;
mod series;
mod table;

pub use join::*;
pub use series::*;
pub use table::*;

use std::rc::Rc;

use thiserror::Error;

use crate::data::Value;

/// The category a field name resolves to on a table. Resolution checks
/// physical columns first, then calculations, then measures, so a
/// calculation or measure cannot shadow a physical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCategory {
    /// A physical field stored on the rows.
    Column,
    /// A calculated field, evaluated lazily per row.
    Calculation,
    /// An aggregation formula, evaluated over a group of rows.
    Measure,
}

/// A calculated field: evaluated lazily when a row view reads the field.
/// Receives the view of the row (through which other calculations can be
/// read), the row index, and the owning table.
pub type CalcFn = Rc<dyn Fn(RowView<'_>, usize, &Table) -> Value>;

/// An aggregation formula: evaluated over a group sub-table. Receives
/// the group, the group's discovery index, and the parent table.
pub type MeasureFn = Rc<dyn Fn(&Table, usize, &Table) -> Value>;

/// A named, removable filter predicate contributed by one subscriber.
/// All registered slicers AND together in `Table::sliced_data`.
pub type SlicerFn = Rc<dyn Fn(RowView<'_>) -> bool>;

/// Errors raised by the tabular engine.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The requested name is not a physical column, calculation or
    /// measure on the table.
    #[error("field '{0}' not found in model")]
    FieldNotFound(String),
    /// A measure name was used where a row-level field is required.
    #[error("field '{0}' is a measure and has no row-level value")]
    MeasureAtRowLevel(String),
    /// Unknown conversion name passed to `cast`.
    #[error("unknown cast type '{0}' (expected 'int' or 'float')")]
    UnknownCast(String),
    /// `corr` requires both series to have the same length.
    #[error("cannot compute correlation: series lengths differ ({left} vs {right})")]
    SeriesLengthMismatch { left: usize, right: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
