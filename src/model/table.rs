// Table: the tabular model at the heart of the engine
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::rc::Rc;

use rand::{Rng, SeedableRng};

use crate::data::{self, DataError, Row, Value};
use super::{CalcFn, FieldCategory, MeasureFn, ModelError, Series, SlicerFn};

/// The tabular model: owned row storage plus the calculation, measure
/// and slicer definitions that turn raw records into a queryable model.
///
/// Every table-returning operation builds a new `Table`; the only
/// in-place mutation is slicer registration, so that several consumers
/// sharing one table observe each other's filters. Row indices are
/// stable only until the next operation that re-derives the rows.
///
/// Calculations and measures survive the row-preserving operations
/// (`map`, `filter`, `sort`, `head`, `select`, `remove`, `cast`,
/// `sample`, `sliced_data`, `clone`). Shape-changing operations
/// (`group`, `cube`, `join`, `describe`) return plain tables.
#[derive(Clone, Default)]
pub struct Table {
    rows: Vec<Row>,
    calculations: Vec<(String, CalcFn)>,
    measures: Vec<(String, MeasureFn)>,
    slicers: HashMap<String, SlicerFn>,
}

/// A lightweight view of one row in a table. Reading a field through the
/// view resolves it against the full model: the row's own fields first,
/// then calculations (recursively, so a calculation can read another
/// calculation's result on the same row).
#[derive(Clone, Copy)]
pub struct RowView<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> RowView<'a> {
    /// The 0-based index of this row in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The owning table.
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// The underlying stored row (physical fields only).
    pub fn row(&self) -> &'a Row {
        &self.table.rows[self.index]
    }

    /// Resolve a field by name. Precedence: the row's own field, then a
    /// calculation (invoked with this view, so chained calculations
    /// work), then an error: a measure has no row-level value, and an
    /// unknown name fails fast rather than resolving to Null.
    ///
    /// Cyclic calculation references are a caller error and are not
    /// detected.
    pub fn get(&self, name: &str) -> Result<Value, ModelError> {
        self.table.resolve(self.index, name)
    }

    /// A physical copy of the row, calculated fields not included.
    pub fn to_row(&self) -> Row {
        self.row().clone()
    }
}

impl Table {
    /// Wrap an array of records into a table with empty calculation,
    /// measure and slicer maps.
    pub fn create(rows: Vec<Row>) -> Self {
        Table {
            rows,
            calculations: Vec::new(),
            measures: Vec::new(),
            slicers: HashMap::new(),
        }
    }

    /// Build a table from a JSON array of records. Malformed input fails
    /// the whole construction.
    pub fn from_json_str(text: &str) -> Result<Self, DataError> {
        Ok(Table::create(data::rows_from_json_str(text)?))
    }

    /// Build a table from a reader yielding a JSON array of records.
    /// This is where a remote fetch lands: the body either parses into a
    /// complete table or the construction fails.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        Ok(Table::create(data::rows_from_json_reader(reader)?))
    }

    /// Build a table from CSV text. Cells load as strings; use `cast`
    /// to convert numeric columns.
    pub fn from_csv_str(
        text: &str,
        has_header: bool,
        delimiter: char,
    ) -> Result<Self, DataError> {
        Ok(Table::create(data::rows_from_csv_str(
            text, has_header, delimiter,
        )?))
    }

    /// Number of rows.
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The stored rows, physical fields only.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// A single stored row by index.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// A resolving view of a single row.
    pub fn view(&self, index: usize) -> Option<RowView<'_>> {
        if index < self.rows.len() {
            Some(RowView { table: self, index })
        } else {
            None
        }
    }

    /// Iterate the table as resolving row views.
    pub fn iter(&self) -> impl Iterator<Item = RowView<'_>> {
        (0..self.rows.len()).map(move |index| RowView { table: self, index })
    }

    /// A new table sharing this table's calculation and measure
    /// definitions, with fresh rows and no slicers.
    pub(crate) fn derive(&self, rows: Vec<Row>) -> Table {
        Table {
            rows,
            calculations: self.calculations.clone(),
            measures: self.measures.clone(),
            slicers: HashMap::new(),
        }
    }

    // ------------------------------------------------------------------
    // Model definition
    // ------------------------------------------------------------------

    /// Register a calculated field on the model. The function is
    /// evaluated lazily each time the field is read on a row view, and
    /// may read other fields (including other calculations) through the
    /// view. Re-registering a name replaces the previous definition.
    pub fn calculate<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(RowView<'_>, usize, &Table) -> Value + 'static,
    {
        let f: CalcFn = Rc::new(f);
        match self.calculations.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = f,
            None => self.calculations.push((name.to_string(), f)),
        }
        self
    }

    /// Register a measure on the model. The function is evaluated over a
    /// group sub-table during `cube`, receiving the group, the group's
    /// discovery index, and the parent table.
    pub fn measure<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&Table, usize, &Table) -> Value + 'static,
    {
        let f: MeasureFn = Rc::new(f);
        match self.measures.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = f,
            None => self.measures.push((name.to_string(), f)),
        }
        self
    }

    /// Look up a calculation definition by name.
    pub fn calculation(&self, name: &str) -> Option<&CalcFn> {
        self.calculations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Look up a measure definition by name.
    pub fn measure_fn(&self, name: &str) -> Option<&MeasureFn> {
        self.measures
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Registered calculation names, in registration order.
    pub fn calculation_names(&self) -> Vec<&str> {
        self.calculations.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Registered measure names, in registration order.
    pub fn measure_names(&self) -> Vec<&str> {
        self.measures.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Classify a field name. Checks, in order: own field of the first
    /// row, calculation key, measure key. An unknown name is an error,
    /// never a silent default.
    pub fn column_category(&self, name: &str) -> Result<FieldCategory, ModelError> {
        if let Some(first) = self.rows.first() {
            if first.contains(name) {
                return Ok(FieldCategory::Column);
            }
        }
        if self.calculation(name).is_some() {
            return Ok(FieldCategory::Calculation);
        }
        if self.measure_fn(name).is_some() {
            return Ok(FieldCategory::Measure);
        }
        Err(ModelError::FieldNotFound(name.to_string()))
    }

    /// Every field name in the model: physical columns (first-row
    /// order), then calculations, then measures. Duplicates are dropped,
    /// physical columns taking precedence.
    pub fn model(&self) -> Vec<String> {
        let mut names: Vec<String> = match self.rows.first() {
            Some(first) => first.names().map(|n| n.to_string()).collect(),
            None => Vec::new(),
        };
        for (n, _) in &self.calculations {
            if !names.iter().any(|existing| existing == n) {
                names.push(n.clone());
            }
        }
        for (n, _) in &self.measures {
            if !names.iter().any(|existing| existing == n) {
                names.push(n.clone());
            }
        }
        names
    }

    /// Row-level field resolver. Precedence: the row's own field, then a
    /// calculation (invoked recursively through a view of the row), then
    /// errors for measures and unknown names. A field that is physical
    /// on the model but absent from this particular row resolves to
    /// Null (rows may be heterogeneous).
    fn resolve(&self, index: usize, name: &str) -> Result<Value, ModelError> {
        if let Some(value) = self.rows[index].get(name) {
            return Ok(value.clone());
        }
        if let Some(f) = self.calculation(name) {
            let f = f.clone();
            let view = RowView { table: self, index };
            return Ok(f(view, index, self));
        }
        if self.measure_fn(name).is_some() {
            return Err(ModelError::MeasureAtRowLevel(name.to_string()));
        }
        if let Some(first) = self.rows.first() {
            if first.contains(name) {
                return Ok(Value::Null);
            }
        }
        Err(ModelError::FieldNotFound(name.to_string()))
    }

    // ------------------------------------------------------------------
    // Column extraction & statistics
    // ------------------------------------------------------------------

    /// Extract one column (physical or calculated) as a `Series` for
    /// univariate analysis. Listing a measure is an error: a measure has
    /// no row-level values. On an empty table every name lists as an
    /// empty series: there is no first row to classify against, and
    /// aggregates over empty groups (pivot subsets, sliced-out data)
    /// must keep working.
    pub fn list(&self, name: &str) -> Result<Series, ModelError> {
        if self.rows.is_empty() && self.column_category(name).is_err() {
            return Ok(Series::new(Vec::new()));
        }
        match self.column_category(name)? {
            FieldCategory::Measure => Err(ModelError::MeasureAtRowLevel(name.to_string())),
            _ => {
                let mut values = Vec::with_capacity(self.rows.len());
                for index in 0..self.rows.len() {
                    values.push(self.resolve(index, name)?);
                }
                Ok(Series::new(values))
            },
        }
    }

    /// Descriptive statistics for every physical column, as a new
    /// table: name, type, count, distinct, fill, mode, mean, min, q1,
    /// median, q3, max. The mode cell joins tied values with ", " and is
    /// Null when no meaningful mode exists.
    pub fn describe(&self) -> Table {
        let names: Vec<String> = match self.rows.first() {
            Some(first) => first.names().map(|n| n.to_string()).collect(),
            None => return Table::create(Vec::new()),
        };

        let mut results = Vec::with_capacity(names.len());
        for name in names {
            // Physical columns cannot fail to list
            let column = match self.list(&name) {
                Ok(column) => column,
                Err(_) => continue,
            };
            let values = column.values();

            let mode = match values.mode() {
                Some(modes) => Value::String(
                    modes
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                None => Value::Null,
            };

            let opt_f64 = |v: Option<f64>| v.map(Value::Float).unwrap_or(Value::Null);
            let opt_value = |v: Option<Value>| v.unwrap_or(Value::Null);

            let fill = if column.count() > 0 {
                Value::Float(values.count() as f64 / column.count() as f64)
            } else {
                Value::Null
            };

            let mut row = Row::with_capacity(12);
            row.set("name", Value::String(name));
            row.set("type", Value::String(column.type_name().to_string()));
            row.set("count", Value::Integer(column.count() as i64));
            row.set("distinct", Value::Integer(column.unique().count() as i64));
            row.set("fill", fill);
            row.set("mode", mode);
            row.set("mean", opt_f64(values.mean()));
            row.set("min", opt_value(values.min()));
            row.set("q1", opt_value(values.percentile(25.0)));
            row.set("median", opt_value(values.percentile(50.0)));
            row.set("q3", opt_value(values.percentile(75.0)));
            row.set("max", opt_value(values.max()));
            results.push(row);
        }

        Table::create(results)
    }

    // ------------------------------------------------------------------
    // Row transformations
    // ------------------------------------------------------------------

    /// Transform every row through a mapping function. The function
    /// receives a resolving view, so calculated fields can feed the
    /// mapped output.
    pub fn map<F>(&self, f: F) -> Table
    where
        F: Fn(RowView<'_>) -> Row,
    {
        let rows = self.iter().map(f).collect();
        self.derive(rows)
    }

    /// Keep the rows for which the predicate holds, preserving order.
    pub fn filter<F>(&self, f: F) -> Table
    where
        F: Fn(RowView<'_>) -> bool,
    {
        let rows = self
            .iter()
            .filter(|view| f(*view))
            .map(|view| view.to_row())
            .collect();
        self.derive(rows)
    }

    /// Sort by a per-row key. The sort is stable: rows with equal keys
    /// keep their input order, ascending or descending alike.
    pub fn sort<F>(&self, key_fn: F, descending: bool) -> Table
    where
        F: Fn(RowView<'_>) -> Value,
    {
        let keys: Vec<Value> = self.iter().map(key_fn).collect();
        let mut indices: Vec<usize> = (0..self.rows.len()).collect();
        indices.sort_by(|&a, &b| {
            let ord = keys[a].compare(&keys[b]);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        let rows = indices.into_iter().map(|i| self.rows[i].clone()).collect();
        self.derive(rows)
    }

    /// The first `n` rows. Asking for more rows than exist returns the
    /// whole table.
    pub fn head(&self, n: usize) -> Table {
        let rows = self.rows.iter().take(n).cloned().collect();
        self.derive(rows)
    }

    /// Keep only the named physical fields on every row. A named field
    /// missing from a row is materialized as Null.
    pub fn select(&self, names: &[&str]) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = Row::with_capacity(names.len());
                for name in names {
                    out.set(*name, row.get(name).cloned().unwrap_or(Value::Null));
                }
                out
            })
            .collect();
        self.derive(rows)
    }

    /// Delete the named fields from every row.
    pub fn remove(&self, names: &[&str]) -> Table {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = row.clone();
                for name in names {
                    out.remove(name);
                }
                out
            })
            .collect();
        self.derive(rows)
    }

    /// Convert named fields with named conversions: "int" parses to an
    /// integer (floats and float-strings truncate), "float" parses to a
    /// float. An unrecognized conversion name is a configuration error.
    /// Unparseable cells become Null, the engine's missing marker.
    pub fn cast(&self, types: &[(&str, &str)]) -> Result<Table, ModelError> {
        for (_, cast_name) in types {
            if *cast_name != "int" && *cast_name != "float" {
                return Err(ModelError::UnknownCast(cast_name.to_string()));
            }
        }

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut out = row.clone();
                for (field, cast_name) in types {
                    let source = row.get(field).cloned().unwrap_or(Value::Null);
                    let converted = match *cast_name {
                        "int" => cast_int(&source),
                        _ => cast_float(&source),
                    };
                    out.set(*field, converted);
                }
                out
            })
            .collect();

        Ok(self.derive(rows))
    }

    /// Bernoulli sample: keep each row independently with probability
    /// `fraction`. A seed makes the sample reproducible.
    pub fn sample(&self, fraction: f64, seed: Option<u64>) -> Result<Table, ModelError> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ModelError::InvalidArgument(format!(
                "sample fraction must be between 0.0 and 1.0, got {}",
                fraction
            )));
        }

        let mut rng = match seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };

        let rows = self
            .rows
            .iter()
            .filter(|_| rng.gen::<f64>() < fraction)
            .cloned()
            .collect();
        Ok(self.derive(rows))
    }

    // ------------------------------------------------------------------
    // Slicer context
    // ------------------------------------------------------------------

    /// Register (or replace) the filter predicate contributed by one
    /// subscriber. All registered predicates AND together in
    /// `sliced_data`. This mutates the table in place so every holder of
    /// the shared table observes the filter.
    pub fn set_slicer<F>(&mut self, subscriber: &str, predicate: F)
    where
        F: Fn(RowView<'_>) -> bool + 'static,
    {
        log::debug!("slicer set by subscriber '{}'", subscriber);
        self.slicers.insert(subscriber.to_string(), Rc::new(predicate));
    }

    /// Remove one subscriber's filter predicate.
    pub fn unset_slicer(&mut self, subscriber: &str) {
        log::debug!("slicer unset by subscriber '{}'", subscriber);
        self.slicers.remove(subscriber);
    }

    /// Remove every registered slicer.
    pub fn reset_slicers(&mut self) {
        log::debug!("all slicers reset");
        self.slicers.clear();
    }

    /// Number of registered slicers.
    pub fn slicer_count(&self) -> usize {
        self.slicers.len()
    }

    /// The rows passing every registered slicer predicate, as a fresh
    /// table that carries the calculation and measure definitions
    /// forward.
    pub fn sliced_data(&self) -> Table {
        if self.slicers.is_empty() {
            return self.derive(self.rows.clone());
        }

        let rows = self
            .iter()
            .filter(|view| self.slicers.values().all(|p| p(*view)))
            .map(|view| view.to_row())
            .collect();
        self.derive(rows)
    }
}

fn cast_int(value: &Value) -> Value {
    match value {
        Value::Integer(i) => Value::Integer(*i),
        Value::Float(f) if f.is_finite() => Value::Integer(*f as i64),
        Value::String(s) => {
            if let Ok(i) = s.trim().parse::<i64>() {
                Value::Integer(i)
            } else if let Ok(f) = s.trim().parse::<f64>() {
                if f.is_finite() {
                    Value::Integer(f as i64)
                } else {
                    Value::Null
                }
            } else {
                Value::Null
            }
        },
        _ => Value::Null,
    }
}

fn cast_float(value: &Value) -> Value {
    match value {
        Value::Integer(i) => Value::Float(*i as f64),
        Value::Float(f) if !f.is_nan() => Value::Float(*f),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if !f.is_nan() => Value::Float(f),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Table")
            .field("rows", &self.rows)
            .field("calculations", &self.calculation_names())
            .field("measures", &self.measure_names())
            .field("slicers", &self.slicers.keys().collect::<Vec<_>>())
            .finish()
    }
}
