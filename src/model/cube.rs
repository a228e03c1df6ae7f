// Cube evaluation: dimensions x measures under slicer context
// Author: Gabriel Demetrios Lafis

use crate::data::{Row, Value};
use super::{FieldCategory, ModelError, Table};

impl Table {
    /// Evaluate a cube over the named fields: the single entry point
    /// that takes an arbitrary mix of raw columns, calculated dimensions
    /// and measures and returns one row per dimension combination.
    ///
    /// Fields classifying as measures become the aggregated columns;
    /// every other field (physical or calculated) becomes a dimension.
    /// Active slicers are applied first, then the sliced rows are
    /// grouped by the dimension values, and each measure is evaluated
    /// per group as `measure(group, group_index, parent)`. Output
    /// columns keep the requested order: dimensions first, then
    /// measures. An unknown field name fails the whole call.
    pub fn cube(&self, fields: &[&str]) -> Result<Table, ModelError> {
        let mut dimension_fields: Vec<&str> = Vec::new();
        let mut measure_fields: Vec<&str> = Vec::new();

        for &name in fields {
            match self.column_category(name)? {
                FieldCategory::Measure => measure_fields.push(name),
                _ => dimension_fields.push(name),
            }
        }

        let sliced = self.sliced_data();
        log::debug!(
            "cube over {} dimension(s), {} measure(s), {} sliced row(s)",
            dimension_fields.len(),
            measure_fields.len(),
            sliced.count()
        );

        let partitions = sliced.partition(|view| {
            let mut key = Row::with_capacity(dimension_fields.len());
            for dim in &dimension_fields {
                key.set(*dim, view.get(dim).unwrap_or(Value::Null));
            }
            key
        });

        let mut rows = Vec::with_capacity(partitions.len());
        for (group_index, (key, members)) in partitions.into_iter().enumerate() {
            let group = sliced.derive(members);
            let mut out = key;
            for name in &measure_fields {
                // Classification above guarantees the measure exists
                let f = self
                    .measure_fn(name)
                    .ok_or_else(|| ModelError::FieldNotFound(name.to_string()))?
                    .clone();
                out.set(*name, f(&group, group_index, self));
            }
            rows.push(out);
        }

        Ok(Table::create(rows))
    }
}
