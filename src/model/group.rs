// Grouping and pivoting engine
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;

use crate::data::{Row, Value};
use super::{RowView, Table};

impl Table {
    /// Partition the rows by the key object produced per row. Partition
    /// keys compare structurally (canonical name-sorted form, so key
    /// field order does not matter). Partitions come back in first-seen
    /// order.
    pub(crate) fn partition<K>(&self, key_fn: K) -> Vec<(Row, Vec<Row>)>
    where
        K: Fn(RowView<'_>) -> Row,
    {
        let mut order: HashMap<String, usize> = HashMap::new();
        let mut partitions: Vec<(Row, Vec<Row>)> = Vec::new();

        for view in self.iter() {
            let key = key_fn(view);
            let canonical = key.canonical_key();
            match order.get(&canonical) {
                Some(&idx) => partitions[idx].1.push(view.to_row()),
                None => {
                    order.insert(canonical, partitions.len());
                    partitions.push((key, vec![view.to_row()]));
                },
            }
        }

        partitions
    }

    /// Group by a key function, returning one row per distinct key: the
    /// distinct key objects themselves, in first-seen order.
    pub fn group<K>(&self, key_fn: K) -> Table
    where
        K: Fn(RowView<'_>) -> Row,
    {
        let rows = self
            .partition(key_fn)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        Table::create(rows)
    }

    /// Group by a key function and aggregate each partition. The
    /// aggregate function receives the partition as a sub-table (with
    /// this table's calculations and measures available) and returns the
    /// aggregate fields; the output row merges the key fields with the
    /// aggregate fields.
    pub fn group_by<K, A>(&self, key_fn: K, aggregate_fn: A) -> Table
    where
        K: Fn(RowView<'_>) -> Row,
        A: Fn(&Table) -> Row,
    {
        let rows = self
            .partition(key_fn)
            .into_iter()
            .map(|(key, members)| {
                let sub = self.derive(members);
                let mut out = key;
                out.extend_from(&aggregate_fn(&sub));
                out
            })
            .collect();
        Table::create(rows)
    }

    /// Group by a key function and pivot the distinct values of
    /// `pivot_fn` into columns. Distinct pivot values are collected
    /// across all rows before partitioning, so every group row carries
    /// the same pivot columns. For each group and pivot value, the
    /// aggregate runs over the matching subset of the group's rows; a
    /// one-field aggregate result unwraps to a scalar under the pivot
    /// column, a multi-field result flattens to "{pivot} {field}"
    /// columns.
    pub fn pivot<K, P, A>(&self, key_fn: K, pivot_fn: P, aggregate_fn: A) -> Table
    where
        K: Fn(RowView<'_>) -> Row,
        P: Fn(RowView<'_>) -> Value,
        A: Fn(&Table) -> Row,
    {
        // Distinct pivot values, first-seen order
        let mut seen: HashMap<String, ()> = HashMap::new();
        let mut pivot_values: Vec<Value> = Vec::new();
        for view in self.iter() {
            let value = pivot_fn(view);
            if seen.insert(value.canonical_key(), ()).is_none() {
                pivot_values.push(value);
            }
        }

        let rows = self
            .partition(key_fn)
            .into_iter()
            .map(|(key, members)| {
                let sub = self.derive(members);
                let mut out = key;

                for pivot_value in &pivot_values {
                    let wanted = pivot_value.canonical_key();
                    let subset =
                        sub.filter(|view| pivot_fn(view).canonical_key() == wanted);
                    let agg = aggregate_fn(&subset);
                    let column = pivot_value.to_string();

                    if agg.len() == 1 {
                        let value =
                            agg.iter().next().map(|(_, v)| v.clone()).unwrap_or(Value::Null);
                        out.set(column, value);
                    } else {
                        for (name, value) in agg.iter() {
                            out.set(format!("{} {}", column, name), value.clone());
                        }
                    }
                }

                out
            })
            .collect();

        Table::create(rows)
    }
}
