// Join engine: nested-loop four-way join with a caller combinator
// Author: Gabriel Demetrios Lafis

use crate::data::Row;
use super::Table;

/// Join type for joining tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Outer,
}

impl Table {
    /// Join another table to this one.
    ///
    /// Every left/right row pair for which `match_fn` holds emits a
    /// matched output row, so a row matching several rows on the other
    /// side fans out in the standard relational way. After the match
    /// pass, rows that never matched are emitted for `Left`/`Outer`
    /// (left side) and `Right`/`Outer` (right side), paired with an
    /// empty row standing in for the missing side. `combine_fn` builds
    /// every output row from the (left, right) pair.
    ///
    /// Output order: matches in left-then-right scan order, then
    /// unmatched left rows, then unmatched right rows. The nested-loop
    /// match is O(n*m), which is the right cost model for in-memory,
    /// notebook-scale tables.
    pub fn join<M, C>(
        &self,
        other: &Table,
        join_type: JoinType,
        match_fn: M,
        combine_fn: C,
    ) -> Table
    where
        M: Fn(&Row, &Row) -> bool,
        C: Fn(&Row, &Row) -> Row,
    {
        let left = self.rows();
        let right = other.rows();

        let mut left_matched = vec![false; left.len()];
        let mut right_matched = vec![false; right.len()];
        let mut results: Vec<Row> = Vec::new();

        for (i, left_row) in left.iter().enumerate() {
            for (j, right_row) in right.iter().enumerate() {
                if match_fn(left_row, right_row) {
                    results.push(combine_fn(left_row, right_row));
                    left_matched[i] = true;
                    right_matched[j] = true;
                }
            }
        }

        let empty = Row::new();

        if join_type == JoinType::Left || join_type == JoinType::Outer {
            for (i, left_row) in left.iter().enumerate() {
                if !left_matched[i] {
                    results.push(combine_fn(left_row, &empty));
                }
            }
        }

        if join_type == JoinType::Right || join_type == JoinType::Outer {
            for (j, right_row) in right.iter().enumerate() {
                if !right_matched[j] {
                    results.push(combine_fn(&empty, right_row));
                }
            }
        }

        log::debug!("{:?} join produced {} row(s)", join_type, results.len());

        Table::create(results)
    }
}
