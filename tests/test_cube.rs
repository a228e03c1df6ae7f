// Grouping, pivoting, cube, join and slicer tests
// Author: Gabriel Demetrios Lafis

use rust_tabular_model_engine::{JoinType, ModelError, Row, Table, Value};

fn people() -> Table {
    Table::create(vec![
        Row::from(vec![("name", Value::from("Tony")), ("sex", Value::from("m")), ("age", Value::from(25))]),
        Row::from(vec![("name", Value::from("Michael")), ("sex", Value::from("m")), ("age", Value::from(51))]),
        Row::from(vec![("name", Value::from("Sarah")), ("sex", Value::from("f")), ("age", Value::from(42))]),
    ])
}

fn sales() -> Table {
    Table::create(vec![
        Row::from(vec![("customer", Value::from("A1495")), ("qty", Value::from(10))]),
        Row::from(vec![("customer", Value::from("G234")), ("qty", Value::from(1))]),
        Row::from(vec![("customer", Value::from("F4824")), ("qty", Value::from(5))]),
        Row::from(vec![("customer", Value::from("A1495")), ("qty", Value::from(2))]),
    ])
}

fn customers() -> Table {
    Table::create(vec![
        Row::from(vec![("customer", Value::from("A1495")), ("cname", Value::from("Paul Allen"))]),
        Row::from(vec![("customer", Value::from("G234")), ("cname", Value::from("Tony George"))]),
        Row::from(vec![("customer", Value::from("S345")), ("cname", Value::from("Michael Smith"))]),
    ])
}

// ---------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------

#[test]
fn test_group_returns_distinct_keys_in_first_seen_order() {
    let groups = people().group(|r| {
        Row::from(vec![("sex", r.get("sex").unwrap())])
    });

    assert_eq!(groups.count(), 2);
    assert_eq!(groups.row(0).unwrap().get("sex"), Some(&Value::from("m")));
    assert_eq!(groups.row(1).unwrap().get("sex"), Some(&Value::from("f")));
}

#[test]
fn test_group_count_equals_distinct_key_count() {
    let table = people();

    // One group per distinct serialized key
    let by_sex = table.group(|r| Row::from(vec![("sex", r.get("sex").unwrap())]));
    assert_eq!(by_sex.count(), 2);

    let by_name = table.group(|r| Row::from(vec![("name", r.get("name").unwrap())]));
    assert_eq!(by_name.count(), 3);

    // Zero rows make zero groups
    let empty = Table::create(Vec::new());
    assert_eq!(empty.group(|r| r.to_row()).count(), 0);
}

#[test]
fn test_group_keys_compare_structurally_regardless_of_field_order() {
    let table = people();

    let groups = table.group(|r| {
        // Alternate the key field insertion order per row
        if r.index() % 2 == 0 {
            Row::from(vec![("sex", r.get("sex").unwrap()), ("tag", Value::from("x"))])
        } else {
            Row::from(vec![("tag", Value::from("x")), ("sex", r.get("sex").unwrap())])
        }
    });

    assert_eq!(groups.count(), 2);
}

#[test]
fn test_group_by_merges_key_and_aggregate_fields() {
    let grouped = people().group_by(
        |r| Row::from(vec![("sex", r.get("sex").unwrap())]),
        |g| {
            Row::from(vec![
                ("count", Value::Integer(g.count() as i64)),
                ("mean_age", Value::Float(g.list("age").unwrap().mean().unwrap())),
            ])
        },
    );

    assert_eq!(grouped.count(), 2);

    let males = grouped.filter(|r| r.get("sex").unwrap() == Value::from("m"));
    let row = males.row(0).unwrap();
    assert_eq!(row.get("count"), Some(&Value::Integer(2)));
    assert_eq!(row.get("mean_age"), Some(&Value::Float(38.0)));
}

#[test]
fn test_group_key_with_null_field_is_a_valid_distinct_key() {
    let table = Table::create(vec![
        Row::from(vec![("k", Value::Null), ("v", Value::from(1))]),
        Row::from(vec![("k", Value::from("a")), ("v", Value::from(2))]),
        Row::from(vec![("k", Value::Null), ("v", Value::from(3))]),
    ]);

    let grouped = table.group_by(
        |r| Row::from(vec![("k", r.get("k").unwrap())]),
        |g| Row::from(vec![("count", Value::Integer(g.count() as i64))]),
    );

    assert_eq!(grouped.count(), 2);
    let nulls = grouped.filter(|r| r.get("k").unwrap() == Value::Null);
    assert_eq!(nulls.row(0).unwrap().get("count"), Some(&Value::Integer(2)));
}

// ---------------------------------------------------------------------
// Pivot
// ---------------------------------------------------------------------

#[test]
fn test_pivot_spreads_distinct_values_into_columns() {
    let table = Table::create(vec![
        Row::from(vec![("class", Value::from(1)), ("sex", Value::from("m")), ("age", Value::from(20))]),
        Row::from(vec![("class", Value::from(1)), ("sex", Value::from("f")), ("age", Value::from(30))]),
        Row::from(vec![("class", Value::from(2)), ("sex", Value::from("m")), ("age", Value::from(40))]),
        Row::from(vec![("class", Value::from(2)), ("sex", Value::from("m")), ("age", Value::from(50))]),
    ]);

    let pivoted = table.pivot(
        |r| Row::from(vec![("class", r.get("class").unwrap())]),
        |r| r.get("sex").unwrap(),
        |items| {
            // One-field aggregate rows unwrap to a scalar per pivot column
            match items.list("age").unwrap().mean() {
                Some(mean) => Row::from(vec![("mean_age", Value::Float(mean))]),
                None => Row::from(vec![("mean_age", Value::Null)]),
            }
        },
    );

    assert_eq!(pivoted.count(), 2);

    let class1 = pivoted.row(0).unwrap();
    assert_eq!(class1.get("class"), Some(&Value::Integer(1)));
    assert_eq!(class1.get("m"), Some(&Value::Float(20.0)));
    assert_eq!(class1.get("f"), Some(&Value::Float(30.0)));

    // Class 2 has no females: the aggregate ran over an empty subset
    let class2 = pivoted.row(1).unwrap();
    assert_eq!(class2.get("m"), Some(&Value::Float(45.0)));
    assert_eq!(class2.get("f"), Some(&Value::Null));
}

// ---------------------------------------------------------------------
// Cube
// ---------------------------------------------------------------------

#[test]
fn test_cube_groups_dimensions_and_evaluates_measures() {
    let model = people().measure("count", |g, _, _| Value::Integer(g.count() as i64));

    let cube = model.cube(&["sex", "count"]).unwrap();

    assert_eq!(cube.count(), 2);

    // Set equality: exactly {m: 2} and {f: 1}
    let expected_m = Row::from(vec![("sex", Value::from("m")), ("count", Value::Integer(2))]);
    let expected_f = Row::from(vec![("sex", Value::from("f")), ("count", Value::Integer(1))]);
    assert!(cube.rows().contains(&expected_m));
    assert!(cube.rows().contains(&expected_f));
}

#[test]
fn test_cube_with_calculated_dimension() {
    let model = people()
        .calculate("age_band", |r, _, _| {
            match r.get("age").unwrap().as_f64() {
                Some(age) => Value::Integer(((age / 10.0).floor() * 10.0) as i64),
                None => Value::Null,
            }
        })
        .measure("count", |g, _, _| Value::Integer(g.count() as i64));

    let cube = model.cube(&["age_band", "count"]).unwrap();

    // Ages 25, 51, 42 band to 20, 50, 40
    assert_eq!(cube.count(), 3);
    let band20 = Row::from(vec![("age_band", Value::Integer(20)), ("count", Value::Integer(1))]);
    assert!(cube.rows().contains(&band20));
}

#[test]
fn test_cube_with_measure_over_calculation() {
    let model = people()
        .calculate("age_months", |r, _, _| {
            match r.get("age").unwrap().as_f64() {
                Some(age) => Value::Float(age * 12.0),
                None => Value::Null,
            }
        })
        .measure("mean_months", |g, _, _| {
            match g.list("age_months").unwrap().mean() {
                Some(mean) => Value::Float(mean),
                None => Value::Null,
            }
        });

    let cube = model.cube(&["sex", "mean_months"]).unwrap();
    let males = cube.filter(|r| r.get("sex").unwrap() == Value::from("m"));
    assert_eq!(males.row(0).unwrap().get("mean_months"), Some(&Value::Float(456.0)));
}

#[test]
fn test_cube_with_no_dimensions_is_a_grand_total() {
    let model = people().measure("count", |g, _, _| Value::Integer(g.count() as i64));

    let cube = model.cube(&["count"]).unwrap();
    assert_eq!(cube.count(), 1);
    assert_eq!(cube.row(0).unwrap().get("count"), Some(&Value::Integer(3)));
}

#[test]
fn test_cube_unknown_field_fails_whole_call() {
    let model = people().measure("count", |g, _, _| Value::Integer(g.count() as i64));

    assert!(matches!(
        model.cube(&["sex", "missing", "count"]),
        Err(ModelError::FieldNotFound(_))
    ));
}

#[test]
fn test_cube_respects_slicer_context() {
    let mut model = people().measure("count", |g, _, _| Value::Integer(g.count() as i64));
    model.set_slicer("age-slicer", |r| r.get("age").unwrap().as_f64().unwrap() > 30.0);

    let cube = model.cube(&["sex", "count"]).unwrap();

    // Only Michael (m, 51) and Sarah (f, 42) survive the slicer
    assert_eq!(cube.count(), 2);
    let expected_m = Row::from(vec![("sex", Value::from("m")), ("count", Value::Integer(1))]);
    let expected_f = Row::from(vec![("sex", Value::from("f")), ("count", Value::Integer(1))]);
    assert!(cube.rows().contains(&expected_m));
    assert!(cube.rows().contains(&expected_f));
}

// ---------------------------------------------------------------------
// Slicer context
// ---------------------------------------------------------------------

#[test]
fn test_slicers_and_together() {
    let mut table = people();

    table.set_slicer("sex-visual", |r| r.get("sex").unwrap() == Value::from("m"));
    assert_eq!(table.sliced_data().count(), 2);

    table.set_slicer("age-visual", |r| r.get("age").unwrap().as_f64().unwrap() > 30.0);
    assert_eq!(table.sliced_data().count(), 1);

    // The unsliced rows are untouched
    assert_eq!(table.count(), 3);
}

#[test]
fn test_slicer_is_replaceable_and_removable_per_subscriber() {
    let mut table = people();

    table.set_slicer("visual", |r| r.get("sex").unwrap() == Value::from("m"));
    assert_eq!(table.sliced_data().count(), 2);

    // Last writer wins per subscriber id
    table.set_slicer("visual", |r| r.get("sex").unwrap() == Value::from("f"));
    assert_eq!(table.sliced_data().count(), 1);

    table.unset_slicer("visual");
    assert_eq!(table.sliced_data().count(), 3);
}

#[test]
fn test_reset_slicers_clears_everything() {
    let mut table = people();
    table.set_slicer("a", |_| false);
    table.set_slicer("b", |_| false);
    assert_eq!(table.slicer_count(), 2);
    assert_eq!(table.sliced_data().count(), 0);

    table.reset_slicers();
    assert_eq!(table.slicer_count(), 0);
    assert_eq!(table.sliced_data().count(), 3);
}

#[test]
fn test_sliced_data_carries_definitions_forward() {
    let mut model = people()
        .calculate("age_band", |r, _, _| {
            match r.get("age").unwrap().as_f64() {
                Some(age) => Value::Integer(((age / 10.0).floor() * 10.0) as i64),
                None => Value::Null,
            }
        })
        .measure("count", |g, _, _| Value::Integer(g.count() as i64));

    model.set_slicer("v", |r| r.get("sex").unwrap() == Value::from("m"));

    let sliced = model.sliced_data();
    assert_eq!(sliced.count(), 2);
    assert_eq!(sliced.list("age_band").unwrap().count(), 2);
    assert!(sliced.measure_fn("count").is_some());
}

// ---------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------

fn combine(left: &Row, right: &Row) -> Row {
    let mut out = Row::new();
    let customer = right
        .get("customer")
        .or_else(|| left.get("customer"))
        .cloned()
        .unwrap_or(Value::Null);
    out.set("customer", customer);
    out.set("cname", right.get("cname").cloned().unwrap_or(Value::Null));
    out.set("qty", left.get("qty").cloned().unwrap_or(Value::Null));
    out
}

fn match_on_customer(left: &Row, right: &Row) -> bool {
    match (left.get("customer"), right.get("customer")) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[test]
fn test_inner_join_emits_matches_only() {
    let joined = sales().join(&customers(), JoinType::Inner, match_on_customer, combine);

    // A1495 matches twice (fan-out), G234 once
    assert_eq!(joined.count(), 3);
    for row in joined.rows() {
        assert_ne!(row.get("cname"), Some(&Value::Null));
        assert_ne!(row.get("qty"), Some(&Value::Null));
    }
}

#[test]
fn test_left_join_keeps_unmatched_left_rows() {
    let joined = sales().join(&customers(), JoinType::Left, match_on_customer, combine);

    // 3 matches + 1 unmatched left (F4824)
    assert_eq!(joined.count(), 4);

    let unmatched = joined.filter(|r| r.get("cname").unwrap() == Value::Null);
    assert_eq!(unmatched.count(), 1);
    assert_eq!(unmatched.row(0).unwrap().get("customer"), Some(&Value::from("F4824")));
}

#[test]
fn test_right_join_keeps_unmatched_right_rows() {
    let joined = sales().join(&customers(), JoinType::Right, match_on_customer, combine);

    // 3 matches + 1 unmatched right (S345)
    assert_eq!(joined.count(), 4);

    let unmatched = joined.filter(|r| r.get("qty").unwrap() == Value::Null);
    assert_eq!(unmatched.count(), 1);
    assert_eq!(unmatched.row(0).unwrap().get("cname"), Some(&Value::from("Michael Smith")));
}

#[test]
fn test_join_cardinality_invariants() {
    let left = sales();
    let right = customers();

    let inner = left.join(&right, JoinType::Inner, match_on_customer, combine);
    let left_join = left.join(&right, JoinType::Left, match_on_customer, combine);
    let right_join = left.join(&right, JoinType::Right, match_on_customer, combine);
    let outer = left.join(&right, JoinType::Outer, match_on_customer, combine);

    assert!(inner.count() <= left.count() * right.count());

    let unmatched_left = left_join.count() - inner.count();
    let unmatched_right = right_join.count() - inner.count();
    assert_eq!(outer.count(), inner.count() + unmatched_left + unmatched_right);
    assert_eq!(outer.count(), 5);
}

#[test]
fn test_join_order_is_matches_then_left_only_then_right_only() {
    let joined = sales().join(&customers(), JoinType::Outer, match_on_customer, combine);

    // Matches first in left scan order: A1495, G234, A1495
    assert_eq!(joined.row(0).unwrap().get("customer"), Some(&Value::from("A1495")));
    assert_eq!(joined.row(1).unwrap().get("customer"), Some(&Value::from("G234")));
    assert_eq!(joined.row(2).unwrap().get("customer"), Some(&Value::from("A1495")));
    // Then the unmatched left row, then the unmatched right row
    assert_eq!(joined.row(3).unwrap().get("customer"), Some(&Value::from("F4824")));
    assert_eq!(joined.row(4).unwrap().get("customer"), Some(&Value::from("S345")));
}

#[test]
fn test_join_fan_out_multiplies_matches() {
    // Two left rows and two right rows share one key: 4 matched rows
    let left = Table::create(vec![
        Row::from(vec![("k", Value::from("x")), ("l", Value::from(1))]),
        Row::from(vec![("k", Value::from("x")), ("l", Value::from(2))]),
    ]);
    let right = Table::create(vec![
        Row::from(vec![("k", Value::from("x")), ("r", Value::from(10))]),
        Row::from(vec![("k", Value::from("x")), ("r", Value::from(20))]),
    ]);

    let joined = left.join(
        &right,
        JoinType::Outer,
        |l, r| l.get("k") == r.get("k"),
        |l, r| {
            let mut out = Row::new();
            out.set("l", l.get("l").cloned().unwrap_or(Value::Null));
            out.set("r", r.get("r").cloned().unwrap_or(Value::Null));
            out
        },
    );

    // All rows matched: fan-out only, no unmatched remainder
    assert_eq!(joined.count(), 4);
}
