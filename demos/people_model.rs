// People model example
// Author: Gabriel Demetrios Lafis

use anyhow::Result;

use rust_tabular_model_engine::{JoinType, Row, Table, Value};

fn main() -> Result<()> {
    // Build a table from raw JSON records
    let people = Table::from_json_str(
        r#"[
            {"name": "Tony",    "sex": "Male",   "age": 25},
            {"name": "Paul",    "sex": "Male",   "age": 17},
            {"name": "Sarah",   "sex": "Female", "age": 42},
            {"name": "Debbie",  "sex": "Female", "age": 62},
            {"name": "Michael", "sex": "Male",   "age": 51},
            {"name": "Jenny",   "sex": "Female", "age": 38},
            {"name": "Frank",   "sex": "Male",   "age": 32},
            {"name": "Amy",     "sex": "Female", "age": 29}
        ]"#,
    )?;

    println!("People:");
    print_table(&people);

    // Augment the model with a calculated field and two measures
    let mut model = people
        .calculate("age_band", |row, _, _| {
            match row.get("age").ok().and_then(|v| v.as_f64()) {
                Some(age) => Value::Integer(((age / 10.0).floor() * 10.0) as i64),
                None => Value::Null,
            }
        })
        .measure("people", |group, _, _| Value::Integer(group.count() as i64))
        .measure("mean age", |group, _, _| {
            match group.list("age").ok().and_then(|s| s.mean()) {
                Some(mean) => Value::Float(mean),
                None => Value::Null,
            }
        });

    println!("\nModel fields: {:?}", model.model());

    // Cube: people and mean age per sex and age band
    let cube = model.cube(&["sex", "age_band", "people", "mean age"])?;
    println!("\nPeople by sex and age band:");
    print_table(&cube);

    // Slice the shared model and re-evaluate the same cube
    model.set_slicer("adults-only", |row| {
        row.get("age")
            .ok()
            .and_then(|v| v.as_f64())
            .map(|age| age >= 18.0)
            .unwrap_or(false)
    });

    let sliced_cube = model.cube(&["sex", "people"])?;
    println!("\nAdults by sex (slicer active):");
    print_table(&sliced_cube);
    model.reset_slicers();

    // Univariate statistics on a column
    let ages = model.list("age")?;
    println!(
        "\nAge: mean={:?} q1={:?} median={:?} q3={:?} std={:?}",
        ages.mean(),
        ages.percentile(25.0),
        ages.percentile(50.0),
        ages.percentile(75.0),
        ages.std(),
    );

    // Join against a second table
    let departments = Table::from_json_str(
        r#"[
            {"name": "Tony",  "department": "Sales"},
            {"name": "Sarah", "department": "Engineering"},
            {"name": "Kim",   "department": "Finance"}
        ]"#,
    )?;

    let joined = model.join(
        &departments,
        JoinType::Left,
        |left, right| left.get("name") == right.get("name"),
        |left, right| {
            let mut out = Row::new();
            out.set("name", left.get("name").cloned().unwrap_or(Value::Null));
            out.set("age", left.get("age").cloned().unwrap_or(Value::Null));
            out.set(
                "department",
                right.get("department").cloned().unwrap_or(Value::Null),
            );
            out
        },
    );

    println!("\nPeople with departments (left join):");
    print_table(&joined);

    Ok(())
}

// Helper function to print a table
fn print_table(table: &Table) {
    let names = table.model();

    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            print!(" | ");
        }
        print!("{}", name);
    }
    println!();

    for i in 0..names.len() {
        if i > 0 {
            print!("-+-");
        }
        print!("----");
    }
    println!();

    for view in table.iter() {
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                print!(" | ");
            }
            match view.get(name) {
                Ok(Value::Null) => print!("NULL"),
                Ok(Value::Float(f)) => print!("{:.1}", f),
                Ok(value) => print!("{}", value),
                Err(_) => print!("-"),
            }
        }
        println!();
    }
}
