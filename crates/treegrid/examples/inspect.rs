//! Inspect an object graph: walk it, project it into a table and browse the
//! flattened rows.
//!
//! Run with: cargo run -p treegrid --example inspect
//! Set `RUST_LOG=treegrid=trace` to see per-node events.

use treegrid::model::{
    ColumnSpec, EnumDescriptor, EnumValue, ListRef, MapKey, MapRef, ObjectRef, Reflect, TableRow,
    TypeDesc, Value, parse_object, project,
};
use treegrid::{TreeDebug, TreeFormatOptions};
use tracing_subscriber::EnvFilter;

static ROLE: EnumDescriptor =
    EnumDescriptor::new("Role", &[("Engineer", 0), ("Lead", 1), ("Director", 2)]);

#[derive(Reflect)]
struct Employee {
    name: String,
    #[reflect(ty = TypeDesc::Enum(&ROLE))]
    role: EnumValue,
    age: i64,
    #[reflect(read_only)]
    scores: MapRef,
    #[reflect(read_only)]
    reports: ListRef,
}

fn employee(name: &str, role: i64, age: i64, reports: Vec<ObjectRef>) -> ObjectRef {
    ObjectRef::new(Employee {
        name: name.to_string(),
        role: ROLE.value(role),
        age,
        scores: MapRef::typed(
            TypeDesc::Int,
            [(MapKey::from("q1"), Value::Int(age + 40)), (MapKey::from("q2"), Value::Int(88))],
        ),
        reports: ListRef::new(reports.into_iter().map(Value::from)),
    })
}

fn reports(value: &Value) -> Option<Vec<Value>> {
    match value.member("Reports") {
        Ok(Value::List(list)) => Some(list.items()),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let team = employee(
        "Dana",
        2,
        50,
        vec![
            employee("Ann", 0, 34, Vec::new()),
            employee("Bob", 1, 41, vec![employee("Cy", 0, 22, Vec::new())]),
        ],
    );
    let root = Value::from(team);

    println!("== Object graph ==");
    let node = parse_object(&root);
    print!("{}", TreeDebug::new().format(&node));

    if let Some(age) = node.find(&["Age"]) {
        age.set_value("51");
        println!("Age after writing \"51\": {}", age.display_value());
    }

    println!();
    println!("== Table ==");
    let rows = project(
        &root,
        reports,
        vec![
            ColumnSpec::for_property("Name"),
            ColumnSpec::for_property("Role"),
            ColumnSpec::for_closure("Senior", |v| {
                Ok(Value::Bool(v.member("Age")?.as_i64().unwrap_or(0) >= 40))
            }),
        ],
    )?;
    print!(
        "{}",
        TreeDebug::with_options(TreeFormatOptions::default()).format_forest(&rows)
    );

    println!();
    println!("== Flattened ==");
    let mut source = TableRow::into_data_source(rows);
    let label = |row: &std::sync::Arc<TableRow>| {
        row.columns()
            .iter()
            .map(|c| c.value().display_text())
            .collect::<Vec<_>>()
            .join(" | ")
    };

    print!("{}", source.format_visible(label));
    let root_row = source.roots()[0];
    source.expand(root_row);
    println!("-- expanded root");
    print!("{}", source.format_visible(label));
    if let Some(bob) = source.row_at(2) {
        source.expand(bob);
    }
    println!("-- expanded Bob");
    print!("{}", source.format_visible(label));
    source.collapse(root_row);
    source.expand(root_row);
    println!("-- collapsed and re-expanded root");
    print!("{}", source.format_visible(label));

    Ok(())
}
