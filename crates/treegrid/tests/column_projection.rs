//! Tests for projecting object graphs into table rows.

mod common;

use std::sync::Arc;

use common::{Employee, add_report, clear_reports, employee, reports, team};
use parking_lot::Mutex;
use treegrid::model::{
    Accessor, ColumnProjector, ColumnSpec, Error, ListRef, MemberKind, ReflectError, Sentinel,
    TableRow, Value, project,
};
use treegrid::{TreeDebug, TreeFormatOptions};

fn senior_column() -> ColumnSpec {
    ColumnSpec::for_closure("Senior", |v| {
        let age = v.member("Age")?.as_i64().unwrap_or(0);
        Ok(Value::Bool(age >= 40))
    })
}

fn names(rows: &[Arc<TableRow>]) -> Vec<String> {
    rows.iter()
        .map(|r| r.column("Name").unwrap().value().display_text())
        .collect()
}

#[test]
fn test_team_projection() {
    let root = Value::from(team());
    let rows = project(
        &root,
        reports,
        vec![
            ColumnSpec::for_property("Name"),
            ColumnSpec::for_property("Role"),
            senior_column(),
        ],
    )
    .unwrap();

    assert_eq!(rows.len(), 1);
    let boss = &rows[0];
    assert_eq!(boss.entity_name(), "Employee");
    assert_eq!(boss.headers(), ["Name", "Role", "Senior"]);
    assert_eq!(boss.columns()[1].value().display_text(), "Director");
    assert_eq!(boss.columns()[2].value(), Value::Bool(true));

    assert_eq!(names(boss.children()), ["Ann", "Bob"]);
    let bob = &boss.children()[1];
    assert_eq!(names(bob.children()), ["Cy"]);
    assert_eq!(bob.children()[0].columns()[2].value(), Value::Bool(false));
    assert!(!boss.is_loop());
}

#[test]
fn test_list_root_projects_each_item() {
    let people = ListRef::new([
        Value::from(employee("Ann", 34, "Engineer")),
        Value::from(employee("Bob", 41, "Lead")),
    ]);
    let root = Value::from(people);
    let rows = project(&root, |_| None, vec![ColumnSpec::for_property("Age")]).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].columns()[0].value(), Value::Int(41));
    assert!(rows[0].children().is_empty());
}

#[test]
fn test_every_row_has_every_column() {
    let root = Value::from(team());
    let flaky = ColumnSpec::for_closure("Flaky", |v| {
        let name = v.member("Name")?.display_text();
        if name.starts_with('B') {
            Err(ReflectError::other("no B names"))
        } else {
            Ok(Value::from(name.len()))
        }
    });
    let rows = project(
        &root,
        reports,
        vec![ColumnSpec::for_property("Name"), flaky, senior_column()],
    )
    .unwrap();

    fn check(row: &TableRow, unreadable: &mut usize) {
        assert_eq!(row.columns().len(), 3);
        if row.columns()[1].value() == Value::Sentinel(Sentinel::Unreadable) {
            *unreadable += 1;
        }
        for child in row.children() {
            check(child, unreadable);
        }
    }
    let mut unreadable = 0;
    check(&rows[0], &mut unreadable);
    assert_eq!(unreadable, 1);
}

#[test]
fn test_column_write_notifies() {
    let ann = employee("Ann", 34, "Engineer");
    let root = Value::from(ann.clone());
    let rows = project(&root, |_| None, vec![ColumnSpec::for_property("Age")]).unwrap();
    let age = &rows[0].columns()[0];

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    age.value_changed()
        .connect(move |value| seen_clone.lock().push(value.clone()));

    assert!(age.set_value("42"));
    assert!(!age.set_value("forty-three"));
    assert_eq!(ann.with(|e: &Employee| e.age), Some(42));
    assert_eq!(*seen.lock(), vec![Value::Int(42)]);
}

#[test]
fn test_read_only_column_ignores_writes() {
    let root = Value::from(employee("Ann", 34, "Engineer"));
    let rows = project(
        &root,
        |_| None,
        vec![ColumnSpec::for_property("Tenure"), senior_column()],
    )
    .unwrap();

    assert!(!rows[0].columns()[0].can_write());
    assert!(!rows[0].columns()[0].set_value("1.00:00:00"));
    assert!(!rows[0].columns()[1].can_write());
}

#[test]
fn test_closure_setter_gets_raw_value() {
    let ann = employee("Ann", 34, "Engineer");
    let root = Value::from(ann.clone());
    let spec = ColumnSpec::for_closure_rw(
        "Display name",
        |owner: &Value| owner.member("Name"),
        |owner: &Value, value: Value| match owner {
            Value::Object(object) => object.set("Name", value),
            _ => Err(ReflectError::other("not an object")),
        },
    );
    let rows = project(&root, |_| None, vec![spec]).unwrap();
    let column = &rows[0].columns()[0];

    assert!(column.can_write());
    assert!(column.set_value("Annie"));
    assert_eq!(column.value(), Value::from("Annie"));

    // No coercion for closures: an integer is handed over as-is and rejected.
    assert!(!column.set_value(7));
    assert_eq!(ann.with(|e: &Employee| e.name.clone()), Some("Annie".to_string()));
}

#[test]
fn test_field_and_factory_columns() {
    let root = Value::from(employee("Ann", 34, "Engineer"));
    let rows = project(
        &root,
        |_| None,
        vec![
            ColumnSpec::for_field_named("Id", "employee_id"),
            ColumnSpec::new("Kind", |owner| Ok(Accessor::constant(owner.type_name()))),
        ],
    )
    .unwrap();

    assert_eq!(rows[0].columns()[0].value(), Value::Int(3400));
    assert!(rows[0].columns()[0].set_value(1));
    assert_eq!(rows[0].columns()[0].value(), Value::Int(1));
    assert_eq!(rows[0].columns()[1].value(), Value::from("Employee"));
}

#[test]
fn test_unknown_member_fails_fast() {
    let root = Value::from(employee("Ann", 34, "Engineer"));
    let err = project(&root, |_| None, vec![ColumnSpec::for_property("Salary")]).unwrap_err();

    assert_eq!(
        err,
        Error::MemberNotFound {
            member: "Salary".to_string(),
            kind: MemberKind::Property,
            type_name: "Employee".to_string(),
        }
    );
    assert_eq!(err.to_string(), "property 'Salary' not found on Employee");

    // A property is not a field.
    let err = project(&root, |_| None, vec![ColumnSpec::for_field("Name")]).unwrap_err();
    assert!(matches!(err, Error::MemberNotFound { kind: MemberKind::Field, .. }));
}

#[test]
fn test_configuration_errors() {
    let root = Value::from(employee("Ann", 34, "Engineer"));
    assert_eq!(project(&root, |_| None, Vec::new()).unwrap_err(), Error::NoColumns);

    let with_null = Value::from(ListRef::new([Value::Null]));
    let err = project(&with_null, |_| None, vec![ColumnSpec::for_property("Name")]).unwrap_err();
    assert_eq!(
        err,
        Error::NullOwner {
            header: "Name".to_string()
        }
    );
}

#[test]
fn test_self_report_becomes_loop_row() {
    let boss = employee("Dana", 50, "Director");
    add_report(&boss, &boss);
    let root = Value::from(boss.clone());

    let rows = project(&root, reports, vec![ColumnSpec::for_property("Name")]).unwrap();
    let looped = &rows[0].children()[0];
    assert!(looped.is_loop());
    assert!(looped.children().is_empty());
    assert_eq!(looped.columns()[0].value(), Value::from("Dana"));

    clear_reports(&boss);
}

#[test]
fn test_member_lookups_are_cached() {
    let root = Value::from(team());
    let projector = ColumnProjector::new(vec![
        ColumnSpec::for_property("Name"),
        ColumnSpec::for_property("Age"),
        senior_column(),
    ])
    .with_children(reports);

    projector.project(&root).unwrap();
    assert_eq!(projector.cached_members(), 2);
    projector.project(&root).unwrap();
    assert_eq!(projector.cached_members(), 2);
}

#[test]
fn test_rows_feed_data_source() {
    let root = Value::from(team());
    let rows = project(&root, reports, vec![ColumnSpec::for_property("Name")]).unwrap();
    let mut source = TableRow::into_data_source(rows);

    let boss = source.roots()[0];
    source.expand(boss);
    let bob = source.row_at(2).unwrap();
    source.expand(bob);

    let visible: Vec<String> = source
        .iter_visible()
        .map(|(_, row)| row.model().columns()[0].value().display_text())
        .collect();
    assert_eq!(visible, ["Dana", "Ann", "Bob", "Cy"]);
    assert_eq!(source.row(bob).unwrap().depth(), 1);
}

#[test]
fn test_table_dump() {
    let root = Value::from(team());
    let rows = project(&root, reports, vec![ColumnSpec::for_property("Name")]).unwrap();

    let text = TreeDebug::with_options(TreeFormatOptions::default()).format(&rows[0]);
    assert_eq!(text.lines().count(), 4);
    assert!(text.starts_with("Employee (Name=Dana)\n"));
    assert!(text.contains("Employee (Name=Cy)"));
}
