//! Shared fixtures for integration tests: a small employee directory.

#![allow(dead_code)]

use chrono::TimeDelta;
use treegrid::model::{
    EnumDescriptor, EnumValue, ListRef, MapKey, MapRef, ObjectRef, Reflect, TypeDesc, Value,
};

pub static ROLE: EnumDescriptor = EnumDescriptor::new(
    "Role",
    &[
        ("Intern", 0),
        ("Engineer", 1),
        ("Lead", 2),
        ("Manager", 3),
        ("Director", 4),
    ],
);

#[derive(Reflect)]
pub struct Address {
    pub street: String,
    pub zip_code: String,
}

#[derive(Reflect)]
pub struct Employee {
    pub name: String,
    pub age: i64,
    #[reflect(ty = TypeDesc::Enum(&ROLE))]
    pub role: EnumValue,
    pub is_active: bool,
    #[reflect(read_only)]
    pub tenure: TimeDelta,
    #[reflect(ty = TypeDesc::Record("Address"))]
    pub home_address: Option<ObjectRef>,
    #[reflect(read_only)]
    pub skills: ListRef,
    #[reflect(read_only)]
    pub scores: MapRef,
    #[reflect(read_only)]
    pub reports: ListRef,
    #[reflect(field)]
    pub employee_id: i64,
}

pub fn address(street: &str, zip_code: &str) -> ObjectRef {
    ObjectRef::new(Address {
        street: street.to_string(),
        zip_code: zip_code.to_string(),
    })
}

/// An employee with an address, two skills and two scores.
pub fn employee(name: &str, age: i64, role: &str) -> ObjectRef {
    ObjectRef::new(Employee {
        name: name.to_string(),
        age,
        role: ROLE.value(ROLE.parse(role).unwrap_or(0)),
        is_active: true,
        tenure: TimeDelta::days(400),
        home_address: Some(address("1 Main St", "12345")),
        skills: ListRef::typed(TypeDesc::Text, [Value::from("rust"), Value::from("sql")]),
        scores: MapRef::typed(
            TypeDesc::Int,
            [
                (MapKey::from("q1"), Value::Int(90)),
                (MapKey::from("q2"), Value::Int(85)),
            ],
        ),
        reports: ListRef::new(Vec::new()),
        employee_id: age * 100,
    })
}

/// Add `report` to `manager`'s reports.
pub fn add_report(manager: &ObjectRef, report: &ObjectRef) {
    manager.with(|e: &Employee| e.reports.push(report.clone()));
}

/// A manager with two engineers, one of whom has an intern.
pub fn team() -> ObjectRef {
    let boss = employee("Dana", 50, "Director");
    let ann = employee("Ann", 34, "Engineer");
    let bob = employee("Bob", 41, "Lead");
    let cy = employee("Cy", 22, "Intern");
    add_report(&boss, &ann);
    add_report(&boss, &bob);
    add_report(&bob, &cy);
    boss
}

/// The `Reports` of an employee, for projection and flattening.
pub fn reports(value: &Value) -> Option<Vec<Value>> {
    match value.member("Reports") {
        Ok(Value::List(list)) => Some(list.items()),
        _ => None,
    }
}

/// Drop an employee's reports, breaking any reference cycle through them.
pub fn clear_reports(employee: &ObjectRef) {
    employee.with_mut(|e: &mut Employee| e.reports = ListRef::new(Vec::new()));
}
