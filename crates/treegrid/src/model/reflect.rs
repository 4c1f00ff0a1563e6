//! The reflection seam.
//!
//! Record types expose their members to the walker and to column projection
//! by implementing [`Reflect`]. The trait is the explicit stand-in for
//! runtime type introspection: a type lists its members once, as static
//! [`MemberDescriptor`]s, and answers reads and writes by member name.
//!
//! # Example
//!
//! ```
//! use treegrid::model::{
//!     MemberDescriptor, ObjectRef, Reflect, ReflectError, TypeDesc, Value,
//! };
//!
//! struct Address {
//!     street: String,
//!     zip: i64,
//! }
//!
//! static ADDRESS_MEMBERS: &[MemberDescriptor] = &[
//!     MemberDescriptor::property("Street", TypeDesc::Text),
//!     MemberDescriptor::property("ZipCode", TypeDesc::Int),
//! ];
//!
//! impl Reflect for Address {
//!     fn type_name(&self) -> &'static str {
//!         "Address"
//!     }
//!
//!     fn members(&self) -> &[MemberDescriptor] {
//!         ADDRESS_MEMBERS
//!     }
//!
//!     fn get(&self, member: &str) -> Result<Value, ReflectError> {
//!         match member {
//!             "Street" => Ok(self.street.clone().into()),
//!             "ZipCode" => Ok(self.zip.into()),
//!             _ => Err(ReflectError::unknown_member("Address", member)),
//!         }
//!     }
//!
//!     fn set(&mut self, member: &str, value: Value) -> Result<(), ReflectError> {
//!         match (member, value) {
//!             ("Street", Value::Text(s)) => self.street = s,
//!             ("ZipCode", Value::Int(n)) => self.zip = n,
//!             (member, value) => {
//!                 return Err(ReflectError::type_mismatch(member, "member type", value.type_name()));
//!             }
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let address = ObjectRef::new(Address { street: "Main St".into(), zip: 12345 });
//! assert_eq!(address.get("ZipCode"), Ok(Value::Int(12345)));
//! ```

use std::any::Any;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use uuid::Uuid;

use super::error::ReflectError;
use super::value::{EnumDescriptor, EnumValue, KeyValuePair, ListRef, MapRef, ObjectRef, Value};

/// Whether a member is a property or a plain field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A property, listed first when a record is expanded.
    Property,
    /// A plain field, listed after all properties.
    Field,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Property => f.write_str("property"),
            MemberKind::Field => f.write_str("field"),
        }
    }
}

/// The declared type of a member or container slot.
///
/// Writes are coerced to this type before they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeDesc {
    /// Accepts anything; no coercion.
    Any,
    Bool,
    Int,
    UInt,
    Float,
    Char,
    Text,
    DateTime,
    Date,
    Time,
    Duration,
    Uuid,
    /// An enumeration with the given variants.
    Enum(&'static EnumDescriptor),
    /// An optional value of the inner type.
    Nullable(&'static TypeDesc),
    /// A key/value pair.
    Pair,
    List,
    Map,
    /// A record with the given type name.
    Record(&'static str),
}

impl TypeDesc {
    /// Whether a slot of this type can hold [`Value::Null`].
    pub fn is_nullable(&self) -> bool {
        matches!(
            self,
            TypeDesc::Any
                | TypeDesc::Text
                | TypeDesc::Nullable(_)
                | TypeDesc::List
                | TypeDesc::Map
                | TypeDesc::Record(_)
        )
    }

    /// Whether `value` can be stored in a slot of this type as-is.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (TypeDesc::Any, _) => true,
            (_, Value::Null) => self.is_nullable(),
            (TypeDesc::Nullable(inner), value) => inner.accepts(value),
            (TypeDesc::Bool, Value::Bool(_))
            | (TypeDesc::Int, Value::Int(_))
            | (TypeDesc::UInt, Value::UInt(_))
            | (TypeDesc::Float, Value::Float(_))
            | (TypeDesc::Char, Value::Char(_))
            | (TypeDesc::Text, Value::Text(_))
            | (TypeDesc::DateTime, Value::DateTime(_))
            | (TypeDesc::Date, Value::Date(_))
            | (TypeDesc::Time, Value::Time(_))
            | (TypeDesc::Duration, Value::Duration(_))
            | (TypeDesc::Uuid, Value::Uuid(_))
            | (TypeDesc::Pair, Value::Pair(_))
            | (TypeDesc::List, Value::List(_))
            | (TypeDesc::Map, Value::Map(_)) => true,
            (TypeDesc::Enum(descriptor), Value::Enum(value)) => value.descriptor == *descriptor,
            (TypeDesc::Record(name), Value::Object(object)) => object.type_name() == *name,
            _ => false,
        }
    }

    /// The value a non-nullable slot takes when assigned null.
    ///
    /// Nullable types default to [`Value::Null`].
    pub fn default_value(&self) -> Value {
        match self {
            TypeDesc::Bool => Value::Bool(false),
            TypeDesc::Int => Value::Int(0),
            TypeDesc::UInt => Value::UInt(0),
            TypeDesc::Float => Value::Float(0.0),
            TypeDesc::Char => Value::Char('\0'),
            TypeDesc::DateTime => Value::DateTime(NaiveDateTime::default()),
            TypeDesc::Date => Value::Date(NaiveDate::default()),
            TypeDesc::Time => Value::Time(NaiveTime::default()),
            TypeDesc::Duration => Value::Duration(TimeDelta::zero()),
            TypeDesc::Uuid => Value::Uuid(Uuid::nil()),
            TypeDesc::Enum(descriptor) => Value::Enum(descriptor.value(0)),
            TypeDesc::Pair => Value::Pair(KeyValuePair::new(Value::Null, Value::Null).into()),
            TypeDesc::Any
            | TypeDesc::Text
            | TypeDesc::Nullable(_)
            | TypeDesc::List
            | TypeDesc::Map
            | TypeDesc::Record(_) => Value::Null,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Any => f.write_str("Value"),
            TypeDesc::Bool => f.write_str("bool"),
            TypeDesc::Int => f.write_str("i64"),
            TypeDesc::UInt => f.write_str("u64"),
            TypeDesc::Float => f.write_str("f64"),
            TypeDesc::Char => f.write_str("char"),
            TypeDesc::Text => f.write_str("String"),
            TypeDesc::DateTime => f.write_str("DateTime"),
            TypeDesc::Date => f.write_str("Date"),
            TypeDesc::Time => f.write_str("Time"),
            TypeDesc::Duration => f.write_str("Duration"),
            TypeDesc::Uuid => f.write_str("Uuid"),
            TypeDesc::Enum(descriptor) => f.write_str(descriptor.name),
            TypeDesc::Nullable(inner) => write!(f, "Option<{}>", inner),
            TypeDesc::Pair => f.write_str("KeyValuePair"),
            TypeDesc::List => f.write_str("List"),
            TypeDesc::Map => f.write_str("Map"),
            TypeDesc::Record(name) => f.write_str(name),
        }
    }
}

/// Static description of one member of a [`Reflect`] type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberDescriptor {
    /// The member name, used for lookup and as the child node name.
    pub name: &'static str,
    /// Property or field.
    pub kind: MemberKind,
    /// Declared type; writes are coerced to it.
    pub ty: TypeDesc,
    /// Whether the member can be read.
    pub readable: bool,
    /// Whether the member can be written.
    pub writable: bool,
}

impl MemberDescriptor {
    /// A readable, writable property.
    pub const fn property(name: &'static str, ty: TypeDesc) -> Self {
        Self {
            name,
            kind: MemberKind::Property,
            ty,
            readable: true,
            writable: true,
        }
    }

    /// A readable, writable field.
    pub const fn field(name: &'static str, ty: TypeDesc) -> Self {
        Self {
            name,
            kind: MemberKind::Field,
            ty,
            readable: true,
            writable: true,
        }
    }

    /// Mark the member as not writable.
    pub const fn read_only(self) -> Self {
        Self {
            writable: false,
            ..self
        }
    }

    /// Mark the member as not readable.
    pub const fn write_only(self) -> Self {
        Self {
            readable: false,
            ..self
        }
    }
}

/// A record type whose members can be enumerated, read and written by name.
///
/// `members` lists properties and fields in declaration order. `get` and
/// `set` receive the member name; `set` receives a value already coerced
/// to the member's declared [`TypeDesc`] when coercion succeeded, or the
/// original value otherwise, and should reject values it cannot store.
pub trait Reflect: Any + Send + Sync {
    /// The runtime type name, shown for record nodes and table rows.
    fn type_name(&self) -> &'static str;

    /// All members in declaration order.
    fn members(&self) -> &[MemberDescriptor];

    /// Read a member.
    fn get(&self, member: &str) -> Result<Value, ReflectError>;

    /// Write a member.
    fn set(&mut self, member: &str, value: Value) -> Result<(), ReflectError>;

    /// Look up a member by name and kind.
    fn member(&self, name: &str, kind: MemberKind) -> Option<MemberDescriptor> {
        self.members()
            .iter()
            .find(|m| m.kind == kind && m.name == name)
            .copied()
    }
}

/// A Rust type that can be stored in a reflected member.
///
/// `#[derive(Reflect)]` reads and writes every member through this trait and
/// uses [`TYPE_DESC`](Self::TYPE_DESC) as the member's declared type unless
/// the member overrides it with `#[reflect(ty = ...)]`.
pub trait ReflectValue: Sized {
    /// The declared type writes are coerced to.
    const TYPE_DESC: TypeDesc;

    fn to_value(&self) -> Value;

    /// Convert back from a value, handing it back unchanged on mismatch.
    fn from_value(value: Value) -> Result<Self, Value>;
}

macro_rules! impl_reflect_value {
    ($($ty:ty => $variant:ident as $desc:expr),* $(,)?) => {
        $(
            impl ReflectValue for $ty {
                const TYPE_DESC: TypeDesc = $desc;

                fn to_value(&self) -> Value {
                    Value::$variant(self.clone())
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_reflect_value! {
    bool => Bool as TypeDesc::Bool,
    i64 => Int as TypeDesc::Int,
    u64 => UInt as TypeDesc::UInt,
    f64 => Float as TypeDesc::Float,
    char => Char as TypeDesc::Char,
    String => Text as TypeDesc::Text,
    NaiveDateTime => DateTime as TypeDesc::DateTime,
    NaiveDate => Date as TypeDesc::Date,
    NaiveTime => Time as TypeDesc::Time,
    TimeDelta => Duration as TypeDesc::Duration,
    Uuid => Uuid as TypeDesc::Uuid,
    ListRef => List as TypeDesc::List,
    MapRef => Map as TypeDesc::Map,
    ObjectRef => Object as TypeDesc::Any,
    EnumValue => Enum as TypeDesc::Any,
}

macro_rules! impl_reflect_narrow {
    ($($ty:ty => $variant:ident($wide:ty) as $desc:expr),* $(,)?) => {
        $(
            impl ReflectValue for $ty {
                const TYPE_DESC: TypeDesc = $desc;

                fn to_value(&self) -> Value {
                    Value::$variant(<$wide>::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => <$ty>::try_from(inner).map_err(|_| value),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_reflect_narrow! {
    i32 => Int(i64) as TypeDesc::Int,
    u32 => UInt(u64) as TypeDesc::UInt,
}

macro_rules! impl_reflect_optional {
    ($($ty:ty as $desc:expr),* $(,)?) => {
        $(
            impl ReflectValue for Option<$ty> {
                const TYPE_DESC: TypeDesc = $desc;

                fn to_value(&self) -> Value {
                    self.as_ref().map_or(Value::Null, ReflectValue::to_value)
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::Null => Ok(None),
                        other => <$ty>::from_value(other).map(Some),
                    }
                }
            }
        )*
    };
}

impl_reflect_optional! {
    bool as TypeDesc::Nullable(&TypeDesc::Bool),
    i64 as TypeDesc::Nullable(&TypeDesc::Int),
    f64 as TypeDesc::Nullable(&TypeDesc::Float),
    String as TypeDesc::Text,
    NaiveDateTime as TypeDesc::Nullable(&TypeDesc::DateTime),
    NaiveDate as TypeDesc::Nullable(&TypeDesc::Date),
    Uuid as TypeDesc::Nullable(&TypeDesc::Uuid),
    ObjectRef as TypeDesc::Any,
}

impl ReflectValue for Value {
    const TYPE_DESC: TypeDesc = TypeDesc::Any;

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::value::ListRef;

    static COLOR: EnumDescriptor = EnumDescriptor::new("Color", &[("Red", 0), ("Green", 1)]);
    static OPTIONAL_INT: TypeDesc = TypeDesc::Int;

    #[test]
    fn test_accepts() {
        assert!(TypeDesc::Any.accepts(&Value::Null));
        assert!(TypeDesc::Int.accepts(&Value::Int(1)));
        assert!(!TypeDesc::Int.accepts(&Value::UInt(1)));
        assert!(!TypeDesc::Int.accepts(&Value::Null));
        assert!(TypeDesc::Text.accepts(&Value::Null));
        assert!(TypeDesc::Nullable(&OPTIONAL_INT).accepts(&Value::Null));
        assert!(TypeDesc::Nullable(&OPTIONAL_INT).accepts(&Value::Int(3)));
        assert!(TypeDesc::Enum(&COLOR).accepts(&Value::Enum(COLOR.value(1))));
        assert!(TypeDesc::List.accepts(&Value::List(ListRef::new(Vec::new()))));
    }

    #[test]
    fn test_default_values() {
        assert_eq!(TypeDesc::Int.default_value(), Value::Int(0));
        assert_eq!(TypeDesc::Bool.default_value(), Value::Bool(false));
        assert_eq!(TypeDesc::Text.default_value(), Value::Null);
        assert_eq!(TypeDesc::Uuid.default_value(), Value::Uuid(Uuid::nil()));
        assert_eq!(
            TypeDesc::Enum(&COLOR).default_value(),
            Value::Enum(COLOR.value(0))
        );
    }

    #[test]
    fn test_member_descriptor_builders() {
        let member = MemberDescriptor::field("Id", TypeDesc::Uuid).read_only();
        assert_eq!(member.kind, MemberKind::Field);
        assert!(member.readable);
        assert!(!member.writable);
        assert_eq!(TypeDesc::Nullable(&OPTIONAL_INT).to_string(), "Option<i64>");
    }

    #[test]
    fn test_reflect_value_conversions() {
        assert_eq!(7i32.to_value(), Value::Int(7));
        assert_eq!(i32::from_value(Value::Int(i64::MAX)), Err(Value::Int(i64::MAX)));
        assert_eq!(String::from_value(Value::Int(1)), Err(Value::Int(1)));
        assert_eq!(Option::<i64>::from_value(Value::Null), Ok(None));
        assert_eq!(Option::<i64>::from_value(Value::Int(4)), Ok(Some(4)));
        assert_eq!(<Option<i64>>::TYPE_DESC.to_string(), "Option<i64>");
        assert_eq!(None::<Uuid>.to_value(), Value::Null);
    }
}
