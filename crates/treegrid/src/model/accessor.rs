//! Read/write access to one named slot.
//!
//! An [`Accessor`] is what a cell renders from and edits through. Each
//! variant carries exactly the state it needs and holds its owner weakly, so
//! an accessor never keeps a list, map or record alive on its own.
//!
//! Reads never fail: a dead owner or a failing getter reads as
//! [`Sentinel::Unreadable`], a list index past the end as
//! [`Sentinel::OutOfRange`] and a vanished map key as
//! [`Sentinel::MissingKey`]. Writes never fail either: [`Accessor::set`]
//! returns `false` when nothing was stored.
//!
//! # Example
//!
//! ```
//! use treegrid::model::{Accessor, ListRef, TypeDesc, Value};
//!
//! let scores = ListRef::typed(TypeDesc::Int, [Value::Int(90), Value::Int(75)]);
//! let second = Accessor::list_item(&scores, 1);
//!
//! assert!(second.set(Value::from("80")));
//! assert_eq!(second.get(), Value::Int(80));
//!
//! let past_end = Accessor::list_item(&scores, 5);
//! assert_eq!(past_end.get().to_string(), "<out of range>");
//! ```

use std::fmt;
use std::sync::Arc;

use treegrid_core::logging::targets;

use super::coerce::coerce;
use super::error::ReflectError;
use super::reflect::{MemberDescriptor, MemberKind, TypeDesc};
use super::value::{
    ListRef, MapKey, MapRef, ObjectRef, Sentinel, Value, WeakListRef, WeakMapRef, WeakObjectRef,
    WeakValue,
};

/// Getter of a closure accessor. Receives the owner.
pub type Getter = Arc<dyn Fn(&Value) -> Result<Value, ReflectError> + Send + Sync>;

/// Setter of a closure accessor. Receives the owner and the new value.
pub type Setter = Arc<dyn Fn(&Value, Value) -> Result<(), ReflectError> + Send + Sync>;

/// Access to one slot of some owner.
#[derive(Clone)]
pub enum Accessor {
    /// A record property.
    Property {
        owner: WeakObjectRef,
        member: MemberDescriptor,
    },
    /// A record field.
    Field {
        owner: WeakObjectRef,
        member: MemberDescriptor,
    },
    /// Explicit getter and optional setter. Writes are not coerced.
    Closure {
        owner: WeakValue,
        getter: Getter,
        setter: Option<Setter>,
    },
    /// One element of a list.
    ListItem { list: WeakListRef, index: usize },
    /// One entry of a map.
    MapEntry { map: WeakMapRef, key: MapKey },
    /// A fixed, read-only value.
    Constant(Value),
}

impl Accessor {
    /// Access a record member. Properties and fields map to their variants.
    pub fn member(owner: &ObjectRef, member: MemberDescriptor) -> Self {
        match member.kind {
            MemberKind::Property => Self::property(owner, member),
            MemberKind::Field => Self::field(owner, member),
        }
    }

    pub fn property(owner: &ObjectRef, member: MemberDescriptor) -> Self {
        Accessor::Property {
            owner: owner.downgrade(),
            member,
        }
    }

    pub fn field(owner: &ObjectRef, member: MemberDescriptor) -> Self {
        Accessor::Field {
            owner: owner.downgrade(),
            member,
        }
    }

    /// Access through closures over `owner`.
    pub fn closure(owner: &Value, getter: Getter, setter: Option<Setter>) -> Self {
        Accessor::Closure {
            owner: owner.downgrade(),
            getter,
            setter,
        }
    }

    pub fn list_item(list: &ListRef, index: usize) -> Self {
        Accessor::ListItem {
            list: list.downgrade(),
            index,
        }
    }

    pub fn map_entry(map: &MapRef, key: MapKey) -> Self {
        Accessor::MapEntry {
            map: map.downgrade(),
            key,
        }
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Accessor::Constant(value.into())
    }

    /// Read the current value.
    pub fn get(&self) -> Value {
        match self {
            Accessor::Property { owner, member } | Accessor::Field { owner, member } => {
                let Some(object) = owner.upgrade() else {
                    return Value::Sentinel(Sentinel::Unreadable);
                };
                if !member.readable {
                    return Value::Sentinel(Sentinel::Unreadable);
                }
                object.get(member.name).unwrap_or_else(|err| {
                    tracing::trace!(target: targets::ACCESSOR, member = member.name, %err, "read failed");
                    Value::Sentinel(Sentinel::Unreadable)
                })
            }
            Accessor::Closure { owner, getter, .. } => match owner.upgrade() {
                Some(owner) => getter(&owner).unwrap_or_else(|err| {
                    tracing::trace!(target: targets::ACCESSOR, %err, "getter failed");
                    Value::Sentinel(Sentinel::Unreadable)
                }),
                None => Value::Sentinel(Sentinel::Unreadable),
            },
            Accessor::ListItem { list, index } => match list.upgrade() {
                Some(list) => list
                    .get(*index)
                    .unwrap_or(Value::Sentinel(Sentinel::OutOfRange)),
                None => Value::Sentinel(Sentinel::Unreadable),
            },
            Accessor::MapEntry { map, key } => match map.upgrade() {
                Some(map) => map.get(key).unwrap_or(Value::Sentinel(Sentinel::MissingKey)),
                None => Value::Sentinel(Sentinel::Unreadable),
            },
            Accessor::Constant(value) => value.clone(),
        }
    }

    /// Write a value, coercing it to the slot's declared type first.
    ///
    /// Returns `true` if the value was stored. Writes to a non-writable
    /// accessor, a dead owner, a list index past the end or a missing map
    /// key are ignored.
    pub fn set(&self, value: Value) -> bool {
        if !self.can_write() {
            return false;
        }

        match self {
            Accessor::Property { owner, member } | Accessor::Field { owner, member } => {
                let Some(object) = owner.upgrade() else {
                    return false;
                };
                let coerced = coerce(value, &member.ty);
                match object.set(member.name, coerced) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::trace!(target: targets::ACCESSOR, member = member.name, %err, "write rejected");
                        false
                    }
                }
            }
            Accessor::Closure {
                owner,
                setter: Some(setter),
                ..
            } => {
                let Some(owner) = owner.upgrade() else {
                    return false;
                };
                match setter(&owner, value) {
                    Ok(()) => true,
                    Err(err) => {
                        tracing::trace!(target: targets::ACCESSOR, %err, "setter failed");
                        false
                    }
                }
            }
            Accessor::ListItem { list, index } => match list.upgrade() {
                Some(list) => {
                    let coerced = coerce(value, &list.item_type());
                    list.set(*index, coerced)
                }
                None => false,
            },
            Accessor::MapEntry { map, key } => match map.upgrade() {
                Some(map) => {
                    let coerced = coerce(value, &map.value_type());
                    map.replace(key, coerced)
                }
                None => false,
            },
            Accessor::Closure { setter: None, .. } | Accessor::Constant(_) => false,
        }
    }

    /// Whether a write could be stored right now.
    ///
    /// Evaluated at query time, so a container made read-only after the
    /// accessor was created reports `false`.
    pub fn can_write(&self) -> bool {
        match self {
            Accessor::Property { owner, member } | Accessor::Field { owner, member } => {
                member.writable && owner.upgrade().is_some()
            }
            Accessor::Closure { owner, setter, .. } => {
                setter.is_some() && owner.upgrade().is_some()
            }
            Accessor::ListItem { list, .. } => {
                list.upgrade().is_some_and(|list| !list.is_read_only())
            }
            Accessor::MapEntry { map, .. } => map.upgrade().is_some_and(|map| !map.is_read_only()),
            Accessor::Constant(_) => false,
        }
    }

    /// The owning record or container, if it is still alive.
    ///
    /// Constant accessors have no owner.
    pub fn owner(&self) -> Option<Value> {
        match self {
            Accessor::Property { owner, .. } | Accessor::Field { owner, .. } => {
                owner.upgrade().map(Value::Object)
            }
            Accessor::Closure { owner, .. } => owner.upgrade(),
            Accessor::ListItem { list, .. } => list.upgrade().map(Value::List),
            Accessor::MapEntry { map, .. } => map.upgrade().map(Value::Map),
            Accessor::Constant(_) => None,
        }
    }

    /// The type writes are coerced to.
    pub fn declared_type(&self) -> TypeDesc {
        match self {
            Accessor::Property { member, .. } | Accessor::Field { member, .. } => member.ty,
            Accessor::ListItem { list, .. } => list
                .upgrade()
                .map_or(TypeDesc::Any, |list| list.item_type()),
            Accessor::MapEntry { map, .. } => {
                map.upgrade().map_or(TypeDesc::Any, |map| map.value_type())
            }
            Accessor::Closure { .. } | Accessor::Constant(_) => TypeDesc::Any,
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Property { member, .. } => {
                f.debug_tuple("Property").field(&member.name).finish()
            }
            Accessor::Field { member, .. } => f.debug_tuple("Field").field(&member.name).finish(),
            Accessor::Closure { setter, .. } => f
                .debug_struct("Closure")
                .field("writable", &setter.is_some())
                .finish(),
            Accessor::ListItem { index, .. } => f.debug_tuple("ListItem").field(index).finish(),
            Accessor::MapEntry { key, .. } => f.debug_tuple("MapEntry").field(key).finish(),
            Accessor::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
        }
    }
}

static_assertions::assert_impl_all!(Accessor: Send, Sync);
