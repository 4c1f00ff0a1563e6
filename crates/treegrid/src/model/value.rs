//! Dynamic values.
//!
//! [`Value`] is the closed set of shapes the engine understands. Every value
//! answers one capability query, [`Value::kind`], which decides how the walker
//! expands it:
//!
//! | Kind               | Values                                        |
//! |--------------------|-----------------------------------------------|
//! | `Scalar`           | null, numbers, text, dates, uuids, enums, sentinels |
//! | `Map`              | [`MapRef`]                                    |
//! | `KeyValueSequence` | a [`ListRef`] of [`KeyValuePair`]s            |
//! | `Sequence`         | any other [`ListRef`]                         |
//! | `Record`           | [`ObjectRef`], a single [`KeyValuePair`]      |
//!
//! Lists, maps and records are shared, interior-mutable handles. Cloning a
//! `Value` holding one clones the handle, not the contents, and two handles
//! to the same container share one [`Identity`].

use std::fmt;
use std::sync::{Arc, Weak};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use indexmap::IndexMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::coerce::format_duration;
use super::error::ReflectError;
use super::reflect::{MemberDescriptor, MemberKind, Reflect, TypeDesc};

// ============================================================================
// Enumerations
// ============================================================================

/// Static description of an enumeration type.
///
/// ```
/// use treegrid::model::EnumDescriptor;
///
/// static ROLE: EnumDescriptor =
///     EnumDescriptor::new("Role", &[("Intern", 0), ("Engineer", 1), ("Lead", 2)]);
///
/// assert_eq!(ROLE.parse("engineer"), Some(1));
/// assert_eq!(ROLE.value(2).to_string(), "Lead");
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct EnumDescriptor {
    /// The enumeration's type name.
    pub name: &'static str,
    /// `(variant name, ordinal)` pairs in declaration order.
    pub variants: &'static [(&'static str, i64)],
}

impl EnumDescriptor {
    /// Create a descriptor.
    pub const fn new(name: &'static str, variants: &'static [(&'static str, i64)]) -> Self {
        Self { name, variants }
    }

    /// The variant name for an ordinal, if one is declared.
    pub fn variant_name(&self, ordinal: i64) -> Option<&'static str> {
        self.variants
            .iter()
            .find(|(_, o)| *o == ordinal)
            .map(|(name, _)| *name)
    }

    /// Parse a variant name (case-insensitive) or a numeric ordinal.
    pub fn parse(&self, text: &str) -> Option<i64> {
        let text = text.trim();
        self.variants
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(text))
            .map(|(_, ordinal)| *ordinal)
            .or_else(|| text.parse::<i64>().ok())
    }

    /// A value of this enumeration. Undeclared ordinals are allowed.
    pub fn value(&'static self, ordinal: i64) -> EnumValue {
        EnumValue {
            descriptor: self,
            ordinal,
        }
    }

    /// A value by variant name.
    pub fn variant(&'static self, name: &str) -> Option<EnumValue> {
        self.parse(name).map(|ordinal| self.value(ordinal))
    }
}

/// One value of an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub descriptor: &'static EnumDescriptor,
    pub ordinal: i64,
}

impl EnumValue {
    /// The variant name, if the ordinal is declared.
    pub fn name(&self) -> Option<&'static str> {
        self.descriptor.variant_name(self.ordinal)
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.ordinal),
        }
    }
}

// ============================================================================
// Pairs, keys, sentinels
// ============================================================================

/// An immutable key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    pub key: Value,
    pub value: Value,
}

impl KeyValuePair {
    pub fn new(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Keys of a [`MapRef`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    Text(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
}

impl MapKey {
    /// The key as a value.
    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Text(s) => Value::Text(s.clone()),
            MapKey::Int(n) => Value::Int(*n),
            MapKey::Bool(b) => Value::Bool(*b),
            MapKey::Uuid(u) => Value::Uuid(*u),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Text(s) => f.write_str(s),
            MapKey::Int(n) => write!(f, "{}", n),
            MapKey::Bool(b) => write!(f, "{}", b),
            MapKey::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<&str> for MapKey {
    fn from(s: &str) -> Self {
        MapKey::Text(s.to_string())
    }
}

impl From<String> for MapKey {
    fn from(s: String) -> Self {
        MapKey::Text(s)
    }
}

impl From<i64> for MapKey {
    fn from(n: i64) -> Self {
        MapKey::Int(n)
    }
}

impl From<i32> for MapKey {
    fn from(n: i32) -> Self {
        MapKey::Int(n.into())
    }
}

impl From<bool> for MapKey {
    fn from(b: bool) -> Self {
        MapKey::Bool(b)
    }
}

impl From<Uuid> for MapKey {
    fn from(u: Uuid) -> Self {
        MapKey::Uuid(u)
    }
}

/// Placeholder values produced instead of errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// The underlying read failed.
    Unreadable,
    /// A list index past the end.
    OutOfRange,
    /// A map key that is no longer present.
    MissingKey,
    /// A reference already visited during the current walk.
    CircularReference(String),
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentinel::Unreadable => f.write_str("<unreadable>"),
            Sentinel::OutOfRange => f.write_str("<out of range>"),
            Sentinel::MissingKey => f.write_str("<missing key>"),
            Sentinel::CircularReference(type_name) => {
                write!(f, "<circular reference: {}>", type_name)
            }
        }
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Reference identity of a shared container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity(usize);

impl Identity {
    fn of<T: ?Sized>(arc: &Arc<T>) -> Self {
        Self(Arc::as_ptr(arc) as *const () as usize)
    }
}

// ============================================================================
// Lists
// ============================================================================

struct ListData {
    type_name: String,
    item_type: TypeDesc,
    read_only: bool,
    items: Vec<Value>,
}

/// A shared, mutable, ordered list of values.
#[derive(Clone)]
pub struct ListRef(Arc<RwLock<ListData>>);

impl ListRef {
    /// Create an untyped list.
    pub fn new(items: impl IntoIterator<Item = Value>) -> Self {
        Self::typed(TypeDesc::Any, items)
    }

    /// Create a list whose writes must fit `item_type`.
    pub fn typed(item_type: TypeDesc, items: impl IntoIterator<Item = Value>) -> Self {
        Self(Arc::new(RwLock::new(ListData {
            type_name: "List".to_string(),
            item_type,
            read_only: false,
            items: items.into_iter().collect(),
        })))
    }

    /// Set the type name shown for this list.
    pub fn named(self, type_name: impl Into<String>) -> Self {
        self.0.write().type_name = type_name.into();
        self
    }

    /// Mark the list as read-only.
    pub fn read_only(self) -> Self {
        self.set_read_only(true);
        self
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.0.write().read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.0.read().read_only
    }

    pub fn len(&self) -> usize {
        self.0.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().items.is_empty()
    }

    /// The item at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().items.get(index).cloned()
    }

    /// A snapshot of all items.
    pub fn items(&self) -> Vec<Value> {
        self.0.read().items.clone()
    }

    /// Append an item. Used while building data; ignores the read-only flag.
    pub fn push(&self, value: impl Into<Value>) {
        self.0.write().items.push(value.into());
    }

    /// Replace the item at `index`.
    ///
    /// Returns `false` without storing anything if the list is read-only, the
    /// index is past the end, or the value does not fit the item type.
    pub fn set(&self, index: usize, value: Value) -> bool {
        let mut data = self.0.write();
        if data.read_only || !data.item_type.accepts(&value) {
            return false;
        }
        match data.items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn item_type(&self) -> TypeDesc {
        self.0.read().item_type
    }

    pub fn type_name(&self) -> String {
        self.0.read().type_name.clone()
    }

    /// Whether this list is a sequence of key/value pairs.
    pub fn is_pair_sequence(&self) -> bool {
        let data = self.0.read();
        data.item_type == TypeDesc::Pair
            || (!data.items.is_empty() && data.items.iter().all(|v| matches!(v, Value::Pair(_))))
    }

    pub fn identity(&self) -> Identity {
        Identity::of(&self.0)
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakListRef {
        WeakListRef(Arc::downgrade(&self.0))
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read();
        f.debug_struct("ListRef")
            .field("type_name", &data.type_name)
            .field("item_type", &data.item_type)
            .field("len", &data.items.len())
            .field("read_only", &data.read_only)
            .finish()
    }
}

/// Non-owning handle to a [`ListRef`].
#[derive(Clone)]
pub struct WeakListRef(Weak<RwLock<ListData>>);

impl WeakListRef {
    pub fn upgrade(&self) -> Option<ListRef> {
        self.0.upgrade().map(ListRef)
    }
}

impl fmt::Debug for WeakListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakListRef")
    }
}

// ============================================================================
// Maps
// ============================================================================

struct MapData {
    type_name: String,
    value_type: TypeDesc,
    read_only: bool,
    entries: IndexMap<MapKey, Value>,
}

/// A shared, mutable, insertion-ordered map.
#[derive(Clone)]
pub struct MapRef(Arc<RwLock<MapData>>);

impl MapRef {
    /// Create an untyped map.
    pub fn new(entries: impl IntoIterator<Item = (MapKey, Value)>) -> Self {
        Self::typed(TypeDesc::Any, entries)
    }

    /// Create a map whose writes must fit `value_type`.
    pub fn typed(value_type: TypeDesc, entries: impl IntoIterator<Item = (MapKey, Value)>) -> Self {
        Self(Arc::new(RwLock::new(MapData {
            type_name: "Map".to_string(),
            value_type,
            read_only: false,
            entries: entries.into_iter().collect(),
        })))
    }

    /// Set the type name shown for this map.
    pub fn named(self, type_name: impl Into<String>) -> Self {
        self.0.write().type_name = type_name.into();
        self
    }

    /// Mark the map as read-only.
    pub fn read_only(self) -> Self {
        self.set_read_only(true);
        self
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.0.write().read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.0.read().read_only
    }

    pub fn len(&self) -> usize {
        self.0.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().entries.is_empty()
    }

    pub fn get(&self, key: &MapKey) -> Option<Value> {
        self.0.read().entries.get(key).cloned()
    }

    pub fn contains_key(&self, key: &MapKey) -> bool {
        self.0.read().entries.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<MapKey> {
        self.0.read().entries.keys().cloned().collect()
    }

    /// A snapshot of all entries in insertion order.
    pub fn entries(&self) -> Vec<(MapKey, Value)> {
        self.0
            .read()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Insert or overwrite an entry. Used while building data; ignores the
    /// read-only flag.
    pub fn insert(&self, key: impl Into<MapKey>, value: impl Into<Value>) -> Option<Value> {
        self.0.write().entries.insert(key.into(), value.into())
    }

    /// Remove an entry, keeping the order of the others.
    pub fn remove(&self, key: &MapKey) -> Option<Value> {
        self.0.write().entries.shift_remove(key)
    }

    /// Overwrite the value of an existing key.
    ///
    /// Returns `false` without storing anything if the map is read-only, the
    /// key is absent, or the value does not fit the value type.
    pub fn replace(&self, key: &MapKey, value: Value) -> bool {
        let mut data = self.0.write();
        if data.read_only || !data.value_type.accepts(&value) {
            return false;
        }
        match data.entries.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn value_type(&self) -> TypeDesc {
        self.0.read().value_type
    }

    pub fn type_name(&self) -> String {
        self.0.read().type_name.clone()
    }

    pub fn identity(&self) -> Identity {
        Identity::of(&self.0)
    }

    pub fn ptr_eq(&self, other: &MapRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakMapRef {
        WeakMapRef(Arc::downgrade(&self.0))
    }
}

impl fmt::Debug for MapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.read();
        f.debug_struct("MapRef")
            .field("type_name", &data.type_name)
            .field("value_type", &data.value_type)
            .field("len", &data.entries.len())
            .field("read_only", &data.read_only)
            .finish()
    }
}

/// Non-owning handle to a [`MapRef`].
#[derive(Clone)]
pub struct WeakMapRef(Weak<RwLock<MapData>>);

impl WeakMapRef {
    pub fn upgrade(&self) -> Option<MapRef> {
        self.0.upgrade().map(MapRef)
    }
}

impl fmt::Debug for WeakMapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakMapRef")
    }
}

// ============================================================================
// Records
// ============================================================================

/// A shared handle to a [`Reflect`] record.
#[derive(Clone)]
pub struct ObjectRef(Arc<RwLock<dyn Reflect>>);

impl ObjectRef {
    /// Wrap a record.
    pub fn new<T: Reflect>(value: T) -> Self {
        Self(Arc::new(RwLock::new(value)))
    }

    pub fn type_name(&self) -> &'static str {
        self.0.read().type_name()
    }

    /// A copy of the member list.
    pub fn members(&self) -> Vec<MemberDescriptor> {
        self.0.read().members().to_vec()
    }

    pub fn member(&self, name: &str, kind: MemberKind) -> Option<MemberDescriptor> {
        self.0.read().member(name, kind)
    }

    /// Read a member.
    pub fn get(&self, member: &str) -> Result<Value, ReflectError> {
        self.0.read().get(member)
    }

    /// Write a member. No coercion is applied.
    pub fn set(&self, member: &str, value: Value) -> Result<(), ReflectError> {
        self.0.write().set(member, value)
    }

    pub fn read(&self) -> RwLockReadGuard<'_, dyn Reflect> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, dyn Reflect> {
        self.0.write()
    }

    /// Borrow the record as its concrete type.
    ///
    /// Returns `None` if the record is not a `T`.
    pub fn with<T: Reflect, R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let guard = self.0.read();
        let any: &dyn std::any::Any = &*guard;
        any.downcast_ref::<T>().map(f)
    }

    /// Mutably borrow the record as its concrete type.
    pub fn with_mut<T: Reflect, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut guard = self.0.write();
        let any: &mut dyn std::any::Any = &mut *guard;
        any.downcast_mut::<T>().map(f)
    }

    pub fn identity(&self) -> Identity {
        Identity::of(&self.0)
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// A non-owning handle.
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef(Arc::downgrade(&self.0))
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRef")
            .field("type_name", &self.type_name())
            .field("identity", &self.identity())
            .finish()
    }
}

/// Non-owning handle to an [`ObjectRef`].
#[derive(Clone)]
pub struct WeakObjectRef(Weak<RwLock<dyn Reflect>>);

impl WeakObjectRef {
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.0.upgrade().map(ObjectRef)
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakObjectRef")
    }
}

// ============================================================================
// Value
// ============================================================================

/// How a value is expanded into children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Never expanded.
    Scalar,
    /// One child per entry, named `[key]`.
    Map,
    /// One child per pair, named `[key]`.
    KeyValueSequence,
    /// One child per element, named `[index]`.
    Sequence,
    /// One child per readable member.
    Record,
}

/// A dynamically typed value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Text(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(TimeDelta),
    Uuid(Uuid),
    Enum(EnumValue),
    Pair(Arc<KeyValuePair>),
    List(ListRef),
    Map(MapRef),
    Object(ObjectRef),
    Sentinel(Sentinel),
}

impl Value {
    /// Build a pair value.
    pub fn pair(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Value::Pair(Arc::new(KeyValuePair::new(key, value)))
    }

    /// Classify the value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Map(_) => ValueKind::Map,
            Value::List(list) if list.is_pair_sequence() => ValueKind::KeyValueSequence,
            Value::List(_) => ValueKind::Sequence,
            Value::Object(_) | Value::Pair(_) => ValueKind::Record,
            _ => ValueKind::Scalar,
        }
    }

    /// Whether the value is a scalar that is never expanded.
    pub fn is_leaf(&self) -> bool {
        self.kind() == ValueKind::Scalar
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Value::Sentinel(_))
    }

    /// Reference identity for shared containers; `None` for everything else.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Value::List(list) => Some(list.identity()),
            Value::Map(map) => Some(map.identity()),
            Value::Object(object) => Some(object.identity()),
            _ => None,
        }
    }

    /// The runtime type name.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "i64".to_string(),
            Value::UInt(_) => "u64".to_string(),
            Value::Float(_) => "f64".to_string(),
            Value::Char(_) => "char".to_string(),
            Value::Text(_) => "String".to_string(),
            Value::DateTime(_) => "DateTime".to_string(),
            Value::Date(_) => "Date".to_string(),
            Value::Time(_) => "Time".to_string(),
            Value::Duration(_) => "Duration".to_string(),
            Value::Uuid(_) => "Uuid".to_string(),
            Value::Enum(value) => value.descriptor.name.to_string(),
            Value::Pair(_) => "KeyValuePair".to_string(),
            Value::List(list) => list.type_name(),
            Value::Map(map) => map.type_name(),
            Value::Object(object) => object.type_name().to_string(),
            Value::Sentinel(_) => "Sentinel".to_string(),
        }
    }

    /// Text for a cell.
    ///
    /// Scalars show their value, lists and maps show `Name[count]`, records
    /// show their type name and null shows `<null>`.
    pub fn display_text(&self) -> String {
        self.to_string()
    }

    /// Read a member of a record value.
    pub fn member(&self, name: &str) -> Result<Value, ReflectError> {
        match self {
            Value::Object(object) => object.get(name),
            Value::Pair(pair) if name == "Key" => Ok(pair.key.clone()),
            Value::Pair(pair) if name == "Value" => Ok(pair.value.clone()),
            other => Err(ReflectError::unknown_member(other.type_name(), name)),
        }
    }

    /// A non-owning handle to this value.
    pub fn downgrade(&self) -> WeakValue {
        match self {
            Value::List(list) => WeakValue::List(list.downgrade()),
            Value::Map(map) => WeakValue::Map(map.downgrade()),
            Value::Object(object) => WeakValue::Object(object.downgrade()),
            other => WeakValue::Plain(other.clone()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            Value::UInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<TimeDelta> {
        match self {
            Value::Duration(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Value::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<EnumValue> {
        match self {
            Value::Enum(e) => Some(*e),
            _ => None,
        }
    }

    pub fn as_pair(&self) -> Option<&KeyValuePair> {
        match self {
            Value::Pair(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_sentinel(&self) -> Option<&Sentinel> {
        match self {
            Value::Sentinel(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("<null>"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::UInt(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::Text(s) => f.write_str(s),
            Value::DateTime(dt) => write!(f, "{}", dt),
            Value::Date(d) => write!(f, "{}", d),
            Value::Time(t) => write!(f, "{}", t),
            Value::Duration(d) => f.write_str(&format_duration(*d)),
            Value::Uuid(u) => write!(f, "{}", u),
            Value::Enum(e) => write!(f, "{}", e),
            Value::Pair(p) => write!(f, "[{}, {}]", p.key, p.value),
            Value::List(l) => write!(f, "{}[{}]", l.type_name(), l.len()),
            Value::Map(m) => write!(f, "{}[{}]", m.type_name(), m.len()),
            Value::Object(o) => f.write_str(o.type_name()),
            Value::Sentinel(s) => write!(f, "{}", s),
        }
    }
}

/// Scalars compare by value; lists, maps and records by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::UInt(a), Value::UInt(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Pair(a), Value::Pair(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Sentinel(a), Value::Sentinel(b)) => a == b,
            _ => false,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => UInt,
    u64 => UInt,
    f32 => Float,
    f64 => Float,
    char => Char,
    &str => Text,
    String => Text,
    NaiveDateTime => DateTime,
    NaiveDate => Date,
    NaiveTime => Time,
    TimeDelta => Duration,
    Uuid => Uuid,
    EnumValue => Enum,
    KeyValuePair => Pair,
    ListRef => List,
    MapRef => Map,
    ObjectRef => Object,
    Sentinel => Sentinel,
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::UInt(value as u64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A non-owning handle to a [`Value`].
///
/// Shared containers are held weakly; everything else is copied.
#[derive(Debug, Clone)]
pub enum WeakValue {
    List(WeakListRef),
    Map(WeakMapRef),
    Object(WeakObjectRef),
    Plain(Value),
}

impl WeakValue {
    /// The value, or `None` if the container was dropped.
    pub fn upgrade(&self) -> Option<Value> {
        match self {
            WeakValue::List(list) => list.upgrade().map(Value::List),
            WeakValue::Map(map) => map.upgrade().map(Value::Map),
            WeakValue::Object(object) => object.upgrade().map(Value::Object),
            WeakValue::Plain(value) => Some(value.clone()),
        }
    }
}

static_assertions::assert_impl_all!(Value: Send, Sync);
