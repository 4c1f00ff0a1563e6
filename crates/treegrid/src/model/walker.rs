//! Object-graph walker.
//!
//! [`parse_object`] turns any [`Value`] into a tree of [`GenericNode`]s, one
//! per reachable slot. Composite values are expanded eagerly, in this order
//! of precedence:
//!
//! 1. maps: one child per entry, named `[key]`
//! 2. key/value sequences: one child per pair, named `[key]`
//! 3. other lists: one child per element, named `[index]`
//! 4. records: one child per readable property in declaration order, then
//!    one per readable field
//!
//! Leaves are decided from the runtime value a slot holds, not from its
//! declared type. A shared container reached a second time during one walk
//! becomes a childless node reading `<circular reference: Type>`.

use std::collections::HashSet;
use std::sync::Arc;

use treegrid_core::logging::{DebugTree, PerfSpan, targets};

use super::accessor::Accessor;
use super::data_source::TreeListDataSource;
use super::reflect::MemberKind;
use super::value::{Identity, Sentinel, Value, ValueKind};

/// Options for [`ObjectWalker`].
#[derive(Debug, Clone)]
pub struct WalkerOptions {
    /// List readable fields after properties when expanding records.
    pub include_fields: bool,
}

impl Default for WalkerOptions {
    fn default() -> Self {
        Self {
            include_fields: true,
        }
    }
}

impl WalkerOptions {
    /// Set whether fields are listed.
    pub fn include_fields(mut self, include: bool) -> Self {
        self.include_fields = include;
        self
    }
}

/// One slot of a walked object graph.
#[derive(Debug)]
pub struct GenericNode {
    name: String,
    accessor: Accessor,
    /// The value read when the node was built. Holds computed owners alive
    /// for the weak accessors of the children.
    snapshot: Value,
    children: Vec<Arc<GenericNode>>,
}

impl GenericNode {
    /// The slot name: a member name, `[index]`, `[key]` or the root type.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    pub fn children(&self) -> &[Arc<GenericNode>] {
        &self.children
    }

    /// The value the slot held when the tree was built.
    pub fn snapshot(&self) -> &Value {
        &self.snapshot
    }

    /// The slot's current value.
    pub fn value(&self) -> Value {
        self.accessor.get()
    }

    /// Write the slot. Returns `true` if the value was stored.
    pub fn set_value(&self, value: impl Into<Value>) -> bool {
        self.accessor.set(value.into())
    }

    pub fn can_write(&self) -> bool {
        self.accessor.can_write()
    }

    /// Whether the slot currently holds a scalar.
    pub fn is_leaf(&self) -> bool {
        self.value().is_leaf()
    }

    /// Text for the value cell.
    pub fn display_value(&self) -> String {
        self.value().display_text()
    }

    /// Find a descendant by a path of child names.
    ///
    /// ```
    /// use treegrid::model::{ListRef, Value, parse_object};
    ///
    /// let root = parse_object(&Value::from(ListRef::new([Value::Int(1), Value::Int(2)])));
    /// assert_eq!(root.find(&["[1]"]).map(|n| n.value()), Some(Value::Int(2)));
    /// ```
    pub fn find(&self, path: &[&str]) -> Option<&GenericNode> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        self.children
            .iter()
            .find(|child| child.name == *first)
            .and_then(|child| child.find(rest))
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Wrap this tree as the single root of a flattening data source.
    pub fn into_data_source(self) -> TreeListDataSource<Arc<GenericNode>> {
        TreeListDataSource::builder(|node: &Arc<GenericNode>| Some(node.children.clone()))
            .roots([Arc::new(self)])
            .build()
    }
}

impl DebugTree for GenericNode {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn details(&self) -> Option<String> {
        Some(self.display_value())
    }

    fn debug_children(&self) -> Vec<&Self> {
        self.children.iter().map(|c| c.as_ref()).collect()
    }
}

/// Builds [`GenericNode`] trees.
#[derive(Debug, Clone, Default)]
pub struct ObjectWalker {
    options: WalkerOptions,
}

impl ObjectWalker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: WalkerOptions) -> Self {
        Self { options }
    }

    /// Walk `root` and return its tree.
    ///
    /// The root is named after its runtime type, or `Root (null)` for null,
    /// and is read through a constant accessor.
    pub fn parse(&self, root: &Value) -> GenericNode {
        let _span = PerfSpan::new("parse_object");
        let name = if root.is_null() {
            "Root (null)".to_string()
        } else {
            root.type_name()
        };

        let mut visited = HashSet::new();
        let node = self.build_node(name, Accessor::constant(root.clone()), &mut visited);
        tracing::debug!(
            target: targets::WALKER,
            root = %node.name,
            nodes = node.node_count(),
            "parsed object graph"
        );
        node
    }

    fn build_node(
        &self,
        name: String,
        accessor: Accessor,
        visited: &mut HashSet<Identity>,
    ) -> GenericNode {
        let value = accessor.get();
        if value.is_leaf() {
            return GenericNode {
                name,
                accessor,
                snapshot: value,
                children: Vec::new(),
            };
        }

        if let Some(identity) = value.identity() {
            if !visited.insert(identity) {
                let type_name = value.type_name();
                tracing::trace!(target: targets::WALKER, %name, %type_name, "circular reference");
                let marker = Value::Sentinel(Sentinel::CircularReference(type_name));
                return GenericNode {
                    name,
                    accessor: Accessor::Constant(marker.clone()),
                    snapshot: marker,
                    children: Vec::new(),
                };
            }
        }

        let children = self.build_children(&value, visited);
        GenericNode {
            name,
            accessor,
            snapshot: value,
            children,
        }
    }

    fn build_children(&self, value: &Value, visited: &mut HashSet<Identity>) -> Vec<Arc<GenericNode>> {
        let mut children = Vec::new();
        match (value.kind(), value) {
            (ValueKind::Map, Value::Map(map)) => {
                for key in map.keys() {
                    let name = format!("[{}]", key);
                    children.push(self.build_node(name, Accessor::map_entry(map, key), visited));
                }
            }
            (ValueKind::KeyValueSequence, Value::List(list)) => {
                for (index, item) in list.items().into_iter().enumerate() {
                    match item {
                        Value::Pair(pair) => {
                            let name = format!("[{}]", key_text(&pair.key));
                            let accessor = Accessor::constant(pair.value.clone());
                            children.push(self.build_node(name, accessor, visited));
                        }
                        _ => {
                            let name = format!("[{}]", index);
                            children.push(self.build_node(
                                name,
                                Accessor::list_item(list, index),
                                visited,
                            ));
                        }
                    }
                }
            }
            (ValueKind::Sequence, Value::List(list)) => {
                for index in 0..list.len() {
                    let name = format!("[{}]", index);
                    children.push(self.build_node(name, Accessor::list_item(list, index), visited));
                }
            }
            (ValueKind::Record, Value::Pair(pair)) => {
                children.push(self.build_node("Key".into(), Accessor::constant(pair.key.clone()), visited));
                children.push(self.build_node(
                    "Value".into(),
                    Accessor::constant(pair.value.clone()),
                    visited,
                ));
            }
            (ValueKind::Record, Value::Object(object)) => {
                let members = object.members();
                let properties = members.iter().filter(|m| m.kind == MemberKind::Property);
                let fields = members
                    .iter()
                    .filter(|m| self.options.include_fields && m.kind == MemberKind::Field);
                for member in properties.chain(fields).filter(|m| m.readable) {
                    children.push(self.build_node(
                        member.name.to_string(),
                        Accessor::member(object, *member),
                        visited,
                    ));
                }
            }
            _ => {}
        }
        children.into_iter().map(Arc::new).collect()
    }
}

fn key_text(key: &Value) -> String {
    match key {
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Walk `root` with default options.
///
/// ```
/// use treegrid::model::{MapKey, MapRef, Value, parse_object};
///
/// let map = MapRef::new([
///     (MapKey::from("a"), Value::Int(1)),
///     (MapKey::from("b"), Value::from("two")),
/// ]);
/// let root = parse_object(&Value::from(map));
///
/// let names: Vec<&str> = root.children().iter().map(|c| c.name()).collect();
/// assert_eq!(names, ["[a]", "[b]"]);
/// ```
pub fn parse_object(root: &Value) -> GenericNode {
    ObjectWalker::new().parse(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::error::ReflectError;
    use crate::model::reflect::{MemberDescriptor, Reflect, TypeDesc};
    use crate::model::value::{EnumDescriptor, ListRef, MapKey, MapRef, ObjectRef};

    struct Link {
        label: String,
        next: Option<ObjectRef>,
        hits: i64,
    }

    static LINK_MEMBERS: &[MemberDescriptor] = &[
        MemberDescriptor::field("hits", TypeDesc::Int),
        MemberDescriptor::property("Label", TypeDesc::Text),
        MemberDescriptor::property("Next", TypeDesc::Record("Link")),
        MemberDescriptor::property("Secret", TypeDesc::Text).write_only(),
    ];

    impl Reflect for Link {
        fn type_name(&self) -> &'static str {
            "Link"
        }

        fn members(&self) -> &[MemberDescriptor] {
            LINK_MEMBERS
        }

        fn get(&self, member: &str) -> Result<Value, ReflectError> {
            match member {
                "Label" => Ok(self.label.clone().into()),
                "Next" => Ok(self.next.clone().into()),
                "hits" => Ok(self.hits.into()),
                _ => Err(ReflectError::unknown_member("Link", member)),
            }
        }

        fn set(&mut self, member: &str, value: Value) -> Result<(), ReflectError> {
            match (member, value) {
                ("Label", Value::Text(s)) => self.label = s,
                ("hits", Value::Int(n)) => self.hits = n,
                (member, value) => {
                    return Err(ReflectError::type_mismatch(member, "member type", value.type_name()));
                }
            }
            Ok(())
        }
    }

    fn link(label: &str) -> ObjectRef {
        ObjectRef::new(Link {
            label: label.into(),
            next: None,
            hits: 0,
        })
    }

    fn names(node: &GenericNode) -> Vec<&str> {
        node.children().iter().map(|c| c.name()).collect()
    }

    static SHADE: EnumDescriptor = EnumDescriptor::new("Shade", &[("Light", 0), ("Dark", 1)]);

    #[test]
    fn test_leaf_classification() {
        let leaves = [
            Value::Int(42),
            Value::from("x"),
            Value::Bool(true),
            Value::Float(3.25),
            Value::Enum(SHADE.value(1)),
            Value::Null,
        ];
        for value in leaves {
            let node = parse_object(&value);
            assert!(node.is_leaf(), "{:?} should be a leaf", value);
            assert!(node.children().is_empty());
        }
    }

    #[test]
    fn test_composite_child_counts() {
        let list = ListRef::new([Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(names(&parse_object(&list.into())), ["[0]", "[1]", "[2]"]);

        let map = MapRef::new([
            (MapKey::from("x"), Value::Int(1)),
            (MapKey::from(7), Value::Int(2)),
        ]);
        assert_eq!(names(&parse_object(&map.into())), ["[x]", "[7]"]);

        let record = parse_object(&link("a").into());
        assert_eq!(names(&record), ["Label", "Next", "hits"]);
    }

    #[test]
    fn test_root_names() {
        assert_eq!(parse_object(&Value::Null).name(), "Root (null)");
        assert_eq!(parse_object(&link("a").into()).name(), "Link");
        assert_eq!(parse_object(&Value::Int(1)).name(), "i64");
    }

    #[test]
    fn test_fields_can_be_excluded() {
        let walker = ObjectWalker::with_options(WalkerOptions::default().include_fields(false));
        let record = walker.parse(&link("a").into());
        assert_eq!(names(&record), ["Label", "Next"]);
    }

    #[test]
    fn test_self_reference_terminates() {
        let a = link("a");
        a.with_mut(|l: &mut Link| l.next = Some(a.clone()));

        let root = parse_object(&a.clone().into());
        let next = root.find(&["Next"]).unwrap();
        assert!(next.children().is_empty());
        assert_eq!(next.display_value(), "<circular reference: Link>");
        assert_eq!(root.node_count(), 4);

        // Break the cycle so the test does not leak.
        a.with_mut(|l: &mut Link| l.next = None);
    }

    #[test]
    fn test_key_value_sequence() {
        let pairs = ListRef::new([Value::pair("alpha", 1), Value::pair(Value::Null, 2)]);
        let root = parse_object(&pairs.into());
        assert_eq!(names(&root), ["[alpha]", "[null]"]);
        assert_eq!(root.children()[1].value(), Value::Int(2));
        assert!(!root.children()[0].can_write());
    }

    #[test]
    fn test_pair_expands_to_key_and_value() {
        let root = parse_object(&Value::pair("k", 5));
        assert_eq!(names(&root), ["Key", "Value"]);
    }

    #[test]
    fn test_write_through_node() {
        let list = ListRef::typed(TypeDesc::Int, [Value::Int(1)]);
        let root = parse_object(&list.clone().into());
        let item = root.find(&["[0]"]).unwrap();
        assert!(item.set_value("8"));
        assert_eq!(list.get(0), Some(Value::Int(8)));
        assert!(!root.can_write());
    }

    #[test]
    fn test_debug_tree_output() {
        let list = ListRef::new([Value::Int(1)]).named("Numbers");
        let root = parse_object(&list.into());
        let text = treegrid_core::TreeDebug::new().format(&root);
        assert!(text.starts_with("Numbers (Numbers[1])\n"));
        assert!(text.contains("[0] (1)"));
    }

    struct Point {
        x: i64,
    }

    static POINT_MEMBERS: &[MemberDescriptor] = &[MemberDescriptor::property("X", TypeDesc::Int)];

    impl Reflect for Point {
        fn type_name(&self) -> &'static str {
            "Point"
        }

        fn members(&self) -> &[MemberDescriptor] {
            POINT_MEMBERS
        }

        fn get(&self, member: &str) -> Result<Value, ReflectError> {
            match member {
                "X" => Ok(self.x.into()),
                _ => Err(ReflectError::unknown_member("Point", member)),
            }
        }

        fn set(&mut self, member: &str, value: Value) -> Result<(), ReflectError> {
            match (member, value) {
                ("X", Value::Int(x)) => {
                    self.x = x;
                    Ok(())
                }
                (member, value) => Err(ReflectError::type_mismatch(member, "i64", value.type_name())),
            }
        }
    }

    /// Builds a fresh `Point` on every read of `Start` and `End`.
    struct Segment;

    static SEGMENT_MEMBERS: &[MemberDescriptor] = &[
        MemberDescriptor::property("Start", TypeDesc::Record("Point")).read_only(),
        MemberDescriptor::property("End", TypeDesc::Record("Point")).read_only(),
    ];

    impl Reflect for Segment {
        fn type_name(&self) -> &'static str {
            "Segment"
        }

        fn members(&self) -> &[MemberDescriptor] {
            SEGMENT_MEMBERS
        }

        fn get(&self, member: &str) -> Result<Value, ReflectError> {
            match member {
                "Start" => Ok(ObjectRef::new(Point { x: 1 }).into()),
                "End" => Ok(ObjectRef::new(Point { x: 2 }).into()),
                _ => Err(ReflectError::unknown_member("Segment", member)),
            }
        }

        fn set(&mut self, member: &str, _value: Value) -> Result<(), ReflectError> {
            Err(ReflectError::read_only(member))
        }
    }

    #[test]
    fn test_computed_members_stay_readable() {
        let root = parse_object(&ObjectRef::new(Segment).into());

        let start_x = root.find(&["Start", "X"]).unwrap();
        assert_eq!(start_x.value(), Value::Int(1));
        assert_eq!(root.find(&["End", "X"]).unwrap().value(), Value::Int(2));
        assert_eq!(root.find(&["Start"]).unwrap().snapshot().type_name(), "Point");

        // Writes land in the point the tree was built from.
        assert!(start_x.set_value("7"));
        assert_eq!(start_x.value(), Value::Int(7));
    }
}
