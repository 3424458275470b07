//! Lazily materialized tree model over a nested value.
//!
//! `ValueTreeModel<T>` shows a record as a two-column `Name`/`Value` tree.
//! Records expand into their visible fields and sequences into their
//! elements; byte buffers, scalars and null indirections are leaves.
//!
//! # Materialization
//!
//! Nothing is traversed up front. A node's child slots are allocated the
//! first time its row count is asked for, and each child node is created the
//! first time its coordinates are indexed. Nodes live in an arena and are
//! never moved or evicted, so the arena key stored in a [`ModelIndex`] keeps
//! naming the same node until [`ItemModel::invalidate`] is called.
//!
//! Nodes store their name and position, not their value. A node's value is
//! found again by walking its row path down from the wrapped root, so
//! mutations of the wrapped value show up in leaf values immediately. Cached
//! structure (child counts and names) only changes after `invalidate()`.

use std::fmt::Write as _;

use parking_lot::RwLock;
use slotmap::{new_key_type, Key, KeyData, SlotMap};
use tracing::{debug, trace};

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::{shared, ItemModel, Orientation, SharedValue};
use super::{classify_root, RootShape};
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::reflect::{count_visible_fields, normalize, record_field, Reflect, ValueRef};
use crate::variant::to_variant;

/// Column showing a node's field name or element position.
const NAME_COLUMN: usize = 0;
/// Column showing a node's displayable value.
const VALUE_COLUMN: usize = 1;
const HEADERS: [&str; 2] = ["Name", "Value"];

new_key_type! {
    /// Arena key of a tree node.
    struct NodeId;
}

impl NodeId {
    /// Returns the raw 64-bit representation stored in model indices.
    fn as_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Reconstructs a key from its raw representation.
    fn from_raw(raw: u64) -> Self {
        Self::from(KeyData::from_ffi(raw))
    }
}

/// One position in the tree.
struct TreeNode {
    /// Field name; empty for sequence elements.
    name: &'static str,
    parent: Option<NodeId>,
    /// Row among the parent's children.
    row: usize,
    /// `None` until the node is expanded; afterwards one slot per child.
    children: Option<Vec<Option<NodeId>>>,
}

impl TreeNode {
    fn root() -> Self {
        Self {
            name: "",
            parent: None,
            row: 0,
            children: None,
        }
    }
}

struct TreeStorage {
    nodes: SlotMap<NodeId, TreeNode>,
    root: NodeId,
}

impl TreeStorage {
    fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(TreeNode::root());
        Self { nodes, root }
    }

    /// Drops every node and starts over from a fresh root.
    ///
    /// Clearing bumps slot versions, so keys handed out before the reset
    /// never resolve to the nodes created after it.
    fn reset(&mut self) {
        self.nodes.clear();
        self.root = self.nodes.insert(TreeNode::root());
    }

    /// Rows leading from the root to `id`.
    fn path_of(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(id)?;
        while let Some(parent) = current.parent {
            path.push(current.row);
            current = self.nodes.get(parent)?;
        }
        path.reverse();
        Some(path)
    }

    /// Builds the index of `id` with column 0, parents included.
    fn index_of(&self, id: NodeId) -> ModelIndex {
        let Some(node) = self.nodes.get(id) else {
            return ModelIndex::invalid();
        };
        match node.parent {
            None => ModelIndex::invalid(),
            Some(parent) => ModelIndex::with_internal_id(
                node.row,
                NAME_COLUMN,
                self.index_of(parent),
                id.as_raw(),
            ),
        }
    }
}

/// Number of children a normalized value expands into.
fn child_count(value: ValueRef<'_>) -> usize {
    match value {
        ValueRef::Seq(seq) if !seq.is_bytes() => seq.len(),
        ValueRef::Record(record) => count_visible_fields(record.record_info()),
        _ => 0,
    }
}

/// Name and normalized value of the child at `row`.
fn child_at(value: ValueRef<'_>, row: usize) -> Option<(&'static str, ValueRef<'_>)> {
    match value {
        ValueRef::Seq(seq) if !seq.is_bytes() => {
            seq.get(row).map(|element| ("", normalize(element.reflect())))
        }
        ValueRef::Record(record) => {
            record_field(record, row).map(|field| (field.name, normalize(field.value)))
        }
        _ => None,
    }
}

/// Follows a row path down from a root value.
fn resolve<'a>(root: ValueRef<'a>, path: &[usize]) -> Option<ValueRef<'a>> {
    path.iter().try_fold(normalize(root), |current, &row| {
        child_at(current, row).map(|(_, value)| value)
    })
}

/// A lazy two-column tree over a record.
///
/// # Example
///
/// ```
/// use lattice_lens::Reflect;
/// use lattice_lens::model::{ItemData, ItemModel, ItemRole, ModelIndex, ValueTreeModel};
///
/// #[derive(Reflect)]
/// struct Config {
///     name: String,
///     ports: Vec<u16>,
/// }
///
/// let model = ValueTreeModel::from_value(Config {
///     name: "server".into(),
///     ports: vec![80, 443],
/// })
/// .unwrap();
///
/// let root = ModelIndex::invalid();
/// assert_eq!(model.row_count(&root), 2);
///
/// let ports = model.index(1, 0, &root);
/// assert_eq!(model.display_text(&ports), Some("ports".into()));
/// assert_eq!(model.row_count(&ports), 2);
///
/// let second = model.index(1, 0, &ports);
/// assert_eq!(model.display_text(&second), Some("[1]".into()));
/// let value = model.index(1, 1, &ports);
/// assert_eq!(model.data(&value, ItemRole::Display), ItemData::UInt(443));
/// assert_eq!(model.parent(&second), ports);
/// ```
pub struct ValueTreeModel<T> {
    value: SharedValue<T>,
    storage: RwLock<TreeStorage>,
}

impl<T: Reflect> ValueTreeModel<T> {
    /// Creates a tree model over a shared record.
    ///
    /// Fails with [`Error::NotApplicable`] unless the value is a record
    /// (possibly behind indirections).
    pub fn new(value: SharedValue<T>) -> Result<Self> {
        let record = match classify_root(&*value.read()) {
            RootShape::Record(info) => info,
            other => {
                return Err(Error::not_applicable(
                    "ValueTreeModel",
                    "a record",
                    other.describe(),
                ));
            }
        };

        debug!(target: targets::TREE, record = record.type_name, "created tree model");
        Ok(Self {
            value,
            storage: RwLock::new(TreeStorage::new()),
        })
    }

    /// Creates a tree model that owns its record.
    pub fn from_value(value: T) -> Result<Self> {
        Self::new(shared(value))
    }

    /// Returns the shared handle to the wrapped record.
    pub fn value(&self) -> &SharedValue<T> {
        &self.value
    }

    /// Number of nodes created so far, the root included.
    pub fn materialized_count(&self) -> usize {
        self.storage.read().nodes.len()
    }

    /// Renders the materialized part of the tree, one node per line.
    ///
    /// Unexpanded nodes are marked with `+`.
    pub fn debug_tree(&self) -> String {
        let storage = self.storage.read();
        let mut out = String::new();
        let mut stack = vec![(storage.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = storage.nodes.get(id) else {
                continue;
            };
            let marker = if node.children.is_none() { "+" } else { "-" };
            let label = match (node.parent, node.name) {
                (None, _) => "<root>".to_string(),
                (Some(_), "") => format!("[{}]", node.row),
                (Some(_), name) => name.to_string(),
            };
            let _ = writeln!(out, "{:indent$}{marker} {label}", "", indent = depth * 2);
            if let Some(children) = &node.children {
                stack.extend(children.iter().rev().flatten().map(|&child| (child, depth + 1)));
            }
        }
        out
    }

    /// The node a parent index refers to; the root for an invalid index.
    fn node_for(&self, storage: &TreeStorage, parent: &ModelIndex) -> Option<NodeId> {
        if !parent.is_valid() {
            return Some(storage.root);
        }
        let id = NodeId::from_raw(parent.internal_id());
        storage.nodes.contains_key(id).then_some(id)
    }

    /// Allocates the child slots of `id` if it has not been expanded yet.
    /// Returns the number of slots.
    fn expand(&self, storage: &mut TreeStorage, id: NodeId) -> usize {
        if let Some(children) = storage.nodes.get(id).and_then(|node| node.children.as_ref()) {
            return children.len();
        }

        let width = storage
            .path_of(id)
            .and_then(|path| {
                let value = self.value.read();
                resolve(value.reflect(), &path).map(child_count)
            })
            .unwrap_or(0);
        if let Some(node) = storage.nodes.get_mut(id) {
            node.children = Some(vec![None; width]);
        }
        trace!(target: targets::TREE, node = ?id, width, "expanded node");
        width
    }

    /// Returns the child in slot `row` of `parent`, creating it on first use.
    fn child(&self, storage: &mut TreeStorage, parent: NodeId, row: usize) -> Option<NodeId> {
        if row >= self.expand(storage, parent) {
            return None;
        }
        if let Some(existing) = storage
            .nodes
            .get(parent)
            .and_then(|node| node.children.as_ref())
            .and_then(|children| children.get(row).copied().flatten())
        {
            return Some(existing);
        }

        let mut path = storage.path_of(parent)?;
        let name = {
            let value = self.value.read();
            let parent_value = resolve(value.reflect(), &path)?;
            child_at(parent_value, row)?.0
        };

        let id = storage.nodes.insert(TreeNode {
            name,
            parent: Some(parent),
            row,
            children: None,
        });
        let slot = storage
            .nodes
            .get_mut(parent)
            .and_then(|node| node.children.as_mut())
            .and_then(|children| children.get_mut(row));
        if let Some(slot) = slot {
            *slot = Some(id);
        }
        path.push(row);
        trace!(target: targets::TREE, node = ?id, ?path, name, "materialized node");
        Some(id)
    }

    fn display(&self, storage: &TreeStorage, index: &ModelIndex) -> ItemData {
        let id = NodeId::from_raw(index.internal_id());
        let Some(node) = storage.nodes.get(id) else {
            return ItemData::None;
        };
        match index.column() {
            NAME_COLUMN if node.name.is_empty() => ItemData::String(format!("[{}]", node.row)),
            NAME_COLUMN => ItemData::from(node.name),
            VALUE_COLUMN => {
                let Some(path) = storage.path_of(id) else {
                    return ItemData::None;
                };
                let value = self.value.read();
                resolve(value.reflect(), &path)
                    .map(|v| to_variant(v).into())
                    .unwrap_or_default()
            }
            _ => ItemData::None,
        }
    }
}

impl<T: Reflect> ItemModel for ValueTreeModel<T> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        {
            let storage = self.storage.read();
            let Some(id) = self.node_for(&storage, parent) else {
                return 0;
            };
            if let Some(children) = storage.nodes.get(id).and_then(|node| node.children.as_ref()) {
                return children.len();
            }
        }

        let mut storage = self.storage.write();
        match self.node_for(&storage, parent) {
            Some(id) => self.expand(&mut storage, id),
            None => 0,
        }
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        HEADERS.len()
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() || !role.is_display() {
            return ItemData::None;
        }
        let storage = self.storage.read();
        self.display(&storage, index)
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column != NAME_COLUMN && column != VALUE_COLUMN {
            return ModelIndex::invalid();
        }

        let mut storage = self.storage.write();
        let Some(parent_id) = self.node_for(&storage, parent) else {
            return ModelIndex::invalid();
        };
        match self.child(&mut storage, parent_id, row) {
            Some(id) => ModelIndex::with_internal_id(row, column, parent.clone(), id.as_raw()),
            None => ModelIndex::invalid(),
        }
    }

    /// Returns the parent the handle was created under when it still names
    /// the node's parent, so `parent(index(r, c, p)) == p` for any column of
    /// `p`. Otherwise the parent is rebuilt in its column-0 form.
    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        let storage = self.storage.read();
        let id = NodeId::from_raw(index.internal_id());
        let Some(parent) = storage.nodes.get(id).and_then(|node| node.parent) else {
            return ModelIndex::invalid();
        };
        let carried = index.parent();
        if carried.is_valid() && carried.internal_id() == parent.as_raw() {
            carried
        } else {
            storage.index_of(parent)
        }
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if !role.is_display() {
            return ItemData::None;
        }
        match orientation {
            Orientation::Horizontal => HEADERS
                .get(section)
                .map(|&header| ItemData::from(header))
                .unwrap_or_default(),
            Orientation::Vertical => ItemData::Int(section as i64),
        }
    }

    fn invalidate(&self) {
        let mut storage = self.storage.write();
        let dropped = storage.nodes.len();
        storage.reset();
        debug!(target: targets::TREE, dropped, "invalidated tree model");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reflect;

    #[derive(Reflect)]
    struct Leaf {
        label: String,
        weight: f64,
    }

    #[derive(Reflect)]
    struct Root {
        title: String,
        #[lens(rename = "Items")]
        items: Vec<Leaf>,
        blob: Vec<u8>,
        #[lens(skip)]
        #[allow(dead_code)]
        hidden: u32,
        next: Option<Box<Leaf>>,
        missing: Option<Box<Leaf>>,
    }

    fn sample() -> Root {
        Root {
            title: "catalog".into(),
            items: vec![
                Leaf {
                    label: "a".into(),
                    weight: 1.0,
                },
                Leaf {
                    label: "b".into(),
                    weight: 2.5,
                },
            ],
            blob: vec![104, 105],
            hidden: 7,
            next: Some(Box::new(Leaf {
                label: "n".into(),
                weight: 0.0,
            })),
            missing: None,
        }
    }

    fn text(model: &impl ItemModel, index: &ModelIndex) -> ItemData {
        model.data(index, ItemRole::Display)
    }

    #[test]
    fn test_root_rows_and_columns() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();
        assert_eq!(model.row_count(&root), 5);
        assert_eq!(model.column_count(&root), 2);
        assert_eq!(
            model.header_data(0, Orientation::Horizontal, ItemRole::Display),
            ItemData::from("Name")
        );
        assert_eq!(
            model.header_data(1, Orientation::Horizontal, ItemRole::Display),
            ItemData::from("Value")
        );
        assert_eq!(
            model.header_data(2, Orientation::Horizontal, ItemRole::Display),
            ItemData::None
        );
        assert_eq!(
            model.header_data(4, Orientation::Vertical, ItemRole::Display),
            ItemData::Int(4)
        );
    }

    #[test]
    fn test_names_and_values() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();

        let title = model.index(0, 0, &root);
        assert_eq!(text(&model, &title), ItemData::from("title"));
        assert_eq!(text(&model, &model.index(0, 1, &root)), ItemData::from("catalog"));

        let items = model.index(1, 0, &root);
        assert_eq!(text(&model, &items), ItemData::from("Items"));
        // Composite values have no display form in the value column.
        assert_eq!(text(&model, &model.index(1, 1, &root)), ItemData::None);

        assert_eq!(model.row_count(&items), 2);
        let second = model.index(1, 0, &items);
        assert_eq!(text(&model, &second), ItemData::from("[1]"));
        assert_eq!(model.row_count(&second), 2);
        let weight = model.index(1, 1, &second);
        assert_eq!(text(&model, &weight), ItemData::Float(2.5));
    }

    #[test]
    fn test_byte_buffers_are_leaves() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();
        let blob = model.index(2, 0, &root);
        assert_eq!(model.row_count(&blob), 0);
        assert!(!model.has_children(&blob));
        assert_eq!(text(&model, &model.index(2, 1, &root)), ItemData::from("aGk="));
        assert!(!model.index(0, 0, &blob).is_valid());
    }

    #[test]
    fn test_indirections_are_transparent() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();

        let next = model.index(3, 0, &root);
        assert_eq!(model.row_count(&next), 2);
        assert_eq!(text(&model, &model.index(0, 1, &next)), ItemData::from("n"));

        let missing = model.index(4, 0, &root);
        assert_eq!(text(&model, &missing), ItemData::from("missing"));
        assert_eq!(model.row_count(&missing), 0);
        assert_eq!(text(&model, &model.index(4, 1, &root)), ItemData::None);
    }

    #[test]
    fn test_memoized_addresses() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();

        let first = model.index(1, 0, &root);
        let count = model.materialized_count();
        let again = model.index(1, 0, &root);
        assert_eq!(first.internal_id(), again.internal_id());
        assert_eq!(model.materialized_count(), count);

        // Both columns of a row name the same node.
        assert_eq!(model.index(1, 1, &root).internal_id(), first.internal_id());
    }

    #[test]
    fn test_parent_round_trip() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();

        let items = model.index(1, 0, &root);
        assert_eq!(model.parent(&items), root);

        for row in 0..model.row_count(&items) {
            let child = model.index(row, 0, &items);
            assert_eq!(model.parent(&child), items);

            let grandchild = model.index(0, 1, &child);
            assert_eq!(model.parent(&grandchild), child);
        }
    }

    #[test]
    fn test_parent_keeps_value_column_handle() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();

        let items_value = model.index(1, 1, &root);
        let child = model.index(0, 0, &items_value);
        assert!(child.is_valid());
        assert_eq!(child.parent(), items_value);
        assert_eq!(model.parent(&child), items_value);

        let child_value = model.index(0, 1, &items_value);
        let weight = model.index(1, 1, &child_value);
        assert_eq!(text(&model, &weight), ItemData::Float(1.0));
        assert_eq!(model.parent(&weight), child_value);

        // Same node either way; a handle rebuilt without its parent falls
        // back to the column-0 form.
        let rebuilt =
            ModelIndex::with_internal_id(0, 0, ModelIndex::invalid(), child.internal_id());
        assert_eq!(model.parent(&rebuilt), model.index(1, 0, &root));
        assert_eq!(model.parent(&rebuilt).internal_id(), items_value.internal_id());
    }

    #[test]
    fn test_lazy_materialization() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        assert_eq!(model.materialized_count(), 1);

        let root = ModelIndex::invalid();
        model.row_count(&root);
        assert_eq!(model.materialized_count(), 1);

        let items = model.index(1, 0, &root);
        assert_eq!(model.materialized_count(), 2);
        model.index(1, 0, &items);
        assert_eq!(model.materialized_count(), 3);
    }

    #[test]
    fn test_invalid_coordinates() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();
        assert!(!model.index(0, 2, &root).is_valid());
        assert!(!model.index(9, 0, &root).is_valid());
        assert!(!model.parent(&root).is_valid());
        assert_eq!(model.data(&root, ItemRole::Display), ItemData::None);
        assert_eq!(
            model.data(&model.index(0, 0, &root), ItemRole::ToolTip),
            ItemData::None
        );
    }

    #[test]
    fn test_structure_is_cached_until_invalidate() {
        let value = shared(sample());
        let model = ValueTreeModel::new(value.clone()).unwrap();
        let root = ModelIndex::invalid();

        let items = model.index(1, 0, &root);
        assert_eq!(model.row_count(&items), 2);

        value.write().items.push(Leaf {
            label: "c".into(),
            weight: 3.0,
        });
        assert_eq!(model.row_count(&items), 2);

        // Leaf values are read through, so edits to visited scalars show.
        value.write().title = "renamed".into();
        assert_eq!(
            text(&model, &model.index(0, 1, &root)),
            ItemData::from("renamed")
        );

        model.invalidate();
        assert_eq!(model.materialized_count(), 1);
        assert_eq!(text(&model, &items), ItemData::None);
        let fresh = model.index(1, 0, &root);
        assert_eq!(model.row_count(&fresh), 3);
        // The old handle stays dead even once its slot is reused.
        assert_ne!(fresh.internal_id(), items.internal_id());
        assert_eq!(text(&model, &items), ItemData::None);
    }

    #[test]
    fn test_rejects_non_records() {
        let result = ValueTreeModel::from_value(vec![1, 2, 3]);
        assert!(matches!(result, Err(Error::NotApplicable { .. })));
        let none: Option<Box<Root>> = None;
        // A null root still has a record type.
        assert!(ValueTreeModel::from_value(none).is_ok());
    }

    #[test]
    fn test_debug_tree() {
        let model = ValueTreeModel::from_value(sample()).unwrap();
        let root = ModelIndex::invalid();
        let items = model.index(1, 0, &root);
        model.index(0, 0, &items);

        let dump = model.debug_tree();
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines, vec!["- <root>", "  - Items", "    + [0]"]);
    }
}
