//! Single-column model over a sequence of scalars.
//!
//! `ValueListModel<T>` shows each element of a sequence in one row under the
//! header `"Value"`. Elements must be displayable on their own: booleans,
//! numbers, text, or byte buffers (shown as base64 text).

use tracing::debug;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::{shared, ItemModel, Orientation, SharedValue};
use super::{classify_root, RootShape};
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::reflect::{normalize, normalize_shape, Reflect, Shape, ValueRef};
use crate::variant::to_variant;

/// Header of the single column.
const VALUE_HEADER: &str = "Value";

/// A flat list model over a sequence of displayable values.
///
/// # Example
///
/// ```
/// use lattice_lens::model::{ItemData, ItemModel, ItemRole, ModelIndex, ValueListModel};
///
/// let model = ValueListModel::from_value(vec![1, 2, 3]).unwrap();
/// let root = ModelIndex::invalid();
/// assert_eq!(model.row_count(&root), 3);
/// assert_eq!(model.column_count(&root), 1);
///
/// let index = model.index(1, 0, &root);
/// assert_eq!(model.data(&index, ItemRole::Display), ItemData::Int(2));
/// ```
pub struct ValueListModel<T> {
    value: SharedValue<T>,
}

impl<T: Reflect> ValueListModel<T> {
    /// Creates a list model over a shared sequence.
    ///
    /// Fails with [`Error::NotApplicable`] unless the value is a sequence of
    /// booleans, numbers, text, or byte buffers.
    pub fn new(value: SharedValue<T>) -> Result<Self> {
        let element = match classify_root(&*value.read()) {
            RootShape::Sequence(element) => element,
            other => return Err(not_applicable(other.describe())),
        };
        if !is_displayable_element(element) {
            return Err(not_applicable(format!(
                "sequence of {}",
                normalize_shape(element).kind_name()
            )));
        }

        debug!(
            target: targets::LIST,
            element = ?element,
            rows = Self::len_of(&value),
            "created list model"
        );
        Ok(Self { value })
    }

    /// Creates a list model that owns its sequence.
    pub fn from_value(value: T) -> Result<Self> {
        Self::new(shared(value))
    }

    /// Returns the shared handle to the wrapped sequence.
    pub fn value(&self) -> &SharedValue<T> {
        &self.value
    }

    fn len(&self) -> usize {
        Self::len_of(&self.value)
    }

    fn len_of(value: &SharedValue<T>) -> usize {
        match normalize(value.read().reflect()) {
            ValueRef::Seq(seq) => seq.len(),
            _ => 0,
        }
    }
}

fn not_applicable(found: impl Into<String>) -> Error {
    Error::not_applicable(
        "ValueListModel",
        "a sequence of booleans, numbers, text, or byte buffers",
        found,
    )
}

/// Whether elements of this shape can be shown in a single cell.
fn is_displayable_element(element: Shape) -> bool {
    match normalize_shape(element) {
        Shape::Sequence(inner) => matches!(inner(), Shape::Byte),
        shape => shape.is_scalar(),
    }
}

impl<T: Reflect> ItemModel for ValueListModel<T> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() {
            0 // Flat list has no children
        } else {
            self.len()
        }
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() { 0 } else { 1 }
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() || index.column() != 0 || !role.is_display() {
            return ItemData::None;
        }

        let value = self.value.read();
        let ValueRef::Seq(seq) = normalize(value.reflect()) else {
            return ItemData::None;
        };
        match seq.get(index.row()) {
            Some(element) => to_variant(element.reflect()).into(),
            None => ItemData::None,
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if parent.is_valid() || column > 0 || row >= self.len() {
            return ModelIndex::invalid();
        }
        ModelIndex::new(row, column, ModelIndex::invalid())
    }

    fn parent(&self, _index: &ModelIndex) -> ModelIndex {
        ModelIndex::invalid() // Flat list has no parents
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if !role.is_display() {
            return ItemData::None;
        }
        match orientation {
            Orientation::Horizontal if section == 0 => ItemData::from(VALUE_HEADER),
            Orientation::Horizontal => ItemData::None,
            Orientation::Vertical => ItemData::Int(section as i64),
        }
    }
}
