//! Multi-column model over a sequence of records.
//!
//! `RecordTableModel<T>` shows one record per row and one visible field per
//! column. Columns and their headers come from the element type alone, so an
//! empty sequence still reports its headers.

use tracing::debug;

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::{shared, ItemModel, Orientation, SharedValue};
use super::{classify_root, RootShape};
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::reflect::{
    count_visible_fields, field_at, field_name_at, normalize, normalize_shape, Reflect,
    RecordInfo, Shape, ValueRef,
};
use crate::variant::to_variant;

/// A table model over a sequence of records.
///
/// # Example
///
/// ```
/// use lattice_lens::Reflect;
/// use lattice_lens::model::{ItemData, ItemModel, ItemRole, ModelIndex, Orientation, RecordTableModel};
///
/// #[derive(Reflect)]
/// struct Employee {
///     name: String,
///     #[lens(skip)]
///     salary: u32,
///     #[lens(rename = "Dept")]
///     department: String,
/// }
///
/// let model = RecordTableModel::from_value(vec![Employee {
///     name: "Alice".into(),
///     salary: 100_000,
///     department: "Engineering".into(),
/// }])
/// .unwrap();
///
/// assert_eq!(model.column_count(&ModelIndex::invalid()), 2);
/// assert_eq!(
///     model.header_data(1, Orientation::Horizontal, ItemRole::Display),
///     ItemData::from("Dept")
/// );
/// ```
pub struct RecordTableModel<T> {
    value: SharedValue<T>,
    record: &'static RecordInfo,
    columns: usize,
}

impl<T: Reflect> RecordTableModel<T> {
    /// Creates a table model over a shared sequence of records.
    ///
    /// Fails with [`Error::NotApplicable`] unless the value is a sequence
    /// whose elements are records (possibly behind indirections).
    pub fn new(value: SharedValue<T>) -> Result<Self> {
        let element = match classify_root(&*value.read()) {
            RootShape::Sequence(element) => element,
            other => return Err(not_applicable(other.describe())),
        };
        let record = match normalize_shape(element) {
            Shape::Record(info) => info,
            other => return Err(not_applicable(format!("sequence of {}", other.kind_name()))),
        };
        let columns = count_visible_fields(record);

        debug!(
            target: targets::TABLE,
            record = record.type_name,
            columns,
            "created table model"
        );
        Ok(Self {
            value,
            record,
            columns,
        })
    }

    /// Creates a table model that owns its sequence.
    pub fn from_value(value: T) -> Result<Self> {
        Self::new(shared(value))
    }

    /// Returns the shared handle to the wrapped sequence.
    pub fn value(&self) -> &SharedValue<T> {
        &self.value
    }

    /// Returns the element record type.
    pub fn record_info(&self) -> &'static RecordInfo {
        self.record
    }

    fn len(&self) -> usize {
        match normalize(self.value.read().reflect()) {
            ValueRef::Seq(seq) => seq.len(),
            _ => 0,
        }
    }
}

fn not_applicable(found: impl Into<String>) -> Error {
    Error::not_applicable("RecordTableModel", "a sequence of records", found)
}

impl<T: Reflect> ItemModel for RecordTableModel<T> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() { 0 } else { self.len() }
    }

    fn column_count(&self, parent: &ModelIndex) -> usize {
        if parent.is_valid() { 0 } else { self.columns }
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() || index.column() >= self.columns || !role.is_display() {
            return ItemData::None;
        }

        let value = self.value.read();
        let ValueRef::Seq(seq) = normalize(value.reflect()) else {
            return ItemData::None;
        };
        let Some(element) = seq.get(index.row()) else {
            return ItemData::None;
        };
        let record = match normalize(element.reflect()) {
            ValueRef::Record(record) => Some(record),
            _ => None,
        };
        match field_at(self.record, record, index.column()).found() {
            Some(field) => to_variant(field.value).into(),
            None => ItemData::None,
        }
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if parent.is_valid() || column >= self.columns || row >= self.len() {
            return ModelIndex::invalid();
        }
        ModelIndex::new(row, column, ModelIndex::invalid())
    }

    fn parent(&self, _index: &ModelIndex) -> ModelIndex {
        ModelIndex::invalid()
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if !role.is_display() {
            return ItemData::None;
        }
        match orientation {
            Orientation::Horizontal => field_name_at(self.record, section)
                .map(ItemData::from)
                .unwrap_or_default(),
            Orientation::Vertical => ItemData::Int(section as i64),
        }
    }
}
