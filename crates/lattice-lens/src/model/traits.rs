//! The host-facing model contract.
//!
//! A host view framework drives every model through [`ItemModel`]. Queries are
//! total: out-of-range coordinates and unsupported roles yield
//! [`ItemData::None`] or an invalid [`ModelIndex`], because views probe bounds
//! speculatively.

use std::sync::Arc;

use parking_lot::RwLock;

use super::{ItemData, ItemRole, ModelIndex};

/// A wrapped value shared between its owner and the models reading it.
///
/// Models take a read lock per query. The owner takes the write lock to
/// mutate the value and must call [`ItemModel::invalidate`] afterwards so
/// cached structure is rebuilt.
pub type SharedValue<T> = Arc<RwLock<T>>;

/// Wraps a value for sharing with models.
pub fn shared<T>(value: T) -> SharedValue<T> {
    Arc::new(RwLock::new(value))
}

/// The core trait for read-only item models.
///
/// At minimum, implement:
/// - [`row_count`](ItemModel::row_count) - Number of rows under a parent
/// - [`column_count`](ItemModel::column_count) - Number of columns
/// - [`data`](ItemModel::data) - Data for a given index and role
/// - [`index`](ItemModel::index) - Create an index for a position
/// - [`parent`](ItemModel::parent) - Get the parent of an index
///
/// # Concurrency
///
/// Models are `Send + Sync` and serialize access to their own caches, but
/// they do not coordinate with the owner of the wrapped value. A host that
/// mutates the value while another thread is querying must order those
/// operations itself, and must call [`invalidate`](ItemModel::invalidate)
/// after each mutation.
///
/// # Example
///
/// ```
/// use lattice_lens::model::{ItemData, ItemModel, ItemRole, ModelIndex};
///
/// struct Letters;
///
/// impl ItemModel for Letters {
///     fn row_count(&self, parent: &ModelIndex) -> usize {
///         if parent.is_valid() { 0 } else { 26 }
///     }
///
///     fn column_count(&self, _parent: &ModelIndex) -> usize {
///         1
///     }
///
///     fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
///         if !role.is_display() || index.row() >= 26 {
///             return ItemData::None;
///         }
///         ItemData::Char((b'a' + index.row() as u8) as char)
///     }
///
///     fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
///         if parent.is_valid() || row >= 26 || column > 0 {
///             ModelIndex::invalid()
///         } else {
///             ModelIndex::new(row, column, ModelIndex::invalid())
///         }
///     }
///
///     fn parent(&self, _index: &ModelIndex) -> ModelIndex {
///         ModelIndex::invalid()
///     }
/// }
///
/// let index = Letters.index(2, 0, &ModelIndex::invalid());
/// assert_eq!(Letters.data(&index, ItemRole::Display), ItemData::Char('c'));
/// ```
pub trait ItemModel: Send + Sync {
    /// Returns the number of rows under the given parent.
    fn row_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the number of columns for children of the given parent.
    fn column_count(&self, parent: &ModelIndex) -> usize;

    /// Returns the data stored under the given role for the item at index.
    ///
    /// Returns `ItemData::None` for invalid indices, unsupported roles, and
    /// values with no display form.
    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData;

    /// Creates a model index for the given row and column under parent.
    ///
    /// Returns `ModelIndex::invalid()` if the position is out of bounds.
    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex;

    /// Returns the parent of the given index.
    ///
    /// Returns `ModelIndex::invalid()` for top-level items, invalid indices,
    /// and flat models.
    fn parent(&self, index: &ModelIndex) -> ModelIndex;

    // -------------------------------------------------------------------------
    // Optional methods with default implementations
    // -------------------------------------------------------------------------

    /// Returns `true` if the item at parent has any children.
    fn has_children(&self, parent: &ModelIndex) -> bool {
        self.row_count(parent) > 0
    }

    /// Returns header data for the given section.
    ///
    /// For horizontal headers `section` is a column, for vertical headers a
    /// row. The default returns `ItemData::None`.
    fn header_data(&self, _section: usize, _orientation: Orientation, _role: ItemRole) -> ItemData {
        ItemData::None
    }

    /// Drops every cache derived from the wrapped value.
    ///
    /// Call after mutating the value. Indices obtained before the call must
    /// not be reused. The default does nothing.
    fn invalidate(&self) {}

    // -------------------------------------------------------------------------
    // Convenience methods
    // -------------------------------------------------------------------------

    /// Returns the display text for an item (convenience for `data(index, Display)`).
    fn display_text(&self, index: &ModelIndex) -> Option<String> {
        self.data(index, ItemRole::Display).into_string()
    }

    /// Creates a sibling index at the given row and column, validated
    /// against the model.
    fn sibling(&self, index: &ModelIndex, row: usize, column: usize) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        self.index(row, column, &self.parent(index))
    }
}

/// Header orientation for `header_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Horizontal header (column headers).
    Horizontal,
    /// Vertical header (row headers).
    Vertical,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Grid {
        rows: usize,
        columns: usize,
    }

    impl ItemModel for Grid {
        fn row_count(&self, parent: &ModelIndex) -> usize {
            if parent.is_valid() { 0 } else { self.rows }
        }

        fn column_count(&self, _parent: &ModelIndex) -> usize {
            self.columns
        }

        fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
            if !role.is_display() || !index.is_valid() {
                return ItemData::None;
            }
            ItemData::String(format!("{}x{}", index.row(), index.column()))
        }

        fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
            if parent.is_valid() || row >= self.rows || column >= self.columns {
                ModelIndex::invalid()
            } else {
                ModelIndex::new(row, column, ModelIndex::invalid())
            }
        }

        fn parent(&self, _index: &ModelIndex) -> ModelIndex {
            ModelIndex::invalid()
        }
    }

    #[test]
    fn test_provided_methods() {
        let grid = Grid { rows: 2, columns: 3 };
        let root = ModelIndex::invalid();
        assert!(grid.has_children(&root));

        let cell = grid.index(1, 2, &root);
        assert!(!grid.has_children(&cell));
        assert_eq!(grid.display_text(&cell), Some("1x2".to_string()));
        assert_eq!(
            grid.header_data(0, Orientation::Horizontal, ItemRole::Display),
            ItemData::None
        );

        let sibling = grid.sibling(&cell, 0, 1);
        assert_eq!(grid.display_text(&sibling), Some("0x1".to_string()));
        assert!(!grid.sibling(&cell, 5, 0).is_valid());
        assert!(!grid.sibling(&root, 0, 0).is_valid());
    }

    #[test]
    fn test_shared_value() {
        let value = shared(vec![1, 2]);
        let reader = Arc::clone(&value);
        value.write().push(3);
        assert_eq!(reader.read().len(), 3);
    }
}
