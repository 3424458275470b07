//! Coordinate handles for addressing items in a model.
//!
//! A `ModelIndex` names one cell: its row and column within a parent, the
//! parent's own index, and an opaque `internal_id` the owning model uses to
//! find its data. Flat models leave the id at zero. The tree model stores an
//! arena key there, so a handle keeps resolving to the same node for the
//! model's lifetime.

use std::hash::{Hash, Hasher};

/// Represents a position within an `ItemModel`.
///
/// # Example
///
/// ```
/// use lattice_lens::model::ModelIndex;
///
/// let top = ModelIndex::new(2, 0, ModelIndex::invalid());
/// let child = ModelIndex::new(1, 1, top.clone());
///
/// assert_eq!(child.parent(), top);
/// assert_eq!(child.row_path(), vec![2, 1]);
/// ```
#[derive(Clone)]
pub struct ModelIndex {
    /// The row within the parent.
    row: usize,
    /// The column within the parent.
    column: usize,
    /// The parent index. `None` indicates a top-level item.
    parent: Option<Box<ModelIndex>>,
    /// Model-specific identifier of the item's backing data.
    internal_id: u64,
    /// Whether this index is valid.
    valid: bool,
}

impl Default for ModelIndex {
    fn default() -> Self {
        Self::invalid()
    }
}

impl ModelIndex {
    /// Creates an invalid (null) model index.
    ///
    /// An invalid index stands for the model's root when used as a parent,
    /// and for "no such item" when returned from a query.
    #[inline]
    pub const fn invalid() -> Self {
        Self {
            row: 0,
            column: 0,
            parent: None,
            internal_id: 0,
            valid: false,
        }
    }

    /// Creates a new valid model index with no internal id.
    #[inline]
    pub fn new(row: usize, column: usize, parent: ModelIndex) -> Self {
        Self::with_internal_id(row, column, parent, 0)
    }

    /// Creates a new valid model index carrying a model-specific id.
    #[inline]
    pub fn with_internal_id(
        row: usize,
        column: usize,
        parent: ModelIndex,
        internal_id: u64,
    ) -> Self {
        Self {
            row,
            column,
            parent: parent.is_valid().then(|| Box::new(parent)),
            internal_id,
            valid: true,
        }
    }

    /// Returns `true` if this is a valid index.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the row of this index within its parent.
    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Returns the column of this index within its parent.
    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the parent index, or an invalid index for top-level items.
    #[inline]
    pub fn parent(&self) -> ModelIndex {
        match &self.parent {
            Some(parent) => (**parent).clone(),
            None => ModelIndex::invalid(),
        }
    }

    /// Returns `true` if this index has a valid parent.
    #[inline]
    pub fn has_parent(&self) -> bool {
        self.parent.is_some()
    }

    /// Returns the model-specific id stored in this index.
    #[inline]
    pub fn internal_id(&self) -> u64 {
        self.internal_id
    }

    /// Returns the depth of this index; top-level items have depth 0.
    pub fn depth(&self) -> usize {
        self.ancestors().len()
    }

    /// Returns the chain of ancestors, nearest first.
    pub fn ancestors(&self) -> Vec<ModelIndex> {
        let mut ancestors = Vec::new();
        let mut current = self.parent.as_deref();
        while let Some(index) = current {
            ancestors.push(index.clone());
            current = index.parent.as_deref();
        }
        ancestors
    }

    /// Returns the rows leading from the root to this index, this index's
    /// own row last. Empty for an invalid index.
    pub fn row_path(&self) -> Vec<usize> {
        if !self.is_valid() {
            return Vec::new();
        }
        let mut path: Vec<usize> = self.ancestors().iter().map(ModelIndex::row).collect();
        path.reverse();
        path.push(self.row);
        path
    }
}

impl std::fmt::Debug for ModelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            f.debug_struct("ModelIndex")
                .field("row", &self.row)
                .field("column", &self.column)
                .field("depth", &self.depth())
                .field("internal_id", &self.internal_id)
                .finish()
        } else {
            write!(f, "ModelIndex(invalid)")
        }
    }
}

impl PartialEq for ModelIndex {
    fn eq(&self, other: &Self) -> bool {
        match (self.is_valid(), other.is_valid()) {
            (false, false) => true,
            (true, true) => {
                self.row == other.row
                    && self.column == other.column
                    && self.internal_id == other.internal_id
                    && self.parent == other.parent
            }
            _ => false,
        }
    }
}

impl Eq for ModelIndex {}

impl Hash for ModelIndex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.valid.hash(state);
        if self.valid {
            self.row.hash(state);
            self.column.hash(state);
            self.internal_id.hash(state);
        }
    }
}
