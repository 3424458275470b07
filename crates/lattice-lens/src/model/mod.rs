//! Read-only item models over wrapped values.
//!
//! This module provides the host-facing model contract and four models that
//! answer it by introspecting a wrapped value on demand.
//!
//! # Core Types
//!
//! - `ModelIndex`: Identifies an item's position in a model
//! - `ItemRole`: Specifies what type of data to access
//! - `ItemData`: The host framework's variant type
//! - `ItemModel`: The trait that models implement
//!
//! # Model Implementations
//!
//! - `ValueListModel`: One column over a sequence of scalars
//! - `RecordTableModel`: One column per visible field over a sequence of records
//! - `ValueTreeModel`: A lazily materialized `Name`/`Value` tree over any record
//! - `TemplateProxyModel`: Computed text columns over any other model
//!
//! # Example
//!
//! ```
//! use lattice_lens::Reflect;
//! use lattice_lens::model::{ItemModel, ModelIndex, RecordTableModel};
//!
//! #[derive(Reflect)]
//! struct Person {
//!     #[lens(rename = "Name")]
//!     name: String,
//!     #[lens(rename = "Age")]
//!     age: u32,
//! }
//!
//! let model = RecordTableModel::from_value(vec![
//!     Person { name: "Ada".into(), age: 36 },
//!     Person { name: "Alan".into(), age: 41 },
//! ])
//! .unwrap();
//!
//! let root = ModelIndex::invalid();
//! assert_eq!(model.row_count(&root), 2);
//! assert_eq!(model.column_count(&root), 2);
//! assert_eq!(model.display_text(&model.index(1, 0, &root)), Some("Alan".into()));
//! ```
//!
//! # Architecture Overview
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Wrapped value│<────│    Model     │<────│  Host view   │
//! │  (Reflect)   │     │ (ItemModel)  │     │              │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             ^
//!                             │
//!                      ┌──────────────┐
//!                      │TemplateProxy │
//!                      │    Model     │
//!                      └──────────────┘
//! ```
//!
//! Views query models using `ModelIndex` and `ItemRole` to get `ItemData`.
//! Models hold the value through a [`SharedValue`] and read it per query.

mod index;
mod list_model;
mod role;
mod table_model;
mod template_model;
mod traits;
mod tree_model;

pub use index::ModelIndex;
pub use list_model::ValueListModel;
pub use role::{
    CheckState, Color, ItemData, ItemRole, Point, Rect, ResourceKind, Size,
};
pub use table_model::RecordTableModel;
pub use template_model::{
    RenderFailure, TemplateColumns, TemplateProxyBuilder, TemplateProxyModel,
};
pub use traits::{shared, ItemModel, Orientation, SharedValue};
pub use tree_model::ValueTreeModel;

use crate::reflect::{normalize, normalize_shape, Reflect, RecordInfo, Shape, ValueRef};

/// The outermost structure of a wrapped value.
pub(crate) enum RootShape {
    /// A sequence with the given (unnormalized) element shape.
    Sequence(Shape),
    /// A record.
    Record(&'static RecordInfo),
    /// Anything else, by kind name.
    Other(&'static str),
}

impl RootShape {
    pub(crate) fn describe(&self) -> String {
        match self {
            RootShape::Sequence(element) => format!("sequence of {}", element.kind_name()),
            RootShape::Record(info) => format!("record {}", info.type_name),
            RootShape::Other(kind) => (*kind).to_string(),
        }
    }
}

/// Classifies a wrapped value by its type, looking at the instance only
/// when the type is opaque.
pub(crate) fn classify_root<T: Reflect>(value: &T) -> RootShape {
    match normalize_shape(T::shape()) {
        Shape::Sequence(element) => RootShape::Sequence(element()),
        Shape::Record(info) => RootShape::Record(info),
        Shape::Opaque => match normalize(value.reflect()) {
            ValueRef::Seq(seq) => RootShape::Sequence(seq.element_shape()),
            ValueRef::Record(record) => RootShape::Record(record.record_info()),
            ValueRef::Absent => RootShape::Other("absent value"),
            _ => RootShape::Other("scalar"),
        },
        other => RootShape::Other(other.kind_name()),
    }
}
