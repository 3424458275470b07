//! Read-only item models over arbitrary nested Rust values.
//!
//! lattice-lens lets a host view framework display plain Rust data without
//! writing a model per type. Values describe themselves through the
//! [`Reflect`] trait, usually derived, and a model answers the host's
//! row/column/parent queries by introspecting the value on demand:
//!
//! - **List**: [`ValueListModel`](model::ValueListModel) shows a sequence of scalars
//! - **Table**: [`RecordTableModel`](model::RecordTableModel) shows a sequence of records,
//!   one column per visible field
//! - **Tree**: [`ValueTreeModel`](model::ValueTreeModel) shows any record as a
//!   lazily expanded `Name`/`Value` tree
//! - **Templates**: [`TemplateProxyModel`](model::TemplateProxyModel) computes text
//!   columns over any other model
//!
//! # Example
//!
//! ```
//! use lattice_lens::Reflect;
//! use lattice_lens::model::{ItemData, ItemModel, ItemRole, ModelIndex, ValueTreeModel};
//!
//! #[derive(Reflect)]
//! struct Config {
//!     #[lens(rename = "Name")]
//!     name: String,
//!     #[lens(skip)]
//!     secret: String,
//!     ports: Vec<u16>,
//! }
//!
//! let model = ValueTreeModel::from_value(Config {
//!     name: "edge".into(),
//!     secret: "hunter2".into(),
//!     ports: vec![80, 443],
//! })
//! .unwrap();
//!
//! let root = ModelIndex::invalid();
//! assert_eq!(model.row_count(&root), 2);
//!
//! let ports = model.index(1, 0, &root);
//! assert_eq!(model.row_count(&ports), 2);
//! let https = model.index(1, 1, &ports);
//! assert_eq!(model.data(&https, ItemRole::Display), ItemData::UInt(443));
//! ```

extern crate self as lattice_lens;

pub mod error;
pub mod logging;
pub mod model;
pub mod prelude;
pub mod reflect;
pub mod variant;

pub use error::{Error, Result};
pub use lattice_lens_macros::Reflect;
pub use reflect::Reflect;
