//! Prelude module for lattice-lens.
//!
//! This module re-exports the most commonly used types for convenient importing:
//!
//! ```
//! use lattice_lens::prelude::*;
//! ```
//!
//! This provides access to:
//! - The `Reflect` trait and derive macro
//! - The model contract (`ItemModel`, `ModelIndex`, `ItemRole`, `ItemData`)
//! - The four models and template configuration
//! - Error types

// ============================================================================
// Reflection
// ============================================================================

pub use crate::Reflect;
pub use crate::reflect::{Record, Sequence, Shape, ValueRef};

// ============================================================================
// Model Contract
// ============================================================================

pub use crate::model::{
    shared, ItemData, ItemModel, ItemRole, ModelIndex, Orientation, SharedValue,
};

// ============================================================================
// Models
// ============================================================================

pub use crate::model::{RecordTableModel, ValueListModel, ValueTreeModel};

// ============================================================================
// Templates
// ============================================================================

pub use crate::model::{RenderFailure, TemplateColumns, TemplateProxyModel};

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::Error;
