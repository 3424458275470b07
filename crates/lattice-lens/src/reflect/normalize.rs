//! Indirection stripping for values and shapes.

use super::{Shape, ValueRef};

/// Follows indirections until a concrete value is reached.
///
/// Returns [`ValueRef::Absent`] if a link in the chain is null. Every
/// dereference moves to a value owned by the previous one, so the walk
/// always terminates.
pub fn normalize(value: ValueRef<'_>) -> ValueRef<'_> {
    let mut current = value;
    loop {
        match current {
            ValueRef::Indirect(Some(target)) => current = target.reflect(),
            ValueRef::Indirect(None) => return ValueRef::Absent,
            concrete => return concrete,
        }
    }
}

/// Follows indirection shapes until a concrete shape is reached.
///
/// Stops at [`Shape::Opaque`], whose target is only known per instance.
pub fn normalize_shape(shape: Shape) -> Shape {
    let mut current = shape;
    while let Shape::Indirect(target) = current {
        current = target();
    }
    current
}
