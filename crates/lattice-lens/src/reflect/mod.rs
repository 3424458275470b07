//! Field and value introspection for wrapped values.
//!
//! Models in this crate never copy or traverse the value they wrap up front.
//! They ask it questions through three small capability traits:
//!
//! - [`Reflect`]: every displayable type. Describes its [`Shape`] without an
//!   instance and produces a borrowed [`ValueRef`] view of an instance.
//! - [`Sequence`]: indexed collections (`Vec<T>`, arrays, `VecDeque<T>`).
//! - [`Record`]: structured types with named fields, usually implemented with
//!   `#[derive(Reflect)]`.
//!
//! # Field annotations
//!
//! Each record field carries a raw annotation string (its *tag*):
//!
//! | Attribute                      | Tag          | Effect                               |
//! |--------------------------------|--------------|--------------------------------------|
//! | `#[lens(skip)]`                | `-`          | field is never visible               |
//! | `#[lens(rename = "Age")]`      | `Age`        | field is displayed as `Age`          |
//! | `#[lens(tag = "Age,extra")]`   | `Age,extra`  | first element renames, rest ignored  |
//! | `#[lens(flatten)]`             | (embedded)   | fields are spliced into the parent   |
//!
//! An embedded field is only flattened while its tag is empty. Once it carries
//! a tag it is shown as a single field.
//!
//! # Example
//!
//! ```
//! use lattice_lens::Reflect;
//! use lattice_lens::reflect::{count_visible_fields, field_name_at, Shape};
//!
//! #[derive(Reflect)]
//! struct Audit {
//!     created_by: String,
//! }
//!
//! #[derive(Reflect)]
//! struct Person {
//!     #[lens(rename = "Name")]
//!     name: String,
//!     age: u32,
//!     #[lens(skip)]
//!     password_hash: Vec<u8>,
//!     #[lens(flatten)]
//!     audit: Audit,
//! }
//!
//! let Shape::Record(info) = <Person as lattice_lens::reflect::Reflect>::shape() else {
//!     unreachable!()
//! };
//! assert_eq!(count_visible_fields(info), 3);
//! assert_eq!(field_name_at(info, 0), Some("Name"));
//! assert_eq!(field_name_at(info, 2), Some("created_by"));
//! ```

mod fields;
mod impls;
mod normalize;

use std::fmt;

pub use fields::{
    count_visible_fields, field_at, field_name_at, record_field, visible_field_count, FieldProbe,
    FieldTag, VisibleField,
};
pub use normalize::{normalize, normalize_shape};

/// Type-level description of a [`Reflect`] type.
///
/// Shapes are available without an instance, which is what lets a table model
/// compute its column headers before it has looked at a single row. Nested
/// shapes are reached through function pointers so self-referential types
/// describe themselves lazily.
#[derive(Clone, Copy)]
pub enum Shape {
    /// `bool`.
    Bool,
    /// Any signed integer width.
    Int,
    /// Any unsigned integer width except `u8`.
    Uint,
    /// `u8`, the element kind of byte buffers.
    Byte,
    /// `f32` or `f64`.
    Float,
    /// Text (`String`, `&str`, `char`).
    String,
    /// An indexed collection; the function returns the element shape.
    Sequence(fn() -> Shape),
    /// A structured type with named fields.
    Record(&'static RecordInfo),
    /// A nullable or boxed reference; the function returns the target shape.
    Indirect(fn() -> Shape),
    /// A value whose shape is only known per instance (`Box<dyn Reflect>`),
    /// or a field whose type is not introspectable at all.
    Opaque,
}

impl Shape {
    /// The shape reported for excluded fields and type-erased values.
    pub fn opaque() -> Shape {
        Shape::Opaque
    }

    /// Returns a short human-readable name for this kind of shape.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Bool => "bool",
            Shape::Int => "signed integer",
            Shape::Uint => "unsigned integer",
            Shape::Byte => "byte",
            Shape::Float => "float",
            Shape::String => "string",
            Shape::Sequence(_) => "sequence",
            Shape::Record(_) => "record",
            Shape::Indirect(_) => "indirection",
            Shape::Opaque => "opaque value",
        }
    }

    /// Returns `true` for the scalar kinds a single display cell can show.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Shape::Bool | Shape::Int | Shape::Uint | Shape::Byte | Shape::Float | Shape::String
        )
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Record(info) => write!(f, "Record({})", info.type_name),
            Shape::Sequence(element) => write!(f, "Sequence({:?})", element()),
            Shape::Indirect(target) => write!(f, "Indirect({:?})", target()),
            other => f.write_str(other.kind_name()),
        }
    }
}

/// Static field table of a record type, in declaration order.
#[derive(Debug)]
pub struct RecordInfo {
    /// The Rust type name, used in log output and errors.
    pub type_name: &'static str,
    /// Every declared field, including excluded ones.
    pub fields: &'static [FieldInfo],
}

/// Declaration of a single record field.
#[derive(Debug)]
pub struct FieldInfo {
    /// The declared field name.
    pub name: &'static str,
    /// The raw annotation string; empty when the field carries none.
    pub tag: &'static str,
    /// Whether the field's own fields are spliced into the parent record.
    pub embedded: bool,
    /// Shape of the field's type.
    pub shape: fn() -> Shape,
}

/// A borrowed, classified view of one value.
#[derive(Clone, Copy)]
pub enum ValueRef<'a> {
    /// Nothing: an empty indirection chain or a missing element.
    Absent,
    /// A boolean.
    Bool(bool),
    /// A signed integer widened to 64 bits.
    Int(i64),
    /// An unsigned integer widened to 64 bits.
    Uint(u64),
    /// A float widened to 64 bits.
    Float(f64),
    /// Text.
    Str(&'a str),
    /// A single character, displayed as one-character text.
    Char(char),
    /// An indexed collection.
    Seq(&'a dyn Sequence),
    /// A structured record.
    Record(&'a dyn Record),
    /// A nullable or boxed reference. `None` is a null reference.
    Indirect(Option<&'a dyn Reflect>),
}

impl ValueRef<'_> {
    /// Returns `true` if this is [`ValueRef::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, ValueRef::Absent)
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Absent => f.write_str("Absent"),
            ValueRef::Bool(b) => write!(f, "Bool({b})"),
            ValueRef::Int(n) => write!(f, "Int({n})"),
            ValueRef::Uint(n) => write!(f, "Uint({n})"),
            ValueRef::Float(n) => write!(f, "Float({n})"),
            ValueRef::Str(s) => write!(f, "Str({s:?})"),
            ValueRef::Char(c) => write!(f, "Char({c:?})"),
            ValueRef::Seq(seq) => write!(f, "Seq(len = {})", seq.len()),
            ValueRef::Record(record) => write!(f, "Record({})", record.record_info().type_name),
            ValueRef::Indirect(Some(_)) => f.write_str("Indirect(..)"),
            ValueRef::Indirect(None) => f.write_str("Indirect(null)"),
        }
    }
}

/// A value the models can introspect.
///
/// Implemented for the primitive types, text, standard collections and smart
/// pointers, and derived for records with `#[derive(Reflect)]`.
///
/// # Example
///
/// A hand-written implementation for a newtype that should display as its
/// inner number:
///
/// ```
/// use lattice_lens::reflect::{Reflect, Shape, ValueRef};
///
/// struct Celsius(f64);
///
/// impl Reflect for Celsius {
///     fn shape() -> Shape {
///         Shape::Float
///     }
///
///     fn reflect(&self) -> ValueRef<'_> {
///         ValueRef::Float(self.0)
///     }
/// }
/// ```
pub trait Reflect: Send + Sync {
    /// Describes the type without an instance.
    fn shape() -> Shape
    where
        Self: Sized;

    /// Returns a classified view of this value.
    fn reflect(&self) -> ValueRef<'_>;
}

/// An indexed collection of reflectable elements.
pub trait Sequence: Send + Sync {
    /// Number of elements.
    fn len(&self) -> usize;

    /// The element at `index`, or `None` when out of range.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Declared shape of the elements.
    fn element_shape(&self) -> Shape;

    /// Returns `true` if the collection has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the elements are exactly `u8`.
    ///
    /// Byte buffers are leaves: they display as encoded text and never expand.
    fn is_bytes(&self) -> bool {
        matches!(self.element_shape(), Shape::Byte)
    }

    /// Copies the elements out as raw bytes, if this is a byte buffer.
    fn to_bytes(&self) -> Option<Vec<u8>> {
        if !self.is_bytes() {
            return None;
        }
        let bytes = (0..self.len())
            .filter_map(|i| match self.get(i)?.reflect() {
                ValueRef::Uint(n) => u8::try_from(n).ok(),
                _ => None,
            })
            .collect();
        Some(bytes)
    }
}

/// A structured value with named fields.
pub trait Record: Send + Sync {
    /// The static field table of this record's type.
    fn record_info(&self) -> &'static RecordInfo;

    /// The field at `index` in declaration order.
    ///
    /// Excluded fields may return `None`.
    fn field(&self, index: usize) -> Option<&dyn Reflect>;
}
