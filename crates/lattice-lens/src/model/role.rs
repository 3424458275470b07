//! Data roles and host data kinds for item models.
//!
//! A role names which aspect of an item the host is asking for. The models in
//! this crate only answer [`ItemRole::Display`]; every other role resolves to
//! [`ItemData::None`].
//!
//! [`ItemData`] is the host framework's own variant type. Values a model
//! produces use only the primitive kinds. The wider set exists because a host
//! may hand already-materialized data back to the template layer (see
//! [`crate::variant::from_item_data`]).

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

/// Standard roles for accessing different aspects of item data.
///
/// # Example
///
/// ```
/// use lattice_lens::model::ItemRole;
///
/// assert!(ItemRole::Display.is_display());
/// assert!(!ItemRole::ToolTip.is_display());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRole {
    /// Primary text to display.
    Display,
    /// Icon or decoration shown alongside the text.
    Decoration,
    /// Value for editing.
    Edit,
    /// Tooltip text shown on hover.
    ToolTip,
    /// Text shown in the status bar.
    StatusTip,
    /// Text alignment.
    TextAlignment,
    /// Background color.
    BackgroundColor,
    /// Foreground (text) color.
    ForegroundColor,
    /// Check state for checkable items.
    CheckState,
    /// Size hint for the item.
    SizeHint,
    /// Application-specific data.
    User(u32),
}

impl ItemRole {
    /// Returns `true` for the display role, the only role these models honor.
    #[inline]
    pub fn is_display(&self) -> bool {
        matches!(self, ItemRole::Display)
    }
}

/// Check state for checkable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum CheckState {
    /// Item is unchecked.
    #[default]
    Unchecked,
    /// Item is partially checked (for tri-state checkboxes).
    PartiallyChecked,
    /// Item is checked.
    Checked,
}

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// A width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Host rendering resources with no textual meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pixmap,
    Bitmap,
    Image,
    Palette,
    Brush,
    Pen,
    Cursor,
    Region,
    KeySequence,
}

/// The host framework's variant type.
///
/// # Example
///
/// ```
/// use lattice_lens::model::ItemData;
///
/// let data = ItemData::from("Hello");
/// assert_eq!(data.as_string(), Some("Hello"));
///
/// let data = ItemData::new(42u32);
/// assert_eq!(data.downcast::<u32>(), Some(&42));
/// ```
#[derive(Debug, Default)]
pub enum ItemData {
    /// No data.
    #[default]
    None,
    /// Boolean data.
    Bool(bool),
    /// Signed integer data.
    Int(i64),
    /// Unsigned integer data.
    UInt(u64),
    /// Floating point data.
    Float(f64),
    /// String data.
    String(String),
    /// A single character.
    Char(char),
    /// A list of strings.
    StringList(Vec<String>),
    /// Raw bytes.
    ByteArray(Vec<u8>),
    /// A heterogeneous list.
    List(Vec<ItemData>),
    /// A string-keyed map.
    Map(BTreeMap<String, ItemData>),
    /// A calendar date.
    Date(NaiveDate),
    /// A wall-clock time.
    Time(NaiveTime),
    /// A point in time.
    DateTime(DateTime<Utc>),
    /// Color data.
    Color(Color),
    /// Size data.
    Size(Size),
    /// Point data.
    Point(Point),
    /// Rectangle data.
    Rect(Rect),
    /// Check state data.
    CheckState(CheckState),
    /// A rendering resource the models cannot interpret.
    Resource(ResourceKind),
    /// Custom data (type-erased).
    Custom(Box<dyn std::any::Any + Send + Sync>),
}

impl Clone for ItemData {
    fn clone(&self) -> Self {
        match self {
            ItemData::None => ItemData::None,
            ItemData::Bool(b) => ItemData::Bool(*b),
            ItemData::Int(n) => ItemData::Int(*n),
            ItemData::UInt(n) => ItemData::UInt(*n),
            ItemData::Float(n) => ItemData::Float(*n),
            ItemData::String(s) => ItemData::String(s.clone()),
            ItemData::Char(c) => ItemData::Char(*c),
            ItemData::StringList(list) => ItemData::StringList(list.clone()),
            ItemData::ByteArray(bytes) => ItemData::ByteArray(bytes.clone()),
            ItemData::List(items) => ItemData::List(items.clone()),
            ItemData::Map(map) => ItemData::Map(map.clone()),
            ItemData::Date(d) => ItemData::Date(*d),
            ItemData::Time(t) => ItemData::Time(*t),
            ItemData::DateTime(dt) => ItemData::DateTime(*dt),
            ItemData::Color(c) => ItemData::Color(*c),
            ItemData::Size(s) => ItemData::Size(*s),
            ItemData::Point(p) => ItemData::Point(*p),
            ItemData::Rect(r) => ItemData::Rect(*r),
            ItemData::CheckState(s) => ItemData::CheckState(*s),
            ItemData::Resource(kind) => ItemData::Resource(*kind),
            // Custom data cannot be cloned; becomes None
            ItemData::Custom(_) => ItemData::None,
        }
    }
}

impl PartialEq for ItemData {
    /// Structural equality. Custom payloads never compare equal.
    fn eq(&self, other: &Self) -> bool {
        use ItemData as D;
        match (self, other) {
            (D::None, D::None) => true,
            (D::Bool(a), D::Bool(b)) => a == b,
            (D::Int(a), D::Int(b)) => a == b,
            (D::UInt(a), D::UInt(b)) => a == b,
            (D::Float(a), D::Float(b)) => a == b,
            (D::String(a), D::String(b)) => a == b,
            (D::Char(a), D::Char(b)) => a == b,
            (D::StringList(a), D::StringList(b)) => a == b,
            (D::ByteArray(a), D::ByteArray(b)) => a == b,
            (D::List(a), D::List(b)) => a == b,
            (D::Map(a), D::Map(b)) => a == b,
            (D::Date(a), D::Date(b)) => a == b,
            (D::Time(a), D::Time(b)) => a == b,
            (D::DateTime(a), D::DateTime(b)) => a == b,
            (D::Color(a), D::Color(b)) => a == b,
            (D::Size(a), D::Size(b)) => a == b,
            (D::Point(a), D::Point(b)) => a == b,
            (D::Rect(a), D::Rect(b)) => a == b,
            (D::CheckState(a), D::CheckState(b)) => a == b,
            (D::Resource(a), D::Resource(b)) => a == b,
            _ => false,
        }
    }
}

impl ItemData {
    /// Creates new custom data from any type.
    pub fn new<T: std::any::Any + Send + Sync + 'static>(value: T) -> Self {
        ItemData::Custom(Box::new(value))
    }

    /// Returns `true` if this is `ItemData::None`.
    pub fn is_none(&self) -> bool {
        matches!(self, ItemData::None)
    }

    /// Returns `true` if this contains some data.
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Attempts to get the data as a string slice.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ItemData::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Attempts to get the data as an owned string.
    pub fn into_string(self) -> Option<String> {
        match self {
            ItemData::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to get the data as a signed integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ItemData::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as an unsigned integer.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            ItemData::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ItemData::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to get the data as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ItemData::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to downcast custom data to the specified type.
    pub fn downcast<T: std::any::Any>(&self) -> Option<&T> {
        match self {
            ItemData::Custom(data) => data.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl From<String> for ItemData {
    fn from(s: String) -> Self {
        ItemData::String(s)
    }
}

impl From<&str> for ItemData {
    fn from(s: &str) -> Self {
        ItemData::String(s.to_string())
    }
}

impl From<i64> for ItemData {
    fn from(n: i64) -> Self {
        ItemData::Int(n)
    }
}

impl From<u64> for ItemData {
    fn from(n: u64) -> Self {
        ItemData::UInt(n)
    }
}

impl From<f64> for ItemData {
    fn from(n: f64) -> Self {
        ItemData::Float(n)
    }
}

impl From<bool> for ItemData {
    fn from(b: bool) -> Self {
        ItemData::Bool(b)
    }
}

impl From<Option<String>> for ItemData {
    fn from(opt: Option<String>) -> Self {
        match opt {
            Some(s) => ItemData::String(s),
            None => ItemData::None,
        }
    }
}
