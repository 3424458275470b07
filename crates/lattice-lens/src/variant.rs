//! Conversion between wrapped values and display variants.
//!
//! [`to_variant`] classifies a normalized value into the small closed set of
//! kinds a display cell can hold. [`from_item_data`] goes the other way for
//! the template layer: it turns host data, which may use many more kinds,
//! into JSON values a template can print or compare.

use base64::Engine;
use serde_json::{Map, Number, Value};

use crate::model::ItemData;
use crate::reflect::{normalize, ValueRef};

/// A displayable value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Variant {
    /// No displayable value.
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
}

impl Variant {
    /// Returns `true` if this is [`Variant::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Variant::Absent)
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Variant::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Variant> for ItemData {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Absent => ItemData::None,
            Variant::Bool(b) => ItemData::Bool(b),
            Variant::Int(n) => ItemData::Int(n),
            Variant::Uint(n) => ItemData::UInt(n),
            Variant::Float(n) => ItemData::Float(n),
            Variant::String(s) => ItemData::String(s),
        }
    }
}

/// Converts a value into a display variant.
///
/// The value is normalized first. Byte buffers become standard padded base64
/// text. Records, non-byte sequences and null indirections have no display
/// form and yield [`Variant::Absent`].
///
/// # Example
///
/// ```
/// use lattice_lens::reflect::Reflect;
/// use lattice_lens::variant::{to_variant, Variant};
///
/// assert_eq!(to_variant(42i32.reflect()), Variant::Int(42));
/// assert_eq!(to_variant(vec![1u8, 2, 3].reflect()), Variant::String("AQID".into()));
/// assert_eq!(to_variant(vec![1i32, 2].reflect()), Variant::Absent);
/// ```
pub fn to_variant(value: ValueRef<'_>) -> Variant {
    match normalize(value) {
        ValueRef::Bool(b) => Variant::Bool(b),
        ValueRef::Int(n) => Variant::Int(n),
        ValueRef::Uint(n) => Variant::Uint(n),
        ValueRef::Float(n) => Variant::Float(n),
        ValueRef::Str(s) => Variant::String(s.to_owned()),
        ValueRef::Char(c) => Variant::String(c.to_string()),
        ValueRef::Seq(seq) => match seq.to_bytes() {
            Some(bytes) => Variant::String(encode_bytes(&bytes)),
            None => Variant::Absent,
        },
        ValueRef::Absent | ValueRef::Record(_) | ValueRef::Indirect(_) => Variant::Absent,
    }
}

/// Display text of a byte buffer: standard padded base64.
fn encode_bytes(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Converts host data into a JSON value for template evaluation.
///
/// Numbers stay numeric (non-finite floats become `null`). Byte arrays
/// become base64 text, as byte buffers do in [`to_variant`]. Text kinds,
/// including dates and times in ISO-8601 form, become strings. Lists and maps
/// convert recursively. Colors, geometry and check states keep their
/// structured form. Rendering resources and custom payloads have no
/// template meaning and become `null`.
pub fn from_item_data(data: &ItemData) -> Value {
    match data {
        ItemData::None => Value::Null,
        ItemData::Bool(b) => Value::Bool(*b),
        ItemData::Int(n) => Value::from(*n),
        ItemData::UInt(n) => Value::from(*n),
        ItemData::Float(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
        ItemData::String(s) => Value::String(s.clone()),
        ItemData::Char(c) => Value::String(c.to_string()),
        ItemData::StringList(list) => {
            Value::Array(list.iter().cloned().map(Value::String).collect())
        }
        ItemData::ByteArray(bytes) => Value::String(encode_bytes(bytes)),
        ItemData::List(items) => Value::Array(items.iter().map(from_item_data).collect()),
        ItemData::Map(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), from_item_data(value)))
                .collect::<Map<_, _>>(),
        ),
        ItemData::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
        ItemData::Time(time) => Value::String(time.format("%H:%M:%S%.f").to_string()),
        ItemData::DateTime(dt) => Value::String(dt.to_rfc3339()),
        ItemData::Color(color) => to_json(color),
        ItemData::Size(size) => to_json(size),
        ItemData::Point(point) => to_json(point),
        ItemData::Rect(rect) => to_json(rect),
        ItemData::CheckState(state) => to_json(state),
        ItemData::Resource(_) | ItemData::Custom(_) => Value::Null,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
