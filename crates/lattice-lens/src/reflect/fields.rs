//! Visible-field enumeration for record types.
//!
//! Field positions are computed by walking the static field table on every
//! query instead of materializing a list of visible fields. The walk keeps
//! only the chain of records being flattened.

use std::ptr;

use super::{normalize, normalize_shape, FieldInfo, Record, RecordInfo, Shape, ValueRef};

/// Parsed form of a field's raw annotation string.
///
/// # Example
///
/// ```
/// use lattice_lens::reflect::FieldTag;
///
/// assert!(FieldTag::parse("-").is_excluded());
/// assert_eq!(FieldTag::parse("Age,omitempty").rename(), Some("Age"));
/// assert_eq!(FieldTag::parse(",omitempty").rename(), None);
/// assert_eq!(FieldTag::parse("").display_name("age"), "age");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTag<'a> {
    raw: &'a str,
}

impl<'a> FieldTag<'a> {
    /// Parses a raw annotation string.
    pub fn parse(raw: &'a str) -> Self {
        Self { raw }
    }

    /// Returns `true` if the field carries no annotation at all.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns `true` if the field is excluded from display.
    pub fn is_excluded(&self) -> bool {
        self.raw == "-"
    }

    /// The display name override: the first comma-separated element, if
    /// non-empty.
    pub fn rename(&self) -> Option<&'a str> {
        if self.is_excluded() {
            return None;
        }
        self.raw.split(',').next().filter(|name| !name.is_empty())
    }

    /// The display name of a field declared as `declared`.
    pub fn display_name(&self, declared: &'a str) -> &'a str {
        self.rename().unwrap_or(declared)
    }

    /// The comma-separated elements after the name. Unused by the models.
    pub fn options(&self) -> impl Iterator<Item = &'a str> {
        self.raw.split(',').skip(1)
    }
}

/// One visible field located by [`field_at`].
#[derive(Debug, Clone, Copy)]
pub struct VisibleField<'a> {
    /// Display name, after applying any rename annotation.
    pub name: &'static str,
    /// The field's value, not yet normalized. [`ValueRef::Absent`] when no
    /// instance was supplied.
    pub value: ValueRef<'a>,
}

/// Outcome of a decrementing field probe.
#[derive(Debug, Clone, Copy)]
pub enum FieldProbe<'a> {
    /// The requested ordinal was reached.
    Found(VisibleField<'a>),
    /// The record ran out of visible fields; the ordinal still left to skip.
    Remaining(usize),
}

impl<'a> FieldProbe<'a> {
    /// Returns the located field, if any.
    pub fn found(self) -> Option<VisibleField<'a>> {
        match self {
            FieldProbe::Found(field) => Some(field),
            FieldProbe::Remaining(_) => None,
        }
    }
}

/// Records being flattened, outermost first.
type FlattenPath = Vec<&'static RecordInfo>;

/// Returns the record table to splice in if `field` is a flattened member.
///
/// A member whose record type is already being flattened further out is a
/// single field, so self-embedding types stay finite.
fn flattened(
    field: &FieldInfo,
    tag: FieldTag<'_>,
    path: &[&'static RecordInfo],
) -> Option<&'static RecordInfo> {
    if !field.embedded || !tag.is_empty() {
        return None;
    }
    match normalize_shape((field.shape)()) {
        Shape::Record(info) if !path.iter().any(|outer| ptr::eq(*outer, info)) => Some(info),
        _ => None,
    }
}

/// Counts the visible fields of a record type.
///
/// Excluded fields are not counted; flattened members contribute their own
/// visible fields, recursively. A member that would flatten a record into
/// itself counts as one field.
pub fn count_visible_fields(info: &'static RecordInfo) -> usize {
    count_on_path(info, &mut FlattenPath::new())
}

fn count_on_path(info: &'static RecordInfo, path: &mut FlattenPath) -> usize {
    path.push(info);
    let mut count = 0;
    for field in info.fields {
        let tag = FieldTag::parse(field.tag);
        if tag.is_excluded() {
            continue;
        }
        count += match flattened(field, tag, path) {
            Some(embedded) => count_on_path(embedded, path),
            None => 1,
        };
    }
    path.pop();
    count
}

/// Counts the visible fields of any shape; zero unless it normalizes to a
/// record.
pub fn visible_field_count(shape: Shape) -> usize {
    match normalize_shape(shape) {
        Shape::Record(info) => count_visible_fields(info),
        _ => 0,
    }
}

/// Locates the visible field at `ordinal`.
///
/// Fields are visited in declaration order, descending depth-first into
/// flattened members. Each visible field consumes one unit of `ordinal`;
/// the field reached with nothing left to skip is returned. When the record
/// is exhausted first, the remainder is returned so a caller walking an
/// enclosing record can continue counting from there.
///
/// With `record` set to `None` only names are produced, with
/// [`ValueRef::Absent`] values. A flattened member whose instance is absent
/// still consumes the ordinals of its type's fields.
pub fn field_at<'a>(
    info: &'static RecordInfo,
    record: Option<&'a dyn Record>,
    ordinal: usize,
) -> FieldProbe<'a> {
    probe_on_path(info, record, ordinal, &mut FlattenPath::new())
}

fn probe_on_path<'a>(
    info: &'static RecordInfo,
    record: Option<&'a dyn Record>,
    ordinal: usize,
    path: &mut FlattenPath,
) -> FieldProbe<'a> {
    path.push(info);
    let mut remaining = ordinal;

    for (index, field) in info.fields.iter().enumerate() {
        let tag = FieldTag::parse(field.tag);
        if tag.is_excluded() {
            continue;
        }

        let value = || {
            record
                .and_then(|r| r.field(index))
                .map_or(ValueRef::Absent, |v| v.reflect())
        };

        if let Some(embedded) = flattened(field, tag, path) {
            let inner = match normalize(value()) {
                ValueRef::Record(inner) => Some(inner),
                _ => None,
            };
            match probe_on_path(embedded, inner, remaining, path) {
                FieldProbe::Found(found) => {
                    path.pop();
                    return FieldProbe::Found(found);
                }
                FieldProbe::Remaining(rest) => {
                    remaining = rest;
                    continue;
                }
            }
        }

        if remaining == 0 {
            path.pop();
            return FieldProbe::Found(VisibleField {
                name: tag.display_name(field.name),
                value: value(),
            });
        }
        remaining -= 1;
    }

    path.pop();
    FieldProbe::Remaining(remaining)
}

/// Display name of the visible field at `ordinal`, without an instance.
pub fn field_name_at(info: &'static RecordInfo, ordinal: usize) -> Option<&'static str> {
    field_at(info, None, ordinal).found().map(|field| field.name)
}

/// The visible field at `ordinal` of a record instance.
pub fn record_field(record: &dyn Record, ordinal: usize) -> Option<VisibleField<'_>> {
    field_at(record.record_info(), Some(record), ordinal).found()
}
