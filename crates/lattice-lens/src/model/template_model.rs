//! Computed text columns over another model.
//!
//! `TemplateProxyModel` keeps the row structure of a source model and
//! replaces its columns with rendered [handlebars] templates, one template per
//! header and one per data column. Templates reach the source through helpers:
//!
//! | Helper            | In a data template                      | In a header template          |
//! |-------------------|-----------------------------------------|-------------------------------|
//! | `data <col>`      | Source cell in this row (index or name) | Source header at that column  |
//! | `header <col>`    | Source header at that column            | Source header at that column  |
//! | `row`             | Row of the cell                         | Nothing                       |
//! | `col`             | Column of the cell                      | Section of the header         |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use lattice_lens::Reflect;
//! use lattice_lens::model::{
//!     ItemModel, ModelIndex, RecordTableModel, TemplateColumns, TemplateProxyModel,
//! };
//!
//! #[derive(Reflect)]
//! struct Person {
//!     #[lens(rename = "Name")]
//!     name: String,
//!     #[lens(rename = "Age")]
//!     age: u32,
//! }
//!
//! let people = RecordTableModel::from_value(vec![Person { name: "Ada".into(), age: 36 }]).unwrap();
//! let columns = TemplateColumns::new().with_column("Who", "{{data \"Name\"}} ({{data 1}})");
//! let model = TemplateProxyModel::new(Arc::new(people), columns).unwrap();
//!
//! let index = model.index(0, 0, &ModelIndex::invalid());
//! assert_eq!(model.display_text(&index), Some("Ada (36)".into()));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, RenderContext, RenderError, RenderErrorReason,
    ScopedJson,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace, warn};

use super::index::ModelIndex;
use super::role::{ItemData, ItemRole};
use super::traits::{ItemModel, Orientation};
use crate::error::{Error, Result};
use crate::logging::targets;
use crate::variant::from_item_data;

/// What a cell or header shows when its template fails to render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderFailure {
    /// Show empty text.
    #[default]
    EmptyText,
    /// Show nothing.
    Absent,
}

/// Column templates for a [`TemplateProxyModel`].
///
/// Can be built in code or loaded from TOML:
///
/// ```
/// use lattice_lens::model::{RenderFailure, TemplateColumns};
///
/// let columns = TemplateColumns::from_toml_str(r#"
///     headers = ["Name", "Age"]
///     data = ["{{data 0}}", "{{data \"Age\"}}"]
///     on_error = "absent"
/// "#).unwrap();
///
/// assert_eq!(columns.column_count(), 2);
/// assert_eq!(columns.on_error, RenderFailure::Absent);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateColumns {
    /// Header templates, one per column.
    pub headers: Vec<String>,
    /// Data templates, one per column.
    pub data: Vec<String>,
    /// Result of a failed render.
    pub on_error: RenderFailure,
    /// HTML-escape values written by `{{...}}` expressions.
    pub escape_html: bool,
}

impl TemplateColumns {
    /// Creates an empty column set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a column set from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Appends a column with both a header and a data template.
    pub fn with_column(mut self, header: impl Into<String>, data: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self.data.push(data.into());
        self
    }

    /// Appends a header template.
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }

    /// Appends a data template.
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data.push(data.into());
        self
    }

    /// Sets the render failure policy.
    pub fn with_on_error(mut self, on_error: RenderFailure) -> Self {
        self.on_error = on_error;
        self
    }

    /// Enables or disables HTML escaping.
    pub fn with_escape_html(mut self, escape_html: bool) -> Self {
        self.escape_html = escape_html;
        self
    }

    /// Number of columns the proxy exposes.
    pub fn column_count(&self) -> usize {
        self.headers.len().max(self.data.len())
    }
}

/// The JSON object a template is rendered against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum Scope {
    Header {
        section: usize,
    },
    Cell {
        row: usize,
        col: usize,
        /// Rows of the ancestors, outermost first.
        parents: Vec<usize>,
    },
}

impl Scope {
    fn of(ctx: &Context) -> std::result::Result<Self, RenderError> {
        Scope::deserialize(ctx.data())
            .map_err(|err| RenderErrorReason::Other(format!("not a model scope: {err}")).into())
    }
}

fn header_template(section: usize) -> String {
    format!("header[{section}]")
}

fn data_template(column: usize) -> String {
    format!("data[{column}]")
}

/// Source access shared by the proxy and its helpers.
struct SourceLookup<S: ?Sized> {
    source: Arc<S>,
    names: RwLock<Option<HashMap<String, usize>>>,
}

impl<S: ItemModel + ?Sized> SourceLookup<S> {
    /// Resolves a row path to a source index. `None` if any step is gone.
    fn resolve(&self, rows: &[usize]) -> Option<ModelIndex> {
        let mut index = ModelIndex::invalid();
        for &row in rows {
            index = self.source.index(row, 0, &index);
            if !index.is_valid() {
                return None;
            }
        }
        Some(index)
    }

    fn column_named(&self, name: &str) -> Option<usize> {
        if let Some(names) = self.names.read().as_ref() {
            return names.get(name).copied();
        }

        let mut guard = self.names.write();
        let names = guard.get_or_insert_with(|| {
            let columns = self.source.column_count(&ModelIndex::invalid());
            let mut names = HashMap::with_capacity(columns);
            for column in 0..columns {
                let header =
                    self.source
                        .header_data(column, Orientation::Horizontal, ItemRole::Display);
                if let Some(header) = header.into_string() {
                    names.entry(header).or_insert(column);
                }
            }
            trace!(target: targets::TEMPLATE, columns, "built column name cache");
            names
        });
        names.get(name).copied()
    }

    fn column_of(&self, arg: &Value) -> std::result::Result<usize, RenderError> {
        match arg {
            Value::Number(n) => n
                .as_u64()
                .map(|n| n as usize)
                .ok_or_else(|| RenderErrorReason::Other(format!("invalid column {n}")).into()),
            Value::String(name) => self
                .column_named(name)
                .ok_or_else(|| RenderErrorReason::Other(format!("unknown column {name:?}")).into()),
            other => Err(RenderErrorReason::Other(format!("invalid column {other}")).into()),
        }
    }

    fn header(&self, column: usize) -> Value {
        from_item_data(
            &self
                .source
                .header_data(column, Orientation::Horizontal, ItemRole::Display),
        )
    }

    fn cell(&self, parents: &[usize], row: usize, column: usize) -> Value {
        let Some(parent) = self.resolve(parents) else {
            return Value::Null;
        };
        let index = self.source.index(row, column, &parent);
        from_item_data(&self.source.data(&index, ItemRole::Display))
    }

    fn clear(&self) {
        *self.names.write() = None;
    }
}

fn column_param<'a>(h: &'a Helper<'_>, name: &'static str) -> std::result::Result<&'a Value, RenderError> {
    h.param(0)
        .map(|param| param.value())
        .ok_or_else(|| RenderErrorReason::ParamNotFoundForIndex(name, 0).into())
}

/// `{{data <col>}}`
struct DataHelper<S: ?Sized> {
    lookup: Arc<SourceLookup<S>>,
}

impl<S: ItemModel + ?Sized + 'static> HelperDef for DataHelper<S> {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let column = self.lookup.column_of(column_param(h, "data")?)?;
        let value = match Scope::of(ctx)? {
            Scope::Header { .. } => self.lookup.header(column),
            Scope::Cell { row, parents, .. } => self.lookup.cell(&parents, row, column),
        };
        Ok(ScopedJson::Derived(value))
    }
}

/// `{{header <col>}}`
struct HeaderHelper<S: ?Sized> {
    lookup: Arc<SourceLookup<S>>,
}

impl<S: ItemModel + ?Sized + 'static> HelperDef for HeaderHelper<S> {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let column = self.lookup.column_of(column_param(h, "header")?)?;
        Ok(ScopedJson::Derived(self.lookup.header(column)))
    }
}

/// `{{row}}`
struct RowHelper;

impl HelperDef for RowHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        _: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let row = match Scope::of(ctx)? {
            Scope::Cell { row, .. } => Value::from(row),
            Scope::Header { .. } => Value::Null,
        };
        Ok(ScopedJson::Derived(row))
    }
}

/// `{{col}}`
struct ColHelper;

impl HelperDef for ColHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        _: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> std::result::Result<ScopedJson<'rc>, RenderError> {
        let column = match Scope::of(ctx)? {
            Scope::Cell { col, .. } => col,
            Scope::Header { section } => section,
        };
        Ok(ScopedJson::Derived(Value::from(column)))
    }
}

/// Builder for a [`TemplateProxyModel`] with extra helpers.
pub struct TemplateProxyBuilder<S: ?Sized> {
    source: Arc<S>,
    columns: TemplateColumns,
    helpers: Vec<(String, Box<dyn HelperDef + Send + Sync>)>,
}

impl<S: ItemModel + ?Sized + 'static> TemplateProxyBuilder<S> {
    /// Registers an extra helper. Extra helpers replace built-ins of the
    /// same name.
    pub fn with_helper(
        mut self,
        name: impl Into<String>,
        helper: Box<dyn HelperDef + Send + Sync>,
    ) -> Self {
        self.helpers.push((name.into(), helper));
        self
    }

    /// Compiles the templates.
    ///
    /// Fails with [`Error::Template`] naming the first template that does
    /// not parse.
    pub fn build(self) -> Result<TemplateProxyModel<S>> {
        let lookup = Arc::new(SourceLookup {
            source: self.source,
            names: RwLock::new(None),
        });

        let mut registry = Handlebars::new();
        if !self.columns.escape_html {
            registry.register_escape_fn(handlebars::no_escape);
        }
        registry.register_helper(
            "data",
            Box::new(DataHelper {
                lookup: Arc::clone(&lookup),
            }),
        );
        registry.register_helper(
            "header",
            Box::new(HeaderHelper {
                lookup: Arc::clone(&lookup),
            }),
        );
        registry.register_helper("row", Box::new(RowHelper));
        registry.register_helper("col", Box::new(ColHelper));
        for (name, helper) in self.helpers {
            registry.register_helper(&name, helper);
        }

        for (section, template) in self.columns.headers.iter().enumerate() {
            let name = header_template(section);
            registry
                .register_template_string(&name, template)
                .map_err(|err| Error::template(name, err))?;
        }
        for (column, template) in self.columns.data.iter().enumerate() {
            let name = data_template(column);
            registry
                .register_template_string(&name, template)
                .map_err(|err| Error::template(name, err))?;
        }

        let columns = self.columns.column_count();
        debug!(
            target: targets::TEMPLATE,
            columns,
            headers = self.columns.headers.len(),
            data = self.columns.data.len(),
            "created template proxy model"
        );
        Ok(TemplateProxyModel {
            lookup,
            registry,
            header_count: self.columns.headers.len(),
            data_count: self.columns.data.len(),
            columns,
            on_error: self.columns.on_error,
        })
    }
}

/// A proxy that renders its columns from templates over a source model.
///
/// Rows, children, and parents follow the source. Each proxy column shows a
/// rendered data template; horizontal headers show rendered header templates.
pub struct TemplateProxyModel<S: ?Sized> {
    lookup: Arc<SourceLookup<S>>,
    registry: Handlebars<'static>,
    header_count: usize,
    data_count: usize,
    columns: usize,
    on_error: RenderFailure,
}

impl<S: ItemModel + ?Sized + 'static> TemplateProxyModel<S> {
    /// Creates a proxy with the built-in helpers only.
    pub fn new(source: Arc<S>, columns: TemplateColumns) -> Result<Self> {
        Self::builder(source, columns).build()
    }

    /// Starts a builder for a proxy with extra helpers.
    pub fn builder(source: Arc<S>, columns: TemplateColumns) -> TemplateProxyBuilder<S> {
        TemplateProxyBuilder {
            source,
            columns,
            helpers: Vec::new(),
        }
    }

    /// Returns the source model.
    pub fn source(&self) -> &Arc<S> {
        &self.lookup.source
    }

    /// Maps a proxy index to the source index at the same position.
    pub fn map_to_source(&self, index: &ModelIndex) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        match self.lookup.resolve(&index.parent().row_path()) {
            Some(parent) => self.lookup.source.index(index.row(), index.column(), &parent),
            None => ModelIndex::invalid(),
        }
    }

    fn render(&self, name: &str, scope: &Scope) -> ItemData {
        match self.registry.render(name, scope) {
            Ok(text) => ItemData::String(text),
            Err(err) => {
                warn!(
                    target: targets::TEMPLATE,
                    template = name,
                    error = %err,
                    "template render failed"
                );
                match self.on_error {
                    RenderFailure::EmptyText => ItemData::String(String::new()),
                    RenderFailure::Absent => ItemData::None,
                }
            }
        }
    }
}

impl<S: ItemModel + ?Sized + 'static> ItemModel for TemplateProxyModel<S> {
    fn row_count(&self, parent: &ModelIndex) -> usize {
        match self.lookup.resolve(&parent.row_path()) {
            Some(source_parent) => self.lookup.source.row_count(&source_parent),
            None => 0,
        }
    }

    fn column_count(&self, _parent: &ModelIndex) -> usize {
        self.columns
    }

    fn data(&self, index: &ModelIndex, role: ItemRole) -> ItemData {
        if !index.is_valid() || !role.is_display() || index.column() >= self.data_count {
            return ItemData::None;
        }
        let scope = Scope::Cell {
            row: index.row(),
            col: index.column(),
            parents: index.parent().row_path(),
        };
        self.render(&data_template(index.column()), &scope)
    }

    fn index(&self, row: usize, column: usize, parent: &ModelIndex) -> ModelIndex {
        if column >= self.columns {
            return ModelIndex::invalid();
        }
        let Some(source_parent) = self.lookup.resolve(&parent.row_path()) else {
            return ModelIndex::invalid();
        };
        let source = self.lookup.source.index(row, 0, &source_parent);
        if !source.is_valid() {
            return ModelIndex::invalid();
        }
        ModelIndex::with_internal_id(row, column, parent.clone(), source.internal_id())
    }

    fn parent(&self, index: &ModelIndex) -> ModelIndex {
        if !index.is_valid() {
            return ModelIndex::invalid();
        }
        index.parent()
    }

    fn header_data(&self, section: usize, orientation: Orientation, role: ItemRole) -> ItemData {
        if !role.is_display() {
            return ItemData::None;
        }
        match orientation {
            Orientation::Horizontal if section < self.header_count => {
                self.render(&header_template(section), &Scope::Header { section })
            }
            Orientation::Horizontal => ItemData::None,
            Orientation::Vertical => ItemData::Int(section as i64),
        }
    }

    fn invalidate(&self) {
        self.lookup.clear();
        self.lookup.source.invalidate();
        debug!(target: targets::TEMPLATE, "invalidated template proxy model");
    }
}

#[cfg(test)]
mod tests {
    use handlebars::{HelperResult, JsonRender, Output};

    use super::*;
    use crate::model::{shared, RecordTableModel, ValueTreeModel};
    use crate::Reflect;

    #[derive(Reflect)]
    struct Person {
        #[lens(rename = "Name")]
        name: String,
        #[lens(rename = "Age")]
        age: u32,
    }

    fn people() -> Arc<RecordTableModel<Vec<Person>>> {
        let table = RecordTableModel::from_value(vec![
            Person {
                name: "Ada".into(),
                age: 42,
            },
            Person {
                name: "Alan".into(),
                age: 41,
            },
        ])
        .unwrap();
        Arc::new(table)
    }

    fn cell(model: &impl ItemModel, row: usize, column: usize) -> ItemData {
        let index = model.index(row, column, &ModelIndex::invalid());
        model.data(&index, ItemRole::Display)
    }

    #[test]
    fn test_data_by_name_and_index() {
        let columns = TemplateColumns::new()
            .with_column("{{data 1}}", "{{data \"Age\"}}")
            .with_column("Label", "{{data 0}} is {{data 1}}");
        let model = TemplateProxyModel::new(people(), columns).unwrap();

        assert_eq!(cell(&model, 0, 0), ItemData::from("42"));
        assert_eq!(cell(&model, 1, 1), ItemData::from("Alan is 41"));
        assert_eq!(
            model.header_data(0, Orientation::Horizontal, ItemRole::Display),
            ItemData::from("Age")
        );
        assert_eq!(
            model.header_data(1, Orientation::Horizontal, ItemRole::Display),
            ItemData::from("Label")
        );
    }

    #[test]
    fn test_row_and_col_helpers() {
        let columns = TemplateColumns::new().with_column("#{{col}}", "{{row}}:{{col}}");
        let model = TemplateProxyModel::new(people(), columns).unwrap();
        assert_eq!(cell(&model, 1, 0), ItemData::from("1:0"));
        assert_eq!(
            model.header_data(0, Orientation::Horizontal, ItemRole::Display),
            ItemData::from("#0")
        );
    }

    #[test]
    fn test_column_count_is_the_larger_list() {
        let columns = TemplateColumns::new()
            .with_header("A")
            .with_data("{{data 0}}")
            .with_data("{{data 1}}")
            .with_data("x");
        let model = TemplateProxyModel::new(people(), columns).unwrap();
        let root = ModelIndex::invalid();

        assert_eq!(model.row_count(&root), 2);
        assert_eq!(model.column_count(&root), 3);
        assert_eq!(cell(&model, 0, 2), ItemData::from("x"));
        assert_eq!(
            model.header_data(2, Orientation::Horizontal, ItemRole::Display),
            ItemData::None
        );
        assert!(!model.index(0, 3, &root).is_valid());
        assert!(!model.index(2, 0, &root).is_valid());

        let headers_only = TemplateProxyModel::new(
            people(),
            TemplateColumns::new().with_header("A").with_header("B"),
        )
        .unwrap();
        assert_eq!(headers_only.column_count(&root), 2);
        assert_eq!(cell(&headers_only, 0, 1), ItemData::None);
    }

    #[test]
    fn test_parse_error_fails_construction() {
        let columns = TemplateColumns::new().with_column("ok", "{{#if}}");
        match TemplateProxyModel::new(people(), columns) {
            Err(Error::Template { name, .. }) => assert_eq!(name, "data[0]"),
            _ => panic!("expected a template error"),
        }
    }

    #[test]
    fn test_render_failure_policy() {
        let columns = TemplateColumns::new().with_column("h", "{{data \"Missing\"}}");
        let model = TemplateProxyModel::new(people(), columns.clone()).unwrap();
        assert_eq!(cell(&model, 0, 0), ItemData::from(""));

        let model =
            TemplateProxyModel::new(people(), columns.with_on_error(RenderFailure::Absent)).unwrap();
        assert_eq!(cell(&model, 0, 0), ItemData::None);
    }

    #[test]
    fn test_escaping() {
        let table = RecordTableModel::from_value(vec![Person {
            name: "<b>".into(),
            age: 1,
        }])
        .unwrap();
        let table = Arc::new(table);

        let plain =
            TemplateProxyModel::new(Arc::clone(&table), TemplateColumns::new().with_data("{{data 0}}"))
                .unwrap();
        assert_eq!(cell(&plain, 0, 0), ItemData::from("<b>"));

        let escaped = TemplateProxyModel::new(
            table,
            TemplateColumns::new()
                .with_data("{{data 0}}")
                .with_escape_html(true),
        )
        .unwrap();
        assert_eq!(cell(&escaped, 0, 0), ItemData::from("&lt;b&gt;"));
    }

    fn shout(
        h: &Helper,
        _: &Handlebars,
        _: &Context,
        _: &mut RenderContext,
        out: &mut dyn Output,
    ) -> HelperResult {
        let text = h.param(0).map(|v| v.value().render()).unwrap_or_default();
        out.write(&text.to_uppercase())?;
        Ok(())
    }

    #[test]
    fn test_extra_helpers() {
        let columns = TemplateColumns::new().with_data("{{shout (data \"Name\")}}");
        let model = TemplateProxyModel::builder(people(), columns)
            .with_helper("shout", Box::new(shout))
            .build()
            .unwrap();
        assert_eq!(cell(&model, 0, 0), ItemData::from("ADA"));
    }

    #[test]
    fn test_invalidate_rebuilds_name_cache() {
        #[derive(Reflect)]
        struct Root {
            #[lens(rename = "Items")]
            items: Vec<u32>,
        }

        let value = shared(Root { items: vec![7] });
        let tree = Arc::new(ValueTreeModel::new(value.clone()).unwrap());
        let columns = TemplateColumns::new().with_column("{{data \"Value\"}}", "{{data \"Name\"}}");
        let model = TemplateProxyModel::new(Arc::clone(&tree), columns).unwrap();
        let root = ModelIndex::invalid();

        let items = model.index(0, 0, &root);
        assert_eq!(model.display_text(&items), Some("Items".into()));
        assert_eq!(model.row_count(&items), 1);
        let first = model.index(0, 0, &items);
        assert_eq!(model.parent(&first), items);
        assert_eq!(model.display_text(&first), Some("[0]".into()));
        assert_eq!(
            model.map_to_source(&first).internal_id(),
            first.internal_id()
        );

        value.write().items.push(8);
        model.invalidate();
        let items = model.index(0, 0, &root);
        assert_eq!(model.row_count(&items), 2);
        assert_eq!(
            model.header_data(0, Orientation::Horizontal, ItemRole::Display),
            ItemData::from("Value")
        );
    }

    #[test]
    fn test_columns_from_toml() {
        let columns = TemplateColumns::from_toml_str(
            r#"
            headers = ["Who"]
            data = ["{{data 0}}"]
            escape_html = true
            "#,
        )
        .unwrap();
        assert_eq!(columns.headers, vec!["Who".to_string()]);
        assert!(columns.escape_html);
        assert_eq!(columns.on_error, RenderFailure::EmptyText);

        assert!(matches!(
            TemplateColumns::from_toml_str("on_error = \"loud\""),
            Err(Error::Config(_))
        ));
    }
}
