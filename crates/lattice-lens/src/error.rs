//! Error types for model construction and template configuration.
//!
//! Only construction can fail. Queries against a built model never return
//! errors; out-of-range or unsupported requests resolve to
//! [`ItemData::None`](crate::model::ItemData::None).

/// Result type alias for lattice-lens operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The wrapped value does not have a shape the model can display.
    #[error("{model} requires {expected}, found {found}")]
    NotApplicable {
        model: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A column template failed to parse.
    #[error("Invalid template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    /// A template column configuration failed to deserialize.
    #[error("Invalid template configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl Error {
    /// Create a not-applicable error.
    pub fn not_applicable(
        model: &'static str,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::NotApplicable {
            model,
            expected,
            found: found.into(),
        }
    }

    /// Create a template error.
    pub fn template(name: impl Into<String>, source: handlebars::TemplateError) -> Self {
        Self::Template {
            name: name.into(),
            source: Box::new(source),
        }
    }
}
