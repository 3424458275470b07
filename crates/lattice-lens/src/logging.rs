//! Logging targets for lattice-lens.
//!
//! lattice-lens uses the `tracing` crate for instrumentation and never
//! installs a subscriber itself. To see logs, install one in your
//! application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("lattice_lens::tree=trace")
//!     .init();
//! ```
//!
//! Model construction and invalidation are logged at `debug`, node
//! materialization and name-cache builds at `trace`, and template render
//! failures at `warn`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Flat list model target.
    pub const LIST: &str = "lattice_lens::list";
    /// Record table model target.
    pub const TABLE: &str = "lattice_lens::table";
    /// Lazy tree model target.
    pub const TREE: &str = "lattice_lens::tree";
    /// Template projection model target.
    pub const TEMPLATE: &str = "lattice_lens::template";
}
