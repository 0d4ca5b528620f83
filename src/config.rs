//! Per-run settings, constructed once by the caller and threaded through the
//! declaration and reporting phases.

/// Settings for a single aggregation run.
#[derive(Debug, Clone, Default)]
pub struct ReportConfig {
    /// Root path that sourcefile attributions are made relative to.
    /// Declarations whose file lies outside this root are excluded from
    /// attribution. `None` means paths are recorded as supplied.
    pub source_root: Option<String>,

    /// Identifier used to name the `report`, `group` and `sessioninfo`
    /// nodes of the emitted document.
    pub root_module: String,
}

impl ReportConfig {
    pub fn new(root_module: impl Into<String>) -> Self {
        Self {
            source_root: None,
            root_module: root_module.into(),
        }
    }

    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<String>) -> Self {
        self.source_root = Some(root.into());
        self
    }
}
