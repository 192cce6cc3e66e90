//! Read-only view of the taxonomies registered with the content runtime.
//!
//! The registration subsystem itself lives outside Trellis; the query
//! rewriter only needs to know which non-built-in taxonomies exist, in
//! registration order.

/// The built-in tag taxonomy.
pub const POST_TAG: &str = "post_tag";

/// The built-in category taxonomy.
pub const CATEGORY: &str = "category";

/// Taxonomies that ship with the content runtime.
pub const BUILTIN_TAXONOMIES: &[&str] = &[
    CATEGORY,
    POST_TAG,
    "nav_menu",
    "link_category",
    "post_format",
];

/// Lookup over registered taxonomies.
pub trait TaxonomyCatalog: Send + Sync {
    /// Names of registered non-built-in taxonomies, in registration order.
    fn custom_taxonomies(&self) -> Vec<String>;
}

/// A catalog backed by an in-memory list.
#[derive(Debug, Clone, Default)]
pub struct StaticTaxonomyCatalog {
    names: Vec<String>,
}

impl StaticTaxonomyCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a taxonomy. Built-in names and repeats are ignored.
    ///
    /// Returns `true` if the taxonomy was newly added as a custom taxonomy.
    pub fn register(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty()
            || BUILTIN_TAXONOMIES.contains(&name.as_str())
            || self.names.contains(&name)
        {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.register(name);
        self
    }
}

impl TaxonomyCatalog for StaticTaxonomyCatalog {
    fn custom_taxonomies(&self) -> Vec<String> {
        self.names.clone()
    }
}
