//! Taxonomy catalog shared between the site and its rewriter.

use parking_lot::RwLock;

use trellis_core::{StaticTaxonomyCatalog, TaxonomyCatalog};

/// A [`StaticTaxonomyCatalog`] that can grow after the rewriter holds it.
#[derive(Debug, Default)]
pub struct SharedTaxonomies {
    inner: RwLock<StaticTaxonomyCatalog>,
}

impl SharedTaxonomies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a custom taxonomy. See [`StaticTaxonomyCatalog::register`].
    pub fn register(&self, name: &str) -> bool {
        self.inner.write().register(name)
    }
}

impl TaxonomyCatalog for SharedTaxonomies {
    fn custom_taxonomies(&self) -> Vec<String> {
        self.inner.read().custom_taxonomies()
    }
}
