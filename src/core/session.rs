//! Application state for one catalog session
//!
//! Owns the record store, the filter selection, the acting user and the
//! ingestion settings. The CLI threads a `Session` through every command
//! instead of keeping any of this in globals.

use std::path::Path;

use crate::core::config::Config;
use crate::core::filter::{apply_filters, FilterField, FilterOptions, FilterState};
use crate::core::store::{RecordStore, StoreError, UpsertOutcome};
use crate::entities::product::Product;
use crate::import::{self, IngestError, IngestOptions, LoadReport};

/// One user's working session
#[derive(Debug)]
pub struct Session {
    store: RecordStore,
    filters: FilterState,
    user: String,
    options: IngestOptions,
}

impl Session {
    pub fn new(user: impl Into<String>, options: IngestOptions) -> Self {
        Self {
            store: RecordStore::new(),
            filters: FilterState::new(),
            user: user.into(),
            options,
        }
    }

    /// Start an empty session from resolved configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.user(), config.ingest_options())
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Change the label written to subsequent audit entries
    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = user.into();
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn ingest_options(&self) -> &IngestOptions {
        &self.options
    }

    /// Apply one selection; the cascade reset happens in the same step
    pub fn set_filter(&mut self, field: FilterField, value: impl Into<String>) {
        self.filters.set(field, value);
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Products passing the current filters, in store order
    pub fn results(&self) -> Vec<&Product> {
        apply_filters(self.store.products(), &self.filters)
    }

    /// Option lists for the current selection
    pub fn options(&self) -> FilterOptions {
        FilterOptions::compute(self.store.products(), &self.filters)
    }

    /// Replace the catalog from a file on disk
    ///
    /// The filter selection is kept; options that no longer exist simply
    /// match nothing until changed.
    pub fn load_file(&mut self, path: &Path) -> Result<LoadReport, IngestError> {
        import::ingest_file(&mut self.store, path, &self.user, &self.options)
    }

    /// Replace the catalog from already-read text named `file_name`
    pub fn load_text(&mut self, file_name: &str, text: &str) -> Result<LoadReport, IngestError> {
        import::ingest_text(&mut self.store, file_name, text, &self.user, &self.options)
    }

    /// Create or update one product as the current user
    pub fn save_product(&mut self, product: Product) -> Result<UpsertOutcome, StoreError> {
        self.store.upsert(product, &self.user)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(crate::core::config::DEFAULT_USER, IngestOptions::default())
    }
}
