//! In-memory record store with an append-only audit log
//!
//! The store has exactly one writer: whoever holds `&mut RecordStore`.
//! Readers borrow it immutably, so filter queries always see a consistent
//! snapshot between two mutations.

use chrono::{DateTime, Duration, Utc};
use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

use crate::core::identity::ProductId;
use crate::entities::history::{HistoryAction, HistoryEntry, SYSTEM_SKU};
use crate::entities::product::Product;

/// Detail recorded for hand edits
pub const MANUAL_EDIT_DETAILS: &str = "Manual field edit.";

/// Why a product cannot be saved
#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum StoreError {
    #[error("a product needs a non-blank sku")]
    #[diagnostic(code(partcat::store::blank_sku))]
    BlankSku,

    #[error("sku '{0}' is reserved for catalog-wide audit entries")]
    #[diagnostic(
        code(partcat::store::reserved_sku),
        help("Choose another sku; bulk loads are recorded under this one")
    )]
    ReservedSku(String),
}

/// Check that `sku` can key a stored product
///
/// Blank skus cannot be looked up, and [`SYSTEM_SKU`] would mix the
/// product's history with bulk-load entries.
pub fn validate_sku(sku: &str) -> Result<(), StoreError> {
    if sku.trim().is_empty() {
        Err(StoreError::BlankSku)
    } else if sku == SYSTEM_SKU {
        Err(StoreError::ReservedSku(sku.to_string()))
    } else {
        Ok(())
    }
}

/// Result of [`RecordStore::upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// An existing product at this position was replaced
    Updated { position: usize },
    /// The product was appended as new
    Created { position: usize },
}

impl UpsertOutcome {
    pub fn action(&self) -> HistoryAction {
        match self {
            UpsertOutcome::Updated { .. } => HistoryAction::Update,
            UpsertOutcome::Created { .. } => HistoryAction::Create,
        }
    }
}

/// Ordered product collection plus its audit trail
#[derive(Debug, Default)]
pub struct RecordStore {
    products: Vec<Product>,
    history: Vec<HistoryEntry>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Products in store order
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Every audit entry, oldest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn get(&self, sku: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == sku)
    }

    fn position(&self, sku: &str) -> Option<usize> {
        self.products.iter().position(|p| p.sku == sku)
    }

    /// Swap in a whole new catalog and record one `BULK_LOAD` entry
    pub fn replace_all(
        &mut self,
        products: Vec<Product>,
        actor: &str,
        source_label: &str,
    ) -> &HistoryEntry {
        let count = products.len();
        self.products = products;
        info!(count, source = source_label, user = actor, "catalog replaced");
        self.record(
            actor,
            SYSTEM_SKU,
            HistoryAction::BulkLoad,
            format!("{} products loaded from {}", count, source_label),
        )
    }

    /// Insert or replace a product matched by sku
    ///
    /// An update keeps the product's position and its existing id; a create
    /// appends the product with a fresh id. Either way exactly one audit
    /// entry is written. A sku rejected by [`validate_sku`] changes nothing.
    pub fn upsert(
        &mut self,
        mut product: Product,
        actor: &str,
    ) -> Result<UpsertOutcome, StoreError> {
        validate_sku(&product.sku)?;
        let outcome = match self.position(&product.sku) {
            Some(position) => {
                product.id = self.products[position].id.clone();
                self.products[position] = product;
                UpsertOutcome::Updated { position }
            }
            None => {
                product.id = ProductId::new();
                self.products.push(product);
                UpsertOutcome::Created {
                    position: self.products.len() - 1,
                }
            }
        };

        let position = match outcome {
            UpsertOutcome::Updated { position } | UpsertOutcome::Created { position } => position,
        };
        let sku = self.products[position].sku.clone();
        info!(sku = %sku, action = %outcome.action(), user = actor, "product saved");
        self.record(actor, &sku, outcome.action(), MANUAL_EDIT_DETAILS.to_string());
        Ok(outcome)
    }

    /// Audit entries for one sku, newest first
    pub fn history_for(&self, sku: &str) -> Vec<&HistoryEntry> {
        let mut entries: Vec<&HistoryEntry> =
            self.history.iter().filter(|h| h.sku == sku).collect();
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        entries
    }

    /// Newest audit entry for one sku
    pub fn last_modified(&self, sku: &str) -> Option<&HistoryEntry> {
        self.history.iter().rev().find(|h| h.sku == sku)
    }

    fn record(
        &mut self,
        actor: &str,
        sku: &str,
        action: HistoryAction,
        details: String,
    ) -> &HistoryEntry {
        let date = self.next_timestamp();
        self.history.push(HistoryEntry {
            date,
            user: actor.to_string(),
            sku: sku.to_string(),
            action,
            details,
        });
        &self.history[self.history.len() - 1]
    }

    /// Wall clock, bumped so that entry dates are strictly increasing
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        match self.history.last() {
            Some(last) if now <= last.date => last.date + Duration::microseconds(1),
            _ => now,
        }
    }
}
