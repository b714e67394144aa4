//! Entity type definitions
//!
//! - [`Product`] - a catalog part with its vehicle applications and cross references
//! - [`HistoryEntry`] - one append-only audit record

pub mod history;
pub mod product;

pub use history::{HistoryAction, HistoryEntry};
pub use product::{CrossReference, Product, ProductField, SpecEntry, VehicleApplication};
