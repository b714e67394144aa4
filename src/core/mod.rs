//! Core module - catalog state and the filter engine

pub mod config;
pub mod filter;
pub mod identity;
pub mod session;
pub mod store;

pub use config::Config;
pub use filter::{FilterField, FilterOptions, FilterState};
pub use identity::{IdParseError, ProductId};
pub use session::Session;
pub use store::{RecordStore, StoreError, UpsertOutcome};
