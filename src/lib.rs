//! partcat: automotive parts catalog
//!
//! Loads a parts inventory from CSV or JSON exports, narrows it with a
//! cascading make → model → year filter, and keeps an audit trail of every
//! bulk load and manual edit for the lifetime of one session.

pub mod cli;
pub mod core;
pub mod entities;
pub mod import;
pub mod schema;
