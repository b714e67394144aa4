//! Template generation: CSV import template and product data sheets

pub mod template;

pub use template::{TemplateError, TemplateGenerator};
