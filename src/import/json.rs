//! JSON ingestion: a top-level array of product objects

use serde_json::Value;

use crate::entities::product::Product;

use super::IngestError;

/// Decode `text` into one outcome per array element
///
/// Only a document that is not JSON, or not an array, fails. Each element is
/// taken as supplied: fields of the wrong shape fall back to their defaults.
/// An element that is not an object, or whose `sku` is blank, comes back as
/// `Err` with the reason it cannot be stored.
pub fn parse_products(
    text: &str,
    source_label: &str,
) -> Result<Vec<Result<Product, &'static str>>, IngestError> {
    let failure = |reason: String| IngestError::ParseFailure {
        source_label: source_label.to_string(),
        reason,
    };

    let document: Value =
        serde_json::from_str(text).map_err(|e| failure(format!("invalid JSON: {}", e)))?;

    let elements = match document {
        Value::Array(elements) => elements,
        other => {
            return Err(failure(format!(
                "expected a top-level array, found {}",
                kind(&other)
            )))
        }
    };

    Ok(elements.into_iter().map(decode_element).collect())
}

fn decode_element(element: Value) -> Result<Product, &'static str> {
    if !element.is_object() {
        return Err("not an object");
    }
    let product: Product = serde_json::from_value(element).map_err(|_| "not an object")?;
    if product.sku.trim().is_empty() {
        return Err("missing sku");
    }
    Ok(product)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
