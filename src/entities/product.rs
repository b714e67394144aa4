//! Product entity type - one sellable part in the catalog

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::identity::ProductId;

/// Image shown for products that carry no picture of their own
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/400x400/0f172a/fbbf24?text=NO+IMG";

/// Image assigned to a product created by hand
pub const NEW_PRODUCT_IMAGE: &str = "https://placehold.co/400x400/0f172a/fbbf24?text=NEW";

/// Vehicle compatibility for a part
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleApplication {
    #[serde(default, deserialize_with = "lenient_text")]
    pub make: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub model: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub engine: String,

    /// Free-form year or range label ("2015", "2009-2013"), never parsed
    #[serde(default, deserialize_with = "lenient_text")]
    pub years: String,
}

impl VehicleApplication {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        engine: impl Into<String>,
        years: impl Into<String>,
    ) -> Self {
        Self {
            make: make.into(),
            model: model.into(),
            engine: engine.into(),
            years: years.into(),
        }
    }
}

/// One row of the technical data sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub label: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub value: String,
}

impl SpecEntry {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A competing brand's part number that this product replaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    #[serde(default, deserialize_with = "lenient_text")]
    pub brand: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub part: String,
}

/// A catalog entry
///
/// `sku` is the key for upserts and audit lookups. Decoding never fails on
/// a field: values that are absent, `null` or of the wrong shape fall back to
/// the field's default. Callers decide what to do with a blank `sku`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Synthetic identifier, regenerated on every bulk load
    #[serde(default, deserialize_with = "id_or_fresh")]
    pub id: ProductId,

    /// Stock keeping unit
    #[serde(default, deserialize_with = "lenient_text")]
    pub sku: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub brand: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub category: String,

    /// Original equipment manufacturer reference number
    #[serde(default, deserialize_with = "lenient_text")]
    pub oem_ref: String,

    /// Product line
    #[serde(default, deserialize_with = "lenient_text")]
    pub line: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,

    /// Main picture URL
    #[serde(
        default = "default_image",
        deserialize_with = "image_or_placeholder",
        alias = "image_url"
    )]
    pub image_preview: String,

    /// Short key/value facts shown next to the picture
    #[serde(
        rename = "quickSpecs",
        alias = "quick_specs",
        default,
        deserialize_with = "lenient_map"
    )]
    pub quick_specs: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub specs: Vec<SpecEntry>,

    #[serde(default, deserialize_with = "lenient_list")]
    pub applications: Vec<VehicleApplication>,

    #[serde(
        rename = "crossReference",
        alias = "cross_reference",
        default,
        deserialize_with = "lenient_list"
    )]
    pub cross_reference: Vec<CrossReference>,

    /// Additional picture URLs
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<String>,
}

impl Product {
    /// Manual-create defaults: empty text, `NEW` picture, no nested data
    pub fn blank(sku: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(),
            sku: sku.into(),
            name: String::new(),
            brand: String::new(),
            category: String::new(),
            oem_ref: String::new(),
            line: String::new(),
            description: String::new(),
            image_preview: NEW_PRODUCT_IMAGE.to_string(),
            quick_specs: BTreeMap::new(),
            specs: Vec::new(),
            applications: Vec::new(),
            cross_reference: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Distinct makes this part fits, in first-seen order
    pub fn makes(&self) -> Vec<&str> {
        let mut makes: Vec<&str> = Vec::new();
        for app in &self.applications {
            if !app.make.is_empty() && !makes.contains(&app.make.as_str()) {
                makes.push(&app.make);
            }
        }
        makes
    }

    /// Overwrite one of the scalar fields editable by hand
    pub fn set_field(&mut self, field: ProductField, value: impl Into<String>) {
        let value = value.into();
        match field {
            ProductField::Name => self.name = value,
            ProductField::Brand => self.brand = value,
            ProductField::Category => self.category = value,
            ProductField::OemRef => self.oem_ref = value,
            ProductField::Line => self.line = value,
            ProductField::Description => self.description = value,
            ProductField::ImagePreview => self.image_preview = value,
        }
    }
}

/// Scalar fields that manual edits may change
///
/// Nested data (specs, applications, cross references) only arrives through
/// bulk ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Brand,
    Category,
    OemRef,
    Line,
    Description,
    ImagePreview,
}

impl ProductField {
    pub fn all() -> &'static [ProductField] {
        &[
            ProductField::Name,
            ProductField::Brand,
            ProductField::Category,
            ProductField::OemRef,
            ProductField::Line,
            ProductField::Description,
            ProductField::ImagePreview,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Name => "name",
            ProductField::Brand => "brand",
            ProductField::Category => "category",
            ProductField::OemRef => "oem_ref",
            ProductField::Line => "line",
            ProductField::Description => "description",
            ProductField::ImagePreview => "image_preview",
        }
    }
}

impl std::fmt::Display for ProductField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProductField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(ProductField::Name),
            "brand" => Ok(ProductField::Brand),
            "category" => Ok(ProductField::Category),
            "oem_ref" | "oem" => Ok(ProductField::OemRef),
            "line" => Ok(ProductField::Line),
            "description" => Ok(ProductField::Description),
            "image_preview" | "image_url" | "image" => Ok(ProductField::ImagePreview),
            _ => Err(format!(
                "Unknown field: {}. Use name, brand, category, oem_ref, line, description or image_url",
                s
            )),
        }
    }
}

fn id_or_fresh<'de, D>(deserializer: D) -> Result<ProductId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn default_image() -> String {
    PLACEHOLDER_IMAGE.to_string()
}

/// Text form of a scalar; numbers and booleans in exported catalogs are
/// read as text, anything else is empty
fn text_of(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(text_of)
}

/// Elements that fit `T` are kept, the rest skipped; a non-array is empty
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

fn lenient_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(entries) => Ok(entries
            .into_iter()
            .map(|(k, v)| (k, text_of(v)))
            .collect()),
        _ => Ok(BTreeMap::new()),
    }
}

fn image_or_placeholder<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let url = lenient_text(deserializer)?;
    if url.trim().is_empty() {
        Ok(default_image())
    } else {
        Ok(url)
    }
}
