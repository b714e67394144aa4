//! Record mapper: flat CSV rows to nested products
//!
//! Defaults for absent or empty columns live here and nowhere else.

use serde::Deserialize;
use std::collections::BTreeMap;
use ulid::Ulid;

use crate::core::identity::ProductId;
use crate::entities::product::{Product, SpecEntry, VehicleApplication, PLACEHOLDER_IMAGE};

use super::tokenizer::CsvRow;

/// Language of the placeholder texts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Locale::En => write!(f, "en"),
            Locale::Es => write!(f, "es"),
        }
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::En),
            "es" | "spanish" | "español" => Ok(Locale::Es),
            _ => Err(format!("Unknown locale: {}. Use en or es", s)),
        }
    }
}

/// Values filled in for missing CSV columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholders {
    pub name: String,
    pub brand: String,
    pub category: String,
    /// Model of an application whose row has a make but no model
    pub model: String,
    /// Years of an application whose row has a make but no year
    pub years: String,
    /// Label/value of the spec entry that marks imported records
    pub origin_label: String,
    pub origin_value: String,
    pub image: String,
}

impl Placeholders {
    pub fn english() -> Self {
        Self {
            name: "New Product".to_string(),
            brand: "Generic".to_string(),
            category: "General".to_string(),
            model: "Various".to_string(),
            years: "All".to_string(),
            origin_label: "Origin".to_string(),
            origin_value: "Imported (CSV)".to_string(),
            image: PLACEHOLDER_IMAGE.to_string(),
        }
    }

    pub fn spanish() -> Self {
        Self {
            name: "Producto Nuevo".to_string(),
            brand: "Genérico".to_string(),
            category: "General".to_string(),
            model: "Varios".to_string(),
            years: "Todos".to_string(),
            origin_label: "Origen".to_string(),
            origin_value: "Importado (CSV)".to_string(),
            image: PLACEHOLDER_IMAGE.to_string(),
        }
    }

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::english(),
            Locale::Es => Self::spanish(),
        }
    }
}

impl Default for Placeholders {
    fn default() -> Self {
        Self::english()
    }
}

fn or_placeholder(row: &CsvRow, field: &str, placeholder: &str) -> String {
    row.field(field).unwrap_or(placeholder).to_string()
}

/// Build a product from one row, or `None` when the row has no sku
///
/// CSV cannot carry cross references or extra images; those stay empty.
pub fn map_row(row: &CsvRow, id: ProductId, placeholders: &Placeholders) -> Option<Product> {
    let sku = row.field("sku")?.to_string();

    let applications = match row.field("make") {
        Some(make) => vec![VehicleApplication {
            make: make.to_string(),
            model: or_placeholder(row, "model", &placeholders.model),
            engine: row.get("engine").to_string(),
            years: or_placeholder(row, "year", &placeholders.years),
        }],
        None => Vec::new(),
    };

    let mut quick_specs = BTreeMap::new();
    quick_specs.insert("info".to_string(), row.get("specs_info").to_string());

    Some(Product {
        id,
        sku,
        name: or_placeholder(row, "name", &placeholders.name),
        brand: or_placeholder(row, "brand", &placeholders.brand),
        category: or_placeholder(row, "category", &placeholders.category),
        oem_ref: row.get("oem_ref").to_string(),
        line: row.get("line").to_string(),
        description: row.get("description").to_string(),
        image_preview: or_placeholder(row, "image_url", &placeholders.image),
        quick_specs,
        specs: vec![SpecEntry::new(
            placeholders.origin_label.clone(),
            placeholders.origin_value.clone(),
        )],
        applications,
        cross_reference: Vec::new(),
        images: Vec::new(),
    })
}

/// Id for the row at `index` of the batch stamped `batch`
pub fn row_id(batch: Ulid, index: usize) -> ProductId {
    ProductId::for_row(batch, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::tokenizer::tokenize;

    fn first_row(text: &str) -> CsvRow {
        tokenize(text).unwrap().rows.remove(0)
    }

    #[test]
    fn test_full_row_maps_every_field() {
        let row = first_row(
            "sku,name,brand,category,oem_ref,line,description,image_url,specs_info,make,model,year,engine\n\
             FIL-001,Oil Filter,Toyota,Engine,90915-YZZF1,Premium,High flow,https://img/x.png,Thread 3/4-16,TOYOTA,Corolla,2015,1.8L\n",
        );
        let p = map_row(&row, ProductId::new(), &Placeholders::english()).unwrap();

        assert_eq!(p.sku, "FIL-001");
        assert_eq!(p.name, "Oil Filter");
        assert_eq!(p.brand, "Toyota");
        assert_eq!(p.category, "Engine");
        assert_eq!(p.oem_ref, "90915-YZZF1");
        assert_eq!(p.line, "Premium");
        assert_eq!(p.description, "High flow");
        assert_eq!(p.image_preview, "https://img/x.png");
        assert_eq!(p.quick_specs.get("info").map(String::as_str), Some("Thread 3/4-16"));
        assert_eq!(p.specs, vec![SpecEntry::new("Origin", "Imported (CSV)")]);
        assert_eq!(
            p.applications,
            vec![VehicleApplication::new("TOYOTA", "Corolla", "1.8L", "2015")]
        );
        assert!(p.cross_reference.is_empty());
        assert!(p.images.is_empty());
    }

    #[test]
    fn test_missing_sku_yields_nothing() {
        let row = first_row("sku,name\n ,Orphan\n");
        assert!(map_row(&row, ProductId::new(), &Placeholders::english()).is_none());

        let row = first_row("name,brand\nOrphan,Acme\n");
        assert!(map_row(&row, ProductId::new(), &Placeholders::english()).is_none());
    }

    #[test]
    fn test_defaults_for_sparse_row() {
        let row = first_row("sku,name,brand,category,image_url\nX-1,,,,\n");
        let p = map_row(&row, ProductId::new(), &Placeholders::english()).unwrap();
        assert_eq!(p.name, "New Product");
        assert_eq!(p.brand, "Generic");
        assert_eq!(p.category, "General");
        assert_eq!(p.oem_ref, "");
        assert_eq!(p.image_preview, PLACEHOLDER_IMAGE);
        assert_eq!(p.quick_specs.get("info").map(String::as_str), Some(""));
        assert!(p.applications.is_empty());
    }

    #[test]
    fn test_make_without_model_or_year() {
        let row = first_row("sku,make\nX-1,NISSAN\n");
        let p = map_row(&row, ProductId::new(), &Placeholders::spanish()).unwrap();
        assert_eq!(
            p.applications,
            vec![VehicleApplication::new("NISSAN", "Varios", "", "Todos")]
        );
        assert_eq!(p.name, "Producto Nuevo");
        assert_eq!(p.brand, "Genérico");
        assert_eq!(p.specs[0].label, "Origen");
    }

    #[test]
    fn test_model_without_make_is_ignored() {
        let row = first_row("sku,model,year\nX-1,Corolla,2015\n");
        let p = map_row(&row, ProductId::new(), &Placeholders::english()).unwrap();
        assert!(p.applications.is_empty());
    }

    #[test]
    fn test_row_id_carries_batch() {
        let batch = Ulid::new();
        assert_eq!(row_id(batch, 3).ulid(), Some(batch));
    }

    #[test]
    fn test_locale_parsing() {
        assert_eq!("ES".parse::<Locale>(), Ok(Locale::Es));
        assert_eq!("english".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }
}
