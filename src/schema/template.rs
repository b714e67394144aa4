//! Embedded templates: the CSV export template and product data sheets

use rust_embed::Embed;
use serde::Serialize;
use tera::Tera;
use thiserror::Error;

use crate::entities::history::HistoryEntry;
use crate::entities::product::{Product, SpecEntry};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const CSV_TEMPLATE: &str = "catalog_import.csv";
const SHEET_TEMPLATE: &str = "product_sheet.md.tera";

const FALLBACK_CSV: &str = "sku,name,brand,category,oem_ref,description,image_url,make,model,year,engine\n\
FIL-001,Premium Oil Filter,Toyota,Engine,90915-YZZF1,High-flow filter,https://placehold.co/400x400,TOYOTA,Corolla,2015,1.8L\n";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

/// Audit entry flattened for display
#[derive(Debug, Serialize)]
struct SheetEntry {
    date: String,
    user: String,
    action: String,
    details: String,
}

impl From<&HistoryEntry> for SheetEntry {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            date: entry.date.format("%Y-%m-%d %H:%M:%S").to_string(),
            user: entry.user.clone(),
            action: entry.action.to_string(),
            details: entry.details.clone(),
        }
    }
}

pub struct TemplateGenerator {
    tera: Tera,
}

impl TemplateGenerator {
    /// Create a generator with every embedded `.tera` template registered
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if !filename.ends_with(".tera") {
                continue;
            }
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// The downloadable CSV reference file
    pub fn csv_template(&self) -> String {
        EmbeddedTemplates::get(CSV_TEMPLATE)
            .and_then(|file| String::from_utf8(file.data.into_owned()).ok())
            .unwrap_or_else(|| FALLBACK_CSV.to_string())
    }

    /// Render a Markdown data sheet for `product` with its audit trail
    pub fn render_product_sheet(
        &self,
        product: &Product,
        history: &[&HistoryEntry],
    ) -> Result<String, TemplateError> {
        let quick_specs: Vec<SpecEntry> = product
            .quick_specs
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(label, value)| SpecEntry::new(label.clone(), value.clone()))
            .collect();
        let entries: Vec<SheetEntry> = history.iter().map(|h| SheetEntry::from(*h)).collect();

        let mut context = tera::Context::new();
        context.insert("id", product.id.as_str());
        context.insert("sku", &product.sku);
        context.insert("name", &product.name);
        context.insert("brand", &product.brand);
        context.insert("category", &product.category);
        context.insert("oem_ref", &product.oem_ref);
        context.insert("line", &product.line);
        context.insert("description", &product.description);
        context.insert("image_preview", &product.image_preview);
        context.insert("quick_specs", &quick_specs);
        context.insert("specs", &product.specs);
        context.insert("applications", &product.applications);
        context.insert("cross_reference", &product.cross_reference);
        context.insert("history", &entries);

        // Try to use embedded template, fall back to hardcoded
        if self.tera.get_template_names().any(|n| n == SHEET_TEMPLATE) {
            self.tera
                .render(SHEET_TEMPLATE, &context)
                .map_err(|e| TemplateError::RenderError(e.to_string()))
        } else {
            Ok(hardcoded_product_sheet(product, &quick_specs, &entries))
        }
    }
}

fn dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn hardcoded_product_sheet(
    product: &Product,
    quick_specs: &[SpecEntry],
    history: &[SheetEntry],
) -> String {
    let mut out = format!("# {} · {}\n\n", product.sku, product.name);
    out.push_str("| | |\n|---|---|\n");
    out.push_str(&format!("| Brand | {} |\n", product.brand));
    out.push_str(&format!("| Category | {} |\n", product.category));
    out.push_str(&format!("| OEM reference | {} |\n", dash(&product.oem_ref)));
    out.push_str(&format!("| Line | {} |\n", dash(&product.line)));
    out.push_str(&format!("| Picture | {} |\n", product.image_preview));
    if !product.description.is_empty() {
        out.push_str(&format!("\n{}\n", product.description));
    }

    if !quick_specs.is_empty() {
        out.push_str("\n## Quick specs\n\n");
        for spec in quick_specs {
            out.push_str(&format!("- **{}:** {}\n", spec.label, spec.value));
        }
    }
    if !product.specs.is_empty() {
        out.push_str("\n## Specifications\n\n| Spec | Value |\n|---|---|\n");
        for spec in &product.specs {
            out.push_str(&format!("| {} | {} |\n", spec.label, spec.value));
        }
    }
    if !product.applications.is_empty() {
        out.push_str("\n## Applications\n\n| Make | Model | Engine | Years |\n|---|---|---|---|\n");
        for app in &product.applications {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                app.make, app.model, app.engine, app.years
            ));
        }
    }
    if !product.cross_reference.is_empty() {
        out.push_str("\n## Cross reference\n\n| Brand | Part |\n|---|---|\n");
        for xref in &product.cross_reference {
            out.push_str(&format!("| {} | {} |\n", xref.brand, xref.part));
        }
    }
    if !history.is_empty() {
        out.push_str("\n## Audit trail\n\n| Date | User | Action | Details |\n|---|---|---|---|\n");
        for entry in history {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                entry.date, entry.user, entry.action, entry.details
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::RecordStore;
    use crate::entities::product::{CrossReference, VehicleApplication};

    fn sample() -> Product {
        let mut p = Product::blank("FIL-001");
        p.name = "Oil Filter".to_string();
        p.brand = "Toyota".to_string();
        p.category = "Engine".to_string();
        p.quick_specs.insert("info".to_string(), "Thread 3/4-16".to_string());
        p.specs.push(SpecEntry::new("Origin", "Imported (CSV)"));
        p.applications
            .push(VehicleApplication::new("TOYOTA", "Corolla", "1.8L", "2015"));
        p.cross_reference.push(CrossReference {
            brand: "Bosch".to_string(),
            part: "F026407157".to_string(),
        });
        p
    }

    #[test]
    fn test_csv_template() {
        let generator = TemplateGenerator::new().unwrap();
        insta::assert_snapshot!(generator.csv_template(), @r"
        sku,name,brand,category,oem_ref,description,image_url,make,model,year,engine
        FIL-001,Premium Oil Filter,Toyota,Engine,90915-YZZF1,High-flow filter,https://placehold.co/400x400,TOYOTA,Corolla,2015,1.8L
        ");
    }

    #[test]
    fn test_csv_template_is_importable() {
        let generator = TemplateGenerator::new().unwrap();
        let parsed = crate::import::parse_text(
            crate::import::SourceFormat::Csv,
            &generator.csv_template(),
            "template.csv",
            &crate::import::IngestOptions::default(),
        )
        .unwrap();
        assert_eq!(parsed.products.len(), 1);
        assert_eq!(parsed.products[0].sku, "FIL-001");
    }

    #[test]
    fn test_product_sheet_sections() {
        let generator = TemplateGenerator::new().unwrap();
        let mut store = RecordStore::new();
        store.replace_all(vec![sample()], "Admin", "seed.csv");
        let edited = sample();
        store.upsert(edited, "Maria").unwrap();

        let product = store.get("FIL-001").unwrap();
        let sheet = generator
            .render_product_sheet(product, &store.history_for("FIL-001"))
            .unwrap();

        assert!(sheet.contains("# FIL-001 · Oil Filter"));
        assert!(sheet.contains("Thread 3/4-16"));
        assert!(sheet.contains("| TOYOTA | Corolla | 1.8L | 2015 |"));
        assert!(sheet.contains("| Bosch | F026407157 |"));
        assert!(sheet.contains("Maria"));
        assert!(sheet.contains("UPDATE"));
    }

    #[test]
    fn test_fallback_matches_headings() {
        let product = sample();
        let quick = vec![SpecEntry::new("info", "Thread 3/4-16")];
        let sheet = hardcoded_product_sheet(&product, &quick, &[]);
        assert!(sheet.starts_with("# FIL-001 · Oil Filter"));
        assert!(sheet.contains("## Applications"));
        assert!(!sheet.contains("## Audit trail"));
    }
}
