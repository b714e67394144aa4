//! `partcat list` - filtered product listing

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::open_catalog;
use crate::cli::helpers::makes_summary;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::FilterField;
use crate::entities::product::Product;

/// Columns of every product listing
pub const PRODUCT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("sku", "SKU", 16),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("brand", "BRAND", 16),
    ColumnDef::new("category", "CATEGORY", 16),
    ColumnDef::new("makes", "FITS", 28),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Catalog file (.csv or .json)
    pub file: PathBuf,

    /// Vehicle make
    #[arg(long)]
    pub make: Option<String>,

    /// Vehicle model (needs --make)
    #[arg(long, requires = "make")]
    pub model: Option<String>,

    /// Year label (needs --model)
    #[arg(long, requires = "model")]
    pub year: Option<String>,

    /// Product category
    #[arg(long, short = 'c')]
    pub category: Option<String>,

    /// Case-insensitive text in sku, name, OEM reference or cross reference
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only the count
    #[arg(long)]
    pub count: bool,
}

pub fn run(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let (mut session, format) = open_catalog(&args.file, global)?;

    // Parents first so the cascade never drops a child set on the command line
    let selections = [
        (FilterField::Make, &args.make),
        (FilterField::Model, &args.model),
        (FilterField::Year, &args.year),
        (FilterField::Category, &args.category),
        (FilterField::Search, &args.search),
    ];
    for (field, value) in selections {
        if let Some(value) = value {
            session.set_filter(field, value.as_str());
        }
    }

    let mut results = session.results();
    if let Some(limit) = args.limit {
        results.truncate(limit);
    }

    if args.count {
        println!("{}", results.len());
        return Ok(());
    }

    if !global.quiet {
        if let Some(vehicle) = session.filters().vehicle_label() {
            eprintln!("{} Fits {}", style("→").blue(), style(vehicle).cyan());
        }
    }

    print_products(&results, format, global.quiet)
}

/// One table row per product
pub fn product_row(product: &Product) -> TableRow {
    TableRow::new(product.sku.clone())
        .cell("sku", CellValue::Sku(product.sku.clone()))
        .cell("name", CellValue::Text(product.name.clone()))
        .cell("brand", CellValue::Text(product.brand.clone()))
        .cell("category", CellValue::Category(product.category.clone()))
        .cell("makes", CellValue::Makes(makes_summary(product)))
}

/// Print products in the requested format
pub fn print_products(products: &[&Product], format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(products).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(products).into_diagnostic()?;
            print!("{}", yaml);
        }
        _ => {
            if products.is_empty() && format == OutputFormat::Auto && !quiet {
                println!("No products match the current filters.");
                return Ok(());
            }
            let config = if quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            let rows: Vec<TableRow> = products.iter().map(|p| product_row(p)).collect();
            TableFormatter::new(PRODUCT_COLUMNS, "product")
                .with_config(config)
                .output(&rows, format);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::product::VehicleApplication;

    #[test]
    fn test_product_row_cells() {
        let mut p = Product::blank("FIL-001");
        p.name = "Oil Filter".to_string();
        p.applications
            .push(VehicleApplication::new("TOYOTA", "Corolla", "1.8L", "2015"));

        let row = product_row(&p);
        assert_eq!(row.key, "FIL-001");
        assert_eq!(row.get("makes").map(CellValue::raw).as_deref(), Some("TOYOTA"));
        assert_eq!(row.get("name").map(CellValue::raw).as_deref(), Some("Oil Filter"));
    }
}
