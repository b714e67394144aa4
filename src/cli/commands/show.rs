//! `partcat show` - one product as a data sheet

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::list::{print_products, product_row, PRODUCT_COLUMNS};
use crate::cli::table::{TableConfig, TableFormatter};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Session;
use crate::schema::TemplateGenerator;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Catalog file (.csv or .json)
    pub file: PathBuf,

    /// Product sku
    pub sku: String,
}

pub fn run(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let (session, format) = super::open_catalog(&args.file, global)?;
    show_product(&session, &args.sku, format)
}

/// Print one product from the session in `format`
pub fn show_product(session: &Session, sku: &str, format: OutputFormat) -> Result<()> {
    let product = session
        .store()
        .get(sku.trim())
        .ok_or_else(|| miette::miette!("No product with sku '{}'", sku.trim()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(product).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(product).into_diagnostic()?);
        }
        OutputFormat::Id => println!("{}", product.id),
        OutputFormat::Tsv => print_products(&[product], format, true)?,
        OutputFormat::Csv => {
            TableFormatter::new(PRODUCT_COLUMNS, "product")
                .with_config(TableConfig::for_pipe())
                .output(&[product_row(product)], format);
        }
        OutputFormat::Auto | OutputFormat::Md => {
            let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
            let history = session.store().history_for(&product.sku);
            let sheet = generator
                .render_product_sheet(product, &history)
                .map_err(|e| miette::miette!("{}", e))?;
            print!("{}", sheet);
        }
    }
    Ok(())
}
