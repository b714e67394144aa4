//! `partcat template` - the CSV import template

use miette::Result;

use crate::schema::TemplateGenerator;

/// Print the reference CSV, ready to redirect into a file and fill in
pub fn run() -> Result<()> {
    let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
    print!("{}", generator.csv_template());
    Ok(())
}
