//! `partcat options` - what can be selected next

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::open_catalog;
use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{FilterField, FilterOptions};

#[derive(clap::Args, Debug)]
pub struct OptionsArgs {
    /// Catalog file (.csv or .json)
    pub file: PathBuf,

    /// Vehicle make
    #[arg(long)]
    pub make: Option<String>,

    /// Vehicle model (needs --make)
    #[arg(long, requires = "make")]
    pub model: Option<String>,
}

pub fn run(args: OptionsArgs, global: &GlobalOpts) -> Result<()> {
    let (mut session, format) = open_catalog(&args.file, global)?;

    if let Some(ref make) = args.make {
        session.set_filter(FilterField::Make, make.as_str());
    }
    if let Some(ref model) = args.model {
        session.set_filter(FilterField::Model, model.as_str());
    }

    print_options(&session.options(), format)
}

fn sections(options: &FilterOptions) -> [(&'static str, &Vec<String>); 4] {
    [
        ("Makes", &options.makes),
        ("Models", &options.models),
        ("Years", &options.years),
        ("Categories", &options.categories),
    ]
}

/// Print the four option lists
pub fn print_options(options: &FilterOptions, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(options).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(options).into_diagnostic()?);
        }
        OutputFormat::Md => {
            for (title, values) in sections(options) {
                println!("## {}\n", title);
                if values.is_empty() {
                    println!("_none_");
                }
                for value in values {
                    println!("- {}", value);
                }
                println!();
            }
        }
        OutputFormat::Csv => {
            println!("dimension,value");
            for (title, values) in sections(options) {
                for value in values {
                    println!("{},{}", title.to_lowercase(), escape_csv(value));
                }
            }
        }
        OutputFormat::Tsv | OutputFormat::Id => {
            for (title, values) in sections(options) {
                for value in values {
                    println!("{}\t{}", title.to_lowercase(), value);
                }
            }
        }
        OutputFormat::Auto => {
            for (title, values) in sections(options) {
                println!("{}", style(title).bold());
                if values.is_empty() {
                    println!("  {}", style("-").dim());
                }
                for value in values {
                    println!("  {}", value);
                }
            }
        }
    }
    Ok(())
}
