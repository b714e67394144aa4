//! `partcat shell` - one interactive catalog session
//!
//! Commands are read line by line from stdin, so a session can also be
//! scripted by piping a file in. A failing command prints its error and
//! the session carries on with the catalog untouched.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::cli::commands::list::print_products;
use crate::cli::commands::options::print_options;
use crate::cli::commands::show::show_product;
use crate::cli::commands::{config_and_format, print_load_report};
use crate::cli::helpers::split_assignment;
use crate::cli::table::{CellValue, ColumnDef, TableConfig, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{FilterField, Session, UpsertOutcome};
use crate::entities::history::HistoryEntry;
use crate::entities::product::{Product, ProductField};
use crate::schema::TemplateGenerator;

const HISTORY_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("date", "DATE", 19),
    ColumnDef::new("user", "USER", 16),
    ColumnDef::new("sku", "SKU", 16),
    ColumnDef::new("action", "ACTION", 9),
    ColumnDef::new("details", "DETAILS", 48),
];

const HELP: &str = "\
load <FILE>                     replace the catalog from a .csv or .json file
user [NAME]                     show or change the audit user
set <FIELD> [VALUE]             select make, model, year, category or search
clear                           reset every filter
filters                         show the current selection
options                         list what can be selected next
list [LIMIT]                    products matching the filters
show <SKU>                      product data sheet
history [SKU]                   audit trail, newest first
new <SKU> [FIELD=VALUE ...]     add a product by hand
edit <SKU> FIELD=VALUE ...      change name, brand, category, oem_ref, line, description or image
template                        print the CSV import template
help                            this text
quit                            end the session";

#[derive(clap::Args, Debug)]
pub struct ShellArgs {
    /// Catalog file to load before reading commands
    pub file: Option<PathBuf>,
}

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Load(PathBuf),
    User(Option<String>),
    Set(FilterField, String),
    Clear,
    Filters,
    Options,
    List(Option<usize>),
    Show(String),
    History(Option<String>),
    New(String, Vec<(ProductField, String)>),
    Edit(String, Vec<(ProductField, String)>),
    Template,
    Help,
    Quit,
    /// Blank line or `#` comment
    Nothing,
}

/// Parse `FIELD=VALUE` pairs; words without `=` continue the previous value
fn parse_assignments(words: &[&str]) -> std::result::Result<Vec<(ProductField, String)>, String> {
    let mut fields: Vec<(ProductField, String)> = Vec::new();
    for word in words {
        match split_assignment(word) {
            Some((key, value)) => {
                let field: ProductField = key.parse()?;
                fields.push((field, value.to_string()));
            }
            None => match fields.last_mut() {
                Some((_, value)) => {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(word);
                }
                None => return Err(format!("Expected FIELD=VALUE, got '{}'", word)),
            },
        }
    }
    Ok(fields)
}

fn required<'a>(arg: Option<&'a str>, usage: &str) -> std::result::Result<&'a str, String> {
    arg.filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Usage: {}", usage))
}

impl std::str::FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(ShellCommand::Nothing);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let words: Vec<&str> = rest.split_whitespace().collect();
        let rest_opt = Some(rest).filter(|s| !s.is_empty());

        match verb.to_lowercase().as_str() {
            "load" => Ok(ShellCommand::Load(PathBuf::from(required(rest_opt, "load <FILE>")?))),
            "user" => Ok(ShellCommand::User(rest_opt.map(str::to_string))),
            "set" => {
                let field = required(words.first().copied(), "set <FIELD> [VALUE]")?;
                let value = rest[field.len()..].trim();
                Ok(ShellCommand::Set(field.parse()?, value.to_string()))
            }
            "clear" => Ok(ShellCommand::Clear),
            "filters" => Ok(ShellCommand::Filters),
            "options" => Ok(ShellCommand::Options),
            "list" | "ls" => match rest_opt {
                Some(n) => n
                    .parse()
                    .map(|n| ShellCommand::List(Some(n)))
                    .map_err(|_| format!("Invalid limit: {}", n)),
                None => Ok(ShellCommand::List(None)),
            },
            "show" => Ok(ShellCommand::Show(required(rest_opt, "show <SKU>")?.to_string())),
            "history" => Ok(ShellCommand::History(rest_opt.map(str::to_string))),
            "new" => {
                let sku = required(words.first().copied(), "new <SKU> [FIELD=VALUE ...]")?;
                Ok(ShellCommand::New(sku.to_string(), parse_assignments(&words[1..])?))
            }
            "edit" => {
                let sku = required(words.first().copied(), "edit <SKU> FIELD=VALUE ...")?;
                let fields = parse_assignments(&words[1..])?;
                if fields.is_empty() {
                    return Err("Usage: edit <SKU> FIELD=VALUE ...".to_string());
                }
                Ok(ShellCommand::Edit(sku.to_string(), fields))
            }
            "template" => Ok(ShellCommand::Template),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("Unknown command: {}. Type 'help' for a list", other)),
        }
    }
}

pub fn run(args: ShellArgs, global: &GlobalOpts) -> Result<()> {
    let (config, format) = config_and_format(global);
    let mut session = Session::from_config(&config);
    let interactive = console::user_attended();

    if !global.quiet && interactive {
        println!(
            "{} partcat shell as {}. Type 'help' for commands.",
            style("→").blue(),
            style(session.user()).cyan()
        );
    }

    if let Some(ref file) = args.file {
        execute(&mut session, ShellCommand::Load(file.clone()), format, global.quiet);
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            print!("{} ", style("partcat>").bold());
            io::stdout().flush().into_diagnostic()?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.into_diagnostic()?;

        match line.parse::<ShellCommand>() {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => execute(&mut session, command, format, global.quiet),
            Err(message) => eprintln!("{} {}", style("✗").red(), message),
        }
    }
    Ok(())
}

/// Run one command; errors are reported and swallowed
fn execute(session: &mut Session, command: ShellCommand, format: OutputFormat, quiet: bool) {
    if let Err(e) = dispatch(session, command, format, quiet) {
        eprintln!("{:?}", e);
    }
}

fn dispatch(
    session: &mut Session,
    command: ShellCommand,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        ShellCommand::Load(path) => {
            let report = session.load_file(&path)?;
            print_load_report(&report);
        }
        ShellCommand::User(Some(name)) => {
            session.set_user(name);
            println!("{} Acting as {}", style("✓").green(), style(session.user()).cyan());
        }
        ShellCommand::User(None) => println!("{}", session.user()),
        ShellCommand::Set(field, value) => {
            session.set_filter(field, value);
            print_filters(session);
        }
        ShellCommand::Clear => {
            session.clear_filters();
            println!("{} Filters cleared", style("✓").green());
        }
        ShellCommand::Filters => print_filters(session),
        ShellCommand::Options => print_options(&session.options(), format)?,
        ShellCommand::List(limit) => {
            let mut results = session.results();
            if let Some(limit) = limit {
                results.truncate(limit);
            }
            print_products(&results, format, quiet)?;
        }
        ShellCommand::Show(sku) => show_product(session, &sku, format)?,
        ShellCommand::History(sku) => {
            let entries: Vec<&HistoryEntry> = match sku {
                Some(ref sku) => session.store().history_for(sku),
                None => session.store().history().iter().rev().collect(),
            };
            print_history(&entries, format, quiet)?;
        }
        ShellCommand::New(sku, fields) => {
            if session.store().get(&sku).is_some() {
                return Err(miette::miette!(
                    "Product '{}' already exists; use 'edit' to change it",
                    sku
                ));
            }
            let mut product = Product::blank(sku);
            for (field, value) in fields {
                product.set_field(field, value);
            }
            report_save(session.save_product(product)?, session);
        }
        ShellCommand::Edit(sku, fields) => {
            let mut product = session
                .store()
                .get(&sku)
                .cloned()
                .ok_or_else(|| miette::miette!("No product with sku '{}'", sku))?;
            for (field, value) in fields {
                product.set_field(field, value);
            }
            report_save(session.save_product(product)?, session);
        }
        ShellCommand::Template => {
            let generator = TemplateGenerator::new().map_err(|e| miette::miette!("{}", e))?;
            print!("{}", generator.csv_template());
        }
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit | ShellCommand::Nothing => {}
    }
    Ok(())
}

fn report_save(outcome: UpsertOutcome, session: &Session) {
    let (verb, position) = match outcome {
        UpsertOutcome::Created { position } => ("Created", position),
        UpsertOutcome::Updated { position } => ("Updated", position),
    };
    let sku = session
        .store()
        .products()
        .get(position)
        .map(|p| p.sku.as_str())
        .unwrap_or_default();
    println!(
        "{} {} {} as {}",
        style("✓").green(),
        verb,
        style(sku).cyan(),
        style(session.user()).cyan()
    );
}

fn print_filters(session: &Session) {
    let filters = session.filters();
    for field in [
        FilterField::Make,
        FilterField::Model,
        FilterField::Year,
        FilterField::Category,
        FilterField::Search,
    ] {
        let value = filters.get(field);
        let shown = if value.is_empty() {
            style("-".to_string()).dim()
        } else {
            style(value.to_string()).cyan()
        };
        println!("{:<9} {}", field.as_str(), shown);
    }
    println!("{} {} match", style("→").blue(), session.results().len());
}

fn print_history(entries: &[&HistoryEntry], format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(entries).into_diagnostic()?);
        }
        _ => {
            let rows: Vec<TableRow> = entries
                .iter()
                .map(|h| {
                    TableRow::new(h.sku.clone())
                        .cell("date", CellValue::Date(h.date))
                        .cell("user", CellValue::Text(h.user.clone()))
                        .cell("sku", CellValue::Sku(h.sku.clone()))
                        .cell("action", CellValue::Action(h.action))
                        .cell("details", CellValue::Text(h.details.clone()))
                })
                .collect();
            let config = if quiet {
                TableConfig::for_pipe()
            } else {
                TableConfig::default()
            };
            TableFormatter::new(HISTORY_COLUMNS, "entry")
                .with_config(config)
                .output(&rows, format);
        }
    }
    Ok(())
}
