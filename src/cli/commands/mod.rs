//! CLI command implementations

pub mod completions;
pub mod list;
pub mod options;
pub mod shell;
pub mod show;
pub mod template;

use console::style;
use miette::Result;
use std::path::Path;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{Config, Session};
use crate::import::LoadReport;

/// Start a session from configuration and load `file` into it
pub(crate) fn open_catalog(file: &Path, global: &GlobalOpts) -> Result<(Session, OutputFormat)> {
    let config = global.load_config();
    let format = global.resolved_format(&config);
    let mut session = Session::from_config(&config);

    let report = session.load_file(file)?;
    if !global.quiet {
        print_load_report(&report);
    }
    Ok((session, format))
}

/// Summarize a successful load on stderr
pub(crate) fn print_load_report(report: &LoadReport) {
    eprintln!(
        "{} Loaded {} product(s) from {}",
        style("✓").green(),
        style(report.loaded).cyan(),
        style(&report.source_label).yellow()
    );
    for row in &report.dropped {
        eprintln!(
            "  {} {}: {}",
            style("!").yellow(),
            row.location,
            style(&row.reason).dim()
        );
    }
    if report.dropped.is_empty() && report.dropped_count > 0 {
        eprintln!(
            "  {}",
            style(format!("{} record(s) skipped", report.dropped_count)).dim()
        );
    }
}

/// Resolved configuration for commands that load no file
pub(crate) fn config_and_format(global: &GlobalOpts) -> (Config, OutputFormat) {
    let config = global.load_config();
    let format = global.resolved_format(&config);
    (config, format)
}
