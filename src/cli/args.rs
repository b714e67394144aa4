//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, list::ListArgs, options::OptionsArgs, shell::ShellArgs,
    show::ShowArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "partcat")]
#[command(author, version, about = "Automotive parts catalog")]
#[command(long_about = "Browse an automotive parts inventory loaded from CSV or JSON exports, narrowing it by make, model, year, category and free text.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Name recorded in the audit trail
    #[arg(long, global = true)]
    pub user: Option<String>,

    /// Extra configuration file layered above the global one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl GlobalOpts {
    /// Resolve configuration, with `--user` on top of every other layer
    pub fn load_config(&self) -> Config {
        let mut config = Config::load_with(self.config.as_deref());
        if let Some(ref user) = self.user {
            config.user = Some(user.clone());
        }
        config
    }

    /// The output format, with `auto` resolved through `default_format`
    pub fn resolved_format(&self, config: &Config) -> OutputFormat {
        if self.format != OutputFormat::Auto {
            return self.format;
        }
        config
            .default_format
            .as_deref()
            .and_then(|f| OutputFormat::from_str(f, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List products in a catalog file, narrowed by filters
    List(ListArgs),

    /// Show the filter options available for a selection
    Options(OptionsArgs),

    /// Show one product as a data sheet
    Show(ShowArgs),

    /// Print the CSV import template
    Template,

    /// Interactive session: load, filter, edit, audit
    Shell(ShellArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (sheet for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just SKUs, one per line
    Id,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_model_requires_make() {
        let result = Cli::try_parse_from(["partcat", "list", "c.csv", "--model", "Corolla"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from(["partcat", "list", "c.csv", "--make", "TOYOTA", "--year", "2015"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "partcat", "list", "c.csv", "--make", "TOYOTA", "--model", "Corolla", "--year", "2015",
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_format_fallback() {
        let cli = Cli::try_parse_from(["partcat", "template"]).unwrap();
        let config = Config {
            default_format: Some("md".to_string()),
            ..Config::default()
        };
        assert_eq!(cli.global.resolved_format(&config), OutputFormat::Md);
        assert_eq!(cli.global.resolved_format(&Config::default()), OutputFormat::Auto);

        let cli = Cli::try_parse_from(["partcat", "-f", "json", "template"]).unwrap();
        assert_eq!(cli.global.resolved_format(&config), OutputFormat::Json);
    }
}
