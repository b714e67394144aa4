//! Table formatting utilities for CLI list output
//!
//! Rows are typed cells so each output format can render the same data
//! its own way: aligned and colored for terminals, escaped for CSV, and
//! a markdown table built with `tabled`.

use chrono::{DateTime, Local, Utc};
use console::style;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{escape_csv, truncate_str};
use crate::cli::OutputFormat;
use crate::entities::history::HistoryAction;

/// Configuration for table output
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Show summary line after table (e.g., "5 product(s) found")
    pub show_summary: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self { show_summary: true }
    }
}

impl TableConfig {
    /// Create config optimized for piping (no summary)
    pub fn for_pipe() -> Self {
        Self {
            show_summary: false,
        }
    }
}

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Product sku (cyan)
    Sku(String),
    /// Plain text, truncated to the column width
    Text(String),
    /// Product category (magenta)
    Category(String),
    /// Makes summary; `universal` is dimmed
    Makes(String),
    /// Audit timestamp, shown in local time
    Date(DateTime<Utc>),
    /// Audit action with color coding
    Action(HistoryAction),
}

impl CellValue {
    /// Unstyled text of the cell
    pub fn raw(&self) -> String {
        match self {
            CellValue::Sku(s) | CellValue::Text(s) | CellValue::Category(s) | CellValue::Makes(s) => {
                s.clone()
            }
            CellValue::Date(d) => d.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Action(a) => a.to_string(),
        }
    }

    /// Padded, colored cell for terminal output
    pub fn format_tsv(&self, width: usize) -> String {
        let display = truncate_str(&self.raw(), width);
        let styled = match self {
            CellValue::Sku(_) => style(display).cyan(),
            CellValue::Text(_) => style(display),
            CellValue::Category(_) => style(display).magenta(),
            CellValue::Makes(s) if s == "universal" => style(display).dim(),
            CellValue::Makes(_) => style(display),
            CellValue::Date(_) => style(display).dim(),
            CellValue::Action(HistoryAction::BulkLoad) => style(display).blue(),
            CellValue::Action(HistoryAction::Update) => style(display).yellow(),
            CellValue::Action(HistoryAction::Create) => style(display).green(),
        };
        format!("{:<width$}", styled, width = width)
    }

    pub fn format_csv(&self) -> String {
        escape_csv(&self.raw())
    }

    pub fn format_md(&self) -> String {
        self.raw().replace('|', "\\|")
    }
}

/// Column definition for table output
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    /// Maximum display width
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
#[derive(Debug, Clone)]
pub struct TableRow {
    /// Value printed by `--format id`
    pub key: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that renders rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    config: TableConfig,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            config: TableConfig::default(),
        }
    }

    /// Configure the formatter with custom settings
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    /// Print rows to stdout in the given format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) {
        print!("{}", self.render(rows, format));
    }

    /// Render rows in the given format; `Auto`, `Json` and `Yaml` fall back to TSV
    pub fn render(&self, rows: &[TableRow], format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_csv(rows),
            OutputFormat::Md => self.render_md(rows),
            OutputFormat::Id => self.render_ids(rows),
            _ => self.render_tsv(rows),
        }
    }

    /// Column widths sized to content, capped by each column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                rows.iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.raw().chars().count())
                    .max()
                    .unwrap_or(0)
                    .max(col.header.len())
                    .min(col.width.max(col.header.len()))
            })
            .collect()
    }

    fn render_tsv(&self, rows: &[TableRow]) -> String {
        let widths = self.calculate_widths(rows);
        let mut out = String::new();

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = *w))
            .collect();
        out.push_str(header.join(" ").trim_end());
        out.push('\n');

        let total_width: usize = widths.iter().sum::<usize>() + widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total_width));
        out.push('\n');

        for row in rows {
            let parts: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .map(|(col, w)| match row.get(col.key) {
                    Some(value) => value.format_tsv(*w),
                    None => format!("{:<width$}", "-", width = *w),
                })
                .collect();
            out.push_str(parts.join(" ").trim_end());
            out.push('\n');
        }

        if self.config.show_summary {
            out.push('\n');
            out.push_str(&format!(
                "{} {}(s) found\n",
                style(rows.len()).cyan(),
                self.entity_name
            ));
        }
        out
    }

    fn render_csv(&self, rows: &[TableRow]) -> String {
        let mut out = self
            .columns
            .iter()
            .map(|c| c.key)
            .collect::<Vec<_>>()
            .join(",");
        out.push('\n');

        for row in rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| row.get(col.key).map(CellValue::format_csv).unwrap_or_default())
                .collect();
            out.push_str(&values.join(","));
            out.push('\n');
        }
        out
    }

    fn render_md(&self, rows: &[TableRow]) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header.to_string()));
        for row in rows {
            builder.push_record(self.columns.iter().map(|col| {
                row.get(col.key)
                    .map(CellValue::format_md)
                    .unwrap_or_else(|| "-".to_string())
            }));
        }
        let mut out = builder.build().with(Style::markdown()).to_string();
        out.push('\n');
        out
    }

    fn render_ids(&self, rows: &[TableRow]) -> String {
        rows.iter().map(|r| format!("{}\n", r.key)).collect()
    }
}
