//! Bulk ingestion of catalog files
//!
//! Dispatches on the file extension, parses the whole file, and only then
//! replaces the store. Any error leaves the store exactly as it was.

pub mod json;
pub mod mapper;
pub mod tokenizer;

use miette::Diagnostic;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};
use ulid::Ulid;

use crate::core::store::{validate_sku, RecordStore, StoreError};
use crate::entities::product::Product;

pub use mapper::{Locale, Placeholders};

/// Errors that reject a whole ingestion
#[derive(Debug, Error, Diagnostic)]
pub enum IngestError {
    #[error("unsupported file format for '{file}'")]
    #[diagnostic(
        code(partcat::import::unsupported_format),
        help("Use a .csv spreadsheet export or a .json product array")
    )]
    UnsupportedFormat { file: String, extension: String },

    #[error("could not read {source_label}: {reason}")]
    #[diagnostic(
        code(partcat::import::parse_failure),
        help("Check that the file is readable and well-formed")
    )]
    ParseFailure { source_label: String, reason: String },

    #[error("{source_label} contains no usable products")]
    #[diagnostic(
        code(partcat::import::empty_result),
        help("Every data row needs a value in the 'sku' column; the catalog was left unchanged")
    )]
    EmptyResult { source_label: String, dropped: usize },
}

/// What to do with rows that cannot be stored (no sku, or a repeated one)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Drop silently
    #[default]
    Lenient,
    /// Drop and report each row
    Warn,
    /// Reject the file
    Strict,
}

impl std::fmt::Display for Strictness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strictness::Lenient => write!(f, "lenient"),
            Strictness::Warn => write!(f, "warn"),
            Strictness::Strict => write!(f, "strict"),
        }
    }
}

impl std::str::FromStr for Strictness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(Strictness::Lenient),
            "warn" => Ok(Strictness::Warn),
            "strict" => Ok(Strictness::Strict),
            _ => Err(format!(
                "Unknown strictness: {}. Use lenient, warn or strict",
                s
            )),
        }
    }
}

/// Settings applied to every ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestOptions {
    pub strictness: Strictness,
    pub placeholders: Placeholders,
}

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
}

impl SourceFormat {
    /// Pick the format from a file name's extension, case-insensitively
    pub fn from_file_name(file_name: &str) -> Result<Self, IngestError> {
        let extension = Path::new(file_name)
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            _ => Err(IngestError::UnsupportedFormat {
                file: file_name.to_string(),
                extension,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a dropped record sat in its source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLocation {
    /// 1-based line of a CSV row
    Line(u64),
    /// 0-based index of a JSON array element
    Element(usize),
}

impl std::fmt::Display for RowLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowLocation::Line(line) => write!(f, "line {}", line),
            RowLocation::Element(index) => write!(f, "element {}", index),
        }
    }
}

/// A source record that produced no product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    pub location: RowLocation,
    pub reason: String,
}

/// Products decoded from one file, not yet stored
#[derive(Debug, Clone, Default)]
pub struct ParsedBatch {
    pub products: Vec<Product>,
    pub dropped: Vec<DroppedRow>,
}

/// Summary of a successful ingestion
#[derive(Debug, Clone)]
pub struct LoadReport {
    pub source_label: String,
    pub format: SourceFormat,
    pub loaded: usize,
    /// Dropped records; only listed one by one under `warn` strictness
    pub dropped: Vec<DroppedRow>,
    /// Total number of dropped records, whatever the strictness
    pub dropped_count: usize,
}

/// Collects one file's products, keeping skus unique
///
/// The first record with a given sku wins; later ones are dropped as
/// duplicates. Strictness decides whether a drop rejects the file.
struct BatchCollector<'a> {
    source_label: &'a str,
    strictness: Strictness,
    seen: HashSet<String>,
    parsed: ParsedBatch,
}

impl<'a> BatchCollector<'a> {
    fn new(source_label: &'a str, strictness: Strictness) -> Self {
        Self {
            source_label,
            strictness,
            seen: HashSet::new(),
            parsed: ParsedBatch::default(),
        }
    }

    fn accept(&mut self, product: Product, location: RowLocation) -> Result<(), IngestError> {
        match validate_sku(&product.sku) {
            Err(StoreError::BlankSku) => return self.drop_row(location, "missing sku"),
            Err(StoreError::ReservedSku(_)) => return self.drop_row(location, "reserved sku"),
            Ok(()) => {}
        }
        if self.seen.insert(product.sku.clone()) {
            self.parsed.products.push(product);
            Ok(())
        } else {
            self.drop_row(location, "duplicate sku")
        }
    }

    fn drop_row(&mut self, location: RowLocation, reason: &str) -> Result<(), IngestError> {
        let source = self.source_label;
        match self.strictness {
            Strictness::Strict => {
                return Err(IngestError::ParseFailure {
                    source_label: source.to_string(),
                    reason: format!("{}: {}", location, reason),
                });
            }
            Strictness::Warn => warn!(source, %location, "dropping record: {}", reason),
            Strictness::Lenient => debug!(source, %location, "dropping record: {}", reason),
        }
        self.parsed.dropped.push(DroppedRow {
            location,
            reason: reason.to_string(),
        });
        Ok(())
    }

    fn finish(self) -> ParsedBatch {
        self.parsed
    }
}

/// Turn CSV text into products, applying row strictness
pub fn parse_csv(
    text: &str,
    source_label: &str,
    options: &IngestOptions,
) -> Result<ParsedBatch, IngestError> {
    let table = tokenizer::tokenize(text).map_err(|e| IngestError::ParseFailure {
        source_label: source_label.to_string(),
        reason: e.to_string(),
    })?;

    let ignored = table.unrecognized_headers();
    if !ignored.is_empty() {
        debug!(source = source_label, columns = ?ignored, "ignoring unrecognized columns");
    }

    let batch = Ulid::new();
    let mut collector = BatchCollector::new(source_label, options.strictness);

    for (index, row) in table.rows.iter().enumerate() {
        let location = RowLocation::Line(row.line());
        match mapper::map_row(row, mapper::row_id(batch, index + 1), &options.placeholders) {
            Some(product) => collector.accept(product, location)?,
            None => collector.drop_row(location, "missing sku")?,
        }
    }

    let parsed = collector.finish();
    debug!(
        source = source_label,
        rows = table.rows.len(),
        products = parsed.products.len(),
        "csv parsed"
    );
    Ok(parsed)
}

/// Turn a JSON product array into products, applying the same strictness
pub fn parse_json(
    text: &str,
    source_label: &str,
    options: &IngestOptions,
) -> Result<ParsedBatch, IngestError> {
    let mut collector = BatchCollector::new(source_label, options.strictness);
    for (index, element) in json::parse_products(text, source_label)?.into_iter().enumerate() {
        let location = RowLocation::Element(index);
        match element {
            Ok(product) => collector.accept(product, location)?,
            Err(reason) => collector.drop_row(location, reason)?,
        }
    }
    Ok(collector.finish())
}

/// Decode a whole file's text; fails with `EmptyResult` when nothing usable
pub fn parse_text(
    format: SourceFormat,
    text: &str,
    source_label: &str,
    options: &IngestOptions,
) -> Result<ParsedBatch, IngestError> {
    let parsed = match format {
        SourceFormat::Csv => parse_csv(text, source_label, options)?,
        SourceFormat::Json => parse_json(text, source_label, options)?,
    };

    if parsed.products.is_empty() {
        return Err(IngestError::EmptyResult {
            source_label: source_label.to_string(),
            dropped: parsed.dropped.len(),
        });
    }
    Ok(parsed)
}

/// Parse `text` (named `file_name`) and replace the store on success
pub fn ingest_text(
    store: &mut RecordStore,
    file_name: &str,
    text: &str,
    actor: &str,
    options: &IngestOptions,
) -> Result<LoadReport, IngestError> {
    let format = SourceFormat::from_file_name(file_name)?;
    let parsed = parse_text(format, text, file_name, options)?;

    let loaded = parsed.products.len();
    let dropped_count = parsed.dropped.len();
    store.replace_all(parsed.products, actor, file_name);

    Ok(LoadReport {
        source_label: file_name.to_string(),
        format,
        loaded,
        dropped: if options.strictness == Strictness::Warn {
            parsed.dropped
        } else {
            Vec::new()
        },
        dropped_count,
    })
}

/// Read the file at `path` and ingest it
///
/// The extension is checked before any I/O; a read failure is a
/// `ParseFailure`.
pub fn ingest_file(
    store: &mut RecordStore,
    path: &Path,
    actor: &str,
    options: &IngestOptions,
) -> Result<LoadReport, IngestError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    SourceFormat::from_file_name(&file_name)?;

    let text = std::fs::read_to_string(path).map_err(|e| IngestError::ParseFailure {
        source_label: file_name.clone(),
        reason: e.to_string(),
    })?;
    debug!(path = %path.display(), bytes = text.len(), "file read");

    ingest_text(store, &file_name, &text, actor, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::history::HistoryAction;
    use std::fs;
    use tempfile::TempDir;

    const CATALOG: &str = "sku,name,brand,category,make,model,year,engine\n\
        FIL-001,Oil Filter,\"Toyota, Inc\",Engine,TOYOTA,Corolla,2015,1.8L\n\
        ,Orphan row,Acme,Misc,,,,\n\
        BRK-100,Brake Pad Set,Brembo,Brakes,NISSAN,Sentra,2010-2013,\n";

    fn seeded_store() -> RecordStore {
        let mut store = RecordStore::new();
        ingest_text(&mut store, "seed.csv", "sku\nOLD-1\nOLD-2\n", "Admin", &IngestOptions::default())
            .unwrap();
        store
    }

    #[test]
    fn test_format_dispatch() {
        assert_eq!(SourceFormat::from_file_name("a.csv").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_file_name("B.JSON").unwrap(), SourceFormat::Json);
        let err = SourceFormat::from_file_name("sheet.xlsx").unwrap_err();
        assert!(matches!(
            err,
            IngestError::UnsupportedFormat { ref extension, .. } if extension == "xlsx"
        ));
        assert!(SourceFormat::from_file_name("noext").is_err());
    }

    #[test]
    fn test_csv_ingest_replaces_store() {
        let mut store = seeded_store();
        let report =
            ingest_text(&mut store, "catalog.csv", CATALOG, "Maria", &IngestOptions::default())
                .unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(report.dropped_count, 1);
        assert!(report.dropped.is_empty());
        assert_eq!(store.len(), 2);
        assert!(store.get("OLD-1").is_none());
        assert_eq!(store.get("FIL-001").unwrap().brand, "Toyota, Inc");

        let last = store.history().last().unwrap();
        assert_eq!(last.action, HistoryAction::BulkLoad);
        assert_eq!(last.user, "Maria");
        assert_eq!(last.details, "2 products loaded from catalog.csv");
    }

    #[test]
    fn test_row_ids_unique_in_batch() {
        let mut store = RecordStore::new();
        ingest_text(&mut store, "catalog.csv", CATALOG, "Admin", &IngestOptions::default())
            .unwrap();
        let ids: Vec<_> = store.products().iter().map(|p| p.id.clone()).collect();
        assert_ne!(ids[0], ids[1]);
        assert_eq!(ids[0].ulid(), ids[1].ulid());
    }

    #[test]
    fn test_warn_strictness_lists_dropped_rows() {
        let mut store = RecordStore::new();
        let options = IngestOptions {
            strictness: Strictness::Warn,
            ..IngestOptions::default()
        };
        let report = ingest_text(&mut store, "catalog.csv", CATALOG, "Admin", &options).unwrap();
        assert_eq!(
            report.dropped,
            vec![DroppedRow {
                location: RowLocation::Line(3),
                reason: "missing sku".to_string()
            }]
        );
    }

    #[test]
    fn test_strict_rejects_file_and_keeps_store() {
        let mut store = seeded_store();
        let options = IngestOptions {
            strictness: Strictness::Strict,
            ..IngestOptions::default()
        };
        let err = ingest_text(&mut store, "catalog.csv", CATALOG, "Admin", &options).unwrap_err();
        assert!(err.to_string().contains("line 3"));
        assert_eq!(store.len(), 2);
        assert!(store.get("OLD-1").is_some());
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn test_header_only_csv_is_empty_result() {
        let mut store = seeded_store();
        let err = ingest_text(
            &mut store,
            "empty.csv",
            "sku,name,brand\n",
            "Admin",
            &IngestOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::EmptyResult { dropped: 0, .. }));
        assert_eq!(store.len(), 2);
        assert_eq!(store.history().len(), 1);
    }

    #[test]
    fn test_all_rows_without_sku_is_empty_result() {
        let mut store = RecordStore::new();
        let err = ingest_text(
            &mut store,
            "nosku.csv",
            "sku,name\n,A\n,B\n",
            "Admin",
            &IngestOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::EmptyResult { dropped: 2, .. }));
        assert!(store.is_empty());
        assert!(store.history().is_empty());
    }

    #[test]
    fn test_json_ingest_and_failures() {
        let mut store = seeded_store();
        let opts = IngestOptions::default();

        let err = ingest_text(&mut store, "bad.json", "{\"sku\": \"X\"}", "Admin", &opts).unwrap_err();
        assert!(matches!(err, IngestError::ParseFailure { .. }));
        let err = ingest_text(&mut store, "none.json", "[]", "Admin", &opts).unwrap_err();
        assert!(matches!(err, IngestError::EmptyResult { .. }));
        assert_eq!(store.len(), 2);

        let report = ingest_text(
            &mut store,
            "full.json",
            r#"[{"sku": "J-1", "crossReference": [{"brand": "Bosch", "part": "0986"}]}]"#,
            "Admin",
            &opts,
        )
        .unwrap();
        assert_eq!(report.format, SourceFormat::Json);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("J-1").unwrap().cross_reference[0].brand, "Bosch");
    }

    #[test]
    fn test_json_accepts_loosely_shaped_elements() {
        let mut store = seeded_store();
        let text = r#"[
            {"sku": "A-1", "specs": "free text"},
            {"name": "no sku yet"},
            {"sku": "B-2", "applications": {"make": "TOYOTA"}}
        ]"#;
        let report =
            ingest_text(&mut store, "c.json", text, "Admin", &IngestOptions::default()).unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(report.dropped_count, 1);
        assert!(store.get("A-1").unwrap().specs.is_empty());
        assert!(store.get("B-2").unwrap().applications.is_empty());
    }

    #[test]
    fn test_json_strict_names_element() {
        let mut store = seeded_store();
        let options = IngestOptions {
            strictness: Strictness::Strict,
            ..IngestOptions::default()
        };
        let err = ingest_text(&mut store, "c.json", r#"[{"sku": "A-1"}, {}]"#, "Admin", &options)
            .unwrap_err();
        assert!(err.to_string().contains("element 1: missing sku"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_duplicate_sku_keeps_first_record() {
        let mut store = RecordStore::new();
        let options = IngestOptions {
            strictness: Strictness::Warn,
            ..IngestOptions::default()
        };
        let report = ingest_text(
            &mut store,
            "dup.csv",
            "sku,name\nA-1,First\nA-1,Second\nB-2,Other\n",
            "Admin",
            &options,
        )
        .unwrap();
        assert_eq!(report.loaded, 2);
        assert_eq!(
            report.dropped,
            vec![DroppedRow {
                location: RowLocation::Line(3),
                reason: "duplicate sku".to_string()
            }]
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("A-1").unwrap().name, "First");

        let mut edited = store.get("A-1").unwrap().clone();
        edited.name = "Edited".to_string();
        store.upsert(edited, "Admin").unwrap();
        let names: Vec<_> = store.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Edited", "Other"]);
    }

    #[test]
    fn test_reserved_sku_row_dropped() {
        let mut store = RecordStore::new();
        let report = ingest_text(
            &mut store,
            "sys.csv",
            "sku,name\nSYSTEM,Oops\nA-1,Alpha\n",
            "Admin",
            &IngestOptions::default(),
        )
        .unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.dropped_count, 1);
        assert!(store.get("SYSTEM").is_none());
    }

    #[test]
    fn test_duplicate_sku_in_json_and_strict() {
        let mut store = RecordStore::new();
        let text = r#"[{"sku": "A-1", "name": "First"}, {"sku": "A-1", "name": "Second"}]"#;
        let report =
            ingest_text(&mut store, "dup.json", text, "Admin", &IngestOptions::default()).unwrap();
        assert_eq!(report.loaded, 1);
        assert_eq!(report.dropped_count, 1);
        assert_eq!(store.get("A-1").unwrap().name, "First");

        let options = IngestOptions {
            strictness: Strictness::Strict,
            ..IngestOptions::default()
        };
        let err = ingest_text(&mut store, "dup.json", text, "Admin", &options).unwrap_err();
        assert!(err.to_string().contains("element 1: duplicate sku"));
    }

    #[test]
    fn test_unsupported_extension_leaves_store() {
        let mut store = seeded_store();
        let err = ingest_text(&mut store, "catalog.txt", CATALOG, "Admin", &IngestOptions::default())
            .unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_ingest_file_reads_from_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("Catalog.CSV");
        fs::write(&path, CATALOG).unwrap();

        let mut store = RecordStore::new();
        let report = ingest_file(&mut store, &path, "Admin", &IngestOptions::default()).unwrap();
        assert_eq!(report.source_label, "Catalog.CSV");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_missing_file_is_parse_failure() {
        let tmp = TempDir::new().unwrap();
        let mut store = RecordStore::new();
        let err = ingest_file(
            &mut store,
            &tmp.path().join("absent.json"),
            "Admin",
            &IngestOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::ParseFailure { .. }));

        let err = ingest_file(
            &mut store,
            &tmp.path().join("absent.pdf"),
            "Admin",
            &IngestOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
    }
}
