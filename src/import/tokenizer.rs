//! CSV tokenizer and normalizer
//!
//! Turns raw spreadsheet text into rows keyed by normalized header name.
//! Quoting follows RFC 4180 via the `csv` state machine: quoted fields may
//! hold commas, doubled quotes and line breaks. Spreadsheet exports often
//! put a space after the comma (`, "Toyota, Inc"`); that space is removed
//! first so the field still reads as quoted.

use csv::{ReaderBuilder, StringRecord};
use std::borrow::Cow;
use std::collections::HashMap;

/// Header names the record mapper understands; others are carried but ignored
pub const RECOGNIZED_HEADERS: &[&str] = &[
    "sku",
    "name",
    "brand",
    "category",
    "oem_ref",
    "line",
    "description",
    "image_url",
    "specs_info",
    "make",
    "model",
    "year",
    "engine",
];

/// One data line, keyed by header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    line: u64,
    values: HashMap<String, String>,
}

impl CsvRow {
    /// 1-based line number where the row starts in the source text
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Field value, or `""` when the column is missing or the row was short
    pub fn get(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Field value if present and non-empty
    pub fn field(&self, field: &str) -> Option<&str> {
        Some(self.get(field)).filter(|s| !s.is_empty())
    }
}

/// Parsed file: normalized headers plus data rows in file order
#[derive(Debug, Clone, Default)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<CsvRow>,
}

impl CsvTable {
    /// Headers the mapper will ignore
    pub fn unrecognized_headers(&self) -> Vec<&str> {
        self.headers
            .iter()
            .map(String::as_str)
            .filter(|h| !h.is_empty() && !RECOGNIZED_HEADERS.contains(h))
            .collect()
    }
}

/// Strip one layer of surrounding double quotes
fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

/// Trim, drop a leading byte-order mark, lowercase and unquote a header token
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    unquote(trimmed).trim().to_lowercase()
}

/// Trim a data value and strip a stray layer of quotes left around it
pub fn clean_value(raw: &str) -> String {
    unquote(raw.trim()).trim().to_string()
}

/// Drop blanks between a field boundary and an opening quote
///
/// Quotes anywhere else in an unquoted field stay literal, as the reader
/// treats them. Line breaks are untouched so line numbers still match.
fn tighten_quotes(text: &str) -> Cow<'_, str> {
    if !text.contains('"') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;
    let mut blanks = String::new();

    while let Some(c) = chars.next() {
        if in_quotes {
            out.push(c);
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    out.push('"');
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }

        if at_field_start && (c == ' ' || c == '\t') {
            blanks.push(c);
            continue;
        }
        if at_field_start && c == '"' {
            blanks.clear();
            in_quotes = true;
        } else {
            out.push_str(&blanks);
            blanks.clear();
        }
        out.push(c);
        at_field_start = matches!(c, ',' | '\n' | '\r');
    }
    out.push_str(&blanks);
    Cow::Owned(out)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// Split `text` into a header and key→value rows
///
/// The first non-blank line is the header. Blank lines are skipped; short
/// rows read as empty strings for their missing trailing fields.
pub fn tokenize(text: &str) -> Result<CsvTable, csv::Error> {
    let text = tighten_quotes(text);
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut table = CsvTable::default();
    let mut header_seen = false;

    for result in rdr.records() {
        let record = result?;
        if is_blank(&record) {
            continue;
        }

        if !header_seen {
            table.headers = record.iter().map(normalize_header).collect();
            header_seen = true;
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let values = table
            .headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !h.is_empty())
            .map(|(i, h)| (h.clone(), record.get(i).map(clean_value).unwrap_or_default()))
            .collect();
        table.rows.push(CsvRow { line, values });
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_normalization() {
        assert_eq!(normalize_header("  SKU "), "sku");
        assert_eq!(normalize_header("\"OEM_Ref\""), "oem_ref");
        assert_eq!(normalize_header("\u{feff}sku"), "sku");
    }

    #[test]
    fn test_basic_rows() {
        let table = tokenize("sku,name\nA-1,Alpha\nB-2,Bravo\n").unwrap();
        assert_eq!(table.headers, vec!["sku", "name"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("sku"), "A-1");
        assert_eq!(table.rows[1].get("name"), "Bravo");
        assert_eq!(table.rows[1].line(), 3);
    }

    #[test]
    fn test_quoted_comma_is_one_field() {
        let table = tokenize("sku,brand,name\nFIL-1,\"Toyota, Inc\",Oil Filter\n").unwrap();
        let row = &table.rows[0];
        assert_eq!(row.get("brand"), "Toyota, Inc");
        assert_eq!(row.get("name"), "Oil Filter");
    }

    #[test]
    fn test_space_before_quoted_field() {
        let table = tokenize("sku, brand, name\nFIL-1, \"Toyota, Inc\", Oil Filter\n").unwrap();
        let row = &table.rows[0];
        assert_eq!(row.get("brand"), "Toyota, Inc");
        assert_eq!(row.get("name"), "Oil Filter");
    }

    #[test]
    fn test_tighten_quotes_only_at_field_start() {
        assert_eq!(tighten_quotes("a,  \"b, c\"\n"), "a,\"b, c\"\n");
        assert_eq!(tighten_quotes("a, 14\" x, b"), "a, 14\" x, b");
        assert_eq!(tighten_quotes("\"x \"\" ,\" y\n \"z\""), "\"x \"\" ,\" y\n\"z\"");
        assert!(matches!(tighten_quotes("a, b"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escaped_quotes_and_embedded_newline() {
        let text = "sku,description\nX-1,\"14\"\" wheel\nfront axle\"\nX-2,plain\n";
        let table = tokenize(text).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].get("description"), "14\" wheel\nfront axle");
        assert_eq!(table.rows[1].get("sku"), "X-2");
        assert_eq!(table.rows[1].line(), 4);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = tokenize("sku,name,brand\nA-1\n").unwrap();
        let row = &table.rows[0];
        assert_eq!(row.get("sku"), "A-1");
        assert_eq!(row.get("name"), "");
        assert_eq!(row.field("brand"), None);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let table = tokenize("\nsku,name\n\nA-1,Alpha\n   \n\nB-2,Bravo").unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1].get("sku"), "B-2");
    }

    #[test]
    fn test_values_trimmed_and_unquoted() {
        let table = tokenize("sku , Name\n  A-1 ,  Alpha  \n").unwrap();
        assert_eq!(table.headers, vec!["sku", "name"]);
        assert_eq!(table.rows[0].get("sku"), "A-1");
        assert_eq!(table.rows[0].get("name"), "Alpha");
    }

    #[test]
    fn test_inch_mark_kept() {
        assert_eq!(clean_value("14\""), "14\"");
        assert_eq!(clean_value(" \"wrapped\" "), "wrapped");
    }

    #[test]
    fn test_column_order_irrelevant() {
        let table = tokenize("name,sku\nAlpha,A-1\n").unwrap();
        assert_eq!(table.rows[0].get("sku"), "A-1");
    }

    #[test]
    fn test_unknown_headers_retained() {
        let table = tokenize("sku,price,colour\nA-1,10,red\n").unwrap();
        assert_eq!(table.unrecognized_headers(), vec!["price", "colour"]);
        assert_eq!(table.rows[0].get("price"), "10");
    }

    #[test]
    fn test_empty_input() {
        let table = tokenize("").unwrap();
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }
}
