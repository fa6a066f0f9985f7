use std::sync::OnceLock;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};

use crate::builder::Tree;
use crate::error::ReifyError;
use crate::node::{ColumnStyle, Node, NodeKind};
use crate::record::Record;
use crate::yaml;

/// One cell. Empty cells are null; nested shapes are parsed lazily.
///
/// A cell holding a JSON string literal (`""`, `"\"quoted\""`) is text with
/// that literal's value. This is how the writer keeps the empty string apart
/// from an absent value.
#[derive(Debug)]
pub struct Cell {
    text: String,
    quoted: Option<String>,
    nested: OnceLock<Option<serde_yaml::Value>>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let quoted = if text.starts_with('"') {
            serde_json::from_str::<String>(&text).ok()
        } else {
            None
        };
        Self {
            text,
            quoted,
            nested: OnceLock::new(),
        }
    }

    fn nested(&self) -> Option<&serde_yaml::Value> {
        self.nested
            .get_or_init(|| {
                let trimmed = self.text.trim_start();
                if trimmed.starts_with('[') || trimmed.starts_with('{') {
                    yaml::parse(&self.text).ok()
                } else {
                    None
                }
            })
            .as_ref()
    }
}

impl Node for Cell {
    fn kind(&self) -> NodeKind {
        if self.text.is_empty() {
            return NodeKind::Null;
        }
        if self.quoted.is_some() {
            return NodeKind::String;
        }
        match self.nested().map(Node::kind) {
            Some(kind @ (NodeKind::Sequence | NodeKind::Map)) => kind,
            _ => NodeKind::String,
        }
    }

    fn as_int(&self) -> Option<i64> {
        self.text.trim().parse().ok()
    }

    fn as_uint(&self) -> Option<u64> {
        self.text.trim().parse().ok()
    }

    fn as_double(&self) -> Option<f64> {
        self.text.trim().parse().ok()
    }

    fn as_bool(&self) -> Option<bool> {
        match self.text.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    fn as_string(&self) -> Option<String> {
        Some(self.quoted.clone().unwrap_or_else(|| self.text.clone()))
    }

    fn len(&self) -> usize {
        self.nested().map_or(0, Node::len)
    }

    fn at(&self, index: usize) -> Option<&dyn Node> {
        self.nested()?.at(index)
    }

    fn get(&self, key: &str) -> Option<&dyn Node> {
        Node::get(self.nested()?, key)
    }

    fn keys(&self) -> Vec<String> {
        self.nested().map(Node::keys).unwrap_or_default()
    }
}

/// One data row, keyed by the header.
#[derive(Debug)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    /// Cells past the end of the header are keyed by their column number.
    fn new(header: &StringRecord, record: &StringRecord) -> Self {
        let cells = record
            .iter()
            .enumerate()
            .map(|(index, text)| {
                let name = header.get(index).map_or_else(|| index.to_string(), str::to_string);
                (name, Cell::new(text))
            })
            .collect();
        Self { cells }
    }
}

impl Node for Row {
    fn kind(&self) -> NodeKind {
        NodeKind::Map
    }

    fn as_int(&self) -> Option<i64> {
        None
    }

    fn as_uint(&self) -> Option<u64> {
        None
    }

    fn as_double(&self) -> Option<f64> {
        None
    }

    fn as_bool(&self) -> Option<bool> {
        None
    }

    fn as_string(&self) -> Option<String> {
        None
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    fn at(&self, _index: usize) -> Option<&dyn Node> {
        None
    }

    fn get(&self, key: &str) -> Option<&dyn Node> {
        self.cells
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, cell)| cell as &dyn Node)
    }

    fn keys(&self) -> Vec<String> {
        self.cells.iter().map(|(name, _)| name.clone()).collect()
    }

    fn column_style(&self) -> ColumnStyle {
        ColumnStyle::Csv
    }
}

/// Delimiter and header settings shared by the reader and the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Whether the first row names the columns.
    pub header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            header: true,
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn without_header(mut self) -> Self {
        self.header = false;
        self
    }
}

/// Splits a CSV document into rows keyed by its header row, or by
/// `columns` when `options` says the document has no header.
pub fn parse(source: &str, options: &CsvOptions, columns: &[&str]) -> Result<Vec<Row>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.header)
        .from_reader(source.as_bytes());
    let header = if options.header {
        reader.headers()?.clone()
    } else {
        StringRecord::from(columns.to_vec())
    };
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(Row::new(&header, &record?));
    }
    log::debug!("parsed {} CSV row(s) with {} column(s)", rows.len(), header.len());
    Ok(rows)
}

fn cell_text(tree: &Tree) -> Result<String, ReifyError> {
    Ok(match tree {
        Tree::Null => String::new(),
        Tree::Bool(flag) => flag.to_string(),
        Tree::Int(value) => value.to_string(),
        Tree::UInt(value) => value.to_string(),
        Tree::Float(value) => value.to_string(),
        Tree::Text(text) if text.is_empty() || text.starts_with('"') => {
            serde_json::to_string(text).map_err(|e| ReifyError::render("csv", e))?
        }
        Tree::Text(text) => text.clone(),
        nested => yaml::flow(nested)?,
    })
}

fn writer(options: &CsvOptions) -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .delimiter(options.delimiter)
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ReifyError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ReifyError::render("csv", e.error()))?;
    String::from_utf8(bytes).map_err(|e| ReifyError::render("csv", e))
}

/// The header row for `R`, one quoted cell per field.
pub fn header<R: Record>(options: &CsvOptions) -> Result<String, ReifyError> {
    let mut writer = writer(options);
    writer
        .write_record(R::fields().iter().map(|field| field.csv_column()))
        .map_err(|e| ReifyError::render("csv", e))?;
    finish(writer)
}

/// The header row, unless `options` turns it off, followed by one row per
/// record.
///
/// Nested values are written with plain field keys, the same keys the YAML
/// reader expects when the cell is parsed back.
pub fn render<R: Record>(records: &[R], options: &CsvOptions) -> Result<String, ReifyError> {
    let mut writer = writer(options);
    if options.header {
        writer
            .write_record(R::fields().iter().map(|field| field.csv_column()))
            .map_err(|e| ReifyError::render("csv", e))?;
    }
    for record in records {
        let cells = R::fields()
            .iter()
            .map(|field| cell_text(&field.to_tree(record, ColumnStyle::Plain)))
            .collect::<Result<Vec<_>, _>>()?;
        writer
            .write_record(&cells)
            .map_err(|e| ReifyError::render("csv", e))?;
    }
    finish(writer)
}
