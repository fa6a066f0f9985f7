use std::path::Path;

use crate::builder::{Tree, TreeBuilder};
use crate::de::Reify;
use crate::error::ReifyError;
use crate::node::{self, ColumnStyle, Node, MAX_DEPTH};
use crate::ser::Emit;
use crate::validation::ValidationResult;
use crate::{json, yaml};

#[cfg(feature = "csv")]
use crate::csv::CsvOptions;
#[cfg(feature = "csv")]
use crate::record::Record;

/// The outcome of reading a document: the value when it is valid, and the
/// full validation report either way.
pub type Parsed<T> = (Option<T>, ValidationResult);

fn too_deep() -> ValidationResult {
    ValidationResult::error(
        "",
        format!("Document nesting exceeds the maximum depth of {MAX_DEPTH}"),
    )
}

fn finish<T>(value: T, result: ValidationResult) -> Parsed<T> {
    log::debug!(
        "read {}: {} error(s)",
        std::any::type_name::<T>(),
        result.len()
    );
    if result.is_valid() {
        (Some(value), result)
    } else {
        (None, result)
    }
}

/// Reads a value from an already parsed document node.
pub fn from_node<T: Reify>(node: &dyn Node) -> Parsed<T> {
    if node::depth(node, MAX_DEPTH) > MAX_DEPTH {
        return (None, too_deep());
    }
    let mut value = T::default();
    let result = value.reify(node);
    finish(value, result)
}

/// Reads a value from YAML text.
///
/// A document that cannot be parsed yields a single error at the root;
/// otherwise every defect in the document is reported.
pub fn from_yaml<T: Reify>(source: &str) -> Parsed<T> {
    match yaml::parse(source) {
        Ok(document) => from_node(&document),
        Err(error) => {
            log::warn!("YAML document failed to parse: {error}");
            (None, ValidationResult::error("", format!("Invalid YAML: {error}")))
        }
    }
}

/// Reads a value from JSON text. Record keys are matched against each
/// field's JSON column name.
pub fn from_json<T: Reify>(source: &str) -> Parsed<T> {
    match serde_json::from_str::<serde_json::Value>(source) {
        Ok(document) => from_node(&document),
        Err(error) => {
            log::warn!("JSON document failed to parse: {error}");
            (None, ValidationResult::error("", format!("Invalid JSON: {error}")))
        }
    }
}

/// Reads a YAML file. A file that cannot be read is reported at the root.
pub fn from_yaml_file<T: Reify>(path: impl AsRef<Path>) -> Parsed<T> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(source) => from_yaml(&source),
        Err(error) => {
            log::warn!("could not read {}: {error}", path.display());
            (
                None,
                ValidationResult::error("", format!("Failed to read {}: {error}", path.display())),
            )
        }
    }
}

#[cfg(feature = "csv")]
fn csv_rows<R: Record>(
    source: &str,
    options: &CsvOptions,
) -> Result<Vec<crate::csv::Row>, ::csv::Error> {
    let columns: Vec<&str> = R::fields().iter().map(|field| field.csv_column()).collect();
    crate::csv::parse(source, options, &columns)
}

/// Reads one record per CSV row. Row errors are reported under `[row]`,
/// counting data rows from zero.
#[cfg(feature = "csv")]
pub fn from_csv<R: Record>(source: &str) -> Parsed<Vec<R>> {
    from_csv_with(source, &CsvOptions::default())
}

/// [`from_csv`] with a custom delimiter, or without a header row, in which
/// case the columns are taken in field declaration order.
#[cfg(feature = "csv")]
pub fn from_csv_with<R: Record>(source: &str, options: &CsvOptions) -> Parsed<Vec<R>> {
    let rows = match csv_rows::<R>(source, options) {
        Ok(rows) => rows,
        Err(error) => {
            log::warn!("CSV document failed to parse: {error}");
            return (None, ValidationResult::error("", format!("Invalid CSV: {error}")));
        }
    };
    let mut result = ValidationResult::new();
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let mut record = R::default();
        let row_result = record.reify(row);
        if row_result.is_valid() {
            records.push(record);
        } else {
            result.merge_index(index, row_result);
        }
    }
    finish(records, result)
}

fn into_result<T>((value, result): Parsed<T>) -> Result<T, ReifyError> {
    match value {
        Some(value) => Ok(value),
        None => Err(ReifyError::Invalid {
            errors: result.into_errors(),
        }),
    }
}

fn checked_depth(node: &dyn Node) -> Result<(), ReifyError> {
    if node::depth(node, MAX_DEPTH) > MAX_DEPTH {
        return Err(ReifyError::TooDeep { max: MAX_DEPTH });
    }
    Ok(())
}

/// Reads a value from YAML text, failing on the first kind of problem met.
///
/// # Errors
/// Returns [`ReifyError::Yaml`] with a source label when the text is not
/// YAML, [`ReifyError::TooDeep`] for overly nested documents, and
/// [`ReifyError::Invalid`] carrying every defect when validation fails.
pub fn try_from_yaml<T: Reify>(source: &str) -> Result<T, ReifyError> {
    let document = yaml::parse(source).map_err(|e| ReifyError::yaml(&e, source, "input.yaml"))?;
    checked_depth(&document)?;
    into_result(from_node(&document))
}

/// JSON counterpart of [`try_from_yaml`].
///
/// # Errors
/// Returns [`ReifyError::Json`], [`ReifyError::TooDeep`] or
/// [`ReifyError::Invalid`].
pub fn try_from_json<T: Reify>(source: &str) -> Result<T, ReifyError> {
    let document = serde_json::from_str::<serde_json::Value>(source)
        .map_err(|e| ReifyError::json(&e, source, "input.json"))?;
    checked_depth(&document)?;
    into_result(from_node(&document))
}

/// Reads a YAML file.
///
/// # Errors
/// Returns [`ReifyError::Io`] when the file cannot be read, otherwise the
/// errors of [`try_from_yaml`], with the file name as the source name.
pub fn try_from_yaml_file<T: Reify>(path: impl AsRef<Path>) -> Result<T, ReifyError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ReifyError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let name = path.display().to_string();
    let document = yaml::parse(&source).map_err(|e| ReifyError::yaml(&e, &source, &name))?;
    checked_depth(&document)?;
    into_result(from_node(&document))
}

/// CSV counterpart of [`try_from_yaml`].
///
/// # Errors
/// Returns [`ReifyError::Csv`] for malformed text and
/// [`ReifyError::Invalid`] when any row fails validation.
#[cfg(feature = "csv")]
pub fn try_from_csv<R: Record>(source: &str) -> Result<Vec<R>, ReifyError> {
    csv_rows::<R>(source, &CsvOptions::default())
        .map_err(|e| ReifyError::csv(&e, source, "input.csv"))?;
    into_result(from_csv(source))
}

/// Writes a value into a format-neutral tree.
#[must_use]
pub fn to_tree<T: Emit + ?Sized>(value: &T, style: ColumnStyle) -> Tree {
    let mut builder = TreeBuilder::new(style);
    value.emit(&mut builder);
    builder.finish()
}

/// Writes a value as a block-style YAML document.
///
/// # Errors
/// Returns [`ReifyError::Render`] if the YAML backend rejects a scalar.
pub fn to_yaml<T: Emit + ?Sized>(value: &T) -> Result<String, ReifyError> {
    yaml::render(&to_tree(value, ColumnStyle::Plain))
}

/// Writes a value as pretty-printed JSON, keyed by JSON column names.
///
/// # Errors
/// Returns [`ReifyError::Render`] for values JSON cannot express, such as
/// non-finite floats.
pub fn to_json<T: Emit + ?Sized>(value: &T) -> Result<String, ReifyError> {
    json::render(&to_tree(value, ColumnStyle::Json))
}

/// Writes records as CSV: a header row, then one row per record.
///
/// # Errors
/// Returns [`ReifyError::Render`] if the CSV writer fails.
#[cfg(feature = "csv")]
pub fn to_csv<R: Record>(records: &[R]) -> Result<String, ReifyError> {
    crate::csv::render(records, &CsvOptions::default())
}

/// [`to_csv`] with a custom delimiter, or without the header row.
///
/// # Errors
/// Returns [`ReifyError::Render`] if the CSV writer fails.
#[cfg(feature = "csv")]
pub fn to_csv_with<R: Record>(records: &[R], options: &CsvOptions) -> Result<String, ReifyError> {
    crate::csv::render(records, options)
}

/// The CSV header row for `R`.
///
/// # Errors
/// Returns [`ReifyError::Render`] if the CSV writer fails.
#[cfg(feature = "csv")]
pub fn csv_header<R: Record>() -> Result<String, ReifyError> {
    crate::csv::header::<R>(&CsvOptions::default())
}
