use std::fmt;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

/// A single defect found while reading a document, addressed by its path.
///
/// Paths use `.` between record fields and map keys and `[i]` for sequence
/// positions, e.g. `offices[1].city`. The empty path is the document root.
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{}: {message}", display_path(.path))]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}

/// Joins a parent path segment with a child path.
///
/// Index segments (`[2]`) attach without a separator, everything else is
/// separated by a dot.
pub fn join_path(prefix: &str, child: &str) -> String {
    match (prefix.is_empty(), child.is_empty()) {
        (_, true) => prefix.to_string(),
        (true, false) => child.to_string(),
        (false, false) if child.starts_with('[') => format!("{prefix}{child}"),
        (false, false) => format!("{prefix}.{child}"),
    }
}

/// The path segment for a map key. The empty key is written `[""]` so its
/// errors are not mistaken for root errors.
pub fn key_segment(key: &str) -> String {
    if key.is_empty() {
        "[\"\"]".to_string()
    } else {
        key.to_string()
    }
}

/// The outcome of reading a document: valid, or an ordered list of every
/// defect that was found.
///
/// A result is valid exactly when it holds no errors. Results are composed
/// bottom-up: every nested read returns its own result, which the caller
/// folds in with [`ValidationResult::merge`] under the child's path segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    valid: bool,
    errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// A result holding one error at `path`.
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        let mut result = Self::new();
        result.add_error(path, message);
        result
    }

    pub fn add_error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(FieldError::new(path, message));
    }

    /// Folds `child` into this result, prefixing each of its paths with `segment`.
    pub fn merge(&mut self, segment: &str, child: ValidationResult) {
        for error in child.errors {
            self.add_error(join_path(segment, &error.path), error.message);
        }
    }

    /// Folds `child` into this result under the sequence position `index`.
    pub fn merge_index(&mut self, index: usize, child: ValidationResult) {
        self.merge(&format!("[{index}]"), child);
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first error recorded at exactly `path`, if any.
    pub fn find(&self, path: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.path == path)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return write!(f, "valid");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
