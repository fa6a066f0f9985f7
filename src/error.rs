use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::utils::offset_of_line_column;
use crate::validation::FieldError;

#[derive(Error, Debug, Diagnostic)]
pub enum ReifyError {
    #[error("Invalid YAML document: {message}")]
    #[diagnostic(
        code(reify::yaml_syntax),
        help("The document could not be parsed as YAML, so no fields were read.")
    )]
    Yaml {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("parsing stopped here")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid JSON document: {message}")]
    #[diagnostic(
        code(reify::json_syntax),
        help("The document could not be parsed as JSON, so no fields were read.")
    )]
    Json {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("parsing stopped here")]
        span: Option<SourceSpan>,
    },

    #[cfg(feature = "csv")]
    #[error("Invalid CSV document: {message}")]
    #[diagnostic(
        code(reify::csv_syntax),
        help("Every row must have as many cells as the header row.")
    )]
    Csv {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("in this row")]
        span: Option<SourceSpan>,
    },

    #[error("Document nesting exceeds the maximum depth of {max}")]
    #[diagnostic(
        code(reify::too_deep),
        help("Flatten the document or split it into smaller documents.")
    )]
    TooDeep { max: usize },

    #[error("Could not read {path}")]
    #[diagnostic(code(reify::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Document failed validation with {} error(s)", .errors.len())]
    #[diagnostic(
        code(reify::invalid),
        help("Each related diagnostic names the path of one defect.")
    )]
    Invalid {
        #[related]
        errors: Vec<FieldError>,
    },

    #[error("Record type {type_name} has no table name")]
    #[diagnostic(
        code(reify::missing_table_name),
        help("Declare the table with `table \"name\";` at the top of the record! block.")
    )]
    MissingTableName { type_name: &'static str },

    #[error("Could not render {format} output: {message}")]
    #[diagnostic(code(reify::render))]
    Render {
        format: &'static str,
        message: String,
    },
}

impl ReifyError {
    pub(crate) fn yaml(error: &serde_yaml::Error, source: &str, name: &str) -> Self {
        let span = error
            .location()
            .map(|location| SourceSpan::from((location.index().min(source.len()), 0)));
        ReifyError::Yaml {
            message: error.to_string(),
            src: NamedSource::new(name, source.to_string()),
            span,
        }
    }

    pub(crate) fn json(error: &serde_json::Error, source: &str, name: &str) -> Self {
        // serde_json reports line 0 when the position is unknown.
        let span = (error.line() > 0).then(|| {
            let offset = offset_of_line_column(source, error.line(), error.column());
            SourceSpan::from((offset, 0))
        });
        ReifyError::Json {
            message: error.to_string(),
            src: NamedSource::new(name, source.to_string()),
            span,
        }
    }

    #[cfg(feature = "csv")]
    pub(crate) fn csv(error: &csv::Error, source: &str, name: &str) -> Self {
        let span = error.position().map(|position| {
            let offset = usize::try_from(position.byte())
                .unwrap_or(source.len())
                .min(source.len());
            SourceSpan::from((offset, 0))
        });
        ReifyError::Csv {
            message: error.to_string(),
            src: NamedSource::new(name, source.to_string()),
            span,
        }
    }

    pub(crate) fn render(format: &'static str, error: impl std::fmt::Display) -> Self {
        ReifyError::Render {
            format,
            message: error.to_string(),
        }
    }
}
