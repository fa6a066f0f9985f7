pub mod api;
pub mod attrs;
pub mod builder;
#[cfg(feature = "csv")]
pub mod csv;
pub mod de;
pub mod enums;
pub mod error;
pub mod field;
pub mod json;
pub mod node;
pub mod record;
pub mod ser;
#[cfg(feature = "sql")]
pub mod sql;
pub mod utils;
pub mod validation;
pub mod yaml;

pub use api::{
    from_json, from_node, from_yaml, from_yaml_file, to_json, to_tree, to_yaml, try_from_json,
    try_from_yaml, try_from_yaml_file, Parsed,
};
#[cfg(feature = "csv")]
pub use api::{csv_header, from_csv, from_csv_with, to_csv, to_csv_with, try_from_csv};
#[cfg(feature = "csv")]
pub use crate::csv::CsvOptions;
pub use attrs::{Attribute, Scalar};
pub use builder::{Builder, Tree, TreeBuilder};
pub use de::{Reify, ValueKind};
pub use enums::{enum_values, to_enum, EnumTable, ReflectEnum};
pub use error::ReifyError;
pub use field::FieldDescriptor;
pub use node::{ColumnStyle, Node, NodeKind, MAX_DEPTH};
pub use record::Record;
pub use ser::Emit;
pub use validation::{FieldError, ValidationResult};
