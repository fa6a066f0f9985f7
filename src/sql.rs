use crate::attrs::{Props, Scalar};
use crate::de::ValueKind;
use crate::error::ReifyError;
use crate::field::FieldDescriptor;
use crate::record::Record;

fn table<R: Record>() -> Result<&'static str, ReifyError> {
    R::TABLE_NAME.ok_or(ReifyError::MissingTableName {
        type_name: std::any::type_name::<R>(),
    })
}

/// The column type for a field kind.
pub fn column_type(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Int => "INTEGER",
        ValueKind::BigInt => "BIGINT",
        ValueKind::Float => "FLOAT",
        ValueKind::Double => "DOUBLE",
        ValueKind::Bool => "BOOLEAN",
        ValueKind::Text | ValueKind::Path | ValueKind::Enum => "VARCHAR(255)",
        ValueKind::Sequence | ValueKind::Map | ValueKind::Tuple | ValueKind::Record => "TEXT",
    }
}

fn column_definition<R>(field: &FieldDescriptor<R>) -> String {
    let mut definition = format!("{} {}", field.sql_column(), column_type(field.kind()));
    let props = field.attribute::<Props>().copied().unwrap_or_default();
    if props.contains(Props::PRIMARY_KEY) {
        definition.push_str(" PRIMARY KEY");
    }
    if props.contains(Props::UNIQUE) {
        definition.push_str(" UNIQUE");
    }
    if props.contains(Props::NOT_NULL) {
        definition.push_str(" NOT NULL");
    }
    definition
}

/// A value as an SQL literal: text single-quoted with quotes doubled,
/// absent and non-scalar values as `NULL`.
pub fn literal(value: Option<Scalar>) -> String {
    match value {
        None => "NULL".to_string(),
        Some(Scalar::Text(text)) => format!("'{}'", text.replace('\'', "''")),
        Some(Scalar::Bool(true)) => "TRUE".to_string(),
        Some(Scalar::Bool(false)) => "FALSE".to_string(),
        Some(other) => other.to_string(),
    }
}

fn columns<R: Record>() -> String {
    R::fields()
        .iter()
        .map(|field| field.sql_column())
        .collect::<Vec<_>>()
        .join(", ")
}

fn primary<R: Record>() -> Option<&'static FieldDescriptor<R>> {
    R::fields().first()
}

pub fn create_table<R: Record>() -> Result<String, ReifyError> {
    let table = table::<R>()?;
    let definitions = R::fields()
        .iter()
        .map(|field| format!("    {}", column_definition(field)))
        .collect::<Vec<_>>()
        .join(",\n");
    Ok(format!("CREATE TABLE {table} (\n{definitions}\n);"))
}

pub fn insert<R: Record>(record: &R) -> Result<String, ReifyError> {
    let table = table::<R>()?;
    let values = R::fields()
        .iter()
        .map(|field| literal(field.scalar(record)))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!("INSERT INTO {table} ({}) VALUES ({values})", columns::<R>()))
}

pub fn select<R: Record>() -> Result<String, ReifyError> {
    let table = table::<R>()?;
    Ok(format!("SELECT {} FROM {table}", columns::<R>()))
}

/// Updates every field but the first, which is taken as the primary key.
pub fn update<R: Record>(record: &R) -> Result<String, ReifyError> {
    let table = table::<R>()?;
    let assignments = R::fields()
        .iter()
        .skip(1)
        .map(|field| format!("{} = {}", field.sql_column(), literal(field.scalar(record))))
        .collect::<Vec<_>>()
        .join(", ");
    let mut statement = format!("UPDATE {table} SET {assignments}");
    if let Some(key) = primary::<R>() {
        statement.push_str(&format!(
            " WHERE {} = {}",
            key.sql_column(),
            literal(key.scalar(record))
        ));
    }
    Ok(statement)
}

pub fn delete<R: Record>() -> Result<String, ReifyError> {
    let table = table::<R>()?;
    let key = primary::<R>().map_or("id", |field| field.sql_column());
    Ok(format!("DELETE FROM {table} WHERE {key} = ?"))
}
