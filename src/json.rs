use serde_json::{Map, Number, Value};

use crate::builder::Tree;
use crate::error::ReifyError;
use crate::node::{ColumnStyle, Node, NodeKind};

impl Node for Value {
    fn kind(&self) -> NodeKind {
        match self {
            Value::Null => NodeKind::Null,
            Value::Bool(_) => NodeKind::Bool,
            Value::Number(_) => NodeKind::Number,
            Value::String(_) => NodeKind::String,
            Value::Array(_) => NodeKind::Sequence,
            Value::Object(_) => NodeKind::Map,
        }
    }

    fn as_int(&self) -> Option<i64> {
        self.as_i64()
    }

    fn as_uint(&self) -> Option<u64> {
        self.as_u64()
    }

    fn as_double(&self) -> Option<f64> {
        self.as_f64()
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    fn as_string(&self) -> Option<String> {
        match self {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn at(&self, index: usize) -> Option<&dyn Node> {
        match self {
            Value::Array(items) => items.get(index).map(|item| item as &dyn Node),
            _ => None,
        }
    }

    fn get(&self, key: &str) -> Option<&dyn Node> {
        match self {
            Value::Object(map) => map.get(key).map(|value| value as &dyn Node),
            _ => None,
        }
    }

    fn keys(&self) -> Vec<String> {
        match self {
            Value::Object(map) => map.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    fn column_style(&self) -> ColumnStyle {
        ColumnStyle::Json
    }
}

/// Converts a tree into a JSON value. Non-finite floats have no JSON form
/// and are rejected.
pub fn to_value(tree: &Tree) -> Result<Value, ReifyError> {
    Ok(match tree {
        Tree::Null => Value::Null,
        Tree::Bool(flag) => Value::Bool(*flag),
        Tree::Int(value) => Value::from(*value),
        Tree::UInt(value) => Value::from(*value),
        Tree::Float(value) => Number::from_f64(*value)
            .map(Value::Number)
            .ok_or_else(|| ReifyError::render("json", format!("{value} is not a finite number")))?,
        Tree::Text(text) => Value::String(text.clone()),
        Tree::Seq { items, .. } => Value::Array(items.iter().map(to_value).collect::<Result<_, _>>()?),
        Tree::Map(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (key, value) in entries {
                map.insert(key.clone(), to_value(value)?);
            }
            Value::Object(map)
        }
    })
}

/// Renders a tree as pretty-printed JSON.
pub fn render(tree: &Tree) -> Result<String, ReifyError> {
    serde_json::to_string_pretty(&to_value(tree)?).map_err(|e| ReifyError::render("json", e))
}
