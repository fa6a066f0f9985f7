use serde_yaml::Value;

use crate::builder::Tree;
use crate::error::ReifyError;
use crate::node::{Node, NodeKind};

fn untagged(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untagged(&tagged.value),
        other => other,
    }
}

fn key_text(key: &Value) -> Option<String> {
    match untagged(key) {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

impl Node for Value {
    fn kind(&self) -> NodeKind {
        match untagged(self) {
            Value::Null => NodeKind::Null,
            Value::Bool(_) => NodeKind::Bool,
            Value::Number(_) => NodeKind::Number,
            Value::String(_) => NodeKind::String,
            Value::Sequence(_) => NodeKind::Sequence,
            Value::Mapping(_) => NodeKind::Map,
            Value::Tagged(_) => NodeKind::Null,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match untagged(self) {
            Value::Number(number) => number.as_i64(),
            _ => None,
        }
    }

    fn as_uint(&self) -> Option<u64> {
        match untagged(self) {
            Value::Number(number) => number.as_u64(),
            _ => None,
        }
    }

    fn as_double(&self) -> Option<f64> {
        match untagged(self) {
            Value::Number(number) => number.as_f64(),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match untagged(self) {
            Value::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    fn as_string(&self) -> Option<String> {
        match untagged(self) {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    fn len(&self) -> usize {
        match untagged(self) {
            Value::Sequence(items) => items.len(),
            Value::Mapping(map) => map.len(),
            _ => 0,
        }
    }

    fn at(&self, index: usize) -> Option<&dyn Node> {
        match untagged(self) {
            Value::Sequence(items) => items.get(index).map(|item| item as &dyn Node),
            _ => None,
        }
    }

    fn get(&self, key: &str) -> Option<&dyn Node> {
        match untagged(self) {
            Value::Mapping(map) => map
                .iter()
                .find(|(k, _)| key_text(k).as_deref() == Some(key))
                .map(|(_, value)| value as &dyn Node),
            _ => None,
        }
    }

    fn keys(&self) -> Vec<String> {
        match untagged(self) {
            Value::Mapping(map) => map.keys().filter_map(key_text).collect(),
            _ => Vec::new(),
        }
    }
}

/// Parses `source` into a YAML value.
pub fn parse(source: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(source)
}

/// Renders a tree as a block-style YAML document.
pub fn render(tree: &Tree) -> Result<String, ReifyError> {
    let lines = block_lines(tree)?;
    let mut out = lines.join("\n");
    out.push('\n');
    Ok(out)
}

/// Renders a tree on one line in flow style, e.g. `{a: 1, b: [x, y]}`.
pub fn flow(tree: &Tree) -> Result<String, ReifyError> {
    inline(tree, true)
}

fn is_block(tree: &Tree) -> bool {
    match tree {
        Tree::Map(entries) => !entries.is_empty(),
        Tree::Seq { items, flow } => !flow && !items.is_empty(),
        _ => false,
    }
}

fn block_lines(tree: &Tree) -> Result<Vec<String>, ReifyError> {
    let mut lines = Vec::new();
    match tree {
        Tree::Map(entries) if !entries.is_empty() => {
            for (key, value) in entries {
                let key = text(key, false)?;
                if is_block(value) {
                    lines.push(format!("{key}:"));
                    lines.extend(block_lines(value)?.into_iter().map(|l| format!("  {l}")));
                } else {
                    lines.push(format!("{key}: {}", inline(value, false)?));
                }
            }
        }
        Tree::Seq { items, flow: false } if !items.is_empty() => {
            for item in items {
                if is_block(item) {
                    let nested = block_lines(item)?;
                    for (i, line) in nested.into_iter().enumerate() {
                        let marker = if i == 0 { "- " } else { "  " };
                        lines.push(format!("{marker}{line}"));
                    }
                } else {
                    lines.push(format!("- {}", inline(item, false)?));
                }
            }
        }
        other => lines.push(inline(other, false)?),
    }
    Ok(lines)
}

fn inline(tree: &Tree, in_flow: bool) -> Result<String, ReifyError> {
    Ok(match tree {
        Tree::Null => "null".to_string(),
        Tree::Bool(flag) => flag.to_string(),
        Tree::Int(value) => value.to_string(),
        Tree::UInt(value) => value.to_string(),
        Tree::Float(value) => scalar(&Value::from(*value))?,
        Tree::Text(value) => text(value, in_flow)?,
        Tree::Seq { items, .. } => {
            let items = items
                .iter()
                .map(|item| inline(item, true))
                .collect::<Result<Vec<_>, _>>()?;
            format!("[{}]", items.join(", "))
        }
        Tree::Map(entries) => {
            let entries = entries
                .iter()
                .map(|(key, value)| Ok(format!("{}: {}", text(key, true)?, inline(value, true)?)))
                .collect::<Result<Vec<_>, ReifyError>>()?;
            format!("{{{}}}", entries.join(", "))
        }
    })
}

fn scalar(value: &Value) -> Result<String, ReifyError> {
    let rendered = serde_yaml::to_string(value).map_err(|e| ReifyError::render("yaml", e))?;
    Ok(rendered.trim_end_matches('\n').to_string())
}

/// A string scalar, quoted when plain style would change its meaning.
fn text(value: &str, in_flow: bool) -> Result<String, ReifyError> {
    let needs_json_quotes = value.contains('\n')
        || (in_flow && value.contains([',', '[', ']', '{', '}', ':', '#']));
    if needs_json_quotes {
        // JSON strings are valid double-quoted YAML scalars.
        return serde_json::to_string(value).map_err(|e| ReifyError::render("yaml", e));
    }
    scalar(&Value::String(value.to_string()))
}
