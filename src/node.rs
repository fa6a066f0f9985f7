use std::fmt;

/// Nesting limit for documents handed to the dispatchers.
pub const MAX_DEPTH: usize = 128;

/// The structural kind of a node, used in type-mismatch messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Null,
    Bool,
    Number,
    String,
    Sequence,
    Map,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Null => "null",
            NodeKind::Bool => "boolean",
            NodeKind::Number => "number",
            NodeKind::String => "string",
            NodeKind::Sequence => "sequence",
            NodeKind::Map => "map",
        };
        f.write_str(name)
    }
}

/// Which column-name override a backend reads and writes record keys through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnStyle {
    #[default]
    Plain,
    Json,
    Csv,
}

/// A format backend's view of one document value.
///
/// Scalar reads return `None` when the node cannot be coerced to the
/// requested type; they never fail in any other way. Child access borrows
/// from the node, so a whole document can be walked without copying.
pub trait Node {
    fn kind(&self) -> NodeKind;

    fn as_int(&self) -> Option<i64>;

    fn as_uint(&self) -> Option<u64>;

    /// Floating-point read; integral nodes widen.
    fn as_double(&self) -> Option<f64>;

    fn as_bool(&self) -> Option<bool>;

    /// Text read; numbers and booleans coerce to their textual form.
    fn as_string(&self) -> Option<String>;

    fn len(&self) -> usize;

    fn at(&self, index: usize) -> Option<&dyn Node>;

    fn get(&self, key: &str) -> Option<&dyn Node>;

    /// Keys of a map node in document order; empty for anything else.
    fn keys(&self) -> Vec<String>;

    fn column_style(&self) -> ColumnStyle {
        ColumnStyle::Plain
    }

    fn is_sequence(&self) -> bool {
        self.kind() == NodeKind::Sequence
    }

    fn is_map(&self) -> bool {
        self.kind() == NodeKind::Map
    }

    fn is_null(&self) -> bool {
        self.kind() == NodeKind::Null
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Nesting depth of `node`: 0 for a scalar or an empty container, 1 for a
/// container of scalars, and so on.
///
/// Walks iteratively, so it is safe to call on documents that are too deep
/// to be dispatched recursively. Stops counting once `limit` is exceeded.
pub fn depth(node: &dyn Node, limit: usize) -> usize {
    let mut deepest = 0;
    let mut stack: Vec<(&dyn Node, usize)> = vec![(node, 0)];
    while let Some((current, level)) = stack.pop() {
        deepest = deepest.max(level);
        if deepest > limit {
            break;
        }
        if current.is_sequence() {
            stack.extend((0..current.len()).filter_map(|i| current.at(i)).map(|c| (c, level + 1)));
        } else if current.is_map() {
            for key in current.keys() {
                if let Some(child) = current.get(&key) {
                    stack.push((child, level + 1));
                }
            }
        }
    }
    deepest
}
