use std::cmp::Ordering;

use crate::node::ColumnStyle;

/// Receives a stream of primitive writes and structural start/end calls.
///
/// Inside a map every value is preceded by exactly one [`Builder::key`]
/// call. Tuples are bracketed by the flow-sequence calls, which backends
/// that have no inline style may treat like ordinary sequences.
pub trait Builder {
    fn write_int(&mut self, value: i64);

    fn write_uint(&mut self, value: u64);

    fn write_double(&mut self, value: f64);

    fn write_bool(&mut self, value: bool);

    fn write_string(&mut self, value: &str);

    /// Marker for an absent optional value. Backends without a native null
    /// fall back to the literal text `null`.
    fn write_null(&mut self) {
        self.write_string("null");
    }

    fn start_seq(&mut self);

    fn end_seq(&mut self);

    fn start_flow_seq(&mut self) {
        self.start_seq();
    }

    fn end_flow_seq(&mut self) {
        self.end_seq();
    }

    fn start_map(&mut self);

    fn end_map(&mut self);

    fn key(&mut self, key: &str);

    fn column_style(&self) -> ColumnStyle {
        ColumnStyle::Plain
    }
}

/// Format-neutral output document, rendered to text by the format backends.
#[derive(Debug, Clone, PartialEq)]
pub enum Tree {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Seq { items: Vec<Tree>, flow: bool },
    Map(Vec<(String, Tree)>),
}

impl Tree {
    fn rank(&self) -> u8 {
        match self {
            Tree::Null => 0,
            Tree::Bool(_) => 1,
            Tree::Int(_) | Tree::UInt(_) | Tree::Float(_) => 2,
            Tree::Text(_) => 3,
            Tree::Seq { .. } => 4,
            Tree::Map(_) => 5,
        }
    }

    /// A total order over trees: scalars before containers, numbers by
    /// value, text and keys lexically, containers element by element.
    pub fn compare(&self, other: &Tree) -> Ordering {
        match (self, other) {
            (Tree::Bool(a), Tree::Bool(b)) => a.cmp(b),
            (Tree::Int(a), Tree::Int(b)) => a.cmp(b),
            (Tree::UInt(a), Tree::UInt(b)) => a.cmp(b),
            (Tree::Int(a), Tree::UInt(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Tree::UInt(a), Tree::Int(b)) => i128::from(*a).cmp(&i128::from(*b)),
            (Tree::Float(a), Tree::Float(b)) => a.total_cmp(b),
            (Tree::Float(a), Tree::Int(b)) => a.total_cmp(&(*b as f64)),
            (Tree::Float(a), Tree::UInt(b)) => a.total_cmp(&(*b as f64)),
            (Tree::Int(a), Tree::Float(b)) => (*a as f64).total_cmp(b),
            (Tree::UInt(a), Tree::Float(b)) => (*a as f64).total_cmp(b),
            (Tree::Text(a), Tree::Text(b)) => a.cmp(b),
            (Tree::Seq { items: a, .. }, Tree::Seq { items: b, .. }) => a
                .iter()
                .zip(b)
                .map(|(x, y)| x.compare(y))
                .find(|order| order.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            (Tree::Map(a), Tree::Map(b)) => a
                .iter()
                .zip(b)
                .map(|((ka, va), (kb, vb))| ka.cmp(kb).then_with(|| va.compare(vb)))
                .find(|order| order.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Writes this tree to another builder.
    pub fn replay(&self, builder: &mut dyn Builder) {
        match self {
            Tree::Null => builder.write_null(),
            Tree::Bool(value) => builder.write_bool(*value),
            Tree::Int(value) => builder.write_int(*value),
            Tree::UInt(value) => builder.write_uint(*value),
            Tree::Float(value) => builder.write_double(*value),
            Tree::Text(value) => builder.write_string(value),
            Tree::Seq { items, flow } => {
                if *flow {
                    builder.start_flow_seq();
                } else {
                    builder.start_seq();
                }
                for item in items {
                    item.replay(builder);
                }
                if *flow {
                    builder.end_flow_seq();
                } else {
                    builder.end_seq();
                }
            }
            Tree::Map(entries) => {
                builder.start_map();
                for (key, value) in entries {
                    builder.key(key);
                    value.replay(builder);
                }
                builder.end_map();
            }
        }
    }
}

#[derive(Debug)]
enum Frame {
    Seq { items: Vec<Tree>, flow: bool },
    Map {
        entries: Vec<(String, Tree)>,
        key: Option<String>,
    },
}

/// A [`Builder`] that assembles a [`Tree`].
#[derive(Debug, Default)]
pub struct TreeBuilder {
    style: ColumnStyle,
    stack: Vec<Frame>,
    root: Option<Tree>,
}

impl TreeBuilder {
    pub fn new(style: ColumnStyle) -> Self {
        Self {
            style,
            stack: Vec::new(),
            root: None,
        }
    }

    /// The finished document. Containers left open are closed first.
    pub fn finish(mut self) -> Tree {
        while !self.stack.is_empty() {
            self.close();
        }
        self.root.unwrap_or(Tree::Null)
    }

    fn push(&mut self, value: Tree) {
        match self.stack.last_mut() {
            None => self.root = Some(value),
            Some(Frame::Seq { items, .. }) => items.push(value),
            Some(Frame::Map { entries, key }) => {
                let key = key.take().unwrap_or_else(|| {
                    log::warn!("map value written without a key");
                    String::new()
                });
                entries.push((key, value));
            }
        }
    }

    fn close(&mut self) {
        let tree = match self.stack.pop() {
            Some(Frame::Seq { items, flow }) => Tree::Seq { items, flow },
            Some(Frame::Map { entries, .. }) => Tree::Map(entries),
            None => return,
        };
        self.push(tree);
    }
}

impl Builder for TreeBuilder {
    fn write_int(&mut self, value: i64) {
        self.push(Tree::Int(value));
    }

    fn write_uint(&mut self, value: u64) {
        self.push(Tree::UInt(value));
    }

    fn write_double(&mut self, value: f64) {
        self.push(Tree::Float(value));
    }

    fn write_bool(&mut self, value: bool) {
        self.push(Tree::Bool(value));
    }

    fn write_string(&mut self, value: &str) {
        self.push(Tree::Text(value.to_string()));
    }

    fn write_null(&mut self) {
        self.push(Tree::Null);
    }

    fn start_seq(&mut self) {
        self.stack.push(Frame::Seq {
            items: Vec::new(),
            flow: false,
        });
    }

    fn end_seq(&mut self) {
        self.close();
    }

    fn start_flow_seq(&mut self) {
        self.stack.push(Frame::Seq {
            items: Vec::new(),
            flow: true,
        });
    }

    fn end_flow_seq(&mut self) {
        self.close();
    }

    fn start_map(&mut self) {
        self.stack.push(Frame::Map {
            entries: Vec::new(),
            key: None,
        });
    }

    fn end_map(&mut self) {
        self.close();
    }

    fn key(&mut self, key: &str) {
        if let Some(Frame::Map { key: slot, .. }) = self.stack.last_mut() {
            *slot = Some(key.to_string());
        }
    }

    fn column_style(&self) -> ColumnStyle {
        self.style
    }
}
