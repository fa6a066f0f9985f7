use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use crate::builder::{Builder, Tree, TreeBuilder};
use crate::enums::ReflectEnum;
use crate::record::Record;

/// Writes a value to a [`Builder`].
pub trait Emit {
    fn emit(&self, builder: &mut dyn Builder);
}

macro_rules! impl_emit_signed {
    ($($ty:ty),*) => {
        $(
            impl Emit for $ty {
                fn emit(&self, builder: &mut dyn Builder) {
                    builder.write_int(i64::from(*self));
                }
            }
        )*
    };
}

macro_rules! impl_emit_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Emit for $ty {
                fn emit(&self, builder: &mut dyn Builder) {
                    builder.write_uint(u64::from(*self));
                }
            }
        )*
    };
}

impl_emit_signed!(i8, i16, i32, i64);
impl_emit_unsigned!(u8, u16, u32, u64);

impl Emit for isize {
    fn emit(&self, builder: &mut dyn Builder) {
        // isize is at most 64 bits on every supported target.
        builder.write_int(*self as i64);
    }
}

impl Emit for usize {
    fn emit(&self, builder: &mut dyn Builder) {
        builder.write_uint(*self as u64);
    }
}

impl Emit for f64 {
    fn emit(&self, builder: &mut dyn Builder) {
        builder.write_double(*self);
    }
}

impl Emit for f32 {
    fn emit(&self, builder: &mut dyn Builder) {
        builder.write_double(f64::from(*self));
    }
}

impl Emit for bool {
    fn emit(&self, builder: &mut dyn Builder) {
        builder.write_bool(*self);
    }
}

impl Emit for String {
    fn emit(&self, builder: &mut dyn Builder) {
        builder.write_string(self);
    }
}

impl Emit for PathBuf {
    fn emit(&self, builder: &mut dyn Builder) {
        builder.write_string(&self.to_string_lossy());
    }
}

impl<T: Emit> Emit for Option<T> {
    fn emit(&self, builder: &mut dyn Builder) {
        match self {
            Some(value) => value.emit(builder),
            None => builder.write_null(),
        }
    }
}

impl<T: Emit> Emit for Box<T> {
    fn emit(&self, builder: &mut dyn Builder) {
        self.as_ref().emit(builder)
    }
}

/// Writes the items as a block sequence, in iteration order.
pub fn emit_seq<'a, T, I>(items: I, builder: &mut dyn Builder)
where
    T: Emit + 'a,
    I: IntoIterator<Item = &'a T>,
{
    builder.start_seq();
    for item in items {
        item.emit(builder);
    }
    builder.end_seq();
}

/// Writes the entries as a map, in iteration order.
pub fn emit_map<'a, V, I>(entries: I, builder: &mut dyn Builder)
where
    V: Emit + 'a,
    I: IntoIterator<Item = (&'a String, &'a V)>,
{
    builder.start_map();
    for (key, value) in entries {
        builder.key(key);
        value.emit(builder);
    }
    builder.end_map();
}

impl<T: Emit> Emit for Vec<T> {
    fn emit(&self, builder: &mut dyn Builder) {
        emit_seq(self, builder)
    }
}

impl<T: Emit> Emit for VecDeque<T> {
    fn emit(&self, builder: &mut dyn Builder) {
        emit_seq(self, builder)
    }
}

impl<T: Emit> Emit for BTreeSet<T> {
    fn emit(&self, builder: &mut dyn Builder) {
        emit_seq(self, builder)
    }
}

/// Elements are sorted by their written form, so any `Emit` element type
/// gives a stable order.
impl<T: Emit> Emit for HashSet<T> {
    fn emit(&self, builder: &mut dyn Builder) {
        let style = builder.column_style();
        let mut items: Vec<Tree> = self
            .iter()
            .map(|item| {
                let mut tree = TreeBuilder::new(style);
                item.emit(&mut tree);
                tree.finish()
            })
            .collect();
        items.sort_by(Tree::compare);
        builder.start_seq();
        for item in &items {
            item.replay(builder);
        }
        builder.end_seq();
    }
}

impl<V: Emit> Emit for BTreeMap<String, V> {
    fn emit(&self, builder: &mut dyn Builder) {
        emit_map(self, builder)
    }
}

impl<V: Emit> Emit for HashMap<String, V> {
    fn emit(&self, builder: &mut dyn Builder) {
        let mut entries: Vec<(&String, &V)> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        emit_map(entries, builder)
    }
}

macro_rules! impl_emit_tuple {
    ($($index:tt $name:ident),+) => {
        impl<$($name: Emit),+> Emit for ($($name,)+) {
            fn emit(&self, builder: &mut dyn Builder) {
                builder.start_flow_seq();
                $(self.$index.emit(builder);)+
                builder.end_flow_seq();
            }
        }
    };
}

impl_emit_tuple!(0 A);
impl_emit_tuple!(0 A, 1 B);
impl_emit_tuple!(0 A, 1 B, 2 C);
impl_emit_tuple!(0 A, 1 B, 2 C, 3 D);
impl_emit_tuple!(0 A, 1 B, 2 C, 3 D, 4 E);
impl_emit_tuple!(0 A, 1 B, 2 C, 3 D, 4 E, 5 F);

/// Writes a registered enum as its name.
pub fn emit_enum<E: ReflectEnum>(value: &E, builder: &mut dyn Builder) {
    builder.write_string(value.name());
}

/// Writes a record as a map, one key per declared field, in declaration
/// order. Keys go through the builder's column style.
pub fn emit_record<R: Record>(record: &R, builder: &mut dyn Builder) {
    let style = builder.column_style();
    builder.start_map();
    for field in R::fields() {
        builder.key(field.column(style));
        field.emit(record, builder);
    }
    builder.end_map();
}
