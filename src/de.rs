use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::path::PathBuf;

use crate::attrs::Scalar;
use crate::enums::ReflectEnum;
use crate::node::{Node, NodeKind};
use crate::record::Record;
use crate::validation::{key_segment, ValidationResult};

/// The static shape of a value, as seen by the metadata consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// 8, 16 and 32-bit integers, `isize` and `usize`.
    Int,
    /// 64-bit integers.
    BigInt,
    Float,
    Double,
    Bool,
    Text,
    Path,
    Enum,
    Sequence,
    Map,
    Tuple,
    Record,
}

impl ValueKind {
    /// True for kinds whose values have a [`Scalar`] form.
    pub fn is_scalar(self) -> bool {
        !matches!(
            self,
            ValueKind::Sequence | ValueKind::Map | ValueKind::Tuple | ValueKind::Record
        )
    }
}

/// Reads a document node into a value of this type.
///
/// Containers fold their children's results in under the child's path and
/// keep going, so one pass reports every defect in the document.
pub trait Reify: Default {
    /// True only for optional wrappers; fields of such types are not required.
    const IS_OPTIONAL: bool = false;

    /// Reads `node` into `self`, reporting every defect found.
    ///
    /// On failure `self` may be partially written.
    fn reify(&mut self, node: &dyn Node) -> ValidationResult;

    fn kind() -> ValueKind;

    /// The value as a scalar, for constraint checks. `None` for containers
    /// and for absent optional values.
    fn scalar(&self) -> Option<Scalar> {
        None
    }
}

macro_rules! impl_reify_signed {
    ($kind:ident => $($ty:ty),*) => {
        $(
            impl Reify for $ty {
                fn reify(&mut self, node: &dyn Node) -> ValidationResult {
                    match node.as_int().and_then(|v| <$ty>::try_from(v).ok()) {
                        Some(value) => {
                            *self = value;
                            ValidationResult::new()
                        }
                        None => ValidationResult::error("", "Invalid integer"),
                    }
                }

                fn kind() -> ValueKind {
                    ValueKind::$kind
                }

                fn scalar(&self) -> Option<Scalar> {
                    i64::try_from(*self).ok().map(Scalar::Int)
                }
            }
        )*
    };
}

macro_rules! impl_reify_unsigned {
    ($kind:ident => $($ty:ty),*) => {
        $(
            impl Reify for $ty {
                fn reify(&mut self, node: &dyn Node) -> ValidationResult {
                    match node.as_uint().and_then(|v| <$ty>::try_from(v).ok()) {
                        Some(value) => {
                            *self = value;
                            ValidationResult::new()
                        }
                        None => ValidationResult::error("", "Invalid integer"),
                    }
                }

                fn kind() -> ValueKind {
                    ValueKind::$kind
                }

                fn scalar(&self) -> Option<Scalar> {
                    u64::try_from(*self).ok().map(Scalar::UInt)
                }
            }
        )*
    };
}

impl_reify_signed!(Int => i8, i16, i32, isize);
impl_reify_signed!(BigInt => i64);
impl_reify_unsigned!(Int => u8, u16, u32, usize);
impl_reify_unsigned!(BigInt => u64);

impl Reify for f64 {
    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        match node.as_double() {
            Some(value) => {
                *self = value;
                ValidationResult::new()
            }
            None => ValidationResult::error("", "Invalid double"),
        }
    }

    fn kind() -> ValueKind {
        ValueKind::Double
    }

    fn scalar(&self) -> Option<Scalar> {
        Some(Scalar::Float(*self))
    }
}

impl Reify for f32 {
    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        match node.as_double() {
            Some(value) => {
                *self = value as f32;
                ValidationResult::new()
            }
            None => ValidationResult::error("", "Invalid float"),
        }
    }

    fn kind() -> ValueKind {
        ValueKind::Float
    }

    fn scalar(&self) -> Option<Scalar> {
        Some(Scalar::Float(f64::from(*self)))
    }
}

impl Reify for bool {
    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        match node.as_bool() {
            Some(value) => {
                *self = value;
                ValidationResult::new()
            }
            None => ValidationResult::error("", "Invalid boolean"),
        }
    }

    fn kind() -> ValueKind {
        ValueKind::Bool
    }

    fn scalar(&self) -> Option<Scalar> {
        Some(Scalar::Bool(*self))
    }
}

impl Reify for String {
    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        match node.as_string() {
            Some(value) => {
                *self = value;
                ValidationResult::new()
            }
            None => ValidationResult::error("", "Invalid string"),
        }
    }

    fn kind() -> ValueKind {
        ValueKind::Text
    }

    fn scalar(&self) -> Option<Scalar> {
        Some(Scalar::Text(self.clone()))
    }
}

impl Reify for PathBuf {
    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        match node.as_string() {
            Some(value) => {
                *self = PathBuf::from(value);
                ValidationResult::new()
            }
            None => ValidationResult::error("", "Invalid path"),
        }
    }

    fn kind() -> ValueKind {
        ValueKind::Path
    }

    fn scalar(&self) -> Option<Scalar> {
        Some(Scalar::Text(self.to_string_lossy().into_owned()))
    }
}

impl<T: Reify> Reify for Option<T> {
    const IS_OPTIONAL: bool = true;

    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        if node.is_null() {
            *self = None;
            return ValidationResult::new();
        }
        let mut value = T::default();
        let result = value.reify(node);
        if result.is_valid() {
            *self = Some(value);
        }
        result
    }

    fn kind() -> ValueKind {
        T::kind()
    }

    fn scalar(&self) -> Option<Scalar> {
        self.as_ref().and_then(Reify::scalar)
    }
}

impl<T: Reify> Reify for Box<T> {
    const IS_OPTIONAL: bool = T::IS_OPTIONAL;

    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        self.as_mut().reify(node)
    }

    fn kind() -> ValueKind {
        T::kind()
    }

    fn scalar(&self) -> Option<Scalar> {
        self.as_ref().scalar()
    }
}

/// Reads every element of a sequence node.
///
/// Elements that fail are left out of the returned values and their errors
/// are reported under `[index]`; the remaining elements are still read.
pub fn reify_elements<T: Reify>(node: &dyn Node) -> (Vec<T>, ValidationResult) {
    let mut result = ValidationResult::new();
    if !node.is_sequence() {
        result.add_error("", format!("Expected sequence, found {}", node.kind()));
        return (Vec::new(), result);
    }
    let mut values = Vec::with_capacity(node.len());
    for index in 0..node.len() {
        let Some(child) = node.at(index) else {
            result.add_error(format!("[{index}]"), "Failed to get element");
            continue;
        };
        let mut value = T::default();
        let element = value.reify(child);
        if element.is_valid() {
            values.push(value);
        } else {
            result.merge_index(index, element);
        }
    }
    (values, result)
}

/// Reads every entry of a map node, keyed by the keys found in the document.
///
/// Entries whose value fails are left out and reported under their key.
pub fn reify_entries<V: Reify>(node: &dyn Node) -> (Vec<(String, V)>, ValidationResult) {
    let mut result = ValidationResult::new();
    if !node.is_map() {
        result.add_error("", format!("Expected map, found {}", node.kind()));
        return (Vec::new(), result);
    }
    let keys = node.keys();
    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(child) = node.get(&key) else {
            continue;
        };
        let mut value = V::default();
        let entry = value.reify(child);
        if entry.is_valid() {
            entries.push((key, value));
        } else {
            result.merge(&key_segment(&key), entry);
        }
    }
    (entries, result)
}

macro_rules! impl_reify_sequence {
    ($($container:ident $(+ $bound:ident)*),*) => {
        $(
            impl<T: Reify $(+ $bound)*> Reify for $container<T> {
                fn reify(&mut self, node: &dyn Node) -> ValidationResult {
                    let (values, result) = reify_elements::<T>(node);
                    *self = values.into_iter().collect();
                    result
                }

                fn kind() -> ValueKind {
                    ValueKind::Sequence
                }
            }
        )*
    };
}

impl_reify_sequence!(Vec, VecDeque, BTreeSet + Ord, HashSet + Eq + Hash);

impl<V: Reify> Reify for BTreeMap<String, V> {
    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        let (entries, result) = reify_entries::<V>(node);
        *self = entries.into_iter().collect();
        result
    }

    fn kind() -> ValueKind {
        ValueKind::Map
    }
}

impl<V: Reify> Reify for HashMap<String, V> {
    fn reify(&mut self, node: &dyn Node) -> ValidationResult {
        let (entries, result) = reify_entries::<V>(node);
        *self = entries.into_iter().collect();
        result
    }

    fn kind() -> ValueKind {
        ValueKind::Map
    }
}

macro_rules! impl_reify_tuple {
    ($arity:literal => $($index:tt $name:ident),+) => {
        impl<$($name: Reify),+> Reify for ($($name,)+) {
            fn reify(&mut self, node: &dyn Node) -> ValidationResult {
                if !node.is_sequence() || node.len() != $arity {
                    let found = if node.is_sequence() {
                        format!("sequence of {}", node.len())
                    } else {
                        node.kind().to_string()
                    };
                    return ValidationResult::error(
                        "",
                        format!("Expected sequence of {} elements, found {}", $arity, found),
                    );
                }
                let mut result = ValidationResult::new();
                $(
                    match node.at($index) {
                        Some(child) => result.merge_index($index, self.$index.reify(child)),
                        None => result.add_error(format!("[{}]", $index), "Failed to get element"),
                    }
                )+
                result
            }

            fn kind() -> ValueKind {
                ValueKind::Tuple
            }
        }
    };
}

impl_reify_tuple!(1 => 0 A);
impl_reify_tuple!(2 => 0 A, 1 B);
impl_reify_tuple!(3 => 0 A, 1 B, 2 C);
impl_reify_tuple!(4 => 0 A, 1 B, 2 C, 3 D);
impl_reify_tuple!(5 => 0 A, 1 B, 2 C, 3 D, 4 E);
impl_reify_tuple!(6 => 0 A, 1 B, 2 C, 3 D, 4 E, 5 F);

/// Reads a registered enum from its name.
pub fn reify_enum<E: ReflectEnum>(value: &mut E, node: &dyn Node) -> ValidationResult {
    let table = E::table();
    let Some(name) = node
        .as_string()
        .filter(|_| node.kind() == NodeKind::String)
    else {
        return ValidationResult::error(
            "",
            format!("Invalid enum. Valid values are: {}", table.valid_values()),
        );
    };
    log::trace!("looking up enum name {name:?}");
    match table.from_name(&name) {
        Some(found) => {
            *value = found;
            ValidationResult::new()
        }
        None => ValidationResult::error(
            "",
            format!(
                "Unknown enum value '{name}'. Valid values are: {}",
                table.valid_values()
            ),
        ),
    }
}

/// Reads a record field by field, as listed in its metadata.
///
/// Every declared field is attempted. A missing key is an error only for
/// required fields without a default; a present key is read and, when that
/// succeeds, checked against the field's constraints. Keys in the document
/// that match no declared field are reported afterwards as unexpected.
pub fn reify_record<R: Record>(record: &mut R, node: &dyn Node) -> ValidationResult {
    let mut result = ValidationResult::new();
    if !node.is_map() {
        result.add_error("", format!("Expected map, found {}", node.kind()));
        return result;
    }
    let style = node.column_style();
    let fields = R::fields();
    log::debug!(
        "reading {} declared field(s) of {}",
        fields.len(),
        std::any::type_name::<R>()
    );

    for field in fields {
        let key = field.column(style);
        let child = match node.get(key) {
            Some(child) => field.reify_into(record, child),
            None => match field.default_value() {
                Some(default) => reify_default(record, field, default),
                None if field.is_required() => {
                    result.add_error(key, "Missing required field");
                    continue;
                }
                None => {
                    log::trace!("optional field {key} is absent");
                    continue;
                }
            },
        };
        if !child.is_valid() {
            result.merge(key, child);
            continue;
        }
        let constraints = field.attributes().iter().filter(|a| a.is_constraint());
        match field.scalar(record) {
            Some(value) => {
                for attribute in constraints {
                    if let Err(message) = attribute.check(&value) {
                        result.add_error(key, message);
                    }
                }
            }
            // absent optional
            None if field.kind().is_scalar() => {}
            None => {
                for attribute in constraints {
                    result.add_error(
                        key,
                        format!("{} constraint requires a scalar field", attribute.name()),
                    );
                }
            }
        }
    }

    for key in node.keys() {
        if !fields.iter().any(|field| field.column(style) == key) {
            result.add_error(key_segment(&key), "Unexpected field");
        }
    }
    result
}

fn reify_default<R: Record>(
    record: &mut R,
    field: &crate::field::FieldDescriptor<R>,
    default: &str,
) -> ValidationResult {
    match serde_yaml::from_str::<serde_yaml::Value>(default) {
        Ok(value) => {
            let result = field.reify_into(record, &value);
            if result.is_valid() {
                return result;
            }
            let mut wrapped = ValidationResult::new();
            for error in result.into_errors() {
                wrapped.add_error(
                    error.path,
                    format!("Invalid default value: {}", error.message),
                );
            }
            wrapped
        }
        Err(error) => ValidationResult::error("", format!("Invalid default value: {error}")),
    }
}
