use std::collections::HashMap;
use std::hash::Hash;

/// A fieldless enum with a registered name for every variant.
///
/// Implemented by [`reflect_enum!`](crate::reflect_enum), which also
/// provides the `Reify` and `Emit` impls that read and write the names.
pub trait ReflectEnum: Copy + Eq + Hash + Send + Sync + 'static {
    /// Every variant with its name, in declaration order.
    const VARIANTS: &'static [(Self, &'static str)];

    /// The lookup table for this enum, built on first use.
    fn table() -> &'static EnumTable<Self>;

    fn name(self) -> &'static str {
        Self::table().to_name(self).unwrap_or_default()
    }
}

/// Precomputed value-to-name and name-to-value maps.
#[derive(Debug)]
pub struct EnumTable<E: 'static> {
    variants: &'static [(E, &'static str)],
    to_name: HashMap<E, &'static str>,
    from_name: HashMap<&'static str, E>,
}

impl<E: Copy + Eq + Hash> EnumTable<E> {
    pub fn new(variants: &'static [(E, &'static str)]) -> Self {
        let to_name = variants.iter().map(|(value, name)| (*value, *name)).collect();
        let from_name = variants.iter().map(|(value, name)| (*name, *value)).collect();
        Self {
            variants,
            to_name,
            from_name,
        }
    }

    pub fn to_name(&self, value: E) -> Option<&'static str> {
        self.to_name.get(&value).copied()
    }

    pub fn from_name(&self, name: &str) -> Option<E> {
        self.from_name.get(name).copied()
    }

    /// All values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = E> + '_ {
        self.variants.iter().map(|(value, _)| *value)
    }

    /// All names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.variants.iter().map(|(_, name)| *name)
    }

    /// The names quoted and comma-joined, for error messages.
    pub fn valid_values(&self) -> String {
        self.names()
            .map(|name| format!("'{name}'"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Every value of `E` in declaration order.
pub fn enum_values<E: ReflectEnum>() -> Vec<E> {
    E::table().values().collect()
}

/// Looks up the value registered under `name`.
pub fn to_enum<E: ReflectEnum>(name: &str) -> Option<E> {
    E::table().from_name(name)
}

/// Declares a fieldless enum together with its name table.
///
/// ```
/// reify_core::reflect_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
///     pub enum Color {
///         #[default]
///         Red => "red",
///         Green => "green",
///         Blue => "blue",
///     }
/// }
///
/// assert_eq!(reify_core::to_enum::<Color>("green"), Some(Color::Green));
/// ```
///
/// The enum must derive `Copy`, `Eq`, `Hash` and `Default`.
#[macro_export]
macro_rules! reflect_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $text:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $crate::ReflectEnum for $name {
            const VARIANTS: &'static [(Self, &'static str)] = &[
                $(($name::$variant, $text),)*
            ];

            fn table() -> &'static $crate::EnumTable<Self> {
                static TABLE: ::std::sync::OnceLock<$crate::EnumTable<$name>> =
                    ::std::sync::OnceLock::new();
                TABLE.get_or_init(|| $crate::EnumTable::new(
                    <$name as $crate::ReflectEnum>::VARIANTS,
                ))
            }
        }

        impl $crate::Reify for $name {
            fn reify(&mut self, node: &dyn $crate::Node) -> $crate::ValidationResult {
                $crate::de::reify_enum(self, node)
            }

            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::Enum
            }

            fn scalar(&self) -> ::std::option::Option<$crate::Scalar> {
                ::std::option::Option::Some($crate::Scalar::Text(
                    $crate::ReflectEnum::name(*self).to_string(),
                ))
            }
        }

        impl $crate::Emit for $name {
            fn emit(&self, builder: &mut dyn $crate::Builder) {
                $crate::ser::emit_enum(self, builder)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::reflect_enum! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        enum Priority {
            #[default]
            Low => "low",
            Medium => "medium",
            High => "high",
            Critical => "critical",
        }
    }

    #[test]
    fn names_round_trip() {
        for value in enum_values::<Priority>() {
            assert_eq!(to_enum::<Priority>(value.name()), Some(value));
        }
        assert_eq!(to_enum::<Priority>("urgent"), None);
    }

    #[test]
    fn values_keep_declaration_order() {
        assert_eq!(
            enum_values::<Priority>(),
            vec![
                Priority::Low,
                Priority::Medium,
                Priority::High,
                Priority::Critical
            ]
        );
        // The sequence is restartable.
        assert_eq!(Priority::table().values().count(), 4);
        assert_eq!(Priority::table().values().count(), 4);
    }

    #[test]
    fn valid_values_are_quoted_in_order() {
        assert_eq!(
            Priority::table().valid_values(),
            "'low', 'medium', 'high', 'critical'"
        );
    }

    #[test]
    fn table_is_built_once() {
        let first: *const EnumTable<Priority> = Priority::table();
        let second: *const EnumTable<Priority> = Priority::table();
        assert_eq!(first, second);
    }
}
