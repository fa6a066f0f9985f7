use crate::de::Reify;
use crate::field::FieldDescriptor;
use crate::ser::Emit;

/// A struct whose fields are (de)serialized through its metadata.
///
/// The field list is the whole contract between the struct and its
/// documents: fields missing from it are never written and are rejected
/// as unexpected on input. Prefer [`record!`](crate::record), which derives
/// the list from the struct body.
pub trait Record: Reify + Emit + Sized + 'static {
    /// The SQL table the record maps to, if any.
    const TABLE_NAME: Option<&'static str> = None;

    /// Field descriptors in declaration order.
    fn fields() -> &'static [FieldDescriptor<Self>];

    fn field(name: &str) -> Option<&'static FieldDescriptor<Self>> {
        Self::fields().iter().find(|field| field.name() == name)
    }
}

/// Declares a struct together with its field metadata.
///
/// ```
/// use reify_core::attrs::{Bounds, Description};
///
/// reify_core::record! {
///     table "people";
///     #[derive(Debug, Clone, PartialEq, Default)]
///     pub struct Person {
///         pub name: String => [Description("Full name")],
///         pub age: u32 => [Bounds::new(0.0, 150.0)],
///         pub email as "e-mail": Option<String>,
///     }
/// }
///
/// use reify_core::Record;
/// assert_eq!(Person::fields().len(), 3);
/// assert_eq!(Person::fields()[2].name(), "e-mail");
/// assert_eq!(Person::TABLE_NAME, Some("people"));
/// ```
///
/// The struct must implement `Default`; every field type must implement
/// `Reify` and `Emit`.
#[macro_export]
macro_rules! record {
    (@key $field:ident) => {
        ::std::stringify!($field)
    };
    (@key $field:ident $key:literal) => {
        $key
    };
    (@table) => {
        ::std::option::Option::None
    };
    (@table $table:literal) => {
        ::std::option::Option::Some($table)
    };
    (
        @body [$($table:literal)?]
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident $(as $key:literal)? : $ty:ty
                $(=> [$($attr:expr),* $(,)?])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::Record for $name {
            const TABLE_NAME: ::std::option::Option<&'static str> =
                $crate::record!(@table $($table)?);

            fn fields() -> &'static [$crate::FieldDescriptor<Self>] {
                static FIELDS: ::std::sync::OnceLock<::std::vec::Vec<$crate::FieldDescriptor<$name>>> =
                    ::std::sync::OnceLock::new();
                FIELDS.get_or_init(|| {
                    ::std::vec![
                        $({
                            fn get(record: &$name) -> &$ty {
                                &record.$field
                            }
                            fn get_mut(record: &mut $name) -> &mut $ty {
                                &mut record.$field
                            }
                            $crate::FieldDescriptor::new(
                                $crate::record!(@key $field $($key)?),
                                get,
                                get_mut,
                            )
                            $(.with_attributes([$($crate::attrs::Attribute::from($attr)),*]))?
                        }),*
                    ]
                })
            }
        }

        impl $crate::Reify for $name {
            fn reify(&mut self, node: &dyn $crate::Node) -> $crate::ValidationResult {
                $crate::de::reify_record(self, node)
            }

            fn kind() -> $crate::ValueKind {
                $crate::ValueKind::Record
            }
        }

        impl $crate::Emit for $name {
            fn emit(&self, builder: &mut dyn $crate::Builder) {
                $crate::ser::emit_record(self, builder)
            }
        }
    };
    (table $table:literal; $($rest:tt)*) => {
        $crate::record!(@body [$table] $($rest)*);
    };
    ($($rest:tt)*) => {
        $crate::record!(@body [] $($rest)*);
    };
}
