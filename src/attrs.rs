use std::fmt;

use bitflags::bitflags;

/// A scalar view of a field value, used by constraint checks and by the
/// SQL generator.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(v) => Some(*v as f64),
            Scalar::UInt(v) => Some(*v as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Bool(_) | Scalar::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Equality across numeric representations, so a whitelist of integers
    /// accepts `443` whether it was read as `i64`, `u16` or `f32`.
    pub fn matches(&self, other: &Scalar) -> bool {
        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) => a == b,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            (Scalar::Int(a), Scalar::Int(b)) => a == b,
            (Scalar::UInt(a), Scalar::UInt(b)) => a == b,
            (Scalar::Int(a), Scalar::UInt(b)) | (Scalar::UInt(b), Scalar::Int(a)) => {
                u64::try_from(*a).is_ok_and(|a| a == *b)
            }
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// The value as it appears in constraint messages: text single-quoted.
    pub fn quoted(&self) -> String {
        match self {
            Scalar::Text(s) => format!("'{s}'"),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::UInt(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Text(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! impl_scalar_from {
    ($variant:ident <= $($ty:ty),*) => {
        $(
            impl From<$ty> for Scalar {
                fn from(value: $ty) -> Self {
                    Scalar::$variant(value.into())
                }
            }
        )*
    };
}

impl_scalar_from!(Int <= i8, i16, i32, i64);
impl_scalar_from!(UInt <= u8, u16, u32, u64);
impl_scalar_from!(Float <= f32, f64);
impl_scalar_from!(Bool <= bool);
impl_scalar_from!(Text <= String, &str);

/// Free-form documentation for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Description(pub &'static str);

/// Value used when the field's key is absent, written as YAML text
/// (`"8080"`, `"[a, b]"`, `"{host: localhost}"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultValue(pub &'static str);

/// A named custom check run against the field's scalar value.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    pub rule: &'static str,
    pub check: fn(&Scalar) -> Result<(), String>,
}

impl Validator {
    pub fn new(rule: &'static str, check: fn(&Scalar) -> Result<(), String>) -> Self {
        Self { rule, check }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlColumn(pub &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvColumn(pub &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonColumn(pub &'static str);

bitflags! {
    /// Storage properties, consumed by the SQL generator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Props: u8 {
        const PRIMARY_KEY = 1 << 0;
        const INDEXED = 1 << 1;
        const UNIQUE = 1 << 2;
        const NOT_NULL = 1 << 3;
        const SERIALIZABLE = 1 << 4;
        const HASHABLE = 1 << 5;
    }
}

impl fmt::Display for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Props, &str); 6] = [
            (Props::PRIMARY_KEY, "PrimaryKey"),
            (Props::INDEXED, "Indexed"),
            (Props::UNIQUE, "Unique"),
            (Props::NOT_NULL, "NotNull"),
            (Props::SERIALIZABLE, "Serializable"),
            (Props::HASHABLE, "Hashable"),
        ];
        if self.is_empty() {
            return write!(f, "None");
        }
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "{}", names.join(" | "))
    }
}

/// Inclusive numeric range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn validate(&self, value: &Scalar) -> Result<(), String> {
        let Some(number) = value.as_f64() else {
            return Err("Bounds check requires a numeric value".to_string());
        };
        if number < self.min || number > self.max {
            return Err(format!(
                "Value {value} out of bounds [{}, {}]",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

/// Inclusive length range, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLength {
    pub min: usize,
    pub max: usize,
}

impl StringLength {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn validate(&self, value: &Scalar) -> Result<(), String> {
        let Some(text) = value.as_text() else {
            return Err("String length check requires a text value".to_string());
        };
        let length = text.chars().count();
        if length < self.min || length > self.max {
            return Err(format!(
                "String length {length} out of bounds [{}, {}]",
                self.min, self.max
            ));
        }
        Ok(())
    }
}

/// The closed set of values a field may take.
#[derive(Debug, Clone, PartialEq)]
pub struct Whitelist {
    values: Vec<Scalar>,
}

impl Whitelist {
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Scalar>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn integers(values: &[i64]) -> Self {
        Self::new(values.iter().copied())
    }

    pub fn floats(values: &[f64]) -> Self {
        Self::new(values.iter().copied())
    }

    pub fn text(values: &[&str]) -> Self {
        Self::new(values.iter().copied())
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn validate(&self, value: &Scalar) -> Result<(), String> {
        if self.values.iter().any(|allowed| allowed.matches(value)) {
            return Ok(());
        }
        let allowed: Vec<String> = self.values.iter().map(Scalar::quoted).collect();
        Err(format!("Value not in whitelist: {{{}}}", allowed.join(", ")))
    }
}

/// One attribute attached to a field.
#[derive(Debug, Clone)]
pub enum Attribute {
    Description(Description),
    DefaultValue(DefaultValue),
    Validator(Validator),
    SqlColumn(SqlColumn),
    CsvColumn(CsvColumn),
    JsonColumn(JsonColumn),
    Props(Props),
    Bounds(Bounds),
    StringLength(StringLength),
    Whitelist(Whitelist),
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Description(_) => "Description",
            Attribute::DefaultValue(_) => "DefaultValue",
            Attribute::Validator(_) => "Validator",
            Attribute::SqlColumn(_) => "SqlColumn",
            Attribute::CsvColumn(_) => "CsvColumn",
            Attribute::JsonColumn(_) => "JsonColumn",
            Attribute::Props(_) => "Props",
            Attribute::Bounds(_) => "Bounds",
            Attribute::StringLength(_) => "StringLength",
            Attribute::Whitelist(_) => "Whitelist",
        }
    }

    /// Runs this attribute's constraint, if it has one, against a freshly
    /// read value. Attributes that carry no constraint always pass.
    ///
    /// Constraints only apply to scalar-valued fields. A record field of a
    /// sequence, map, tuple or record type that carries one is reported as
    /// `<Name> constraint requires a scalar field` every time it is read.
    pub fn check(&self, value: &Scalar) -> Result<(), String> {
        match self {
            Attribute::Bounds(bounds) => bounds.validate(value),
            Attribute::StringLength(length) => length.validate(value),
            Attribute::Whitelist(whitelist) => whitelist.validate(value),
            Attribute::Validator(validator) => (validator.check)(value),
            _ => Ok(()),
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(
            self,
            Attribute::Bounds(_)
                | Attribute::StringLength(_)
                | Attribute::Whitelist(_)
                | Attribute::Validator(_)
        )
    }
}

/// Typed lookup of one attribute variant.
pub trait AttributeKind: Sized + 'static {
    fn extract(attribute: &Attribute) -> Option<&Self>;
}

macro_rules! attribute_kinds {
    ($($kind:ident),* $(,)?) => {
        $(
            impl From<$kind> for Attribute {
                fn from(value: $kind) -> Self {
                    Attribute::$kind(value)
                }
            }

            impl AttributeKind for $kind {
                fn extract(attribute: &Attribute) -> Option<&Self> {
                    match attribute {
                        Attribute::$kind(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

attribute_kinds!(
    Description,
    DefaultValue,
    Validator,
    SqlColumn,
    CsvColumn,
    JsonColumn,
    Props,
    Bounds,
    StringLength,
    Whitelist,
);
