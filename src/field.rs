use std::fmt;

use crate::attrs::{Attribute, AttributeKind, CsvColumn, DefaultValue, JsonColumn, Scalar, SqlColumn};
use crate::builder::{Builder, Tree, TreeBuilder};
use crate::de::{Reify, ValueKind};
use crate::node::{ColumnStyle, Node};
use crate::ser::Emit;
use crate::validation::ValidationResult;

/// Type-erased access to one field of `R`, used by both dispatchers.
pub trait FieldSlot<R>: Send + Sync {
    fn reify(&self, record: &mut R, node: &dyn Node) -> ValidationResult;

    fn emit(&self, record: &R, builder: &mut dyn Builder);

    fn scalar(&self, record: &R) -> Option<Scalar>;

    fn kind(&self) -> ValueKind;
}

struct Accessor<R, T> {
    get: fn(&R) -> &T,
    get_mut: fn(&mut R) -> &mut T,
}

impl<R, T> FieldSlot<R> for Accessor<R, T>
where
    R: 'static,
    T: Reify + Emit + 'static,
{
    fn reify(&self, record: &mut R, node: &dyn Node) -> ValidationResult {
        (self.get_mut)(record).reify(node)
    }

    fn emit(&self, record: &R, builder: &mut dyn Builder) {
        (self.get)(record).emit(builder)
    }

    fn scalar(&self, record: &R) -> Option<Scalar> {
        (self.get)(record).scalar()
    }

    fn kind(&self) -> ValueKind {
        T::kind()
    }
}

/// Name, accessor, requiredness and attributes of one record field.
///
/// A field is required unless its type is `Option<_>`. Attributes are
/// looked up by kind with [`FieldDescriptor::attribute`].
pub struct FieldDescriptor<R> {
    name: &'static str,
    required: bool,
    slot: Box<dyn FieldSlot<R>>,
    attributes: Vec<Attribute>,
}

impl<R: 'static> FieldDescriptor<R> {
    pub fn new<T>(name: &'static str, get: fn(&R) -> &T, get_mut: fn(&mut R) -> &mut T) -> Self
    where
        T: Reify + Emit + 'static,
    {
        Self {
            name,
            required: !T::IS_OPTIONAL,
            slot: Box::new(Accessor { get, get_mut }),
            attributes: Vec::new(),
        }
    }

    pub fn with(mut self, attribute: impl Into<Attribute>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn with_attributes(mut self, attributes: impl IntoIterator<Item = Attribute>) -> Self {
        self.attributes.extend(attributes);
        self
    }
}

impl<R> FieldDescriptor<R> {
    /// The document key of this field.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn kind(&self) -> ValueKind {
        self.slot.kind()
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The first attribute of kind `K`, if the field carries one.
    pub fn attribute<K: AttributeKind>(&self) -> Option<&K> {
        self.attributes.iter().find_map(K::extract)
    }

    pub fn has<K: AttributeKind>(&self) -> bool {
        self.attribute::<K>().is_some()
    }

    pub fn default_value(&self) -> Option<&'static str> {
        self.attribute::<DefaultValue>().map(|default| default.0)
    }

    pub fn sql_column(&self) -> &'static str {
        self.attribute::<SqlColumn>().map_or(self.name, |column| column.0)
    }

    pub fn csv_column(&self) -> &'static str {
        self.attribute::<CsvColumn>().map_or(self.name, |column| column.0)
    }

    pub fn json_column(&self) -> &'static str {
        self.attribute::<JsonColumn>().map_or(self.name, |column| column.0)
    }

    /// The key this field is read and written under for a backend's style.
    pub fn column(&self, style: ColumnStyle) -> &'static str {
        match style {
            ColumnStyle::Plain => self.name,
            ColumnStyle::Json => self.json_column(),
            ColumnStyle::Csv => self.csv_column(),
        }
    }

    pub fn reify_into(&self, record: &mut R, node: &dyn Node) -> ValidationResult {
        log::trace!("reading field {}", self.name);
        self.slot.reify(record, node)
    }

    pub fn emit(&self, record: &R, builder: &mut dyn Builder) {
        self.slot.emit(record, builder)
    }

    pub fn scalar(&self, record: &R) -> Option<Scalar> {
        self.slot.scalar(record)
    }

    /// The field's current value as a standalone tree.
    pub fn to_tree(&self, record: &R, style: ColumnStyle) -> Tree {
        let mut builder = TreeBuilder::new(style);
        self.emit(record, &mut builder);
        builder.finish()
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("required", &self.required)
            .field("kind", &self.slot.kind())
            .field("attributes", &self.attributes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::{Bounds, Description, Props};

    #[derive(Default)]
    struct Sample {
        id: u32,
        nickname: Option<String>,
    }

    fn id(sample: &Sample) -> &u32 {
        &sample.id
    }

    fn id_mut(sample: &mut Sample) -> &mut u32 {
        &mut sample.id
    }

    fn nickname(sample: &Sample) -> &Option<String> {
        &sample.nickname
    }

    fn nickname_mut(sample: &mut Sample) -> &mut Option<String> {
        &mut sample.nickname
    }

    fn id_field() -> FieldDescriptor<Sample> {
        FieldDescriptor::new("id", id, id_mut)
            .with(Description("Primary identifier"))
            .with(Props::PRIMARY_KEY | Props::INDEXED)
            .with(Bounds::new(1.0, 1000.0))
            .with(SqlColumn("sample_id"))
    }

    fn nickname_field() -> FieldDescriptor<Sample> {
        FieldDescriptor::new("nickname", nickname, nickname_mut)
    }

    #[test]
    fn requiredness_follows_optional_type() {
        assert!(id_field().is_required());
        assert!(!nickname_field().is_required());
    }

    #[test]
    fn attributes_are_found_by_kind() {
        let field = id_field();
        assert_eq!(
            field.attribute::<Description>().map(|d| d.0),
            Some("Primary identifier")
        );
        assert!(field.has::<Bounds>());
        assert!(!field.has::<DefaultValue>());
        assert!(field
            .attribute::<Props>()
            .is_some_and(|props| props.contains(Props::PRIMARY_KEY)));
        assert!(nickname_field().attribute::<Description>().is_none());
    }

    #[test]
    fn column_names_fall_back_to_the_key() {
        let field = id_field();
        assert_eq!(field.sql_column(), "sample_id");
        assert_eq!(field.csv_column(), "id");
        assert_eq!(field.column(ColumnStyle::Json), "id");
    }

    #[test]
    fn accessor_reads_and_writes_through_the_record() {
        let mut sample = Sample::default();
        let node: serde_yaml::Value = serde_yaml::from_str("42").unwrap();
        let field = id_field();
        assert!(field.reify_into(&mut sample, &node).is_valid());
        assert_eq!(sample.id, 42);
        assert_eq!(field.scalar(&sample), Some(Scalar::UInt(42)));
        assert_eq!(field.to_tree(&sample, ColumnStyle::Plain), Tree::UInt(42));
        assert_eq!(nickname_field().scalar(&sample), None);
    }
}
