//! Collection field layouts
//!
//! Before a collection is used for the first time, its field layout is registered with the
//! remote store as an ordered list of [`FieldDescriptor`]s. Layouts for fixed record types are
//! declared statically through the [`Schema`] trait, as a table of [`Attribute`]s that is turned
//! into descriptors by [`derive_field_descriptors`].
use std::{borrow::Cow, fmt::Display};

use serde::{Serialize, Serializer};

/// Name of the conventional primary key field
pub const ID_FIELD: &str = "id";

/// Name of the foreign key field that stands in for the primary key when no `id` is declared
pub const USER_ID_FIELD: &str = "userId";

/// The declared type of a collection field
///
/// This is informational for the remote store and is never enforced client-side. On the wire it
/// is rendered as one of `string`, `number`, `boolean`, `Date`, `object`, or `[]<inner>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Object,
    /// A sequence of values that all have the inner type
    Sequence(&'static FieldType),
}

impl Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "Date"),
            Self::Object => write!(f, "object"),
            Self::Sequence(inner) => write!(f, "[]{inner}"),
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Describes one field of a collection, as sent in the confirmation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    name: Cow<'static, str>,
    type_name: FieldType,
    #[serde(skip_serializing_if = "is_false")]
    main_key: bool,
    #[serde(skip_serializing_if = "is_false")]
    optional: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl FieldDescriptor {
    /// Create a new, required, non-key [`FieldDescriptor`]
    pub fn new(name: impl Into<Cow<'static, str>>, type_name: FieldType) -> Self {
        Self {
            name: name.into(),
            type_name,
            main_key: false,
            optional: false,
        }
    }

    /// Mark this field as the collection's primary key
    pub fn main_key(mut self) -> Self {
        self.main_key = true;
        self
    }

    /// Mark this field as one whose value may be absent
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> FieldType {
        self.type_name
    }

    pub fn is_main_key(&self) -> bool {
        self.main_key
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }
}

/// A compile-time declaration of one attribute of a record type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    name: &'static str,
    field_type: FieldType,
    optional: bool,
}

impl Attribute {
    /// An attribute that always carries a value
    pub const fn required(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            optional: false,
        }
    }

    /// An attribute whose value may be absent
    pub const fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            optional: true,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// A record type with a statically declared collection layout
pub trait Schema {
    /// The record's attributes, in declaration order
    const ATTRIBUTES: &'static [Attribute];

    /// The descriptor list registered for collections holding this record type
    fn field_descriptors() -> Vec<FieldDescriptor> {
        derive_field_descriptors(Self::ATTRIBUTES)
    }
}

/// Turn a table of [`Attribute`]s into the descriptor list sent on collection confirmation
///
/// - A declared `id` is always emitted first, as a `string` primary key, exactly once.
/// - Without an `id`, the first `userId` takes the key's place and is emitted as the `id`
///   primary key; otherwise `userId` is a plain `string` field.
/// - Every other attribute keeps its declared type and optional flag, in declaration order.
pub fn derive_field_descriptors(attributes: &[Attribute]) -> Vec<FieldDescriptor> {
    let mut fields = Vec::with_capacity(attributes.len());
    let mut key_emitted = false;

    if attributes.iter().any(|a| a.name == ID_FIELD) {
        fields.push(FieldDescriptor::new(ID_FIELD, FieldType::String).main_key());
        key_emitted = true;
    }

    for attribute in attributes {
        match attribute.name {
            ID_FIELD => continue,
            USER_ID_FIELD if !key_emitted => {
                fields.push(FieldDescriptor::new(ID_FIELD, FieldType::String).main_key());
                key_emitted = true;
            }
            USER_ID_FIELD => fields.push(FieldDescriptor::new(USER_ID_FIELD, FieldType::String)),
            name => {
                let field = FieldDescriptor::new(name, attribute.field_type);
                fields.push(if attribute.optional {
                    field.optional()
                } else {
                    field
                });
            }
        }
    }

    fields
}
