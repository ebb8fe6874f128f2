//! Entity type metadata.
//!
//! Filters never inspect instances to discover properties; they are built
//! against an [`EntityType`] that lists every filterable property with its
//! semantic type. Types form single-inheritance chains through `base`, and a
//! derived type sees all of its ancestors' properties.

pub mod descriptor;

pub use descriptor::Schema;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to read schema file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse schema file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: json5::Error,
    },
    #[error("Unknown property type '{type_name}' for property '{entity}.{property}'")]
    UnknownType {
        entity: String,
        property: String,
        type_name: String,
    },
    #[error("Base type '{base}' of '{entity}' is not defined or forms a cycle")]
    UnknownBaseType { entity: String, base: String },
    #[error("Entity type '{0}' is defined more than once")]
    DuplicateEntity(String),
    #[error("Property '{property}' is defined more than once on '{entity}'")]
    DuplicateProperty { entity: String, property: String },
    #[error("Entity type '{0}' is not defined in the schema")]
    UnknownEntity(String),
}

/// Width and signedness of a numeric property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericType {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl NumericType {
    pub fn is_float(self) -> bool {
        matches!(self, NumericType::F32 | NumericType::F64)
    }

    pub fn is_signed(self) -> bool {
        !matches!(
            self,
            NumericType::U8 | NumericType::U16 | NumericType::U32 | NumericType::U64
        )
    }

    /// Inclusive integer range; `None` for floating types.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range: (i128, i128) = match self {
            NumericType::I8 => (i8::MIN.into(), i8::MAX.into()),
            NumericType::I16 => (i16::MIN.into(), i16::MAX.into()),
            NumericType::I32 => (i32::MIN.into(), i32::MAX.into()),
            NumericType::I64 => (i64::MIN.into(), i64::MAX.into()),
            NumericType::U8 => (0, u8::MAX.into()),
            NumericType::U16 => (0, u16::MAX.into()),
            NumericType::U32 => (0, u32::MAX.into()),
            NumericType::U64 => (0, u64::MAX.into()),
            NumericType::F32 | NumericType::F64 => return None,
        };
        Some(range)
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericType::I8 => "i8",
            NumericType::I16 => "i16",
            NumericType::I32 => "i32",
            NumericType::I64 => "i64",
            NumericType::U8 => "u8",
            NumericType::U16 => "u16",
            NumericType::U32 => "u32",
            NumericType::U64 => "u64",
            NumericType::F32 => "f32",
            NumericType::F64 => "f64",
        }
    }
}

impl FromStr for NumericType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "i8" | "sbyte" => Ok(NumericType::I8),
            "i16" | "short" => Ok(NumericType::I16),
            "i32" | "int" => Ok(NumericType::I32),
            "i64" | "long" => Ok(NumericType::I64),
            "u8" | "byte" => Ok(NumericType::U8),
            "u16" | "ushort" => Ok(NumericType::U16),
            "u32" | "uint" => Ok(NumericType::U32),
            "u64" | "ulong" => Ok(NumericType::U64),
            "f32" | "float" => Ok(NumericType::F32),
            "f64" | "double" | "decimal" => Ok(NumericType::F64),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVariant {
    pub name: String,
    pub code: i64,
}

/// A named enumeration whose variants compare by their numeric code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    name: String,
    variants: Vec<EnumVariant>,
}

impl EnumType {
    pub fn new<N, I>(name: impl Into<String>, variants: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, i64)>,
    {
        Self {
            name: name.into(),
            variants: variants
                .into_iter()
                .map(|(name, code)| EnumVariant {
                    name: name.into(),
                    code,
                })
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[EnumVariant] {
        &self.variants
    }

    pub fn code_of(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| v.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Bool,
    Guid,
    DateTime,
    Date,
    Numeric(NumericType),
    Enum(Arc<EnumType>),
    /// A property type no creator understands; filtering it always fails.
    Unsupported(String),
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::String => write!(f, "string"),
            ScalarType::Bool => write!(f, "bool"),
            ScalarType::Guid => write!(f, "guid"),
            ScalarType::DateTime => write!(f, "datetime"),
            ScalarType::Date => write!(f, "date"),
            ScalarType::Numeric(n) => write!(f, "{}", n.name()),
            ScalarType::Enum(e) => write!(f, "{}", e.name()),
            ScalarType::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

/// Declared type of a property: a scalar family plus nullability.
///
/// Strings are always nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyType {
    scalar: ScalarType,
    nullable: bool,
}

impl PropertyType {
    pub fn new(scalar: ScalarType) -> Self {
        let nullable = scalar == ScalarType::String;
        Self { scalar, nullable }
    }

    pub fn string() -> Self {
        Self::new(ScalarType::String)
    }

    pub fn boolean() -> Self {
        Self::new(ScalarType::Bool)
    }

    pub fn guid() -> Self {
        Self::new(ScalarType::Guid)
    }

    pub fn date_time() -> Self {
        Self::new(ScalarType::DateTime)
    }

    pub fn date() -> Self {
        Self::new(ScalarType::Date)
    }

    pub fn numeric(numeric: NumericType) -> Self {
        Self::new(ScalarType::Numeric(numeric))
    }

    pub fn enumeration(enum_type: Arc<EnumType>) -> Self {
        Self::new(ScalarType::Enum(enum_type))
    }

    pub fn unsupported(name: impl Into<String>) -> Self {
        Self::new(ScalarType::Unsupported(name.into()))
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn scalar(&self) -> &ScalarType {
        &self.scalar
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// `true` when a value of `self` can be stored in a property of `target`
    /// without conversion: same scalar, nullability kept or widened.
    pub fn is_assignable_to(&self, target: &PropertyType) -> bool {
        self.scalar == target.scalar && (!self.nullable || target.nullable)
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable && self.scalar != ScalarType::String {
            write!(f, "{}?", self.scalar)
        } else {
            write!(f, "{}", self.scalar)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDescriptor {
    name: String,
    property_type: PropertyType,
    visible: bool,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            name: name.into(),
            property_type,
            visible: true,
        }
    }

    /// Hidden properties exist on the type but cannot be filtered.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn property_type(&self) -> &PropertyType {
        &self.property_type
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct EntityType {
    name: String,
    base: Option<Arc<EntityType>>,
    prefix: Option<String>,
    properties: Vec<PropertyDescriptor>,
}

impl EntityType {
    pub fn builder(name: impl Into<String>) -> EntityTypeBuilder {
        EntityTypeBuilder {
            name: name.into(),
            base: None,
            prefix: None,
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Option<&Arc<EntityType>> {
        self.base.as_ref()
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Looks a property up on this type or any ancestor.
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties
            .iter()
            .find(|p| p.name == name)
            .or_else(|| self.base.as_ref().and_then(|b| b.property(name)))
    }

    /// All properties, ancestors first.
    pub fn properties(&self) -> Vec<&PropertyDescriptor> {
        let mut all = self
            .base
            .as_ref()
            .map(|b| b.properties())
            .unwrap_or_default();
        all.extend(self.properties.iter());
        all
    }

    pub fn filterable_properties(&self) -> Vec<&PropertyDescriptor> {
        self.properties()
            .into_iter()
            .filter(|p| p.is_visible())
            .collect()
    }

    /// Name used for the property when it is exposed as an external parameter.
    pub fn filter_parameter_name(&self, property: &str) -> String {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}.{property}"),
            _ => property.to_string(),
        }
    }

    /// Is-instance-of: `self` is `other` or derives from it.
    pub fn is_assignable_to(&self, other: &EntityType) -> bool {
        self.is_assignable_to_name(&other.name)
    }

    pub fn is_assignable_to_name(&self, name: &str) -> bool {
        self.name == name
            || self
                .base
                .as_ref()
                .is_some_and(|b| b.is_assignable_to_name(name))
    }

    pub fn is_strict_subtype_of(&self, other: &EntityType) -> bool {
        self.name != other.name && self.is_assignable_to(other)
    }
}

pub struct EntityTypeBuilder {
    name: String,
    base: Option<Arc<EntityType>>,
    prefix: Option<String>,
    properties: Vec<PropertyDescriptor>,
}

impl EntityTypeBuilder {
    pub fn base(mut self, base: Arc<EntityType>) -> Self {
        self.base = Some(base);
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, property_type: PropertyType) -> Self {
        self.properties
            .push(PropertyDescriptor::new(name, property_type));
        self
    }

    pub fn hidden_property(mut self, name: impl Into<String>, property_type: PropertyType) -> Self {
        self.properties
            .push(PropertyDescriptor::new(name, property_type).hidden());
        self
    }

    pub fn descriptor(mut self, descriptor: PropertyDescriptor) -> Self {
        self.properties.push(descriptor);
        self
    }

    pub fn build(self) -> Result<Arc<EntityType>, SchemaError> {
        for (i, p) in self.properties.iter().enumerate() {
            let repeated = self.properties[..i].iter().any(|q| q.name == p.name);
            let inherited = self
                .base
                .as_ref()
                .is_some_and(|b| b.property(&p.name).is_some());
            if repeated || inherited {
                return Err(SchemaError::DuplicateProperty {
                    entity: self.name,
                    property: p.name.clone(),
                });
            }
        }

        Ok(Arc::new(EntityType {
            name: self.name,
            base: self.base,
            prefix: self.prefix,
            properties: self.properties,
        }))
    }
}
