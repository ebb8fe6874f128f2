//! Read-only views of entity instances.

use crate::schema::{EntityType, NumericType, PropertyType, ScalarType, Schema, SchemaError};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// JSON field naming the runtime type of a record.
pub const TYPE_FIELD: &str = "$type";

/// An instance a compiled filter can be evaluated against.
pub trait Entity {
    fn entity_type(&self) -> &EntityType;

    /// Value of a property; `Value::Null` when unset or unknown.
    fn property_value(&self, name: &str) -> Value;
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Expected a JSON object, got: {0}")]
    NotAnObject(String),
    #[error(transparent)]
    UnknownType(#[from] SchemaError),
    #[error("Invalid value for '{entity}.{property}' ({property_type}): {value}")]
    InvalidValue {
        entity: String,
        property: String,
        property_type: String,
        value: String,
    },
}

/// Generic entity instance: a type and a property-name → value map.
#[derive(Debug, Clone)]
pub struct Record {
    entity_type: Arc<EntityType>,
    values: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(entity_type: Arc<EntityType>) -> Self {
        Self {
            entity_type,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, property: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(property.into(), value.into());
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Converts a JSON object using the declared property types. The object's
    /// `$type` field selects the runtime type, falling back to `default_type`.
    pub fn from_json(
        schema: &Schema,
        default_type: &Arc<EntityType>,
        json: &JsonValue,
    ) -> Result<Self, RecordError> {
        let object = json
            .as_object()
            .ok_or_else(|| RecordError::NotAnObject(json.to_string()))?;

        let entity_type = match object.get(TYPE_FIELD).and_then(JsonValue::as_str) {
            Some(name) => schema.get(name)?,
            None => default_type.clone(),
        };

        let mut record = Record::new(entity_type.clone());
        for property in entity_type.properties() {
            let Some(raw) = object.get(property.name()) else {
                continue;
            };
            let value = json_to_value(property.property_type(), raw).ok_or_else(|| {
                RecordError::InvalidValue {
                    entity: entity_type.name().to_string(),
                    property: property.name().to_string(),
                    property_type: property.property_type().to_string(),
                    value: raw.to_string(),
                }
            })?;
            record.set(property.name(), value);
        }
        Ok(record)
    }

    /// JSON object form, including `$type`.
    pub fn to_json(&self) -> JsonValue {
        let mut object = serde_json::Map::new();
        object.insert(
            TYPE_FIELD.to_string(),
            JsonValue::String(self.entity_type.name().to_string()),
        );
        for property in self.entity_type.properties() {
            let value = self.property_value(property.name());
            object.insert(
                property.name().to_string(),
                value_to_json(property.property_type(), &value),
            );
        }
        JsonValue::Object(object)
    }
}

impl Entity for Record {
    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    fn property_value(&self, name: &str) -> Value {
        self.values.get(name).cloned().unwrap_or(Value::Null)
    }
}

fn json_to_value(property_type: &PropertyType, raw: &JsonValue) -> Option<Value> {
    if raw.is_null() {
        return Some(Value::Null);
    }

    match property_type.scalar() {
        ScalarType::String => raw.as_str().map(Value::from),
        ScalarType::Bool => raw.as_bool().map(Value::Bool),
        ScalarType::Guid => raw
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(Value::Guid),
        ScalarType::DateTime => raw.as_str().and_then(parse_date_time).map(Value::DateTime),
        ScalarType::Date => raw
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, crate::value::DATE_FORMAT).ok())
            .map(Value::Date),
        ScalarType::Numeric(numeric) => json_to_number(*numeric, raw),
        ScalarType::Enum(enum_type) => match raw {
            JsonValue::String(name) => enum_type.code_of(name).map(Value::Int),
            JsonValue::Number(n) => n.as_i64().map(Value::Int),
            _ => None,
        },
        ScalarType::Unsupported(_) => Some(Value::String(raw.to_string())),
    }
}

fn json_to_number(numeric: NumericType, raw: &JsonValue) -> Option<Value> {
    if numeric.is_float() {
        return raw.as_f64().map(Value::Float);
    }
    let (min, max) = numeric.integer_range()?;
    let n = match raw.as_i64() {
        Some(n) => i128::from(n),
        None => i128::from(raw.as_u64()?),
    };
    if n < min || n > max {
        return None;
    }
    if numeric.is_signed() {
        i64::try_from(n).ok().map(Value::Int)
    } else {
        u64::try_from(n).ok().map(Value::UInt)
    }
}

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(text, crate::value::DATE_TIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, crate::value::DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn value_to_json(property_type: &PropertyType, value: &Value) -> JsonValue {
    match (property_type.scalar(), value) {
        (_, Value::Null) => JsonValue::Null,
        (_, Value::Bool(b)) => JsonValue::Bool(*b),
        (ScalarType::Enum(enum_type), Value::Int(code)) => enum_type
            .variants()
            .iter()
            .find(|v| v.code == *code)
            .map(|v| JsonValue::String(v.name.clone()))
            .unwrap_or_else(|| JsonValue::from(*code)),
        (_, Value::Int(n)) => JsonValue::from(*n),
        (_, Value::UInt(n)) => JsonValue::from(*n),
        (_, Value::Float(n)) => JsonValue::from(*n),
        (_, other) => JsonValue::String(other.to_string()),
    }
}
