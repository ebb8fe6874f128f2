use super::{EntityType, EnumType, NumericType, PropertyDescriptor, PropertyType, SchemaError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    #[serde(default)]
    enums: BTreeMap<String, BTreeMap<String, i64>>,
    #[serde(default)]
    entities: Vec<EntityDocument>,
}

#[derive(Debug, Deserialize)]
struct EntityDocument {
    name: String,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    properties: Vec<PropertyDocument>,
}

#[derive(Debug, Deserialize)]
struct PropertyDocument {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default = "default_visible")]
    visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Registry of entity and enum types loaded from a descriptor file.
///
/// ```json5
/// {
///   enums: { Color: { Red: 1, Green: 2 } },
///   entities: [
///     { name: "Base", prefix: "base", properties: [
///         { name: "ValueA", type: "string" },
///         { name: "Count", type: "i16?" },
///     ] },
///     { name: "Derived", base: "Base", properties: [
///         { name: "Shade", type: "Color", visible: false },
///     ] },
///   ],
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entities: BTreeMap<String, Arc<EntityType>>,
    enums: BTreeMap<String, Arc<EnumType>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let path_display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| SchemaError::Read {
            path: path_display.clone(),
            source,
        })?;
        Self::parse(&raw, &path_display)
    }

    /// Parses descriptor text; `origin` only labels errors.
    pub fn parse(raw: &str, origin: &str) -> Result<Self, SchemaError> {
        let document =
            json5::from_str::<SchemaDocument>(raw).map_err(|source| SchemaError::Parse {
                path: origin.to_string(),
                source,
            })?;
        Self::from_document(document)
    }

    fn from_document(document: SchemaDocument) -> Result<Self, SchemaError> {
        let mut schema = Schema::new();

        for (name, variants) in document.enums {
            let mut variants: Vec<(String, i64)> = variants.into_iter().collect();
            variants.sort_by_key(|(_, code)| *code);
            schema
                .enums
                .insert(name.clone(), Arc::new(EnumType::new(name, variants)));
        }

        let mut seen = std::collections::BTreeSet::new();
        for entity in &document.entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(SchemaError::DuplicateEntity(entity.name.clone()));
            }
        }

        // Bases may be declared after the types deriving from them.
        let mut pending: Vec<EntityDocument> = document.entities;
        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            for entity in pending {
                let base = match &entity.base {
                    Some(base) => match schema.entities.get(base) {
                        Some(resolved) => Some(resolved.clone()),
                        None => {
                            deferred.push(entity);
                            continue;
                        }
                    },
                    None => None,
                };
                let built = schema.build_entity(&entity, base)?;
                schema.entities.insert(entity.name.clone(), built);
            }
            if deferred.len() == before {
                let entity = &deferred[0];
                return Err(SchemaError::UnknownBaseType {
                    entity: entity.name.clone(),
                    base: entity.base.clone().unwrap_or_default(),
                });
            }
            pending = deferred;
        }

        Ok(schema)
    }

    fn build_entity(
        &self,
        entity: &EntityDocument,
        base: Option<Arc<EntityType>>,
    ) -> Result<Arc<EntityType>, SchemaError> {
        let mut builder = EntityType::builder(entity.name.clone());
        if let Some(base) = base {
            builder = builder.base(base);
        }
        if let Some(prefix) = &entity.prefix {
            builder = builder.prefix(prefix.clone());
        }
        for property in &entity.properties {
            let property_type = self
                .parse_property_type(&property.type_name)
                .ok_or_else(|| SchemaError::UnknownType {
                    entity: entity.name.clone(),
                    property: property.name.clone(),
                    type_name: property.type_name.clone(),
                })?;
            let mut descriptor = PropertyDescriptor::new(property.name.clone(), property_type);
            if !property.visible {
                descriptor = descriptor.hidden();
            }
            builder = builder.descriptor(descriptor);
        }
        builder.build()
    }

    /// Resolves a descriptor type string such as `i16?`, `Color` or `opaque:Blob`.
    pub fn parse_property_type(&self, type_name: &str) -> Option<PropertyType> {
        let trimmed = type_name.trim();
        let (name, nullable) = match trimmed.strip_suffix('?') {
            Some(stripped) => (stripped.trim_end(), true),
            None => (trimmed, false),
        };

        let property_type = match name {
            "string" => PropertyType::string(),
            "bool" | "boolean" => PropertyType::boolean(),
            "guid" | "uuid" => PropertyType::guid(),
            "datetime" => PropertyType::date_time(),
            "date" => PropertyType::date(),
            other => {
                if let Some(opaque) = other.strip_prefix("opaque:") {
                    PropertyType::unsupported(opaque)
                } else if let Ok(numeric) = other.parse::<NumericType>() {
                    PropertyType::numeric(numeric)
                } else {
                    PropertyType::enumeration(self.enums.get(other)?.clone())
                }
            }
        };

        Some(if nullable {
            property_type.nullable()
        } else {
            property_type
        })
    }

    pub fn insert(&mut self, entity_type: Arc<EntityType>) {
        self.entities
            .insert(entity_type.name().to_string(), entity_type);
    }

    pub fn entity(&self, name: &str) -> Option<&Arc<EntityType>> {
        self.entities.get(name)
    }

    pub fn get(&self, name: &str) -> Result<Arc<EntityType>, SchemaError> {
        self.entity(name)
            .cloned()
            .ok_or_else(|| SchemaError::UnknownEntity(name.to_string()))
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &Arc<EntityType>> {
        self.entities.values()
    }

    pub fn enum_type(&self, name: &str) -> Option<&Arc<EnumType>> {
        self.enums.get(name)
    }
}
