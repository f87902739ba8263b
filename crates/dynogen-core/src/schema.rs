//! Typed view of the JSON Schema that describes an item.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON Schema primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeName {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
    Any,
}

impl TypeName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `type` keyword: a single type name or a union of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(TypeName),
    Union(Vec<TypeName>),
}

impl SchemaType {
    pub fn to_json(&self) -> Value {
        match self {
            Self::Single(name) => Value::from(name.as_str()),
            Self::Union(names) => names.iter().map(|name| Value::from(name.as_str())).collect(),
        }
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(name) => write!(f, "{name}"),
            Self::Union(names) => {
                let names: Vec<&str> = names.iter().map(|name| name.as_str()).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

/// Schema of a single item property.
///
/// Keywords other than `type` are kept verbatim, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub ty: SchemaType,
    #[serde(flatten)]
    pub keywords: Map<String, Value>,
}

impl PropertySchema {
    pub fn new(ty: SchemaType) -> Self {
        Self {
            ty,
            keywords: Map::new(),
        }
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), self.ty.to_json());
        for (key, value) in &self.keywords {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectTag {
    Object,
}

/// An object schema with a mandatory `name`, used as the item type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NamedObjectSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ObjectTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default)]
    pub properties: IndexMap<String, PropertySchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,
}

impl NamedObjectSchema {
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    /// JSON form of the schema, with keys in declaration order.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut object = Map::new();
        object.insert("name".to_string(), Value::from(self.name.as_str()));
        object.insert("type".to_string(), Value::from("object"));
        if let Some(required) = &self.required {
            object.insert("required".to_string(), string_array(required));
        }
        object.insert(
            "properties".to_string(),
            properties_json(self.properties.iter()),
        );
        if let Some(additional) = self.additional_properties {
            object.insert("additionalProperties".to_string(), Value::Bool(additional));
        }
        object
    }
}

pub(crate) fn string_array<S: AsRef<str>>(items: &[S]) -> Value {
    items.iter().map(|s| Value::from(s.as_ref())).collect()
}

pub(crate) fn properties_json<'a>(
    properties: impl Iterator<Item = (&'a String, &'a PropertySchema)>,
) -> Value {
    Value::Object(
        properties
            .map(|(name, schema)| (name.clone(), schema.to_json()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn deserializes_single_and_union_types() {
        let single: PropertySchema =
            serde_json::from_value(json!({ "type": "string", "format": "uuid" })).unwrap();
        assert_eq!(single.ty, SchemaType::Single(TypeName::String));
        assert_eq!(single.keywords.get("format"), Some(&json!("uuid")));

        let union: PropertySchema =
            serde_json::from_value(json!({ "type": ["string", "number"] })).unwrap();
        assert_eq!(
            union.ty,
            SchemaType::Union(vec![TypeName::String, TypeName::Number])
        );
    }

    #[test]
    fn rejects_unknown_type_names() {
        let result = serde_json::from_value::<PropertySchema>(json!({ "type": "date" }));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_non_object_root() {
        let result = serde_json::from_value::<NamedObjectSchema>(json!({
            "name": "User",
            "type": "string",
            "properties": {}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn json_form_keeps_property_order() {
        let schema: NamedObjectSchema = serde_json::from_value(json!({
            "name": "User",
            "type": "object",
            "required": ["login"],
            "properties": {
                "login": { "type": "string" },
                "age": { "type": "integer", "minimum": 0 },
            },
            "additionalProperties": false
        }))
        .unwrap();

        assert_eq!(
            Value::Object(schema.to_json()),
            json!({
                "name": "User",
                "type": "object",
                "required": ["login"],
                "properties": {
                    "login": { "type": "string" },
                    "age": { "type": "integer", "minimum": 0 },
                },
                "additionalProperties": false
            })
        );
        let keys: Vec<&String> = schema.properties.keys().collect();
        assert_eq!(keys, ["login", "age"]);
    }
}
