//! The generated record type of a table, plus its initialization variants.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    binding::ModuleBinding,
    compiler::TypeCompiler,
    config::ItemConfig,
    error::ItemError,
    file::GeneratedFile,
    schema::{NamedObjectSchema, SchemaType, properties_json, string_array},
};

#[derive(Debug, Clone)]
pub struct Item {
    schema: NamedObjectSchema,
    out_path: String,
    overwrite: bool,
    /// Fields whose values are supplied at initialization, in declaration order.
    default_providers: IndexMap<String, ModuleBinding>,
}

impl Item {
    pub fn new(config: &ItemConfig) -> Result<Self, ItemError> {
        let default_providers = config
            .default_providers
            .iter()
            .map(|(field, binding)| {
                ModuleBinding::parse(binding)
                    .map(|binding| (field.clone(), binding))
                    .map_err(|source| ItemError::Binding {
                        field: field.clone(),
                        source,
                    })
            })
            .collect::<Result<IndexMap<_, _>, _>>()?;

        Ok(Self {
            schema: config.schema.clone(),
            out_path: config.out_path.clone(),
            overwrite: config.overwrite.unwrap_or(true),
            default_providers,
        })
    }

    pub fn schema(&self) -> &NamedObjectSchema {
        &self.schema
    }

    pub fn out_path(&self) -> &str {
        &self.out_path
    }

    pub fn default_providers(&self) -> &IndexMap<String, ModuleBinding> {
        &self.default_providers
    }

    pub fn type_name(&self) -> &str {
        &self.schema.name
    }

    pub fn uninitialized_type_name(&self) -> String {
        format!("Uninitialized{}", self.type_name())
    }

    pub fn generated_partial_type_name(&self) -> String {
        format!("GeneratedPartial{}", self.type_name())
    }

    pub fn generated_keys(&self) -> Vec<&str> {
        self.default_providers.keys().map(String::as_str).collect()
    }

    fn is_generated(&self, field: &str) -> bool {
        self.default_providers.contains_key(field)
    }

    pub fn resolve_key_type(&self, field: &str) -> Result<&SchemaType, ItemError> {
        self.schema
            .property(field)
            .map(|property| &property.ty)
            .ok_or_else(|| ItemError::PropertyNotFound {
                property: field.to_string(),
                schema: self.type_name().to_string(),
            })
    }

    /// JSON form of the item schema.
    pub fn schema_value(&self) -> Map<String, Value> {
        self.schema.to_json()
    }

    /// Compiles the item, uninitialized and generated-partial declarations
    /// into one file.
    #[tracing::instrument(
        name = "dynogen.item.generate",
        level = "debug",
        skip(self, compiler),
        fields(item = %self.type_name(), out_path = %self.out_path)
    )]
    pub async fn generate(&self, compiler: &dyn TypeCompiler) -> Result<GeneratedFile, ItemError> {
        let (interface, uninitialized, generated_partial) = futures::try_join!(
            self.generate_interface(compiler),
            self.generate_uninitialized_interface(compiler),
            self.generate_generated_partial_interface(compiler),
        )?;

        let content = [interface, uninitialized, generated_partial]
            .iter()
            .map(|declaration| declaration.trim())
            .collect::<Vec<_>>()
            .join("\n\n");

        debug!(generated_keys = self.default_providers.len(), "item generated");
        Ok(GeneratedFile::new(&self.out_path, &content).with_overwrite(self.overwrite))
    }

    async fn generate_interface(&self, compiler: &dyn TypeCompiler) -> Result<String, ItemError> {
        let schema = Value::Object(self.schema_value());
        compile(compiler, &schema, self.type_name()).await
    }

    async fn generate_uninitialized_interface(
        &self,
        compiler: &dyn TypeCompiler,
    ) -> Result<String, ItemError> {
        let name = self.uninitialized_type_name();
        if self.default_providers.is_empty() {
            return Ok(format!("export type {name} = {};", self.type_name()));
        }

        let required: Vec<&str> = self
            .schema
            .required
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|key| !self.is_generated(key))
            .collect();

        let mut schema = self.schema_value();
        schema.insert("required".to_string(), string_array(&required));
        compile(compiler, &Value::Object(schema), &name).await
    }

    async fn generate_generated_partial_interface(
        &self,
        compiler: &dyn TypeCompiler,
    ) -> Result<String, ItemError> {
        let name = self.generated_partial_type_name();
        if self.default_providers.is_empty() {
            return Ok(format!("export type {name} = {{}};"));
        }

        let properties = self
            .schema
            .properties
            .iter()
            .filter(|(key, _)| self.is_generated(key));

        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::from("object"));
        schema.insert("required".to_string(), string_array(&self.generated_keys()));
        schema.insert("properties".to_string(), properties_json(properties));
        schema.insert("additionalItems".to_string(), Value::Bool(false));
        schema.insert("additionalProperties".to_string(), Value::Bool(false));
        compile(compiler, &Value::Object(schema), &name).await
    }
}

async fn compile(
    compiler: &dyn TypeCompiler,
    schema: &Value,
    type_name: &str,
) -> Result<String, ItemError> {
    compiler
        .compile(schema, type_name)
        .await
        .map_err(|source| ItemError::Compile {
            type_name: type_name.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::TsCompiler;
    use crate::schema::TypeName;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn item_config(default_providers: &[(&str, &str)]) -> ItemConfig {
        ItemConfig {
            out_path: "./User.ts".to_string(),
            overwrite: None,
            schema: serde_json::from_value(json!({
                "additionalProperties": false,
                "name": "User",
                "type": "object",
                "required": ["id", "login"],
                "properties": {
                    "id": { "type": "string" },
                    "name": { "type": "string" },
                    "login": { "type": "string" }
                }
            }))
            .unwrap(),
            default_providers: default_providers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn derives_type_names() {
        let item = Item::new(&item_config(&[])).unwrap();
        assert_eq!(item.type_name(), "User");
        assert_eq!(item.uninitialized_type_name(), "UninitializedUser");
        assert_eq!(item.generated_partial_type_name(), "GeneratedPartialUser");
        assert!(item.generated_keys().is_empty());
    }

    #[test]
    fn generated_keys_follow_declaration_order() {
        let item = Item::new(&item_config(&[
            ("login", "./utils#randomLoginGenerator"),
            ("id", "uuid=uuid/v4"),
        ]))
        .unwrap();
        assert_eq!(item.generated_keys(), ["login", "id"]);
    }

    #[test]
    fn resolves_key_type() {
        let item = Item::new(&item_config(&[])).unwrap();
        assert_eq!(
            item.resolve_key_type("id").unwrap(),
            &SchemaType::Single(TypeName::String)
        );

        let err = item.resolve_key_type("doesNotExist").unwrap_err();
        assert_eq!(
            err.to_string(),
            "property \"doesNotExist\" does not exist on schema \"User\""
        );
    }

    #[test]
    fn rejects_malformed_provider() {
        let err = Item::new(&item_config(&[("id", "invalid")])).unwrap_err();
        assert!(matches!(err, ItemError::Binding { ref field, .. } if field == "id"));
    }

    #[tokio::test]
    async fn compile_errors_name_the_failing_type() {
        let mut config = item_config(&[]);
        config
            .schema
            .properties
            .get_mut("name")
            .unwrap()
            .keywords
            .insert("items".to_string(), json!(7));
        config.schema.properties.get_mut("name").unwrap().ty =
            SchemaType::Single(TypeName::Array);

        let item = Item::new(&config).unwrap();
        let err = item.generate(&TsCompiler::default()).await.unwrap_err();
        assert!(matches!(err, ItemError::Compile { ref type_name, .. } if type_name == "User"));
    }
}
