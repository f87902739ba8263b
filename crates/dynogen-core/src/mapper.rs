//! Data-mapper class generation for one DynamoDB table.
//!
//! A [`Mapper`] owns the [`Item`] stored in its table. Generating it yields
//! the item file followed by the mapper file, which embeds the table schema,
//! the item validators and typed `put`/`get`/`delete`/`query`/`update`
//! methods.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    binding::BindingKind,
    compiler::TypeCompiler,
    config::{GlobalSecondaryIndex, LocalSecondaryIndex, MapperConfig},
    context::Context,
    error::{ItemError, MapperError},
    file::GeneratedFile,
    item::Item,
    literal::{Literal, RenderOptions, indent_prefix, property_key, quote, render},
    paths::resolve_path,
    schema::{SchemaType, TypeName, properties_json},
    template::{ItemTypeNames, MapperRenderProps, render_mapper},
};

/// Scalar attribute types DynamoDB accepts for key attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeType {
    S,
    N,
}

impl AttributeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::N => "N",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub hash_key: String,
    pub range_key: Option<String>,
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
}

#[derive(Debug, Clone)]
pub struct Mapper {
    name: String,
    item: Item,
    table_name: String,
    table_schema: TableSchema,
    out_path: String,
    overwrite: bool,
}

impl Mapper {
    pub fn new(name: impl Into<String>, config: &MapperConfig) -> Result<Self, MapperError> {
        Ok(Self {
            name: name.into(),
            item: Item::new(&config.item)?,
            table_name: config.table_name.clone(),
            table_schema: TableSchema {
                hash_key: config.hash_key.clone(),
                range_key: config.range_key.clone(),
                global_secondary_indexes: config.global_secondary_indexes.clone(),
                local_secondary_indexes: config.local_secondary_indexes.clone(),
            },
            out_path: config.out_path.clone(),
            overwrite: config.overwrite.unwrap_or(true),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn table_schema(&self) -> &TableSchema {
        &self.table_schema
    }

    pub fn out_path(&self) -> &str {
        &self.out_path
    }

    pub fn key_type_name(&self) -> String {
        format!("{}Key", self.item.type_name())
    }

    pub fn resolve_index_key_type(&self, field: &str) -> Result<AttributeType, MapperError> {
        match self.item.resolve_key_type(field)? {
            SchemaType::Union(_) => Err(MapperError::UnsupportedKeyType {
                property: field.to_string(),
            }),
            SchemaType::Single(TypeName::String) => Ok(AttributeType::S),
            SchemaType::Single(TypeName::Number | TypeName::Integer) => Ok(AttributeType::N),
            ty @ SchemaType::Single(_) => Err(MapperError::UnmappedKeyType {
                property: field.to_string(),
                ty: ty.clone(),
            }),
        }
    }

    /// Every key attribute of the table and its indexes: GSI keys, then LSI
    /// range keys, then the table keys. May contain duplicates.
    pub fn index_keys(&self) -> Vec<&str> {
        let schema = &self.table_schema;
        let mut keys = Vec::new();
        for index in &schema.global_secondary_indexes {
            keys.push(index.hash_key.as_str());
            keys.extend(index.range_key.as_deref());
        }
        for index in &schema.local_secondary_indexes {
            keys.push(index.range_key.as_str());
        }
        keys.push(schema.hash_key.as_str());
        keys.extend(schema.range_key.as_deref());
        keys
    }

    /// The `CreateTable`-shaped description embedded as `tableSchema`.
    pub fn render_table_schema(&self) -> Result<String, MapperError> {
        let schema = &self.table_schema;

        // Table keys first, then index keys, each attribute once.
        let keys = std::iter::once(schema.hash_key.as_str())
            .chain(schema.range_key.as_deref())
            .chain(schema.global_secondary_indexes.iter().flat_map(|index| {
                std::iter::once(index.hash_key.as_str()).chain(index.range_key.as_deref())
            }))
            .chain(
                schema
                    .local_secondary_indexes
                    .iter()
                    .map(|index| index.range_key.as_str()),
            );

        let mut attribute_definitions: IndexMap<&str, AttributeType> = IndexMap::new();
        for key in keys {
            if !attribute_definitions.contains_key(key) {
                attribute_definitions.insert(key, self.resolve_index_key_type(key)?);
            }
        }

        let mut table = IndexMap::new();
        table.insert("TableName".to_string(), Literal::text(&self.table_name));
        table.insert(
            "KeySchema".to_string(),
            key_schema(&schema.hash_key, schema.range_key.as_deref()),
        );
        table.insert(
            "AttributeDefinitions".to_string(),
            Literal::Sequence(
                attribute_definitions
                    .iter()
                    .map(|(name, ty)| {
                        Literal::mapping([
                            ("AttributeName", Literal::text(*name)),
                            ("AttributeType", Literal::text(ty.as_str())),
                        ])
                    })
                    .collect(),
            ),
        );

        if !schema.global_secondary_indexes.is_empty() {
            let indexes = schema
                .global_secondary_indexes
                .iter()
                .map(|index| {
                    secondary_index(
                        &index.name,
                        key_schema(&index.hash_key, index.range_key.as_deref()),
                        &index.projection_type,
                        index.non_key_attributes.as_deref(),
                    )
                })
                .collect();
            table.insert("GlobalSecondaryIndexes".to_string(), Literal::Sequence(indexes));
        }

        if !schema.local_secondary_indexes.is_empty() {
            let indexes = schema
                .local_secondary_indexes
                .iter()
                .map(|index| {
                    secondary_index(
                        &index.name,
                        key_schema(&schema.hash_key, Some(index.range_key.as_str())),
                        &index.projection_type,
                        index.non_key_attributes.as_deref(),
                    )
                })
                .collect();
            table.insert("LocalSecondaryIndexes".to_string(), Literal::Sequence(indexes));
        }

        Ok(render(&Literal::Mapping(table), RenderOptions::nested(1)))
    }

    pub fn render_index_name_type(&self) -> String {
        let schema = &self.table_schema;
        let names: Vec<String> = schema
            .global_secondary_indexes
            .iter()
            .map(|index| quote(&index.name))
            .chain(
                schema
                    .local_secondary_indexes
                    .iter()
                    .map(|index| quote(&index.name)),
            )
            .collect();

        if names.is_empty() {
            "export type IndexName = never;".to_string()
        } else {
            format!("export type IndexName = {};", names.join(" | "))
        }
    }

    /// Interface of the primary and index key attributes, all optional.
    pub async fn render_key_type(&self, compiler: &dyn TypeCompiler) -> Result<String, MapperError> {
        let index_keys = self.index_keys();
        let properties = self
            .item
            .schema()
            .properties
            .iter()
            .filter(|(name, _)| index_keys.contains(&name.as_str()));

        let mut schema = self.item.schema_value();
        schema.insert("required".to_string(), Value::Array(Vec::new()));
        schema.insert("properties".to_string(), properties_json(properties));

        let name = self.key_type_name();
        let declaration = compiler
            .compile(&Value::Object(schema), &name)
            .await
            .map_err(|source| ItemError::Compile {
                type_name: name.clone(),
                source,
            })?;
        Ok(declaration.trim().to_string())
    }

    pub fn render_default_provider_imports(&self) -> String {
        self.item
            .default_providers()
            .values()
            .map(|provider| {
                let module_path = if provider.relative {
                    resolve_path(&self.out_path, &provider.module_path)
                } else {
                    provider.module_path.clone()
                };
                match provider.kind {
                    BindingKind::Default => {
                        format!("import {} = require('{module_path}');", provider.binding)
                    }
                    BindingKind::Symbol => {
                        format!("import {{ {} }} from '{module_path}';", provider.binding)
                    }
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Object entries filling generated fields inside `initialize`.
    pub fn render_generated_partial_mappings(&self) -> String {
        let indent = indent_prefix(3);
        self.item
            .default_providers()
            .iter()
            .map(|(field, provider)| {
                format!("{indent}{}: {}(),", property_key(field), provider.binding)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render_item_schema(&self) -> String {
        render_schema(self.item.schema_value())
    }

    /// Item schema with nothing required, used to validate update patches.
    pub fn render_partial_item_schema(&self) -> String {
        let mut schema = self.item.schema_value();
        schema.insert("required".to_string(), Value::Array(Vec::new()));
        render_schema(schema)
    }

    pub fn item_resolve_path(&self) -> String {
        resolve_path(&self.out_path, self.item.out_path())
    }

    /// Generates the item file and the mapper file, in that order.
    #[tracing::instrument(
        name = "dynogen.mapper.generate",
        level = "debug",
        skip(self, compiler),
        fields(mapper = %self.name, out_path = %self.out_path)
    )]
    pub async fn generate(
        &self,
        compiler: &dyn TypeCompiler,
    ) -> Result<Vec<GeneratedFile>, MapperError> {
        let table_schema = self.render_table_schema()?;

        let (item_file, key_type_declaration) = futures::try_join!(
            async { Ok::<_, MapperError>(self.item.generate(compiler).await?) },
            self.render_key_type(compiler),
        )?;

        let props = MapperRenderProps {
            name: self.name.clone(),
            item: ItemTypeNames {
                type_name: self.item.type_name().to_string(),
                uninitialized_type_name: self.item.uninitialized_type_name(),
                generated_partial_type_name: self.item.generated_partial_type_name(),
            },
            item_resolve_path: self.item_resolve_path(),
            default_provider_imports: self.render_default_provider_imports(),
            key_type_name: self.key_type_name(),
            key_type_declaration,
            index_name_declaration: self.render_index_name_type(),
            table_schema,
            item_schema: self.render_item_schema(),
            partial_item_schema: self.render_partial_item_schema(),
            generated_partial_mappings: self.render_generated_partial_mappings(),
        };
        let content = render_mapper(&props)?;
        debug!(bytes = content.len(), "mapper rendered");

        let mapper_file = GeneratedFile::new(&self.out_path, &content).with_overwrite(self.overwrite);
        Ok(vec![item_file, mapper_file])
    }

    /// Stages both files, or neither if generation fails.
    pub async fn stage(
        &self,
        compiler: &dyn TypeCompiler,
        context: &Context,
    ) -> Result<(), MapperError> {
        let files = self.generate(compiler).await?;
        context.stage_all(files);
        Ok(())
    }
}

fn key_schema(hash_key: &str, range_key: Option<&str>) -> Literal {
    let mut keys = vec![Literal::mapping([
        ("AttributeName", Literal::text(hash_key)),
        ("KeyType", Literal::text("HASH")),
    ])];
    if let Some(range_key) = range_key {
        keys.push(Literal::mapping([
            ("AttributeName", Literal::text(range_key)),
            ("KeyType", Literal::text("RANGE")),
        ]));
    }
    Literal::Sequence(keys)
}

fn secondary_index(
    name: &str,
    key_schema: Literal,
    projection_type: &str,
    non_key_attributes: Option<&[String]>,
) -> Literal {
    let mut projection = IndexMap::new();
    projection.insert(
        "ProjectionType".to_string(),
        Literal::text(projection_type.to_uppercase()),
    );
    if let Some(attributes) = non_key_attributes {
        projection.insert(
            "NonKeyAttributes".to_string(),
            Literal::Sequence(attributes.iter().map(|a| Literal::text(a.as_str())).collect()),
        );
    }

    Literal::mapping([
        ("IndexName", Literal::text(name)),
        ("KeySchema", key_schema),
        ("Projection", Literal::Mapping(projection)),
    ])
}

fn render_schema(schema: Map<String, Value>) -> String {
    render(&Literal::from(Value::Object(schema)), RenderOptions::nested(1))
}
