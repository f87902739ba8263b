//! Jinja environment used to stitch generated fragments into source files.

use std::sync::LazyLock;

use minijinja::{Environment, UndefinedBehavior, Value};
use serde::Serialize;

pub const MAPPER_TEMPLATE_NAME: &str = "mapper.ts";
const MAPPER_TEMPLATE: &str = include_str!("../templates/mapper.ts.jinja");

static ENVIRONMENT: LazyLock<Environment<'static>> = LazyLock::new(build_environment);

fn build_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_debug(true);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    // `.ts` is not an auto-escaped extension; generated source must be emitted verbatim.
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    env.add_template(MAPPER_TEMPLATE_NAME, MAPPER_TEMPLATE)
        .expect("mapper template is valid");
    env
}

/// Names of the item types the mapper imports.
#[derive(Debug, Clone, Serialize)]
pub struct ItemTypeNames {
    pub type_name: String,
    pub uninitialized_type_name: String,
    pub generated_partial_type_name: String,
}

/// Pre-rendered fragments substituted into the mapper template.
#[derive(Debug, Clone, Serialize)]
pub struct MapperRenderProps {
    pub name: String,
    pub item: ItemTypeNames,
    pub item_resolve_path: String,
    pub default_provider_imports: String,
    pub key_type_name: String,
    pub key_type_declaration: String,
    pub index_name_declaration: String,
    pub table_schema: String,
    pub item_schema: String,
    pub partial_item_schema: String,
    pub generated_partial_mappings: String,
}

pub fn render_mapper(props: &MapperRenderProps) -> Result<String, minijinja::Error> {
    ENVIRONMENT
        .get_template(MAPPER_TEMPLATE_NAME)?
        .render(Value::from_serialize(props))
}
