//! Generator configuration, loaded from YAML.
//!
//! Every record rejects unknown keys, so a validated [`Config`] needs no
//! further presence checks.

use std::{io::ErrorKind, path::Path};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ConfigError, schema::NamedObjectSchema};

pub const DEFAULT_CONFIG_PATH: &str = "dynogen.yml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Mapper class name to its configuration, in declaration order.
    #[serde(default)]
    pub mappers: IndexMap<String, MapperConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MapperConfig {
    pub out_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
    pub table_name: String,
    pub hash_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_secondary_indexes: Vec<GlobalSecondaryIndex>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub local_secondary_indexes: Vec<LocalSecondaryIndex>,
    pub item: ItemConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemConfig {
    pub out_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwrite: Option<bool>,
    pub schema: NamedObjectSchema,
    /// Field name to module binding string.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub default_providers: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GlobalSecondaryIndex {
    pub name: String,
    pub hash_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_key: Option<String>,
    pub projection_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_key_attributes: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LocalSecondaryIndex {
    pub name: String,
    pub range_key: String,
    pub projection_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_key_attributes: Option<Vec<String>>,
}

impl Config {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(source)?;
        Self::from_yaml_value(value)
    }

    /// Validates an already-parsed YAML value.
    pub fn from_yaml_value(value: serde_yaml::Value) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_value(value)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| match source.kind() {
                ErrorKind::NotFound => ConfigError::NotFound {
                    path: path.to_path_buf(),
                },
                _ => ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                },
            })?;

        let config = Self::from_yaml_str(&source)?;
        debug!(
            path = %path.display(),
            mappers = config.mappers.len(),
            "loaded config"
        );
        Ok(config)
    }
}
