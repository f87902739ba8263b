use std::path::PathBuf;

use crate::schema::SchemaType;

/// A default-provider string matched neither `identifier=modulePath` nor
/// `modulePath#identifier`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid module binding string syntax: `{input}`")]
pub struct BindingSyntaxError {
    pub input: String,
}

/// The schema handed to the type compiler is malformed.
///
/// `pointer` is a JSON pointer to the offending keyword inside the schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed schema at `{pointer}`: {reason}")]
pub struct CompileError {
    pub pointer: String,
    pub reason: String,
}

impl CompileError {
    pub(crate) fn new(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file \"{}\" does not exist", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file \"{}\"", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Validation(#[from] serde_yaml::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("property \"{property}\" does not exist on schema \"{schema}\"")]
    PropertyNotFound { property: String, schema: String },

    #[error("default provider for `{field}` is invalid")]
    Binding {
        field: String,
        #[source]
        source: BindingSyntaxError,
    },

    #[error("failed to compile type `{type_name}`")]
    Compile {
        type_name: String,
        #[source]
        source: CompileError,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    #[error(transparent)]
    Item(#[from] ItemError),

    #[error("union types are not currently supported as index keys (property \"{property}\")")]
    UnsupportedKeyType { property: String },

    #[error("property \"{property}\" of type `{ty}` cannot be used as an index key")]
    UnmappedKeyType { property: String, ty: SchemaType },

    #[error("failed to render mapper template")]
    Template(#[from] minijinja::Error),
}

/// Failure of a whole generation run, annotated with the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("failed to generate mapper `{mapper}`")]
    Mapper {
        mapper: String,
        #[source]
        source: MapperError,
    },

    #[error("failed to write \"{}\"", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
