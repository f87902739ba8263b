pub mod binding;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod file;
pub mod generate;
pub mod item;
pub mod literal;
pub mod mapper;
pub mod paths;
pub mod schema;
pub mod telemetry;
pub mod template;

pub use binding::{BindingKind, ModuleBinding};
pub use compiler::{CompileOptions, TsCompiler, TypeCompiler};
pub use config::{
    Config, DEFAULT_CONFIG_PATH, GlobalSecondaryIndex, ItemConfig, LocalSecondaryIndex,
    MapperConfig,
};
pub use context::Context;
pub use error::*;
pub use file::{GENERATED_FILE_HEADER_COMMENT, GeneratedFile};
pub use generate::{GenerationReport, generate, generate_files};
pub use item::Item;
pub use literal::{Literal, RenderOptions};
pub use mapper::{AttributeType, Mapper, TableSchema};
pub use paths::resolve_path;
pub use schema::{NamedObjectSchema, PropertySchema, SchemaType, TypeName};
pub use telemetry::{TelemetryInitError, init_tracing};
