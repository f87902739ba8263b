//! Runs every configured mapper and writes the staged files.

use std::path::PathBuf;

use futures::future::{join_all, try_join_all};
use tracing::{info, warn};

use crate::{
    compiler::{TsCompiler, TypeCompiler},
    config::Config,
    context::Context,
    error::GenerateError,
    file::GeneratedFile,
    mapper::Mapper,
};

/// Outcome of writing a generation run to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub written: Vec<PathBuf>,
    /// Existing files left alone because their output disallows overwriting.
    pub skipped: Vec<PathBuf>,
}

enum WriteOutcome {
    Written(PathBuf),
    Skipped(PathBuf),
}

/// Generates every mapper in `config` and returns the staged files.
///
/// Mappers run concurrently. When several fail, the error of the first one in
/// declaration order is returned.
pub async fn generate_files(
    config: &Config,
    compiler: &dyn TypeCompiler,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let mappers = config
        .mappers
        .iter()
        .map(|(name, mapper_config)| {
            Mapper::new(name, mapper_config).map_err(|source| GenerateError::Mapper {
                mapper: name.clone(),
                source,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let context = Context::new();
    let results = join_all(
        mappers
            .iter()
            .map(|mapper| mapper.stage(compiler, &context)),
    )
    .await;

    for (mapper, result) in mappers.iter().zip(results) {
        result.map_err(|source| GenerateError::Mapper {
            mapper: mapper.name().to_string(),
            source,
        })?;
    }

    Ok(context.into_files())
}

/// Generates every mapper in `config` and writes the files to disk.
#[tracing::instrument(
    name = "dynogen.generate",
    skip(config),
    fields(mappers = config.mappers.len())
)]
pub async fn generate(config: &Config) -> Result<GenerationReport, GenerateError> {
    let files = generate_files(config, &TsCompiler::default()).await?;
    let outcomes = try_join_all(files.iter().map(write_file)).await?;

    let mut report = GenerationReport::default();
    for outcome in outcomes {
        match outcome {
            WriteOutcome::Written(path) => report.written.push(path),
            WriteOutcome::Skipped(path) => report.skipped.push(path),
        }
    }

    info!(
        written = report.written.len(),
        skipped = report.skipped.len(),
        "generation finished"
    );
    Ok(report)
}

async fn write_file(file: &GeneratedFile) -> Result<WriteOutcome, GenerateError> {
    let path = file.path().to_path_buf();

    let write_error = |source: std::io::Error| GenerateError::Write {
        path: path.clone(),
        source,
    };

    if !file.overwrite() && tokio::fs::try_exists(&path).await.map_err(write_error)? {
        warn!(path = %path.display(), "file exists and overwrite is disabled, skipping");
        return Ok(WriteOutcome::Skipped(path));
    }

    tokio::fs::write(&path, file.content())
        .await
        .map_err(write_error)?;

    info!(path = %path.display(), "wrote file");
    Ok(WriteOutcome::Written(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapperError;
    use pretty_assertions::assert_eq;

    fn mapper_yaml(name: &str, hash_key_type: &str) -> String {
        format!(
            r#"
  {name}:
    outPath: ./{name}.ts
    tableName: {name}Table
    hashKey: id
    item:
      outPath: ./{name}Item.ts
      schema:
        name: {name}Item
        type: object
        properties:
          id:
            type: {hash_key_type}
"#
        )
    }

    #[tokio::test]
    async fn empty_config_generates_nothing() {
        let files = generate_files(&Config::default(), &TsCompiler::default())
            .await
            .unwrap();
        assert!(files.is_empty());

        let report = generate(&Config::default()).await.unwrap();
        assert_eq!(report, GenerationReport::default());
    }

    #[tokio::test]
    async fn stages_item_before_mapper_for_every_mapper() {
        let source = format!(
            "mappers:{}{}",
            mapper_yaml("UserMapper", "string"),
            mapper_yaml("PostMapper", "number")
        );
        let config = Config::from_yaml_str(&source).unwrap();

        let files = generate_files(&config, &TsCompiler::default()).await.unwrap();
        let paths: Vec<String> = files.iter().map(|f| f.path().display().to_string()).collect();
        assert_eq!(paths.len(), 4);

        for name in ["UserMapper", "PostMapper"] {
            let item = paths.iter().position(|p| *p == format!("./{name}Item.ts")).unwrap();
            let mapper = paths.iter().position(|p| *p == format!("./{name}.ts")).unwrap();
            assert_eq!(mapper, item + 1);
        }
    }

    #[tokio::test]
    async fn reports_first_failing_mapper_in_declaration_order() {
        let source = format!(
            "mappers:{}{}{}",
            mapper_yaml("GoodMapper", "string"),
            mapper_yaml("BoolMapper", "boolean"),
            mapper_yaml("UnionMapper", "[string, number]")
        );
        let config = Config::from_yaml_str(&source).unwrap();

        let err = generate_files(&config, &TsCompiler::default())
            .await
            .unwrap_err();
        match err {
            GenerateError::Mapper { mapper, source } => {
                assert_eq!(mapper, "BoolMapper");
                assert!(matches!(source, MapperError::UnmappedKeyType { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn invalid_provider_fails_before_generation() {
        let source = format!(
            "mappers:{}      defaultProviders:\n        id: not-a-binding\n",
            mapper_yaml("UserMapper", "string")
        );
        let config = Config::from_yaml_str(&source).unwrap();

        let err = generate_files(&config, &TsCompiler::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to generate mapper `UserMapper`");
    }
}
