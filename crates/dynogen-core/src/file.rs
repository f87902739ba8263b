use std::path::{Path, PathBuf};

/// Header prepended to every generated file.
pub const GENERATED_FILE_HEADER_COMMENT: &str = "/* tslint:disable */

/**
 * This file was generated with Dynogen.
 * DO NOT EDIT!
 */";

/// A generated source file staged for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    path: PathBuf,
    content: String,
    overwrite: bool,
}

impl GeneratedFile {
    /// Wraps `body` with the generated-file header.
    pub fn new(path: impl Into<PathBuf>, body: &str) -> Self {
        Self {
            path: path.into(),
            content: format!("{GENERATED_FILE_HEADER_COMMENT}\n{body}"),
            overwrite: true,
        }
    }

    /// Whether an existing file at `path` may be replaced.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Content without the header.
    pub fn body(&self) -> &str {
        self.content
            .strip_prefix(GENERATED_FILE_HEADER_COMMENT)
            .and_then(|rest| rest.strip_prefix('\n'))
            .unwrap_or(&self.content)
    }
}
