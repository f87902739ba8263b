//! Default-provider bindings: which symbol to import, and from where.
//!
//! Two forms are recognized:
//!
//! - `identifier=modulePath` imports the module's default export as `identifier`
//! - `modulePath#identifier` imports the named export `identifier`

use std::{fmt, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::error::BindingSyntaxError;

static DEFAULT_IMPORT_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z$_][a-z0-9$_]*=[^=]+$").expect("valid regex"));

static SYMBOL_IMPORT_SYNTAX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[^#]+#[a-z$_][a-z0-9$_]*$").expect("valid regex"));

// Bare package names such as `uuid/v4` or `aws-sdk/clients/dynamodb`.
static PACKAGE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][a-z\-_]+(/.*)?$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `import binding = require('modulePath');`
    Default,
    /// `import { binding } from 'modulePath';`
    Symbol,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBinding {
    pub kind: BindingKind,
    pub module_path: String,
    pub binding: String,
    /// The module path points at the filesystem rather than a package.
    pub relative: bool,
}

/// Whether `path` is a relative or absolute filesystem path as opposed to a
/// package name.
pub fn is_relative_or_absolute_require(path: &str) -> bool {
    !PACKAGE_PATH.is_match(path)
}

impl ModuleBinding {
    /// The default form is tried first, so `a=b#c` imports the default
    /// export of `b#c`.
    pub fn parse(input: &str) -> Result<Self, BindingSyntaxError> {
        let parsed = if DEFAULT_IMPORT_SYNTAX.is_match(input) {
            input
                .split_once('=')
                .map(|(binding, module_path)| Self::new(BindingKind::Default, module_path, binding))
        } else if SYMBOL_IMPORT_SYNTAX.is_match(input) {
            input
                .split_once('#')
                .map(|(module_path, binding)| Self::new(BindingKind::Symbol, module_path, binding))
        } else {
            None
        };

        parsed.ok_or_else(|| BindingSyntaxError {
            input: input.to_string(),
        })
    }

    fn new(kind: BindingKind, module_path: &str, binding: &str) -> Self {
        Self {
            kind,
            module_path: module_path.to_string(),
            binding: binding.to_string(),
            relative: is_relative_or_absolute_require(module_path),
        }
    }
}

impl FromStr for ModuleBinding {
    type Err = BindingSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ModuleBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            BindingKind::Default => write!(f, "{}={}", self.binding, self.module_path),
            BindingKind::Symbol => write!(f, "{}#{}", self.module_path, self.binding),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("uuid/v4", false)]
    #[case("./relative/path/to/local/module.js", true)]
    #[case("/absolute/path/to/module.ts", true)]
    #[case("react", false)]
    #[case("fs", false)]
    #[case("os", false)]
    #[case("uuid", false)]
    #[case("uuid/", false)]
    #[case("aws-sdk/clients/dynamodb", false)]
    #[case("../sibling", true)]
    #[case("C:\\random\\windows\\module\\path", true)]
    fn classifies_module_paths(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_relative_or_absolute_require(path), expected);
    }

    #[test]
    fn parses_default_binding() {
        let binding = ModuleBinding::parse("uuid=uuid/v4").unwrap();
        assert_eq!(
            binding,
            ModuleBinding {
                kind: BindingKind::Default,
                module_path: "uuid/v4".to_string(),
                binding: "uuid".to_string(),
                relative: false,
            }
        );
    }

    #[test]
    fn parses_symbol_binding() {
        let binding: ModuleBinding = "aws-sdk/clients/dynamodb#DocumentClient".parse().unwrap();
        assert_eq!(
            binding,
            ModuleBinding {
                kind: BindingKind::Symbol,
                module_path: "aws-sdk/clients/dynamodb".to_string(),
                binding: "DocumentClient".to_string(),
                relative: false,
            }
        );
    }

    #[test]
    fn relative_symbol_binding() {
        let binding = ModuleBinding::parse("./utils#randomLoginGenerator").unwrap();
        assert_eq!(binding.kind, BindingKind::Symbol);
        assert_eq!(binding.module_path, "./utils");
        assert!(binding.relative);
    }

    #[test]
    fn default_form_wins_when_both_forms_match() {
        assert_eq!(
            ModuleBinding::parse("gen=./lib#thing").unwrap(),
            ModuleBinding {
                kind: BindingKind::Default,
                module_path: "./lib#thing".to_string(),
                binding: "gen".to_string(),
                relative: true,
            }
        );
    }

    #[rstest]
    #[case("fs#readFile", "fs")]
    #[case("os#hostname", "os")]
    #[case("vm#runInNewContext", "vm")]
    #[case("uuid=uuid", "uuid")]
    fn short_package_names_are_not_relative(#[case] input: &str, #[case] module_path: &str) {
        let binding = ModuleBinding::parse(input).unwrap();
        assert_eq!(binding.module_path, module_path);
        assert!(!binding.relative);
    }

    #[rstest]
    #[case("invalid")]
    #[case("")]
    #[case("1abc=module")]
    #[case("a=b=c")]
    #[case("module#not-an-identifier")]
    fn rejects_malformed_strings(#[case] input: &str) {
        let err = ModuleBinding::parse(input).unwrap_err();
        assert_eq!(err.input, input);
    }

    #[test]
    fn display_round_trips_source_syntax() {
        for input in ["uuid=uuid/v4", "./util#generateRandomName"] {
            assert_eq!(ModuleBinding::parse(input).unwrap().to_string(), input);
        }
    }
}
