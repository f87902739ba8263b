//! Renders JSON-like values as TypeScript expression source.
//!
//! Used to embed table schemas and item schemas as object literals inside the
//! generated mapper class body.

use indexmap::IndexMap;
use serde_json::{Number, Value};

const INDENT: &str = "  ";

/// A value that can be printed as a TypeScript literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// The bare `undefined` token. TypeScript has no JSON equivalent for it.
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    Sequence(Vec<Literal>),
    /// Object literal; entries render in insertion order.
    Mapping(IndexMap<String, Literal>),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Indent level of the rendered node itself.
    pub indent_level_offset: usize,
    /// Skip the leading indent of the outermost node.
    pub no_prefix_indent: bool,
}

impl RenderOptions {
    pub fn nested(indent_level_offset: usize) -> Self {
        Self {
            indent_level_offset,
            no_prefix_indent: true,
        }
    }
}

/// Indent prefix for a given level.
pub fn indent_prefix(level: usize) -> String {
    INDENT.repeat(level)
}

impl Literal {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn mapping<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Literal)>,
    {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn render(&self) -> String {
        render(self, RenderOptions::default())
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(values: Vec<T>) -> Self {
        Self::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl From<&Value> for Literal {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.clone()),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::Sequence(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Mapping(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Literal {
    fn from(value: Value) -> Self {
        Self::from(&value)
    }
}

/// Render `node` as indented TypeScript source.
pub fn render(node: &Literal, options: RenderOptions) -> String {
    let indent = indent_prefix(options.indent_level_offset);
    let prefix = if options.no_prefix_indent { "" } else { indent.as_str() };

    match node {
        Literal::Undefined => format!("{prefix}undefined"),
        Literal::Null => format!("{prefix}null"),
        Literal::Bool(b) => format!("{prefix}{b}"),
        Literal::Number(n) => format!("{prefix}{n}"),
        Literal::Text(s) => format!("{prefix}{}", quote(s)),
        Literal::Sequence(items) => {
            let inner = options.indent_level_offset + 1;
            let rendered = items
                .iter()
                .map(|item| {
                    render(
                        item,
                        RenderOptions {
                            indent_level_offset: inner,
                            no_prefix_indent: false,
                        },
                    )
                })
                .collect::<Vec<_>>()
                .join(",\n");
            format!("{prefix}[\n{rendered}\n{indent}]")
        }
        Literal::Mapping(entries) => {
            let inner = options.indent_level_offset + 1;
            let inner_indent = indent_prefix(inner);
            let rendered = entries
                .iter()
                .map(|(key, value)| {
                    let value = render(value, RenderOptions::nested(inner));
                    format!("{inner_indent}{}: {value}", property_key(key))
                })
                .collect::<Vec<_>>()
                .join(",\n");
            format!("{prefix}{{\n{rendered}\n{indent}}}")
        }
    }
}

/// JSON-escaped, double-quoted string literal.
pub(crate) fn quote(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Whether `name` can be used as a bare identifier or property key.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

pub(crate) fn property_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}
