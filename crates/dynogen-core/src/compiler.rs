//! JSON Schema to TypeScript declaration compiler.
//!
//! Covers the subset of JSON Schema used to describe DynamoDB items: scalar
//! and union `type`s, nested objects, arrays and tuples, `enum`/`const`,
//! `anyOf`/`oneOf`/`allOf`, `description` (as JSDoc), plus the `tsType` and
//! `tsEnumNames` extensions.

use async_trait::async_trait;
use convert_case::{Case, Casing};
use serde_json::{Map, Value};

use crate::{
    error::CompileError,
    literal::{indent_prefix, is_identifier, property_key},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Comment emitted above the declarations.
    pub banner_comment: Option<String>,
    /// Emit `const enum` instead of `enum` for `tsEnumNames`.
    pub enable_const_enums: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            banner_comment: None,
            enable_const_enums: true,
        }
    }
}

/// Compiles a JSON Schema into TypeScript declarations named `root_name`.
#[async_trait]
pub trait TypeCompiler: Send + Sync {
    async fn compile(&self, schema: &Value, root_name: &str) -> Result<String, CompileError>;
}

#[derive(Debug, Clone, Default)]
pub struct TsCompiler {
    options: CompileOptions,
}

impl TsCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn compile_sync(&self, schema: &Value, root_name: &str) -> Result<String, CompileError> {
        if !is_identifier(root_name) {
            return Err(CompileError::new(
                "",
                format!("`{root_name}` is not a valid type name"),
            ));
        }
        let Value::Object(root) = schema else {
            return Err(CompileError::new("", "schema must be an object"));
        };

        let mut emitter = Emitter {
            options: &self.options,
            hoisted: Vec::new(),
        };

        let mut out = String::new();
        if let Some(banner) = &self.options.banner_comment {
            out.push_str(banner);
            out.push('\n');
        }
        out.push_str(&jsdoc(root, 0));

        if is_object_schema(root) {
            let members = emitter.members(root, "", 1)?;
            if members.is_empty() {
                out.push_str(&format!("export interface {root_name} {{}}\n"));
            } else {
                out.push_str(&format!(
                    "export interface {root_name} {{\n{}\n}}\n",
                    members.join("\n")
                ));
            }
        } else {
            let expr = emitter.type_expr(schema, "", 0, root_name)?;
            out.push_str(&format!("export type {root_name} = {expr};\n"));
        }

        for declaration in &emitter.hoisted {
            out.push('\n');
            out.push_str(&declaration.text);
        }

        Ok(out)
    }
}

#[async_trait]
impl TypeCompiler for TsCompiler {
    async fn compile(&self, schema: &Value, root_name: &str) -> Result<String, CompileError> {
        self.compile_sync(schema, root_name)
    }
}

struct Hoisted {
    name: String,
    text: String,
}

struct Emitter<'a> {
    options: &'a CompileOptions,
    hoisted: Vec<Hoisted>,
}

impl Emitter<'_> {
    /// Member lines of an object type, indented to `level`.
    fn members(
        &mut self,
        schema: &Map<String, Value>,
        pointer: &str,
        level: usize,
    ) -> Result<Vec<String>, CompileError> {
        let indent = indent_prefix(level);
        let required = required_names(schema, pointer)?;
        let mut lines = Vec::new();

        match schema.get("properties") {
            None => {}
            Some(Value::Object(properties)) => {
                let properties_pointer = child(pointer, "properties");
                for (name, property) in properties {
                    let property_pointer = child(&properties_pointer, name);
                    if let Value::Object(property_map) = property {
                        lines.push(jsdoc(property_map, level));
                    }
                    let ty = self.type_expr(property, &property_pointer, level, name)?;
                    let optional = if required.iter().any(|r| r == name) {
                        ""
                    } else {
                        "?"
                    };
                    lines.push(format!("{indent}{}{optional}: {ty};", property_key(name)));
                }
            }
            Some(_) => {
                return Err(CompileError::new(
                    child(pointer, "properties"),
                    "`properties` must be an object",
                ));
            }
        }

        match schema.get("additionalProperties") {
            None | Some(Value::Bool(true)) => lines.push(format!("{indent}[k: string]: any;")),
            Some(Value::Bool(false)) => {}
            Some(additional @ Value::Object(_)) => {
                let additional_pointer = child(pointer, "additionalProperties");
                let ty = self.type_expr(additional, &additional_pointer, level, "additional")?;
                lines.push(format!("{indent}[k: string]: {ty};"));
            }
            Some(_) => {
                return Err(CompileError::new(
                    child(pointer, "additionalProperties"),
                    "`additionalProperties` must be a boolean or a schema",
                ));
            }
        }

        Ok(lines.into_iter().filter(|line| !line.is_empty()).collect())
    }

    /// Type expression for `schema`, for a member declared at `level`.
    fn type_expr(
        &mut self,
        schema: &Value,
        pointer: &str,
        level: usize,
        hint: &str,
    ) -> Result<String, CompileError> {
        let schema = match schema {
            Value::Object(map) => map,
            Value::Bool(true) => return Ok("any".to_string()),
            Value::Bool(false) => return Ok("never".to_string()),
            _ => {
                return Err(CompileError::new(
                    pointer,
                    "schema must be an object or a boolean",
                ));
            }
        };

        if let Some(ts_type) = schema.get("tsType") {
            return match ts_type {
                Value::String(ts_type) => Ok(ts_type.clone()),
                _ => Err(CompileError::new(
                    child(pointer, "tsType"),
                    "`tsType` must be a string",
                )),
            };
        }

        if let Some(values) = schema.get("enum") {
            let Value::Array(values) = values else {
                return Err(CompileError::new(
                    child(pointer, "enum"),
                    "`enum` must be an array",
                ));
            };
            if let Some(names) = schema.get("tsEnumNames") {
                return self.hoist_enum(values, names, pointer, hint);
            }
            if values.is_empty() {
                return Ok("never".to_string());
            }
            return Ok(values
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(" | "));
        }

        if let Some(value) = schema.get("const") {
            return Ok(value.to_string());
        }

        for (keyword, separator) in [("anyOf", " | "), ("oneOf", " | "), ("allOf", " & ")] {
            if let Some(branches) = schema.get(keyword) {
                return self.combine(branches, &child(pointer, keyword), level, hint, separator);
            }
        }

        let Some(ty) = schema.get("type") else {
            if schema.contains_key("properties") {
                return self.object_expr(schema, pointer, level);
            }
            if schema.contains_key("items") {
                return self.array_expr(schema, pointer, level, hint);
            }
            return Ok("any".to_string());
        };

        let names = type_names(ty, &child(pointer, "type"))?;
        let mut branches = Vec::with_capacity(names.len());
        for name in names {
            let branch = match name {
                "string" => "string".to_string(),
                "number" | "integer" => "number".to_string(),
                "boolean" => "boolean".to_string(),
                "null" => "null".to_string(),
                "any" => "any".to_string(),
                "array" => self.array_expr(schema, pointer, level, hint)?,
                "object" => self.object_expr(schema, pointer, level)?,
                other => {
                    return Err(CompileError::new(
                        child(pointer, "type"),
                        format!("unknown type `{other}`"),
                    ));
                }
            };
            if !branches.contains(&branch) {
                branches.push(branch);
            }
        }
        Ok(branches.join(" | "))
    }

    fn object_expr(
        &mut self,
        schema: &Map<String, Value>,
        pointer: &str,
        level: usize,
    ) -> Result<String, CompileError> {
        let members = self.members(schema, pointer, level + 1)?;
        if members.is_empty() {
            return Ok("{}".to_string());
        }
        Ok(format!(
            "{{\n{}\n{}}}",
            members.join("\n"),
            indent_prefix(level)
        ))
    }

    fn array_expr(
        &mut self,
        schema: &Map<String, Value>,
        pointer: &str,
        level: usize,
        hint: &str,
    ) -> Result<String, CompileError> {
        let items_pointer = child(pointer, "items");
        match schema.get("items") {
            None => Ok("any[]".to_string()),
            Some(items @ (Value::Object(_) | Value::Bool(_))) => {
                let element = self.type_expr(items, &items_pointer, level, hint)?;
                if needs_parens(&element) {
                    Ok(format!("({element})[]"))
                } else {
                    Ok(format!("{element}[]"))
                }
            }
            Some(Value::Array(items)) => {
                let mut elements = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let item_pointer = child(&items_pointer, &index.to_string());
                    elements.push(self.type_expr(item, &item_pointer, level, hint)?);
                }
                Ok(format!("[{}]", elements.join(", ")))
            }
            Some(_) => Err(CompileError::new(
                items_pointer,
                "`items` must be a schema or an array of schemas",
            )),
        }
    }

    fn combine(
        &mut self,
        branches: &Value,
        pointer: &str,
        level: usize,
        hint: &str,
        separator: &str,
    ) -> Result<String, CompileError> {
        let Value::Array(branches) = branches else {
            return Err(CompileError::new(pointer, "expected an array of schemas"));
        };
        let mut rendered = Vec::with_capacity(branches.len());
        for (index, branch) in branches.iter().enumerate() {
            let expr = self.type_expr(branch, &child(pointer, &index.to_string()), level, hint)?;
            if separator == " & " && needs_parens(&expr) {
                rendered.push(format!("({expr})"));
            } else {
                rendered.push(expr);
            }
        }
        if rendered.is_empty() {
            return Ok("never".to_string());
        }
        Ok(rendered.join(separator))
    }

    fn hoist_enum(
        &mut self,
        values: &[Value],
        names: &Value,
        pointer: &str,
        hint: &str,
    ) -> Result<String, CompileError> {
        let names_pointer = child(pointer, "tsEnumNames");
        let names = match names {
            Value::Array(names) => names
                .iter()
                .map(|name| name.as_str().filter(|name| is_identifier(name)))
                .collect::<Option<Vec<&str>>>(),
            _ => None,
        }
        .ok_or_else(|| {
            CompileError::new(
                names_pointer.clone(),
                "`tsEnumNames` must be an array of identifiers",
            )
        })?;
        if names.len() != values.len() {
            return Err(CompileError::new(
                names_pointer,
                "`tsEnumNames` must have one name per `enum` value",
            ));
        }

        let base = hint.to_case(Case::Pascal);
        let keyword = if self.options.enable_const_enums {
            "const enum"
        } else {
            "enum"
        };
        let members = names
            .iter()
            .zip(values)
            .map(|(name, value)| format!("  {name} = {value}"))
            .collect::<Vec<_>>()
            .join(",\n");

        let mut name = base.clone();
        let mut suffix = 1;
        loop {
            let text = format!("export {keyword} {name} {{\n{members}\n}}\n");
            match self.hoisted.iter().find(|hoisted| hoisted.name == name) {
                Some(existing) if existing.text == text => return Ok(name),
                Some(_) => {
                    suffix += 1;
                    name = format!("{base}{suffix}");
                }
                None => {
                    self.hoisted.push(Hoisted {
                        name: name.clone(),
                        text,
                    });
                    return Ok(name);
                }
            }
        }
    }
}

fn is_object_schema(schema: &Map<String, Value>) -> bool {
    match schema.get("type") {
        Some(Value::String(ty)) => ty == "object",
        Some(_) => false,
        None => schema.contains_key("properties"),
    }
}

fn required_names<'a>(
    schema: &'a Map<String, Value>,
    pointer: &str,
) -> Result<Vec<&'a str>, CompileError> {
    match schema.get("required") {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                CompileError::new(
                    child(pointer, "required"),
                    "`required` must be an array of strings",
                )
            }),
        Some(_) => Err(CompileError::new(
            child(pointer, "required"),
            "`required` must be an array of strings",
        )),
    }
}

fn type_names<'a>(ty: &'a Value, pointer: &str) -> Result<Vec<&'a str>, CompileError> {
    match ty {
        Value::String(name) => Ok(vec![name.as_str()]),
        Value::Array(names) if !names.is_empty() => names
            .iter()
            .map(Value::as_str)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| CompileError::new(pointer, "`type` must list type names")),
        _ => Err(CompileError::new(
            pointer,
            "`type` must be a type name or a non-empty list of type names",
        )),
    }
}

fn jsdoc(schema: &Map<String, Value>, level: usize) -> String {
    let Some(Value::String(description)) = schema.get("description") else {
        return String::new();
    };
    let indent = indent_prefix(level);
    let mut doc = format!("{indent}/**\n");
    for line in description.lines() {
        if line.is_empty() {
            doc.push_str(&format!("{indent} *\n"));
        } else {
            let line = line.replace("*/", "*\\/");
            doc.push_str(&format!("{indent} * {line}\n"));
        }
    }
    doc.push_str(&format!("{indent} */"));
    if level == 0 {
        doc.push('\n');
    }
    doc
}

fn needs_parens(expr: &str) -> bool {
    !expr.starts_with('{') && (expr.contains(" | ") || expr.contains(" & "))
}

fn child(pointer: &str, key: &str) -> String {
    format!("{pointer}/{}", key.replace('~', "~0").replace('/', "~1"))
}
