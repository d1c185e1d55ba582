//! Renders type-model entities as Rust type declarations (`model.rs`).

use crate::model::{EnumLiteral, EnumerationType, RecordType, ScalarKind, TypeModel};
use crate::namespace::Namespace;
use crate::naming::{Naming, disambiguate};

/// Name of the synthetic member holding open (additional) properties.
pub const ADDITIONAL_MEMBER: &str = "_additional";

/// Renders one declaration per record or enumeration.
pub struct DeclarationEmitter<'a> {
    naming: &'a dyn Naming,
}

impl<'a> DeclarationEmitter<'a> {
    #[must_use]
    pub fn new(naming: &'a dyn Naming) -> Self {
        Self { naming }
    }

    /// The declaration for `entity`, or an empty string when the variant has
    /// no standalone declaration (primitives, arrays, floating-point enums).
    #[must_use]
    pub fn render_declaration(&self, entity: &TypeModel) -> String {
        match entity {
            TypeModel::Record(record) => self.render_record(record),
            TypeModel::Enumeration(enumeration) if enumeration.is_floating_point() => String::new(),
            TypeModel::Enumeration(enumeration) => self.render_enumeration(enumeration),
            TypeModel::Primitive(_) | TypeModel::Array(_) => String::new(),
        }
    }

    /// Full text of the model file: namespace header, the imports the
    /// declarations need, then every non-empty declaration.
    #[must_use]
    pub fn render_model_file(&self, namespace: &Namespace, types: &[TypeModel]) -> String {
        let needs_map: bool = types
            .iter()
            .any(|t| matches!(t, TypeModel::Record(r) if r.additional.is_some()));
        let needs_set: bool = types.iter().any(|t| match t {
            TypeModel::Record(record) => {
                record.properties.iter().any(|p| p.r#type.mentions_set())
                    || record.additional.as_deref().is_some_and(TypeModel::mentions_set)
            }
            TypeModel::Primitive(_) | TypeModel::Array(_) | TypeModel::Enumeration(_) => false,
        });

        let mut text: String = file_header(namespace, "Data model");
        match (needs_map, needs_set) {
            (true, true) => text.push_str("use std::collections::{BTreeMap, BTreeSet};\n\n"),
            (true, false) => text.push_str("use std::collections::BTreeMap;\n\n"),
            (false, true) => text.push_str("use std::collections::BTreeSet;\n\n"),
            (false, false) => {}
        }

        let declarations: Vec<String> = types
            .iter()
            .map(|t| self.render_declaration(t))
            .filter(|d| !d.is_empty())
            .collect();
        if !declarations.is_empty() {
            text.push_str(&declarations.join("\n\n"));
            text.push('\n');
        }
        text
    }

    fn render_record(&self, record: &RecordType) -> String {
        let mut lines: Vec<String> = doc_comment(record.description.as_deref());
        lines.push("#[derive(Debug, Clone, PartialEq)]".to_string());
        if record.properties.is_empty() && record.additional.is_none() {
            lines.push(format!("pub struct {} {{}}", record.identifier));
            return lines.join("\n");
        }

        lines.push(format!("pub struct {} {{", record.identifier));
        let members: Vec<String> = member_names(self.naming, record);
        for (property, member) in record.properties.iter().zip(members) {
            let rendered: String = render_type(&property.r#type);
            let member_type: String = if property.required {
                rendered
            } else {
                format!("Option<{rendered}>")
            };
            lines.push(format!("    pub {member}: {member_type},"));
        }
        if let Some(additional) = record.additional.as_deref() {
            lines.push(format!(
                "    pub {ADDITIONAL_MEMBER}: BTreeMap<String, {}>,",
                render_type(additional)
            ));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }

    fn render_enumeration(&self, enumeration: &EnumerationType) -> String {
        let mut lines: Vec<String> = doc_comment(enumeration.description.as_deref());
        lines.push(
            "#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]"
                .to_string(),
        );
        let discriminants: Option<Vec<i64>> =
            enumeration.values.iter().map(discriminant).collect();
        match discriminants {
            Some(discriminants) if enumeration.underlying.kind == ScalarKind::Integer => {
                render_integer_enumeration(&enumeration.identifier, &discriminants, &mut lines);
            }
            _ => self.render_literal_enumeration(enumeration, &mut lines),
        }
        lines.join("\n")
    }

    /// Members bound to their literal text by `serde(rename)`. Members whose
    /// names collide are suffixed `_0`, `_1`, ...
    fn render_literal_enumeration(&self, enumeration: &EnumerationType, lines: &mut Vec<String>) {
        let names: Vec<String> = enumeration
            .values
            .iter()
            .map(|literal| match literal {
                EnumLiteral::String(s) => self.naming.to_camel_case(&self.naming.sanitize(s)),
                EnumLiteral::Integer(value) => numeric_member(*value),
                EnumLiteral::Float(value) => numeric_member(truncate(*value)),
            })
            .collect();
        lines.push(format!("pub enum {} {{", enumeration.identifier));
        for (member, literal) in disambiguate(&names).iter().zip(&enumeration.values) {
            lines.push(format!("    #[serde(rename = {:?})]", literal_text(literal)));
            lines.push(format!("    {member},"));
        }
        lines.push("}".to_string());
    }
}

/// Rust member names for `record`'s properties, in order. Names that sanitize
/// to the same identifier are suffixed `_0`, `_1`, ...
pub(crate) fn member_names(naming: &dyn Naming, record: &RecordType) -> Vec<String> {
    let names: Vec<String> = record
        .properties
        .iter()
        .map(|p| naming.sanitize(&p.name))
        .collect();
    disambiguate(&names)
}

/// `repr(i64)` members with explicit discriminants, plus the `i64` conversions
/// serde goes through.
fn render_integer_enumeration(name: &str, discriminants: &[i64], lines: &mut Vec<String>) {
    lines.push("#[serde(into = \"i64\", try_from = \"i64\")]".to_string());
    lines.push("#[repr(i64)]".to_string());
    lines.push(format!("pub enum {name} {{"));
    for value in discriminants {
        lines.push(format!("    {} = {value},", numeric_member(*value)));
    }
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push(format!("impl From<{name}> for i64 {{"));
    lines.push(format!("    fn from(value: {name}) -> Self {{"));
    lines.push("        value as Self".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push(format!("impl TryFrom<i64> for {name} {{"));
    lines.push("    type Error = String;".to_string());
    lines.push(String::new());
    lines.push("    fn try_from(value: i64) -> Result<Self, Self::Error> {".to_string());
    lines.push("        match value {".to_string());
    for value in discriminants {
        lines.push(format!(
            "            {value} => Ok(Self::{}),",
            numeric_member(*value)
        ));
    }
    lines.push(format!(
        "            other => Err(format!(\"unknown {name} value {{other}}\")),"
    ));
    lines.push("        }".to_string());
    lines.push("    }".to_string());
    lines.push("}".to_string());
}

/// `V<value>`, or `VMinus<value>` for negatives.
fn numeric_member(value: i64) -> String {
    if value < 0 {
        format!("VMinus{}", value.unsigned_abs())
    } else {
        format!("V{value}")
    }
}

/// Integer discriminant of a numeric literal; string literals have none.
fn discriminant(literal: &EnumLiteral) -> Option<i64> {
    match literal {
        EnumLiteral::Integer(value) => Some(*value),
        EnumLiteral::Float(value) => Some(truncate(*value)),
        EnumLiteral::String(_) => None,
    }
}

/// Integer part of `value`, truncated toward zero.
fn truncate(value: f64) -> i64 {
    #[expect(clippy::cast_possible_truncation)]
    let truncated: i64 = value.trunc() as i64;
    truncated
}

/// Member type for a nested reference: arrays become `Vec<T>` or
/// `BTreeSet<T>`, everything else is its bare identifier.
#[must_use]
pub fn render_type(r#type: &TypeModel) -> String {
    match r#type {
        TypeModel::Array(array) if array.unique => {
            format!("BTreeSet<{}>", render_type(&array.items))
        }
        TypeModel::Array(array) => format!("Vec<{}>", render_type(&array.items)),
        TypeModel::Primitive(_) | TypeModel::Record(_) | TypeModel::Enumeration(_) => {
            r#type.identifier().to_string()
        }
    }
}

/// `//!` header shared by every generated file.
pub(crate) fn file_header(namespace: &Namespace, contents: &str) -> String {
    format!(
        "//! Generated by json-schema-codegen. Do not edit manually.\n//!\n//! {contents} for namespace `{namespace}`.\n\n"
    )
}

/// Doc comment from a description: each line becomes a `///` line.
fn doc_comment(description: Option<&str>) -> Vec<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| {
            d.lines()
                .map(|line| format!("/// {line}").trim_end().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn literal_text(literal: &EnumLiteral) -> String {
    match literal {
        EnumLiteral::String(s) => s.clone(),
        EnumLiteral::Integer(value) => value.to_string(),
        EnumLiteral::Float(value) => value.to_string(),
    }
}
