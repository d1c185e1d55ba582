//! JSON Schema document model and the default parser.

use indexmap::IndexMap;
use serde::Deserialize;
use url::Url;

use crate::error::CodegenError;
use crate::settings::{GenerateSettings, NumberKind};

/// The `type` keyword: a single type name or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeKeyword {
    Single(String),
    Multiple(Vec<String>),
}

/// The `additionalProperties` keyword.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<JsonSchema>),
}

/// Root or nested JSON Schema object.
///
/// Only the schema fields used by the generator are modeled.
/// Extra keys in the JSON are ignored via serde's default behavior.
/// Uses `IndexMap` so properties keep their document order.
#[derive(Debug, Default, Deserialize)]
pub struct JsonSchema {
    #[serde(default, rename = "$id")]
    pub id: Option<String>,

    #[serde(default, rename = "$ref")]
    pub reference: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub r#type: Option<TypeKeyword>,

    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub properties: Option<IndexMap<String, JsonSchema>>,

    #[serde(default)]
    pub required: Option<Vec<String>>,

    #[serde(default)]
    pub r#enum: Option<Vec<serde_json::Value>>,

    #[serde(default)]
    pub items: Option<Box<JsonSchema>>,

    #[serde(default, rename = "uniqueItems")]
    pub unique_items: bool,

    #[serde(default, rename = "additionalProperties")]
    pub additional_properties: Option<AdditionalProperties>,

    #[serde(default)]
    pub definitions: Option<IndexMap<String, JsonSchema>>,

    #[serde(default, rename = "$defs")]
    pub defs: Option<IndexMap<String, JsonSchema>>,
}

impl JsonSchema {
    /// Trimmed title, or `None` when absent or blank.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Trimmed description, or `None` when absent or blank.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(String::from)
    }

    /// True when `name` is listed in this object's `required` array.
    #[must_use]
    pub fn requires(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|required| required.iter().any(|r| r == name))
    }
}

/// A parsed schema plus the parameters the rest of the pipeline needs.
#[derive(Debug)]
pub struct SchemaDocument {
    /// Identifies the schema; the output namespace is derived from it.
    pub scope: Url,
    pub number_kind: NumberKind,
    pub root: JsonSchema,
}

/// Turns schema text into a [`SchemaDocument`].
pub trait SchemaParser {
    /// # Errors
    ///
    /// Returns `CodegenError` if the text is not a schema or its scope is not a URI.
    fn parse(&self, source: &str) -> Result<SchemaDocument, CodegenError>;
}

/// Default [`SchemaParser`] backed by `serde_json`.
#[derive(Debug, Clone, Default)]
pub struct JsonSchemaParser {
    settings: GenerateSettings,
}

impl JsonSchemaParser {
    #[must_use]
    pub fn new(settings: GenerateSettings) -> Self {
        Self { settings }
    }

    /// `$id` (resolved against the default scope when relative), else the
    /// default scope, else `file:///`.
    fn scope(&self, id: Option<&str>) -> Result<Url, CodegenError> {
        let base: Option<&Url> = self.settings.default_scope.as_ref();
        let resolved: Result<Url, url::ParseError> = match (id, base) {
            (Some(id), Some(base)) => base.join(id),
            (Some(id), None) => Url::parse(id),
            (None, Some(base)) => Ok(base.clone()),
            (None, None) => Url::parse("file:///"),
        };
        resolved.map_err(|source| CodegenError::InvalidScope {
            scope: id.unwrap_or_default().to_string(),
            source,
        })
    }
}

impl SchemaParser for JsonSchemaParser {
    fn parse(&self, source: &str) -> Result<SchemaDocument, CodegenError> {
        let root: JsonSchema = serde_json::from_str(source)?;
        let scope: Url = self.scope(root.id.as_deref())?;
        Ok(SchemaDocument {
            scope,
            number_kind: self.settings.number_kind,
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_keep_document_order() {
        let schema: JsonSchema = serde_json::from_str(
            r#"{"type": "object", "properties": {"b": {}, "a": {}, "c": {}}}"#,
        )
        .expect("schema should parse");
        let actual: Vec<&str> = schema
            .properties
            .as_ref()
            .expect("properties should be present")
            .keys()
            .map(String::as_str)
            .collect();
        let expected: Vec<&str> = vec!["b", "a", "c"];
        assert_eq!(expected, actual);
    }

    #[test]
    fn additional_properties_bool_or_schema() {
        let allowed: JsonSchema =
            serde_json::from_str(r#"{"additionalProperties": false}"#).expect("should parse");
        assert!(matches!(
            allowed.additional_properties,
            Some(AdditionalProperties::Allowed(false))
        ));
        let schema: JsonSchema =
            serde_json::from_str(r#"{"additionalProperties": {"type": "integer"}}"#)
                .expect("should parse");
        assert!(matches!(
            schema.additional_properties,
            Some(AdditionalProperties::Schema(_))
        ));
    }

    #[test]
    fn type_keyword_accepts_list() {
        let schema: JsonSchema =
            serde_json::from_str(r#"{"type": ["string", "null"]}"#).expect("should parse");
        assert!(matches!(schema.r#type, Some(TypeKeyword::Multiple(ref v)) if v.len() == 2));
    }

    #[test]
    fn parse_uses_id_as_scope() {
        let document: SchemaDocument = JsonSchemaParser::default()
            .parse(r#"{"$id": "http://example.com/schemas/Person.json#Person", "type": "object"}"#)
            .expect("should parse");
        assert_eq!(
            "http://example.com/schemas/Person.json#Person",
            document.scope.as_str()
        );
        assert_eq!(NumberKind::Double, document.number_kind);
    }

    #[test]
    fn parse_resolves_relative_id_against_default_scope() {
        let settings: GenerateSettings = GenerateSettings {
            number_kind: NumberKind::Decimal,
            default_scope: Some(Url::parse("http://example.com/schemas/").expect("valid URL")),
        };
        let document: SchemaDocument = JsonSchemaParser::new(settings)
            .parse(r#"{"$id": "Address.json", "type": "object"}"#)
            .expect("should parse");
        assert_eq!("http://example.com/schemas/Address.json", document.scope.as_str());
        assert_eq!(NumberKind::Decimal, document.number_kind);
    }

    #[test]
    fn parse_without_id_or_default_scope_uses_file_root() {
        let document: SchemaDocument = JsonSchemaParser::default()
            .parse(r#"{"type": "object"}"#)
            .expect("should parse");
        assert_eq!("file:///", document.scope.as_str());
    }

    #[test]
    fn parse_rejects_relative_id_without_default_scope() {
        let result: Result<SchemaDocument, CodegenError> =
            JsonSchemaParser::default().parse(r#"{"$id": "person.json"}"#);
        assert!(matches!(result, Err(CodegenError::InvalidScope { .. })));
    }

    #[test]
    fn parse_rejects_malformed_json() {
        let result: Result<SchemaDocument, CodegenError> =
            JsonSchemaParser::default().parse("{not json");
        assert!(matches!(result, Err(CodegenError::Parse(_))));
    }
}
