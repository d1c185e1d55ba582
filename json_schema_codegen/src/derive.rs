//! Derives the type model from a parsed schema document.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::CodegenError;
use crate::json_pointer::JsonPointer;
use crate::model::{
    ArrayType, EnumLiteral, EnumerationType, PrimitiveType, Property, RecordType, ScalarKind,
    TypeModel,
};
use crate::naming::{HeckNaming, Naming};
use crate::schema::{AdditionalProperties, JsonSchema, SchemaDocument, TypeKeyword};
use crate::settings::NumberKind;

/// Turns a [`SchemaDocument`] into the run's set of type-model entities.
pub trait ModelDeriver {
    /// # Errors
    ///
    /// Returns `CodegenError::Derive` for schema constructs that have no
    /// type-model representation.
    fn derive(&self, document: &SchemaDocument) -> Result<Vec<TypeModel>, CodegenError>;
}

/// Default [`ModelDeriver`]: walks the schema tree, collecting records and
/// enumerations children-first.
#[derive(Debug, Clone, Default)]
pub struct SchemaDeriver<N = HeckNaming> {
    naming: N,
}

impl<N: Naming> SchemaDeriver<N> {
    #[must_use]
    pub fn new(naming: N) -> Self {
        Self { naming }
    }
}

impl<N: Naming> ModelDeriver for SchemaDeriver<N> {
    fn derive(&self, document: &SchemaDocument) -> Result<Vec<TypeModel>, CodegenError> {
        let mut collector: Collector<'_> = Collector {
            naming: &self.naming,
            number_kind: document.number_kind,
            root: &document.root,
            collected: IndexMap::new(),
            owners: HashMap::new(),
            names: HashMap::new(),
            resolving: HashSet::new(),
        };
        collector.derive_root()?;
        Ok(collector.collected.into_values().collect())
    }
}

/// Schema type names the deriver understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

struct Collector<'a> {
    naming: &'a dyn Naming,
    number_kind: NumberKind,
    root: &'a JsonSchema,
    /// Named entities keyed by identifier, children first.
    collected: IndexMap<String, TypeModel>,
    /// Schema node that owns each claimed identifier.
    owners: HashMap<String, *const JsonSchema>,
    /// Identifier claimed by each schema node.
    names: HashMap<*const JsonSchema, String>,
    /// Definitions currently being derived, for `$ref` cycles.
    resolving: HashSet<*const JsonSchema>,
}

impl<'a> Collector<'a> {
    fn derive_root(&mut self) -> Result<(), CodegenError> {
        let root: &'a JsonSchema = self.root;
        let name: String = root
            .title()
            .map_or_else(|| "Root".to_string(), |t| self.naming.to_camel_case(t));
        let pointer: JsonPointer = JsonPointer::root();
        match self.resolve(root, &name, &pointer)? {
            array @ TypeModel::Array(_) => {
                self.collect(array, root);
                Ok(())
            }
            TypeModel::Primitive(primitive) if primitive.kind != ScalarKind::Reference => {
                Err(CodegenError::derive(
                    pointer.as_str(),
                    format!(
                        "root schema must be an object, array or enum, found {}",
                        primitive.identifier
                    ),
                ))
            }
            _ => Ok(()),
        }
    }

    /// Derives the type of `schema`, collecting named entities under `name`.
    /// Returns a reference for collected entities and the type itself otherwise.
    fn resolve(
        &mut self,
        schema: &'a JsonSchema,
        name: &str,
        pointer: &JsonPointer,
    ) -> Result<TypeModel, CodegenError> {
        if let Some(reference) = schema.reference.as_deref() {
            return self.reference(reference, pointer);
        }
        if let Some(values) = schema.r#enum.as_deref() {
            let kind: Option<SchemaKind> = schema_kind(schema, pointer)?;
            let enumeration: EnumerationType =
                self.enumeration(schema, values, kind, name, pointer)?;
            return Ok(self.collect(TypeModel::Enumeration(enumeration), schema));
        }

        let kind: SchemaKind = match schema_kind(schema, pointer)? {
            Some(kind) => kind,
            None if schema.properties.is_some() => SchemaKind::Object,
            None if schema.items.is_some() => SchemaKind::Array,
            None => SchemaKind::Any,
        };
        let primitive = |identifier: &str, kind: ScalarKind| -> Result<TypeModel, CodegenError> {
            Ok(TypeModel::Primitive(PrimitiveType::new(identifier, kind)))
        };
        match kind {
            SchemaKind::String if is_uuid_format(schema.format.as_deref()) => {
                primitive("uuid::Uuid", ScalarKind::String)
            }
            SchemaKind::String => primitive("String", ScalarKind::String),
            SchemaKind::Integer => primitive("i64", ScalarKind::Integer),
            SchemaKind::Number => primitive(self.number_kind.identifier(), ScalarKind::Float),
            SchemaKind::Boolean => primitive("bool", ScalarKind::Boolean),
            SchemaKind::Any => primitive("serde_json::Value", ScalarKind::Any),
            SchemaKind::Object
                if schema.properties.is_none() && schema.additional_properties.is_none() =>
            {
                primitive("serde_json::Map<String, serde_json::Value>", ScalarKind::Any)
            }
            SchemaKind::Object => {
                let record: RecordType = self.record(schema, name, pointer)?;
                Ok(self.collect(TypeModel::Record(record), schema))
            }
            SchemaKind::Array => {
                let Some(items) = schema.items.as_deref() else {
                    return Err(CodegenError::derive(
                        pointer.as_str(),
                        "array schema has no \"items\"",
                    ));
                };
                let item_name: String = items
                    .title()
                    .map_or_else(|| format!("{name}Item"), |t| self.naming.to_camel_case(t));
                let item_type: TypeModel =
                    self.resolve(items, &item_name, &pointer.child("items"))?;
                let unique: bool = schema.unique_items && self.is_ordered(&item_type);
                Ok(TypeModel::Array(ArrayType {
                    identifier: name.to_string(),
                    items: Box::new(item_type),
                    unique,
                }))
            }
        }
    }

    fn record(
        &mut self,
        schema: &'a JsonSchema,
        name: &str,
        pointer: &JsonPointer,
    ) -> Result<RecordType, CodegenError> {
        let mut properties: Vec<Property> = Vec::new();
        if let Some(schema_properties) = schema.properties.as_ref() {
            let properties_pointer: JsonPointer = pointer.child("properties");
            for (key, property_schema) in schema_properties {
                let type_name: String = self
                    .naming
                    .to_camel_case(property_schema.title().unwrap_or(key.as_str()));
                let r#type: TypeModel = self.resolve(
                    property_schema,
                    &type_name,
                    &properties_pointer.child(key),
                )?;
                properties.push(Property {
                    name: key.clone(),
                    r#type,
                    required: schema.requires(key),
                });
            }
        }

        let additional: Option<Box<TypeModel>> = match schema.additional_properties.as_ref() {
            None | Some(AdditionalProperties::Allowed(false)) => None,
            Some(AdditionalProperties::Allowed(true)) => Some(Box::new(TypeModel::Primitive(
                PrimitiveType::new("serde_json::Value", ScalarKind::Any),
            ))),
            Some(AdditionalProperties::Schema(value_schema)) => {
                let value_name: String = format!("{name}Value");
                let value_type: TypeModel = self.resolve(
                    value_schema,
                    &value_name,
                    &pointer.child("additionalProperties"),
                )?;
                Some(Box::new(value_type))
            }
        };

        Ok(RecordType {
            identifier: name.to_string(),
            description: schema.description(),
            properties,
            additional,
        })
    }

    fn enumeration(
        &self,
        schema: &JsonSchema,
        values: &[Value],
        kind: Option<SchemaKind>,
        name: &str,
        pointer: &JsonPointer,
    ) -> Result<EnumerationType, CodegenError> {
        let enum_pointer: JsonPointer = pointer.child("enum");
        if values.is_empty() {
            return Err(CodegenError::derive(enum_pointer.as_str(), "enum has no values"));
        }

        let mut literals: Vec<EnumLiteral> = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            let literal: EnumLiteral = match value {
                Value::String(s) => EnumLiteral::String(s.clone()),
                Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                    (Some(i), _) => EnumLiteral::Integer(i),
                    (None, Some(f)) => EnumLiteral::Float(f),
                    (None, None) => {
                        return Err(CodegenError::derive(
                            enum_pointer.child(&index.to_string()).as_str(),
                            format!("enum literal {n} is out of range"),
                        ));
                    }
                },
                other => {
                    return Err(CodegenError::derive(
                        enum_pointer.child(&index.to_string()).as_str(),
                        format!("unsupported enum literal {other}"),
                    ));
                }
            };
            if !literals.contains(&literal) {
                literals.push(literal);
            }
        }

        let scalar: ScalarKind = match kind {
            Some(SchemaKind::String) => ScalarKind::String,
            Some(SchemaKind::Integer) => ScalarKind::Integer,
            Some(SchemaKind::Number) => ScalarKind::Float,
            None => infer_enum_kind(&literals).ok_or_else(|| {
                CodegenError::derive(enum_pointer.as_str(), "enum mixes string and number literals")
            })?,
            Some(other) => {
                return Err(CodegenError::derive(
                    pointer.as_str(),
                    format!("enum over {other:?} values is not supported"),
                ));
            }
        };
        let consistent: bool = literals.iter().all(|literal| match literal {
            EnumLiteral::String(_) => scalar == ScalarKind::String,
            EnumLiteral::Integer(_) => scalar != ScalarKind::String,
            EnumLiteral::Float(_) => scalar == ScalarKind::Float,
        });
        if !consistent {
            return Err(CodegenError::derive(
                enum_pointer.as_str(),
                format!("enum literals do not match the declared {scalar:?} type"),
            ));
        }

        let underlying_identifier: &str = match scalar {
            ScalarKind::Integer => "i64",
            ScalarKind::Float => self.number_kind.identifier(),
            _ => "String",
        };
        Ok(EnumerationType {
            identifier: name.to_string(),
            description: schema.description(),
            underlying: PrimitiveType::new(underlying_identifier, scalar),
            values: literals,
        })
    }

    /// Resolves a local `#/definitions/<name>` or `#/$defs/<name>` reference.
    fn reference(
        &mut self,
        reference: &str,
        pointer: &JsonPointer,
    ) -> Result<TypeModel, CodegenError> {
        let root: &'a JsonSchema = self.root;
        let (definitions, definition_key): (Option<&'a IndexMap<String, JsonSchema>>, &str) =
            if let Some(key) = reference.strip_prefix("#/definitions/") {
                (root.definitions.as_ref(), key)
            } else if let Some(key) = reference.strip_prefix("#/$defs/") {
                (root.defs.as_ref(), key)
            } else {
                return Err(CodegenError::derive(
                    pointer.as_str(),
                    format!("only local definition references are supported, found \"{reference}\""),
                ));
            };
        let key: String = definition_key.replace("~1", "/").replace("~0", "~");
        let Some(definition) = definitions.and_then(|d| d.get(&key)) else {
            return Err(CodegenError::derive(
                pointer.as_str(),
                format!("unresolved reference \"{reference}\""),
            ));
        };
        let node: *const JsonSchema = definition;
        if let Some(name) = self.names.get(&node)
            && (self.collected.contains_key(name) || self.resolving.contains(&node))
        {
            return Ok(TypeModel::Primitive(PrimitiveType::reference(name.clone())));
        }
        // Claimed up front so cyclic references resolve to the same identifier.
        let name: String = self.claim(&self.naming.to_camel_case(&key), definition);

        let definition_pointer: JsonPointer = if reference.starts_with("#/$defs/") {
            JsonPointer::root().child("$defs").child(&key)
        } else {
            JsonPointer::root().child("definitions").child(&key)
        };
        self.resolving.insert(node);
        let resolved: Result<TypeModel, CodegenError> =
            self.resolve(definition, &name, &definition_pointer);
        self.resolving.remove(&node);
        resolved
    }

    /// The identifier owned by `schema`: `base` if it is free, otherwise
    /// `base` with the first free numeric suffix (`Item2`, `Item3`, ...).
    fn claim(&mut self, base: &str, schema: &'a JsonSchema) -> String {
        let node: *const JsonSchema = schema;
        if let Some(name) = self.names.get(&node) {
            return name.clone();
        }
        let mut candidate: String = base.to_string();
        let mut suffix: usize = 1;
        while self.owners.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{base}{suffix}");
        }
        self.owners.insert(candidate.clone(), node);
        self.names.insert(node, candidate.clone());
        candidate
    }

    /// Records the entity derived from `schema` and returns a reference to it.
    /// Different schema nodes never share an identifier.
    fn collect(&mut self, entity: TypeModel, schema: &'a JsonSchema) -> TypeModel {
        let identifier: String = self.claim(entity.identifier(), schema);
        let entity: TypeModel = renamed(entity, &identifier);
        self.collected.entry(identifier.clone()).or_insert(entity);
        TypeModel::Primitive(PrimitiveType::reference(identifier))
    }

    /// True when `r#type` is `Ord` in the generated code, so a set of it can be
    /// built. Records, floats and untyped JSON are not.
    fn is_ordered(&self, r#type: &TypeModel) -> bool {
        match r#type {
            TypeModel::Primitive(primitive) => match primitive.kind {
                ScalarKind::String | ScalarKind::Integer | ScalarKind::Boolean => true,
                ScalarKind::Float | ScalarKind::Any => false,
                ScalarKind::Reference => matches!(
                    self.collected.get(&primitive.identifier),
                    Some(TypeModel::Enumeration(enumeration)) if !enumeration.is_floating_point()
                ),
            },
            TypeModel::Array(array) => self.is_ordered(&array.items),
            TypeModel::Enumeration(enumeration) => !enumeration.is_floating_point(),
            TypeModel::Record(_) => false,
        }
    }
}

fn renamed(entity: TypeModel, identifier: &str) -> TypeModel {
    match entity {
        TypeModel::Primitive(primitive) => TypeModel::Primitive(PrimitiveType {
            identifier: identifier.to_string(),
            ..primitive
        }),
        TypeModel::Record(record) => TypeModel::Record(RecordType {
            identifier: identifier.to_string(),
            ..record
        }),
        TypeModel::Array(array) => TypeModel::Array(ArrayType {
            identifier: identifier.to_string(),
            ..array
        }),
        TypeModel::Enumeration(enumeration) => TypeModel::Enumeration(EnumerationType {
            identifier: identifier.to_string(),
            ..enumeration
        }),
    }
}

/// Reads the `type` keyword. A list is accepted when it names exactly one
/// type besides `"null"`.
fn schema_kind(
    schema: &JsonSchema,
    pointer: &JsonPointer,
) -> Result<Option<SchemaKind>, CodegenError> {
    let name: &str = match schema.r#type.as_ref() {
        None => return Ok(None),
        Some(TypeKeyword::Single(name)) => name,
        Some(TypeKeyword::Multiple(names)) => {
            let non_null: Vec<&String> = names.iter().filter(|n| *n != "null").collect();
            match non_null.as_slice() {
                [] => return Ok(Some(SchemaKind::Any)),
                [single] => single,
                _ => {
                    return Err(CodegenError::derive(
                        pointer.child("type").as_str(),
                        format!("union types are not supported: {names:?}"),
                    ));
                }
            }
        }
    };
    let kind: SchemaKind = match name {
        "string" => SchemaKind::String,
        "integer" => SchemaKind::Integer,
        "number" => SchemaKind::Number,
        "boolean" => SchemaKind::Boolean,
        "object" => SchemaKind::Object,
        "array" => SchemaKind::Array,
        other => {
            return Err(CodegenError::derive(
                pointer.child("type").as_str(),
                format!("unsupported type \"{other}\""),
            ));
        }
    };
    Ok(Some(kind))
}

fn infer_enum_kind(literals: &[EnumLiteral]) -> Option<ScalarKind> {
    if literals.iter().all(|l| matches!(l, EnumLiteral::String(_))) {
        Some(ScalarKind::String)
    } else if literals.iter().all(|l| matches!(l, EnumLiteral::Integer(_))) {
        Some(ScalarKind::Integer)
    } else if literals.iter().all(|l| !matches!(l, EnumLiteral::String(_))) {
        Some(ScalarKind::Float)
    } else {
        None
    }
}

/// Returns true if the format indicates a UUID (uuid, uuid1..uuid8, case-insensitive).
fn is_uuid_format(format: Option<&str>) -> bool {
    let Some(f) = format else {
        return false;
    };
    let lower: &str = &f.to_lowercase();
    matches!(
        lower,
        "uuid" | "uuid1" | "uuid2" | "uuid3" | "uuid4" | "uuid5" | "uuid6" | "uuid7" | "uuid8"
    )
}
