//! Renders serde bindings for records (`Codecs.rs`).
//!
//! A record without open properties gets a fixed-arity binding: its raw JSON
//! keys are listed once, in declaration order, and the `Serialize` impl
//! destructures the record so the field count is checked by the compiler.
//! A record with open properties gets a map-shaped binding instead, which
//! reads and writes only the `_additional` map.

use crate::declaration::{ADDITIONAL_MEMBER, file_header, member_names, render_type};
use crate::model::{RecordType, TypeModel};
use crate::namespace::Namespace;
use crate::naming::Naming;

/// Imports and field helpers shared by every codec body.
const PREAMBLE: &str = r"#![allow(dead_code, unused_imports)]

use std::collections::{BTreeMap, BTreeSet};

use serde::de::{self, Deserialize, DeserializeOwned, Deserializer};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value};

use super::model::*;

fn take_required<T: DeserializeOwned, E: de::Error>(
    object: &mut Map<String, Value>,
    key: &'static str,
) -> Result<T, E> {
    let value: Value = object.remove(key).ok_or_else(|| E::missing_field(key))?;
    serde_json::from_value(value).map_err(E::custom)
}

fn take_optional<T: DeserializeOwned, E: de::Error>(
    object: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<T>, E> {
    match object.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some).map_err(E::custom),
    }
}

fn absent<T: DeserializeOwned, E: de::Error>() -> Result<T, E> {
    serde_json::from_value(Value::Null).map_err(E::custom)
}
";

/// Renders one codec body per record.
pub struct CodecEmitter<'a> {
    naming: &'a dyn Naming,
}

impl<'a> CodecEmitter<'a> {
    #[must_use]
    pub fn new(naming: &'a dyn Naming) -> Self {
        Self { naming }
    }

    /// The codec body for `entity`; empty for everything but records.
    #[must_use]
    pub fn render_codec(&self, entity: &TypeModel) -> String {
        match entity {
            TypeModel::Record(record) => match record.additional.as_deref() {
                None => self.render_fixed_arity(record),
                Some(additional) => self.render_map_shaped(record, additional),
            },
            TypeModel::Primitive(_) | TypeModel::Array(_) | TypeModel::Enumeration(_) => {
                String::new()
            }
        }
    }

    /// Full text of the codec file: namespace header, the fixed preamble and
    /// one anonymous `const` block wrapping every codec body.
    #[must_use]
    pub fn render_codec_file(&self, namespace: &Namespace, types: &[TypeModel]) -> String {
        let bodies: Vec<String> = types
            .iter()
            .map(|t| self.render_codec(t))
            .filter(|b| !b.is_empty())
            .collect();

        let mut text: String = file_header(namespace, "Serialization codecs");
        text.push_str(PREAMBLE);
        text.push('\n');
        text.push_str("const _: () = {\n");
        text.push_str(&bodies.join("\n\n"));
        if !bodies.is_empty() {
            text.push('\n');
        }
        text.push_str("};\n");
        text
    }

    fn render_fixed_arity(&self, record: &RecordType) -> String {
        let name: &str = &record.identifier;
        let arity: usize = record.properties.len();
        let fields_const: String =
            format!("{}_FIELDS", self.naming.sanitize(name).to_uppercase());
        let bindings: Vec<String> = member_names(self.naming, record);
        let keys: Vec<String> = record
            .properties
            .iter()
            .map(|p| format!("{:?}", p.name))
            .collect();

        let mut lines: Vec<String> = vec![
            format!(
                "    const {fields_const}: [&str; {arity}] = [{}];",
                keys.join(", ")
            ),
            String::new(),
            format!("    impl Serialize for {name} {{"),
            "        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {"
                .to_string(),
        ];
        if arity == 0 {
            lines.push(format!(
                "            let state = serializer.serialize_struct({name:?}, 0)?;"
            ));
        } else {
            lines.push(format!("            let Self {{ {} }} = self;", bindings.join(", ")));
            lines.push(format!(
                "            let mut state = serializer.serialize_struct({name:?}, {arity})?;"
            ));
        }
        for (index, (property, binding)) in record.properties.iter().zip(&bindings).enumerate() {
            let key: String = format!("{fields_const}[{index}]");
            if property.required {
                lines.push(format!("            state.serialize_field({key}, {binding})?;"));
            } else {
                lines.push(format!("            if let Some(value) = {binding} {{"));
                lines.push(format!("                state.serialize_field({key}, value)?;"));
                lines.push("            } else {".to_string());
                lines.push(format!("                state.skip_field({key})?;"));
                lines.push("            }".to_string());
            }
        }
        lines.push("            state.end()".to_string());
        lines.push("        }".to_string());
        lines.push("    }".to_string());
        lines.push(String::new());

        lines.push(format!("    impl<'de> Deserialize<'de> for {name} {{"));
        lines.push(
            "        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {"
                .to_string(),
        );
        if arity == 0 {
            lines.push(
                "            let _object: Map<String, Value> = Map::deserialize(deserializer)?;"
                    .to_string(),
            );
            lines.push("            Ok(Self {})".to_string());
        } else {
            lines.push(
                "            let mut object: Map<String, Value> = Map::deserialize(deserializer)?;"
                    .to_string(),
            );
            lines.push("            Ok(Self {".to_string());
            for (index, (property, binding)) in
                record.properties.iter().zip(&bindings).enumerate()
            {
                let helper: &str = if property.required {
                    "take_required"
                } else {
                    "take_optional"
                };
                lines.push(format!(
                    "                {binding}: {helper}::<_, D::Error>(&mut object, {fields_const}[{index}])?,"
                ));
            }
            lines.push("            })".to_string());
        }
        lines.push("        }".to_string());
        lines.push("    }".to_string());
        lines.join("\n")
    }

    fn render_map_shaped(&self, record: &RecordType, additional: &TypeModel) -> String {
        let name: &str = &record.identifier;
        let value_type: String = render_type(additional);

        let mut lines: Vec<String> = vec![
            format!("    impl Serialize for {name} {{"),
            "        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {"
                .to_string(),
            format!("            serializer.collect_map(&self.{ADDITIONAL_MEMBER})"),
            "        }".to_string(),
            "    }".to_string(),
            String::new(),
            format!("    impl<'de> Deserialize<'de> for {name} {{"),
            "        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {"
                .to_string(),
            format!(
                "            let {ADDITIONAL_MEMBER}: BTreeMap<String, {value_type}> = BTreeMap::deserialize(deserializer)?;"
            ),
            "            Ok(Self {".to_string(),
        ];
        for member in member_names(self.naming, record) {
            lines.push(format!("                {member}: absent::<_, D::Error>()?,"));
        }
        lines.push(format!("                {ADDITIONAL_MEMBER},"));
        lines.push("            })".to_string());
        lines.push("        }".to_string());
        lines.push("    }".to_string());
        lines.join("\n")
    }
}
