//! Generate Rust data models and serde codecs from JSON Schema.
//!
//! One run reads a schema, derives its type model and writes two files into
//! a directory named after the schema's namespace:
//!
//! - `model.rs`: structs for object schemas, enums for `enum` schemas.
//! - `Codecs.rs`: `Serialize`/`Deserialize` impls for every struct.
//!
//! The namespace comes from the schema's scope URI (`$id`): its fragment,
//! else the file stem of its path, else its host, else `local`. Dots in the
//! namespace become nested directories.
//!
//! Include the output as a module pair; the codecs refer to the model
//! through `super::model`:
//!
//! ```ignore
//! mod person {
//!     pub mod model;
//!     #[path = "Codecs.rs"]
//!     mod codecs;
//! }
//! ```
//!
//! [`generate`] and [`generate_from_file`] run the whole pipeline with the
//! default collaborators. Build a [`Pipeline`] directly to substitute the
//! parser, deriver, naming or log sink.

mod codec;
mod declaration;
mod derive;
mod error;
mod json_pointer;
mod model;
mod namespace;
mod naming;
mod pipeline;
mod schema;
mod settings;
mod sink;
mod writer;

pub use codec::CodecEmitter;
pub use declaration::{ADDITIONAL_MEMBER, DeclarationEmitter, render_type};
pub use derive::{ModelDeriver, SchemaDeriver};
pub use error::CodegenError;
pub use json_pointer::JsonPointer;
pub use model::{
    ArrayType, EnumLiteral, EnumerationType, PrimitiveType, Property, RecordType, ScalarKind,
    TypeModel,
};
pub use namespace::{FALLBACK, Namespace, SEPARATOR};
pub use naming::{HeckNaming, Naming};
pub use pipeline::{
    GENERATED_FILES, GENERATED_OBJECT_MODEL, MODEL_FILES, PARSED_SCHEMA, Pipeline,
    SERIALIZATION_FILES,
};
pub use schema::{
    AdditionalProperties, JsonSchema, JsonSchemaParser, SchemaDocument, SchemaParser, TypeKeyword,
};
pub use settings::{GenerateSettings, NumberKind};
pub use sink::{Entry, Level, MemorySink, Sink, TracingSink};
pub use writer::{CODEC_FILE, MODEL_FILE, emit};

use std::path::{Path, PathBuf};

/// Generate `model.rs` and `Codecs.rs` for the schema in `source` under
/// `output_dir`, logging through `tracing`.
///
/// Returns the written paths, model file first.
///
/// # Errors
///
/// Returns `CodegenError` if the schema cannot be parsed, its type model cannot
/// be derived, or either file cannot be written.
pub fn generate(
    source: &str,
    output_dir: impl AsRef<Path>,
    settings: &GenerateSettings,
) -> Result<Vec<PathBuf>, CodegenError> {
    let parser: JsonSchemaParser = JsonSchemaParser::new(settings.clone());
    let deriver: SchemaDeriver = SchemaDeriver::new(HeckNaming);
    Pipeline::new(&parser, &deriver, &HeckNaming, &TracingSink).run(source, output_dir.as_ref())
}

/// Generate from the schema file at `input_path`.
///
/// # Errors
///
/// Returns `CodegenError::Io` if the input cannot be read, otherwise as [`generate`].
pub fn generate_from_file(
    input_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    settings: &GenerateSettings,
) -> Result<Vec<PathBuf>, CodegenError> {
    let input_path: &Path = input_path.as_ref();
    let source: String =
        std::fs::read_to_string(input_path).map_err(|e| CodegenError::io(input_path, e))?;
    generate(&source, output_dir, settings)
}
