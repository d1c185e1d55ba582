//! The generation chain: parse, derive, write `model.rs`, write `Codecs.rs`.
//!
//! Every stage returns a `Result`; the first failure stops the chain and is
//! returned unchanged. Files written by earlier stages stay on disk. Each
//! stage result is reported to the [`Sink`] before the chain moves on.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::codec::CodecEmitter;
use crate::declaration::DeclarationEmitter;
use crate::derive::ModelDeriver;
use crate::error::CodegenError;
use crate::model::TypeModel;
use crate::namespace::Namespace;
use crate::naming::Naming;
use crate::schema::{SchemaDocument, SchemaParser};
use crate::sink::Sink;
use crate::writer::{CODEC_FILE, MODEL_FILE, emit};

pub const PARSED_SCHEMA: &str = "parsed schema";
pub const GENERATED_OBJECT_MODEL: &str = "generated object model";
pub const MODEL_FILES: &str = "model files";
pub const SERIALIZATION_FILES: &str = "serialization files";
pub const GENERATED_FILES: &str = "generated files";

/// Wires the collaborators together for one or more runs.
pub struct Pipeline<'a> {
    parser: &'a dyn SchemaParser,
    deriver: &'a dyn ModelDeriver,
    naming: &'a dyn Naming,
    sink: &'a dyn Sink,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(
        parser: &'a dyn SchemaParser,
        deriver: &'a dyn ModelDeriver,
        naming: &'a dyn Naming,
        sink: &'a dyn Sink,
    ) -> Self {
        Self {
            parser,
            deriver,
            naming,
            sink,
        }
    }

    /// Runs every stage against `source` and returns the model file path
    /// followed by the codec file path.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure.
    pub fn run(&self, source: &str, output_dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        let result: Result<Vec<PathBuf>, CodegenError> = self
            .observe(PARSED_SCHEMA, self.parser.parse(source), |document| {
                format!("scope {}", document.scope)
            })
            .and_then(|document| {
                let types: Vec<TypeModel> = self.observe(
                    GENERATED_OBJECT_MODEL,
                    self.deriver.derive(&document),
                    |types| format!("{} entities", types.len()),
                )?;
                Ok((document, types))
            })
            .and_then(|(document, types)| self.write(&document, &types, output_dir));
        self.observe(GENERATED_FILES, result, |paths| list(paths))
    }

    fn write(
        &self,
        document: &SchemaDocument,
        types: &[TypeModel],
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, CodegenError> {
        let namespace: Namespace = Namespace::resolve(&document.scope);
        self.sink.debug(
            GENERATED_OBJECT_MODEL,
            &format!("namespace {namespace} from scope {}", document.scope),
        );

        let mut paths: Vec<PathBuf> = self.observe(
            MODEL_FILES,
            emit(&namespace, MODEL_FILE, output_dir, |ns| {
                let emitter: DeclarationEmitter<'_> = DeclarationEmitter::new(self.naming);
                let text: String = emitter.render_model_file(ns, types);
                let rendered: usize = count(types, |t| emitter.render_declaration(t));
                self.sink.debug(MODEL_FILES, &format!("rendered {rendered} declarations"));
                Ok(text)
            }),
            |paths| list(paths),
        )?;

        let codec_paths: Vec<PathBuf> = self.observe(
            SERIALIZATION_FILES,
            emit(&namespace, CODEC_FILE, output_dir, |ns| {
                let emitter: CodecEmitter<'_> = CodecEmitter::new(self.naming);
                let text: String = emitter.render_codec_file(ns, types);
                let rendered: usize = count(types, |t| emitter.render_codec(t));
                self.sink.debug(SERIALIZATION_FILES, &format!("rendered {rendered} codecs"));
                Ok(text)
            }),
            |paths| list(paths),
        )?;

        paths.extend(codec_paths);
        Ok(paths)
    }

    /// Reports `result` under `label` and hands it back untouched.
    fn observe<T, E: Display>(
        &self,
        label: &str,
        result: Result<T, E>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T, E> {
        match &result {
            Ok(value) => self.sink.info(label, &describe(value)),
            Err(error) => self.sink.error(label, &error.to_string()),
        }
        result
    }
}

/// Number of entities that render to non-empty text.
fn count(types: &[TypeModel], render: impl Fn(&TypeModel) -> String) -> usize {
    types.iter().filter(|t| !render(t).is_empty()).count()
}

fn list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::SchemaDeriver;
    use crate::naming::HeckNaming;
    use crate::schema::JsonSchemaParser;
    use crate::sink::{Level, MemorySink};
    use tempfile::TempDir;

    const POINT: &str = r#"{
        "$id": "http://example.com/schemas/Point.json",
        "title": "Point",
        "type": "object",
        "properties": {
            "x": {"type": "number"},
            "y": {"type": "number"}
        },
        "required": ["x", "y"]
    }"#;

    /// A deriver that always fails, to check the chain stops.
    struct FailingDeriver;

    impl ModelDeriver for FailingDeriver {
        fn derive(&self, _document: &SchemaDocument) -> Result<Vec<TypeModel>, CodegenError> {
            Err(CodegenError::derive("/", "refused"))
        }
    }

    fn run(
        deriver: &dyn ModelDeriver,
        source: &str,
        root: &Path,
        sink: &MemorySink,
    ) -> Result<Vec<PathBuf>, CodegenError> {
        let parser: JsonSchemaParser = JsonSchemaParser::default();
        Pipeline::new(&parser, deriver, &HeckNaming, sink).run(source, root)
    }

    #[test]
    fn writes_model_then_codec_file() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let sink: MemorySink = MemorySink::new();
        let deriver: SchemaDeriver = SchemaDeriver::new(HeckNaming);
        let actual: Vec<PathBuf> = run(&deriver, POINT, root.path(), &sink).expect("run");
        let expected: Vec<PathBuf> = vec![
            root.path().join("Point").join(MODEL_FILE),
            root.path().join("Point").join(CODEC_FILE),
        ];
        assert_eq!(expected, actual);

        let info: Vec<String> = sink.labels(Level::Info);
        assert_eq!(
            vec![
                PARSED_SCHEMA,
                GENERATED_OBJECT_MODEL,
                MODEL_FILES,
                SERIALIZATION_FILES,
                GENERATED_FILES
            ],
            info
        );
        assert!(sink.labels(Level::Error).is_empty());
        assert!(
            sink.entries()
                .iter()
                .any(|e| e.level == Level::Debug && e.message == "rendered 1 codecs")
        );
    }

    #[test]
    fn parse_failure_stops_before_any_write() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let sink: MemorySink = MemorySink::new();
        let deriver: SchemaDeriver = SchemaDeriver::new(HeckNaming);
        let result: Result<Vec<PathBuf>, CodegenError> = run(&deriver, "{", root.path(), &sink);
        assert!(matches!(result, Err(CodegenError::Parse(_))));
        assert!(sink.labels(Level::Info).is_empty());
        assert_eq!(vec![PARSED_SCHEMA, GENERATED_FILES], sink.labels(Level::Error));
        assert_eq!(0, std::fs::read_dir(root.path()).expect("readable").count());
    }

    #[test]
    fn derive_failure_is_returned_unchanged() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let sink: MemorySink = MemorySink::new();
        let result: Result<Vec<PathBuf>, CodegenError> =
            run(&FailingDeriver, POINT, root.path(), &sink);
        match result {
            Err(CodegenError::Derive { pointer, reason }) => {
                assert_eq!("/", pointer);
                assert_eq!("refused", reason);
            }
            other => panic!("expected derive error, got {other:?}"),
        }
        assert_eq!(vec![PARSED_SCHEMA], sink.labels(Level::Info));
        assert_eq!(
            vec![GENERATED_OBJECT_MODEL, GENERATED_FILES],
            sink.labels(Level::Error)
        );
        assert!(!root.path().join("Point").exists());
    }

    #[test]
    fn model_file_failure_stops_before_codec_file() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let blocker: PathBuf = root.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("seed file");
        let sink: MemorySink = MemorySink::new();
        let deriver: SchemaDeriver = SchemaDeriver::new(HeckNaming);

        let result: Result<Vec<PathBuf>, CodegenError> = run(&deriver, POINT, &blocker, &sink);

        assert!(matches!(result, Err(CodegenError::Io { .. })));
        assert_eq!(vec![MODEL_FILES, GENERATED_FILES], sink.labels(Level::Error));
        assert_eq!(vec![PARSED_SCHEMA, GENERATED_OBJECT_MODEL], sink.labels(Level::Info));
        assert!(sink.entries().iter().all(|e| e.label != SERIALIZATION_FILES));
    }

    #[test]
    fn second_run_leaves_identical_files() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let deriver: SchemaDeriver = SchemaDeriver::new(HeckNaming);
        let first: Vec<PathBuf> =
            run(&deriver, POINT, root.path(), &MemorySink::new()).expect("first run");
        let before: Vec<String> = first
            .iter()
            .map(|p| std::fs::read_to_string(p).expect("readable"))
            .collect();
        let second: Vec<PathBuf> =
            run(&deriver, POINT, root.path(), &MemorySink::new()).expect("second run");
        let after: Vec<String> = second
            .iter()
            .map(|p| std::fs::read_to_string(p).expect("readable"))
            .collect();
        assert_eq!(first, second);
        assert_eq!(before, after);
    }
}
