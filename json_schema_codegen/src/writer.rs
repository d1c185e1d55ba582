//! Writes generated text under the namespace's output directory.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::CodegenError;
use crate::namespace::Namespace;

/// Declarations for one namespace.
pub const MODEL_FILE: &str = "model.rs";

/// Serde bindings for one namespace.
pub const CODEC_FILE: &str = "Codecs.rs";

/// Renders `filename` for `namespace` and writes it to
/// `output_root/<namespace segments>/filename`, replacing any previous file.
///
/// The directory is created before the generator runs. If the generator
/// fails its error is returned as is and nothing is written. Returns the
/// written path as a one-element list.
///
/// # Errors
///
/// Returns the generator's error, or `CodegenError::Io` if the directory
/// cannot be created or the file cannot be replaced.
pub fn emit<F>(
    namespace: &Namespace,
    filename: &str,
    output_root: &Path,
    generator: F,
) -> Result<Vec<PathBuf>, CodegenError>
where
    F: FnOnce(&Namespace) -> Result<String, CodegenError>,
{
    let directory: PathBuf = namespace.directory(output_root);
    fs::create_dir_all(&directory).map_err(|e| CodegenError::io(&directory, e))?;

    let text: String = generator(namespace)?;

    let path: PathBuf = directory.join(filename);
    replace(&path, &text).map_err(|e| CodegenError::io(&path, e))?;
    Ok(vec![path])
}

/// Deletes any existing file, then creates it fresh. Creation fails if
/// another writer recreated the path in between.
fn replace(path: &Path, text: &str) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    let mut file: File = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(text.as_bytes())?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use url::Url;

    fn namespace(uri: &str) -> Namespace {
        Namespace::resolve(&Url::parse(uri).expect("valid URL"))
    }

    #[test]
    fn creates_nested_directory_and_writes_text() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let ns: Namespace = namespace("http://example.com/#acme.billing");
        let actual: Vec<PathBuf> =
            emit(&ns, MODEL_FILE, root.path(), |_| Ok("hello\n".to_string()))
                .expect("emit should succeed");
        let expected: PathBuf = root.path().join("acme").join("billing").join(MODEL_FILE);
        assert_eq!(vec![expected.clone()], actual);
        assert_eq!("hello\n", fs::read_to_string(expected).expect("readable"));
    }

    #[test]
    fn replaces_existing_file() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let ns: Namespace = namespace("http://example.com/#Person");
        let directory: PathBuf = root.path().join("Person");
        fs::create_dir_all(&directory).expect("create dir");
        fs::write(directory.join(CODEC_FILE), "stale content that is longer").expect("seed file");

        emit(&ns, CODEC_FILE, root.path(), |_| Ok("fresh".to_string())).expect("emit");

        let actual: String = fs::read_to_string(directory.join(CODEC_FILE)).expect("readable");
        assert_eq!("fresh", actual);
    }

    #[test]
    fn generator_receives_namespace() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let ns: Namespace = namespace("http://example.com/schemas/Address.json");
        emit(&ns, MODEL_FILE, root.path(), |n| Ok(n.to_string())).expect("emit");
        let actual: String =
            fs::read_to_string(root.path().join("Address").join(MODEL_FILE)).expect("readable");
        assert_eq!("Address", actual);
    }

    #[test]
    fn generator_failure_writes_nothing() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let ns: Namespace = namespace("http://example.com/#Person");
        let result: Result<Vec<PathBuf>, CodegenError> = emit(&ns, MODEL_FILE, root.path(), |_| {
            Err(CodegenError::derive("/properties/x", "unsupported"))
        });
        assert!(matches!(result, Err(CodegenError::Derive { .. })));
        // The directory is created before the generator runs.
        assert!(root.path().join("Person").is_dir());
        assert!(!root.path().join("Person").join(MODEL_FILE).exists());
    }

    #[test]
    fn unwritable_root_is_an_io_error() {
        let root: TempDir = TempDir::new().expect("temp dir");
        let blocker: PathBuf = root.path().join("blocker");
        fs::write(&blocker, "not a directory").expect("seed file");
        let ns: Namespace = namespace("http://example.com/#Person");
        let result: Result<Vec<PathBuf>, CodegenError> =
            emit(&ns, MODEL_FILE, &blocker, |_| Ok(String::new()));
        match result {
            Err(CodegenError::Io { path, .. }) => assert_eq!(blocker.join("Person"), path),
            other => panic!("expected i/o error, got {other:?}"),
        }
    }
}
