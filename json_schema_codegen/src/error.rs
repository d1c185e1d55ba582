use std::path::PathBuf;

use thiserror::Error;

/// Error type for every stage of the generation pipeline.
///
/// Stages short-circuit on the first error; nothing is accumulated.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// The schema text is not valid JSON or does not have the shape of a schema.
    #[error("failed to parse schema: {0}")]
    Parse(#[from] serde_json::Error),

    /// The schema's `$id` (or the configured scope) is not an absolute URI.
    #[error("invalid schema scope '{scope}': {source}")]
    InvalidScope {
        scope: String,
        #[source]
        source: url::ParseError,
    },

    /// The schema uses a construct the model deriver cannot represent.
    #[error("cannot derive type model at '{pointer}': {reason}")]
    Derive { pointer: String, reason: String },

    /// Creating a directory, deleting a stale file or writing output failed.
    #[error("i/o failure at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CodegenError {
    pub(crate) fn derive(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Derive {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_error_names_pointer_and_reason() {
        let error: CodegenError =
            CodegenError::derive("/properties/a", "unsupported type \"null\"");
        let actual: String = error.to_string();
        let expected: &str = "cannot derive type model at '/properties/a': unsupported type \"null\"";
        assert_eq!(expected, actual);
    }

    #[test]
    fn io_error_carries_description_of_underlying_fault() {
        let source: std::io::Error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
        let error: CodegenError = CodegenError::io("/out/model.rs", source);
        let actual: String = error.to_string();
        let expected: &str = "i/o failure at '/out/model.rs': permission denied";
        assert_eq!(expected, actual);
    }
}
