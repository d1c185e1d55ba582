//! Settings for JSON Schema code generation.

use url::Url;

/// Rust type used for JSON Schema `number`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumberKind {
    /// `f64`.
    #[default]
    Double,
    /// `serde_json::Number`, which keeps the literal's precision.
    Decimal,
}

impl NumberKind {
    #[must_use]
    pub fn identifier(self) -> &'static str {
        match self {
            Self::Double => "f64",
            Self::Decimal => "serde_json::Number",
        }
    }
}

/// Settings that control code generation behavior.
#[derive(Debug, Clone, Default)]
pub struct GenerateSettings {
    /// Type emitted for `number` schemas.
    pub number_kind: NumberKind,

    /// Scope used when the schema has no `$id`. The namespace, and with it
    /// the output directory, is derived from the scope.
    ///
    /// **Default: none**, which resolves to the `local` namespace.
    pub default_scope: Option<Url>,
}
