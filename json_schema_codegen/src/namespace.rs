//! Namespace derivation from a schema's scope URI.

use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

/// Separator between namespace segments.
pub const SEPARATOR: char = '.';

/// Namespace used when the scope URI has no fragment, path or host.
pub const FALLBACK: &str = "local";

/// Logical grouping of one run's output; also its directory under the output root.
///
/// Never empty and never starts or ends with [`SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    /// Derives the namespace for `scope`.
    ///
    /// The first non-empty of fragment, final path segment (without its file
    /// extension) and host is transliterated: every character that is not a
    /// letter or digit becomes [`SEPARATOR`], and separators at either end are
    /// stripped. Falls back to [`FALLBACK`].
    #[must_use]
    pub fn resolve(scope: &Url) -> Self {
        let candidates: [Option<&str>; 3] = [
            scope.fragment(),
            final_path_segment(scope.path()),
            scope.host_str(),
        ];
        candidates
            .into_iter()
            .flatten()
            .map(transliterate)
            .find(|name| !name.is_empty())
            .map_or_else(|| Self(FALLBACK.to_string()), Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR).filter(|segment| !segment.is_empty())
    }

    /// `root/<segment>/<segment>/...`
    #[must_use]
    pub fn directory(&self, root: &Path) -> PathBuf {
        self.segments()
            .fold(root.to_path_buf(), |path, segment| path.join(segment))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Last `/`-separated piece of `path` with a trailing `.ext` removed.
fn final_path_segment(path: &str) -> Option<&str> {
    let segment: &str = path.rsplit('/').next()?;
    match segment.rsplit_once('.') {
        Some((stem, _extension)) if !stem.is_empty() => Some(stem),
        _ => Some(segment),
    }
}

fn transliterate(raw: &str) -> String {
    let replaced: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { SEPARATOR })
        .collect();
    replaced.trim_matches(SEPARATOR).to_string()
}
