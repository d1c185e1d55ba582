//! JSON Pointer (RFC 6901) locations within a schema document.
//!
//! Segments are `/`-separated, with `~` escaped as `~0` and `/` escaped as `~1`.

use std::fmt;

/// Location of a schema node, used to point derivation errors at the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsonPointer(String);

impl JsonPointer {
    /// The whole document (`""`).
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// A new pointer one segment below `self`.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut path: String = String::with_capacity(self.0.len() + segment.len() + 1);
        path.push_str(&self.0);
        path.push('/');
        for c in segment.chars() {
            match c {
                '~' => path.push_str("~0"),
                '/' => path.push_str("~1"),
                other => path.push(other),
            }
        }
        Self(path)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty() {
        assert_eq!("", JsonPointer::root().as_str());
    }

    #[test]
    fn nested_children() {
        let actual: JsonPointer = JsonPointer::root()
            .child("properties")
            .child("tags")
            .child("items");
        assert_eq!("/properties/tags/items", actual.as_str());
    }

    #[test]
    fn child_escapes_slash_and_tilde() {
        let actual: JsonPointer = JsonPointer::root().child("a/b").child("c~d");
        assert_eq!("/a~1b/c~0d", actual.to_string());
    }

    #[test]
    fn empty_segment_keeps_its_slash() {
        let actual: JsonPointer = JsonPointer::root().child("");
        assert_eq!("/", actual.as_str());
    }
}
