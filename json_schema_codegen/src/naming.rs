//! Identifier sanitization and casing for generated Rust code.

use std::collections::{BTreeMap, BTreeSet};

use heck::{ToSnakeCase, ToUpperCamelCase};

/// Turns arbitrary schema names and literals into Rust identifiers.
///
/// Implementations must be deterministic and total. Collision handling, if
/// any, is the implementation's business.
pub trait Naming {
    /// A valid bare identifier (field or binding name) for `raw`.
    fn sanitize(&self, raw: &str) -> String;

    /// An `UpperCamelCase` type or variant name for `identifier`.
    fn to_camel_case(&self, identifier: &str) -> String;
}

/// Strict and reserved keywords that cannot be used as bare identifiers.
const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Default [`Naming`] built on `heck`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeckNaming;

impl Naming for HeckNaming {
    fn sanitize(&self, raw: &str) -> String {
        let snake: String = raw.to_snake_case();
        if snake.is_empty() {
            return "value".to_string();
        }
        if snake.starts_with(|c: char| c.is_ascii_digit()) {
            return format!("_{snake}");
        }
        if RUST_KEYWORDS.contains(&snake.as_str()) {
            return format!("{snake}_");
        }
        snake
    }

    fn to_camel_case(&self, identifier: &str) -> String {
        let camel: String = identifier.to_upper_camel_case();
        if camel.is_empty() || camel.starts_with(|c: char| c.is_ascii_digit()) {
            format!("E{camel}")
        } else {
            camel
        }
    }
}

/// Makes `names` unique: every name that occurs more than once gets a `_<n>`
/// suffix, numbered from zero in order of appearance. Names that occur once
/// are kept, and a suffix never reuses a name already in the list.
pub(crate) fn disambiguate(names: &[String]) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }
    let is_unique = |name: &str| counts.get(name).copied() == Some(1);

    let mut used: BTreeSet<String> = names
        .iter()
        .filter(|n| is_unique(n.as_str()))
        .cloned()
        .collect();
    let mut next_index: BTreeMap<&str, usize> = BTreeMap::new();
    let mut result: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        if is_unique(name.as_str()) {
            result.push(name.clone());
            continue;
        }
        let index: &mut usize = next_index.entry(name.as_str()).or_insert(0);
        loop {
            let candidate: String = format!("{name}_{index}");
            *index += 1;
            if used.insert(candidate.clone()) {
                result.push(candidate);
                break;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_hyphenated_key() {
        let actual: String = HeckNaming.sanitize("foo-bar");
        let expected: &str = "foo_bar";
        assert_eq!(expected, actual);
    }

    #[test]
    fn sanitize_camel_case_key() {
        let actual: String = HeckNaming.sanitize("firstName");
        let expected: &str = "first_name";
        assert_eq!(expected, actual);
    }

    #[test]
    fn sanitize_keyword_gets_trailing_underscore() {
        assert_eq!("type_", HeckNaming.sanitize("type"));
        assert_eq!("self_", HeckNaming.sanitize("self"));
    }

    #[test]
    fn sanitize_leading_digit_gets_underscore_prefix() {
        let actual: String = HeckNaming.sanitize("3d");
        let expected: &str = "_3d";
        assert_eq!(expected, actual);
    }

    #[test]
    fn sanitize_punctuation_only_falls_back() {
        let actual: String = HeckNaming.sanitize("--");
        let expected: &str = "value";
        assert_eq!(expected, actual);
    }

    #[test]
    fn to_camel_case_from_sanitized_literal() {
        let naming: HeckNaming = HeckNaming;
        let actual: String = naming.to_camel_case(&naming.sanitize("blackjack-a"));
        let expected: &str = "BlackjackA";
        assert_eq!(expected, actual);
    }

    #[test]
    fn to_camel_case_numeric_prefix_gets_e_prefix() {
        let actual: String = HeckNaming.to_camel_case("123");
        let expected: &str = "E123";
        assert_eq!(expected, actual);
    }

    #[test]
    fn to_camel_case_title_with_spaces() {
        let actual: String = HeckNaming.to_camel_case("The Widget Schema");
        let expected: &str = "TheWidgetSchema";
        assert_eq!(expected, actual);
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn disambiguate_suffixes_every_colliding_name() {
        let actual: Vec<String> = disambiguate(&strings(&["AB", "Other", "AB", "AB"]));
        let expected: Vec<String> = strings(&["AB_0", "Other", "AB_1", "AB_2"]);
        assert_eq!(expected, actual);
    }

    #[test]
    fn disambiguate_keeps_unique_names() {
        let names: Vec<String> = strings(&["foo", "bar"]);
        assert_eq!(names, disambiguate(&names));
    }

    #[test]
    fn disambiguate_skips_suffixes_already_taken() {
        let actual: Vec<String> = disambiguate(&strings(&["x", "x_0", "x"]));
        let expected: Vec<String> = strings(&["x_1", "x_0", "x_2"]);
        assert_eq!(expected, actual);
    }
}
