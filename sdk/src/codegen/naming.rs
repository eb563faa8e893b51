//! Rust identifiers for store names

use convert_case::{Case, Casing};
use std::collections::HashMap;

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern", "false",
    "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "static", "struct", "trait", "true", "type", "unsafe", "use", "where",
    "while", "abstract", "become", "box", "do", "final", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

// cannot be written as raw identifiers
const RESERVED_PATHS: &[&str] = &["self", "super", "crate", "Self"];

/// snake_case identifier for a label or relationship type name
pub fn snake_identifier(name: &str) -> String {
    let spaced: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let mut ident = spaced.trim().to_case(Case::Snake);

    if ident.is_empty() {
        ident = "entity".to_string();
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

/// Make `ident` usable as an item name
pub fn escape_keyword(ident: &str) -> String {
    if RESERVED_PATHS.contains(&ident) {
        format!("{}_", ident)
    } else if KEYWORDS.contains(&ident) {
        format!("r#{}", ident)
    } else {
        ident.to_string()
    }
}

/// Hands out unique function names within one namespace, suffixing
/// `_2`, `_3`, ... on collision in the order names are requested.
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashMap<String, usize>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the accessor name for `name`; the bool is true when a suffix was needed
    pub fn allocate(&mut self, name: &str) -> (String, bool) {
        let base = snake_identifier(name);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.taken.contains_key(&candidate) {
            suffix += 1;
            candidate = format!("{}_{}", base, suffix);
        }
        self.taken.insert(candidate.clone(), suffix);
        (escape_keyword(&candidate), suffix > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_identifier() {
        assert_eq!(snake_identifier("Person"), "person");
        assert_eq!(snake_identifier("ACTED_IN"), "acted_in");
        assert_eq!(snake_identifier("MovieGenre"), "movie_genre");
        assert_eq!(snake_identifier("Foo-Bar"), "foo_bar");
        assert_eq!(snake_identifier("my label"), "my_label");
        assert_eq!(snake_identifier("2024 Event"), "_2024_event");
        assert_eq!(snake_identifier("¿?"), "entity");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(escape_keyword("type"), "r#type");
        assert_eq!(escape_keyword("gen"), "r#gen");
        assert_eq!(escape_keyword("self"), "self_");
        assert_eq!(escape_keyword("person"), "person");
    }

    #[test]
    fn test_collisions_are_suffixed_in_order() {
        let mut names = NameAllocator::new();
        assert_eq!(names.allocate("Foo-Bar"), ("foo_bar".to_string(), false));
        assert_eq!(names.allocate("foo_bar"), ("foo_bar_2".to_string(), true));
        assert_eq!(names.allocate("FooBar"), ("foo_bar_3".to_string(), true));
        assert_eq!(names.allocate("Type"), ("r#type".to_string(), false));
    }
}
