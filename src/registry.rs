//! The tag name to implementation table.

use crate::error::{Error, Result};
use indexmap::IndexMap;

/// Names the HTML standard reserves even though they contain a hyphen.
const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// Whether `name` may be used for a custom element: it starts with a
/// lowercase ASCII letter, contains a hyphen, has no uppercase ASCII
/// letters, whitespace or markup delimiters, and is not reserved.
pub fn is_valid_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_lowercase = chars.next().map_or(false, |c| c.is_ascii_lowercase());
    starts_lowercase
        && name.contains('-')
        && !name.chars().any(|c| {
            c.is_ascii_uppercase()
                || c.is_whitespace()
                || matches!(c, '<' | '>' | '/' | '=' | '"' | '\'')
        })
        && !RESERVED_NAMES.contains(&name)
}

/// Maps tag names to implementations. Each name can be defined once.
#[derive(Debug)]
pub struct Registry<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Registry<T> {
        Registry {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Registry<T> {
    #[allow(missing_docs)]
    pub fn new() -> Registry<T> {
        Registry::default()
    }

    /// Define `name`. Invalid names and names defined before are rejected.
    pub fn register(&mut self, name: &str, implementation: T) -> Result<()> {
        if !is_valid_tag_name(name) {
            return Err(Error::InvalidTagName(name.to_string()));
        }
        if self.entries.contains_key(name) {
            return Err(Error::AlreadyRegistered(name.to_string()));
        }
        self.entries.insert(name.to_string(), implementation);
        Ok(())
    }

    /// The implementation of `name`.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(name)
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Defined names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of definitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is defined.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
