//! Case conversion used for type names, accessor names and fixture keys

use once_cell::sync::Lazy;
use regex::Regex;

static ACRONYM_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("valid regex"));
static WORD_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("valid regex"));

/// Case conversion collaborator
pub trait Inflector: Send + Sync {
    /// `person_address` -> `PersonAddress`
    fn camelize(&self, word: &str) -> String;

    /// `PersonAddress` -> `person_address`
    fn underscore(&self, word: &str) -> String;

    /// Accessor name for a field, e.g. `first_name` -> `setFirstName`
    fn setter_name(&self, field: &str) -> String {
        format!("set{}", self.camelize(field))
    }
}

/// Default rules: `_`, `-` and spaces separate words, `/` maps to `::`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInflector;

impl Inflector for DefaultInflector {
    fn camelize(&self, word: &str) -> String {
        word.split('/')
            .map(|segment| {
                segment
                    .split(|c| c == '_' || c == '-' || c == ' ')
                    .map(capitalize)
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("::")
    }

    fn underscore(&self, word: &str) -> String {
        let word = word.replace("::", "/");
        let word = ACRONYM_BOUNDARY.replace_all(&word, "${1}_${2}");
        let word = WORD_BOUNDARY.replace_all(&word, "${1}_${2}");
        word.to_lowercase()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
