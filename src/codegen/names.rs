//! Name Resolution Pass
//!
//! Derives identifiers for generated bindings from command paths:
//! - Type names: root type name followed by the PascalCase of every path segment
//! - Field names: the last segment, in the profile's member casing
//! - Accessor names: the whole path joined in member casing, plus `get`/`set`
//!
//! Every identifier is checked against the target language's grammar and
//! keywords. Type names are tracked across the whole binding so two paths
//! can never produce the same type.

use std::collections::HashMap;

use super::config::{Casing, NamingConfig, RenderProfile};
use crate::error::{CompileError, Result};
use crate::schema::join_topic;

/// Resolves command paths to identifiers with collision handling
pub struct NameResolver<'a> {
    profile: &'a RenderProfile,

    root_type: String,

    /// type name -> topic of the node that claimed it
    type_names: HashMap<String, String>,
}

/// Getter/setter pair for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorNames {
    pub getter: String,
    pub setter: String,
}

impl<'a> NameResolver<'a> {
    /// Create a resolver for a binding rooted at `root_type`
    pub fn new(profile: &'a RenderProfile, root_type: &str) -> Self {
        Self {
            profile,
            root_type: root_type.to_string(),
            type_names: HashMap::new(),
        }
    }

    /// Claim the type name for the node at `path`.
    ///
    /// The root (empty path) gets the root type name verbatim.
    pub fn type_name(&mut self, path: &[String]) -> Result<String> {
        let mut name = self.root_type.clone();
        for segment in path {
            name.push_str(&to_pascal_case(segment, &self.profile.naming));
        }

        let topic = display_topic(path);
        if !self.profile.is_identifier(&name) {
            return Err(CompileError::unrenderable(&topic, &name, "is not a valid type name"));
        }
        if self.profile.is_keyword(&name) {
            return Err(CompileError::unrenderable(&topic, &name, "is a reserved word"));
        }
        if self.profile.is_reserved_type(&name) {
            return Err(CompileError::unrenderable(
                &topic,
                &name,
                "clashes with a name used by the generated code",
            ));
        }
        if let Some(owner) = self.type_names.get(&name) {
            return Err(CompileError::unrenderable(
                &topic,
                &name,
                format!("collides with the type for `{}`", owner),
            ));
        }

        self.type_names.insert(name.clone(), topic);
        Ok(name)
    }

    /// Field name for the child namespace at `path`
    pub fn field_name(&self, path: &[String]) -> Result<String> {
        let topic = display_topic(path);
        let segment = path.last().map(String::as_str).unwrap_or_default();
        let name = self.member_case(&[segment]);

        if !self.profile.is_identifier(&name) {
            return Err(CompileError::unrenderable(&topic, &name, "is not a valid field name"));
        }
        self.profile
            .escape_keyword(&name)
            .ok_or_else(|| CompileError::unrenderable(&topic, &name, "is a reserved word"))
    }

    /// Accessor names for the command at `path`
    pub fn accessor_names(&self, path: &[String]) -> Result<AccessorNames> {
        let topic = display_topic(path);
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        let base = self.member_case(&segments);

        let (getter, setter) = match self.profile.member_casing {
            Casing::CamelCase | Casing::PascalCase => (format!("{}Get", base), format!("{}Set", base)),
            Casing::SnakeCase => (format!("{}_get", base), format!("{}_set", base)),
        };

        for name in [&getter, &setter] {
            if base.is_empty() || !self.profile.is_identifier(name) {
                return Err(CompileError::unrenderable(&topic, name, "is not a valid method name"));
            }
        }
        Ok(AccessorNames { getter, setter })
    }

    fn member_case(&self, segments: &[&str]) -> String {
        let words: Vec<String> = segments.iter().flat_map(|s| split_words(s)).collect();
        match self.profile.member_casing {
            Casing::SnakeCase => words
                .iter()
                .map(|w| w.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
            Casing::CamelCase => {
                let mut out = String::new();
                for (i, word) in words.iter().enumerate() {
                    if i == 0 {
                        out.push_str(&word.to_lowercase());
                    } else {
                        out.push_str(&capitalize(word));
                    }
                }
                out
            }
            Casing::PascalCase => words.iter().map(|w| capitalize(w)).collect(),
        }
    }
}

fn display_topic(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        join_topic(path)
    }
}

/// Split a segment into words on `_`, `-`, `.`, spaces and lower-to-upper case changes
pub fn split_words(segment: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in segment.chars() {
        if matches!(c, '_' | '-' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower {
            words.push(std::mem::take(&mut current));
        }
        current.push(c);
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert a segment to PascalCase, respecting acronyms
pub fn to_pascal_case(segment: &str, naming: &NamingConfig) -> String {
    split_words(segment)
        .iter()
        .map(|word| case_word(word, naming))
        .collect()
}

/// Apply casing to a word, preserving acronyms
fn case_word(word: &str, naming: &NamingConfig) -> String {
    let upper = word.to_uppercase();

    if naming.acronyms.contains(&upper) {
        return upper;
    }

    if naming.preserve_screaming_case && word.chars().any(|c| c.is_ascii_alphabetic())
        && word.chars().all(|c| !c.is_ascii_lowercase())
    {
        return word.to_string();
    }

    capitalize(word)
}

/// First letter upper, rest lower
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => {
            let mut result = first.to_uppercase().to_string();
            for c in chars {
                result.push(c.to_ascii_lowercase());
            }
            result
        }
    }
}
