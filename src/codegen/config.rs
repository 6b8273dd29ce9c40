//! Codegen Configuration
//!
//! Two-tier configuration:
//! - Global (NamingConfig): Language-agnostic settings for naming
//! - Per-language (RenderProfile): Identifier rules, keyword escaping, accessor casing
//!
//! Key principle: the binding plan (which types exist, which accessors they
//! carry) is config-free. Only naming and emission use configuration.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Global Configuration (Language-Agnostic)
// =============================================================================

/// Naming configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConfig {
    /// Acronyms kept uppercase in type names (e.g., DC, AC, IO)
    #[serde(default = "default_acronyms")]
    pub acronyms: BTreeSet<String>,

    /// Whether all-caps segments keep their casing in type names
    #[serde(default = "default_true")]
    pub preserve_screaming_case: bool,
}

fn default_acronyms() -> BTreeSet<String> {
    ["ID", "IO", "API", "URL", "HTTP", "JSON", "DC", "AC", "RF", "IEEE"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            acronyms: default_acronyms(),
            preserve_screaming_case: true,
        }
    }
}

// =============================================================================
// Render Profile (Per-Language)
// =============================================================================

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Rust,
    #[value(name = "typescript")]
    TypeScript,
    Python,
}

impl Language {
    /// Conventional file extension for generated sources
    pub fn extension(&self) -> &'static str {
        match self {
            Language::Rust => "rs",
            Language::TypeScript => "ts",
            Language::Python => "py",
        }
    }
}

/// Casing convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Casing {
    PascalCase,
    CamelCase,
    SnakeCase,
}

/// Language-specific rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderProfile {
    /// Language identifier
    pub language: Language,

    /// Casing for accessor and field names
    pub member_casing: Casing,

    /// Prefix that turns a keyword into a usable identifier
    pub keyword_escape: String,

    /// Whether to declare the Handle capability in the generated file
    pub emit_handle: bool,

    /// Naming conventions
    pub naming: NamingConfig,
}

// =============================================================================
// Default Profiles
// =============================================================================

impl RenderProfile {
    /// Create the default Rust profile
    pub fn rust() -> Self {
        Self {
            language: Language::Rust,
            member_casing: Casing::SnakeCase,
            keyword_escape: "r#".to_string(),
            emit_handle: true,
            naming: NamingConfig::default(),
        }
    }

    /// Create the TypeScript profile
    pub fn typescript() -> Self {
        Self {
            language: Language::TypeScript,
            member_casing: Casing::CamelCase,
            keyword_escape: "_".to_string(),
            emit_handle: true,
            naming: NamingConfig::default(),
        }
    }

    /// Create the Python profile
    pub fn python() -> Self {
        Self {
            language: Language::Python,
            member_casing: Casing::SnakeCase,
            keyword_escape: "_".to_string(),
            emit_handle: true,
            naming: NamingConfig::default(),
        }
    }

    /// Default profile for a language
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Rust => Self::rust(),
            Language::TypeScript => Self::typescript(),
            Language::Python => Self::python(),
        }
    }

    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_emit_handle(mut self, emit_handle: bool) -> Self {
        self.emit_handle = emit_handle;
        self
    }
}

// =============================================================================
// Identifier Rules
// =============================================================================

impl RenderProfile {
    fn keywords(&self) -> &'static [&'static str] {
        match self.language {
            Language::Rust => RUST_KEYWORDS,
            Language::TypeScript => TS_KEYWORDS,
            Language::Python => PYTHON_KEYWORDS,
        }
    }

    /// Is `name` a type the generated file declares or references itself?
    pub fn is_reserved_type(&self, name: &str) -> bool {
        let reserved = match self.language {
            Language::Rust => RUST_RESERVED_TYPES,
            Language::TypeScript => TS_RESERVED_TYPES,
            Language::Python => PYTHON_RESERVED_TYPES,
        };
        reserved.contains(&name)
    }

    /// Is `name` a reserved word in the target language?
    pub fn is_keyword(&self, name: &str) -> bool {
        self.keywords().contains(&name)
    }

    /// Does `name` match the lexical identifier grammar of the target language?
    pub fn is_identifier(&self, name: &str) -> bool {
        if name == "_" {
            return false;
        }
        identifier_pattern(self.language).is_match(name)
    }

    /// Escape a keyword if needed.
    ///
    /// Returns `None` when the name is a keyword that cannot be escaped
    /// (Rust's `self`, `Self`, `super`, `crate`).
    pub fn escape_keyword(&self, name: &str) -> Option<String> {
        if !self.is_keyword(name) {
            return Some(name.to_string());
        }
        if self.language == Language::Rust && RUST_UNESCAPABLE.contains(&name) {
            return None;
        }
        Some(format!("{}{}", self.keyword_escape, name))
    }
}

fn identifier_pattern(language: Language) -> &'static Regex {
    static RUST: OnceLock<Regex> = OnceLock::new();
    static TYPESCRIPT: OnceLock<Regex> = OnceLock::new();
    static PYTHON: OnceLock<Regex> = OnceLock::new();

    match language {
        Language::Rust => RUST.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()),
        Language::TypeScript => {
            TYPESCRIPT.get_or_init(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap())
        }
        Language::Python => PYTHON.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap()),
    }
}

// =============================================================================
// Keywords
// =============================================================================

const RUST_KEYWORDS: &[&str] = &[
    "as", "break", "const", "continue", "crate", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct",
    "super", "trait", "true", "type", "unsafe", "use", "where", "while",
    "async", "await", "dyn", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "typeof", "unsized", "virtual", "yield", "try",
];

const RUST_UNESCAPABLE: &[&str] = &["self", "Self", "super", "crate"];

// Names used by the emitted preamble and signatures
const RUST_RESERVED_TYPES: &[&str] = &["Handle", "H", "Result", "String", "Option", "Self", "Clone"];
const TS_RESERVED_TYPES: &[&str] = &["Handle"];
const PYTHON_RESERVED_TYPES: &[&str] = &["Handle", "Optional", "Protocol"];

const TS_KEYWORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "export", "extends", "false",
    "finally", "for", "function", "if", "import", "in", "instanceof", "new",
    "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "as", "implements", "interface",
    "let", "package", "private", "protected", "public", "static", "yield",
    "any", "boolean", "constructor", "declare", "get", "module", "require",
    "number", "set", "string", "symbol", "type", "from", "of",
];

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break",
    "class", "continue", "def", "del", "elif", "else", "except", "finally",
    "for", "from", "global", "if", "import", "in", "is", "lambda", "nonlocal",
    "not", "or", "pass", "raise", "return", "try", "while", "with", "yield",
];
