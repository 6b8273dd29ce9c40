//! Error types for the command-tree compiler

use thiserror::Error;

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;

/// Compiler errors
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Schema syntax error on line {line}: {reason} (`{text}`)")]
    SchemaSyntax {
        /// 1-based line number
        line: usize,
        /// Raw line text
        text: String,
        reason: String,
    },

    #[error("Unrenderable name for `{path}`: `{ident}` {reason}")]
    UnrenderableName {
        /// Colon-joined command path
        path: String,
        /// Identifier produced from the path
        ident: String,
        reason: String,
    },

    #[error("Invalid command tree: {0}")]
    InvalidTree(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub(crate) fn syntax(line: usize, text: &str, reason: impl Into<String>) -> Self {
        Self::SchemaSyntax {
            line,
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unrenderable(path: &str, ident: &str, reason: impl Into<String>) -> Self {
        Self::UnrenderableName {
            path: path.to_string(),
            ident: ident.to_string(),
            reason: reason.into(),
        }
    }
}
