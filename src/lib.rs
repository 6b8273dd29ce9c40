//! Command Tree Compiler
//!
//! Compiles a flat, line-oriented schema of colon-separated command paths
//! into a hierarchical command tree, then renders that tree as JSON and as
//! typed client bindings.
//!
//! ## Features
//!
//! - **Deterministic Output**: Children are ordered by name, so identical
//!   schemas always produce byte-identical artifacts
//! - **Typed Bindings**: Rust, TypeScript and Python, one type per namespace
//! - **Drift Checking**: Compare committed artifacts against a fresh compile
//!
//! ## Schema format
//!
//! ```text
//! volt:dc
//! volt:ac?   AC voltage
//! freq
//! ```
//!
//! Each line is one command path. A trailing `?` marks the command required
//! (honoured under [`RequiredPolicy::Marked`]); anything after the path is
//! kept as a doc string for the generated accessors.
//!
//! ## Example
//!
//! ```
//! use cmdtree::{render_json, CommandTree, OutputFormat};
//!
//! let tree = CommandTree::parse("volt:dc\nfreq\n").unwrap();
//! let json = render_json(&tree, OutputFormat::Compact).unwrap();
//! assert!(json.starts_with("{\"tree\":{\"freq\":"));
//! ```

pub mod checksum;
pub mod codegen;
pub mod compile;
pub mod config;
pub mod error;
pub mod json;
pub mod schema;

pub use checksum::Checksum;
pub use codegen::{render_binding, Language, RenderProfile};
pub use compile::{check_drift, Artifacts, Compiler, DriftReport, DriftStatus, OutputPaths};
pub use config::{CompilerConfig, OutputFormat};
pub use error::{CompileError, Result};
pub use json::render_json;
pub use schema::{CommandEntry, CommandNode, CommandTree, RequiredPolicy};
