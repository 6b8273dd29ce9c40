//! Configuration management for the compiler
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (cmdtree.toml)
//! - Environment variables (CMDTREE__*)
//!
//! ## Example config file (cmdtree.toml):
//! ```toml
//! [parse]
//! required_policy = "always"
//!
//! [codegen]
//! root_type = "Keysight53220A"
//! language = "rust"
//! emit_handle = true
//!
//! [output]
//! json = "api.json"
//! bindings = "src/api.rs"
//! format = "pretty"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codegen::{Language, NamingConfig, RenderProfile};
use crate::schema::RequiredPolicy;

/// Main configuration for the compiler
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Schema parsing settings
    #[serde(default)]
    pub parse: ParseConfig,

    /// Binding generation settings
    #[serde(default)]
    pub codegen: CodegenConfig,

    /// Output destinations
    #[serde(default)]
    pub output: OutputConfig,
}

/// Parse configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// How `required` flags are derived
    #[serde(default)]
    pub required_policy: RequiredPolicy,
}

/// Codegen configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodegenConfig {
    /// Name of the generated root type
    #[serde(default = "default_root_type")]
    pub root_type: String,

    /// Target language
    #[serde(default)]
    pub language: Language,

    /// Declare the Handle capability in the generated file
    #[serde(default = "default_true")]
    pub emit_handle: bool,

    /// Naming conventions
    #[serde(default)]
    pub naming: NamingConfig,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where to write the JSON tree
    #[serde(default)]
    pub json: Option<PathBuf>,

    /// Where to write the generated bindings
    #[serde(default)]
    pub bindings: Option<PathBuf>,

    /// JSON output format (pretty or compact)
    #[serde(default = "default_output_format")]
    pub format: OutputFormat,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

// Default value functions
fn default_root_type() -> String {
    "Api".to_string()
}

fn default_true() -> bool {
    true
}

fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self {
            root_type: default_root_type(),
            language: Language::default(),
            emit_handle: true,
            naming: NamingConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: None,
            bindings: None,
            format: OutputFormat::Pretty,
        }
    }
}

impl CodegenConfig {
    /// Render profile for the configured language
    pub fn profile(&self) -> RenderProfile {
        RenderProfile::for_language(self.language)
            .with_naming(self.naming.clone())
            .with_emit_handle(self.emit_handle)
    }
}

impl CompilerConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering a specific file over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        // Load from default locations
        let config_locations = [
            "cmdtree.toml",
            ".cmdtree.toml",
            "config/cmdtree.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "cmdtree", "cmdtree") {
            let xdg_config = config_dir.config_dir().join("cmdtree.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        // Load from specified path
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // Load from environment variables (CMDTREE__*)
        builder = builder.add_source(
            Environment::with_prefix("CMDTREE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
