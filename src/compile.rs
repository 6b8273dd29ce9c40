//! Compile pipeline: schema text in, JSON tree and bindings out
//!
//! Artifacts are rendered in memory first and only touch the filesystem
//! through [`Artifacts::write`], which replaces each target atomically.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use similar::TextDiff;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::checksum::Checksum;
use crate::codegen::{self, Language, RenderProfile};
use crate::config::{CompilerConfig, OutputConfig, OutputFormat};
use crate::error::{CompileError, Result};
use crate::json;
use crate::schema::{CommandTree, RequiredPolicy};

/// Compiles schema text with a fixed set of options
#[derive(Debug, Clone)]
pub struct Compiler {
    policy: RequiredPolicy,
    root_type: String,
    profile: RenderProfile,
    format: OutputFormat,
}

impl Compiler {
    pub fn new(root_type: impl Into<String>, profile: RenderProfile) -> Self {
        Self {
            policy: RequiredPolicy::default(),
            root_type: root_type.into(),
            profile,
            format: OutputFormat::default(),
        }
    }

    pub fn from_config(config: &CompilerConfig) -> Self {
        Self {
            policy: config.parse.required_policy,
            root_type: config.codegen.root_type.clone(),
            profile: config.codegen.profile(),
            format: config.output.format,
        }
    }

    pub fn with_policy(mut self, policy: RequiredPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn root_type(&self) -> &str {
        &self.root_type
    }

    pub fn profile(&self) -> &RenderProfile {
        &self.profile
    }

    /// Parse schema text under this compiler's required policy
    pub fn parse(&self, schema_text: &str) -> Result<CommandTree> {
        CommandTree::parse_with(schema_text, self.policy)
    }

    /// Parse and render both artifacts
    pub fn compile(&self, schema_text: &str) -> Result<Artifacts> {
        let tree = self.parse(schema_text)?;
        self.render(&tree)
    }

    /// Render both artifacts for an already built tree
    pub fn render(&self, tree: &CommandTree) -> Result<Artifacts> {
        let json = json::render_json(tree, self.format)?;
        let generated = codegen::generate(tree, &self.root_type, &self.profile)?;

        info!(
            commands = tree.command_count(),
            types = generated.type_count,
            accessors = generated.accessor_count,
            language = ?generated.language,
            fingerprint = %generated.fingerprint.short(),
            "compiled command tree"
        );

        Ok(Artifacts {
            json,
            binding: generated.code,
            language: generated.language,
            fingerprint: generated.fingerprint,
        })
    }
}

/// Where compiled artifacts go; `None` skips that artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPaths {
    pub json: Option<PathBuf>,
    pub bindings: Option<PathBuf>,
}

impl From<&OutputConfig> for OutputPaths {
    fn from(config: &OutputConfig) -> Self {
        Self {
            json: config.json.clone(),
            bindings: config.bindings.clone(),
        }
    }
}

/// Rendered output of one compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub json: String,
    pub binding: String,
    pub language: Language,
    /// Fingerprint of the tree both artifacts were rendered from
    pub fingerprint: Checksum,
}

impl Artifacts {
    /// Write the selected artifacts, returning the paths written.
    ///
    /// Either every selected artifact is replaced or none is: all contents
    /// are staged in temporary files before the first target is touched,
    /// and targets already replaced are restored if a later one fails.
    pub fn write(&self, paths: &OutputPaths) -> Result<Vec<PathBuf>> {
        let mut targets = Vec::new();
        if let Some(path) = &paths.json {
            targets.push((path.as_path(), self.json.as_str()));
        }
        if let Some(path) = &paths.bindings {
            targets.push((path.as_path(), self.binding.as_str()));
        }
        write_all_atomic(&targets)
    }
}

/// Replace `path` with `content` via a temporary file in the same directory
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    write_all_atomic(&[(path, content)]).map(|_| ())
}

/// A target staged in a temporary file, plus what it replaces
struct StagedWrite<'a> {
    path: &'a Path,
    file: NamedTempFile,
    previous: Option<Vec<u8>>,
    bytes: usize,
}

fn write_all_atomic(targets: &[(&Path, &str)]) -> Result<Vec<PathBuf>> {
    let mut staged = Vec::with_capacity(targets.len());
    for &(path, content) in targets {
        staged.push(stage(path, content)?);
    }

    let mut committed: Vec<(&Path, Option<Vec<u8>>)> = Vec::new();
    for write in staged {
        let StagedWrite { path, file, previous, bytes } = write;
        if let Err(e) = file.persist(path) {
            rollback(&committed);
            return Err(CompileError::Persist {
                path: path.display().to_string(),
                source: e.error,
            });
        }
        debug!(path = %path.display(), bytes, "wrote artifact");
        committed.push((path, previous));
    }

    Ok(committed.into_iter().map(|(path, _)| path.to_path_buf()).collect())
}

fn stage<'a>(path: &'a Path, content: &str) -> Result<StagedWrite<'a>> {
    if path.is_dir() {
        return Err(CompileError::Persist {
            path: path.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "target is a directory"),
        });
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let previous = match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    let mut file = NamedTempFile::new_in(&dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;

    Ok(StagedWrite {
        path,
        file,
        previous,
        bytes: content.len(),
    })
}

/// Put back what committed writes replaced; best effort
fn rollback(committed: &[(&Path, Option<Vec<u8>>)]) {
    for (path, previous) in committed.iter().rev() {
        let restored = match previous {
            Some(bytes) => fs::write(path, bytes),
            None => fs::remove_file(path),
        };
        if let Err(e) = restored {
            warn!(path = %path.display(), error = %e, "failed to roll back artifact");
        }
    }
}

// =============================================================================
// Drift
// =============================================================================

/// State of a committed artifact relative to a fresh render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftStatus {
    UpToDate,
    Stale,
    Missing,
}

/// Result of comparing an expected artifact with the file on disk
#[derive(Debug, Clone)]
pub struct DriftReport {
    pub path: PathBuf,
    pub status: DriftStatus,
    pub expected: Checksum,
    /// Checksum of the file on disk, if it exists
    pub actual: Option<Checksum>,
    /// Unified diff from the file on disk to the expected content
    pub diff: Option<String>,
}

impl DriftReport {
    pub fn is_stale(&self) -> bool {
        self.status != DriftStatus::UpToDate
    }
}

/// Compare `expected` with the contents of `path`
pub fn check_drift(expected: &str, path: &Path) -> Result<DriftReport> {
    let expected_checksum = Checksum::from_str(expected);

    let actual = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "artifact is missing");
            return Ok(DriftReport {
                path: path.to_path_buf(),
                status: DriftStatus::Missing,
                expected: expected_checksum,
                actual: None,
                diff: None,
            });
        }
        Err(e) => return Err(e.into()),
    };

    if expected_checksum.verify(&actual) {
        debug!(path = %path.display(), "artifact is up to date");
        return Ok(DriftReport {
            path: path.to_path_buf(),
            status: DriftStatus::UpToDate,
            expected: expected_checksum,
            actual: Some(Checksum::from_str(&actual)),
            diff: None,
        });
    }

    let name = path.display().to_string();
    let diff = TextDiff::from_lines(actual.as_str(), expected)
        .unified_diff()
        .context_radius(3)
        .header(&name, &format!("{} (expected)", name))
        .to_string();

    warn!(path = %path.display(), "artifact is stale");
    Ok(DriftReport {
        path: path.to_path_buf(),
        status: DriftStatus::Stale,
        expected: expected_checksum,
        actual: Some(Checksum::from_str(&actual)),
        diff: Some(diff),
    })
}
