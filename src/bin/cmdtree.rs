//! Command Tree Compiler CLI
//!
//! Compiles a colon-path command schema into a JSON tree and typed bindings.
//!
//! Usage:
//!   cmdtree compile commands.txt --json api.json --bindings src/api.rs
//!   cmdtree json commands.txt
//!   cmdtree bindings --from-json api.json --language typescript
//!   cmdtree check commands.txt
//!   cmdtree config show

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use cmdtree::{
    check_drift, render_json, Artifacts, CommandTree, Compiler, CompilerConfig, DriftReport,
    DriftStatus, Language, OutputFormat, OutputPaths, RequiredPolicy,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cmdtree")]
#[command(about = "Compile colon-path command schemas into JSON trees and typed bindings")]
struct Cli {
    /// Config file layered over the default locations
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a schema and write the JSON tree and bindings
    Compile {
        #[command(flatten)]
        input: SchemaInput,

        #[command(flatten)]
        codegen: CodegenArgs,

        /// Where to write the JSON tree
        #[arg(long)]
        json: Option<PathBuf>,

        /// Where to write the bindings
        #[arg(long)]
        bindings: Option<PathBuf>,

        /// JSON output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print the JSON tree for a schema
    Json {
        #[command(flatten)]
        input: SchemaInput,

        /// JSON output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print bindings for a schema or a JSON tree
    Bindings {
        /// Schema file ("-" for stdin)
        #[arg(conflicts_with = "from_json")]
        schema: Option<PathBuf>,

        /// Read a JSON tree instead of a schema
        #[arg(long)]
        from_json: Option<PathBuf>,

        /// How `required` flags are derived
        #[arg(long, value_enum)]
        required_policy: Option<RequiredPolicy>,

        #[command(flatten)]
        codegen: CodegenArgs,
    },

    /// Check committed artifacts against a fresh compile
    Check {
        #[command(flatten)]
        input: SchemaInput,

        #[command(flatten)]
        codegen: CodegenArgs,

        /// Committed JSON tree
        #[arg(long)]
        json: Option<PathBuf>,

        /// Committed bindings
        #[arg(long)]
        bindings: Option<PathBuf>,

        /// JSON output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Print a unified diff for stale artifacts
        #[arg(long)]
        diff: bool,
    },

    /// Inspect or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Destination
        #[arg(default_value = "cmdtree.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct SchemaInput {
    /// Schema file ("-" or omitted for stdin)
    schema: Option<PathBuf>,

    /// How `required` flags are derived
    #[arg(long, value_enum)]
    required_policy: Option<RequiredPolicy>,
}

#[derive(Args)]
struct CodegenArgs {
    /// Name of the generated root type
    #[arg(long)]
    root_type: Option<String>,

    /// Target language
    #[arg(short, long, value_enum)]
    language: Option<Language>,

    /// Expect a `Handle` declared elsewhere instead of emitting one
    #[arg(long)]
    no_handle: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("cmdtree=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref().map(path_str).transpose()?;
    let mut config = CompilerConfig::load_from(config_path)
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Compile { input, codegen, json, bindings, format } => {
            apply_input(&mut config, &input);
            apply_codegen(&mut config, &codegen);
            apply_output(&mut config, json, bindings, format);

            let artifacts = compile(&config, &input)?;
            let paths = OutputPaths::from(&config.output);
            if paths.json.is_none() && paths.bindings.is_none() {
                bail!("No output paths; pass --json/--bindings or set [output] in cmdtree.toml");
            }

            for path in artifacts.write(&paths)? {
                println!("✅ Wrote {}", path.display());
            }
        }

        Command::Json { input, format } => {
            apply_input(&mut config, &input);
            if let Some(format) = format {
                config.output.format = format;
            }

            let tree = parse_schema(&config, &input)?;
            println!("{}", render_json(&tree, config.output.format)?);
        }

        Command::Bindings { schema, from_json, required_policy, codegen } => {
            if let Some(policy) = required_policy {
                config.parse.required_policy = policy;
            }
            apply_codegen(&mut config, &codegen);

            let tree = match from_json {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    CommandTree::from_json(&text)
                        .with_context(|| format!("Invalid JSON tree in {}", path.display()))?
                }
                None => {
                    let text = read_schema(schema.as_deref())?;
                    Compiler::from_config(&config).parse(&text)?
                }
            };

            let artifacts = Compiler::from_config(&config).render(&tree)?;
            print!("{}", artifacts.binding);
        }

        Command::Check { input, codegen, json, bindings, format, diff } => {
            apply_input(&mut config, &input);
            apply_codegen(&mut config, &codegen);
            apply_output(&mut config, json, bindings, format);

            let artifacts = compile(&config, &input)?;
            let reports = check_all(&artifacts, &OutputPaths::from(&config.output))?;
            if reports.is_empty() {
                bail!("Nothing to check; pass --json/--bindings or set [output] in cmdtree.toml");
            }

            let mut stale = 0;
            for report in &reports {
                print_report(report, diff);
                if report.is_stale() {
                    stale += 1;
                }
            }

            if stale > 0 {
                eprintln!("\n⚠️  {} artifact(s) out of date - run `cmdtree compile`", stale);
                std::process::exit(1);
            }
            eprintln!("\n✅ All artifacts up to date");
        }

        Command::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Init { path, force } => {
                if path.exists() && !force {
                    bail!("{} already exists (use --force to overwrite)", path.display());
                }
                CompilerConfig::default()
                    .save(path_str(&path)?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("✅ Wrote {}", path.display());
            }
        },
    }

    Ok(())
}

fn apply_input(config: &mut CompilerConfig, input: &SchemaInput) {
    if let Some(policy) = input.required_policy {
        config.parse.required_policy = policy;
    }
}

fn apply_codegen(config: &mut CompilerConfig, args: &CodegenArgs) {
    if let Some(root_type) = &args.root_type {
        config.codegen.root_type = root_type.clone();
    }
    if let Some(language) = args.language {
        config.codegen.language = language;
    }
    if args.no_handle {
        config.codegen.emit_handle = false;
    }
}

fn apply_output(
    config: &mut CompilerConfig,
    json: Option<PathBuf>,
    bindings: Option<PathBuf>,
    format: Option<OutputFormat>,
) {
    if json.is_some() {
        config.output.json = json;
    }
    if bindings.is_some() {
        config.output.bindings = bindings;
    }
    if let Some(format) = format {
        config.output.format = format;
    }
}

fn compile(config: &CompilerConfig, input: &SchemaInput) -> Result<Artifacts> {
    let text = read_schema(input.schema.as_deref())?;
    Ok(Compiler::from_config(config).compile(&text)?)
}

fn parse_schema(config: &CompilerConfig, input: &SchemaInput) -> Result<CommandTree> {
    let text = read_schema(input.schema.as_deref())?;
    Ok(Compiler::from_config(config).parse(&text)?)
}

/// Read schema text from a file, or stdin for `-`/no path
fn read_schema(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read schema from stdin")?;
            Ok(text)
        }
    }
}

fn check_all(artifacts: &Artifacts, paths: &OutputPaths) -> Result<Vec<DriftReport>> {
    let mut reports = Vec::new();
    if let Some(path) = &paths.json {
        reports.push(check_drift(&artifacts.json, path)?);
    }
    if let Some(path) = &paths.bindings {
        reports.push(check_drift(&artifacts.binding, path)?);
    }
    Ok(reports)
}

fn print_report(report: &DriftReport, show_diff: bool) {
    match report.status {
        DriftStatus::UpToDate => println!("✅ {} is up to date", report.path.display()),
        DriftStatus::Missing => println!("❌ {} is missing", report.path.display()),
        DriftStatus::Stale => {
            println!("⚠️  {} is stale", report.path.display());
            if show_diff {
                if let Some(diff) = &report.diff {
                    println!("{}", diff);
                }
            }
        }
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))
}
