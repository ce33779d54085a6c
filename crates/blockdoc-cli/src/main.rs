//! blockdoc CLI - build documentation from comment blocks in source files

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blockdoc_core::{AdapterTable, Config, ObjectKind, Project, Resolver, CONFIG_FILE};

/// Environment variable holding a log filter, e.g. `blockdoc_core=debug`
const LOG_ENV: &str = "BLOCKDOC_LOG";

#[derive(Parser)]
#[command(name = "blockdoc")]
#[command(version = blockdoc_core::VERSION)]
#[command(about = "Documentation extracted from tagged source comments", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build Markdown pages, object indices and the object inventory
    Build {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Configuration file (defaults to blockdoc.toml in the project root)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report every unresolved reference
        #[arg(long)]
        nitpicky: bool,

        /// Reject a second declaration of the same object
        #[arg(long)]
        strict_duplicates: bool,

        /// Read documents on a single thread
        #[arg(long)]
        sequential: bool,

        /// Exit with an error when any diagnostic was reported
        #[arg(short = 'W', long)]
        warnings_as_errors: bool,
    },

    /// Print the structured text extracted from one source file
    Extract {
        /// Source file
        file: PathBuf,
    },

    /// List every registered documentation object
    Objects {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Only list objects of this kind
        #[arg(short, long)]
        kind: Option<ObjectKind>,

        /// Print the inventory as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a cross-reference the way a role would
    Resolve {
        /// Object kind (event, dbtable, modsetting)
        kind: ObjectKind,

        /// Reference target, `database.table` for tables
        target: String,

        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            path,
            config,
            output,
            nitpicky,
            strict_duplicates,
            sequential,
            warnings_as_errors,
        } => {
            let mut config = load_config(&path, config.as_deref())?;
            config.build.nitpicky |= nitpicky;
            config.build.strict_duplicates |= strict_duplicates;
            if sequential {
                config.build.parallel = false;
            }
            build(&path, config, output, warnings_as_errors)?;
        }

        Commands::Extract { file } => {
            extract_file(&file)?;
        }

        Commands::Objects { path, kind, json } => {
            list_objects(&path, kind, json)?;
        }

        Commands::Resolve { kind, target, path } => {
            resolve_reference(&path, kind, &target)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn load_config(root: &Path, explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load configuration '{}'", path.display())),
        None => Config::discover(root).with_context(|| {
            format!("Failed to load {} in '{}'", CONFIG_FILE, root.display())
        }),
    }
}

fn open_project(root: &Path) -> Result<Project> {
    if !root.is_dir() {
        bail!("Project directory '{}' does not exist", root.display());
    }
    Project::load(root).with_context(|| format!("Failed to open project '{}'", root.display()))
}

fn build(root: &Path, config: Config, output: Option<PathBuf>, warnings_as_errors: bool) -> Result<()> {
    if !root.is_dir() {
        bail!("Project directory '{}' does not exist", root.display());
    }

    let project = Project::new(root, config)?;
    let output_dir = output.unwrap_or_else(|| project.output_dir());
    let result = project.build().context("Build failed")?;

    for diagnostic in &result.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    result
        .write_to(&output_dir)
        .with_context(|| format!("Failed to write output to '{}'", output_dir.display()))?;

    println!(
        "Documented {} objects in {} pages -> {}",
        result.registry.len(),
        result.pages.len(),
        output_dir.display()
    );

    if warnings_as_errors && !result.diagnostics.is_empty() {
        bail!("{} warning(s) treated as errors", result.diagnostics.len());
    }
    Ok(())
}

fn extract_file(file: &Path) -> Result<()> {
    let config = load_config(Path::new("."), None)?;
    let adapters = AdapterTable::from_config(&config)?;
    let Some(adapter) = adapters.for_path(file) else {
        bail!("No source adapter handles '{}'", file.display());
    };

    let bytes = std::fs::read(file).with_context(|| format!("Failed to read '{}'", file.display()))?;
    let raw = String::from_utf8_lossy(&bytes);

    match adapter.read(&raw) {
        Some(text) => print!("{}", text),
        None => bail!("No documentation blocks in '{}'", file.display()),
    }
    Ok(())
}

fn list_objects(root: &Path, kind: Option<ObjectKind>, json: bool) -> Result<()> {
    let project = open_project(root)?;
    let (registry, diagnostics) = project.collect()?;
    for diagnostic in &diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    if json {
        let objects: Vec<_> = registry
            .objects()
            .filter(|o| kind.map_or(true, |k| o.kind == k))
            .collect();
        println!("{}", serde_json::to_string_pretty(&objects)?);
        return Ok(());
    }

    for object in registry.objects().filter(|o| kind.map_or(true, |k| o.kind == k)) {
        println!(
            "{:<10} {:<48} {}#{}",
            object.kind.as_str(),
            object.qualified_name,
            object.docname,
            object.anchor
        );
    }
    Ok(())
}

fn resolve_reference(root: &Path, kind: ObjectKind, target: &str) -> Result<()> {
    let project = open_project(root)?;
    if project.host().domain().role(kind.as_str()).is_none() {
        bail!("'{}' objects cannot be referenced", kind);
    }

    let (registry, _) = project.collect()?;
    match Resolver::new(&registry).resolve(kind, target) {
        Some(found) => {
            println!("{}.md#{}", found.docname, found.anchor);
            Ok(())
        }
        None => bail!("No {} named '{}'", kind, target),
    }
}
