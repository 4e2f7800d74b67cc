//! Command-line entry point for mesh comparison runs.
//!
//! # Commands
//!
//! - `mesh-diff compare <MESH1> <MESH2>` - align, compare and measure a pair
//! - `mesh-diff measure <MESH>` - measure a single mesh
//! - `mesh-diff batch <MANIFEST>` - run every `[[job]]` of a manifest
//! - `mesh-diff config` - print the default configuration as TOML

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use mesh_diff::{BatchManifest, DiffConfig, measure_to_directory, run_batch, run_to_directory};
use tracing_subscriber::EnvFilter;

/// Detect changes between two scans of the same object
#[derive(Parser)]
#[command(name = "mesh-diff")]
#[command(about = "Align two meshes and report where they differ", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align MESH2 onto MESH1, compare them and write all artifacts
    Compare {
        /// Reference mesh (OBJ or STL)
        #[arg(name = "MESH1")]
        mesh1: PathBuf,

        /// Mesh compared against the reference
        #[arg(name = "MESH2")]
        mesh2: PathBuf,

        /// Artifact directory
        #[arg(short, long, default_value = "mesh-diff-out")]
        output: PathBuf,

        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the sampling seed
        #[arg(long)]
        seed: Option<u64>,

        /// Exit with a failure status if any stage fell back
        #[arg(long)]
        strict: bool,
    },

    /// Measure one mesh and write its measurement artifacts
    Measure {
        /// Mesh to measure
        #[arg(name = "MESH")]
        mesh: PathBuf,

        /// Artifact directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Name used in artifact file names (defaults to the file stem)
        #[arg(long)]
        name: Option<String>,
    },

    /// Run every job of a TOML manifest in parallel
    Batch {
        /// Manifest with one `[[job]]` table per mesh pair
        #[arg(name = "MANIFEST")]
        manifest: PathBuf,

        /// TOML configuration file shared by all jobs
        #[arg(long)]
        config: Option<PathBuf>,

        /// Exit with a failure status if any job degraded or failed
        #[arg(long)]
        strict: bool,
    },

    /// Print the default configuration
    Config,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<DiffConfig> {
    match path {
        Some(path) => DiffConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(DiffConfig::default()),
    }
}

fn compare(
    mesh1: &Path,
    mesh2: &Path,
    output: &Path,
    config: &DiffConfig,
    strict: bool,
) -> Result<ExitCode> {
    let run = run_to_directory(mesh1, mesh2, output, config)
        .with_context(|| format!("writing artifacts to {}", output.display()))?;

    println!("Artifacts written to {}", output.display());
    for failure in &run.failures {
        println!("  degraded: {failure}");
    }
    for line in mesh_diff::report::interpretation(&run) {
        println!("  {line}");
    }

    if strict && run.is_degraded() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn measure(mesh: &Path, output: &Path, name: Option<String>) -> Result<ExitCode> {
    let name = match name {
        Some(name) => name,
        None => mesh
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .context("mesh path has no file name")?,
    };
    let metrics = measure_to_directory(mesh, output, &name)
        .with_context(|| format!("writing artifacts to {}", output.display()))?;

    match metrics {
        Some(m) => {
            println!(
                "{name}: area {:.6}, volume {:.6}, {} triangles, watertight: {}",
                m.surface_area, m.volume, m.triangle_count, m.is_watertight
            );
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("{name}: measurement failed, see {name}_measure_error.txt");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn batch(manifest: &Path, config: &DiffConfig, strict: bool) -> Result<ExitCode> {
    let manifest = BatchManifest::from_file(manifest)
        .with_context(|| format!("loading manifest {}", manifest.display()))?;
    if manifest.jobs.is_empty() {
        bail!("manifest has no [[job]] entries");
    }

    let results = run_batch(&manifest.jobs, config);
    let mut clean = true;
    for (job, result) in manifest.jobs.iter().zip(&results) {
        match result {
            Ok(run) if run.is_degraded() => {
                clean = false;
                println!("{}: degraded ({} stages)", job.output_dir.display(), run.failures.len());
            }
            Ok(_) => println!("{}: ok", job.output_dir.display()),
            Err(err) => {
                clean = false;
                println!("{}: failed: {err}", job.output_dir.display());
            }
        }
    }

    if strict && !clean {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compare {
            mesh1,
            mesh2,
            output,
            config,
            seed,
            strict,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(seed) = seed {
                config.seed = seed;
            }
            compare(&mesh1, &mesh2, &output, &config, strict)
        }
        Commands::Measure { mesh, output, name } => measure(&mesh, &output, name),
        Commands::Batch {
            manifest,
            config,
            strict,
        } => batch(&manifest, &load_config(config.as_deref())?, strict),
        Commands::Config => {
            print!("{}", DiffConfig::default().to_toml_string()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
