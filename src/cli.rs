//! Command-line surface: argument types and the three subcommands.
//!
//! Every command returns `anyhow::Result`; the binary maps `Err` to exit code 1.

use crate::ap_loader::{ApLoad, load_ap_file};
use crate::config::{EngineKind, SimConfig};
use crate::engine::select_engine;
use crate::error::LoadError;
use crate::material::MaterialType;
use crate::scene::{self, SceneDescriptor};
use crate::sim::{self, SimProps, Simulation};
use crate::sim_op::{self, CoverageOp};
use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ap-coverage", version, about = "Wi-Fi access point coverage estimator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check an AP coordinate file and list its records
    Validate {
        #[arg(long)]
        ap_file: PathBuf,
    },
    /// Summarize an XML building scene
    Scene {
        #[arg(long)]
        scene: PathBuf,
    },
    /// Estimate coverage and write maps and reports
    Simulate(SimulateArgs),
}

#[derive(Args)]
pub struct SimulateArgs {
    #[arg(long)]
    pub ap_file: PathBuf,

    /// Optional XML building scene
    #[arg(long)]
    pub scene: Option<PathBuf>,

    #[arg(long, default_value = "coverage_output")]
    pub output_dir: PathBuf,

    /// JSON run configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Grid resolution in meters, overrides the config
    #[arg(long)]
    pub resolution: Option<f64>,

    /// estimator, external or auto
    #[arg(long)]
    pub engine: Option<String>,
}

/// Loads the AP file, printing every rejected row
fn load_transmitters(path: &Path) -> anyhow::Result<ApLoad> {
    match load_ap_file(path) {
        Ok(load) => {
            for diagnostic in &load.diagnostics {
                println!("   {} {}", "⚠️".yellow(), diagnostic);
            }
            Ok(load)
        }
        Err(LoadError::NoValidRows { path, diagnostics }) => {
            for diagnostic in &diagnostics {
                println!("   {} {}", "❌".red(), diagnostic);
            }
            bail!("no valid AP records in {}", path.display())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn validate(ap_file: &Path) -> anyhow::Result<()> {
    println!("🔍 Validating {}", ap_file.display());
    let load = load_transmitters(ap_file)?;

    for tx in &load.transmitters {
        let p = tx.position();
        println!("   📡 {}: ({:.1}, {:.1}, {:.1})", tx.name(), p.x, p.y, p.z);
    }
    let summary = format!(
        "{} valid APs, {} rejected rows",
        load.transmitters.len(),
        load.diagnostics.len()
    );
    if load.is_clean() {
        println!("{} {}", "✅".green(), summary.green());
    } else {
        println!("{} {}", "⚠️".yellow(), summary.yellow());
    }
    Ok(())
}

fn print_scene(scene: &SceneDescriptor) {
    let tags: Vec<&str> = scene.material_tags.iter().map(MaterialType::as_str).collect();
    println!("🏢 Scene {}", scene.path.display());
    println!("   Size: {} bytes", scene.size_bytes);
    println!(
        "   Format: {}",
        if scene.valid_format { "valid".green() } else { "unrecognised".yellow() }
    );
    if let Some(version) = &scene.version {
        println!("   Version: {}", version);
    }
    println!("   Shapes: {}", scene.shape_count);
    println!("   Materials: [{}]", tags.join(", "));
    if let Some(dominant) = scene.dominant_material() {
        println!("   Dominant wall material: {}", dominant.as_str());
    }
    let b = &scene.bounds;
    println!(
        "   Bounds: x {:.1}..{:.1}, y {:.1}..{:.1}{}",
        b.x_min,
        b.x_max,
        b.y_min,
        b.y_max,
        if scene.used_default_bounds { " (default)" } else { "" }
    );
}

pub fn describe_scene(path: &Path) -> anyhow::Result<()> {
    if !path.is_file() {
        bail!("scene file not found: {}", path.display());
    }
    print_scene(&scene::load_or_default(path));
    Ok(())
}

/// Loads, simulates and writes every artifact into `args.output_dir`.
///
/// The output directory is created only after the AP file loads and the
/// grid fits within the cell limit.
pub fn run_simulate(args: SimulateArgs) -> anyhow::Result<Simulation> {
    let mut config = match &args.config {
        Some(path) => SimConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
        None => SimConfig::default(),
    };
    if let Some(resolution) = args.resolution {
        config.grid_resolution_m = resolution;
    }
    if let Some(engine) = &args.engine {
        config.engine.kind = EngineKind::from_str(engine)
            .with_context(|| format!("unknown engine '{}' (expected estimator, external or auto)", engine))?;
    }
    config.validate()?;

    println!("🚀 Loading access points from {}", args.ap_file.display());
    let load = load_transmitters(&args.ap_file)?;
    println!("   📡 {} access points", load.transmitters.len());

    let scene = args.scene.as_deref().map(scene::load_or_default);
    if let Some(scene) = &scene {
        print_scene(scene);
    }

    // reject an unusable grid before touching the output directory
    sim::grid_for(&config, &load.transmitters, scene.as_ref())?;

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating output directory {}", args.output_dir.display()))?;
    let engine = select_engine(&config.engine, args.scene.as_deref(), &args.output_dir)?;

    let mut ops = vec![CoverageOp::handle(engine)];
    ops.extend(sim_op::output_ops());

    let mut sim = Simulation::new(SimProps {
        name: args
            .ap_file
            .file_stem()
            .map_or_else(|| "coverage".to_string(), |s| s.to_string_lossy().into_owned()),
        config,
        transmitters: load.transmitters,
        scene,
        output_dir: args.output_dir.clone(),
        ops,
    })?;
    sim.run()?;

    println!("\n📁 Artifacts in {}:", args.output_dir.display());
    for artifact in &sim.artifacts {
        let name = artifact.file_name().map_or_else(|| artifact.display().to_string(), |n| n.to_string_lossy().into_owned());
        println!("   ✅ {}", name);
    }
    println!(
        "{}",
        "Note: coverage values are a coarse path-loss estimate, not ray tracing.".dimmed()
    );
    Ok(sim)
}

/// Dispatches a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Validate { ap_file } => validate(&ap_file),
        Commands::Scene { scene } => describe_scene(&scene),
        Commands::Simulate(args) => run_simulate(args).map(|_| ()),
    }
}
