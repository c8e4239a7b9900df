//! flint-sim - run a particle scene headlessly and report per-frame statistics

mod report;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use flint_particles::{ParticleRng, Scene};
use glam::Vec3;
use report::{FrameReport, RunReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "flint-sim")]
#[command(about = "Run a Flint particle scene without a renderer", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the scene file
    scene: String,

    /// Number of frames to simulate
    #[arg(long, default_value = "60")]
    frames: u32,

    /// Frame delta in seconds
    #[arg(long, default_value = "0.016666668")]
    dt: f32,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Override the scene's random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the camera position (comma-separated x,y,z)
    #[arg(long, value_parser = parse_vec3)]
    camera: Option<Vec3>,

    /// Print the scene's named zones as TOML and exit
    #[arg(long)]
    dump_zones: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 3 {
        return Err(format!("expected 3 comma-separated values, got {}", parts.len()));
    }
    let x: f32 = parts[0].trim().parse().map_err(|e| format!("invalid x: {}", e))?;
    let y: f32 = parts[1].trim().parse().map_err(|e| format!("invalid y: {}", e))?;
    let z: f32 = parts[2].trim().parse().map_err(|e| format!("invalid z: {}", e))?;
    Ok(Vec3::new(x, y, z))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut scene = Scene::load(&cli.scene)
        .with_context(|| format!("Failed to load scene '{}'", cli.scene))?;

    if cli.dump_zones {
        let mut root = toml::value::Table::new();
        root.insert("zones".to_string(), toml::Value::Table(scene.zones_to_toml()));
        let output = toml::to_string_pretty(&root).context("Failed to serialize zones")?;
        print!("{output}");
        return Ok(());
    }

    if cli.dt <= 0.0 {
        anyhow::bail!("--dt must be positive, got {}", cli.dt);
    }

    let mut ctx = scene.settings.context();
    if let Some(seed) = cli.seed {
        ctx.rng = ParticleRng::new(seed);
    }
    if let Some(camera) = cli.camera {
        ctx.camera_position = camera;
    }

    log::info!(
        "Running {} frames of {}s in {} step mode",
        cli.frames,
        cli.dt,
        ctx.step.mode().name()
    );

    let mut reports = Vec::new();
    let mut time = 0.0f32;
    for frame in 0..cli.frames {
        let alive = scene.system.update(cli.dt, &mut ctx);
        time += cli.dt;
        let report = FrameReport::capture(frame, time, alive, &scene.system);
        match cli.format {
            OutputFormat::Text => println!("{}", report.to_line()),
            OutputFormat::Json => reports.push(report),
        }
        if !alive {
            log::info!("Every group is dead after frame {frame}");
            break;
        }
    }

    if cli.format == OutputFormat::Json {
        let run = RunReport {
            scene: cli.scene.clone(),
            step_mode: ctx.step.mode(),
            dt: cli.dt,
            frames: reports,
        };
        let output = serde_json::to_string_pretty(&run).context("Failed to serialize reports")?;
        println!("{output}");
    }

    Ok(())
}
