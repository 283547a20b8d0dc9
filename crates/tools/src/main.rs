use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use house::mapgen::{AgentSpawn, MapGenerator, generate};
use house::{GeneratedLevel, SessionConfig, TilePos, ZoneId};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Generate one house level and print it", long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 0)]
    difficulty: u32,
    /// Optional TOML session config; only its generation table is used
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Print the intermediate projection after every generation phase
    #[arg(long)]
    steps: bool,
    /// Emit a JSON report instead of the ASCII map
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct LevelReport<'a> {
    seed: u64,
    layout_seed: u64,
    difficulty: u32,
    width: usize,
    height: usize,
    fingerprint: String,
    spawn: TilePos,
    spawn_zone: ZoneId,
    exit: [TilePos; 2],
    exit_zone: ZoneId,
    elite: Option<&'a AgentSpawn>,
    agents: &'a [AgentSpawn],
    zone_links: &'a [(ZoneId, ZoneId)],
    diagnostics: Vec<String>,
    rows: Vec<&'a str>,
}

impl<'a> LevelReport<'a> {
    fn new(level: &'a GeneratedLevel, ascii: &'a str) -> Self {
        Self {
            seed: level.seed,
            layout_seed: level.layout_seed,
            difficulty: level.difficulty,
            width: level.grid.width(),
            height: level.grid.height(),
            fingerprint: format!("{:016x}", level.fingerprint()),
            spawn: level.spawn,
            spawn_zone: level.spawn_zone,
            exit: level.exit,
            exit_zone: level.exit_zone,
            elite: level.elite.as_ref(),
            agents: &level.agent_spawns,
            zone_links: &level.zone_links,
            diagnostics: level.diagnostics.iter().map(ToString::to_string).collect(),
            rows: ascii.lines().collect(),
        }
    }
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SessionConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => SessionConfig::default(),
    };
    config.validate().context("Config failed validation")?;

    if args.steps {
        let mut generator = MapGenerator::new(args.seed, args.difficulty, &config.generation);
        while let Some(phase) =
            generator.step().with_context(|| format!("Generation failed on seed {}", args.seed))?
        {
            println!("== {phase:?}");
            println!("{}", generator.projection().to_ascii());
        }
    }

    let level = generate(args.seed, args.difficulty, &config.generation)
        .with_context(|| format!("Failed to generate level for seed {}", args.seed))?;
    let ascii = level.grid.to_ascii();

    if args.json {
        let report = LevelReport::new(&level, &ascii);
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize level report")?;
        println!("{json}");
        return Ok(());
    }

    println!("{ascii}");
    println!(
        "seed {} (layout {}), difficulty {}, {}x{}, fingerprint {:016x}",
        level.seed,
        level.layout_seed,
        level.difficulty,
        level.grid.width(),
        level.grid.height(),
        level.fingerprint()
    );
    println!(
        "spawn {:?} in zone {}, exit {:?} in zone {}",
        level.spawn, level.spawn_zone.0, level.exit, level.exit_zone.0
    );
    println!("{} agents, elite: {}", level.agent_spawns.len(), level.elite.is_some());
    for diagnostic in &level.diagnostics {
        println!("note: {diagnostic}");
    }
    Ok(())
}
