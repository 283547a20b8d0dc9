use anyhow::{Context, Result, bail};
use clap::Parser;
use house::nav::{SearchScratch, compute_path};
use house::{Point, Session, SessionConfig, SessionEvent, TilePos};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Drive sessions with a scripted player and check invariants",
    long_about = None
)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 8)]
    runs: u64,
    #[arg(short, long, default_value_t = 3_000)]
    ticks: u32,
}

/// Walks the player along a precomputed route toward the exit.
struct ScriptedPlayer {
    route: Vec<TilePos>,
    next: usize,
    pos: Point,
}

impl ScriptedPlayer {
    fn plan(session: &Session, scratch: &mut SearchScratch) -> Self {
        let state = session.state();
        let route = compute_path(&state.grid, state.spawn, state.exit[0], None, scratch);
        Self { route, next: 1, pos: state.spawn.center() }
    }

    fn walk(&mut self, distance: f64) {
        let Some(target) = self.route.get(self.next).map(|pos| pos.center()) else {
            return;
        };
        let (dx, dy) = (target.x - self.pos.x, target.y - self.pos.y);
        let remaining = dx.hypot(dy);
        if remaining <= distance {
            self.pos = target;
            self.next += 1;
        } else {
            let scale = distance / remaining;
            self.pos = Point::new(self.pos.x + dx * scale, self.pos.y + dy * scale);
        }
    }
}

#[derive(Default)]
struct SoakStats {
    levels_built: u32,
    exits: u32,
    catches: u32,
    decision_ticks: u32,
}

fn check_invariants(session: &Session) -> Result<()> {
    let grid = &session.state().grid;
    for (id, agent) in &session.state().agents {
        if !agent.pos.is_finite() {
            bail!("agent {id:?} has a non-finite position {:?}", agent.pos);
        }
        if !grid.in_bounds(agent.pos.cell()) {
            bail!("agent {id:?} left the grid at {:?}", agent.pos);
        }
        if !(0.0..360.0).contains(&agent.heading) {
            bail!("agent {id:?} heading {} out of range", agent.heading);
        }
    }
    if !session.scratch_is_clean() {
        bail!("session search scratch left dirty");
    }
    Ok(())
}

fn soak(seed: u64, ticks: u32, stats: &mut SoakStats) -> Result<()> {
    let mut session = Session::new(seed, SessionConfig::default())
        .with_context(|| format!("Failed to start session on seed {seed}"))?;
    let mut scratch = SearchScratch::new(session.state().grid.len());
    let mut player = ScriptedPlayer::plan(&session, &mut scratch);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let dt = 1.0 / 30.0;

    for _ in 0..ticks {
        // Jitter the walking speed between 2 and 4 tiles per second.
        let jitter = (rng.next_u64() % 1_000) as f64 / 1_000.0;
        player.walk((2.0 + jitter * 2.0) * dt);

        let report = session
            .update(dt, player.pos)
            .with_context(|| format!("Level rebuild failed on seed {seed}"))?;
        stats.decision_ticks += report.decision_ticks;
        for event in report.events {
            match event {
                SessionEvent::LevelBuilt { difficulty, .. } => {
                    stats.levels_built += 1;
                    scratch = SearchScratch::new(session.state().grid.len());
                    player = ScriptedPlayer::plan(&session, &mut scratch);
                    info!(seed, difficulty, "scripted player replanned");
                }
                SessionEvent::ExitReached => stats.exits += 1,
                SessionEvent::PlayerCaught { .. } => stats.catches += 1,
            }
        }
        check_invariants(&session).with_context(|| {
            format!("Invariant failed on seed {seed} at difficulty {}", session.difficulty())
        })?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).try_init();
    let args = Args::parse();

    println!(
        "Starting soak on seeds {}..{} for {} ticks each...",
        args.seed,
        args.seed + args.runs,
        args.ticks
    );
    let mut stats = SoakStats::default();
    for seed in args.seed..args.seed + args.runs {
        soak(seed, args.ticks, &mut stats)?;
    }
    println!(
        "Soak finished: {} rebuilds, {} exits, {} catches, {} decision ticks",
        stats.levels_built, stats.exits, stats.catches, stats.decision_ticks
    );
    Ok(())
}
