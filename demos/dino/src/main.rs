//! dino — headless run of delayed-jump runners against sliding obstacles.
//!
//! Usage: `dino [config.json]`
//!
//! Every agent's per-episode stats and the process-wide totals go to one
//! `stats.csv` in the configured output directory.  Set `RUST_LOG=debug` to
//! follow the tracked agent's decisions.  With `pause_on_decision` the run
//! stops at each of its decisions and prints the overlay panel before going
//! on.

mod body;
mod csv_sink;
mod overlay;


use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use adt_agent::{EpisodeSummary, stat};
use adt_core::{AgentId, ControlConfig, SimRng, SimTime};
use adt_sim::{RandomPolicy, SimBuilder, SimObserver};
use adt_stats::SharedSink;

use body::DinoBody;
use csv_sink::CsvStatsSink;
use overlay::{DebugOverlay, RoundRobinSelector};

// ── Configuration ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
struct DemoConfig {
    control:           ControlConfig,
    agent_count:       usize,
    jump_probability:  f64,
    output_dir:        PathBuf,
    /// Agent the debug overlay follows first.
    tracked_agent:     u32,
    /// Move the overlay to the next agent when the tracked one's episode ends.
    rotate_overlay:    bool,
    pause_on_decision: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            control:           ControlConfig::default(),
            agent_count:       4,
            jump_probability:  0.3,
            output_dir:        PathBuf::from("output/dino"),
            tracked_agent:     0,
            rotate_overlay:    true,
            pause_on_decision: false,
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: DemoConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

// ── Observer ──────────────────────────────────────────────────────────────────

/// Keeps per-episode rewards and logs progress at each periodic flush.
#[derive(Default)]
struct ProgressObserver {
    episodes:    u64,
    reward_sum:  f64,
    best_reward: Option<f64>,
}

impl SimObserver for ProgressObserver {
    fn on_episode_begin(&mut self, _agent: AgentId, summary: &EpisodeSummary) {
        // Episode 0 has no predecessor to summarise.
        if summary.episode == 0 {
            return;
        }
        self.episodes += 1;
        self.reward_sum += summary.previous_reward;
        let best = self.best_reward.map_or(summary.previous_reward, |b| b.max(summary.previous_reward));
        self.best_reward = Some(best);
    }

    fn on_periodic_flush(&mut self, elapsed: Duration) {
        info!(
            elapsed_secs = elapsed.as_secs_f64(),
            finished_episodes = self.episodes,
            mean_reward = self.mean_reward(),
            "progress"
        );
    }

    fn on_sim_end(&mut self, steps: u64, now: SimTime) {
        info!(steps, %now, finished_episodes = self.episodes, "run complete");
    }
}

impl ProgressObserver {
    fn mean_reward(&self) -> f64 {
        if self.episodes == 0 { 0.0 } else { self.reward_sum / self.episodes as f64 }
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // 1. Configuration.
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = load_config(config_path.as_deref())?;
    config.control.validate()?;
    info!(
        agents = config.agent_count,
        steps = config.control.total_steps,
        seed = config.control.seed,
        "dino starting"
    );

    // 2. Output.
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let stats_path = config.output_dir.join("stats.csv");
    let sink = SharedSink::new(CsvStatsSink::create(&stats_path)?);

    // 3. Agents: one body each, every body with its own obstacle stream.
    let mut world_rng = SimRng::new(config.control.seed);
    let bodies: Vec<_> = (0..config.agent_count)
        .map(|i| (DinoBody::new(world_rng.child(i as u64)), sink.clone()))
        .collect();

    // 4. Build sim.
    let policy = RandomPolicy { jump_probability: config.jump_probability };
    let mut sim = SimBuilder::new(config.control.clone(), policy)
        .agents(bodies)
        .totals_sink(Box::new(sink.clone()))
        .build()?;
    let overlay = Rc::new(RefCell::new(DebugOverlay::attach(
        sim.bus(),
        sim.shared_clock(),
        AgentId(config.tracked_agent),
    )));
    overlay.borrow().set_pause_on_decision(config.pause_on_decision);
    let agent_count = u32::try_from(config.agent_count).context("agent_count out of range")?;
    let _selector = config
        .rotate_overlay
        .then(|| RoundRobinSelector::attach(sim.bus(), &overlay, agent_count));

    // 5. Run.
    let mut progress = ProgressObserver::default();
    let t0 = Instant::now();
    if config.pause_on_decision {
        let real_dt = Duration::try_from_secs_f64(config.control.fixed_delta_secs)?;
        while sim.steps() < config.control.total_steps {
            sim.step(real_dt, &mut progress)?;
            if sim.clock().is_paused() {
                println!("{}
", overlay.borrow().render());
                sim.resume();
            }
        }
        sim.finish(&mut progress);
    } else {
        sim.run(&mut progress)?;
    }
    let wall = t0.elapsed();

    if let Some(err) = sim.take_stats_error() {
        warn!(%err, "some statistics were not written");
    }
    sink.borrow_mut().finish()?;

    // 6. Summary.
    println!("Simulation complete in {:.3} s (wall)", wall.as_secs_f64());
    println!("  simulated time      : {}", sim.clock());
    println!("  finished episodes   : {}", progress.episodes);
    println!("  mean episode reward : {:.3}", progress.mean_reward());
    if let Some(best) = progress.best_reward {
        println!("  best episode reward : {best:.3}");
    }
    let overlay = overlay.borrow();
    println!("  {} decisions : {}", overlay.selected(), overlay.decisions());
    println!("  stats.csv rows      : {} ({})", sink.borrow().rows(), stats_path.display());
    println!();

    println!("{:<8} {:<10} {:<10} {:<10}", "Agent", "Episodes", "Decisions", "Jumps");
    println!("{}", "-".repeat(40));
    for agent in sim.agents() {
        let stats = agent.stats();
        println!(
            "{:<8} {:<10} {:<10} {:<10}",
            agent.id().0,
            agent.episodes_begun(),
            stats.lifetime_total(stat::DECISIONS).unwrap_or(0.0),
            stats.lifetime_total(stat::EXECUTED_JUMPS).unwrap_or(0.0),
        );
    }

    Ok(())
}
