//! Headless simulation runs: drive a scenario from the clock and dump trails

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use satkit::Duration;
use serde::Serialize;

use crate::config::SimConfig;
use crate::simulation::{
    format_instant, Scenario, SimClock, SimulationContext, Stage, TrackSnapshot,
};

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    /// Simulated seconds to run
    #[arg(long, default_value_t = 600.0)]
    pub seconds: f64,
    /// Simulated seconds per wall second (overrides config)
    #[arg(long)]
    pub multiplier: Option<f64>,
    /// Wall seconds per tick (overrides config)
    #[arg(long)]
    pub step: Option<f64>,
    /// Trail length per body (overrides config)
    #[arg(long)]
    pub history_cap: Option<usize>,
    /// Keep the whole trail
    #[arg(long, conflicts_with = "history_cap")]
    pub unbounded: bool,
    /// Body the renderer should follow
    #[arg(long)]
    pub follow: Option<String>,
    /// Output JSON file path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct TransitionRecord {
    body: String,
    stage: Stage,
    elapsed_seconds: f64,
}

#[derive(Debug, Serialize)]
struct RunReport {
    generated_at: String,
    scenario: Scenario,
    start_time_utc: String,
    simulated_seconds: f64,
    ticks: u64,
    followed: Option<String>,
    transitions: Vec<TransitionRecord>,
    tracks: Vec<TrackSnapshot>,
}

pub fn run_simulation(scenario: Scenario, args: SimulateArgs, config: &SimConfig) -> Result<()> {
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        return Err(anyhow!("seconds must be > 0"));
    }

    let multiplier = args.multiplier.unwrap_or(config.clock.multiplier);
    let step = args.step.unwrap_or(config.clock.step_seconds);
    if !step.is_finite() || step <= 0.0 {
        return Err(anyhow!("step must be > 0"));
    }
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(anyhow!("multiplier must be > 0 for a headless run"));
    }
    let history_cap = if args.unbounded {
        None
    } else {
        args.history_cap.or(config.history_cap)
    };

    let mut clock = SimClock::starting_now(multiplier)?;
    let start = clock.start();
    if let Some(stop_after) = config.clock.stop_after_seconds {
        clock = clock.with_stop(start + Duration::from_seconds(stop_after), config.clock.range)?;
    }

    let mut ctx = match scenario {
        Scenario::Orbit => SimulationContext::orbit(config.orbit, start, history_cap)?,
        Scenario::Launch => SimulationContext::launch(config.launch, start, history_cap)?,
    };
    if let Some(name) = &args.follow {
        ctx.follow(name)?;
    }

    let ticks = (args.seconds / (step * multiplier)).ceil() as u64;
    log::info!(
        "Running {:?} from {} for {} simulated seconds ({} ticks of {:.3}s x{})",
        scenario,
        clock.format_time(),
        args.seconds,
        ticks,
        step,
        multiplier
    );

    let progress = ProgressBar::new(ticks);
    progress.set_style(
        ProgressStyle::with_template("{elapsed_precise} {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut transitions = Vec::new();
    let mut simulated = 0.0;
    for _ in 0..ticks {
        let tick = clock.tick(step)?;
        if tick.wrapped {
            log::info!("Clock looped back to start, restarting simulation");
            ctx.reset();
            if let Some(name) = &args.follow {
                ctx.follow(name)?;
            }
        }
        for (body, transition) in ctx.tick(&tick.time)? {
            progress.set_message(format!("{} {}", body, transition.to));
            transitions.push(TransitionRecord {
                body,
                stage: transition.to,
                elapsed_seconds: transition.elapsed,
            });
        }
        simulated = tick.elapsed;
        progress.inc(1);
    }
    progress.finish_and_clear();

    for body in ctx.bodies() {
        let p = body.position();
        log::info!(
            "{} [{}] at ({:.0}, {:.0}, {:.0}) m, {} trail points",
            body.name(),
            body.stage(),
            p.x,
            p.y,
            p.z,
            body.history().len()
        );
    }

    let report = RunReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        scenario,
        start_time_utc: format_instant(&start),
        simulated_seconds: simulated,
        ticks: ctx.ticks(),
        followed: ctx.followed().map(|b| b.name().to_string()),
        transitions,
        tracks: ctx.snapshot(),
    };

    if let Some(output) = &args.output {
        write_json(output, &report)?;
    }
    Ok(())
}

/// Pretty-print `value` to `path`, creating parent directories
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    log::info!("Wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(output: PathBuf) -> SimulateArgs {
        SimulateArgs {
            seconds: 120.0,
            multiplier: Some(1.0),
            step: Some(1.0),
            history_cap: Some(50),
            unbounded: false,
            follow: Some("rocket".to_string()),
            output: Some(output),
        }
    }

    #[test]
    fn test_launch_run_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out").join("launch.json");
        run_simulation(Scenario::Launch, args(output.clone()), &SimConfig::default()).unwrap();

        let report: serde_json::Value =
            serde_json::from_reader(std::fs::File::open(&output).unwrap()).unwrap();
        assert_eq!(report["scenario"], "launch");
        assert_eq!(report["ticks"], 120);
        assert_eq!(report["followed"], "rocket");
        let tracks = report["tracks"].as_array().unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1]["stage"], "free-flight");
        assert_eq!(tracks[1]["history"].as_array().unwrap().len(), 50);
    }

    #[test]
    fn test_rejects_non_positive_duration() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = args(dir.path().join("x.json"));
        bad.seconds = 0.0;
        assert!(run_simulation(Scenario::Orbit, bad, &SimConfig::default()).is_err());
    }

    #[test]
    fn test_unknown_follow_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = args(dir.path().join("x.json"));
        bad.follow = Some("nobody".to_string());
        assert!(run_simulation(Scenario::Orbit, bad, &SimConfig::default()).is_err());
    }
}
