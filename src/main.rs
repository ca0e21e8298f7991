//! LaunchTrack command line

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use launchtrack::config::load_or_default;
use launchtrack::headless::{run_simulation, SimulateArgs};
use launchtrack::live::{run_live, run_look, LiveArgs, LookArgs};
use launchtrack::simulation::Scenario;

#[derive(Parser, Debug)]
#[command(name = "launchtrack", version, about = "Launch and orbit trajectory simulator")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Single body on a circular orbit
    Orbit(SimulateArgs),
    /// Rocket ascent with satellite deployment
    Launch(SimulateArgs),
    /// Periodically refresh allow-listed satellites with SGP4
    Live(LiveArgs),
    /// Look angles of allow-listed satellites from a ground observer
    Look(LookArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;

    log::info!("Starting LaunchTrack...");

    match cli.command {
        Command::Orbit(args) => run_simulation(Scenario::Orbit, args, &config),
        Command::Launch(args) => run_simulation(Scenario::Launch, args, &config),
        Command::Live(args) => run_live(args, &config),
        Command::Look(args) => run_look(args, &config),
    }
}
