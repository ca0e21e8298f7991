//! Trajectory simulation
//!
//! A closed stage machine (vertical ascent, integrated ascent, deployment,
//! free flight) drives each body. Positions are in meters in the renderer's
//! Cartesian frame; every update appends to the body's trail history.
//!
//! # Example
//!
//! ```ignore
//! use launchtrack::simulation::*;
//!
//! let mut ctx = SimulationContext::launch(LaunchProfile::default(), start, Some(100))?;
//! let mut clock = SimClock::new(start, 60.0)?;
//! let tick = clock.tick(1.0 / 30.0)?;
//! ctx.tick(&tick.time)?;
//! ```

mod body;
mod clock;
mod context;
mod history;
mod profile;
mod stage;

pub use body::*;
pub use clock::*;
pub use context::*;
pub use history::*;
pub use profile::*;
pub use stage::*;

use glam::DVec3;
use serde::Serialize;

/// Pull accessor polled by the renderer on its own cadence
pub trait Track {
    fn name(&self) -> &str;

    /// Live position
    fn position(&self) -> DVec3;

    /// Trail, oldest first
    fn history(&self) -> &History;
}

/// Serializable copy of a track
#[derive(Debug, Clone, Serialize)]
pub struct TrackSnapshot {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<Stage>,
    pub position: [f64; 3],
    pub history: Vec<[f64; 3]>,
}

impl TrackSnapshot {
    pub fn from_track(track: &impl Track, stage: Option<Stage>) -> Self {
        Self {
            name: track.name().to_string(),
            stage,
            position: track.position().to_array(),
            history: track.history().to_vec(),
        }
    }
}
