//! LaunchTrack - launch and orbit trajectory simulation
//!
//! Staged rocket/satellite trajectories, allow-listed TLE catalogs and
//! timed SGP4 refresh of live satellites, all exposed as pull-style tracks
//! for a globe renderer.

pub mod config;
pub mod data;
pub mod error;
pub mod headless;
pub mod live;
pub mod propagation;
pub mod scheduler;
pub mod simulation;

pub use error::{Result, SimError};
