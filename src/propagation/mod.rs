//! Orbital propagation for live bodies
//!
//! SGP4 itself is delegated to satkit; this module only converts its output
//! into geodetic and Earth-fixed Cartesian coordinates, and computes look
//! angles for a ground observer.

mod geodetic;
mod look_angles;
mod propagator;

pub use geodetic::*;
pub use look_angles::*;
pub use propagator::*;
