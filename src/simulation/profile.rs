//! Launch and orbit parameters

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Parametric orbit used in free flight.
///
/// `x = R cos(a)`, `y = R sin(a)`, `z = R sin(a / 2)` with `a = t * angular_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitParams {
    /// Orbit radius (meters)
    pub radius: f64,
    /// Angular rate (rad/s)
    pub angular_rate: f64,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            radius: 1.0e7,
            angular_rate: 0.1,
        }
    }
}

impl OrbitParams {
    /// Position on the orbit `seconds` after entering it
    pub fn position_at(&self, seconds: f64) -> DVec3 {
        let angle = seconds * self.angular_rate;
        DVec3::new(
            self.radius * angle.cos(),
            self.radius * angle.sin(),
            self.radius * (angle * 0.5).sin(),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SimError::InvalidInput(format!(
                "orbit radius must be positive, got {}",
                self.radius
            )));
        }
        if !self.angular_rate.is_finite() {
            return Err(SimError::InvalidInput(
                "orbit angular rate must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Launch staging parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchProfile {
    /// End of the analytic vertical ascent (seconds)
    pub t1: f64,
    /// End of the integrated ascent, payload separation (seconds)
    pub t2: f64,
    /// Vertical speed during phase 1 (m/s)
    pub ascent_rate: f64,
    /// Fixed lateral launch position (meters)
    pub launch_site: [f64; 3],
    /// Displacement added on every phase 2 tick (meters)
    pub stage2_increment: [f64; 3],
    /// Orbit flown by the deployed payload
    pub orbit: OrbitParams,
}

impl Default for LaunchProfile {
    fn default() -> Self {
        Self {
            t1: 30.0,
            t2: 60.0,
            ascent_rate: 1000.0,
            launch_site: [0.0, 0.0, 0.0],
            stage2_increment: [2000.0, 1000.0, 3000.0],
            orbit: OrbitParams {
                radius: 1.0e7,
                angular_rate: 0.01,
            },
        }
    }
}

impl LaunchProfile {
    pub fn launch_site(&self) -> DVec3 {
        DVec3::from_array(self.launch_site)
    }

    pub fn stage2_increment(&self) -> DVec3 {
        DVec3::from_array(self.stage2_increment)
    }

    /// Analytic phase 1 position
    pub fn ascent_position(&self, elapsed: f64) -> DVec3 {
        self.launch_site() + DVec3::new(0.0, 0.0, elapsed * self.ascent_rate)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.t1.is_finite() && self.t1 >= 0.0) {
            return Err(SimError::InvalidInput(format!(
                "t1 must be >= 0, got {}",
                self.t1
            )));
        }
        if !(self.t2.is_finite() && self.t2 > self.t1) {
            return Err(SimError::InvalidInput(format!(
                "t2 ({}) must be greater than t1 ({})",
                self.t2, self.t1
            )));
        }
        if !self.ascent_rate.is_finite() {
            return Err(SimError::InvalidInput(
                "ascent rate must be finite".to_string(),
            ));
        }
        self.orbit.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orbit_starts_on_x_axis() {
        let orbit = OrbitParams::default();
        let p = orbit.position_at(0.0);
        assert_eq!(p, DVec3::new(orbit.radius, 0.0, 0.0));
    }

    #[test]
    fn test_profile_rejects_inverted_thresholds() {
        let profile = LaunchProfile {
            t1: 50.0,
            t2: 40.0,
            ..Default::default()
        };
        assert!(matches!(profile.validate(), Err(SimError::InvalidInput(_))));
    }

    #[test]
    fn test_default_profile_is_valid() {
        assert!(LaunchProfile::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let profile: LaunchProfile = serde_json::from_str(r#"{ "t1": 10.0 }"#).unwrap();
        assert_eq!(profile.t1, 10.0);
        assert_eq!(profile.t2, LaunchProfile::default().t2);
    }
}
