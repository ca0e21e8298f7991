//! Simulated bodies and the per-tick update

use glam::DVec3;

use super::history::History;
use super::profile::LaunchProfile;
use super::stage::Stage;
use super::Track;
use crate::error::{Result, SimError};

/// A named moving object driven by the stage machine
#[derive(Debug, Clone)]
pub struct Body {
    name: String,
    position: DVec3,
    stage: Stage,
    /// Highest stage this body may reach
    final_stage: Stage,
    /// Elapsed time at which the body entered free flight
    deployed_at: Option<f64>,
    /// Elapsed time of the last accepted update
    last_elapsed: Option<f64>,
    history: History,
}

/// Stage change produced by a single update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: Stage,
    pub to: Stage,
    pub elapsed: f64,
}

impl Body {
    /// Body launched from the pad that runs the full stage machine
    pub fn payload(name: impl Into<String>, history_cap: Option<usize>) -> Self {
        Self::with_final_stage(name, history_cap, Stage::FreeFlight)
    }

    /// Launch vehicle: never deploys, keeps integrating after separation
    pub fn carrier(name: impl Into<String>, history_cap: Option<usize>) -> Self {
        Self::with_final_stage(name, history_cap, Stage::AscendingPhase2)
    }

    /// Self-propelled body orbiting from t = 0 with no launch phase
    pub fn orbiting(name: impl Into<String>, history_cap: Option<usize>) -> Self {
        let mut body = Self::with_final_stage(name, history_cap, Stage::FreeFlight);
        body.stage = Stage::FreeFlight;
        body.deployed_at = Some(0.0);
        body
    }

    fn with_final_stage(
        name: impl Into<String>,
        history_cap: Option<usize>,
        final_stage: Stage,
    ) -> Self {
        Self {
            name: name.into(),
            position: DVec3::ZERO,
            stage: Stage::AscendingPhase1,
            final_stage,
            deployed_at: None,
            last_elapsed: None,
            history: History::with_cap(history_cap),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn final_stage(&self) -> Stage {
        self.final_stage
    }

    pub fn deployed_at(&self) -> Option<f64> {
        self.deployed_at
    }

    pub fn last_elapsed(&self) -> Option<f64> {
        self.last_elapsed
    }

    pub fn history(&self) -> &History {
        &self.history
    }
}

impl Track for Body {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> DVec3 {
        self.position
    }

    fn history(&self) -> &History {
        &self.history
    }
}

/// Advance `body` to `elapsed` seconds after simulation start.
///
/// `carrier` is the current position of the body this one separates from; it
/// is only read in [`Stage::Deploy`]. A body without a carrier deploys where it
/// stands. Equal consecutive times are accepted and re-append the position.
pub fn advance(
    body: &mut Body,
    elapsed: f64,
    profile: &LaunchProfile,
    carrier: Option<DVec3>,
) -> Result<Option<Transition>> {
    if !elapsed.is_finite() || elapsed < 0.0 {
        return Err(SimError::InvalidInput(format!(
            "elapsed time must be a finite value >= 0, got {}",
            elapsed
        )));
    }
    if let Some(last) = body.last_elapsed {
        if elapsed < last {
            return Err(SimError::InvalidInput(format!(
                "elapsed time moved backwards for {}: {} < {}",
                body.name, elapsed, last
            )));
        }
    }

    let from = body.stage;
    match from {
        Stage::AscendingPhase1 => {
            body.position = profile.ascent_position(elapsed);
        }
        Stage::AscendingPhase2 => {
            body.position += profile.stage2_increment();
        }
        Stage::Deploy => {
            if let Some(carrier_position) = carrier {
                body.position = carrier_position;
            }
            if body.deployed_at.is_none() {
                body.deployed_at = Some(elapsed);
            }
        }
        Stage::FreeFlight => {
            let since = elapsed - body.deployed_at.unwrap_or(0.0);
            body.position = profile.orbit.position_at(since);
        }
    }

    body.history.push(body.position);
    body.last_elapsed = Some(elapsed);

    let to = from.next(elapsed, profile).min(body.final_stage);
    if to == from {
        return Ok(None);
    }

    body.stage = to;
    log::debug!("{}: {} -> {} at t={:.3}s", body.name, from, to, elapsed);
    Ok(Some(Transition { from, to, elapsed }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> LaunchProfile {
        LaunchProfile::default()
    }

    #[test]
    fn test_starts_at_origin() {
        let body = Body::payload("sat", Some(100));
        assert_eq!(body.position(), DVec3::ZERO);
        assert_eq!(body.stage(), Stage::AscendingPhase1);
        assert!(body.history().is_empty());
    }

    #[test]
    fn test_ascent_scenario() {
        let profile = profile();
        let mut body = Body::payload("rocket", None);

        advance(&mut body, 0.0, &profile, None).unwrap();
        assert_eq!(body.position(), DVec3::ZERO);
        assert_eq!(body.stage(), Stage::AscendingPhase1);

        let transition = advance(&mut body, 35.0, &profile, None).unwrap();
        assert_eq!(body.stage(), Stage::AscendingPhase2);
        assert!(body.position().z > 0.0);
        assert_eq!(
            transition,
            Some(Transition {
                from: Stage::AscendingPhase1,
                to: Stage::AscendingPhase2,
                elapsed: 35.0,
            })
        );
    }

    #[test]
    fn test_negative_elapsed_rejected() {
        let mut body = Body::payload("rocket", None);
        let err = advance(&mut body, -1.0, &profile(), None).unwrap_err();
        assert!(matches!(err, SimError::InvalidInput(_)));
        assert!(body.history().is_empty());
        assert_eq!(body.position(), DVec3::ZERO);
    }

    #[test]
    fn test_nan_elapsed_rejected() {
        let mut body = Body::orbiting("sat", None);
        assert!(advance(&mut body, f64::NAN, &profile(), None).is_err());
    }

    #[test]
    fn test_backwards_time_rejected() {
        let profile = profile();
        let mut body = Body::payload("rocket", None);
        advance(&mut body, 10.0, &profile, None).unwrap();
        let err = advance(&mut body, 5.0, &profile, None).unwrap_err();
        assert!(matches!(err, SimError::InvalidInput(_)));
        assert_eq!(body.history().len(), 1);
    }

    #[test]
    fn test_repeated_time_reappends() {
        let profile = profile();
        let mut body = Body::payload("rocket", None);
        advance(&mut body, 5.0, &profile, None).unwrap();
        advance(&mut body, 5.0, &profile, None).unwrap();
        assert_eq!(body.history().len(), 2);
        let points: Vec<_> = body.history().iter().copied().collect();
        assert_eq!(points[0], points[1]);
    }

    #[test]
    fn test_phase2_depends_on_call_frequency() {
        let profile = profile();
        let mut once = Body::payload("once", None);
        let mut twice = Body::payload("twice", None);

        // Both enter phase 2 at the same point
        advance(&mut once, 31.0, &profile, None).unwrap();
        advance(&mut twice, 31.0, &profile, None).unwrap();
        assert_eq!(once.position(), twice.position());

        let dt = 10.0;
        advance(&mut once, 31.0 + dt, &profile, None).unwrap();
        advance(&mut twice, 31.0 + dt / 2.0, &profile, None).unwrap();
        advance(&mut twice, 31.0 + dt, &profile, None).unwrap();

        assert_ne!(once.position(), twice.position());
        assert_eq!(
            twice.position() - once.position(),
            profile.stage2_increment()
        );
    }

    #[test]
    fn test_free_flight_stays_on_radius() {
        let profile = profile();
        let radius = profile.orbit.radius;
        let mut body = Body::orbiting("sat", Some(10));

        let mut t = 0.0;
        while t < 500.0 {
            advance(&mut body, t, &profile, None).unwrap();
            let p = body.position();
            let r2 = p.x * p.x + p.y * p.y;
            assert!((r2 - radius * radius).abs() / (radius * radius) < 1e-12);
            t += 7.3;
        }
    }

    #[test]
    fn test_free_flight_independent_of_call_frequency() {
        let profile = profile();
        let mut coarse = Body::orbiting("coarse", None);
        let mut fine = Body::orbiting("fine", None);

        advance(&mut coarse, 100.0, &profile, None).unwrap();
        for i in 0..=100 {
            advance(&mut fine, i as f64, &profile, None).unwrap();
        }
        assert_eq!(coarse.position(), fine.position());
    }

    #[test]
    fn test_deploy_copies_carrier_once() {
        let profile = profile();
        let mut carrier = Body::carrier("rocket", None);
        let mut payload = Body::payload("sat", None);

        let mut deploy_position = None;
        let mut t = 0.0;
        while t <= 120.0 {
            advance(&mut carrier, t, &profile, None).unwrap();
            let was_deploying = payload.stage() == Stage::Deploy;
            advance(&mut payload, t, &profile, Some(carrier.position())).unwrap();
            if was_deploying {
                deploy_position = Some(carrier.position());
                assert_eq!(payload.stage(), Stage::FreeFlight);
                assert_eq!(payload.deployed_at(), Some(t));
            }
            t += 1.0;
        }

        let deploy_position = deploy_position.expect("payload never deployed");
        let matches = payload
            .history()
            .iter()
            .filter(|p| **p == deploy_position)
            .count();
        assert_eq!(matches, 1);
        assert_eq!(carrier.stage(), Stage::AscendingPhase2);
    }

    #[test]
    fn test_stage_monotonic_over_run() {
        let profile = profile();
        let mut body = Body::payload("sat", Some(16));
        let mut previous = body.stage();
        for i in 0..400 {
            let t = i as f64 * 0.5;
            advance(&mut body, t, &profile, None).unwrap();
            assert!(body.stage() >= previous);
            previous = body.stage();
        }
        assert_eq!(body.stage(), Stage::FreeFlight);
        assert!(body.history().len() <= 16);
    }

    #[test]
    fn test_deploy_without_carrier_stays_in_place() {
        let profile = profile();
        let mut body = Body::payload("solo", None);
        advance(&mut body, 31.0, &profile, None).unwrap();
        advance(&mut body, 61.0, &profile, None).unwrap();
        assert_eq!(body.stage(), Stage::Deploy);
        let before = body.position();
        advance(&mut body, 62.0, &profile, None).unwrap();
        assert_eq!(body.position(), before);
        assert_eq!(body.stage(), Stage::FreeFlight);
    }
}
