//! Simulation context: owns the bodies of one run

use glam::DVec3;
use satkit::Instant;
use serde::{Deserialize, Serialize};

use super::body::{advance, Body, Transition};
use super::profile::{LaunchProfile, OrbitParams};
use super::TrackSnapshot;
use crate::error::{Result, SimError};

/// Which set of bodies a run simulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// One body orbiting from t = 0
    Orbit,
    /// Rocket carrying a satellite that separates after the ascent
    Launch,
}

#[derive(Debug, Clone)]
struct Slot {
    body: Body,
    /// Index of the carrier slot, always lower than this slot's index
    carrier: Option<usize>,
}

/// Explicit owner of a simulation run.
///
/// Bodies are advanced in insertion order so a carrier is always updated
/// before the payload that reads its position.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    scenario: Scenario,
    profile: LaunchProfile,
    history_cap: Option<usize>,
    start: Instant,
    slots: Vec<Slot>,
    followed: Option<usize>,
    ticks: u64,
}

impl SimulationContext {
    /// Single body on the parametric orbit
    pub fn orbit(orbit: OrbitParams, start: Instant, history_cap: Option<usize>) -> Result<Self> {
        let profile = LaunchProfile {
            orbit,
            ..LaunchProfile::default()
        };
        Self::new(Scenario::Orbit, profile, start, history_cap)
    }

    /// Rocket and satellite following `profile`
    pub fn launch(
        profile: LaunchProfile,
        start: Instant,
        history_cap: Option<usize>,
    ) -> Result<Self> {
        Self::new(Scenario::Launch, profile, start, history_cap)
    }

    pub fn new(
        scenario: Scenario,
        profile: LaunchProfile,
        start: Instant,
        history_cap: Option<usize>,
    ) -> Result<Self> {
        profile.validate()?;
        let mut ctx = Self {
            scenario,
            profile,
            history_cap,
            start,
            slots: Vec::new(),
            followed: None,
            ticks: 0,
        };
        ctx.populate();
        log::info!(
            "Initialized {:?} simulation with {} bodies",
            scenario,
            ctx.slots.len()
        );
        Ok(ctx)
    }

    fn populate(&mut self) {
        let cap = self.history_cap;
        self.slots = match self.scenario {
            Scenario::Orbit => vec![Slot {
                body: Body::orbiting("satellite", cap),
                carrier: None,
            }],
            Scenario::Launch => vec![
                Slot {
                    body: Body::carrier("rocket", cap),
                    carrier: None,
                },
                Slot {
                    body: Body::payload("satellite", cap),
                    carrier: Some(0),
                },
            ],
        };
        self.followed = Some(self.slots.len() - 1);
        self.ticks = 0;
    }

    /// Discard all body state and start over from stage 0
    pub fn reset(&mut self) {
        log::info!("Resetting {:?} simulation", self.scenario);
        self.populate();
    }

    /// Restart with a new start time reference
    pub fn restart_at(&mut self, start: Instant) {
        self.start = start;
        self.reset();
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn profile(&self) -> &LaunchProfile {
        &self.profile
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Seconds between the start reference and `timestamp`
    pub fn elapsed_at(&self, timestamp: &Instant) -> f64 {
        (*timestamp - self.start).as_seconds()
    }

    /// Clock callback: derive elapsed seconds and advance every body
    pub fn tick(&mut self, timestamp: &Instant) -> Result<Vec<(String, Transition)>> {
        let elapsed = self.elapsed_at(timestamp);
        self.step(elapsed)
    }

    /// Advance every body to `elapsed` seconds.
    ///
    /// The time is checked against every body before any of them moves, so a
    /// rejected step leaves the whole context untouched.
    pub fn step(&mut self, elapsed: f64) -> Result<Vec<(String, Transition)>> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(SimError::InvalidInput(format!(
                "elapsed time must be a finite value >= 0, got {}",
                elapsed
            )));
        }
        if let Some(slot) = self
            .slots
            .iter()
            .find(|slot| slot.body.last_elapsed().map_or(false, |last| elapsed < last))
        {
            return Err(SimError::InvalidInput(format!(
                "elapsed time moved backwards for {}: {} < {}",
                slot.body.name(),
                elapsed,
                slot.body.last_elapsed().unwrap_or_default()
            )));
        }

        let mut transitions = Vec::new();
        for i in 0..self.slots.len() {
            let carrier: Option<DVec3> = self.slots[i]
                .carrier
                .map(|c| self.slots[c].body.position());
            let body = &mut self.slots[i].body;
            if let Some(transition) = advance(body, elapsed, &self.profile, carrier)? {
                log::info!(
                    "{} entered {} at t={:.1}s",
                    body.name(),
                    transition.to,
                    transition.elapsed
                );
                transitions.push((body.name().to_string(), transition));
            }
        }
        self.ticks += 1;
        Ok(transitions)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.slots.iter().map(|slot| &slot.body)
    }

    pub fn body(&self, name: &str) -> Option<&Body> {
        self.bodies().find(|body| body.name() == name)
    }

    /// Change the body the renderer should follow
    pub fn follow(&mut self, name: &str) -> Result<()> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.body.name() == name)
            .ok_or_else(|| SimError::UnknownBody(name.to_string()))?;
        self.followed = Some(index);
        Ok(())
    }

    pub fn unfollow(&mut self) {
        self.followed = None;
    }

    pub fn followed(&self) -> Option<&Body> {
        self.followed.map(|i| &self.slots[i].body)
    }

    /// Change a body's display name
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        if name != new_name && self.body(new_name).is_some() {
            return Err(SimError::InvalidInput(format!(
                "a body named {} already exists",
                new_name
            )));
        }
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.body.name() == name)
            .ok_or_else(|| SimError::UnknownBody(name.to_string()))?;
        slot.body.set_name(new_name);
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<TrackSnapshot> {
        self.bodies()
            .map(|body| TrackSnapshot::from_track(body, Some(body.stage())))
            .collect()
    }
}
