//! Cooperative refresh scheduler for live bodies

use std::time::Duration;

use glam::DVec3;
use satkit::Instant;

use crate::data::TrackedSatellite;
use crate::error::{Result, SimError};
use crate::propagation::{GeodeticPosition, GeodeticPropagator};
use crate::simulation::{History, Track};

/// Renderer-facing state of one live body
#[derive(Debug, Clone)]
pub struct LiveTrack {
    pub cospar_id: String,
    name: String,
    position: DVec3,
    geodetic: Option<GeodeticPosition>,
    history: History,
    refreshes: u64,
}

impl LiveTrack {
    fn new(cospar_id: String, name: String, history_cap: Option<usize>) -> Self {
        Self {
            cospar_id,
            name,
            position: DVec3::ZERO,
            geodetic: None,
            history: History::with_cap(history_cap),
            refreshes: 0,
        }
    }

    fn record(&mut self, geodetic: GeodeticPosition) {
        self.position = geodetic.to_cartesian();
        self.geodetic = Some(geodetic);
        self.history.push(self.position);
        self.refreshes += 1;
    }

    pub fn geodetic(&self) -> Option<GeodeticPosition> {
        self.geodetic
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl Track for LiveTrack {
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

/// Fixed-delay timer owned by the scheduler
#[derive(Debug, Clone, Copy)]
pub struct RefreshTimer {
    pub interval: Duration,
    pub next_due: Duration,
}

struct Entry {
    satellite: TrackedSatellite,
    track: LiveTrack,
    timer: RefreshTimer,
}

/// Outcome of one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Bodies whose position was updated
    pub refreshed: usize,
    /// Due bodies left for the next poll because of the in-flight cap
    pub deferred: usize,
    /// Due bodies whose propagation failed
    pub failed: usize,
}

/// Owns every per-body refresh timer.
///
/// Time is measured as a monotonic offset from when the scheduler started.
/// Each poll services due timers oldest-first and stops after
/// `max_in_flight` propagation calls; a serviced timer is rescheduled one
/// interval after the poll time.
pub struct RefreshScheduler<P> {
    propagator: P,
    entries: Vec<Entry>,
    max_in_flight: usize,
    followed: Option<String>,
    shut_down: bool,
}

impl<P: GeodeticPropagator> RefreshScheduler<P> {
    pub fn new(propagator: P, max_in_flight: usize) -> Result<Self> {
        if max_in_flight == 0 {
            return Err(SimError::InvalidInput(
                "max_in_flight must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            propagator,
            entries: Vec::new(),
            max_in_flight,
            followed: None,
            shut_down: false,
        })
    }

    /// Register a body; its first refresh is due immediately
    pub fn add(
        &mut self,
        satellite: TrackedSatellite,
        interval: Duration,
        history_cap: Option<usize>,
    ) -> Result<()> {
        if self.shut_down {
            return Err(SimError::InvalidInput(
                "scheduler has been shut down".to_string(),
            ));
        }
        if interval.is_zero() {
            return Err(SimError::InvalidInput(format!(
                "refresh interval for {} must be positive",
                satellite.cospar_id
            )));
        }
        if self.entry(&satellite.cospar_id).is_some() {
            return Err(SimError::InvalidInput(format!(
                "{} is already scheduled",
                satellite.cospar_id
            )));
        }

        let track = LiveTrack::new(
            satellite.cospar_id.clone(),
            satellite.display_name.clone(),
            history_cap,
        );
        log::debug!(
            "Scheduling {} ({}) every {:?}",
            satellite.display_name,
            satellite.cospar_id,
            interval
        );
        self.entries.push(Entry {
            satellite,
            track,
            timer: RefreshTimer {
                interval,
                next_due: Duration::ZERO,
            },
        });
        Ok(())
    }

    fn entry(&self, cospar_id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.satellite.cospar_id == cospar_id)
    }

    /// Service due timers at monotonic offset `now`, propagating to `time`
    pub fn poll(&mut self, now: Duration, time: &Instant) -> PollReport {
        let mut report = PollReport::default();
        if self.shut_down {
            return report;
        }

        let mut due: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.timer.next_due <= now)
            .map(|(i, _)| i)
            .collect();
        due.sort_by_key(|&i| self.entries[i].timer.next_due);

        if due.len() > self.max_in_flight {
            report.deferred = due.len() - self.max_in_flight;
            due.truncate(self.max_in_flight);
        }

        for i in due {
            let entry = &mut self.entries[i];
            match self.propagator.geodetic_at(&entry.satellite, time) {
                Some(geodetic) => {
                    entry.track.record(geodetic);
                    report.refreshed += 1;
                }
                None => {
                    log::warn!(
                        "{} propagation failed for {}",
                        self.propagator.name(),
                        entry.satellite.display_name
                    );
                    report.failed += 1;
                }
            }
            entry.timer.next_due = now + entry.timer.interval;
        }

        if report.deferred > 0 {
            log::debug!("Deferred {} refreshes to the next poll", report.deferred);
        }
        report
    }

    /// Stop refreshing one body and drop its track
    pub fn cancel(&mut self, cospar_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.satellite.cospar_id != cospar_id);
        if self.followed.as_deref() == Some(cospar_id) {
            self.followed = None;
        }
        before != self.entries.len()
    }

    /// Cancel every timer; later polls do nothing
    pub fn shutdown(&mut self) {
        if !self.shut_down {
            log::info!("Shutting down refresh scheduler ({} timers)", self.entries.len());
        }
        self.entries.clear();
        self.followed = None;
        self.shut_down = true;
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    pub fn timer(&self, cospar_id: &str) -> Option<RefreshTimer> {
        self.entry(cospar_id).map(|e| e.timer)
    }

    pub fn track(&self, cospar_id: &str) -> Option<&LiveTrack> {
        self.entry(cospar_id).map(|e| &e.track)
    }

    pub fn tracks(&self) -> impl Iterator<Item = &LiveTrack> + '_ {
        self.entries.iter().map(|e| &e.track)
    }

    /// Change the body the renderer should follow
    pub fn follow(&mut self, cospar_id: &str) -> Result<()> {
        if self.entry(cospar_id).is_none() {
            return Err(SimError::UnknownBody(cospar_id.to_string()));
        }
        self.followed = Some(cospar_id.to_string());
        Ok(())
    }

    pub fn followed(&self) -> Option<&LiveTrack> {
        self.followed.as_deref().and_then(|id| self.track(id))
    }

    /// Change a body's display name
    pub fn rename(&mut self, cospar_id: &str, name: &str) -> Result<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.satellite.cospar_id == cospar_id)
            .ok_or_else(|| SimError::UnknownBody(cospar_id.to_string()))?;
        entry.track.name = name.to_string();
        Ok(())
    }
}
