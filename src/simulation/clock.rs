//! Simulation clock
//!
//! Converts real (wall) time steps into simulated time using a speed
//! multiplier, and reports the elapsed seconds the simulator consumes.

use satkit::{Duration, Instant};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// What happens when the clock reaches its stop time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockRange {
    /// Keep running past the stop time
    #[default]
    Unbounded,
    /// Hold at the stop time
    Clamped,
    /// Jump back to the start time
    LoopStop,
}

/// One clock advance
#[derive(Debug, Clone, Copy)]
pub struct Tick {
    /// Absolute simulated time
    pub time: Instant,
    /// Seconds since the start time
    pub elapsed: f64,
    /// The clock looped back to its start on this tick
    pub wrapped: bool,
}

/// Clock source feeding the simulator
#[derive(Debug, Clone)]
pub struct SimClock {
    start: Instant,
    current: Instant,
    stop: Option<Instant>,
    range: ClockRange,
    multiplier: f64,
    playing: bool,
}

impl SimClock {
    pub fn new(start: Instant, multiplier: f64) -> Result<Self> {
        validate_multiplier(multiplier)?;
        Ok(Self {
            start,
            current: start,
            stop: None,
            range: ClockRange::Unbounded,
            multiplier,
            playing: true,
        })
    }

    /// Start at the current UTC time
    pub fn starting_now(multiplier: f64) -> Result<Self> {
        Self::new(now_instant()?, multiplier)
    }

    /// Set a stop time and the behaviour when it is reached
    pub fn with_stop(mut self, stop: Instant, range: ClockRange) -> Result<Self> {
        if (stop - self.start).as_seconds() <= 0.0 {
            return Err(SimError::InvalidInput(
                "clock stop time must be after its start time".to_string(),
            ));
        }
        self.stop = Some(stop);
        self.range = range;
        Ok(self)
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn current(&self) -> Instant {
        self.current
    }

    pub fn range(&self) -> ClockRange {
        self.range
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub fn set_multiplier(&mut self, multiplier: f64) -> Result<()> {
        validate_multiplier(multiplier)?;
        self.multiplier = multiplier;
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Seconds between the start time and `time`
    pub fn elapsed_at(&self, time: &Instant) -> f64 {
        (*time - self.start).as_seconds()
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed_at(&self.current)
    }

    /// Advance by `real_dt` wall seconds scaled by the multiplier
    pub fn tick(&mut self, real_dt: f64) -> Result<Tick> {
        if !real_dt.is_finite() || real_dt < 0.0 {
            return Err(SimError::InvalidInput(format!(
                "clock step must be >= 0, got {}",
                real_dt
            )));
        }

        let step = if self.playing {
            real_dt * self.multiplier
        } else {
            0.0
        };
        let mut next = self.current + Duration::from_seconds(step);
        let mut wrapped = false;

        if let Some(stop) = self.stop {
            if (next - stop).as_seconds() > 0.0 {
                match self.range {
                    ClockRange::Unbounded => {}
                    ClockRange::Clamped => next = stop,
                    ClockRange::LoopStop => {
                        next = self.start;
                        wrapped = true;
                    }
                }
            }
        }

        self.current = next;
        Ok(Tick {
            time: next,
            elapsed: self.elapsed_at(&next),
            wrapped,
        })
    }

    /// Move back to the start time
    pub fn rewind(&mut self) {
        self.current = self.start;
    }

    /// Format current time as string
    pub fn format_time(&self) -> String {
        format_instant(&self.current)
    }
}

pub fn format_instant(time: &Instant) -> String {
    let (year, month, day, hour, min, sec) = time.as_datetime();
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year, month, day, hour, min, sec as u32
    )
}

fn validate_multiplier(multiplier: f64) -> Result<()> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(SimError::InvalidInput(format!(
            "clock multiplier must be >= 0, got {}",
            multiplier
        )));
    }
    Ok(())
}

/// Current UTC time as a satkit instant
pub fn now_instant() -> Result<Instant> {
    let now = chrono::Utc::now();
    instant_from_chrono(&now)
        .ok_or_else(|| SimError::InvalidInput(format!("cannot represent {} as an instant", now)))
}

pub fn instant_from_chrono(time: &chrono::DateTime<chrono::Utc>) -> Option<Instant> {
    use chrono::{Datelike, Timelike};

    let seconds = time.second() as f64 + time.nanosecond() as f64 * 1.0e-9;
    Instant::from_datetime(
        time.year(),
        time.month() as i32,
        time.day() as i32,
        time.hour() as i32,
        time.minute() as i32,
        seconds,
    )
    .ok()
}
