//! Flight stages and the transition table

use serde::{Deserialize, Serialize};

use super::profile::LaunchProfile;

/// Discrete phase of a body's simulated trajectory.
///
/// Variants are declared in flight order; the derived ordering is what makes
/// stages monotonic (a body never moves to a smaller stage).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// Closed-form vertical ascent
    #[serde(rename = "ascending-phase-1")]
    AscendingPhase1,
    /// Integrated ascent: fixed increment per tick
    #[serde(rename = "ascending-phase-2")]
    AscendingPhase2,
    /// Separation from the carrier
    Deploy,
    /// Parametric orbit (terminal)
    FreeFlight,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AscendingPhase1 => "ascending-phase-1",
            Self::AscendingPhase2 => "ascending-phase-2",
            Self::Deploy => "deploy",
            Self::FreeFlight => "free-flight",
        }
    }

    pub fn all() -> &'static [Stage] {
        &[
            Stage::AscendingPhase1,
            Stage::AscendingPhase2,
            Stage::Deploy,
            Stage::FreeFlight,
        ]
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::FreeFlight)
    }

    /// Stage after a call at `elapsed` seconds.
    ///
    /// Pure function of the current stage and time. Deploy always moves on,
    /// since the copy from the carrier happens exactly once.
    pub fn next(self, elapsed: f64, profile: &LaunchProfile) -> Stage {
        match self {
            Self::AscendingPhase1 if elapsed > profile.t1 => Self::AscendingPhase2,
            Self::AscendingPhase1 => Self::AscendingPhase1,
            Self::AscendingPhase2 if elapsed > profile.t2 => Self::Deploy,
            Self::AscendingPhase2 => Self::AscendingPhase2,
            Self::Deploy => Self::FreeFlight,
            Self::FreeFlight => Self::FreeFlight,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_follow_thresholds() {
        let profile = LaunchProfile::default();
        assert_eq!(
            Stage::AscendingPhase1.next(profile.t1, &profile),
            Stage::AscendingPhase1
        );
        assert_eq!(
            Stage::AscendingPhase1.next(profile.t1 + 0.001, &profile),
            Stage::AscendingPhase2
        );
        assert_eq!(
            Stage::AscendingPhase2.next(profile.t2, &profile),
            Stage::AscendingPhase2
        );
        assert_eq!(
            Stage::AscendingPhase2.next(profile.t2 + 1.0, &profile),
            Stage::Deploy
        );
        assert_eq!(Stage::Deploy.next(0.0, &profile), Stage::FreeFlight);
        assert_eq!(Stage::FreeFlight.next(1.0e9, &profile), Stage::FreeFlight);
    }

    #[test]
    fn test_next_never_decreases() {
        let profile = LaunchProfile::default();
        for &stage in Stage::all() {
            for t in [0.0, 10.0, 30.0, 45.0, 60.0, 61.0, 1000.0] {
                assert!(stage.next(t, &profile) >= stage);
            }
        }
    }

    #[test]
    fn test_stage_names_are_kebab_case() {
        let json = serde_json::to_string(&Stage::AscendingPhase2).unwrap();
        assert_eq!(json, "\"ascending-phase-2\"");
        assert_eq!(Stage::FreeFlight.to_string(), "free-flight");
    }

    #[test]
    fn test_serde_names_match_display() {
        for &stage in Stage::all() {
            let json = serde_json::to_string(&stage).unwrap();
            assert_eq!(json, format!("\"{}\"", stage.name()));
            let back: Stage = serde_json::from_str(&json).unwrap();
            assert_eq!(back, stage);
        }
        assert!(serde_json::from_str::<Stage>("\"ascending-phase1\"").is_err());
    }

    #[test]
    fn test_only_free_flight_is_terminal() {
        let terminal: Vec<_> = Stage::all().iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&Stage::FreeFlight]);
    }
}
