//! Trail history buffer

use std::collections::VecDeque;

use glam::DVec3;

/// Chronological list of past positions, optionally capped.
///
/// Positions are appended at the back; once the cap is exceeded the oldest
/// entry is dropped from the front.
#[derive(Debug, Clone, Default)]
pub struct History {
    points: VecDeque<DVec3>,
    cap: Option<usize>,
}

impl History {
    /// Unbounded history
    pub fn unbounded() -> Self {
        Self {
            points: VecDeque::new(),
            cap: None,
        }
    }

    /// History holding at most `cap` positions
    pub fn capped(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap.min(4096) + 1),
            cap: Some(cap),
        }
    }

    pub fn with_cap(cap: Option<usize>) -> Self {
        match cap {
            Some(cap) => Self::capped(cap),
            None => Self::unbounded(),
        }
    }

    /// Append a position, evicting from the front when over the cap
    pub fn push(&mut self, position: DVec3) {
        self.points.push_back(position);
        if let Some(cap) = self.cap {
            while self.points.len() > cap {
                self.points.pop_front();
            }
        }
    }

    pub fn cap(&self) -> Option<usize> {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<DVec3> {
        self.points.back().copied()
    }

    pub fn oldest(&self) -> Option<DVec3> {
        self.points.front().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DVec3> + '_ {
        self.points.iter()
    }

    /// Copy the trail out as plain arrays (oldest first)
    pub fn to_vec(&self) -> Vec<[f64; 3]> {
        self.points.iter().map(|p| p.to_array()).collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_never_exceeded() {
        let mut history = History::capped(5);
        for i in 0..100 {
            history.push(DVec3::splat(i as f64));
            assert!(history.len() <= 5);
        }
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut history = History::capped(3);
        for i in 0..6 {
            history.push(DVec3::new(i as f64, 0.0, 0.0));
        }
        let xs: Vec<f64> = history.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 4.0, 5.0]);
        assert_eq!(history.oldest(), Some(DVec3::new(3.0, 0.0, 0.0)));
        assert_eq!(history.latest(), Some(DVec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut history = History::unbounded();
        for i in 0..1000 {
            history.push(DVec3::splat(i as f64));
        }
        assert_eq!(history.len(), 1000);
        assert_eq!(history.cap(), None);
    }

    #[test]
    fn test_zero_cap_stays_empty() {
        let mut history = History::capped(0);
        history.push(DVec3::ONE);
        assert!(history.is_empty());
    }
}
