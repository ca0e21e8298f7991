//! Background live feed: runs the refresh scheduler off the render thread

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;
use satkit::Instant;

use super::refresh::{LiveTrack, PollReport, RefreshScheduler};
use crate::propagation::GeodeticPropagator;

#[derive(Debug)]
enum FeedCommand {
    Poll { now: Duration, time: Instant },
    Cancel(String),
    Stop,
}

/// Result of one worker poll
#[derive(Debug, Clone, Copy)]
pub struct FeedUpdate {
    pub time: Instant,
    pub report: PollReport,
}

/// Owns the scheduler on a worker thread and publishes its tracks.
///
/// The renderer reads [`LiveFeed::tracks`] on its own cadence; the worker
/// replaces the published list after every poll. Dropping the feed stops the
/// worker and cancels every timer.
pub struct LiveFeed {
    sender: Sender<FeedCommand>,
    receiver: Receiver<FeedUpdate>,
    tracks: Arc<RwLock<Vec<LiveTrack>>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl LiveFeed {
    pub fn spawn<P>(mut scheduler: RefreshScheduler<P>) -> Self
    where
        P: GeodeticPropagator + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<FeedCommand>();
        let (update_tx, update_rx) = mpsc::channel::<FeedUpdate>();
        let tracks = Arc::new(RwLock::new(scheduler.tracks().cloned().collect::<Vec<_>>()));
        let published = Arc::clone(&tracks);

        let handle = thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    FeedCommand::Poll { now, time } => {
                        let report = scheduler.poll(now, &time);
                        *published.write() = scheduler.tracks().cloned().collect();
                        if update_tx.send(FeedUpdate { time, report }).is_err() {
                            break;
                        }
                    }
                    FeedCommand::Cancel(id) => {
                        scheduler.cancel(&id);
                        *published.write() = scheduler.tracks().cloned().collect();
                    }
                    FeedCommand::Stop => break,
                }
            }
            scheduler.shutdown();
            log::debug!("Live feed worker stopped");
        });

        Self {
            sender: cmd_tx,
            receiver: update_rx,
            tracks,
            handle: Some(handle),
        }
    }

    /// Ask the worker to service due timers
    pub fn request_poll(&self, now: Duration, time: Instant) -> bool {
        self.sender.send(FeedCommand::Poll { now, time }).is_ok()
    }

    pub fn cancel(&self, cospar_id: &str) -> bool {
        self.sender
            .send(FeedCommand::Cancel(cospar_id.to_string()))
            .is_ok()
    }

    /// Drain finished polls without blocking
    pub fn try_updates(&self) -> Vec<FeedUpdate> {
        self.receiver.try_iter().collect()
    }

    /// Block until the next poll finishes
    pub fn wait_update(&self, timeout: Duration) -> Option<FeedUpdate> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Copy of the most recently published tracks
    pub fn tracks(&self) -> Vec<LiveTrack> {
        self.tracks.read().clone()
    }

    /// Stop the worker and wait for it to exit
    pub fn stop(&mut self) {
        let _ = self.sender.send(FeedCommand::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Live feed worker panicked");
            }
        }
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::refresh::tests::{epoch, satellites, StubPropagator};
    use crate::simulation::Track;
    use std::sync::atomic::Ordering;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_feed_publishes_tracks() {
        let stub = StubPropagator::default();
        let mut scheduler = RefreshScheduler::new(stub.clone(), 8).unwrap();
        for sat in satellites(2) {
            scheduler.add(sat, Duration::from_secs(1), Some(5)).unwrap();
        }

        let feed = LiveFeed::spawn(scheduler);
        assert!(feed.tracks().iter().all(|t| t.history().is_empty()));

        assert!(feed.request_poll(Duration::ZERO, epoch()));
        let update = feed.wait_update(WAIT).unwrap();
        assert_eq!(update.report.refreshed, 2);

        let tracks = feed.tracks();
        assert_eq!(tracks.len(), 2);
        assert!(tracks.iter().all(|t| t.history().len() == 1));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_cancel_through_feed() {
        let mut scheduler = RefreshScheduler::new(StubPropagator::default(), 8).unwrap();
        let sats = satellites(2);
        let first = sats[0].cospar_id.clone();
        for sat in sats {
            scheduler.add(sat, Duration::from_secs(1), None).unwrap();
        }

        let feed = LiveFeed::spawn(scheduler);
        assert!(feed.cancel(&first));
        feed.request_poll(Duration::ZERO, epoch());
        let update = feed.wait_update(WAIT).unwrap();
        assert_eq!(update.report.refreshed, 1);
        assert!(feed.tracks().iter().all(|t| t.cospar_id != first));
    }

    #[test]
    fn test_try_updates_drains_without_blocking() {
        let mut scheduler = RefreshScheduler::new(StubPropagator::default(), 8).unwrap();
        for sat in satellites(1) {
            scheduler.add(sat, Duration::from_secs(1), None).unwrap();
        }

        let feed = LiveFeed::spawn(scheduler);
        assert!(feed.try_updates().is_empty());
        feed.request_poll(Duration::ZERO, epoch());
        feed.request_poll(Duration::from_secs(2), epoch());

        let mut updates = Vec::new();
        let deadline = std::time::Instant::now() + WAIT;
        while updates.len() < 2 && std::time::Instant::now() < deadline {
            updates.extend(feed.try_updates());
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().all(|u| u.report.refreshed == 1));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let scheduler = RefreshScheduler::new(StubPropagator::default(), 1).unwrap();
        let mut feed = LiveFeed::spawn(scheduler);
        feed.stop();
        feed.stop();
        assert!(!feed.request_poll(Duration::ZERO, epoch()));
    }
}
