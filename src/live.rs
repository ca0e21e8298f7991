//! Live catalog commands: timed SGP4 refresh and ground-station look angles

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use satkit::Instant;
use serde::Serialize;

use crate::config::{LiveConfig, SimConfig};
use crate::data::{fetch_satellites, load_catalog_file, select_satellites, AllowList, TrackedSatellite};
use crate::headless::write_json;
use crate::propagation::{
    look_angles, GeodeticPosition, GeodeticPropagator, LookAngles, Observer, Sgp4Propagator,
};
use crate::scheduler::{LiveFeed, RefreshScheduler};
use crate::simulation::{instant_from_chrono, now_instant, TrackSnapshot};

/// Where to read the TLE catalog from
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Local TLE file (optionally .gz) instead of fetching
    #[arg(long)]
    pub catalog_file: Option<PathBuf>,
    /// Catalog URL (overrides config)
    #[arg(long)]
    pub catalog_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct LiveArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,
    /// Wall seconds to run the feed
    #[arg(long, default_value_t = 10.0)]
    pub seconds: f64,
    /// Refresh interval per body in milliseconds (overrides config)
    #[arg(long)]
    pub interval_ms: Option<u64>,
    /// Propagation calls allowed per poll (overrides config)
    #[arg(long)]
    pub max_in_flight: Option<usize>,
    /// COSPAR ID of the body to follow
    #[arg(long)]
    pub follow: Option<String>,
    /// Output JSON file path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct LookArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,
    /// Observer latitude in degrees (defaults to Kennedy Space Center)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Observer longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,
    /// Observer altitude in meters
    #[arg(long, default_value_t = 0.0)]
    pub alt: f64,
    /// RFC 3339 time, defaults to now
    #[arg(long)]
    pub at: Option<String>,
    /// Restrict to these COSPAR IDs
    #[arg(long = "cospar")]
    pub cospar_ids: Vec<String>,
    /// Only report bodies above the horizon
    #[arg(long)]
    pub visible_only: bool,
    /// Output JSON file path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Load the allow-listed satellites from disk or the network.
///
/// A failed fetch yields an empty list; a missing local file is an error.
pub fn load_satellites(live: &LiveConfig, args: &CatalogArgs) -> Result<Vec<TrackedSatellite>> {
    let allow = AllowList::builtin();
    let file: Option<&Path> = args
        .catalog_file
        .as_deref()
        .or(live.catalog_file.as_deref());

    match file {
        Some(path) => {
            let text = load_catalog_file(path)?;
            Ok(select_satellites(&text, &allow))
        }
        None => {
            let url = args.catalog_url.as_deref().unwrap_or(&live.catalog_url);
            Ok(fetch_satellites(url, &allow))
        }
    }
}

#[derive(Debug, Serialize)]
struct LiveTrackRecord {
    cospar_id: String,
    refreshes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    geodetic: Option<GeodeticPosition>,
    #[serde(flatten)]
    track: TrackSnapshot,
}

#[derive(Debug, Default, Serialize)]
struct LiveReport {
    generated_at: String,
    polls: u64,
    refreshed: usize,
    deferred: usize,
    failed: usize,
    followed: Option<String>,
    tracks: Vec<LiveTrackRecord>,
}

pub fn run_live(args: LiveArgs, config: &SimConfig) -> Result<()> {
    if !args.seconds.is_finite() || args.seconds <= 0.0 {
        return Err(anyhow!("seconds must be > 0"));
    }
    let live = &config.live;
    let interval = args
        .interval_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| live.refresh_interval());
    let max_in_flight = args.max_in_flight.unwrap_or(live.max_in_flight);

    let satellites = load_satellites(live, &args.catalog)?;
    if satellites.is_empty() {
        log::warn!("No tracked satellites available, nothing to refresh");
        return Ok(());
    }
    log::info!(
        "Tracking {} satellites every {:?} for {}s",
        satellites.len(),
        interval,
        args.seconds
    );

    let scheduler = RefreshScheduler::new(Sgp4Propagator::new(), max_in_flight)?;
    let report = drive_feed(
        scheduler,
        satellites,
        interval,
        live.history_cap,
        Duration::from_secs_f64(args.seconds),
        args.follow.as_deref(),
    )?;

    for record in &report.tracks {
        if let Some(g) = record.geodetic {
            log::info!(
                "{} ({}): lat {:.3} lon {:.3} alt {:.1} km",
                record.track.name,
                record.cospar_id,
                g.latitude_deg,
                g.longitude_deg,
                g.height_m / 1000.0
            );
        } else {
            log::warn!("{} ({}): no position", record.track.name, record.cospar_id);
        }
    }

    if let Some(output) = &args.output {
        write_json(output, &report)?;
    }
    Ok(())
}

fn drive_feed<P: GeodeticPropagator + 'static>(
    mut scheduler: RefreshScheduler<P>,
    satellites: Vec<TrackedSatellite>,
    interval: Duration,
    history_cap: Option<usize>,
    run_for: Duration,
    follow: Option<&str>,
) -> Result<LiveReport> {
    for satellite in satellites {
        scheduler.add(satellite, interval, history_cap)?;
    }
    let followed = match follow {
        Some(id) => {
            scheduler.follow(id)?;
            scheduler.followed().map(|t| t.cospar_id.clone())
        }
        None => None,
    };

    let mut feed = LiveFeed::spawn(scheduler);
    let poll_every = interval.min(Duration::from_millis(100));
    let started = std::time::Instant::now();
    let mut report = LiveReport {
        followed,
        ..Default::default()
    };

    loop {
        let now = started.elapsed();
        if now >= run_for {
            break;
        }
        if !feed.request_poll(now, now_instant()?) {
            return Err(anyhow!("live feed worker exited early"));
        }
        if let Some(update) = feed.wait_update(poll_every.max(Duration::from_secs(1))) {
            report.polls += 1;
            report.refreshed += update.report.refreshed;
            report.deferred += update.report.deferred;
            report.failed += update.report.failed;
        }
        std::thread::sleep(poll_every);
    }

    for update in feed.try_updates() {
        report.polls += 1;
        report.refreshed += update.report.refreshed;
        report.deferred += update.report.deferred;
        report.failed += update.report.failed;
    }
    report.tracks = feed
        .tracks()
        .iter()
        .map(|t| LiveTrackRecord {
            cospar_id: t.cospar_id.clone(),
            refreshes: t.refreshes(),
            geodetic: t.geodetic(),
            track: TrackSnapshot::from_track(t, None),
        })
        .collect();
    feed.stop();
    report.generated_at = chrono::Utc::now().to_rfc3339();
    Ok(report)
}

#[derive(Debug, Clone, Serialize)]
pub struct LookRecord {
    pub cospar_id: String,
    pub name: String,
    pub geodetic: GeodeticPosition,
    pub look: LookAngles,
}

/// Propagate every satellite to `time` and compute its look angles
pub fn compute_look_angles<P: GeodeticPropagator>(
    propagator: &P,
    satellites: &[TrackedSatellite],
    observer: &Observer,
    time: &Instant,
) -> Vec<LookRecord> {
    satellites
        .iter()
        .filter_map(|sat| {
            let geodetic = propagator.geodetic_at(sat, time)?;
            Some(LookRecord {
                cospar_id: sat.cospar_id.clone(),
                name: sat.display_name.clone(),
                geodetic,
                look: look_angles(observer, &geodetic),
            })
        })
        .collect()
}

fn parse_time(at: Option<&str>) -> Result<Instant> {
    match at {
        Some(text) => {
            let time = chrono::DateTime::parse_from_rfc3339(text)
                .with_context(|| format!("Invalid time: {}", text))?
                .with_timezone(&chrono::Utc);
            instant_from_chrono(&time).ok_or_else(|| anyhow!("Time out of range: {}", text))
        }
        None => Ok(now_instant()?),
    }
}

pub fn run_look(args: LookArgs, config: &SimConfig) -> Result<()> {
    let observer = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Observer::new(lat, lon, args.alt),
        (None, None) => Observer::kennedy(),
        _ => return Err(anyhow!("--lat and --lon must be given together")),
    };
    if !(-90.0..=90.0).contains(&observer.latitude_deg) {
        return Err(anyhow!("latitude must be within [-90, 90]"));
    }
    let time = parse_time(args.at.as_deref())?;

    let mut satellites = load_satellites(&config.live, &args.catalog)?;
    if !args.cospar_ids.is_empty() {
        satellites.retain(|s| args.cospar_ids.contains(&s.cospar_id));
    }
    if satellites.is_empty() {
        log::warn!("No tracked satellites available");
    }

    let mut records = compute_look_angles(&Sgp4Propagator::new(), &satellites, &observer, &time);
    if args.visible_only {
        records.retain(|r| r.look.is_visible());
    }

    for r in &records {
        log::info!(
            "{} ({}): az {:.1} el {:.1} range {:.0} km{}",
            r.name,
            r.cospar_id,
            r.look.azimuth_deg,
            r.look.elevation_deg,
            r.look.range_m / 1000.0,
            if r.look.is_visible() { "" } else { " (below horizon)" }
        );
    }

    if let Some(output) = &args.output {
        write_json(output, &records)?;
    }
    Ok(())
}
