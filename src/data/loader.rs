//! Catalog loading from the network or local files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

use super::{parse_catalog, AllowList, TrackedSatellite};

/// CelesTrak space stations group in three-line format
pub const DEFAULT_CATALOG_URL: &str =
    "https://celestrak.org/NORAD/elements/gp.php?GROUP=stations&FORMAT=tle";

/// Fetch the catalog text with a single GET.
///
/// No retry and no cancellation: any failure is logged and yields `None`.
pub fn fetch_catalog(url: &str) -> Option<String> {
    log::info!("Fetching TLE catalog from {}", url);

    let response = match ureq::get(url).call() {
        Ok(response) => response,
        Err(e) => {
            log::error!("Failed to fetch TLE catalog from {}: {}", url, e);
            return None;
        }
    };

    match response.into_string() {
        Ok(body) => {
            log::info!("Fetched {} bytes of TLE data", body.len());
            Some(body)
        }
        Err(e) => {
            log::error!("Failed to read TLE catalog body from {}: {}", url, e);
            None
        }
    }
}

/// Load a catalog from disk, gunzipping files ending in `.gz`
pub fn load_catalog_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    log::info!("Loading TLE catalog from {:?}", path);

    let file =
        File::open(path).with_context(|| format!("Failed to open TLE catalog: {:?}", path))?;
    let mut reader = BufReader::new(file);

    let mut text = String::new();
    if path.extension().map_or(false, |ext| ext == "gz") {
        GzDecoder::new(reader)
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to decompress TLE catalog: {:?}", path))?;
    } else {
        reader
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to read TLE catalog: {:?}", path))?;
    }

    Ok(text)
}

/// Parse, filter and load every allow-listed satellite in `text`
pub fn select_satellites(text: &str, allow: &AllowList) -> Vec<TrackedSatellite> {
    let records = parse_catalog(text);
    let satellites: Vec<TrackedSatellite> = allow
        .filter(&records)
        .into_iter()
        .filter_map(TrackedSatellite::from_match)
        .collect();

    log::info!("Tracking {} satellites", satellites.len());
    satellites
}

/// Fetch from `url` and select satellites; empty when the fetch fails
pub fn fetch_satellites(url: &str, allow: &AllowList) -> Vec<TrackedSatellite> {
    match fetch_catalog(url) {
        Some(text) => select_satellites(&text, allow),
        None => {
            log::warn!("No catalog available, continuing with zero live bodies");
            Vec::new()
        }
    }
}
