//! SGP4 propagation using satkit

use satkit::sgp4::sgp4;
use satkit::Instant;

use super::geodetic::{normalize_longitude, GeodeticPosition};
use crate::data::TrackedSatellite;

/// Position source for live bodies.
///
/// Implementations must be `Send + Sync` so the live feed can run them on its
/// worker thread.
pub trait GeodeticPropagator: Send + Sync {
    /// Geodetic position of `satellite` at `time`, `None` if propagation fails
    fn geodetic_at(&self, satellite: &TrackedSatellite, time: &Instant) -> Option<GeodeticPosition>;

    fn name(&self) -> &'static str;
}

/// SGP4 via satkit, TEME -> ITRF -> geodetic
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl Sgp4Propagator {
    pub fn new() -> Self {
        Self
    }
}

impl GeodeticPropagator for Sgp4Propagator {
    fn geodetic_at(&self, satellite: &TrackedSatellite, time: &Instant) -> Option<GeodeticPosition> {
        let mut tle = satellite.tle.clone();
        let result = match sgp4(&mut tle, &[*time]) {
            Ok(result) => result,
            Err(_) => {
                log::trace!("SGP4 failed for {}", satellite.display_name);
                return None;
            }
        };

        // pos is in TEME, meters
        let pos = result.pos.column(0);
        let pos_teme = nalgebra::Vector3::new(pos[0], pos[1], pos[2]);
        if !pos_teme.iter().all(|v| v.is_finite()) {
            return None;
        }

        // SGP4 output is TEME; rotate straight to Earth-fixed
        let pos_itrf = satkit::frametransform::qteme2itrf(time) * pos_teme;

        let coord =
            satkit::itrfcoord::ITRFCoord::from_slice(&[pos_itrf.x, pos_itrf.y, pos_itrf.z]).ok()?;

        Some(GeodeticPosition::new(
            coord.latitude_deg(),
            normalize_longitude(coord.longitude_deg()),
            coord.hae(),
        ))
    }

    fn name(&self) -> &'static str {
        "SGP4"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AllowList, CatalogMatch, TleRecord};

    const ISS_LINE1: &str =
        "1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927";
    const ISS_LINE2: &str =
        "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537";

    fn iss() -> TrackedSatellite {
        let record = TleRecord {
            name: "ISS (ZARYA)".to_string(),
            line1: ISS_LINE1.to_string(),
            line2: ISS_LINE2.to_string(),
        };
        let matched = CatalogMatch {
            cospar_id: "98067A".to_string(),
            display_name: AllowList::builtin()
                .display_name("98067A")
                .unwrap_or("ISS")
                .to_string(),
            record,
        };
        TrackedSatellite::from_match(matched).unwrap()
    }

    #[test]
    fn test_iss_altitude_and_latitude() {
        let sat = iss();
        let epoch = sat.tle.epoch;
        let geo = Sgp4Propagator::new().geodetic_at(&sat, &epoch).unwrap();

        // Low Earth orbit, bounded by the 51.6 degree inclination
        assert!(geo.height_m > 250_000.0 && geo.height_m < 500_000.0);
        assert!(geo.latitude_deg.abs() <= 52.0);
        assert!(geo.longitude_deg >= -180.0 && geo.longitude_deg <= 180.0);
    }

    #[test]
    fn test_position_changes_over_time() {
        let sat = iss();
        let epoch = sat.tle.epoch;
        let later = epoch + satkit::Duration::from_seconds(600.0);
        let prop = Sgp4Propagator::new();

        let a = prop.geodetic_at(&sat, &epoch).unwrap().to_cartesian();
        let b = prop.geodetic_at(&sat, &later).unwrap().to_cartesian();
        // Roughly 7.7 km/s for ten minutes
        let distance = (b - a).length();
        assert!(distance > 1_000_000.0);
    }

    #[test]
    fn test_earth_fixed_radius_matches_teme() {
        let sat = iss();
        let prop = Sgp4Propagator::new();
        for minutes in [0.0, 15.0, 45.0, 90.0] {
            let time = sat.tle.epoch + satkit::Duration::from_seconds(minutes * 60.0);
            let mut tle = sat.tle.clone();
            let teme = match sgp4(&mut tle, &[time]) {
                Ok(result) => result,
                Err(_) => panic!("SGP4 failed at +{} min", minutes),
            };
            let pos = teme.pos.column(0);
            let teme_radius = (pos[0] * pos[0] + pos[1] * pos[1] + pos[2] * pos[2]).sqrt();

            let fixed = prop.geodetic_at(&sat, &time).unwrap().to_cartesian();
            // Rotation keeps the radius; only the geodetic round trip adds error
            assert!((fixed.length() - teme_radius).abs() < 1.0);
        }
    }
}
