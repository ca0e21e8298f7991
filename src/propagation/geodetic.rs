//! Geodetic coordinates on the WGS84 ellipsoid

use glam::DVec3;
use serde::Serialize;

/// WGS84 semi-major axis (meters)
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Latitude/longitude in degrees, height above the ellipsoid in meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub height_m: f64,
}

impl GeodeticPosition {
    pub fn new(latitude_deg: f64, longitude_deg: f64, height_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            height_m,
        }
    }

    /// Earth-fixed Cartesian position (meters), the globe renderer's frame
    pub fn to_cartesian(&self) -> DVec3 {
        let e2 = WGS84_F * (2.0 - WGS84_F);
        let lat = self.latitude_deg.to_radians();
        let lon = self.longitude_deg.to_radians();
        let (sin_lat, cos_lat) = lat.sin_cos();
        let (sin_lon, cos_lon) = lon.sin_cos();

        // Prime vertical radius of curvature
        let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();

        DVec3::new(
            (n + self.height_m) * cos_lat * cos_lon,
            (n + self.height_m) * cos_lat * sin_lon,
            (n * (1.0 - e2) + self.height_m) * sin_lat,
        )
    }
}

/// Wrap a longitude into [-180, 180]
pub(crate) fn normalize_longitude(mut lon: f64) -> f64 {
    if lon > 180.0 {
        lon -= 360.0;
    } else if lon < -180.0 {
        lon += 360.0;
    }
    lon
}
