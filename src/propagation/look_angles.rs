//! Topocentric look angles from a ground observer

use glam::DVec3;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use super::geodetic::GeodeticPosition;

/// Ground station location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Observer {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Kennedy Space Center
    pub fn kennedy() -> Self {
        Self::new(28.5721, -80.6480, 0.0)
    }

    pub fn geodetic(&self) -> GeodeticPosition {
        GeodeticPosition::new(self.latitude_deg, self.longitude_deg, self.altitude_m)
    }

    /// Rotation from Earth-fixed to local east/north/up
    fn enu_rotation(&self) -> Matrix3<f64> {
        let (sin_lat, cos_lat) = self.latitude_deg.to_radians().sin_cos();
        let (sin_lon, cos_lon) = self.longitude_deg.to_radians().sin_cos();
        Matrix3::new(
            -sin_lon,
            cos_lon,
            0.0,
            -sin_lat * cos_lon,
            -sin_lat * sin_lon,
            cos_lat,
            cos_lat * cos_lon,
            cos_lat * sin_lon,
            sin_lat,
        )
    }
}

/// Range, elevation and azimuth of a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LookAngles {
    pub range_m: f64,
    pub elevation_deg: f64,
    /// Clockwise from north, [0, 360)
    pub azimuth_deg: f64,
}

impl LookAngles {
    pub fn is_visible(&self) -> bool {
        self.elevation_deg > 0.0
    }
}

/// Look angles from `observer` to a target at `target`
pub fn look_angles(observer: &Observer, target: &GeodeticPosition) -> LookAngles {
    look_angles_cartesian(observer, target.to_cartesian())
}

pub fn look_angles_cartesian(observer: &Observer, target: DVec3) -> LookAngles {
    let relative = target - observer.geodetic().to_cartesian();
    let enu = observer.enu_rotation() * Vector3::new(relative.x, relative.y, relative.z);

    let range_m = enu.norm();
    if range_m == 0.0 {
        return LookAngles {
            range_m,
            elevation_deg: 90.0,
            azimuth_deg: 0.0,
        };
    }

    let elevation_deg = (enu.z / range_m).clamp(-1.0, 1.0).asin().to_degrees();
    let azimuth_deg = enu.x.atan2(enu.y).to_degrees().rem_euclid(360.0);

    LookAngles {
        range_m,
        elevation_deg,
        azimuth_deg,
    }
}
