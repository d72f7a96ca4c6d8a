use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AttendanceError, AttendanceResult};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A validated WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinate {
    #[schema(example = 23.8103)]
    pub latitude: f64,
    #[schema(example = 90.4125)]
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> AttendanceResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AttendanceError::invalid(format!(
                "latitude {latitude} is outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AttendanceError::invalid(format!(
                "longitude {longitude} is outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds a coordinate from a pair of optional columns; both must be set.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(Self {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance_meters(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Great-circle distance in meters on a spherical Earth.
///
/// NaN inputs propagate; callers validate ranges through [`Coordinate::new`].
pub fn distance_meters(lat_a: f64, lon_a: f64, lat_b: f64, lon_b: f64) -> f64 {
    let phi_a = lat_a.to_radians();
    let phi_b = lat_b.to_radians();
    let d_phi = (lat_b - lat_a).to_radians();
    let d_lambda = (lon_b - lon_a).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);
    // rounding can push h a hair past 1 for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().atan2((1.0 - h).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_meters(23.8103, 90.4125, 23.8103, 90.4125), 0.0);
        assert_eq!(distance_meters(-33.86, 151.21, -33.86, 151.21), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            ((23.8103, 90.4125), (22.3569, 91.7832)),
            ((51.5074, -0.1278), (40.7128, -74.0060)),
            ((-33.8688, 151.2093), (35.6762, 139.6503)),
            ((0.0, 179.9), (0.0, -179.9)),
        ];
        for ((lat_a, lon_a), (lat_b, lon_b)) in pairs {
            assert_eq!(
                distance_meters(lat_a, lon_a, lat_b, lon_b),
                distance_meters(lat_b, lon_b, lat_a, lon_a)
            );
        }
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn london_to_new_york() {
        let d = distance_meters(51.5074, -0.1278, 40.7128, -74.0060);
        assert!((d - 5_570_000.0).abs() < 10_000.0, "got {d}");
    }

    #[test]
    fn antipodes_do_not_produce_nan() {
        let d = distance_meters(0.0, 0.0, 0.0, 180.0);
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_METERS).abs() < 1.0);
    }

    #[test]
    fn nan_propagates() {
        assert!(distance_meters(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn coordinate_rejects_out_of_range_values() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn coordinate_from_parts_needs_both_halves() {
        assert!(Coordinate::from_parts(Some(1.0), None).is_none());
        assert!(Coordinate::from_parts(None, Some(1.0)).is_none());
        assert_eq!(
            Coordinate::from_parts(Some(1.0), Some(2.0)),
            Some(Coordinate {
                latitude: 1.0,
                longitude: 2.0
            })
        );
    }
}
