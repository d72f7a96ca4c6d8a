use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::attendance::geo::Coordinate;
use crate::error::{AttendanceError, AttendanceResult};

/// A circular geofence around an office. `company_id = None` means the fence
/// applies to every company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 3,
        "name": "Main Office",
        "latitude": 23.8103,
        "longitude": 90.4125,
        "radius_meters": 50.0,
        "company_id": 7
    })
)]
pub struct OfficeLocation {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub company_id: Option<u64>,
}

impl OfficeLocation {
    pub fn center(&self) -> Coordinate {
        Coordinate {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOfficeLocation {
    pub name: String,
    pub center: Coordinate,
    pub radius_meters: f64,
    pub company_id: Option<u64>,
}

impl NewOfficeLocation {
    pub fn new(
        name: &str,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        company_id: Option<u64>,
    ) -> AttendanceResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AttendanceError::invalid("location name must not be empty"));
        }
        validate_radius(radius_meters)?;

        Ok(Self {
            name: name.to_string(),
            center: Coordinate::new(latitude, longitude)?,
            radius_meters,
            company_id,
        })
    }
}

pub fn validate_radius(radius_meters: f64) -> AttendanceResult<()> {
    if radius_meters.is_finite() && radius_meters > 0.0 {
        Ok(())
    } else {
        Err(AttendanceError::invalid("radius_meters must be greater than 0"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_location_trims_and_validates() {
        let loc = NewOfficeLocation::new("  Main Office ", 23.81, 90.41, 50.0, Some(7)).unwrap();
        assert_eq!(loc.name, "Main Office");
        assert_eq!(loc.center.latitude, 23.81);
    }

    #[test]
    fn radius_must_be_positive() {
        assert!(NewOfficeLocation::new("HQ", 0.0, 0.0, 0.0, None).is_err());
        assert!(NewOfficeLocation::new("HQ", 0.0, 0.0, -5.0, None).is_err());
        assert!(NewOfficeLocation::new("HQ", 0.0, 0.0, f64::NAN, None).is_err());
    }

    #[test]
    fn blank_name_and_bad_coordinates_are_rejected() {
        assert!(NewOfficeLocation::new("   ", 0.0, 0.0, 50.0, None).is_err());
        assert!(NewOfficeLocation::new("HQ", 95.0, 0.0, 50.0, None).is_err());
    }
}
