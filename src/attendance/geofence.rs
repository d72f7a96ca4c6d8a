use serde::Serialize;
use utoipa::ToSchema;

use super::geo::Coordinate;
use crate::model::office_location::OfficeLocation;

/// Closest fence to a probe, reported when the probe is outside every fence.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NearestFence {
    pub location_id: u64,
    pub name: String,
    pub distance_meters: f64,
    pub radius_meters: f64,
}

pub fn is_inside(probe: &Coordinate, fence: &OfficeLocation) -> bool {
    probe.distance_to(&fence.center()) <= fence.radius_meters
}

/// True when the probe lies inside at least one fence; an empty set never matches.
pub fn is_within_any_fence(probe: &Coordinate, fences: &[OfficeLocation]) -> bool {
    fences.iter().any(|fence| is_inside(probe, fence))
}

pub fn nearest_fence(probe: &Coordinate, fences: &[OfficeLocation]) -> Option<NearestFence> {
    fences
        .iter()
        .map(|fence| (fence, probe.distance_to(&fence.center())))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(fence, distance)| NearestFence {
            location_id: fence.id,
            name: fence.name.clone(),
            distance_meters: distance,
            radius_meters: fence.radius_meters,
        })
}
