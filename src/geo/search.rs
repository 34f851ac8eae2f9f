use super::distance::distance_km;
use super::{Coordinate, RankedSpot, SpotCandidate};

/// Available candidates within `radius_km` of `origin`, nearest first.
///
/// Ties keep the input order. Candidates are cloned into the result and
/// never modified.
///
/// # Panics
///
/// If `origin` is not a valid coordinate, if `radius_km` is NaN or negative,
/// or if an available candidate has a non-finite position. Request input is
/// validated before it gets here, so any of these is a caller bug.
pub fn search(origin: Coordinate, radius_km: f64, candidates: &[SpotCandidate]) -> Vec<RankedSpot> {
    assert!(origin.is_valid(), "search origin {:?} is not a valid coordinate", origin);
    assert!(
        radius_km >= 0.0,
        "search radius must be a non-negative number, got {}",
        radius_km
    );

    let mut ranked: Vec<RankedSpot> = candidates
        .iter()
        .filter(|candidate| candidate.is_available)
        .filter_map(|candidate| {
            assert!(
                candidate.coordinate.latitude.is_finite() && candidate.coordinate.longitude.is_finite(),
                "spot {} has a non-finite position",
                candidate.id
            );
            let distance_km = distance_km(origin, candidate.coordinate);
            (distance_km <= radius_km).then(|| RankedSpot {
                spot: candidate.clone(),
                distance_km,
            })
        })
        .collect();

    // sort_by is stable, so equal distances stay in candidate order.
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}
