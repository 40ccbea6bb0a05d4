//! Nearest-neighbor route sequencing.
//!
//! Single pass, no backtracking: from the current position, always go to the remaining record
//! with the smallest corrected travel distance. Equal distances keep the earliest record in
//! input order, so the output is fully determined by the order of `eligible`.

use log::debug;

use crate::cost::CostModel;
use crate::route::RouteLeg;
use crate::{GpsPoint, VisitRecord};

/// Build a greedy visiting sequence of at most `min(target_count, eligible.len())` legs.
///
/// Every record in `eligible` is expected to have coordinates; the caller filters out visited,
/// already-routed and unlocated records beforehand. A record without coordinates is skipped.
/// An empty pool yields an empty route.
///
/// Runs in O(n²) over the pool, which stays in the low hundreds per collector and day.
///
/// # Example
/// ```
/// use cobro_route::{build_route, CostModel, GpsPoint, Location, Region, VisitRecord};
///
/// let start = GpsPoint::new(14.6349, -90.5069);
/// let region = Region::new("Mixco", "Guatemala");
/// let pool = vec![
///     VisitRecord::new("far", "Ana", region.clone(), Location::at(14.70, -90.50)),
///     VisitRecord::new("near", "Ana", region, Location::at(14.64, -90.50)),
/// ];
///
/// let legs = build_route(&start, &pool, 1, CostModel::shared());
/// assert_eq!(legs.len(), 1);
/// assert_eq!(legs[0].record.id, "near");
/// ```
pub fn build_route(
    start: &GpsPoint,
    eligible: &[VisitRecord],
    target_count: u32,
    model: &CostModel,
) -> Vec<RouteLeg> {
    let mut remaining: Vec<(&VisitRecord, GpsPoint)> = eligible
        .iter()
        .filter_map(|record| match record.point() {
            Some(point) => Some((record, point)),
            None => {
                debug!("[Sequencer] Skipping {} without coordinates", record.id);
                None
            }
        })
        .collect();

    let max_legs = (target_count as usize).min(eligible.len());
    let mut legs = Vec::with_capacity(max_legs);
    let mut current = *start;

    while legs.len() < max_legs && !remaining.is_empty() {
        let mut nearest: Option<(usize, f64)> = None;

        for (i, (record, point)) in remaining.iter().enumerate() {
            let distance = model.travel_distance_km(&current, point, &record.region);
            // Strict comparison keeps the first of equal candidates
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((i, distance));
            }
        }

        let Some((index, distance_km)) = nearest else {
            break;
        };

        let (record, point) = remaining.remove(index);
        let time_min = model.travel_time_min(distance_km, &record.region);
        legs.push(RouteLeg::located(record.clone(), distance_km, time_min));
        current = point;
    }

    debug!(
        "[Sequencer] Built {} legs from {} eligible records (target {})",
        legs.len(),
        eligible.len(),
        target_count
    );

    legs
}
