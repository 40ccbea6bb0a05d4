//! Placement of records without coordinates.
//!
//! Unlocated records cannot be ordered by distance, but they are still obligations. Each one is
//! placed directly after the first routed stop in its municipality, so the collector passes
//! close by. Records whose municipality has no routed stop stay out of this route and remain
//! eligible for the next one.

use std::collections::HashSet;

use log::debug;

use crate::route::RouteLeg;
use crate::VisitRecord;

/// Splice unlocated records into a GPS-ordered leg list.
///
/// Walks `legs` in order. After each located leg, every not-yet-placed record from
/// `unlocated_pool` with the same municipality is inserted as a zero-distance, zero-time leg
/// tagged with that municipality. At most `remaining_budget` records are inserted; once the
/// budget is spent the walk stops and later anchors are not considered.
///
/// Municipality matching is case-insensitive; records without a municipality never match.
///
/// # Example
/// ```
/// use cobro_route::{interleave_unlocated, GpsPoint, Location, Region, RouteLeg, VisitRecord};
///
/// let region = Region::new("GUATEMALA", "GUATEMALA");
/// let anchor = VisitRecord::new("a", "Ana", region.clone(), Location::at(14.63, -90.51));
/// let legs = vec![RouteLeg::located(anchor, 1.2, 3)];
///
/// let pool = vec![
///     VisitRecord::new("u1", "Ana", region.clone(), Location::NoPriorVisit),
///     VisitRecord::new("u2", "Ana", Region::new("PETEN", "PETEN"), Location::Unparseable),
/// ];
///
/// let combined = interleave_unlocated(&legs, &pool, 5);
/// assert_eq!(combined.len(), 2);
/// assert_eq!(combined[1].record.id, "u1");
/// assert_eq!(combined[1].distance_km, 0.0);
/// ```
pub fn interleave_unlocated(
    legs: &[RouteLeg],
    unlocated_pool: &[VisitRecord],
    remaining_budget: u32,
) -> Vec<RouteLeg> {
    let budget = remaining_budget as usize;
    let pool_keys: Vec<Option<String>> = unlocated_pool
        .iter()
        .map(|record| record.region.municipality_key())
        .collect();

    let mut placed: HashSet<usize> = HashSet::new();
    let mut combined = Vec::with_capacity(legs.len() + budget.min(unlocated_pool.len()));
    let mut legs_iter = legs.iter();

    'anchors: for leg in legs_iter.by_ref() {
        combined.push(leg.clone());

        if placed.len() >= budget {
            break;
        }
        if !leg.located {
            continue;
        }

        let Some(anchor_key) = leg.record.region.municipality_key() else {
            continue;
        };
        let anchor_region = leg
            .record
            .region
            .municipality
            .clone()
            .unwrap_or_else(|| anchor_key.clone());

        for (i, record) in unlocated_pool.iter().enumerate() {
            if placed.len() >= budget {
                break 'anchors;
            }
            if placed.contains(&i) || pool_keys[i].as_deref() != Some(anchor_key.as_str()) {
                continue;
            }

            placed.insert(i);
            combined.push(RouteLeg::anchored(record.clone(), anchor_region.clone()));
        }
    }

    // Legs after an exhausted budget keep their order
    combined.extend(legs_iter.cloned());

    debug!(
        "[Interleave] Placed {} of {} unlocated records across {} legs (budget {})",
        placed.len(),
        unlocated_pool.len(),
        legs.len(),
        remaining_budget
    );

    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, Region};
    use std::collections::HashMap;

    fn anchor(id: &str, municipality: &str) -> RouteLeg {
        let record = VisitRecord::new(
            id,
            "Ana",
            Region::new(municipality, "GUATEMALA"),
            Location::at(14.63, -90.51),
        );
        RouteLeg::located(record, 1.0, 2)
    }

    fn unlocated(id: &str, municipality: &str) -> VisitRecord {
        VisitRecord::new(id, "Ana", Region::new(municipality, ""), Location::NoPriorVisit)
    }

    fn ids(legs: &[RouteLeg]) -> Vec<&str> {
        legs.iter().map(|leg| leg.record.id.as_str()).collect()
    }

    #[test]
    fn test_places_after_same_municipality() {
        let legs = vec![anchor("g1", "GUATEMALA")];
        let pool = vec![unlocated("u1", "GUATEMALA"), unlocated("u2", "GUATEMALA")];

        let combined = interleave_unlocated(&legs, &pool, 2);

        assert_eq!(ids(&combined), vec!["g1", "u1", "u2"]);
        for leg in &combined[1..] {
            assert_eq!(leg.distance_km, 0.0);
            assert_eq!(leg.time_min, 0);
            assert!(!leg.located);
            assert_eq!(leg.anchor_region.as_deref(), Some("GUATEMALA"));
        }
    }

    #[test]
    fn test_unmatched_municipality_is_excluded() {
        let legs = vec![anchor("g1", "GUATEMALA")];
        let pool = vec![unlocated("p1", "PETEN")];

        let combined = interleave_unlocated(&legs, &pool, 5);
        assert_eq!(ids(&combined), vec!["g1"]);
    }

    #[test]
    fn test_missing_municipality_never_matches() {
        let legs = vec![anchor("g1", "GUATEMALA"), anchor("x", "")];
        let pool = vec![unlocated("u1", ""), unlocated("u2", "N/A")];

        let combined = interleave_unlocated(&legs, &pool, 5);
        assert_eq!(ids(&combined), vec!["g1", "x"]);
    }

    #[test]
    fn test_matching_ignores_case() {
        let legs = vec![anchor("m1", "Mixco")];
        let pool = vec![unlocated("u1", " MIXCO ")];

        let combined = interleave_unlocated(&legs, &pool, 1);
        assert_eq!(ids(&combined), vec!["m1", "u1"]);
        assert_eq!(combined[1].anchor_region.as_deref(), Some("Mixco"));
    }

    #[test]
    fn test_each_record_placed_once() {
        let legs = vec![anchor("g1", "GUATEMALA"), anchor("g2", "GUATEMALA")];
        let pool = vec![unlocated("u1", "GUATEMALA")];

        let combined = interleave_unlocated(&legs, &pool, 10);
        assert_eq!(ids(&combined), vec!["g1", "u1", "g2"]);
    }

    #[test]
    fn test_budget_exhausted_mid_anchor_stops_walk() {
        let legs = vec![anchor("g1", "GUATEMALA"), anchor("m1", "MIXCO")];
        let pool = vec![
            unlocated("u1", "GUATEMALA"),
            unlocated("u2", "GUATEMALA"),
            unlocated("u3", "GUATEMALA"),
            unlocated("v1", "MIXCO"),
        ];

        let combined = interleave_unlocated(&legs, &pool, 2);

        // Later anchors get nothing, but still stay in the route
        assert_eq!(ids(&combined), vec!["g1", "u1", "u2", "m1"]);
    }

    #[test]
    fn test_zero_budget_places_nothing() {
        let legs = vec![anchor("g1", "GUATEMALA"), anchor("g2", "GUATEMALA")];
        let pool = vec![unlocated("u1", "GUATEMALA")];

        let combined = interleave_unlocated(&legs, &pool, 0);
        assert_eq!(combined, legs);
    }

    #[test]
    fn test_multiple_anchors() {
        let legs = vec![
            anchor("m1", "MIXCO"),
            anchor("g1", "GUATEMALA"),
            anchor("v1", "VILLA NUEVA"),
        ];
        let pool = vec![
            unlocated("ug", "GUATEMALA"),
            unlocated("up", "PETEN"),
            unlocated("uv", "VILLA NUEVA"),
            unlocated("um", "MIXCO"),
        ];

        let combined = interleave_unlocated(&legs, &pool, 10);
        assert_eq!(ids(&combined), vec!["m1", "um", "g1", "ug", "v1", "uv"]);
    }

    #[test]
    fn test_invariants_hold_over_mixed_input() {
        let municipalities = ["GUATEMALA", "MIXCO", "VILLA NUEVA", "PETEN"];
        let legs: Vec<RouteLeg> = (0..6)
            .map(|i| anchor(&format!("a{}", i), municipalities[i % 3]))
            .collect();
        let pool: Vec<VisitRecord> = (0..16)
            .map(|i| unlocated(&format!("u{}", i), municipalities[i % 4]))
            .collect();

        for budget in 0..12u32 {
            let combined = interleave_unlocated(&legs, &pool, budget);
            let inserted: Vec<&RouteLeg> = combined.iter().filter(|leg| !leg.located).collect();

            assert!(inserted.len() <= budget as usize);

            let mut seen: HashMap<&str, u32> = HashMap::new();
            for leg in &inserted {
                *seen.entry(leg.record.id.as_str()).or_insert(0) += 1;
                assert_ne!(leg.record.region.municipality.as_deref(), Some("PETEN"));
            }
            assert!(seen.values().all(|&count| count == 1));

            // Located legs keep their relative order
            let located: Vec<&str> = combined
                .iter()
                .filter(|leg| leg.located)
                .map(|leg| leg.record.id.as_str())
                .collect();
            assert_eq!(located, ids(&legs));
        }
    }
}
