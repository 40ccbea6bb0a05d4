//! Caller-side planning around the route engine.
//!
//! The sequencer and interleaver assume pre-filtered input. This module applies the record
//! store contracts before they run and handles the feedback loop after a visit:
//! - [`parse_start_point`] - validate the `"lat,lng"` start field
//! - [`eligible_records`] - collector, not visited, not in an earlier route
//! - [`plan_route`] - sequence located records, then interleave unlocated ones
//! - [`summarize_collectors`] - per-collector counts for the collector picker
//! - [`record_visit`] - append a visit attempt with its deviation from the plan

use std::collections::{BTreeMap, HashSet};

use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::cost::CostModel;
use crate::error::{Result, RouteError};
use crate::interleave::interleave_unlocated;
use crate::route::Route;
use crate::sequencer::build_route;
use crate::{GpsPoint, Location, VisitAttempt, VisitKind, VisitRecord};

/// Visits requested when the host does not say otherwise.
pub const DEFAULT_TARGET_VISITS: u32 = 10;

/// Parameters for one collector's route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteRequest {
    pub collector: String,
    pub start: GpsPoint,
    /// Minimum number of visits wanted for the day.
    /// Default: 10
    pub target_visits: u32,
    /// Creation time stamped on the route (Unix timestamp, seconds)
    pub created_at: i64,
}

impl RouteRequest {
    pub fn new(collector: &str, start: GpsPoint) -> Self {
        Self {
            collector: collector.to_string(),
            start,
            target_visits: DEFAULT_TARGET_VISITS,
            created_at: 0,
        }
    }

    pub fn with_target_visits(mut self, target_visits: u32) -> Self {
        self.target_visits = target_visits;
        self
    }

    pub fn with_created_at(mut self, created_at: i64) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Records a collector may be routed to, split by whether they have coordinates.
///
/// Both pools keep the input order, which fixes the sequencer's tie-breaking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EligiblePools {
    pub located: Vec<VisitRecord>,
    pub unlocated: Vec<VisitRecord>,
}

/// A planned route plus what the host needs to decide whether to accept it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RoutePlan {
    pub route: Route,
    /// Eligible records with coordinates
    pub available_located: u32,
    /// Eligible records without coordinates
    pub available_unlocated: u32,
    /// Visits missing to reach the target (0 when the target is met)
    pub shortfall: u32,
}

/// Per-collector record counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CollectorSummary {
    pub collector: String,
    pub total: u32,
    pub domiciliary: u32,
    pub workplace: u32,
    pub visited: u32,
    pub pending: u32,
}

/// A visit reported from the field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisitReport {
    /// Unix timestamp, seconds
    pub timestamp: i64,
    /// Whether the client was found
    pub located: bool,
    pub visit_kind: VisitKind,
    /// Collector's GPS position when reporting
    pub actual_location: Option<GpsPoint>,
    pub collector: String,
}

/// Parse a `"latitude,longitude"` start point.
///
/// Rejects wrong arity, non-numeric parts, and coordinates outside the valid range.
///
/// # Example
/// ```
/// use cobro_route::{parse_start_point, GpsPoint};
///
/// assert_eq!(parse_start_point(" 14.6349, -90.5069 ").unwrap(), GpsPoint::new(14.6349, -90.5069));
/// assert!(parse_start_point("14.6349").is_err());
/// assert!(parse_start_point("north,west").is_err());
/// assert!(parse_start_point("95.0,-90.5").is_err());
/// ```
pub fn parse_start_point(input: &str) -> Result<GpsPoint> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    let [lat, lng] = parts.as_slice() else {
        return Err(RouteError::malformed(input));
    };

    let parse = |part: &str| -> Result<f64> {
        part.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| RouteError::malformed(input))
    };

    let point = GpsPoint::new(parse(*lat)?, parse(*lng)?);
    if !point.is_valid() {
        return Err(RouteError::StartPointOutOfRange {
            latitude: point.latitude,
            longitude: point.longitude,
        });
    }

    Ok(point)
}

/// Select the records `collector` can be routed to today.
///
/// Keeps records assigned to `collector` that are not visited and whose id is not in
/// `already_routed` (ids referenced by the collector's persisted routes).
pub fn eligible_records(
    records: &[VisitRecord],
    collector: &str,
    already_routed: &HashSet<String>,
) -> EligiblePools {
    let (located, unlocated): (Vec<VisitRecord>, Vec<VisitRecord>) = records
        .iter()
        .filter(|record| {
            record.collector == collector
                && !record.visited
                && !already_routed.contains(&record.id)
        })
        .cloned()
        .partition(|record| record.location.has_coordinates());

    debug!(
        "[Planner] {}: {} located, {} unlocated eligible records",
        collector,
        located.len(),
        unlocated.len()
    );

    EligiblePools { located, unlocated }
}

/// Plan a collector's route: filter, sequence the located records, then interleave unlocated
/// records with the visits left over.
///
/// Never fails. An empty pool gives an empty route and a shortfall equal to the target; the
/// host decides whether to warn, ask for confirmation or discard.
///
/// # Example
/// ```
/// use std::collections::HashSet;
/// use cobro_route::{plan_route, CostModel, GpsPoint, Location, Region, RouteRequest, VisitRecord};
///
/// let region = Region::new("Mixco", "Guatemala");
/// let records = vec![
///     VisitRecord::new("a", "Ana", region.clone(), Location::at(14.63, -90.56)),
///     VisitRecord::new("b", "Ana", region.clone(), Location::NoPriorVisit),
///     VisitRecord::new("c", "Luis", region, Location::at(14.62, -90.55)),
/// ];
///
/// let request = RouteRequest::new("Ana", GpsPoint::new(14.6349, -90.5069)).with_target_visits(5);
/// let plan = plan_route(&request, &records, &HashSet::new(), CostModel::shared());
///
/// assert_eq!(plan.route.legs.len(), 2);
/// assert_eq!(plan.shortfall, 3);
/// ```
pub fn plan_route(
    request: &RouteRequest,
    records: &[VisitRecord],
    already_routed: &HashSet<String>,
    model: &CostModel,
) -> RoutePlan {
    let pools = eligible_records(records, &request.collector, already_routed);

    let legs = build_route(&request.start, &pools.located, request.target_visits, model);
    let remaining_budget = request.target_visits.saturating_sub(legs.len() as u32);
    let legs = interleave_unlocated(&legs, &pools.unlocated, remaining_budget);

    let shortfall = request.target_visits.saturating_sub(legs.len() as u32);
    if shortfall > 0 {
        info!(
            "[Planner] {}: only {} of {} requested visits available",
            request.collector,
            legs.len(),
            request.target_visits
        );
    }

    let route = Route {
        collector: request.collector.clone(),
        start: request.start,
        created_at: request.created_at,
        target_visits: request.target_visits,
        legs,
    };

    info!(
        "[Planner] {}: planned {} stops, {:.2} km, {} min",
        request.collector,
        route.legs.len(),
        route.total_distance_km(),
        route.total_time_min()
    );

    RoutePlan {
        route,
        available_located: pools.located.len() as u32,
        available_unlocated: pools.unlocated.len() as u32,
        shortfall,
    }
}

/// Plan routes for several collectors sequentially.
pub fn plan_routes_batch(
    requests: &[RouteRequest],
    records: &[VisitRecord],
    already_routed: &HashSet<String>,
    model: &CostModel,
) -> Vec<RoutePlan> {
    requests
        .iter()
        .map(|request| plan_route(request, records, already_routed, model))
        .collect()
}

/// Plan routes for several collectors using parallel processing.
///
/// Same output as [`plan_routes_batch`]; each collector's plan is independent.
#[cfg(feature = "parallel")]
pub fn plan_routes_parallel(
    requests: &[RouteRequest],
    records: &[VisitRecord],
    already_routed: &HashSet<String>,
    model: &CostModel,
) -> Vec<RoutePlan> {
    use rayon::prelude::*;

    requests
        .par_iter()
        .map(|request| plan_route(request, records, already_routed, model))
        .collect()
}

/// Count records per collector, sorted by collector name.
pub fn summarize_collectors(records: &[VisitRecord]) -> Vec<CollectorSummary> {
    let mut by_collector: BTreeMap<&str, CollectorSummary> = BTreeMap::new();

    for record in records {
        let summary = by_collector
            .entry(record.collector.as_str())
            .or_insert_with(|| CollectorSummary {
                collector: record.collector.clone(),
                ..Default::default()
            });

        summary.total += 1;
        match record.visit_kind {
            VisitKind::Domiciliary => summary.domiciliary += 1,
            VisitKind::Workplace => summary.workplace += 1,
        }
        if record.visited {
            summary.visited += 1;
        } else {
            summary.pending += 1;
        }
    }

    by_collector.into_values().collect()
}

/// Record a reported visit on `record` and return the deviation from the planned location.
///
/// The deviation is the corrected travel distance between the planned and reported points,
/// available only when both are known. A record that had no coordinates adopts the reported
/// point when the client was found there.
pub fn record_visit(record: &mut VisitRecord, report: VisitReport, model: &CostModel) -> Option<f64> {
    let deviation_km = match (record.point(), report.actual_location) {
        (Some(planned), Some(actual)) => {
            Some(model.travel_distance_km(&planned, &actual, &record.region))
        }
        _ => None,
    };

    if let (false, true, Some(actual)) = (
        record.location.has_coordinates(),
        report.located,
        report.actual_location,
    ) {
        debug!("[Planner] {} located for the first time", record.id);
        record.location = Location::Coordinates { point: actual };
    }

    record.record_attempt(VisitAttempt {
        timestamp: report.timestamp,
        located: report.located,
        visit_kind: report.visit_kind,
        actual_location: report.actual_location,
        deviation_km,
        collector: report.collector,
    });

    deviation_km
}
