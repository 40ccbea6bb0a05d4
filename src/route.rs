//! Constructed routes and the views handed to downstream collaborators.
//!
//! A [`Route`] is the ordered leg list plus who it belongs to and where it starts. Renderers
//! consume it through:
//! - [`Route::rows`] - numbered table rows with running distance/time totals
//! - [`Route::polyline`] / [`Route::bounds`] - map markers and the connecting line
//! - [`Route::snapshot`] - the immutable form stored by the persistence layer

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geo_utils::compute_bounds;
use crate::{Bounds, GpsPoint, VisitKind, VisitRecord};

/// One stop in a constructed route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteLeg {
    /// Copy of the record visited at this stop
    pub record: VisitRecord,
    /// Corrected distance from the previous stop in km (0 for unlocated stops)
    pub distance_km: f64,
    /// Estimated travel time from the previous stop in minutes (0 for unlocated stops)
    pub time_min: u32,
    /// Whether the stop has real coordinates
    pub located: bool,
    /// Municipality of the located stop an unlocated stop was placed after
    pub anchor_region: Option<String>,
}

impl RouteLeg {
    /// A GPS-sequenced stop.
    pub fn located(record: VisitRecord, distance_km: f64, time_min: u32) -> Self {
        Self {
            record,
            distance_km,
            time_min,
            located: true,
            anchor_region: None,
        }
    }

    /// A stop without coordinates, placed after a located stop in `anchor_region`.
    pub fn anchored(record: VisitRecord, anchor_region: String) -> Self {
        Self {
            record,
            distance_km: 0.0,
            time_min: 0,
            located: false,
            anchor_region: Some(anchor_region),
        }
    }
}

/// An ordered visiting sequence for one collector.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    pub collector: String,
    pub start: GpsPoint,
    /// Creation time (Unix timestamp, seconds)
    pub created_at: i64,
    /// Number of visits requested
    pub target_visits: u32,
    pub legs: Vec<RouteLeg>,
}

/// Aggregate figures for a route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteSummary {
    pub visits: u32,
    pub located_visits: u32,
    pub unlocated_visits: u32,
    pub total_distance_km: f64,
    pub total_time_min: u32,
}

/// One numbered row of the route table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteRow {
    /// 1-based stop number
    pub position: u32,
    pub record_id: String,
    pub loan_number: String,
    pub client_name: String,
    pub municipality: Option<String>,
    pub address: String,
    pub visit_kind: VisitKind,
    pub located: bool,
    pub distance_km: f64,
    pub time_min: u32,
    /// Distance from the start point up to and including this stop
    pub cumulative_distance_km: f64,
    /// Time from the start point up to and including this stop
    pub cumulative_time_min: u32,
}

/// Stored form of a single stop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SnapshotStop {
    pub record_id: String,
    pub loan_number: String,
    pub client_name: String,
    pub municipality: Option<String>,
    pub visit_kind: VisitKind,
    pub distance_km: f64,
    pub time_min: u32,
    pub located: bool,
    pub anchor_region: Option<String>,
}

/// Immutable persisted form of a route, keyed by collector and creation date.
///
/// Later visit reports update the underlying records, never the snapshot.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouteSnapshot {
    pub collector: String,
    pub created_at: i64,
    pub start: GpsPoint,
    pub target_visits: u32,
    pub stops: Vec<SnapshotStop>,
    pub completed: bool,
}

impl RouteSnapshot {
    /// Ids of every record referenced by the snapshot.
    ///
    /// Used to exclude already-routed records when planning the next route.
    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.stops.iter().map(|stop| stop.record_id.as_str())
    }
}

impl Route {
    pub fn total_distance_km(&self) -> f64 {
        self.legs.iter().map(|leg| leg.distance_km).sum()
    }

    pub fn total_time_min(&self) -> u32 {
        self.legs.iter().map(|leg| leg.time_min).sum()
    }

    pub fn summary(&self) -> RouteSummary {
        let located_visits = self.legs.iter().filter(|leg| leg.located).count() as u32;
        let visits = self.legs.len() as u32;

        RouteSummary {
            visits,
            located_visits,
            unlocated_visits: visits - located_visits,
            total_distance_km: self.total_distance_km(),
            total_time_min: self.total_time_min(),
        }
    }

    /// Numbered rows with running totals.
    pub fn rows(&self) -> Vec<RouteRow> {
        let mut cumulative_distance_km = 0.0;
        let mut cumulative_time_min = 0;

        self.legs
            .iter()
            .enumerate()
            .map(|(i, leg)| {
                cumulative_distance_km += leg.distance_km;
                cumulative_time_min += leg.time_min;

                RouteRow {
                    position: i as u32 + 1,
                    record_id: leg.record.id.clone(),
                    loan_number: leg.record.loan_number.clone(),
                    client_name: leg.record.client_name.clone(),
                    municipality: leg.record.region.municipality.clone(),
                    address: leg.record.address.clone(),
                    visit_kind: leg.record.visit_kind,
                    located: leg.located,
                    distance_km: leg.distance_km,
                    time_min: leg.time_min,
                    cumulative_distance_km,
                    cumulative_time_min,
                }
            })
            .collect()
    }

    /// Start point followed by every located stop, in visiting order.
    pub fn polyline(&self) -> Vec<GpsPoint> {
        std::iter::once(self.start)
            .chain(self.legs.iter().filter_map(|leg| leg.record.point()))
            .collect()
    }

    /// Extent of the start point and located stops, for fitting the map view.
    pub fn bounds(&self) -> Option<Bounds> {
        compute_bounds(&self.polyline())
    }

    /// Immutable copy for the persistence layer.
    pub fn snapshot(&self) -> RouteSnapshot {
        RouteSnapshot {
            collector: self.collector.clone(),
            created_at: self.created_at,
            start: self.start,
            target_visits: self.target_visits,
            stops: self
                .legs
                .iter()
                .map(|leg| SnapshotStop {
                    record_id: leg.record.id.clone(),
                    loan_number: leg.record.loan_number.clone(),
                    client_name: leg.record.client_name.clone(),
                    municipality: leg.record.region.municipality.clone(),
                    visit_kind: leg.record.visit_kind,
                    distance_km: leg.distance_km,
                    time_min: leg.time_min,
                    located: leg.located,
                    anchor_region: leg.anchor_region.clone(),
                })
                .collect(),
            completed: false,
        }
    }
}

/// Format minutes as `"{h}h {m}m"`.
///
/// ```
/// assert_eq!(cobro_route::format_duration(125), "2h 5m");
/// assert_eq!(cobro_route::format_duration(45), "0h 45m");
/// ```
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, Region};

    fn record(id: &str, municipality: &str, location: Location) -> VisitRecord {
        VisitRecord::new(id, "Ana", Region::new(municipality, "GUATEMALA"), location)
    }

    fn sample_route() -> Route {
        Route {
            collector: "Ana".to_string(),
            start: GpsPoint::new(14.60, -90.50),
            created_at: 1_700_000_000,
            target_visits: 5,
            legs: vec![
                RouteLeg::located(record("a", "Mixco", Location::at(14.62, -90.55)), 3.5, 8),
                RouteLeg::anchored(record("b", "Mixco", Location::NoPriorVisit), "Mixco".to_string()),
                RouteLeg::located(record("c", "Guatemala", Location::at(14.65, -90.48)), 6.0, 14),
            ],
        }
    }

    #[test]
    fn test_totals_and_summary() {
        let route = sample_route();
        assert_eq!(route.total_distance_km(), 9.5);
        assert_eq!(route.total_time_min(), 22);

        let summary = route.summary();
        assert_eq!(summary.visits, 3);
        assert_eq!(summary.located_visits, 2);
        assert_eq!(summary.unlocated_visits, 1);
    }

    #[test]
    fn test_rows_carry_running_totals() {
        let rows = sample_route().rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[1].cumulative_distance_km, 3.5);
        assert_eq!(rows[1].cumulative_time_min, 8);
        assert!(!rows[1].located);
        assert_eq!(rows[2].cumulative_distance_km, 9.5);
        assert_eq!(rows[2].cumulative_time_min, 22);
        assert_eq!(rows[2].municipality.as_deref(), Some("Guatemala"));
    }

    #[test]
    fn test_polyline_skips_unlocated_stops() {
        let route = sample_route();
        let line = route.polyline();
        assert_eq!(line.len(), 3);
        assert_eq!(line[0], route.start);
        assert_eq!(line[2], GpsPoint::new(14.65, -90.48));

        let bounds = route.bounds().unwrap();
        assert_eq!(bounds.min_lat, 14.60);
        assert_eq!(bounds.max_lat, 14.65);
        assert_eq!(bounds.min_lng, -90.55);
    }

    #[test]
    fn test_empty_route() {
        let route = Route {
            collector: "Ana".to_string(),
            start: GpsPoint::new(14.60, -90.50),
            created_at: 0,
            target_visits: 10,
            legs: vec![],
        };
        assert_eq!(route.total_distance_km(), 0.0);
        assert!(route.rows().is_empty());
        assert_eq!(route.polyline(), vec![route.start]);
        assert!(route.snapshot().stops.is_empty());
    }

    #[test]
    fn test_snapshot_mirrors_legs() {
        let route = sample_route();
        let snapshot = route.snapshot();
        assert_eq!(snapshot.collector, "Ana");
        assert!(!snapshot.completed);
        assert_eq!(snapshot.stops.len(), 3);
        assert_eq!(snapshot.stops[1].anchor_region.as_deref(), Some("Mixco"));
        assert_eq!(snapshot.record_ids().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_snapshot_serializes() {
        let snapshot = sample_route().snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"collector\":\"Ana\""));
        assert!(json.contains("\"visit_kind\":\"domiciliary\""));

        let restored: RouteSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0h 0m");
        assert_eq!(format_duration(60), "1h 0m");
        assert_eq!(format_duration(135), "2h 15m");
    }
}
