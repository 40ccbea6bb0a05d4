//! # Cobro Route
//!
//! Daily visit route construction for field collection agents ("cobradores").
//!
//! This library provides:
//! - Great-circle distance and a regional road-friction travel-cost model
//! - Greedy nearest-neighbor sequencing of located client records
//! - Interleaving of records without coordinates next to same-municipality stops
//! - Caller-side planning helpers (eligibility filtering, start point parsing, summaries)
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch planning with rayon
//! - **`serde`** - Enable serialization of records and route snapshots
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use cobro_route::{build_route, interleave_unlocated, CostModel, GpsPoint, Location, Region, VisitRecord};
//!
//! let start = GpsPoint::new(14.6349, -90.5069);
//! let region = Region::new("GUATEMALA", "GUATEMALA");
//!
//! let located = vec![
//!     VisitRecord::new("p-1", "Ana", region.clone(), Location::at(14.6400, -90.5100)),
//!     VisitRecord::new("p-2", "Ana", region.clone(), Location::at(14.6600, -90.5200)),
//! ];
//! let unlocated = vec![VisitRecord::new("p-3", "Ana", region, Location::NoPriorVisit)];
//!
//! let legs = build_route(&start, &located, 10, CostModel::shared());
//! let legs = interleave_unlocated(&legs, &unlocated, 8);
//!
//! assert_eq!(legs.len(), 3);
//! assert_eq!(legs[1].record.id, "p-3");
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Result, RouteError};

// Distance and bounds helpers
pub mod geo_utils;
pub use geo_utils::great_circle_distance_km;

// Regional travel-cost model
pub mod cost;
pub use cost::{estimate_travel_distance_km, estimate_travel_time_min, CostModel, CostModelConfig};

// Nearest-neighbor sequencing
pub mod sequencer;
pub use sequencer::build_route;

// Unlocated record placement
pub mod interleave;
pub use interleave::interleave_unlocated;

// Route output (totals, table rows, snapshots)
pub mod route;
pub use route::{format_duration, Route, RouteLeg, RouteRow, RouteSnapshot, RouteSummary, SnapshotStop};

// Caller-side planning
pub mod planner;
pub use planner::{
    eligible_records, parse_start_point, plan_route, plan_routes_batch, record_visit,
    summarize_collectors, CollectorSummary, EligiblePools, RoutePlan, RouteRequest, VisitReport,
};

#[cfg(feature = "parallel")]
pub use planner::plan_routes_parallel;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("CobroRouteRust")
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use cobro_route::GpsPoint;
/// let point = GpsPoint::new(14.6349, -90.5069); // Guatemala City
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box of a set of stops.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Get the center point of the bounds.
    pub fn center(&self) -> GpsPoint {
        GpsPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Administrative region of a record: municipality and department.
///
/// Missing names (empty or the `N/A` placeholder used by the record store) are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    pub municipality: Option<String>,
    pub department: Option<String>,
}

impl Region {
    /// Create a region from raw municipality and department names.
    pub fn new(municipality: &str, department: &str) -> Self {
        Self {
            municipality: clean_region_name(municipality),
            department: clean_region_name(department),
        }
    }

    /// Normalized municipality used for table lookups and anchor matching.
    pub fn municipality_key(&self) -> Option<String> {
        self.municipality.as_deref().and_then(normalize_region_name)
    }

    /// Normalized department used for table lookups.
    pub fn department_key(&self) -> Option<String> {
        self.department.as_deref().and_then(normalize_region_name)
    }
}

/// Trim a raw region name, dropping empty values and the `N/A` placeholder.
fn clean_region_name(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("N/A") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Upper-cased, trimmed region name. Lookups are case-insensitive exact matches.
pub(crate) fn normalize_region_name(raw: &str) -> Option<String> {
    clean_region_name(raw).map(|name| name.to_uppercase())
}

/// Where a record can be found.
///
/// A point exists only for `Coordinates`; records that were never visited or whose stored
/// location could not be parsed carry no point at all.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum Location {
    Coordinates { point: GpsPoint },
    NoPriorVisit,
    Unparseable,
}

impl Location {
    /// Shorthand for a located record.
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Location::Coordinates { point: GpsPoint::new(latitude, longitude) }
    }

    /// The coordinates, if the record has any.
    pub fn point(&self) -> Option<GpsPoint> {
        match self {
            Location::Coordinates { point } => Some(*point),
            Location::NoPriorVisit | Location::Unparseable => None,
        }
    }

    pub fn has_coordinates(&self) -> bool {
        matches!(self, Location::Coordinates { .. })
    }
}

/// Context in which the client is visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VisitKind {
    /// Client's home ("domiciliar")
    #[default]
    Domiciliary,
    /// Client's workplace ("laboral")
    Workplace,
}

/// One reported visit attempt.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisitAttempt {
    /// When the visit was reported (Unix timestamp, seconds)
    pub timestamp: i64,
    /// Whether the client was found
    pub located: bool,
    /// Context actually visited
    pub visit_kind: VisitKind,
    /// GPS position reported by the collector
    pub actual_location: Option<GpsPoint>,
    /// Corrected distance between planned and reported location, in km
    pub deviation_km: Option<f64>,
    /// Collector who reported the attempt
    pub collector: String,
}

/// One obligation to visit a client at home or at work.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisitRecord {
    /// Unique identifier in the record store
    pub id: String,
    /// Loan reference number
    pub loan_number: String,
    pub client_name: String,
    /// Assigned collector
    pub collector: String,
    pub region: Region,
    /// Free-text address
    pub address: String,
    pub location: Location,
    pub visit_kind: VisitKind,
    /// True once at least one attempt has been recorded
    pub visited: bool,
    /// Append-only attempt history
    pub history: Vec<VisitAttempt>,
}

impl VisitRecord {
    /// Create a pending record with no history.
    ///
    /// The loan number defaults to the id; other descriptive fields start empty.
    pub fn new(id: &str, collector: &str, region: Region, location: Location) -> Self {
        Self {
            id: id.to_string(),
            loan_number: id.to_string(),
            client_name: String::new(),
            collector: collector.to_string(),
            region,
            address: String::new(),
            location,
            visit_kind: VisitKind::Domiciliary,
            visited: false,
            history: Vec::new(),
        }
    }

    /// Set the visit context.
    pub fn with_visit_kind(mut self, visit_kind: VisitKind) -> Self {
        self.visit_kind = visit_kind;
        self
    }

    /// Coordinates of the record, if located.
    pub fn point(&self) -> Option<GpsPoint> {
        self.location.point()
    }

    /// Append an attempt to the history and mark the record visited.
    pub fn record_attempt(&mut self, attempt: VisitAttempt) {
        self.history.push(attempt);
        self.visited = true;
    }
}

// ============================================================================
// FFI Exports (only when feature enabled)
// ============================================================================

#[cfg(feature = "ffi")]
mod ffi {
    use super::*;
    use log::info;

    /// Great-circle distance in km.
    #[uniffi::export]
    pub fn ffi_great_circle_distance_km(p1: GpsPoint, p2: GpsPoint) -> f64 {
        great_circle_distance_km(&p1, &p2)
    }

    /// Corrected travel distance (km) and time (min) to a destination.
    #[derive(Debug, Clone, uniffi::Record)]
    pub struct TravelEstimate {
        pub distance_km: f64,
        pub time_min: u32,
    }

    /// Estimate the road distance and travel time between two points.
    #[uniffi::export]
    pub fn ffi_estimate_travel(from: GpsPoint, to: GpsPoint, to_region: Region) -> TravelEstimate {
        let distance_km = estimate_travel_distance_km(&from, &to, &to_region);
        TravelEstimate {
            distance_km,
            time_min: estimate_travel_time_min(distance_km, &to_region),
        }
    }

    /// Parse a "lat,lng" start point, returning `None` when malformed.
    #[uniffi::export]
    pub fn ffi_parse_start_point(input: String) -> Option<GpsPoint> {
        parse_start_point(&input).ok()
    }

    /// Plan a route with the default cost model.
    #[uniffi::export]
    pub fn ffi_plan_route(
        request: RouteRequest,
        records: Vec<VisitRecord>,
        already_routed: Vec<String>,
    ) -> RoutePlan {
        init_logging();
        info!(
            "[CobroRouteRust] plan_route for {} with {} records",
            request.collector,
            records.len()
        );

        let start = std::time::Instant::now();
        let routed: std::collections::HashSet<String> = already_routed.into_iter().collect();
        let plan = plan_route(&request, &records, &routed, CostModel::shared());

        info!(
            "[CobroRouteRust] Planned {} stops ({} short) in {:?}",
            plan.route.legs.len(),
            plan.shortfall,
            start.elapsed()
        );
        plan
    }

    /// Plan routes for several collectors in parallel.
    #[uniffi::export]
    pub fn ffi_plan_routes_batch(
        requests: Vec<RouteRequest>,
        records: Vec<VisitRecord>,
        already_routed: Vec<String>,
    ) -> Vec<RoutePlan> {
        init_logging();
        info!("[CobroRouteRust] Batch planning for {} collectors", requests.len());

        let routed: std::collections::HashSet<String> = already_routed.into_iter().collect();
        plan_routes_parallel(&requests, &records, &routed, CostModel::shared())
    }

    /// Per-collector record counts for the collector picker.
    #[uniffi::export]
    pub fn ffi_summarize_collectors(records: Vec<VisitRecord>) -> Vec<CollectorSummary> {
        init_logging();
        summarize_collectors(&records)
    }

    /// Record a reported visit and return the updated record.
    #[uniffi::export]
    pub fn ffi_record_visit(mut record: VisitRecord, report: VisitReport) -> VisitRecord {
        init_logging();
        record_visit(&mut record, report, CostModel::shared());
        record
    }

    /// Tabular rows with running totals for a planned route.
    #[uniffi::export]
    pub fn ffi_route_rows(route: Route) -> Vec<RouteRow> {
        route.rows()
    }

    /// Get the default cost model configuration.
    #[uniffi::export]
    pub fn default_cost_config() -> CostModelConfig {
        CostModelConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gps_point_validation() {
        assert!(GpsPoint::new(14.6349, -90.5069).is_valid());
        assert!(!GpsPoint::new(91.0, 0.0).is_valid());
        assert!(!GpsPoint::new(0.0, 181.0).is_valid());
        assert!(!GpsPoint::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_region_placeholders_are_missing() {
        let region = Region::new("  N/A ", "");
        assert_eq!(region.municipality, None);
        assert_eq!(region.department, None);
        assert_eq!(region.municipality_key(), None);
    }

    #[test]
    fn test_region_keys_are_case_insensitive() {
        let region = Region::new(" Mixco ", "guatemala");
        assert_eq!(region.municipality.as_deref(), Some("Mixco"));
        assert_eq!(region.municipality_key().as_deref(), Some("MIXCO"));
        assert_eq!(region.department_key().as_deref(), Some("GUATEMALA"));
    }

    #[test]
    fn test_location_point_only_with_coordinates() {
        let point = GpsPoint::new(14.6, -90.5);
        assert_eq!(Location::Coordinates { point }.point(), Some(point));
        assert_eq!(Location::at(14.6, -90.5), Location::Coordinates { point });
        assert_eq!(Location::NoPriorVisit.point(), None);
        assert_eq!(Location::Unparseable.point(), None);
        assert!(!Location::Unparseable.has_coordinates());
    }

    #[test]
    fn test_record_attempt_marks_visited() {
        let mut record = VisitRecord::new("r1", "Ana", Region::default(), Location::NoPriorVisit);
        assert!(!record.visited);
        assert!(record.history.is_empty());

        record.record_attempt(VisitAttempt {
            timestamp: 1_700_000_000,
            located: false,
            visit_kind: VisitKind::Workplace,
            actual_location: None,
            deviation_km: None,
            collector: "Ana".to_string(),
        });

        assert!(record.visited);
        assert_eq!(record.history.len(), 1);
    }

    #[test]
    fn test_bounds_center() {
        let bounds = Bounds { min_lat: 14.0, max_lat: 15.0, min_lng: -91.0, max_lng: -90.0 };
        let center = bounds.center();
        assert_eq!(center.latitude, 14.5);
        assert_eq!(center.longitude, -90.5);
    }
}
