//! Travel-cost model.
//!
//! Straight-line distance underestimates what a collector actually drives. The model scales the
//! great-circle distance by a regional road-friction factor and derives a travel time from a
//! regional average speed:
//!
//! 1. Friction: municipality table, then department table, then `default_friction` (1.25)
//! 2. Distance band: trips over 50 km use 95% of the factor, trips under 5 km use 105%
//! 3. Time: corrected distance over the regional speed (25 km/h metro, 30-35 km/h mid-size
//!    cities, 40 km/h elsewhere), rounded to whole minutes
//!
//! Table lookups are case-insensitive exact matches on the trimmed name.

use std::collections::HashMap;

use once_cell::sync::Lazy;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geo_utils::great_circle_distance_km;
use crate::{normalize_region_name, GpsPoint, Region};

/// Road-friction factors for municipalities with known street layouts.
const MUNICIPALITY_FRICTION: &[(&str, f64)] = &[
    ("GUATEMALA", 1.40),
    ("MIXCO", 1.38),
    ("VILLA NUEVA", 1.38),
    ("CHINAUTLA", 1.36),
    ("SAN MIGUEL PETAPA", 1.35),
    ("SANTA CATARINA PINULA", 1.35),
    ("SAN PEDRO AYAMPUC", 1.32),
    ("VILLA CANALES", 1.32),
    ("SAN JOSE PINULA", 1.30),
    ("FRAIJANES", 1.30),
    ("AMATITLAN", 1.30),
    ("QUETZALTENANGO", 1.32),
    ("ANTIGUA GUATEMALA", 1.30),
    ("CHIMALTENANGO", 1.28),
    ("COBAN", 1.35),
    ("HUEHUETENANGO", 1.35),
    ("ESCUINTLA", 1.25),
    ("MAZATENANGO", 1.22),
    ("RETALHULEU", 1.20),
    ("PUERTO BARRIOS", 1.20),
];

/// Fallback factors per department. Highland departments wind more than the coast.
const DEPARTMENT_FRICTION: &[(&str, f64)] = &[
    ("GUATEMALA", 1.35),
    ("SACATEPEQUEZ", 1.30),
    ("CHIMALTENANGO", 1.30),
    ("QUETZALTENANGO", 1.30),
    ("TOTONICAPAN", 1.35),
    ("SOLOLA", 1.38),
    ("SAN MARCOS", 1.38),
    ("HUEHUETENANGO", 1.40),
    ("QUICHE", 1.40),
    ("ALTA VERAPAZ", 1.38),
    ("BAJA VERAPAZ", 1.35),
    ("JALAPA", 1.30),
    ("CHIQUIMULA", 1.28),
    ("JUTIAPA", 1.25),
    ("SANTA ROSA", 1.25),
    ("EL PROGRESO", 1.25),
    ("ZACAPA", 1.22),
    ("ESCUINTLA", 1.20),
    ("IZABAL", 1.20),
    ("SUCHITEPEQUEZ", 1.18),
    ("RETALHULEU", 1.18),
    ("PETEN", 1.15),
];

/// Average speeds (km/h) for high-traffic municipalities and mid-size cities.
const MUNICIPALITY_SPEED_KMH: &[(&str, f64)] = &[
    ("GUATEMALA", 25.0),
    ("MIXCO", 25.0),
    ("VILLA NUEVA", 25.0),
    ("CHINAUTLA", 25.0),
    ("SAN MIGUEL PETAPA", 25.0),
    ("SANTA CATARINA PINULA", 25.0),
    ("VILLA CANALES", 30.0),
    ("SAN JOSE PINULA", 30.0),
    ("FRAIJANES", 30.0),
    ("AMATITLAN", 30.0),
    ("QUETZALTENANGO", 30.0),
    ("ANTIGUA GUATEMALA", 30.0),
    ("COBAN", 30.0),
    ("HUEHUETENANGO", 30.0),
    ("CHIMALTENANGO", 35.0),
    ("ESCUINTLA", 35.0),
    ("MAZATENANGO", 35.0),
];

/// Department-level speeds (km/h) for the metropolitan area.
const DEPARTMENT_SPEED_KMH: &[(&str, f64)] = &[
    ("GUATEMALA", 30.0),
    ("SACATEPEQUEZ", 35.0),
];

static SHARED_MODEL: Lazy<CostModel> = Lazy::new(|| CostModel::new(CostModelConfig::default()));

fn table(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

/// Configuration for the travel-cost model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CostModelConfig {
    /// Friction factor when neither municipality nor department is known.
    /// Default: 1.25
    pub default_friction: f64,

    /// Great-circle distance above which the factor is narrowed.
    /// Default: 50.0 km
    pub long_trip_threshold_km: f64,

    /// Multiplier applied to the factor for long trips.
    /// Default: 0.95
    pub long_trip_adjustment: f64,

    /// Great-circle distance below which the factor is widened.
    /// Default: 5.0 km
    pub short_trip_threshold_km: f64,

    /// Multiplier applied to the factor for short trips.
    /// Default: 1.05
    pub short_trip_adjustment: f64,

    /// Speed when no regional speed is known.
    /// Default: 40.0 km/h
    pub default_speed_kmh: f64,

    /// Friction factor by municipality name
    pub municipality_friction: HashMap<String, f64>,
    /// Friction factor by department name
    pub department_friction: HashMap<String, f64>,
    /// Average speed (km/h) by municipality name
    pub municipality_speed_kmh: HashMap<String, f64>,
    /// Average speed (km/h) by department name
    pub department_speed_kmh: HashMap<String, f64>,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            default_friction: 1.25,
            long_trip_threshold_km: 50.0,
            long_trip_adjustment: 0.95,
            short_trip_threshold_km: 5.0,
            short_trip_adjustment: 1.05,
            default_speed_kmh: 40.0,
            municipality_friction: table(MUNICIPALITY_FRICTION),
            department_friction: table(DEPARTMENT_FRICTION),
            municipality_speed_kmh: table(MUNICIPALITY_SPEED_KMH),
            department_speed_kmh: table(DEPARTMENT_SPEED_KMH),
        }
    }
}

/// Immutable regional cost model.
///
/// Built once from a [`CostModelConfig`]; table keys are normalized on construction so
/// lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct CostModel {
    config: CostModelConfig,
}

impl Default for CostModel {
    fn default() -> Self {
        Self::new(CostModelConfig::default())
    }
}

impl CostModel {
    /// Build a model, normalizing every table key.
    pub fn new(config: CostModelConfig) -> Self {
        let normalize = |entries: HashMap<String, f64>| -> HashMap<String, f64> {
            entries
                .into_iter()
                .filter_map(|(name, value)| normalize_region_name(&name).map(|key| (key, value)))
                .collect()
        };

        let config = CostModelConfig {
            municipality_friction: normalize(config.municipality_friction),
            department_friction: normalize(config.department_friction),
            municipality_speed_kmh: normalize(config.municipality_speed_kmh),
            department_speed_kmh: normalize(config.department_speed_kmh),
            ..config
        };

        Self { config }
    }

    /// Process-wide model with the default tables.
    pub fn shared() -> &'static CostModel {
        &SHARED_MODEL
    }

    pub fn config(&self) -> &CostModelConfig {
        &self.config
    }

    /// Base friction factor for a destination region.
    pub fn friction_factor(&self, region: &Region) -> f64 {
        lookup(
            region,
            &self.config.municipality_friction,
            &self.config.department_friction,
        )
        .unwrap_or(self.config.default_friction)
    }

    /// Average speed (km/h) for a destination region.
    pub fn speed_kmh(&self, region: &Region) -> f64 {
        lookup(
            region,
            &self.config.municipality_speed_kmh,
            &self.config.department_speed_kmh,
        )
        .unwrap_or(self.config.default_speed_kmh)
    }

    /// Distance-band multiplier for a great-circle distance. The two bands never overlap.
    pub fn band_adjustment(&self, great_circle_km: f64) -> f64 {
        if great_circle_km > self.config.long_trip_threshold_km {
            self.config.long_trip_adjustment
        } else if great_circle_km < self.config.short_trip_threshold_km {
            self.config.short_trip_adjustment
        } else {
            1.0
        }
    }

    /// Corrected road distance (km) from `from` to `to`, where `to` lies in `to_region`.
    pub fn travel_distance_km(&self, from: &GpsPoint, to: &GpsPoint, to_region: &Region) -> f64 {
        let straight = great_circle_distance_km(from, to);
        straight * self.friction_factor(to_region) * self.band_adjustment(straight)
    }

    /// Estimated minutes to cover `distance_km` in `to_region`, rounded to the nearest minute.
    pub fn travel_time_min(&self, distance_km: f64, to_region: &Region) -> u32 {
        let hours = distance_km / self.speed_kmh(to_region);
        (hours * 60.0).round() as u32
    }
}

/// Municipality first, then department.
fn lookup(
    region: &Region,
    by_municipality: &HashMap<String, f64>,
    by_department: &HashMap<String, f64>,
) -> Option<f64> {
    region
        .municipality_key()
        .and_then(|key| by_municipality.get(&key).copied())
        .or_else(|| {
            region
                .department_key()
                .and_then(|key| by_department.get(&key).copied())
        })
}

/// Corrected travel distance (km) using the shared model.
///
/// # Example
/// ```
/// use cobro_route::{estimate_travel_distance_km, great_circle_distance_km, GpsPoint, Region};
///
/// let from = GpsPoint::new(14.6349, -90.5069);
/// let to = GpsPoint::new(14.6549, -90.5069);
/// let region = Region::new("Guatemala", "Guatemala");
///
/// let straight = great_circle_distance_km(&from, &to);
/// let corrected = estimate_travel_distance_km(&from, &to, &region);
/// assert!((corrected - straight * 1.40 * 1.05).abs() < 1e-9);
/// ```
pub fn estimate_travel_distance_km(from: &GpsPoint, to: &GpsPoint, to_region: &Region) -> f64 {
    CostModel::shared().travel_distance_km(from, to, to_region)
}

/// Estimated travel time (whole minutes) using the shared model.
pub fn estimate_travel_time_min(distance_km: f64, to_region: &Region) -> u32 {
    CostModel::shared().travel_time_min(distance_km, to_region)
}
