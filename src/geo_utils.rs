//! # Geographic Utilities
//!
//! Distance and extent computations shared by the cost model and the route renderers.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`great_circle_distance_km`] | Haversine distance between two points, in km |
//! | [`polyline_length_km`] | Straight-line length of a stop sequence |
//! | [`compute_bounds`] | Bounding box of a stop sequence |
//! | [`compute_center`] | Centroid of a stop sequence |
//!
//! ## Algorithm Notes
//!
//! The haversine formula is evaluated on a spherical Earth of radius 6371 km. Inputs are
//! expected to be finite WGS84 degrees; callers filter out records without coordinates first.

use geo::{BoundingRect, Coord, LineString};
use crate::{Bounds, GpsPoint};

/// Mean Earth radius used for all distances, in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// Symmetric, and zero for identical points.
///
/// # Example
///
/// ```rust
/// use cobro_route::{GpsPoint, geo_utils};
///
/// let guatemala = GpsPoint::new(14.6349, -90.5069);
/// let antigua = GpsPoint::new(14.5586, -90.7295);
///
/// let distance = geo_utils::great_circle_distance_km(&guatemala, &antigua);
/// assert!((distance - 25.3).abs() < 1.0);
/// ```
#[inline]
pub fn great_circle_distance_km(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let d_lat = (p2.latitude - p1.latitude).to_radians();
    let d_lng = (p2.longitude - p1.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Total straight-line length of a sequence of points, in km.
///
/// Empty or single-point sequences return 0.0.
pub fn polyline_length_km(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| great_circle_distance_km(&w[0], &w[1]))
        .sum()
}

// =============================================================================
// Extent Functions
// =============================================================================

/// Compute the bounding box of a sequence of points.
///
/// Returns `None` for empty input.
///
/// # Example
///
/// ```rust
/// use cobro_route::{GpsPoint, geo_utils};
///
/// let stops = vec![
///     GpsPoint::new(14.60, -90.55),
///     GpsPoint::new(14.65, -90.50),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&stops).unwrap();
/// assert_eq!(bounds.min_lat, 14.60);
/// assert_eq!(bounds.max_lng, -90.50);
/// ```
pub fn compute_bounds(points: &[GpsPoint]) -> Option<Bounds> {
    let line: LineString<f64> = points
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect();

    let rect = line.bounding_rect()?;
    Some(Bounds {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lng: rect.min().x,
        max_lng: rect.max().x,
    })
}

/// Arithmetic mean of the points. Returns `None` for empty input.
///
/// Adequate for the few tens of kilometers a daily route spans.
pub fn compute_center(points: &[GpsPoint]) -> Option<GpsPoint> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let sum_lat: f64 = points.iter().map(|p| p.latitude).sum();
    let sum_lng: f64 = points.iter().map(|p| p.longitude).sum();

    Some(GpsPoint::new(sum_lat / n, sum_lng / n))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_distance_same_point() {
        let p = GpsPoint::new(14.6349, -90.5069);
        assert_eq!(great_circle_distance_km(&p, &p), 0.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (GpsPoint::new(14.6349, -90.5069), GpsPoint::new(15.4700, -90.3800)),
            (GpsPoint::new(-33.45, -70.66), GpsPoint::new(40.41, -3.70)),
            (GpsPoint::new(0.0, 179.9), GpsPoint::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(great_circle_distance_km(&a, &b), great_circle_distance_km(&b, &a));
        }
    }

    #[test]
    fn test_distance_known_value() {
        // One degree of latitude on a 6371 km sphere
        let a = GpsPoint::new(14.0, -90.0);
        let b = GpsPoint::new(15.0, -90.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
        assert!(approx_eq(great_circle_distance_km(&a, &b), expected, 1e-9));
    }

    #[test]
    fn test_distance_across_antimeridian() {
        let a = GpsPoint::new(0.0, 179.9);
        let b = GpsPoint::new(0.0, -179.9);
        assert!(great_circle_distance_km(&a, &b) < 25.0);
    }

    #[test]
    fn test_polyline_length() {
        assert_eq!(polyline_length_km(&[]), 0.0);
        assert_eq!(polyline_length_km(&[GpsPoint::new(14.6, -90.5)]), 0.0);

        let track = vec![
            GpsPoint::new(14.0, -90.0),
            GpsPoint::new(14.5, -90.0),
            GpsPoint::new(15.0, -90.0),
        ];
        let direct = great_circle_distance_km(&track[0], &track[2]);
        assert!(approx_eq(polyline_length_km(&track), direct, 1e-6));
    }

    #[test]
    fn test_compute_bounds() {
        let points = vec![
            GpsPoint::new(14.60, -90.55),
            GpsPoint::new(14.70, -90.45),
            GpsPoint::new(14.65, -90.50),
        ];
        let bounds = compute_bounds(&points).unwrap();
        assert_eq!(bounds.min_lat, 14.60);
        assert_eq!(bounds.max_lat, 14.70);
        assert_eq!(bounds.min_lng, -90.55);
        assert_eq!(bounds.max_lng, -90.45);
    }

    #[test]
    fn test_compute_bounds_empty() {
        assert!(compute_bounds(&[]).is_none());
    }

    #[test]
    fn test_compute_center() {
        let points = vec![GpsPoint::new(14.60, -90.60), GpsPoint::new(14.70, -90.40)];
        let center = compute_center(&points).unwrap();
        assert!(approx_eq(center.latitude, 14.65, 1e-9));
        assert!(approx_eq(center.longitude, -90.50, 1e-9));
        assert!(compute_center(&[]).is_none());
    }
}
