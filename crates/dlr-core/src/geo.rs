//! Geographic helpers for line geometry.

use serde::{Deserialize, Serialize};

use crate::units::Degrees;

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Initial great-circle bearing towards `other`, in `[0, 360)`.
    pub fn bearing_to(&self, other: &GeoPoint) -> Degrees {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let y = dlon.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlon.cos();
        Degrees(y.atan2(x).to_degrees()).normalized()
    }
}

/// Compass bearing of a polyline, taken from its first to its last point.
///
/// Returns `None` for fewer than two points or coincident endpoints, where no
/// orientation can be derived.
pub fn polyline_azimuth(points: &[GeoPoint]) -> Option<Degrees> {
    let (first, last) = (points.first()?, points.last()?);
    if points.len() < 2 || (first.lat == last.lat && first.lon == last.lon) {
        return None;
    }
    Some(first.bearing_to(last))
}

/// Even-odd ray casting; `polygon` is an open or closed ring.
pub fn point_in_polygon(point: &GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (pi, pj) = (&polygon[i], &polygon[j]);
        if (pi.lat > point.lat) != (pj.lat > point.lat) {
            let cross_lon = (pj.lon - pi.lon) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lon;
            if point.lon < cross_lon {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_cardinal_directions() {
        let origin = GeoPoint::new(40.0, -100.0);
        let north = GeoPoint::new(41.0, -100.0);
        let south = GeoPoint::new(39.0, -100.0);
        let east = GeoPoint::new(40.0, -99.0);
        let west = GeoPoint::new(40.0, -101.0);

        assert!(origin.bearing_to(&north).value().abs() < 1e-9);
        assert!((origin.bearing_to(&south).value() - 180.0).abs() < 1e-9);
        // Along a parallel the initial bearing is slightly north of due east
        assert!((origin.bearing_to(&east).value() - 90.0).abs() < 1.0);
        assert!((origin.bearing_to(&west).value() - 270.0).abs() < 1.0);
    }

    #[test]
    fn polyline_azimuth_uses_endpoints() {
        let line = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.5, 3.0),
            GeoPoint::new(1.0, 0.0),
        ];
        assert!(polyline_azimuth(&line).unwrap().value().abs() < 1e-9);
        assert!(polyline_azimuth(&line[..1]).is_none());
        assert!(polyline_azimuth(&[GeoPoint::new(1.0, 1.0), GeoPoint::new(1.0, 1.0)]).is_none());
    }

    #[test]
    fn point_in_square() {
        let square = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 10.0),
            GeoPoint::new(10.0, 10.0),
            GeoPoint::new(10.0, 0.0),
        ];
        assert!(point_in_polygon(&GeoPoint::new(5.0, 5.0), &square));
        assert!(!point_in_polygon(&GeoPoint::new(15.0, 5.0), &square));
        assert!(!point_in_polygon(&GeoPoint::new(5.0, -1.0), &square));
        assert!(!point_in_polygon(&GeoPoint::new(5.0, 5.0), &square[..2]));
    }

    #[test]
    fn validity() {
        assert!(GeoPoint::new(45.0, 120.0).is_valid());
        assert!(!GeoPoint::new(95.0, 0.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
    }
}
