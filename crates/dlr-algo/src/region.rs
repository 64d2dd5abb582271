//! Expand a geographic region into a set of lines to cut.

use dlr_core::{point_in_polygon, DlrError, DlrResult, GeoPoint, LineId, Network};
use serde::Deserialize;

use crate::outage::OutageSet;

/// Named polygon over bus positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub polygon: Vec<GeoPoint>,
}

/// Accepted JSON shapes; coordinates are GeoJSON-ordered `[lon, lat]`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RegionRepr {
    /// `{"type": "Polygon", "coordinates": [[[lon, lat], ...]]}`, outer ring only
    GeoJson {
        #[serde(default)]
        name: Option<String>,
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    /// `{"name": "west", "coordinates": [[lon, lat], ...]}`
    Ring {
        #[serde(default)]
        name: Option<String>,
        coordinates: Vec<[f64; 2]>,
    },
}

impl Region {
    pub fn new(name: impl Into<String>, polygon: Vec<GeoPoint>) -> Self {
        Self {
            name: name.into(),
            polygon,
        }
    }

    pub fn from_json(input: &str) -> DlrResult<Region> {
        let repr: RegionRepr = serde_json::from_str(input)?;
        let (name, ring) = match repr {
            RegionRepr::GeoJson { name, coordinates } => {
                (name, coordinates.into_iter().next().unwrap_or_default())
            }
            RegionRepr::Ring { name, coordinates } => (name, coordinates),
        };
        let polygon: Vec<GeoPoint> = ring
            .into_iter()
            .map(|[lon, lat]| GeoPoint::new(lat, lon))
            .collect();
        if polygon.len() < 3 {
            return Err(DlrError::Validation(format!(
                "region polygon needs at least 3 points, got {}",
                polygon.len()
            )));
        }
        Ok(Region::new(name.unwrap_or_else(|| "region".to_string()), polygon))
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point_in_polygon(point, &self.polygon)
    }
}

/// Lines with at least one terminal bus inside the region, in network order.
pub fn lines_in_region(network: &Network, region: &Region) -> Vec<LineId> {
    network
        .lines()
        .filter(|line| {
            [&line.bus0, &line.bus1].into_iter().any(|bus| {
                network
                    .bus(bus)
                    .map(|b| region.contains(&b.position))
                    .unwrap_or(false)
            })
        })
        .map(|line| line.id.clone())
        .collect()
}

/// Cut every line touching the region.
pub fn cut_region(network: &Network, region: &Region, cuts: &mut OutageSet) -> usize {
    let ids = lines_in_region(network, region);
    let count = ids.len();
    cuts.cut_all(ids);
    count
}
