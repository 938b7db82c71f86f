//! Geographic coordinates in the axis convention used by the map providers:
//! `x` is longitude, `y` is latitude.

use serde::{Deserialize, Serialize};

/// A WGS-84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// `true` when the point is a representable lat/lng pair at all.
    pub fn is_valid(&self) -> bool {
        (-180.0..=180.0).contains(&self.x) && (-90.0..=90.0).contains(&self.y)
    }

    pub fn lat(&self) -> f64 {
        self.y
    }

    pub fn lng(&self) -> f64 {
        self.x
    }
}

/// Bounding box of mainland South Korea plus Jeju.
pub fn in_korea(lat: f64, lng: f64) -> bool {
    (33.0..=39.0).contains(&lat) && (124.0..=132.0).contains(&lng)
}

/// Korea-bounds check, tightened when the place name pins a known region.
///
/// A geocoder occasionally returns a same-named place in the wrong province;
/// when the query names 목포, 경주 or 서울 the accepted box shrinks to that
/// area so such hits get rejected and the backup tables take over.
pub fn plausible_for(place_name: &str, lat: f64, lng: f64) -> bool {
    if place_name.contains("목포") || place_name.contains("전라남도") {
        (34.5..=35.0).contains(&lat) && (126.0..=126.5).contains(&lng)
    } else if place_name.contains("경주") || place_name.contains("경상북도") {
        (35.7..=36.0).contains(&lat) && (129.0..=129.5).contains(&lng)
    } else if place_name.contains("서울") {
        (37.4..=37.7).contains(&lat) && (126.8..=127.2).contains(&lng)
    } else {
        in_korea(lat, lng)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn seoul_is_in_korea() {
        assert!(in_korea(37.5665, 126.9780));
    }

    #[test]
    fn tokyo_is_not_in_korea() {
        assert!(!in_korea(35.6762, 139.6503));
    }

    #[test]
    fn named_region_tightens_bounds() {
        // Busan coordinates are inside Korea but not plausible for a 목포 query.
        assert!(in_korea(35.1796, 129.0756));
        assert!(!plausible_for("목포 맛집", 35.1796, 129.0756));
        assert!(plausible_for("목포 맛집", 34.7868, 126.4153));
    }

    #[test]
    fn unnamed_region_falls_back_to_country_bounds() {
        assert!(plausible_for("어딘가 맛집", 35.1796, 129.0756));
    }

    #[test]
    fn route_endpoint_validity() {
        assert!(Coordinate::new(126.9780, 37.5665).is_valid());
        assert!(!Coordinate::new(200.0, 37.5665).is_valid());
        assert!(!Coordinate::new(126.9780, 95.0).is_valid());
    }
}
