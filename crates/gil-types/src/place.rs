use serde::{Deserialize, Serialize};

/// A raw geocoding hit, including the resolver's confidence score.
///
/// `score` is a heuristic integer; higher wins when several candidates or
/// search strategies compete for the same query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geocode {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub place_name: String,
    pub category: String,
    /// The query variant that actually produced this hit.
    pub search_query: String,
    pub score: i32,
}

/// A geocoded place attached to a chat reply for map rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
    /// Which itinerary slot mentioned this place (`"오전활동"`, `"점심"`, …),
    /// present only for places lifted out of a schedule.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub activity: Option<String>,
}

impl Geocode {
    /// Shape the hit for a reply, keeping the resolved display name when the
    /// provider returned one.
    pub fn into_place(self, fallback_name: &str) -> ResolvedPlace {
        let name = if self.place_name.is_empty() {
            fallback_name.to_owned()
        } else {
            self.place_name
        };
        ResolvedPlace {
            name,
            lat: self.lat,
            lng: self.lng,
            address: self.address,
            activity: None,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn geocode_keeps_provider_name_when_present() {
        let g = Geocode {
            lat: 37.5796,
            lng: 126.977,
            address: "서울특별시 종로구".to_owned(),
            place_name: "경복궁".to_owned(),
            category: "관광명소".to_owned(),
            search_query: "경복궁".to_owned(),
            score: 80,
        };
        let p = g.into_place("경복궁 근처");
        assert_eq!(p.name, "경복궁");
    }

    #[test]
    fn geocode_falls_back_to_query_name() {
        let g = Geocode {
            lat: 37.5665,
            lng: 126.978,
            address: "서울특별시 중구".to_owned(),
            place_name: String::new(),
            category: "기본백업".to_owned(),
            search_query: "이상한곳".to_owned(),
            score: 10,
        };
        assert_eq!(g.into_place("이상한곳").name, "이상한곳");
    }
}
