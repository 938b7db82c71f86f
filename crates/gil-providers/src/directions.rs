//! Route finding: Kakao Mobility for driving, Google Directions for transit.
//!
//! Transit responses are flattened into one unified shape (summary, sections
//! with decoded paths, overview path); Kakao responses pass through with a
//! `provider` marker so the map frontend can tell the two apart.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use gil_types::Coordinate;

use crate::polyline;

const KAKAO_DIRECTIONS_URL: &str = "https://apis-navi.kakaomobility.com/v1/waypoints/directions";
const GOOGLE_DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

/// Driving-route priorities Kakao accepts.
pub const PRIORITIES: [&str; 3] = ["RECOMMEND", "TIME", "DISTANCE"];

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("{0} 미설정")]
    MissingKey(&'static str),
    /// Google answered but without a usable route. The raw payload rides
    /// along for the client.
    #[error("Google Directions 실패")]
    TransitFailed { status: Option<String>, error_message: Option<String>, raw: Value },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("google payload: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Directions {
    http: reqwest::Client,
    kakao_key: String,
    google_key: String,
}

impl Directions {
    pub fn new(
        http: reqwest::Client,
        kakao_key: impl Into<String>,
        google_key: impl Into<String>,
    ) -> Self {
        Self { http, kakao_key: kakao_key.into(), google_key: google_key.into() }
    }

    /// Public-transit route via Google Directions, flattened to the unified
    /// shape.
    pub async fn transit(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<Value, RouteError> {
        if self.google_key.is_empty() {
            return Err(RouteError::MissingKey("GOOGLE_API_KEY"));
        }
        let raw: Value = self
            .http
            .get(GOOGLE_DIRECTIONS_URL)
            .query(&[
                ("origin", format!("{},{}", origin.y, origin.x)),
                ("destination", format!("{},{}", destination.y, destination.x)),
                ("mode", "transit".to_owned()),
                ("language", "ko".to_owned()),
                ("alternatives", "false".to_owned()),
                ("departure_time", "now".to_owned()),
                ("key", self.google_key.clone()),
            ])
            .send()
            .await?
            .json()
            .await?;

        let status = raw.get("status").and_then(Value::as_str).map(str::to_owned);
        let has_routes =
            raw.get("routes").and_then(Value::as_array).is_some_and(|r| !r.is_empty());
        if status.as_deref() != Some("OK") || !has_routes {
            let error_message =
                raw.get("error_message").and_then(Value::as_str).map(str::to_owned);
            return Err(RouteError::TransitFailed { status, error_message, raw });
        }
        let parsed: GoogleDirectionsResponse = serde_json::from_value(raw)?;
        Ok(unify_transit(parsed))
    }

    /// Driving route via Kakao Mobility, response passed through untouched
    /// apart from the `provider` field.
    ///
    /// Some deployments reject the POST form with 405; those get a GET
    /// retry. A route-level failure (`result_code != 0`, typically a point
    /// off the road network) triggers one retry with road-adjusted
    /// coordinates.
    pub async fn driving(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        waypoints: &[Coordinate],
        priority: &str,
    ) -> Result<Value, RouteError> {
        if self.kakao_key.is_empty() {
            return Err(RouteError::MissingKey("KAKAO_REST_API_KEY"));
        }
        let body = kakao_request_body(origin, destination, waypoints, priority);

        let mut resp = self
            .http
            .post(KAKAO_DIRECTIONS_URL)
            .header("Authorization", format!("KakaoAK {}", self.kakao_key))
            .json(&body)
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED {
            let mut params: Vec<(&str, String)> = vec![
                ("origin", format!("{},{}", origin.x, origin.y)),
                ("destination", format!("{},{}", destination.x, destination.y)),
                ("priority", priority.to_owned()),
            ];
            if !waypoints.is_empty() {
                let joined: Vec<String> =
                    waypoints.iter().map(|wp| format!("{},{}", wp.x, wp.y)).collect();
                params.push(("waypoints", joined.join("|")));
            }
            resp = self
                .http
                .get(KAKAO_DIRECTIONS_URL)
                .header("Authorization", format!("KakaoAK {}", self.kakao_key))
                .query(&params)
                .send()
                .await?;
        }
        let mut result: Value = resp.error_for_status()?.json().await?;

        if route_failed(&result) {
            warn!(msg = %result_message(&result), "driving route failed; adjusting coordinates");
            let adjusted_origin = adjust_coordinates_to_road(origin.x, origin.y);
            let adjusted_destination = adjust_coordinates_to_road(destination.x, destination.y);
            if adjusted_origin.0 != origin.x || adjusted_destination.0 != destination.x {
                let retry_body = kakao_request_body(
                    Coordinate::new(adjusted_origin.0, adjusted_origin.1),
                    Coordinate::new(adjusted_destination.0, adjusted_destination.1),
                    waypoints,
                    priority,
                );
                let retry = self
                    .http
                    .post(KAKAO_DIRECTIONS_URL)
                    .header("Authorization", format!("KakaoAK {}", self.kakao_key))
                    .json(&retry_body)
                    .send()
                    .await?;
                if retry.status() == reqwest::StatusCode::OK {
                    result = retry.json().await?;
                    if route_failed(&result) {
                        warn!(msg = %result_message(&result), "adjusted route still failed");
                    } else {
                        info!("adjusted route succeeded");
                    }
                }
            }
        }

        if let Some(obj) = result.as_object_mut() {
            obj.insert("provider".to_owned(), json!("kakao"));
        }
        Ok(result)
    }
}

fn kakao_request_body(
    origin: Coordinate,
    destination: Coordinate,
    waypoints: &[Coordinate],
    priority: &str,
) -> Value {
    let mut body = json!({
        "origin": {"x": origin.x, "y": origin.y},
        "destination": {"x": destination.x, "y": destination.y},
        "priority": priority,
        "car_fuel": "GASOLINE",
        "car_hipass": false,
        "alternatives": false,
        "road_details": false,
    });
    if !waypoints.is_empty() {
        let wps: Vec<Value> = waypoints.iter().map(|wp| json!({"x": wp.x, "y": wp.y})).collect();
        body["waypoints"] = Value::Array(wps);
    }
    body
}

fn route_failed(result: &Value) -> bool {
    result
        .get("routes")
        .and_then(Value::as_array)
        .and_then(|routes| routes.first())
        .and_then(|route| route.get("result_code"))
        .and_then(Value::as_i64)
        .is_some_and(|code| code != 0)
}

fn result_message(result: &Value) -> String {
    result
        .get("routes")
        .and_then(Value::as_array)
        .and_then(|routes| routes.first())
        .and_then(|route| route.get("result_msg"))
        .and_then(Value::as_str)
        .unwrap_or("알 수 없는 오류")
        .to_owned()
}

/// Snap a coordinate to the nearest known road point when it is within about
/// a kilometre of one. Covers Jeju, where geocoded peaks and beaches
/// routinely land off the road network.
fn adjust_coordinates_to_road(x: f64, y: f64) -> (f64, f64) {
    const ROAD_POINTS: [(f64, f64); 14] = [
        (126.5312, 33.4996),
        (126.5200, 33.5100),
        (126.5400, 33.4900),
        (126.5300, 33.5000),
        (126.5100, 33.5000),
        (126.5200, 33.4000),
        (126.5400, 33.3800),
        (126.5000, 33.4200),
        (126.5600, 33.2500),
        (126.5500, 33.2600),
        (126.5700, 33.2400),
        (126.4100, 33.2400),
        (126.4200, 33.2500),
        (126.4000, 33.2300),
    ];
    let mut min_distance = f64::INFINITY;
    let mut closest = (x, y);
    for (road_x, road_y) in ROAD_POINTS {
        let distance = ((x - road_x).powi(2) + (y - road_y).powi(2)).sqrt();
        if distance < min_distance {
            min_distance = distance;
            closest = (road_x, road_y);
        }
    }
    if min_distance > 0.01 { (x, y) } else { closest }
}

// ── Google wire types ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GoogleDirectionsResponse {
    #[serde(default)]
    routes: Vec<GoogleRoute>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleRoute {
    #[serde(default)]
    legs: Vec<GoogleLeg>,
    overview_polyline: Option<GooglePolyline>,
}

#[derive(Debug, Deserialize)]
struct GoogleLeg {
    distance: Option<TextValue>,
    duration: Option<TextValue>,
    #[serde(default)]
    steps: Vec<GoogleStep>,
}

#[derive(Debug, Deserialize)]
struct GoogleStep {
    #[serde(default)]
    html_instructions: String,
    distance: Option<TextValue>,
    duration: Option<TextValue>,
    polyline: Option<GooglePolyline>,
    travel_mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GooglePolyline {
    #[serde(default)]
    points: String,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    #[serde(default)]
    value: i64,
}

fn unify_transit(parsed: GoogleDirectionsResponse) -> Value {
    let route = parsed.routes.into_iter().next().unwrap_or_default();

    let mut total_distance = 0i64;
    let mut total_duration = 0i64;
    let mut sections = Vec::new();
    for leg in route.legs {
        total_distance += leg.distance.map_or(0, |d| d.value);
        total_duration += leg.duration.map_or(0, |d| d.value);
        for step in leg.steps {
            let path = step
                .polyline
                .map(|p| polyline::decode(&p.points))
                .unwrap_or_default();
            let transport = if step.travel_mode.as_deref() == Some("TRANSIT") {
                "대중교통"
            } else {
                "도보"
            };
            sections.push(json!({
                "name": step.html_instructions,
                "distance": step.distance.map_or(0, |d| d.value),
                "duration": step.duration.map_or(0, |d| d.value),
                "path": path,
                "transport": transport,
            }));
        }
    }
    let overview_path =
        route.overview_polyline.map(|p| polyline::decode(&p.points)).unwrap_or_default();

    json!({
        "provider": "google_transit",
        "routes": [{
            "summary": {"distance": total_distance, "duration": total_duration},
            "sections": sections,
            "overview_path": overview_path,
        }]
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nearby_coordinate_snaps_to_road() {
        let (x, y) = adjust_coordinates_to_road(126.5315, 33.4998);
        assert_eq!((x, y), (126.5312, 33.4996));
    }

    #[test]
    fn distant_coordinate_is_untouched() {
        let (x, y) = adjust_coordinates_to_road(126.9780, 37.5665);
        assert_eq!((x, y), (126.9780, 37.5665));
    }

    #[test]
    fn request_body_carries_waypoints() {
        let body = kakao_request_body(
            Coordinate::new(126.9780, 37.5665),
            Coordinate::new(129.0756, 35.1796),
            &[Coordinate::new(127.3845, 36.3504)],
            "RECOMMEND",
        );
        assert_eq!(body["origin"]["x"], 126.9780);
        assert_eq!(body["priority"], "RECOMMEND");
        assert_eq!(body["car_fuel"], "GASOLINE");
        assert_eq!(body["waypoints"][0]["y"], 36.3504);

        let bare = kakao_request_body(
            Coordinate::new(126.9780, 37.5665),
            Coordinate::new(129.0756, 35.1796),
            &[],
            "TIME",
        );
        assert!(bare.get("waypoints").is_none());
    }

    #[test]
    fn failed_route_is_detected() {
        let failed = json!({"routes": [{"result_code": 104, "result_msg": "경로를 찾을 수 없음"}]});
        assert!(route_failed(&failed));
        assert_eq!(result_message(&failed), "경로를 찾을 수 없음");

        let ok = json!({"routes": [{"result_code": 0}]});
        assert!(!route_failed(&ok));
        assert!(!route_failed(&json!({"routes": []})));
    }

    #[test]
    fn transit_legs_flatten_into_sections() {
        let raw = json!({
            "status": "OK",
            "routes": [{
                "legs": [{
                    "distance": {"value": 1200},
                    "duration": {"value": 900},
                    "steps": [
                        {
                            "html_instructions": "지하철 2호선 탑승",
                            "distance": {"value": 1000},
                            "duration": {"value": 600},
                            "travel_mode": "TRANSIT",
                            "polyline": {"points": "_p~iF~ps|U"}
                        },
                        {
                            "html_instructions": "도보 이동",
                            "distance": {"value": 200},
                            "duration": {"value": 300},
                            "travel_mode": "WALKING"
                        }
                    ]
                }],
                "overview_polyline": {"points": "_p~iF~ps|U_ulLnnqC"}
            }]
        });
        let parsed: GoogleDirectionsResponse = serde_json::from_value(raw).unwrap();
        let unified = unify_transit(parsed);
        assert_eq!(unified["provider"], "google_transit");
        let route = &unified["routes"][0];
        assert_eq!(route["summary"]["distance"], 1200);
        assert_eq!(route["summary"]["duration"], 900);
        assert_eq!(route["sections"][0]["transport"], "대중교통");
        assert_eq!(route["sections"][1]["transport"], "도보");
        assert_eq!(route["sections"][0]["path"][0]["y"], 38.5);
        assert_eq!(route["overview_path"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_keys_are_reported() {
        let directions = Directions::new(reqwest::Client::new(), "", "");
        let origin = Coordinate::new(126.9780, 37.5665);
        let destination = Coordinate::new(129.0756, 35.1796);
        match directions.transit(origin, destination).await {
            Err(RouteError::MissingKey(key)) => assert_eq!(key, "GOOGLE_API_KEY"),
            other => panic!("unexpected: {other:?}"),
        }
        match directions.driving(origin, destination, &[], "RECOMMEND").await {
            Err(RouteError::MissingKey(key)) => assert_eq!(key, "KAKAO_REST_API_KEY"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
