use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub struct RoutePoint {
    /// Longitude.
    pub x: f64,
    /// Latitude.
    pub y: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RouteRequest {
    pub origin: RoutePoint,
    pub destination: RoutePoint,
    #[serde(default)]
    pub waypoints: Vec<RoutePoint>,
    /// Kakao route priority, `RECOMMEND` when absent or unknown.
    pub priority: Option<String>,
    /// `TRANSIT` switches to the Google transit backend; anything else
    /// means driving.
    pub mode: Option<String>,
}
