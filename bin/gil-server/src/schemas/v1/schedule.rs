use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveScheduleRequest {
    /// The user question that produced the schedule. Doubles as the
    /// stored title when `title` is absent.
    pub question: Option<String>,
    pub title: Option<String>,
    /// Schedule JSON blob. The session's pending schedule, when one
    /// exists, takes precedence over this field.
    #[serde(default)]
    pub data: Value,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaveScheduleResponse {
    pub success: bool,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleLookupResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
