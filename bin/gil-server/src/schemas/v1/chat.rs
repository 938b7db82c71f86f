use gil_types::{place::ResolvedPlace, video::VideoItem};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChatRequest {
    /// Omitted on the first message; the server creates a session and
    /// returns its id.
    pub session_id: Option<String>,
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    pub session_id: String,
    /// Assistant reply as markdown.
    pub reply: String,
    /// Same reply rendered to HTML for direct embedding.
    pub reply_html: String,
    /// Pre-rendered video card markup, empty when no videos matched.
    pub yt_html: String,
    pub youtube: Vec<VideoCard>,
    /// Coordinates for the map pane. Mirrors `places`.
    pub map: Vec<PlacePin>,
    pub places: Vec<PlacePin>,
    pub save_button_enabled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoCard {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    pub thumb: String,
    pub published: String,
    pub desc: String,
    pub url: String,
}

impl From<VideoItem> for VideoCard {
    fn from(v: VideoItem) -> Self {
        Self {
            video_id: v.video_id,
            title: v.title,
            channel: v.channel,
            thumb: v.thumb,
            published: v.published,
            desc: v.desc,
            url: v.url,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlacePin {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<String>,
}

impl From<ResolvedPlace> for PlacePin {
    fn from(p: ResolvedPlace) -> Self {
        Self {
            name: p.name,
            lat: p.lat,
            lng: p.lng,
            address: p.address,
            activity: p.activity,
        }
    }
}
