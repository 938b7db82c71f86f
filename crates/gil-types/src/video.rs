use serde::{Deserialize, Serialize};

/// One video search hit, shaped for the chat reply's `youtube` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoItem {
    pub video_id: String,
    pub title: String,
    pub channel: String,
    /// Medium-resolution thumbnail URL.
    pub thumb: String,
    pub published: String,
    pub desc: String,
    pub url: String,
    /// The query variant that matched.
    pub search_query: String,
}

impl VideoItem {
    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={video_id}")
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
