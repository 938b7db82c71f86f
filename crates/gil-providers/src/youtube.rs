//! YouTube travel-vlog search.
//!
//! Queries the Data API v3 with a couple of generated variants ("부산" 여행
//! 브이로그, "부산" travel vlog, ...), filters the hits against deny/allow
//! keyword lists, and renders the survivors as embeddable card HTML.

use serde::Deserialize;
use tracing::{debug, warn};

use gil_types::VideoItem;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";

/// Words that carry no search signal in a vlog request.
const STOPWORDS: [&str; 17] = [
    "추천", "일정", "시간", "도착", "출발", "점심", "저녁", "식사", "활동", "옵션", "코스",
    "계획", "그럼", "그러면", "관련된", "보여줘", "해줘",
];

/// Titles or descriptions containing any of these are dropped outright.
const DENY_KEYWORDS: [&str; 10] = [
    "몰래카메라",
    "노상방뇨",
    "가만히 서있다가",
    "옷이 벗겨진",
    "와이프",
    "순발력",
    "지렸다",
    "커플",
    "자세",
    "shorts",
];

/// A hit must mention at least one of these to count as travel content.
const TRAVEL_KEYWORDS: [&str; 24] = [
    "여행", "브이로그", "vlog", "travel", "관광", "맛집", "카페", "부산", "서울", "제주",
    "경주", "강릉", "대구", "인천", "광주", "대전", "울산", "독도", "울릉도", "영월",
    "강원도", "전주", "여수", "목포",
];

/// Outcome of one search, ready to splice into a chat reply.
#[derive(Debug, Clone)]
pub struct VideoSearch {
    pub success: bool,
    pub videos: Vec<VideoItem>,
    pub message: String,
    pub html: String,
}

impl VideoSearch {
    fn not_found(query: &str) -> Self {
        Self {
            success: false,
            videos: Vec::new(),
            message: format!("죄송합니다. '{query}'에 대한 관련 영상을 찾지 못했습니다."),
            html: String::new(),
        }
    }

    fn errored(detail: &str) -> Self {
        Self {
            success: false,
            videos: Vec::new(),
            message: format!("유튜브 검색 중 오류가 발생했습니다. ({detail})"),
            html: String::new(),
        }
    }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: ItemId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "channelTitle")]
    channel_title: String,
    #[serde(rename = "publishedAt")]
    published_at: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    medium: Thumbnail,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct YoutubeSearch {
    http: reqwest::Client,
    api_key: String,
}

impl YoutubeSearch {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self { http, api_key: api_key.into() }
    }

    /// Search for travel vlogs. At most two query variants are tried and at
    /// most `max_results` filtered videos are returned.
    pub async fn search(&self, query: &str, max_results: usize) -> VideoSearch {
        if self.api_key.is_empty() {
            debug!("youtube key unset; skipping search");
            return VideoSearch::not_found(query);
        }

        let cleaned = clean_query(query);
        let place = isolate_place_name(&cleaned);
        let variants = search_variants(&cleaned, &place);
        debug!(?variants, %query, "vlog search variants");

        let mut videos: Vec<VideoItem> = Vec::new();
        for variant in variants.iter().take(2) {
            let items = match self.search_once(variant, max_results).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(variant = %variant, error = %e, "youtube search failed");
                    return VideoSearch::errored(&e.to_string());
                }
            };
            for item in items {
                let title_lower = item.snippet.title.to_lowercase();
                let desc_lower = item.snippet.description.to_lowercase();
                if DENY_KEYWORDS.iter().any(|k| title_lower.contains(k) || desc_lower.contains(k))
                {
                    debug!(title = %item.snippet.title, "dropping flagged video");
                    continue;
                }
                if !TRAVEL_KEYWORDS.iter().any(|k| title_lower.contains(k) || desc_lower.contains(k))
                {
                    debug!(title = %item.snippet.title, "dropping off-topic video");
                    continue;
                }
                if videos.iter().any(|v| v.video_id == item.id.video_id) {
                    continue;
                }
                videos.push(VideoItem {
                    url: VideoItem::watch_url(&item.id.video_id),
                    video_id: item.id.video_id,
                    title: item.snippet.title,
                    channel: item.snippet.channel_title,
                    thumb: item.snippet.thumbnails.medium.url,
                    published: item.snippet.published_at,
                    desc: item.snippet.description,
                    search_query: variant.clone(),
                });
            }
        }

        videos.truncate(max_results);
        if videos.is_empty() {
            return VideoSearch::not_found(query);
        }
        let message =
            format!("'{query}'에 대한 {}개의 관련 영상을 찾았습니다!", videos.len());
        let html = render_yt_cards(&videos);
        VideoSearch { success: true, videos, message, html }
    }

    async fn search_once(
        &self,
        variant: &str,
        max_results: usize,
    ) -> Result<Vec<SearchItem>, reqwest::Error> {
        let resp = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("q", variant),
                ("part", "snippet"),
                ("type", "video"),
                ("maxResults", &max_results.to_string()),
                ("relevanceLanguage", "ko"),
                ("regionCode", "KR"),
                ("safeSearch", "strict"),
                ("order", "relevance"),
                ("videoDuration", "medium"),
                ("videoDefinition", "high"),
                ("key", &self.api_key),
            ])
            .send()
            .await?
            .error_for_status()?;
        let parsed: SearchResponse = resp.json().await?;
        Ok(parsed.items)
    }
}

// ── Query shaping ─────────────────────────────────────────────────────────────

fn clean_query(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == ' ' || ('가'..='힣').contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned
        .split_whitespace()
        .filter(|t| !STOPWORDS.contains(t) && t.chars().count() > 1)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip vlog/food vocabulary so only the place name remains. Falls back to
/// the cleaned query when stripping leaves nothing usable.
fn isolate_place_name(cleaned: &str) -> String {
    const REMOVE_KEYWORDS: [&str; 10] = [
        "브이로그", "vlog", "VLOG", "보여줘", "추천", "관련", "영상", "비디오", "맛집", "카페",
    ];
    let mut place = cleaned.to_owned();
    for keyword in REMOVE_KEYWORDS {
        place = place.replace(keyword, "").trim().to_owned();
    }
    if place.chars().count() < 2 { cleaned.to_owned() } else { place }
}

fn search_variants(cleaned: &str, place: &str) -> Vec<String> {
    if cleaned.contains("브이로그") || cleaned.to_lowercase().contains("vlog") {
        vec![
            format!("\"{place}\" 브이로그 여행"),
            format!("\"{place}\" vlog travel"),
            format!("\"{place}\" 여행 브이로그"),
        ]
    } else if cleaned.contains("카페") {
        vec![
            format!("\"{place}\" 카페 브이로그"),
            format!("\"{place}\" 카페 vlog"),
            format!("\"{place}\" 카페 여행"),
        ]
    } else if cleaned.contains("맛집") || cleaned.contains("음식") || cleaned.contains("식당") {
        vec![
            format!("\"{place}\" 맛집 브이로그"),
            format!("\"{place}\" 맛집 vlog"),
            format!("\"{place}\" 음식 브이로그"),
        ]
    } else {
        vec![
            format!("\"{place}\" 여행 브이로그"),
            format!("\"{place}\" travel vlog"),
            format!("\"{place}\" 브이로그"),
        ]
    }
}

/// Whether the user asked for vlog/video content.
pub fn wants_vlog(text: &str) -> bool {
    const KEYS: [&str; 6] = ["브이로그", "vlog", "유튜브", "youtube", "영상 추천", "여행 브이로그"];
    let q = text.to_lowercase();
    KEYS.iter().any(|k| q.contains(k))
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render videos as a small card grid, inline-styled so the chat frontend
/// needs no stylesheet.
pub fn render_yt_cards(videos: &[VideoItem]) -> String {
    if videos.is_empty() {
        return String::new();
    }
    let cards: String = videos
        .iter()
        .map(|v| {
            format!(
                concat!(
                    r#"<a class="yt-card" href="{url}" target="_blank" rel="noopener" "#,
                    r#"style="display:block;border:1px solid #eee;border-radius:12px;"#,
                    r#"overflow:hidden;background:#fff;text-decoration:none;"#,
                    r#"box-shadow:0 4px 12px rgba(0,0,0,0.05);">"#,
                    r#"<img src="{thumb}" alt="{title}" "#,
                    r#"style="width:100%;height:110px;object-fit:cover;display:block;">"#,
                    r#"<div style="padding:8px 10px;">"#,
                    r#"<div style="font-size:14px;line-height:1.3;color:#222;"#,
                    r#"max-height:2.6em;overflow:hidden;display:-webkit-box;"#,
                    r#"-webkit-line-clamp:2;-webkit-box-orient:vertical;">{title}</div>"#,
                    r#"<div style="margin-top:4px;font-size:12px;color:#777;">{channel}</div>"#,
                    r#"</div></a>"#,
                ),
                url = v.url,
                thumb = v.thumb,
                title = v.title,
                channel = v.channel,
            )
        })
        .collect();
    format!(
        concat!(
            r#"<div class="yt-grid" style="margin-top:12px;display:grid;"#,
            r#"grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:12px;">"#,
            "{}",
            r#"</div>"#,
        ),
        cards
    )
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_video() -> VideoItem {
        VideoItem {
            video_id: "abc123".to_owned(),
            title: "부산 여행 브이로그".to_owned(),
            channel: "여행자".to_owned(),
            thumb: "https://i.ytimg.com/vi/abc123/mqdefault.jpg".to_owned(),
            published: "2024-03-01T00:00:00Z".to_owned(),
            desc: "해운대와 광안리".to_owned(),
            url: VideoItem::watch_url("abc123"),
            search_query: "\"부산\" 여행 브이로그".to_owned(),
        }
    }

    #[test]
    fn place_name_sheds_vlog_vocabulary() {
        let cleaned = clean_query("부산 브이로그 보여줘");
        assert_eq!(cleaned, "부산 브이로그");
        assert_eq!(isolate_place_name(&cleaned), "부산");
    }

    #[test]
    fn short_remainder_falls_back_to_cleaned() {
        let cleaned = clean_query("브이로그 추천");
        assert_eq!(isolate_place_name(&cleaned), cleaned);
    }

    #[test]
    fn vlog_variants_take_priority_over_cafe() {
        let variants = search_variants("강릉 카페 브이로그", "강릉");
        assert_eq!(variants[0], "\"강릉\" 브이로그 여행");
    }

    #[test]
    fn cafe_variants_without_vlog_mention() {
        let variants = search_variants("강릉 카페", "강릉");
        assert_eq!(variants[0], "\"강릉\" 카페 브이로그");
        assert_eq!(variants[1], "\"강릉\" 카페 vlog");
    }

    #[test]
    fn default_variants_are_travel_vlogs() {
        let variants = search_variants("경주", "경주");
        assert_eq!(
            variants,
            vec![
                "\"경주\" 여행 브이로그".to_owned(),
                "\"경주\" travel vlog".to_owned(),
                "\"경주\" 브이로그".to_owned(),
            ]
        );
    }

    #[test]
    fn wants_vlog_matches_loosely() {
        assert!(wants_vlog("부산 브이로그 보여줘"));
        assert!(wants_vlog("YouTube 영상 있어?"));
        assert!(!wants_vlog("부산 맛집 알려줘"));
    }

    #[test]
    fn cards_render_as_grid() {
        let html = render_yt_cards(&[sample_video()]);
        assert!(html.starts_with(r#"<div class="yt-grid""#));
        assert!(html.contains("https://www.youtube.com/watch?v=abc123"));
        assert!(html.contains("부산 여행 브이로그"));
        assert!(render_yt_cards(&[]).is_empty());
    }

    #[test]
    fn search_response_parses() {
        let raw = r#"{
            "items": [{
                "id": {"kind": "youtube#video", "videoId": "abc123"},
                "snippet": {
                    "title": "부산 여행 브이로그",
                    "description": "해운대",
                    "channelTitle": "여행자",
                    "publishedAt": "2024-03-01T00:00:00Z",
                    "thumbnails": {"medium": {"url": "https://i.ytimg.com/vi/abc123/mqdefault.jpg"}}
                }
            }]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].id.video_id, "abc123");
    }

    #[tokio::test]
    async fn search_without_key_reports_no_results() {
        let client = YoutubeSearch::new(reqwest::Client::new(), "");
        let outcome = client.search("부산 브이로그", 3).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("부산 브이로그"));
    }
}
