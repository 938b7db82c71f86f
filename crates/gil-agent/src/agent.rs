//! The conversation orchestrator.
//!
//! One [`Agent::handle`] call takes a user message plus the session context
//! the server loaded, routes it, runs the matching handler and assembles the
//! structured outcome. Provider failures never escape: every handler
//! degrades to a plain-language Korean fallback, so the server can treat the
//! outcome as infallible.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use gil_providers::kakao::{self, KakaoLocal};
use gil_providers::knowledge::Knowledge;
use gil_providers::places::GooglePlaces;
use gil_providers::weather::OpenWeather;
use gil_providers::youtube::{self, YoutubeSearch, wants_vlog};
use gil_providers::ChatModel;
use gil_types::{ChatTurn, GeneralKind, Intent, ResolvedPlace, VideoItem};

use crate::{context, destination, markdown, places, prompt, router, schedule, vlog};

/// How many videos a vlog reply carries.
const VLOG_RESULTS: usize = 3;

/// Everything the agent needs to know about the current turn.
#[derive(Debug, Default)]
pub struct TurnRequest<'a> {
    pub input: &'a str,
    /// `role: content` lines, oldest first, with the session header lines
    /// (title, start time) already prepended when the session has them.
    pub history: Vec<String>,
    pub session_title: Option<&'a str>,
    /// The destination the session last settled on.
    pub last_destination: Option<&'a str>,
    /// The most recently generated itinerary JSON, for modifications and
    /// vlog term extraction.
    pub pending_schedule: Option<Value>,
}

/// The assembled reply for one turn.
#[derive(Debug, Default)]
pub struct TurnOutcome {
    /// Markdown reply text.
    pub reply: String,
    /// HTML rendering of `reply`.
    pub reply_html: String,
    /// Inline-styled video card fragment, empty unless videos were found.
    pub yt_html: String,
    pub youtube: Vec<VideoItem>,
    pub places: Vec<ResolvedPlace>,
    pub save_button_enabled: bool,
    /// Set when this turn detected a destination worth remembering.
    pub detected_destination: Option<String>,
    /// Set when this turn produced a parseable itinerary.
    pub schedule_json: Option<Value>,
}

/// Provider bundle behind the chat endpoint.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    kakao: KakaoLocal,
    youtube: YoutubeSearch,
    google_places: GooglePlaces,
    knowledge: Knowledge,
    weather: OpenWeather,
}

impl Agent {
    pub fn new(
        model: Arc<dyn ChatModel>,
        kakao: KakaoLocal,
        youtube: YoutubeSearch,
        google_places: GooglePlaces,
        knowledge: Knowledge,
        weather: OpenWeather,
    ) -> Self {
        Self { model, kakao, youtube, google_places, knowledge, weather }
    }

    /// Route and answer one chat turn.
    pub async fn handle(&self, req: TurnRequest<'_>) -> TurnOutcome {
        let intent = router::classify(req.input);
        debug!(%intent, input = %req.input, "routing chat turn");

        let mut outcome = match intent {
            Intent::Schedule => self.handle_schedule(&req).await,
            Intent::QuickAnswer => self.handle_quick(&req).await,
            Intent::Vlog => self.handle_vlog(&req).await,
            Intent::PlaceDetails => self.handle_place_details(&req).await,
            Intent::General(kind) => self.handle_general(&req, kind).await,
        };

        // A vlog-wanted flag outside the vlog branch appends videos to
        // whatever the branch produced.
        if wants_vlog(req.input) && intent != Intent::Vlog {
            let vlog = self.handle_vlog(&req).await;
            if !vlog.reply.is_empty() {
                outcome.reply.push_str("\n\n관련 브이로그:\n");
                outcome.reply.push_str(&vlog.reply);
            }
            outcome.yt_html = vlog.yt_html;
            outcome.youtube = vlog.youtube;
        }

        outcome.reply_html = markdown::to_html(&outcome.reply);
        outcome
    }

    // ── Schedule ──────────────────────────────────────────────────────────────

    async fn handle_schedule(&self, req: &TurnRequest<'_>) -> TurnOutcome {
        let is_modification = router::is_modification(req.input);
        let dest =
            destination::detect(self.model.as_ref(), req.input, req.last_destination).await;
        let ctx = context::extract(&req.history);
        let conversation = prompt::conversation_str(&req.history);

        let existing = if is_modification {
            req.pending_schedule
                .as_ref()
                .and_then(|data| serde_json::to_string_pretty(data).ok())
                .unwrap_or_default()
        } else {
            String::new()
        };

        let system = prompt::schedule_prompt(
            &conversation,
            req.input,
            &dest,
            is_modification,
            &existing,
            &ctx,
        );
        let turns =
            [ChatTurn::system(system), ChatTurn::user(format!("사용자 질문: {}", req.input))];
        let raw = match self.model.complete(&turns).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "schedule completion failed");
                return TurnOutcome {
                    reply: apology(req.input),
                    detected_destination: Some(dest),
                    ..TurnOutcome::default()
                };
            }
        };

        let mut outcome = TurnOutcome {
            detected_destination: Some(dest),
            ..TurnOutcome::default()
        };

        match schedule::extract_json(&raw) {
            Some(mut data) if schedule::looks_like_schedule(&data) => {
                // Only a parsed itinerary is saveable.
                outcome.save_button_enabled = true;
                schedule::complete_summary(&mut data);
                outcome.reply = schedule::to_markdown(&data);

                let mut resolved = places::from_schedule(&data);
                if resolved.is_empty() {
                    resolved = self.resolve_names(places::extract_names(&raw)).await;
                }
                if !resolved.is_empty() {
                    outcome.reply.push_str(&places::format_places_info(&resolved));
                    outcome.places = resolved;
                }
                outcome.schedule_json = Some(data);
            }
            _ => {
                // Unparseable reply: show it as-is, still try the text
                // patterns for map pins.
                outcome.reply = raw.clone();
                outcome.places = self.resolve_names(places::extract_names(&raw)).await;
            }
        }
        outcome
    }

    // ── Quick answer ──────────────────────────────────────────────────────────

    async fn handle_quick(&self, req: &TurnRequest<'_>) -> TurnOutcome {
        let turns = [ChatTurn::system(prompt::QUICK_SYSTEM), ChatTurn::user(req.input)];
        let reply = match self.model.complete(&turns).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "quick answer failed");
                apology(req.input)
            }
        };
        TurnOutcome { reply, ..TurnOutcome::default() }
    }

    // ── Vlog ──────────────────────────────────────────────────────────────────

    async fn handle_vlog(&self, req: &TurnRequest<'_>) -> TurnOutcome {
        let term = vlog::search_term(
            req.input,
            req.pending_schedule.as_ref(),
            req.session_title,
            &req.history,
        );
        debug!(%term, "vlog search");
        let result = self.youtube.search(&term, VLOG_RESULTS).await;

        if result.success {
            TurnOutcome {
                reply: format!("{term} 관련 브이로그를 추천해드릴게요! ✨"),
                yt_html: youtube::render_yt_cards(&result.videos),
                youtube: result.videos,
                ..TurnOutcome::default()
            }
        } else {
            TurnOutcome { reply: result.message, ..TurnOutcome::default() }
        }
    }

    // ── Place details ─────────────────────────────────────────────────────────

    async fn handle_place_details(&self, req: &TurnRequest<'_>) -> TurnOutcome {
        let query = kakao::clean_place_query(req.input);
        let reply = match self.google_places.details(&query).await {
            Some(details) => format!(
                "📍 {}\n주소: {}\n전화: {}\n운영시간:\n{}",
                details.name, details.address, details.phone, details.opening_hours
            ),
            None => format!("'{query}'에 대한 장소 정보를 찾을 수 없습니다."),
        };
        TurnOutcome { reply, ..TurnOutcome::default() }
    }

    // ── General ───────────────────────────────────────────────────────────────

    async fn handle_general(&self, req: &TurnRequest<'_>, kind: GeneralKind) -> TurnOutcome {
        let dest =
            destination::detect(self.model.as_ref(), req.input, req.last_destination).await;
        let conversation = prompt::conversation_str(&req.history);
        let reference = self.fetch_reference(req.input, &dest, kind).await;
        let system = prompt::general_prompt(kind, req.input, &dest, &conversation, &reference);

        let turns = [ChatTurn::system(system), ChatTurn::user(req.input)];
        let mut reply = match self.model.complete(&turns).await {
            Ok(reply) if reply.trim().chars().count() >= 10 => reply,
            Ok(short) => {
                debug!(%short, "general reply too short; using quick answer");
                return self.handle_quick(req).await;
            }
            Err(e) => {
                warn!(error = %e, "general completion failed");
                return TurnOutcome { reply: apology(req.input), ..TurnOutcome::default() };
            }
        };

        // Annotate recognized place names with their coordinates and expose
        // them for the map.
        let resolved = self.resolve_names(places::extract_names(&reply)).await;
        for place in &resolved {
            let annotated = format!("{} (좌표: {}, {})", place.name, place.lat, place.lng);
            reply = reply.replace(&place.name, &annotated);
        }

        TurnOutcome {
            reply,
            places: resolved,
            detected_destination: Some(dest),
            ..TurnOutcome::default()
        }
    }

    /// Pre-fetch provider context for the general prompt. The original drove
    /// these as agent tools; a single completion over fetched text reaches
    /// the same information deterministically.
    async fn fetch_reference(&self, input: &str, dest: &str, kind: GeneralKind) -> String {
        let mut sections = Vec::new();
        match kind {
            GeneralKind::Food => {
                let query = kakao::clean_query(input);
                if let Some(hit) = self.kakao.geocode(&query).await {
                    sections.push(format!(
                        "카카오지도검색 \"{query}\" → {} ({}, {}) {}",
                        hit.place_name, hit.lat, hit.lng, hit.address
                    ));
                }
                if let Some(info) = self.knowledge.search(dest).await {
                    sections.push(info);
                }
            }
            GeneralKind::Video => {}
            GeneralKind::Itinerary | GeneralKind::Info => {
                if let Some(info) = self.knowledge.search(dest).await {
                    sections.push(info);
                }
                sections.push(self.weather.current(dest).await);
            }
        }
        sections.join("\n")
    }

    async fn resolve_names(&self, names: Vec<String>) -> Vec<ResolvedPlace> {
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            if let Some(hit) = self.kakao.lookup(&name).await {
                resolved.push(hit.into_place(&name));
            }
        }
        resolved
    }
}

/// Category-matched apology for a failed handler, per the original copy.
fn apology(input: &str) -> String {
    if input.contains("맛집") || input.contains("음식") {
        format!(
            "죄송합니다. 현재 {input}에 대한 정보를 가져오는 중에 일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요."
        )
    } else if input.contains("브이로그") || input.contains("유튜브") {
        format!(
            "죄송합니다. 현재 {input}에 대한 영상을 찾는 중에 일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요."
        )
    } else {
        format!(
            "죄송합니다. 현재 {input}에 대한 정보를 처리하는 중에 일시적인 오류가 발생했습니다. 잠시 후 다시 시도해주세요."
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use async_trait::async_trait;

    use gil_providers::ProviderError;

    use super::*;

    struct CannedModel(&'static str);

    #[async_trait]
    impl ChatModel for CannedModel {
        async fn complete(&self, _turns: &[ChatTurn]) -> Result<String, ProviderError> {
            Ok(self.0.to_owned())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn complete(&self, _turns: &[ChatTurn]) -> Result<String, ProviderError> {
            Err(ProviderError::MissingKey("llm"))
        }
    }

    fn agent_with(model: Arc<dyn ChatModel>) -> Agent {
        // Keyless provider clients: every provider call degrades to its
        // fallback path, which is exactly what these tests exercise.
        let http = reqwest::Client::new();
        Agent::new(
            model,
            KakaoLocal::new(http.clone(), ""),
            YoutubeSearch::new(http.clone(), ""),
            GooglePlaces::new(http.clone(), ""),
            Knowledge::new(http.clone(), ""),
            OpenWeather::new(http, ""),
        )
    }

    #[tokio::test]
    async fn schedule_reply_is_rendered_and_pinned() {
        let raw = r#"```json
{"schedule": {"Day1": {
  "오전활동": {"장소": "해운대해수욕장", "시간": "09:00-11:00", "비용": "무료", "주의사항": "-",
             "좌표": {"lat": 35.1587, "lng": 129.1604}, "주소": "부산 해운대구"},
  "점심": {"장소": "돼지국밥골목", "시간": "11:30-12:30", "비용": "1만원", "주의사항": "-",
         "좌표": {"lat": 35.1628, "lng": 129.1639}, "주소": "부산 해운대구"},
  "오후활동": {"장소": "동백섬", "시간": "13:00-17:00", "비용": "무료", "주의사항": "-",
             "좌표": {"lat": 35.1532, "lng": 129.1524}, "주소": "부산 해운대구"},
  "저녁": {"장소": "광안리회센터", "시간": "18:00-19:30", "비용": "3만원", "주의사항": "-",
         "좌표": {"lat": 35.1532, "lng": 129.1186}, "주소": "부산 수영구"}
}}, "summary": "부산"}
```"#;
        let agent = agent_with(Arc::new(CannedModel(raw)));
        let outcome = agent
            .handle(TurnRequest { input: "부산 일정 짜줘", ..TurnRequest::default() })
            .await;

        assert!(outcome.save_button_enabled);
        assert_eq!(outcome.places.len(), 4);
        assert!(outcome.reply.contains("## Day1"));
        assert!(outcome.reply.contains("📍 **추천 장소 위치 정보:**"));
        // 부산 token match, no model round-trip needed
        assert_eq!(outcome.detected_destination.as_deref(), Some("부산"));
        // incomplete summary was rebuilt from the day map
        let summary = outcome.schedule_json.unwrap()["summary"].as_str().unwrap().to_owned();
        assert!(summary.contains("해운대해수욕장 → 돼지국밥골목"));
        assert!(!outcome.reply_html.is_empty());
    }

    #[tokio::test]
    async fn prose_schedule_reply_disables_the_save_button() {
        // The model ignored the JSON instructions; there is nothing to save.
        let agent =
            agent_with(Arc::new(CannedModel("경주는 불국사와 첨성대를 추천드립니다.")));
        let outcome = agent
            .handle(TurnRequest { input: "경주 일정 짜줘", ..TurnRequest::default() })
            .await;
        assert!(!outcome.save_button_enabled);
        assert!(outcome.schedule_json.is_none());
        assert!(outcome.reply.contains("불국사"));
    }

    #[tokio::test]
    async fn failed_schedule_completion_apologizes() {
        let agent = agent_with(Arc::new(FailingModel));
        let outcome = agent
            .handle(TurnRequest { input: "서울 일정 추천", ..TurnRequest::default() })
            .await;
        assert!(outcome.reply.contains("죄송합니다"));
        assert!(outcome.schedule_json.is_none());
    }

    #[tokio::test]
    async fn quick_answer_passes_model_text_through() {
        let agent = agent_with(Arc::new(CannedModel("무료입니다. 다만 야간개장은 유료예요.")));
        let outcome = agent
            .handle(TurnRequest { input: "경복궁 입장료 얼마야", ..TurnRequest::default() })
            .await;
        assert!(outcome.reply.contains("무료입니다"));
        assert!(!outcome.save_button_enabled);
    }

    #[tokio::test]
    async fn keyless_vlog_search_reports_not_found() {
        let agent = agent_with(Arc::new(CannedModel("")));
        let outcome =
            agent.handle(TurnRequest { input: "강릉 브이로그", ..TurnRequest::default() }).await;
        assert!(outcome.youtube.is_empty());
        assert!(!outcome.reply.is_empty());
    }

    #[test]
    fn apologies_match_category() {
        assert!(apology("부산 맛집").contains("정보를 가져오는"));
        assert!(apology("부산 유튜브").contains("영상을 찾는"));
        assert!(apology("부산 숙소").contains("정보를 처리하는"));
    }
}
