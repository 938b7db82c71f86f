//! Vlog search-term selection.
//!
//! The term comes from, in order: the session's pending itinerary, the
//! current input, reference phrases resolved against the session title and
//! recent messages, and finally the generic fallback. The location regex is
//! deliberately loose (2-4 Korean syllables with an optional 도/시/군/구
//! suffix) and relies on the counter-word filter to stay sane.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Generic fallback when no location can be found anywhere.
pub const FALLBACK_TERM: &str = "여행 브이로그";

static LOCATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([가-힣]{2,4}(?:도|시|군|구)?)").unwrap());

/// Counter words and request verbs the location regex keeps catching.
const NOISE_WORDS: [&str; 6] = ["박", "일", "일정", "관련", "위", "보여줘"];

const REFERENCE_PHRASES: [&str; 3] = ["위 일정", "이 일정", "관련 브이로그"];

fn first_location(text: &str) -> Option<String> {
    LOCATION_PATTERN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|m| !NOISE_WORDS.contains(m))
        .map(str::to_owned)
}

fn location_from_schedule(pending: &Value) -> Option<String> {
    let days = pending.get("schedule")?.as_object()?;
    for day in days.values() {
        let activities = day.as_object()?;
        for details in activities.values() {
            if let Some(place) = details.get("장소").and_then(Value::as_str) {
                if let Some(m) = LOCATION_PATTERN.find(place) {
                    return Some(m.as_str().to_owned());
                }
            }
        }
    }
    None
}

/// Pick the YouTube search term for a vlog request.
///
/// `recent` is the message history, oldest first; only the tail is consulted.
pub fn search_term(
    input: &str,
    pending_schedule: Option<&Value>,
    session_title: Option<&str>,
    recent: &[String],
) -> String {
    if let Some(pending) = pending_schedule {
        if let Some(location) = location_from_schedule(pending) {
            return location;
        }
    }

    if let Some(location) = first_location(input) {
        return location;
    }

    if REFERENCE_PHRASES.iter().any(|p| input.contains(p)) {
        if let Some(title) = session_title {
            if let Some(location) = first_location(title) {
                return location;
            }
        }
        for message in recent.iter().rev().take(5) {
            if let Some(location) = first_location(message) {
                return location;
            }
        }
    }

    FALLBACK_TERM.to_owned()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn pending_schedule_wins() {
        let pending = json!({
            "schedule": {"Day1": {"오전활동": {"장소": "영월 청령포"}}}
        });
        let term = search_term("위 일정 관련 브이로그 보여줘", Some(&pending), None, &[]);
        assert_eq!(term, "영월");
    }

    #[test]
    fn input_location_is_used() {
        assert_eq!(search_term("강릉 브이로그 추천", None, None, &[]), "강릉");
    }

    #[test]
    fn counter_words_are_skipped() {
        // "2박 3일" produces 박/일 matches the filter must drop.
        assert_eq!(search_term("속초로 일정 잡고 브이로그", None, None, &[]), "속초로");
    }

    #[test]
    fn reference_phrase_falls_back_to_title_then_history() {
        let term = search_term(
            "위 일정 브이로그",
            None,
            Some("🗓 여수 여행 일정 추천"),
            &[],
        );
        assert_eq!(term, "여수");

        let history = vec!["user: 통영 맛집 알려줘".to_owned()];
        let term = search_term("관련 브이로그 보여줘", None, None, &history);
        assert_eq!(term, "통영");
    }

    #[test]
    fn nothing_found_means_generic_fallback() {
        assert_eq!(search_term("ㅋㅋㅋ", None, None, &[]), FALLBACK_TERM);
    }
}
