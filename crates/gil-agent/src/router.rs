//! Keyword routing for incoming chat messages.
//!
//! Classification is substring matching in a fixed priority order. Schedule
//! talk wins over everything, then quick factual questions, then vlog
//! requests, then place-detail lookups; whatever is left runs through the
//! general handler with a sub-type that picks its prompt.

pub use gil_providers::youtube::wants_vlog;
use gil_types::{GeneralKind, Intent};

/// Phrasings that mean "change the schedule I already have" rather than
/// "make me a new one".
const MODIFICATION_KEYWORDS: [&str; 16] = [
    "일정 변경",
    "일정 수정",
    "일정 바꿔",
    "일정 다시",
    "일정 재",
    "일정 수정해",
    "일정 바꿔줘",
    "일정 다시 짜",
    "일정 다시 만들어",
    "일정 다시 추천",
    "일정 중에",
    "일정에서",
    "일정의",
    "일정을",
    "일정을 다른거로",
    "일정을 바꿔",
];

/// Words that mark a short factual question worth a single fast completion.
const QUICK_KEYWORDS: [&str; 31] = [
    "주차장", "가성비", "팁", "추천", "어디", "뭐가", "어떤", "어느", "좋은", "나쁜", "비용",
    "요금", "가격", "얼마", "시간", "언제", "방법", "어떻게", "왜", "이유", "장점", "단점",
    "차이", "비교", "주의", "조심", "준비", "필요", "챙겨", "가져", "입장료",
];

const FOOD_KEYWORDS: [&str; 5] = ["맛집", "음식", "식당", "레스토랑", "카페"];
const VIDEO_KEYWORDS: [&str; 8] =
    ["브이로그", "vlog", "유튜브", "영상", "동영상", "비디오", "보여줘", "여행브이로그"];
const ITINERARY_KEYWORDS: [&str; 4] = ["일정", "여행", "코스", "플랜"];
const ITINERARY_VERBS: [&str; 5] = ["추천", "짜줘", "만들어", "생성", "계획해줘"];

pub fn classify(input: &str) -> Intent {
    if input.contains("일정") {
        Intent::Schedule
    } else if input.contains("간단")
        || input.contains("단답")
        || contains_any(input, &QUICK_KEYWORDS)
    {
        Intent::QuickAnswer
    } else if wants_vlog(input) {
        Intent::Vlog
    } else if input.contains("상세") || input.contains("정보") {
        Intent::PlaceDetails
    } else {
        Intent::General(general_kind(input))
    }
}

pub fn is_modification(input: &str) -> bool {
    contains_any(input, &MODIFICATION_KEYWORDS)
}

fn general_kind(input: &str) -> GeneralKind {
    let clean = input.to_lowercase().trim().to_owned();
    if contains_any(&clean, &FOOD_KEYWORDS) {
        GeneralKind::Food
    } else if contains_any(&clean, &VIDEO_KEYWORDS) {
        GeneralKind::Video
    } else if contains_any(&clean, &ITINERARY_KEYWORDS) {
        if contains_any(&clean, &ITINERARY_VERBS) {
            GeneralKind::Itinerary
        } else {
            GeneralKind::Info
        }
    } else {
        GeneralKind::Info
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn schedule_talk_routes_to_schedule() {
        assert_eq!(classify("부산 2박 3일 일정 짜줘"), Intent::Schedule);
        // 일정 wins even when the message also asks for videos
        assert_eq!(classify("일정이랑 브이로그 보여줘"), Intent::Schedule);
    }

    #[test]
    fn quick_keywords_route_to_quick_answer() {
        assert_eq!(classify("경복궁 입장료 얼마야?"), Intent::QuickAnswer);
        assert_eq!(classify("간단하게 답해줘"), Intent::QuickAnswer);
    }

    #[test]
    fn vlog_requests_route_to_vlog() {
        assert_eq!(classify("제주도 브이로그"), Intent::Vlog);
        assert_eq!(classify("YouTube 영상으로 부산 구경하고 싶어"), Intent::Vlog);
    }

    #[test]
    fn detail_requests_route_to_place_details() {
        assert_eq!(classify("성산일출봉 상세 알고 싶어"), Intent::PlaceDetails);
    }

    #[test]
    fn general_messages_are_sub_classified() {
        assert_eq!(classify("해운대 근처 국밥집"), Intent::General(GeneralKind::Info));
        assert_eq!(classify("해운대 맛집 알려줘볼래"), Intent::General(GeneralKind::Food));
    }

    #[test]
    fn modification_phrasings_are_detected() {
        assert!(is_modification("일정 바꿔줘"));
        assert!(is_modification("일정 중에 점심만 다른 데로"));
        assert!(!is_modification("일정 하나 짜줘"));
    }

    #[test]
    fn itinerary_needs_an_intent_verb() {
        assert_eq!(classify("여행 코스 하나 생성해볼래"), Intent::General(GeneralKind::Itinerary));
        assert_eq!(classify("여행 가고 싶다"), Intent::General(GeneralKind::Info));
    }
}
