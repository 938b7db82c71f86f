//! Place-name extraction from model replies.
//!
//! JSON itineraries are the reliable path: each activity names its 장소 and
//! usually carries 좌표/주소 already. Free-text replies go through the label
//! regex and the natural-language suffix patterns, which over-match; the
//! exclusion lists below keep slot words (점심, 주의사항, …) out of the
//! candidate set.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use gil_types::ResolvedPlace;
use gil_types::schedule as sched;

use crate::schedule::extract_json;

/// At most this many candidates from a single reply.
const MAX_PLACES: usize = 10;

static LABEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"장소:\s*([가-힣A-Za-z0-9\s]+?)(?:\n|시간:|비용:|주의사항:|$)").unwrap()
});

static NATURAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // Landmark suffixes: 경복궁, 불국사, 감천문화마을, 해운대해수욕장, …
        r"([가-힣]{2,10}(?:궁|사|절|성|촌|마을|공원|박물관|미술관|시장|타워|빌딩|역|공항|터미널|센터|해수욕장|산|봉|호수|강|섬|식당|맛집|카페|호텔|리조트|펜션))",
        // District + free-form name.
        r"([가-힣]{2,8}(?:구|시|군|동|리)\s+[가-힣A-Za-z0-9\s]{2,15})",
        // Lodging / dining suffixes with Latin or digits allowed.
        r"([가-힣A-Za-z0-9\s]{2,20}(?:호텔|리조트|펜션|게스트하우스|모텔|맛집|식당|카페|레스토랑|음식점))",
        // Short natural names: 한라산, 청계천 못지않게 짧은 고유명.
        r"([가-힣]{2,8}(?:궁|산|강|호수|섬|마을|촌|성|사|절))",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

const EXCLUDED_NAMES: [&str; 17] = [
    "여행", "일정", "시간", "장소", "활동", "점심", "저녁", "아침", "주의사", "저녁식사",
    "점심식사", "아침식사", "주의사항", "운영시간", "휴무일", "전화번호", "주소",
];

const EXCLUDED_SUFFIXES: [&str; 7] =
    ["식사", "활동", "시간", "예산", "주의사", "휴무일", "운영시간"];

/// Places lifted directly out of a parsed schedule blob, with the itinerary
/// slot that mentioned them.
pub fn from_schedule(data: &Value) -> Vec<ResolvedPlace> {
    let mut places = Vec::new();
    let Some(days) = data.get("schedule").and_then(Value::as_object) else {
        return places;
    };
    for (_, day) in sched::ordered_days(days) {
        let Some(activities) = day.as_object() else { continue };
        for (activity, details) in activities {
            let Some(name) = details.get("장소").and_then(Value::as_str) else { continue };
            let Some(coords) = details.get("좌표") else { continue };
            let (Some(lat), Some(lng)) = (
                coords.get("lat").and_then(Value::as_f64),
                coords.get("lng").and_then(Value::as_f64),
            ) else {
                continue;
            };
            places.push(ResolvedPlace {
                name: name.to_owned(),
                lat,
                lng,
                address: details
                    .get("주소")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
                activity: Some(activity.clone()),
            });
        }
    }
    places
}

/// Candidate place names from a reply: schedule JSON first, then the label
/// regex and natural-language patterns.
pub fn extract_names(response: &str) -> Vec<String> {
    let mut names = BTreeSet::new();

    if let Some(data) = extract_json(response) {
        if let Some(days) = data.get("schedule").and_then(Value::as_object) {
            for day in days.values() {
                let Some(activities) = day.as_object() else { continue };
                for details in activities.values() {
                    if let Some(name) = details.get("장소").and_then(Value::as_str) {
                        let name = name.trim();
                        if name.chars().count() >= 2 {
                            names.insert(name.to_owned());
                        }
                    }
                }
            }
        }
        if !names.is_empty() {
            return names.into_iter().take(MAX_PLACES).collect();
        }
    }

    for caps in LABEL_PATTERN.captures_iter(response) {
        if let Some(m) = caps.get(1) {
            let name = m.as_str().trim();
            if acceptable(name) {
                names.insert(name.to_owned());
            }
        }
    }

    for pattern in NATURAL_PATTERNS.iter() {
        for caps in pattern.captures_iter(response) {
            if let Some(m) = caps.get(1) {
                let name = m.as_str().trim();
                if acceptable(name) {
                    names.insert(name.to_owned());
                }
            }
        }
    }

    names.into_iter().take(MAX_PLACES).collect()
}

fn acceptable(name: &str) -> bool {
    name.chars().count() >= 2
        && !EXCLUDED_NAMES.contains(&name)
        && !EXCLUDED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// The location block appended to schedule replies.
pub fn format_places_info(places: &[ResolvedPlace]) -> String {
    if places.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n\n📍 **추천 장소 위치 정보:**\n");
    for place in places {
        out.push_str(&format!("- {}: {}\n", place.name, place.address));
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn schedule_json_yields_places_with_slots() {
        let data = json!({
            "schedule": {
                "Day1": {
                    "오전활동": {
                        "장소": "불국사",
                        "좌표": {"lat": 35.7894, "lng": 129.3319},
                        "주소": "경상북도 경주시"
                    },
                    "점심": {"장소": "황리단길 맛집"} // 좌표 없음 → 제외
                }
            }
        });
        let places = from_schedule(&data);
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "불국사");
        assert_eq!(places[0].activity.as_deref(), Some("오전활동"));
    }

    #[test]
    fn label_pattern_extracts_place() {
        let names = extract_names("장소: 경복궁\n시간: 09:00-11:00\n비용: 3000원");
        assert!(names.contains(&"경복궁".to_owned()));
    }

    #[test]
    fn slot_words_are_filtered() {
        let names = extract_names("장소: 점심\n장소: 오전활동\n장소: 한라산");
        assert!(!names.contains(&"점심".to_owned()));
        assert!(names.contains(&"한라산".to_owned()));
    }

    #[test]
    fn natural_suffixes_match() {
        let names = extract_names("감천문화마을 구경하고 해운대해수욕장에서 쉬세요.");
        assert!(names.iter().any(|n| n.contains("감천문화마을")));
        assert!(names.iter().any(|n| n.contains("해운대해수욕장")));
    }

    #[test]
    fn json_schedule_wins_over_text_patterns() {
        let reply = r#"여기 일정입니다.
```json
{"schedule": {"Day1": {"오전활동": {"장소": "첨성대"}}}}
```
그리고 경복궁도 좋아요."#;
        let names = extract_names(reply);
        assert_eq!(names, vec!["첨성대".to_owned()]);
    }

    #[test]
    fn info_block_lists_each_place() {
        let places = vec![ResolvedPlace {
            name: "첨성대".to_owned(),
            lat: 35.8347,
            lng: 129.2190,
            address: "경북 경주시 인왕동".to_owned(),
            activity: None,
        }];
        let block = format_places_info(&places);
        assert!(block.starts_with("\n\n📍 **추천 장소 위치 정보:**\n"));
        assert!(block.contains("- 첨성대: 경북 경주시 인왕동\n"));
        assert!(format_places_info(&[]).is_empty());
    }
}
