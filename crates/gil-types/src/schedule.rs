//! Access helpers for the itinerary JSON blob.
//!
//! The blob is stored and returned verbatim; its conventional shape is
//! `{"schedule": {"Day1": {"오전활동": {...}, ...}}, "summary": "..."}` with
//! each activity carrying 장소 / 시간 / 비용 / 주의사항 and optionally
//! 좌표 / 주소. Nothing here enforces that shape.

use serde_json::{Map, Value, json};

/// Itinerary slots in presentation order.
pub const ACTIVITY_ORDER: [&str; 4] = ["오전활동", "점심", "오후활동", "저녁"];

/// The day map of a schedule blob.
///
/// Accepts both the wrapped form (`{"schedule": {...}}`) and a bare day map.
pub fn day_map(data: &Value) -> Option<&Map<String, Value>> {
    match data.get("schedule") {
        Some(inner) => inner.as_object(),
        None => data.as_object(),
    }
}

/// Day entries sorted by their numeric suffix, so `Day10` sorts after `Day2`.
pub fn ordered_days(days: &Map<String, Value>) -> Vec<(&str, &Value)> {
    let mut entries: Vec<(&str, &Value)> = days.iter().map(|(k, v)| (k.as_str(), v)).collect();
    entries.sort_by_key(|(name, _)| day_number(name));
    entries
}

/// `true` for `null`, a missing value, or an object with no keys.
pub fn is_empty_blob(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// The placeholder itinerary used when a schedule is saved with no content.
pub fn default_schedule() -> Value {
    json!({
        "schedule": {
            "Day1": {
                "오전활동": {
                    "장소": "추천 장소",
                    "시간": "09:00-11:00",
                    "비용": "예상 비용",
                    "주의사항": "주의사항"
                },
                "점심": {
                    "장소": "추천 맛집",
                    "시간": "11:30-12:30",
                    "비용": "예상 비용",
                    "주의사항": "주의사항"
                },
                "오후활동": {
                    "장소": "추천 장소",
                    "시간": "13:00-17:00",
                    "비용": "예상 비용",
                    "주의사항": "주의사항"
                },
                "저녁": {
                    "장소": "추천 맛집",
                    "시간": "18:00-19:30",
                    "비용": "예상 비용",
                    "주의사항": "주의사항"
                }
            }
        },
        "summary": "추천 코스"
    })
}

fn day_number(name: &str) -> u32 {
    name.chars()
        .filter(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(u32::MAX)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
