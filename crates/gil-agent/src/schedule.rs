//! Itinerary JSON handling: fence extraction, summary completion and the
//! Markdown rendering users actually see.
//!
//! The model is told to answer inside a ```json fence, but it doesn't always
//! comply; bare fences and fence-free JSON are accepted too. A reply that
//! fails to parse is simply shown as text.

use serde_json::{Map, Value};

use gil_types::schedule::{ACTIVITY_ORDER, day_map, ordered_days};

/// Pull the JSON blob out of a model reply, if there is one.
pub fn extract_json(reply: &str) -> Option<Value> {
    let candidate = if let Some(rest) = reply.split_once("```json").map(|(_, r)| r) {
        rest.split("```").next().unwrap_or("").trim()
    } else if let Some(rest) = reply.split_once("```").map(|(_, r)| r) {
        rest.split("```").next().unwrap_or("").trim()
    } else {
        reply.trim()
    };
    serde_json::from_str(candidate).ok()
}

/// Rebuild `summary` from the day map when the model's own summary is
/// incomplete: shorter than 30 chars, missing a slot, or fewer than three
/// `→` separators.
pub fn complete_summary(data: &mut Value) {
    let Some(schedule) = data.get("schedule").and_then(Value::as_object).cloned() else {
        return;
    };
    let Some(summary) = data.get("summary").and_then(Value::as_str) else {
        return;
    };

    let slots_present =
        ["오전", "점심", "오후", "저녁"].iter().all(|slot| summary.contains(slot));
    let incomplete = summary.chars().count() < 30
        || !slots_present
        || summary.matches('→').count() < 3;
    if incomplete {
        let rebuilt = generate_summary(&schedule);
        tracing::debug!(old = %summary, new = %rebuilt, "rebuilding incomplete summary");
        data["summary"] = Value::String(rebuilt);
    }
}

/// `DayN: a → b → c → d` per day, joined by `", "`.
pub fn generate_summary(schedule: &Map<String, Value>) -> String {
    let mut parts = Vec::new();
    for (day, activities) in ordered_days(schedule) {
        let Some(activities) = activities.as_object() else { continue };
        let places: Vec<&str> = ACTIVITY_ORDER
            .iter()
            .filter_map(|slot| {
                activities.get(*slot).and_then(|d| d.get("장소")).and_then(Value::as_str)
            })
            .collect();
        if !places.is_empty() {
            parts.push(format!("{day}: {}", places.join(" → ")));
        }
    }
    parts.join(", ")
}

/// Render the itinerary as the Markdown shown in chat.
pub fn to_markdown(data: &Value) -> String {
    let mut out = String::new();
    if let Some(days) = data.get("schedule").and_then(Value::as_object) {
        for (day, activities) in ordered_days(days) {
            out.push_str(&format!("## {day}\n\n"));
            let Some(activities) = activities.as_object() else { continue };
            for (activity, details) in activities {
                let field = |key: &str| {
                    details.get(key).and_then(Value::as_str).unwrap_or("N/A").to_owned()
                };
                out.push_str(&format!("### {activity}\n"));
                out.push_str(&format!("- 장소: {}\n", field("장소")));
                out.push_str(&format!("- 시간: {}\n", field("시간")));
                out.push_str(&format!("- 비용: {}\n", field("비용")));
                out.push_str(&format!("- 주의사항: {}\n\n", field("주의사항")));
            }
        }
    }
    if let Some(summary) = data.get("summary").and_then(Value::as_str) {
        out.push_str(&format!("## 요약 코스\n{summary}\n"));
    }
    out
}

/// `true` when the day map is shaped usably at all.
pub fn looks_like_schedule(data: &Value) -> bool {
    day_map(data).is_some_and(|days| !days.is_empty())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    fn two_slot_day() -> Value {
        json!({
            "schedule": {
                "Day1": {
                    "오전활동": {"장소": "첨성대", "시간": "09:00-11:00", "비용": "무료", "주의사항": "야외"},
                    "점심": {"장소": "교리김밥", "시간": "11:30-12:30", "비용": "1만원", "주의사항": "웨이팅"},
                    "오후활동": {"장소": "대릉원", "시간": "13:00-17:00", "비용": "3천원", "주의사항": "-"},
                    "저녁": {"장소": "황리단길", "시간": "18:00-19:30", "비용": "2만원", "주의사항": "-"}
                }
            },
            "summary": "경주"
        })
    }

    #[test]
    fn json_fence_is_extracted() {
        let reply = "일정입니다.\n```json\n{\"schedule\": {\"Day1\": {}}}\n```\n즐거운 여행!";
        assert!(extract_json(reply).is_some());
    }

    #[test]
    fn bare_fence_is_accepted() {
        let reply = "```\n{\"schedule\": {}}\n```";
        assert!(extract_json(reply).is_some());
        assert!(extract_json("그냥 텍스트 답변입니다.").is_none());
    }

    #[test]
    fn short_summary_is_rebuilt() {
        let mut data = two_slot_day();
        complete_summary(&mut data);
        assert_eq!(
            data["summary"],
            "Day1: 첨성대 → 교리김밥 → 대릉원 → 황리단길"
        );
    }

    #[test]
    fn complete_summary_is_kept() {
        let mut data = two_slot_day();
        let good = "Day1: 오전 첨성대 → 점심 교리김밥 → 오후 대릉원 → 저녁 황리단길 코스입니다";
        data["summary"] = Value::String(good.to_owned());
        complete_summary(&mut data);
        assert_eq!(data["summary"], good);
    }

    #[test]
    fn markdown_renders_days_and_summary() {
        let md = to_markdown(&two_slot_day());
        assert!(md.contains("## Day1\n"));
        assert!(md.contains("### 점심\n- 장소: 교리김밥\n"));
        assert!(md.contains("## 요약 코스\n경주\n"));
    }

    #[test]
    fn missing_fields_render_as_na() {
        let data = json!({"schedule": {"Day1": {"오전활동": {"장소": "첨성대"}}}});
        let md = to_markdown(&data);
        assert!(md.contains("- 시간: N/A\n"));
    }
}
