//! Conversation-context extraction.
//!
//! Scans the recent history for travel duration, mentioned places, broad
//! preference buckets and prior questions, and renders them as the context
//! section the schedule prompt embeds. All of it is keyword heuristics; the
//! output is advisory text for the model, never authoritative data.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// `N일 여행`, `N박 M일`, `N일간`, `N일 동안` — first capture is the day count.
static DURATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(\d+)일\s*여행", r"(\d+)박\s*(\d+)일", r"(\d+)일간", r"(\d+)일\s*동안"]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
});

const PLACE_KEYWORDS: [&str; 15] = [
    "궁", "사", "공원", "박물관", "미술관", "해변", "산", "시장", "카페", "맛집", "식당",
    "호텔", "펜션", "리조트", "해수욕장",
];

const PREFERENCE_BUCKETS: [(&str, &[&str]); 5] = [
    ("자연", &["자연", "산", "바다", "공원", "해변"]),
    ("문화", &["문화", "역사", "전통", "박물관", "미술관"]),
    ("음식", &["음식", "맛집", "카페", "식당", "먹거리"]),
    ("쇼핑", &["쇼핑", "시장", "상가", "백화점"]),
    ("액티비티", &["액티비티", "체험", "놀이", "레저"]),
];

const SCHEDULE_KEYWORDS: [&str; 5] = ["일정", "여행", "코스", "플랜", "스케줄"];
const FOOD_KEYWORDS: [&str; 7] = ["맛집", "음식", "식당", "카페", "레스토랑", "먹거리", "커피"];
const TOURIST_KEYWORDS: [&str; 7] = ["관광지", "명소", "공원", "박물관", "미술관", "궁", "사"];
const BUDGET_KEYWORDS: [&str; 6] = ["예산", "비용", "돈", "가격", "저렴", "비싼"];

/// What the recent conversation already established.
#[derive(Debug, Default, Clone)]
pub struct ConversationContext {
    pub mentioned_places: Vec<String>,
    pub user_preferences: Vec<String>,
    pub previous_questions: Vec<String>,
    /// `"N일"` when a duration was mentioned.
    pub travel_duration: Option<String>,
    pub has_schedule_discussion: bool,
    pub has_food_discussion: bool,
    pub has_tourist_discussion: bool,
    pub has_budget_discussion: bool,
}

/// Extract context from history lines in `role: content` form, oldest first.
pub fn extract(history: &[String]) -> ConversationContext {
    let mut ctx = ConversationContext::default();
    let text = history.join(" ").to_lowercase();

    for pattern in DURATION_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(&text) {
            if let Some(days) = caps.get(1) {
                ctx.travel_duration = Some(format!("{}일", days.as_str()));
                break;
            }
        }
    }

    // A place keyword pulls in the Korean text around it; short fragments
    // (the keyword alone) are skipped.
    let mut places = BTreeSet::new();
    for keyword in PLACE_KEYWORDS {
        if !text.contains(keyword) {
            continue;
        }
        let pattern = Regex::new(&format!(r"[가-힣\s]*{keyword}[가-힣\s]*")).unwrap();
        for m in pattern.find_iter(&text) {
            let place = m.as_str().trim();
            if place.chars().count() > 2 {
                places.insert(place.to_owned());
            }
        }
    }
    ctx.mentioned_places = places.into_iter().collect();

    for (bucket, keywords) in PREFERENCE_BUCKETS {
        if keywords.iter().any(|k| text.contains(k)) {
            ctx.user_preferences.push(bucket.to_owned());
        }
    }

    for line in history {
        if let Some(question) = line.strip_prefix("user:") {
            let question = question.trim();
            if question.chars().count() > 10 {
                ctx.previous_questions.push(question.to_owned());
            }
        }
    }

    ctx.has_schedule_discussion = SCHEDULE_KEYWORDS.iter().any(|k| text.contains(k));
    ctx.has_food_discussion = FOOD_KEYWORDS.iter().any(|k| text.contains(k));
    ctx.has_tourist_discussion = TOURIST_KEYWORDS.iter().any(|k| text.contains(k));
    ctx.has_budget_discussion = BUDGET_KEYWORDS.iter().any(|k| text.contains(k));
    ctx
}

/// Render the context section embedded in the schedule prompt.
pub fn render(ctx: &ConversationContext) -> String {
    let yes_no = |b: bool| if b { "있음" } else { "없음" };
    let join_or = |items: &[String]| {
        if items.is_empty() { "없음".to_owned() } else { items.join(", ") }
    };
    format!(
        "\n### 📋 추출된 대화 컨텍스트:\n\
         - **언급된 장소들**: {}\n\
         - **사용자 선호도**: {}\n\
         - **여행 기간**: {}\n\
         - **이전 질문 수**: {}\n\
         - **일정 논의 여부**: {}\n\
         - **맛집 논의 여부**: {}\n\
         - **관광지 논의 여부**: {}\n\
         - **예산 논의 여부**: {}\n",
        join_or(&ctx.mentioned_places),
        join_or(&ctx.user_preferences),
        ctx.travel_duration.as_deref().unwrap_or("미지정"),
        ctx.previous_questions.len(),
        yes_no(ctx.has_schedule_discussion),
        yes_no(ctx.has_food_discussion),
        yes_no(ctx.has_tourist_discussion),
        yes_no(ctx.has_budget_discussion),
    )
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn duration_is_detected() {
        let ctx = extract(&lines(&["user: 부산 2박 3일 여행 계획 좀"]));
        assert_eq!(ctx.travel_duration.as_deref(), Some("2일"));

        let ctx = extract(&lines(&["user: 3일간 놀다 올래"]));
        assert_eq!(ctx.travel_duration.as_deref(), Some("3일"));
    }

    #[test]
    fn preferences_bucket_by_keyword() {
        let ctx = extract(&lines(&["user: 바다 보고 맛집 다니고 싶어"]));
        assert!(ctx.user_preferences.contains(&"자연".to_owned()));
        assert!(ctx.user_preferences.contains(&"음식".to_owned()));
        assert!(!ctx.user_preferences.contains(&"쇼핑".to_owned()));
    }

    #[test]
    fn short_questions_are_skipped() {
        let ctx = extract(&lines(&[
            "user: 응",
            "user: 경주에서 불국사까지 어떻게 가는지 알려줘",
        ]));
        assert_eq!(ctx.previous_questions.len(), 1);
    }

    #[test]
    fn discussion_flags_fire() {
        let ctx = extract(&lines(&["user: 일정에 박물관이랑 맛집 넣어줘, 예산은 10만원"]));
        assert!(ctx.has_schedule_discussion);
        assert!(ctx.has_food_discussion);
        assert!(ctx.has_tourist_discussion);
        assert!(ctx.has_budget_discussion);
    }

    #[test]
    fn render_marks_missing_fields() {
        let rendered = render(&ConversationContext::default());
        assert!(rendered.contains("**언급된 장소들**: 없음"));
        assert!(rendered.contains("**여행 기간**: 미지정"));
    }
}
