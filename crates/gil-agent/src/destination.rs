//! Travel-destination detection with session continuity.
//!
//! Order matters: an exact city-name token in the message beats everything,
//! then a one-word model extraction, then whatever destination the session
//! already settled on. Seoul is the final fallback so downstream prompts
//! always have a region to pin.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use gil_providers::ChatModel;
use gil_types::ChatTurn;

/// Korean cities and regions recognised without asking the model.
pub const DEFAULT_CITIES: [&str; 48] = [
    "서울", "부산", "대구", "인천", "광주", "대전", "울산", "세종", "수원", "전주", "여수",
    "순천", "목포", "군산", "담양", "경주", "포항", "안동", "창원", "통영", "거제", "김해",
    "진주", "남해", "하동", "제주", "제주도", "서귀포", "강릉", "속초", "춘천", "원주", "동해",
    "삼척", "태백", "정선", "평창", "영월", "양양", "홍천", "가평", "양평", "파주", "충주",
    "단양", "보령", "태안", "울릉도",
];

static KOREAN_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[가-힣]+").unwrap());

const SYSTEM_PROMPT: &str = "너는 한국 여행 목적지 추출 전문가다. 사용자의 입력에서 한국 도시/지역명을 가장 정확히 식별하고 단어 하나로만 답한다.";

/// Exact token match against the city list.
pub fn match_city(text: &str) -> Option<&'static str> {
    KOREAN_TOKEN
        .find_iter(text)
        .find_map(|token| DEFAULT_CITIES.iter().find(|city| **city == token.as_str()).copied())
}

/// Detect the destination for this message. `last` is the session's
/// previously detected destination, kept when nothing new is found.
pub async fn detect(model: &dyn ChatModel, user_input: &str, last: Option<&str>) -> String {
    if let Some(city) = match_city(user_input) {
        return city.to_owned();
    }

    let prompt = format!(
        "사용자 입력: \"{user_input}\"\n출력: 한국의 도시명 또는 지역명만 **딱 한 단어**로 적어.\n추가 설명, 문장, 따옴표 없이 단어 하나만 출력할 것."
    );
    let turns = [ChatTurn::system(SYSTEM_PROMPT), ChatTurn::user(prompt)];
    match model.complete(&turns).await {
        Ok(answer) => {
            let word = answer.trim().to_owned();
            if !word.is_empty() && word != "None" && word != "null" {
                return word;
            }
        }
        Err(e) => debug!(error = %e, "destination extraction failed"),
    }

    if let Some(last) = last {
        if !last.is_empty() {
            return last.to_owned();
        }
    }
    "서울".to_owned()
}
