//! Korean prompt templates.
//!
//! The itinerary prompt pins the detected destination hard: every rule block
//! repeats it, because the model drifts to Seoul otherwise. The JSON template
//! is the contract the schedule parser relies on downstream.

use crate::context::ConversationContext;
use crate::context;
use gil_types::GeneralKind;

/// System prompt for the quick-answer path.
pub const QUICK_SYSTEM: &str = "# 🎯 여행 질문 답변 전문가

**역할**: 국내 여행 전문가
**목표**: 명확하고 실용적인 답변 제공
- 사용자가 원하는 여행 기간(N박 M일)은 절대로 변경하지 않습니다.
- 추가 조건(특정 관광지, 혼자 여행, 아이 동반 등)이 들어와도 반드시 N박 M일 형식으로 일정을 구성합니다.
- 출력은 항상 Day1, Day2, … 형식으로 나누어 작성합니다.
- 각 일정에는 장소, 시간, 비용, 주의사항을 반드시 포함합니다.
- 사용자의 요청이 모호하거나 불완전해도 절대로 당일치기로 축소하지 않습니다.
- 브이로그, 유튜브 관련에 대해 물어보면 해당 지역과 관련된 유튜브 여행 브이로그 영상도 추천할 수 있습니다.
- 영어로 절대 답하지 마세요.
- 사용자가 필요한 여행지와 여행일정을 추천하세요.

## 🎯 답변 원칙
1. **핵심 먼저**: 질문에 대한 직접적 답변
2. **간결함**: 불필요한 정보 제거
3. **실용성**: 실제 여행에 도움이 되는 정보
4. **친근함**: 도움이 되는 톤 유지

**형식**: 핵심 답변 → 부가 정보 → 실용적 팁";

/// Join history lines, or the fixed no-history marker.
pub fn conversation_str(history: &[String]) -> String {
    if history.is_empty() {
        "대화 히스토리가 없습니다.".to_owned()
    } else {
        history.join("\n")
    }
}

fn criteria(destination: &str) -> String {
    format!(
        "## 🔧 작성 기준 (모든 항목에 적용)\n\n\
         1. **장소 정보**\n\
            - 모든 장소는 {destination} 지역에 실제로 존재하는 곳만 사용\n\
            - 좌표(lat, lng)와 주소를 반드시 함께 기재하고, 화면 표시는 주소 위주로 작성\n\
         2. **운영 정보**\n\
            - 운영시간, 휴무일, 전화번호는 알고 있는 범위에서 정확하게 기재\n\
            - 확실하지 않은 값은 \"정보 없음\"으로 명시 (허구 금지)\n\
         3. **영상 추천**\n\
            - 브이로그를 추천할 때는 {destination} 여행과 직접 관련된 영상만 언급\n\
         4. **배경 지식**\n\
            - 역사·문화 설명은 일반적으로 알려진 사실만 사용\n"
    )
}

// Kept literal rather than generated: the model copies this shape verbatim.
fn schedule_json_template(destination: &str) -> String {
    format!(
        r#"```json
{{
  "schedule": {{
    "Day1": {{
      "오전활동": {{
        "장소": "{destination} 지역 장소명",
        "시간": "09:00-11:00",
        "비용": "적절한 비용",
        "주의사항": "실용적인 주의사항",
        "좌표": {{"lat": 위도, "lng": 경도}},
        "주소": "{destination} 지역 주소"
      }},
      "점심": {{
        "장소": "{destination} 지역 맛집",
        "시간": "11:30-12:30",
        "비용": "적절한 비용",
        "주의사항": "실용적인 주의사항",
        "좌표": {{"lat": 위도, "lng": 경도}},
        "주소": "{destination} 지역 주소"
      }},
      "오후활동": {{
        "장소": "{destination} 지역 장소명",
        "시간": "13:00-17:00",
        "비용": "적절한 비용",
        "주의사항": "실용적인 주의사항",
        "좌표": {{"lat": 위도, "lng": 경도}},
        "주소": "{destination} 지역 주소"
      }},
      "저녁": {{
        "장소": "{destination} 지역 맛집",
        "시간": "18:00-19:30",
        "비용": "적절한 비용",
        "주의사항": "실용적인 주의사항",
        "좌표": {{"lat": 위도, "lng": 경도}},
        "주소": "{destination} 지역 주소"
      }}
    }}
  }},
  "summary": "Day1: 오전활동장소 → 점심장소 → 오후활동장소 → 저녁장소, Day2: 오전활동장소 → 점심장소 → 오후활동장소 → 저녁장소 (모든 Day의 모든 활동을 반드시 포함할 것)"
}}
```"#
    )
}

const CHECKLIST: &str = "## ⚠️ 최종 체크리스트

1. **JSON 형식**
   - 반드시 유효한 JSON 객체만 출력
   - 응답은 ```json ... ``` 코드 블록 안에만 작성
   - JSON 외 텍스트/설명은 출력하지 않음

2. **허구 금지**
   - 임의로 새로운 상호명이나 장소명을 만들어내면 절대 안 됨
   - 확실하지 않은 정보는 \"정보 없음\"이라고 명시

3. **좌표 확인**
   - 모든 장소의 위도(lat)/경도(lng)를 반드시 채울 것
   - 좌표 값이 null, 빈값이면 안 됨

4. **중복 금지**
   - 같은 장소명/좌표는 2번 이상 등장 금지
   - Day별 일정에 동일 장소 반복 금지

5. **요약 코스(summary)**
   - summary 필드는 반드시 모든 활동을 누락 없이 포함
   - 형식: 'Day1: 오전활동장소 → 점심장소 → 오후활동장소 → 저녁장소'
   - 모든 Day의 모든 활동을 반드시 포함

6. **연속성 유지**
   - 이전 대화에서 언급된 장소, 선호도, 요구사항 반드시 반영
   - 여행지와 무관한 장소 포함 금지

7. **실용성**
   - 각 활동에는 시간, 비용, 주의사항을 반드시 채움
   - 실제 여행에 도움이 되는 현실적인 값으로 설정";

/// Build the itinerary-generation (or modification) prompt.
pub fn schedule_prompt(
    conversation: &str,
    user_input: &str,
    destination: &str,
    is_modification: bool,
    existing_data: &str,
    ctx: &ConversationContext,
) -> String {
    let context_section = context::render(ctx);
    let (prompt_type, situation) = if is_modification {
        ("일정 변경 요청", "기존 일정을 변경해달라고")
    } else {
        ("새 일정 생성 요청", "새로운 일정 추천을")
    };

    let context_info_section = if is_modification {
        format!(
            "### 대화 히스토리 (최근 15개 메시지):\n{conversation}\n\n\
             ### 기존 일정 데이터:\n{existing_data}\n\n\
             ### 현재 사용자 요청사항:\n{user_input}\n{context_section}"
        )
    } else {
        format!(
            "### 대화 히스토리 (최근 15개 메시지):\n{conversation}\n\n\
             ### 현재 사용자 요청사항:\n{user_input}\n{context_section}"
        )
    };

    let guidelines = if is_modification {
        format!(
            "1. **대화 히스토리 분석**: 사용자의 원래 여행 목적지와 일정을 정확히 파악\n\
             2. **일정 재생성**: 기존 일정의 여행지({destination})를 유지하면서 전체 일정을 새로 생성\n\
             3. **요청사항 반영**: 사용자가 언급한 불만사항/변경 요청사항을 반영\n\
             4. **지역 일관성**: 기존 일정과 동일한 여행 기간과 지역 유지\n\
             5. **완전한 새로고침**: 새로운 장소나 활동으로 일정을 완전히 새로 생성\n\
             6. **연속성 유지**: 이전 대화에서 언급된 장소, 선호도, 요구사항을 반드시 고려\n\
             7. **중복 금지**: 같은 장소/좌표 반복 금지\n\
             8. **요약 코스 작성**: summary 필드에 Day별 핵심 코스를 반드시 요약"
        )
    } else {
        "1. **대화 히스토리 분석**: 사용자의 의도와 선호도를 정확히 파악\n\
         2. **요구사항 반영**: 이전 대화에서 언급된 장소나 요구사항을 반영\n\
         3. **맞춤형 일정**: 사용자가 원하는 지역, 기간, 관심사를 고려하여 일정 생성\n\
         4. **실용성**: 실제 여행에 도움이 되는 구체적이고 실용적인 정보 제공, 시간/비용/주의사항 포함\n\
         5. **연속성**: 이전 질문들과의 연관성을 고려하여 일관된 답변 제공\n\
         6. **중복 금지**: 같은 장소/좌표 반복 금지\n\
         7. **요약 코스 작성**: summary 필드에 Day별 핵심 코스를 반드시 요약"
            .to_owned()
    };

    format!(
        "# 🎯 AI 여행 전문가 시스템 프롬프트 ({prompt_type})\n\n\
         ## 📋 기본 정보\n\
         - **역할**: 15년 경력의 국내 여행 전문 AI 어시스턴트\n\
         - **현재 상황**: 사용자가 {situation} 요청\n\
         - **감지된 여행 목적지**: {destination}\n\
         - **중요도**: ⚠️ 이 정보를 절대적으로 따라야 함!\n\n\
         ## 📚 컨텍스트 정보\n{context_info_section}\n\n\
         ## 🎯 핵심 지침\n{guidelines}\n\n\
         ## 🚨 절대 위반 금지 규칙\n\
         - **감지된 여행 목적지**: {destination}\n\
         - **반드시 {destination} 지역의 장소들만 사용**\n\
         - **절대로 다른 지역 장소 사용 금지**\n\
         - **중복 금지: 같은 장소/좌표는 1번만 출력**\n\
         - **summary 필드 반드시 포함 (모든 Day의 모든 활동을 누락 없이 포함해야 함)**\n\
         - **🚨 CRITICAL: summary에는 오전활동, 점심, 오후활동, 저녁을 모두 포함할 것!**\n\n\
         {criteria}\n\
         ## 📋 응답 형식 (JSON)\n\n\
         반드시 다음 JSON 형식으로만 응답 ({destination} 지역만 사용):\n\n\
         {template}\n\n\
         {CHECKLIST}\n\n\
         **중요**: summary 필드에는 반드시 모든 Day의 모든 활동(오전활동, 점심, 오후활동, 저녁)을 순서대로 포함해야 함",
        criteria = criteria(destination),
        template = schedule_json_template(destination),
    )
}

/// Build the prompt for the general handler.
///
/// `reference` carries pre-fetched provider results (geocode, knowledge,
/// weather) so a single completion has the same information the original
/// multi-tool loop gathered.
pub fn general_prompt(
    kind: GeneralKind,
    user_input: &str,
    destination: &str,
    conversation: &str,
    reference: &str,
) -> String {
    let reference_section = if reference.is_empty() {
        String::new()
    } else {
        format!("\n**검색된 참고 정보 (이 값을 우선 사용):**\n{reference}\n")
    };

    match kind {
        GeneralKind::Food => format!(
            "# 🍽️ {destination} 맛집 추천\n\n\
             **대화 히스토리 (최근 15개 메시지):**\n{conversation}\n\n\
             **요청**: {user_input}\n{reference_section}\n\
             {criteria}\n\
             **응답 형식**: {destination} 지역 맛집명, 주소, 좌표, 운영시간/휴무일, 전화번호, 유튜브 영상 링크\n",
            criteria = criteria(destination),
        ),
        GeneralKind::Video => format!(
            "# 🎥 {destination} 브이로그 추천\n\n\
             **대화 히스토리 (최근 15개 메시지):**\n{conversation}\n\n\
             **요청**: {user_input}\n{reference_section}\n\
             {criteria}\n\
             **응답 형식**: 유튜브 영상 링크, 채널명, 주요 장소와 좌표, 여행 팁\n",
            criteria = criteria(destination),
        ),
        GeneralKind::Itinerary | GeneralKind::Info => format!(
            "# 🌟 {destination} 여행 정보\n\n\
             **대화 히스토리 (최근 15개 메시지):**\n{conversation}\n\n\
             **요청**: {user_input}\n{reference_section}\n\
             {criteria}\n\
             ## ⚠️ 출력 규칙\n\
             - 반드시 JSON 형식으로만 출력하세요.\n\
             - JSON 이외의 설명, 마크다운, 불필요한 텍스트는 절대 포함하지 마세요.\n\
             - 키 구조는 다음 예시를 따르세요:\n\n\
             {{\n\
             \x20 \"장소명\": \"홍천군\",\n\
             \x20 \"주소\": \"대한민국 강원특별자치도 홍천군\",\n\
             \x20 \"좌표\": {{ \"lat\": 37.6899, \"lng\": 127.8880 }},\n\
             \x20 \"운영시간\": \"정보 없음\",\n\
             \x20 \"전화번호\": \"없음\",\n\
             \x20 \"비용\": \"N/A\",\n\
             \x20 \"날씨\": \"맑음, 기온 23°C\",\n\
             \x20 \"유튜브\": \"https://youtu.be/xxxx\"\n\
             }}\n",
            criteria = criteria(destination),
        ),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_history_has_a_marker() {
        assert_eq!(conversation_str(&[]), "대화 히스토리가 없습니다.");
        assert_eq!(
            conversation_str(&["user: 안녕".to_owned()]),
            "user: 안녕"
        );
    }

    #[test]
    fn schedule_prompt_pins_the_destination() {
        let prompt = schedule_prompt(
            "대화 히스토리가 없습니다.",
            "여수 2박 3일 일정 짜줘",
            "여수",
            false,
            "",
            &ConversationContext::default(),
        );
        assert!(prompt.contains("감지된 여행 목적지**: 여수"));
        assert!(prompt.contains("\"장소\": \"여수 지역 장소명\""));
        assert!(prompt.contains("새 일정 생성 요청"));
        assert!(!prompt.contains("기존 일정 데이터"));
    }

    #[test]
    fn modification_prompt_embeds_existing_schedule() {
        let prompt = schedule_prompt(
            "user: 점심이 별로야",
            "일정 바꿔줘",
            "경주",
            true,
            "{\"schedule\": {}}",
            &ConversationContext::default(),
        );
        assert!(prompt.contains("일정 변경 요청"));
        assert!(prompt.contains("### 기존 일정 데이터:\n{\"schedule\": {}}"));
    }

    #[test]
    fn info_prompt_demands_json_output() {
        let prompt =
            general_prompt(GeneralKind::Info, "홍천 어때", "홍천", "대화 히스토리가 없습니다.", "");
        assert!(prompt.contains("반드시 JSON 형식으로만 출력하세요."));
        assert!(prompt.contains("\"날씨\""));
    }

    #[test]
    fn reference_section_only_when_present() {
        let without =
            general_prompt(GeneralKind::Food, "부산 맛집", "부산", "", "");
        assert!(!without.contains("검색된 참고 정보"));
        let with =
            general_prompt(GeneralKind::Food, "부산 맛집", "부산", "", "📚 위키백과 요약:\n부산은…");
        assert!(with.contains("검색된 참고 정보"));
        assert!(with.contains("부산은…"));
    }
}
