use strum::Display;

/// What a message is asking for, decided by keyword heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Intent {
    /// Build (or rework) a day-by-day itinerary.
    Schedule,
    /// A short factual answer; no itinerary, no provider round-trips.
    QuickAnswer,
    /// Video recommendations only.
    Vlog,
    /// Operating hours / address / phone for one named place.
    PlaceDetails,
    /// Everything else; the kind picks the prompt template.
    General(GeneralKind),
}

/// Sub-classification of [`Intent::General`]. The display form is the Korean
/// request-type label the prompts are keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GeneralKind {
    #[strum(serialize = "맛집 추천")]
    Food,
    #[strum(serialize = "브이로그 추천")]
    Video,
    #[strum(serialize = "여행 일정")]
    Itinerary,
    #[strum(serialize = "일반 여행 정보")]
    Info,
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn general_kind_displays_korean_label() {
        assert_eq!(GeneralKind::Food.to_string(), "맛집 추천");
        assert_eq!(GeneralKind::Info.to_string(), "일반 여행 정보");
    }
}
