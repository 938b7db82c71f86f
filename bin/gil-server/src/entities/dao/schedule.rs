use chrono::{DateTime, Utc};

/// A row in the `schedules` table.
///
/// `data` is the itinerary JSON as text; its internal shape (days →
/// activities → 장소/시간/비용/주의사항/좌표) is convention, not enforced.
#[derive(Debug, Clone)]
pub struct ScheduleRecord {
    pub id: String,
    /// The session that produced this schedule, when known. Lookup by
    /// session still goes through title matching (the session title doubles
    /// as the schedule title).
    pub session_id: Option<String>,
    pub title: String,
    pub data: String,
    pub created_at: DateTime<Utc>,
}
