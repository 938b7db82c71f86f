use std::future::Future;

use crate::entities::{AnyStore, dao::ScheduleRecord};

type ScheduleRow = (String, Option<String>, String, String, String);

pub trait ScheduleStore: Send + Sync + 'static {
    fn create_schedule(
        &self,
        schedule: ScheduleRecord,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_schedule(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<ScheduleRecord>, sqlx::Error>> + Send;
    /// Most recent schedule with the given title. Sessions and schedules
    /// are linked by title equality, as the save flow titles both.
    fn latest_schedule_by_title(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<Option<ScheduleRecord>, sqlx::Error>> + Send;
}

fn row_to_schedule(row: ScheduleRow) -> ScheduleRecord {
    let (id, session_id, title, data, created_at) = row;
    ScheduleRecord {
        id,
        session_id,
        title,
        data,
        created_at: created_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
    }
}

impl ScheduleStore for AnyStore {
    async fn create_schedule(&self, schedule: ScheduleRecord) -> Result<(), sqlx::Error> {
        let created_at = schedule.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO schedules (id, session_id, title, data, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&schedule.id)
        .bind(&schedule.session_id)
        .bind(&schedule.title)
        .bind(&schedule.data)
        .bind(&created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_schedule(&self, id: &str) -> Result<Option<ScheduleRecord>, sqlx::Error> {
        let row: Option<ScheduleRow> = sqlx::query_as(
            "SELECT id, session_id, title, data, created_at FROM schedules WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_schedule))
    }

    async fn latest_schedule_by_title(
        &self,
        title: &str,
    ) -> Result<Option<ScheduleRecord>, sqlx::Error> {
        let row: Option<ScheduleRow> = sqlx::query_as(
            "SELECT id, session_id, title, data, created_at \
             FROM schedules WHERE title = ?1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(title)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_schedule))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use super::*;

    fn record(id: &str, title: &str, offset_secs: i64) -> ScheduleRecord {
        ScheduleRecord {
            id: id.to_owned(),
            session_id: None,
            title: title.to_owned(),
            data: "{\"schedule\": {}, \"summary\": \"추천 코스\"}".to_owned(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn schedule_round_trip() {
        let store = AnyStore::connect("sqlite::memory:").await.expect("in-memory store");
        store.create_schedule(record("sch-1", "🗓 여행 일정 추천", 0)).await.unwrap();

        let loaded = store.get_schedule("sch-1").await.unwrap().unwrap();
        assert_eq!(loaded.title, "🗓 여행 일정 추천");
        assert!(loaded.data.contains("추천 코스"));
        assert!(store.get_schedule("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn title_lookup_returns_the_latest() {
        let store = AnyStore::connect("sqlite::memory:").await.expect("in-memory store");
        store.create_schedule(record("sch-1", "🗓 여행 일정 추천", 0)).await.unwrap();
        store.create_schedule(record("sch-2", "🗓 여행 일정 추천", 5)).await.unwrap();

        let hit = store.latest_schedule_by_title("🗓 여행 일정 추천").await.unwrap().unwrap();
        assert_eq!(hit.id, "sch-2");
    }
}
