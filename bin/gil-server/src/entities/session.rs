use std::future::Future;

use crate::entities::{AnyStore, dao::ChatSession};

type SessionRow = (String, Option<String>, Option<String>, Option<String>, String, String);

pub trait SessionStore: Send + Sync + 'static {
    fn create_session(
        &self,
        session: ChatSession,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    fn get_session(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<ChatSession>, sqlx::Error>> + Send;
    fn list_sessions(&self) -> impl Future<Output = Result<Vec<ChatSession>, sqlx::Error>> + Send;
    fn update_session_title(
        &self,
        id: &str,
        title: &str,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Persist what the last turn learned: the detected destination and the
    /// pending itinerary JSON. `None` keeps the stored value.
    fn update_session_context(
        &self,
        id: &str,
        last_destination: Option<&str>,
        pending_schedule: Option<&str>,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// Delete one session (messages cascade). Returns `true` when a row
    /// actually went away.
    fn delete_session(&self, id: &str) -> impl Future<Output = Result<bool, sqlx::Error>> + Send;
}

fn row_to_session(row: SessionRow) -> ChatSession {
    let (id, title, last_destination, pending_schedule, created_at, updated_at) = row;
    ChatSession {
        id,
        title,
        last_destination,
        pending_schedule,
        created_at: created_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
        updated_at: updated_at.parse().unwrap_or_else(|_| chrono::Utc::now()),
    }
}

impl SessionStore for AnyStore {
    async fn create_session(&self, session: ChatSession) -> Result<(), sqlx::Error> {
        let created_at = session.created_at.to_rfc3339();
        let updated_at = session.updated_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO chat_sessions \
                 (id, title, last_destination, pending_schedule, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&session.id)
        .bind(&session.title)
        .bind(&session.last_destination)
        .bind(&session.pending_schedule)
        .bind(&created_at)
        .bind(&updated_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn get_session(&self, id: &str) -> Result<Option<ChatSession>, sqlx::Error> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT id, title, last_destination, pending_schedule, created_at, updated_at \
                 FROM chat_sessions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(row_to_session))
    }

    async fn list_sessions(&self) -> Result<Vec<ChatSession>, sqlx::Error> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT id, title, last_destination, pending_schedule, created_at, updated_at \
                 FROM chat_sessions ORDER BY created_at DESC",
        )
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_session).collect())
    }

    async fn update_session_title(&self, id: &str, title: &str) -> Result<(), sqlx::Error> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        sqlx::query("UPDATE chat_sessions SET title = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(title)
            .bind(&updated_at)
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(())
    }

    async fn update_session_context(
        &self,
        id: &str,
        last_destination: Option<&str>,
        pending_schedule: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let updated_at = chrono::Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE chat_sessions SET \
                 last_destination = COALESCE(?1, last_destination), \
                 pending_schedule = COALESCE(?2, pending_schedule), \
                 updated_at = ?3 \
             WHERE id = ?4",
        )
        .bind(last_destination)
        .bind(pending_schedule)
        .bind(&updated_at)
        .bind(id)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn delete_session(&self, id: &str) -> Result<bool, sqlx::Error> {
        // SQLite only honors the FK cascade with a per-connection pragma the
        // Any pool does not set, so dependents are cleaned up explicitly.
        sqlx::query("DELETE FROM chat_messages WHERE session_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        sqlx::query("UPDATE schedules SET session_id = NULL WHERE session_id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        let result = sqlx::query("DELETE FROM chat_sessions WHERE id = ?1")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    async fn memory_store() -> AnyStore {
        AnyStore::connect("sqlite::memory:").await.expect("in-memory store")
    }

    #[tokio::test]
    async fn session_round_trip() {
        let store = memory_store().await;
        let session = ChatSession::new("s-1".to_owned(), Some("🗓 여행 일정 추천".to_owned()));
        store.create_session(session.clone()).await.unwrap();

        let loaded = store.get_session("s-1").await.unwrap().unwrap();
        assert_eq!(loaded.title.as_deref(), Some("🗓 여행 일정 추천"));
        assert!(loaded.last_destination.is_none());
    }

    #[tokio::test]
    async fn context_update_keeps_unset_fields() {
        let store = memory_store().await;
        store.create_session(ChatSession::new("s-1".to_owned(), None)).await.unwrap();

        store.update_session_context("s-1", Some("경주"), None).await.unwrap();
        store.update_session_context("s-1", None, Some("{\"schedule\":{}}")).await.unwrap();

        let loaded = store.get_session("s-1").await.unwrap().unwrap();
        assert_eq!(loaded.last_destination.as_deref(), Some("경주"));
        assert_eq!(loaded.pending_schedule.as_deref(), Some("{\"schedule\":{}}"));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_existed() {
        let store = memory_store().await;
        store.create_session(ChatSession::new("s-1".to_owned(), None)).await.unwrap();
        assert!(store.delete_session("s-1").await.unwrap());
        assert!(!store.delete_session("s-1").await.unwrap());
        assert!(store.get_session("s-1").await.unwrap().is_none());
    }
}
