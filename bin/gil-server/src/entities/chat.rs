use std::future::Future;

use chrono::Utc;

use crate::entities::{AnyStore, dao::ChatMessage};

type MessageRow = (String, String, String, String, String);

pub trait ChatStore: Send + Sync + 'static {
    fn append_message(
        &self,
        msg: ChatMessage,
    ) -> impl Future<Output = Result<(), sqlx::Error>> + Send;
    /// All messages of a session, oldest first.
    fn list_messages(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;
    /// The most recent `limit` messages, returned oldest first so they can
    /// feed a prompt directly.
    fn recent_messages(
        &self,
        session_id: &str,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<ChatMessage>, sqlx::Error>> + Send;
}

fn row_to_message(row: MessageRow) -> ChatMessage {
    let (id, session_id, role, content, created_at) = row;
    ChatMessage {
        id,
        session_id,
        role,
        content,
        created_at: created_at.parse().unwrap_or_else(|e: chrono::ParseError| {
            tracing::warn!(raw = %created_at, error = %e, "failed to parse message created_at; using now");
            Utc::now()
        }),
    }
}

impl ChatStore for AnyStore {
    async fn append_message(&self, msg: ChatMessage) -> Result<(), sqlx::Error> {
        let created_at = msg.created_at.to_rfc3339();
        sqlx::query(
            "INSERT INTO chat_messages (id, session_id, role, content, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&msg.id)
        .bind(&msg.session_id)
        .bind(&msg.role)
        .bind(&msg.content)
        .bind(&created_at)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    async fn list_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, session_id, role, content, created_at \
             FROM chat_messages WHERE session_id = ?1 ORDER BY created_at ASC",
        )
        .bind(session_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(row_to_message).collect())
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: i64,
    ) -> Result<Vec<ChatMessage>, sqlx::Error> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, session_id, role, content, created_at \
             FROM chat_messages WHERE session_id = ?1 ORDER BY created_at DESC LIMIT ?2",
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;
        let mut messages: Vec<ChatMessage> = rows.into_iter().map(row_to_message).collect();
        messages.reverse();
        Ok(messages)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use chrono::{Duration, Utc};

    use crate::entities::{ChatSession, SessionStore};

    use super::*;

    async fn store_with_session() -> AnyStore {
        let store = AnyStore::connect("sqlite::memory:").await.expect("in-memory store");
        store
            .create_session(ChatSession::new("s-1".to_owned(), Some("테스트".to_owned())))
            .await
            .unwrap();
        store
    }

    fn message(id: &str, content: &str, offset_secs: i64) -> ChatMessage {
        ChatMessage {
            id: id.to_owned(),
            session_id: "s-1".to_owned(),
            role: "user".to_owned(),
            content: content.to_owned(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn messages_come_back_in_order() {
        let store = store_with_session().await;
        store.append_message(message("m-2", "둘째", 1)).await.unwrap();
        store.append_message(message("m-1", "첫째", 0)).await.unwrap();

        let messages = store.list_messages("s-1").await.unwrap();
        let contents: Vec<&str> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["첫째", "둘째"]);
    }

    #[tokio::test]
    async fn recent_window_keeps_the_tail_chronological() {
        let store = store_with_session().await;
        for i in 0..5 {
            store
                .append_message(message(&format!("m-{i}"), &format!("메시지{i}"), i))
                .await
                .unwrap();
        }
        let recent = store.recent_messages("s-1", 3).await.unwrap();
        let contents: Vec<&str> = recent.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["메시지2", "메시지3", "메시지4"]);
    }

    #[tokio::test]
    async fn deleting_the_session_cascades() {
        let store = store_with_session().await;
        store.append_message(message("m-1", "안녕", 0)).await.unwrap();
        store.delete_session("s-1").await.unwrap();
        assert!(store.list_messages("s-1").await.unwrap().is_empty());
    }
}
