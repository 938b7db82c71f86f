use chrono::{DateTime, Utc};

/// A row in the `chat_messages` table.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    /// `"user"` / `"assistant"` / `"system"`.
    pub role: String,
    /// Markdown text; rendering to HTML happens at response time.
    pub content: String,
    pub created_at: DateTime<Utc>,
}
