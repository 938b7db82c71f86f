use chrono::{DateTime, Utc};

/// A row in the `chat_sessions` table.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: String,
    /// Set from the first titling message; untitled sessions are ephemeral.
    pub title: Option<String>,
    /// The destination last detected for this conversation.
    pub last_destination: Option<String>,
    /// JSON of the most recently generated itinerary, for save/modify turns.
    pub pending_schedule: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    /// Fresh, untitled session.
    pub fn new(id: String, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            last_destination: None,
            pending_schedule: None,
            created_at: now,
            updated_at: now,
        }
    }
}
