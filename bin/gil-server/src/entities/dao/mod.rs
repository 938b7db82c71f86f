pub mod chat;
pub mod schedule;
pub mod session;

pub use chat::ChatMessage;
pub use schedule::ScheduleRecord;
pub use session::ChatSession;
