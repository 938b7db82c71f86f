pub mod chat;
pub mod route;
pub mod schedule;
pub mod session;
