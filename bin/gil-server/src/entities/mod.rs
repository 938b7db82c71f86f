//! Database abstraction layer.
//!
//! [`SessionStore`], [`ChatStore`] and [`ScheduleStore`] define the
//! persistence interface; the default implementation is [`AnyStore`] over a
//! sqlx `Any` pool. To swap databases, implement the traits for the new
//! type and change the concrete type in [`crate::state::AppState`].
//!
//! All trait methods use `impl Future` in their signatures (stable since
//! Rust 1.75) so no extra `async-trait` crate is required.

pub mod chat;
pub mod dao;
pub mod schedule;
pub mod session;

pub use dao::{ChatMessage, ChatSession, ScheduleRecord};

pub use chat::ChatStore;
pub use schedule::ScheduleStore;
pub use session::SessionStore;

use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct AnyStore {
    pool: sqlx::Pool<sqlx::Any>,
}

impl AnyStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` should be a sqlx-compatible URL, e.g. `"sqlite://gil.db"` or
    /// `"sqlite::memory:"` for tests.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        sqlx::any::install_default_drivers();
        let options = sqlx::any::AnyConnectOptions::from_str(url)?;
        let pool = sqlx::AnyPool::connect_with(options).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &sqlx::Pool<sqlx::Any> {
        &self.pool
    }
}
