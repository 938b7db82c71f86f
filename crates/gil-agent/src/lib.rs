//! Conversation orchestration for gil.rs.
//!
//! Everything between "a user typed a message" and "here is the structured
//! reply" lives here: keyword intent routing, destination detection, prompt
//! assembly, itinerary JSON handling, place extraction and the final
//! response shaping. Persistence and HTTP are the server's business; this
//! crate only needs a [`gil_providers::ChatModel`] and the provider clients.

pub mod agent;
pub mod context;
pub mod destination;
pub mod markdown;
pub mod places;
pub mod prompt;
pub mod router;
pub mod schedule;
pub mod vlog;

pub use agent::{Agent, TurnOutcome, TurnRequest};
