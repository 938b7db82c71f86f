pub mod chat;
pub mod coords;
pub mod intent;
pub mod place;
pub mod schedule;
pub mod video;

pub use chat::{ChatRole, ChatTurn};
pub use coords::Coordinate;
pub use intent::{GeneralKind, Intent};
pub use place::{Geocode, ResolvedPlace};
pub use video::VideoItem;
