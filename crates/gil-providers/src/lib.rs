pub mod client;
pub mod directions;
pub mod error;
pub mod kakao;
pub mod knowledge;
pub mod llm;
pub mod places;
pub mod polyline;
pub mod similarity;
pub mod weather;
pub mod youtube;

pub use error::ProviderError;
pub use llm::{ChatModel, LlmClient};
