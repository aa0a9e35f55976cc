pub mod client;
pub mod models;
pub mod response;

pub use client::{complete, normalize_endpoint, ChatBackend, OpenAiCompatClient};
pub use models::RequestBody;
