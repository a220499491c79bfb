pub mod chat;

pub use chat::{iso_timestamp, ChatRequest, ChatResponse, ResponseMetadata, UserContext};
