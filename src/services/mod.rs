// Service exports
pub mod ai;
pub mod store;

pub use ai::{ChatMessage, InferenceClient, InferenceError, StructuredPayload};
pub use store::{StoreClient, StoreError};
