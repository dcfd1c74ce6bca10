//! Language-model inference layer.
//!
//! Submodules:
//! - `types`: OpenAI-compatible chat completion wire types
//! - `client`: non-streaming HTTP client plus the `CompletionBackend` seam
//! - `errors`: inference error types

pub mod client;
pub mod errors;
pub mod types;

pub use client::{CompletionBackend, InferenceClient};
pub use errors::InferenceError;
